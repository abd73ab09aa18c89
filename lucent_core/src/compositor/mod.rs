// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The compositor state object.
//!
//! [`Compositor`] owns everything the compositing manager keeps between
//! events: the service connection, the [`WindowRegistry`], the
//! [`DamageAccumulator`], the [`SuppressionLedger`] and the root pictures.
//! It is built once per display with [`Compositor::new`], populated with
//! [`Compositor::initialize`], fed notifications through
//! [`Compositor::handle_event`], and torn down with
//! [`Compositor::shutdown`].
//!
//! The event-handling half lives in `reactor`, window bookkeeping in
//! `lifecycle`, and the paint pass in `paint`.

mod lifecycle;
mod paint;
mod reactor;

use alloc::vec::Vec;

use tracing::debug;

use crate::atoms::Atoms;
use crate::config::CompositorConfig;
use crate::damage::DamageAccumulator;
use crate::error::Error;
use crate::geometry::ScreenRect;
use crate::id::{PictureId, WindowId};
use crate::ledger::{Requests, SuppressionLedger};
use crate::service::{Drawable, PictFormat, PictureOptions, RenderService};
use crate::window::{StackPosition, Transition, WindowRegistry};

pub use reactor::ReactorState;

/// The screen being composited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Screen {
    /// Root window.
    pub root: WindowId,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Depth of the root visual.
    pub depth: u8,
    /// Picture format of the root visual.
    pub format: PictFormat,
}

impl Screen {
    /// The whole screen as a rectangle.
    #[must_use]
    pub const fn rect(&self) -> ScreenRect {
        ScreenRect::new(0, 0, self.width, self.height)
    }
}

/// What the service negotiated at startup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Major opcode of the Composite extension, used to recognize a rejected
    /// redirection.
    pub composite_opcode: u8,
    /// Whether window pixmaps can be named.
    pub name_window_pixmap: bool,
}

/// Process-wide pictures tied to the root window.
#[derive(Clone, Copy, Debug)]
struct RootState {
    /// The visible screen.
    picture: PictureId,
    /// Off-screen destination, recreated after a root resize.
    buffer: Option<PictureId>,
    /// Desktop background, recreated after a background change.
    tile: Option<PictureId>,
    /// Solid black used by the repaint monitor.
    black: Option<PictureId>,
}

/// A compositing manager for one screen.
#[derive(Debug)]
pub struct Compositor<S: RenderService> {
    service: S,
    screen: Screen,
    caps: Capabilities,
    atoms: Atoms,
    config: CompositorConfig,
    registry: WindowRegistry,
    damage: DamageAccumulator,
    ledger: SuppressionLedger,
    root: RootState,
    clip_changed: bool,
    expose: Vec<ScreenRect>,
    state: ReactorState,
    pass_index: u64,
}

impl<S: RenderService> Compositor<S> {
    /// Creates a compositor for `screen`.
    ///
    /// Top-level windows must already be redirected; nothing is managed
    /// until [`initialize`](Self::initialize) runs.
    pub fn new(
        mut service: S,
        screen: Screen,
        caps: Capabilities,
        atoms: Atoms,
        config: CompositorConfig,
    ) -> Result<Self, Error<S::Error>> {
        let picture = service
            .create_picture(
                Drawable::Window(screen.root),
                screen.format,
                PictureOptions {
                    include_inferiors: true,
                    ..PictureOptions::default()
                },
            )
            .map_err(Error::Service)?;
        Ok(Self {
            service,
            screen,
            caps,
            atoms,
            config,
            registry: WindowRegistry::new(),
            damage: DamageAccumulator::new(),
            ledger: SuppressionLedger::new(),
            root: RootState {
                picture,
                buffer: None,
                tile: None,
                black: None,
            },
            clip_changed: false,
            expose: Vec::new(),
            state: ReactorState::Idle,
            pass_index: 0,
        })
    }

    /// Adopts the existing top-level windows, given bottom to top, and
    /// schedules a full-screen repaint.
    ///
    /// Windows that vanished before they could be queried are skipped.
    pub fn initialize(&mut self, windows: &[WindowId]) -> Result<(), Error<S::Error>> {
        let mut below = None;
        for &window in windows {
            let position = below.map_or(StackPosition::Top, StackPosition::Above);
            self.add_window(window, position).map_err(Error::Service)?;
            if self.registry.contains(window) {
                below = Some(window);
            }
        }
        debug!(windows = self.registry.len(), "initial windows adopted");
        let screen = self.screen.rect();
        self.damage
            .add_rects(&mut self.service, &[screen])
            .map_err(Error::Service)
    }

    /// Releases every resource the compositor created and returns the
    /// service.
    pub fn shutdown(mut self) -> Result<S, Error<S::Error>> {
        self.release_all().map_err(Error::Service)?;
        Ok(self.service)
    }

    fn release_all(&mut self) -> Result<(), S::Error> {
        let mut req = Requests::new(&mut self.service, &mut self.ledger);
        for mut window in self.registry.drain() {
            window.release(Transition::Destroy, &mut req)?;
        }
        self.damage.clear(&mut self.service)?;
        let root = &mut self.root;
        for picture in [root.buffer.take(), root.tile.take(), root.black.take()]
            .into_iter()
            .flatten()
        {
            self.service.free_picture(picture)?;
        }
        self.service.free_picture(self.root.picture)
    }

    /// The service the compositor drives.
    #[must_use]
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Mutable access to the service, for drivers that script it.
    pub fn service_mut(&mut self) -> &mut S {
        &mut self.service
    }

    /// Managed windows, topmost first.
    #[must_use]
    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    /// The screen being composited.
    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// Outstanding expected failures.
    #[must_use]
    pub fn ledger(&self) -> &SuppressionLedger {
        &self.ledger
    }

    /// Returns `true` if a paint pass is due.
    #[must_use]
    pub fn has_pending_damage(&self) -> bool {
        self.damage.has_pending()
    }

    /// The visible root picture.
    #[must_use]
    pub fn root_picture(&self) -> PictureId {
        self.root.picture
    }

    /// Number of paint passes run so far.
    #[must_use]
    pub fn pass_count(&self) -> u64 {
        self.pass_index
    }
}
