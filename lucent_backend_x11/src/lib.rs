// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! X11 backend for lucent.
//!
//! - [`connect`]: opens the display, checks the Composite, Damage, XFixes,
//!   Render and Shape extensions, claims the `_NET_WM_CM_S<n>` selection and
//!   redirects the root's children for manual compositing.
//! - [`X11Service`]: the [`RenderService`](lucent_core::service::RenderService)
//!   over an `x11rb` connection.
//! - [`translate`]: wire events to compositor notifications.
//! - [`run`]: the blocking event loop.
//!
//! ```rust,ignore
//! let display = lucent_backend_x11::connect(None)?;
//! let mut compositor = lucent_backend_x11::start(display, CompositorConfig::default())?;
//! lucent_backend_x11::run(&mut compositor, &mut Tracer::none())?;
//! ```

mod bootstrap;
mod error;
mod event;
mod service;

use lucent_core::compositor::Compositor;
use lucent_core::config::CompositorConfig;
use lucent_core::error::Error;
use lucent_core::id::Sequence;
use lucent_core::trace::Tracer;
use tracing::debug;
use x11rb::connection::Connection;
use x11rb::errors::ConnectionError;

pub use bootstrap::{Display, connect};
pub use error::BackendError;
pub use event::{error_code, translate};
pub use service::X11Service;

/// A compositor driving an X server.
pub type X11Compositor = Compositor<X11Service>;

/// Builds a compositor for a prepared display and adopts its windows.
pub fn start(
    display: Display,
    config: CompositorConfig,
) -> Result<X11Compositor, Error<BackendError>> {
    let Display {
        service,
        screen,
        caps,
        atoms,
        windows,
    } = display;
    let mut compositor = Compositor::new(service, screen, caps, atoms, config)?;
    compositor.initialize(&windows)?;
    Ok(compositor)
}

/// Processes events until the connection fails or another compositing
/// manager is detected.
///
/// Each wake-up drains every queued event as one burst, then runs at most
/// one paint pass.
pub fn run(
    compositor: &mut X11Compositor,
    tracer: &mut Tracer<'_>,
) -> Result<(), Error<BackendError>> {
    loop {
        compositor.service().connection().flush().map_err(lost)?;
        let (event, sequence) = compositor
            .service()
            .connection()
            .wait_for_event_with_sequence()
            .map_err(lost)?;
        let mut burst = 0_usize;
        let mut next = Some((event, sequence));
        while let Some((event, sequence)) = next {
            if let Some(event) = translate(event, sequence) {
                compositor.handle_event_traced(event, Sequence(sequence), tracer)?;
                burst += 1;
            }
            next = compositor
                .service()
                .connection()
                .poll_for_event_with_sequence()
                .map_err(lost)?;
        }
        if let Some(summary) = compositor.flush_traced(tracer)? {
            debug!(
                events = burst,
                pass = summary.pass_index,
                solid = summary.solid,
                blended = summary.blended,
                "burst painted"
            );
        }
    }
}

fn lost(e: ConnectionError) -> Error<BackendError> {
    Error::Service(BackendError::Connection(e))
}
