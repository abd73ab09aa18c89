// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event dispatch and paint scheduling.
//!
//! Drivers feed every notification of a burst to
//! [`Compositor::handle_event`] and call [`Compositor::flush`] once the burst
//! has drained. A flush runs at most one paint pass, and only when damage is
//! pending.

use tracing::{trace, warn};

use super::Compositor;
use crate::error::{Error, ProtocolError};
use crate::event::Event;
use crate::id::Sequence;
use crate::service::RenderService;
use crate::trace::{ErrorEvent, PaintSummary, Tracer};
use crate::window::StackPosition;

/// Minor opcode of the Composite request that redirects all children of a
/// window. Only one client may do so per root.
const REDIRECT_SUBWINDOWS: u16 = 2;

/// Where the reactor is in its event/paint cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ReactorState {
    /// Waiting for the next notification.
    #[default]
    Idle,
    /// Folding a burst of notifications into the registry and damage.
    Accumulating,
    /// Running a paint pass.
    Painting,
}

impl<S: RenderService> Compositor<S> {
    /// Current reactor state.
    #[must_use]
    pub fn state(&self) -> ReactorState {
        self.state
    }

    /// Applies one notification. `sequence` is the request sequence the
    /// service had processed when the notification was generated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AnotherCompositor`] when the failure shows that
    /// another compositing manager owns the display, and [`Error::Service`]
    /// when the connection fails. Other protocol failures are logged and
    /// swallowed.
    pub fn handle_event(
        &mut self,
        event: Event,
        sequence: Sequence,
    ) -> Result<(), Error<S::Error>> {
        self.handle_event_traced(event, sequence, &mut Tracer::none())
    }

    /// Like [`handle_event`](Self::handle_event), reporting failures to
    /// `tracer`.
    pub fn handle_event_traced(
        &mut self,
        event: Event,
        sequence: Sequence,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), Error<S::Error>> {
        self.state = ReactorState::Accumulating;
        if !matches!(event, Event::Error(_)) {
            self.ledger.observe(sequence);
        }
        self.dispatch(event, tracer)
    }

    fn dispatch(
        &mut self,
        event: Event,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), Error<S::Error>> {
        match event {
            Event::Error(error) => return self.protocol_error(error, tracer),
            Event::Create { window } => self.add_window(window, StackPosition::Top),
            Event::Destroy { window } => self.destroy_window(window, true),
            Event::Map { window } => self.map_window(window),
            Event::Unmap { window } => self.unmap_window(window),
            Event::Configure(c) => self.configure(c),
            Event::Reparent { window, parent } => self.reparent(window, parent),
            Event::Circulate { window, place } => {
                self.circulate(window, place);
                Ok(())
            }
            Event::Expose {
                window,
                rect,
                count,
            } => self.expose(window, rect, count),
            Event::Property { window, atom } => self.property(window, atom),
            Event::Damage { window } => self.damage_notify(window),
            Event::Shape(s) => self.shape(s),
        }
        .map_err(Error::Service)
    }

    fn protocol_error(
        &mut self,
        error: ProtocolError,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), Error<S::Error>> {
        let suppressed = self.ledger.should_suppress(error.sequence);
        tracer.error(&ErrorEvent { error, suppressed });
        if suppressed {
            trace!(%error, "expected failure suppressed");
            return Ok(());
        }
        if error.major_opcode == self.caps.composite_opcode
            && error.minor_opcode == REDIRECT_SUBWINDOWS
        {
            return Err(Error::AnotherCompositor {
                sequence: error.sequence,
            });
        }
        warn!(%error, "unexpected protocol error");
        Ok(())
    }

    /// Ends a burst: paints the pending damage, if any, and waits for the
    /// service to catch up.
    ///
    /// Returns the pass summary, or `None` when there was nothing to paint.
    pub fn flush(&mut self) -> Result<Option<PaintSummary>, Error<S::Error>> {
        self.flush_traced(&mut Tracer::none())
    }

    /// Like [`flush`](Self::flush), reporting the pass to `tracer`.
    pub fn flush_traced(
        &mut self,
        tracer: &mut Tracer<'_>,
    ) -> Result<Option<PaintSummary>, Error<S::Error>> {
        if !self.damage.has_pending() {
            self.state = ReactorState::Idle;
            return Ok(None);
        }
        self.state = ReactorState::Painting;
        let region = self
            .damage
            .consume(&mut self.service, self.screen.rect())
            .map_err(Error::Service)?;
        let summary = self.paint(region, tracer).map_err(Error::Service)?;
        self.service.sync().map_err(Error::Service)?;
        self.clip_changed = false;
        self.state = ReactorState::Idle;
        Ok(Some(summary))
    }
}
