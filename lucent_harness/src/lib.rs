// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless display for driving the lucent compositor without a server.
//!
//! [`HeadlessService`] is a [`RenderService`](lucent_core::service::RenderService)
//! backed by a software rasterizer with real region arithmetic, plus a
//! scripting surface that plays the other clients on the display: creating,
//! mapping, drawing into and destroying windows, setting properties and
//! injecting protocol failures. Scripted changes queue the same
//! notifications a live server would send.
//!
//! ```text
//!   test script ──► HeadlessService ──► queued (Event, Sequence)
//!                         ▲                     │
//!                         │ requests            ▼ pump()
//!                         └──────────── Compositor::handle_event / flush
//! ```
//!
//! **[`region`]**: [`Region`](region::Region), disjoint rectangle lists built
//! on `kurbo`.
//!
//! **[`surface`]**: Premultiplied pixel grids and the `Src`/`Over` operators.

mod server;
mod service;

pub mod region;
pub mod surface;

#[cfg(test)]
mod scenarios;

use core::convert::Infallible;

use lucent_core::compositor::Compositor;
use lucent_core::config::CompositorConfig;
use lucent_core::error::Error;
use lucent_core::trace::{PaintSummary, Tracer};

pub use server::{
    ARGB_VISUAL, COMPOSITE_OPCODE, CompositeRecord, HeadlessService, RGB_VISUAL, WindowSpec,
};

/// A compositor driving a headless display.
pub type HeadlessCompositor = Compositor<HeadlessService>;

/// Builds a compositor over `service` and adopts its current windows.
///
/// # Errors
///
/// Never fails for a headless display; the signature matches
/// [`Compositor::new`].
pub fn start(
    mut service: HeadlessService,
    config: CompositorConfig,
) -> Result<HeadlessCompositor, Error<Infallible>> {
    let screen = service.screen();
    let caps = service.capabilities();
    let atoms = service.atoms();
    let windows = service.top_level();
    let mut compositor = Compositor::new(service, screen, caps, atoms, config)?;
    compositor.initialize(&windows)?;
    Ok(compositor)
}

/// Feeds every queued notification to `compositor` as one burst, then
/// flushes.
///
/// # Errors
///
/// Propagates [`Error::AnotherCompositor`].
pub fn pump(compositor: &mut HeadlessCompositor) -> Result<Option<PaintSummary>, Error<Infallible>> {
    pump_traced(compositor, &mut Tracer::none())
}

/// Like [`pump`], reporting to `tracer`.
pub fn pump_traced(
    compositor: &mut HeadlessCompositor,
    tracer: &mut Tracer<'_>,
) -> Result<Option<PaintSummary>, Error<Infallible>> {
    for (event, sequence) in compositor.service_mut().take_events() {
        compositor.handle_event_traced(event, sequence, tracer)?;
    }
    compositor.flush_traced(tracer)
}

/// Pumps until no notifications are left, at most `max_bursts` times.
/// Returns the number of paint passes run.
pub fn settle(
    compositor: &mut HeadlessCompositor,
    max_bursts: usize,
) -> Result<usize, Error<Infallible>> {
    let mut passes = 0;
    for _ in 0..max_bursts {
        if pump(compositor)?.is_some() {
            passes += 1;
        }
        if compositor.service().pending_events() == 0 && !compositor.has_pending_damage() {
            break;
        }
    }
    Ok(passes)
}
