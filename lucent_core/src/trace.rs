// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Instrumentation hooks for paint passes and protocol failures.
//!
//! This module provides a [`TraceSink`] trait with one method per event the
//! compositor emits. All method bodies default to no-ops, so implementing
//! only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` enables the `Tracer` method bodies (one branch per call).

use crate::error::ProtocolError;
use crate::id::WindowId;
use crate::mode::Mode;

/// Which half of a paint pass drew a window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PaintPhase {
    /// Top-down opaque copy, before the background.
    Opaque,
    /// Bottom-up blend, after the background.
    Blend,
}

/// Emitted when a paint pass starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaintBeginEvent {
    /// Monotonic pass counter.
    pub pass_index: u64,
    /// Number of managed windows.
    pub windows: usize,
    /// Whether region caches were invalidated for this pass.
    pub clip_changed: bool,
}

/// Emitted for every window drawn during a pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowPaintEvent {
    /// Pass counter.
    pub pass_index: u64,
    /// The window drawn.
    pub window: WindowId,
    /// Its paint mode.
    pub mode: Mode,
    /// Which half of the pass drew it.
    pub phase: PaintPhase,
}

/// Emitted when a paint pass finishes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PaintSummary {
    /// Pass counter.
    pub pass_index: u64,
    /// Windows copied opaquely.
    pub solid: u32,
    /// Windows blended over the background.
    pub blended: u32,
    /// Windows skipped because they never received damage, are off screen,
    /// or have no usable picture format.
    pub skipped: u32,
}

/// Emitted for every asynchronous protocol failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ErrorEvent {
    /// The failure.
    pub error: ProtocolError,
    /// Whether it was expected and dropped.
    pub suppressed: bool,
}

/// Receives trace events from the compositor.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a paint pass starts.
    fn on_paint_begin(&mut self, e: &PaintBeginEvent) {
        _ = e;
    }

    /// Called for every window drawn.
    fn on_window_painted(&mut self, e: &WindowPaintEvent) {
        _ = e;
    }

    /// Called when a paint pass finishes.
    fn on_paint_end(&mut self, s: &PaintSummary) {
        _ = s;
    }

    /// Called for every asynchronous protocol failure.
    fn on_error(&mut self, e: &ErrorEvent) {
        _ = e;
    }
}

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`PaintBeginEvent`].
    #[inline]
    pub fn paint_begin(&mut self, e: &PaintBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_paint_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`WindowPaintEvent`].
    #[inline]
    pub fn window_painted(&mut self, e: &WindowPaintEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_window_painted(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PaintSummary`].
    #[inline]
    pub fn paint_end(&mut self, s: &PaintSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_paint_end(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits an [`ErrorEvent`].
    #[inline]
    pub fn error(&mut self, e: &ErrorEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_error(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}
