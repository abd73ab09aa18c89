// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable pretty-printing trace sink.

use std::fmt;
use std::io::Write;

use lucent_core::trace::{ErrorEvent, PaintBeginEvent, PaintSummary, TraceSink, WindowPaintEvent};

/// A [`TraceSink`] that writes one line per event to a writer.
///
/// Intended for development diagnostics. Output goes to stderr by default.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to the given boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to a concrete writer type.
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_paint_begin(&mut self, e: &PaintBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[paint:begin] pass={} windows={} clip_changed={}",
            e.pass_index, e.windows, e.clip_changed
        );
    }

    fn on_window_painted(&mut self, e: &WindowPaintEvent) {
        let _ = writeln!(
            self.writer,
            "[paint:window] pass={} window={:#x} mode={:?} phase={:?}",
            e.pass_index, e.window.0, e.mode, e.phase
        );
    }

    fn on_paint_end(&mut self, s: &PaintSummary) {
        let _ = writeln!(
            self.writer,
            "[paint:end] pass={} solid={} blended={} skipped={}",
            s.pass_index, s.solid, s.blended, s.skipped
        );
    }

    fn on_error(&mut self, e: &ErrorEvent) {
        let _ = writeln!(
            self.writer,
            "[error] {} suppressed={}",
            e.error, e.suppressed
        );
    }
}
