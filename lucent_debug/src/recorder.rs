// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records, each prefixed with a tag
//! and the microseconds elapsed since the recorder was created. [`decode`]
//! reads them back as an iterator of [`Record`].

use std::time::Instant;

use lucent_core::error::{ErrorCode, ProtocolError};
use lucent_core::id::{Sequence, WindowId};
use lucent_core::mode::Mode;
use lucent_core::trace::{
    ErrorEvent, PaintBeginEvent, PaintPhase, PaintSummary, TraceSink, WindowPaintEvent,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_PAINT_BEGIN: u8 = 1;
const TAG_WINDOW_PAINTED: u8 = 2;
const TAG_PAINT_END: u8 = 3;
const TAG_ERROR: u8 = 4;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug)]
pub struct RecorderSink {
    buf: Vec<u8>,
    start: Instant,
}

impl Default for RecorderSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecorderSink {
    /// Creates an empty recorder; timestamps count from now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            start: Instant::now(),
        }
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn header(&mut self, tag: u8) {
        let elapsed = u64::try_from(self.start.elapsed().as_micros()).unwrap_or(u64::MAX);
        self.write_u8(tag);
        self.write_u64(elapsed);
    }

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_mode(&mut self, m: Mode) {
        self.write_u8(match m {
            Mode::Solid => 0,
            Mode::Translucent => 1,
            Mode::Argb => 2,
        });
    }

    fn write_phase(&mut self, p: PaintPhase) {
        self.write_u8(match p {
            PaintPhase::Opaque => 0,
            PaintPhase::Blend => 1,
        });
    }

    fn write_code(&mut self, code: ErrorCode) {
        let (kind, raw) = match code {
            ErrorCode::Request => (1, 0),
            ErrorCode::Value => (2, 0),
            ErrorCode::Window => (3, 0),
            ErrorCode::Pixmap => (4, 0),
            ErrorCode::Atom => (5, 0),
            ErrorCode::Match => (8, 0),
            ErrorCode::Drawable => (9, 0),
            ErrorCode::Access => (10, 0),
            ErrorCode::Alloc => (11, 0),
            ErrorCode::IdChoice => (14, 0),
            ErrorCode::Implementation => (17, 0),
            ErrorCode::BadRegion => (100, 0),
            ErrorCode::BadDamage => (101, 0),
            ErrorCode::BadPictFormat => (102, 0),
            ErrorCode::BadPicture => (103, 0),
            ErrorCode::BadPictOp => (104, 0),
            ErrorCode::BadGlyphSet => (105, 0),
            ErrorCode::BadGlyph => (106, 0),
            ErrorCode::Other(raw) => (0, raw),
        };
        self.write_u8(kind);
        self.write_u8(raw);
    }
}

impl TraceSink for RecorderSink {
    fn on_paint_begin(&mut self, e: &PaintBeginEvent) {
        self.header(TAG_PAINT_BEGIN);
        self.write_u64(e.pass_index);
        self.write_u64(u64::try_from(e.windows).unwrap_or(u64::MAX));
        self.write_u8(u8::from(e.clip_changed));
    }

    fn on_window_painted(&mut self, e: &WindowPaintEvent) {
        self.header(TAG_WINDOW_PAINTED);
        self.write_u64(e.pass_index);
        self.write_u32(e.window.0);
        self.write_mode(e.mode);
        self.write_phase(e.phase);
    }

    fn on_paint_end(&mut self, s: &PaintSummary) {
        self.header(TAG_PAINT_END);
        self.write_u64(s.pass_index);
        self.write_u32(s.solid);
        self.write_u32(s.blended);
        self.write_u32(s.skipped);
    }

    fn on_error(&mut self, e: &ErrorEvent) {
        self.header(TAG_ERROR);
        self.write_u64(e.error.sequence.0);
        self.write_code(e.error.code);
        self.write_u8(e.error.major_opcode);
        self.write_u16(e.error.minor_opcode);
        self.write_u8(u8::from(e.suppressed));
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A [`PaintBeginEvent`].
    PaintBegin(PaintBeginEvent),
    /// A [`WindowPaintEvent`].
    WindowPainted(WindowPaintEvent),
    /// A [`PaintSummary`].
    PaintEnd(PaintSummary),
    /// An [`ErrorEvent`].
    Error(ErrorEvent),
}

/// One decoded event with its timestamp.
#[derive(Clone, Copy, Debug)]
pub struct Record {
    /// Microseconds since the recorder was created.
    pub at_us: u64,
    /// The event.
    pub event: RecordedEvent,
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`Record`].
///
/// Decoding stops at the first truncated record or unknown tag.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let end = self.pos.checked_add(N)?;
        let bytes = self.data.get(self.pos..end)?.try_into().ok()?;
        self.pos = end;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_u16(&mut self) -> Option<u16> {
        self.take().map(u16::from_le_bytes)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_mode(&mut self) -> Option<Mode> {
        Some(match self.read_u8()? {
            0 => Mode::Solid,
            1 => Mode::Translucent,
            _ => Mode::Argb,
        })
    }

    fn read_phase(&mut self) -> Option<PaintPhase> {
        Some(match self.read_u8()? {
            0 => PaintPhase::Opaque,
            _ => PaintPhase::Blend,
        })
    }

    fn read_code(&mut self) -> Option<ErrorCode> {
        let kind = self.read_u8()?;
        let raw = self.read_u8()?;
        Some(match kind {
            1 => ErrorCode::Request,
            2 => ErrorCode::Value,
            3 => ErrorCode::Window,
            4 => ErrorCode::Pixmap,
            5 => ErrorCode::Atom,
            8 => ErrorCode::Match,
            9 => ErrorCode::Drawable,
            10 => ErrorCode::Access,
            11 => ErrorCode::Alloc,
            14 => ErrorCode::IdChoice,
            17 => ErrorCode::Implementation,
            100 => ErrorCode::BadRegion,
            101 => ErrorCode::BadDamage,
            102 => ErrorCode::BadPictFormat,
            103 => ErrorCode::BadPicture,
            104 => ErrorCode::BadPictOp,
            105 => ErrorCode::BadGlyphSet,
            106 => ErrorCode::BadGlyph,
            _ => ErrorCode::Other(raw),
        })
    }

    fn decode_paint_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PaintBegin(PaintBeginEvent {
            pass_index: self.read_u64()?,
            windows: usize::try_from(self.read_u64()?).unwrap_or(usize::MAX),
            clip_changed: self.read_u8()? != 0,
        }))
    }

    fn decode_window_painted(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::WindowPainted(WindowPaintEvent {
            pass_index: self.read_u64()?,
            window: WindowId(self.read_u32()?),
            mode: self.read_mode()?,
            phase: self.read_phase()?,
        }))
    }

    fn decode_paint_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PaintEnd(PaintSummary {
            pass_index: self.read_u64()?,
            solid: self.read_u32()?,
            blended: self.read_u32()?,
            skipped: self.read_u32()?,
        }))
    }

    fn decode_error(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Error(ErrorEvent {
            error: ProtocolError {
                sequence: Sequence(self.read_u64()?),
                code: self.read_code()?,
                major_opcode: self.read_u8()?,
                minor_opcode: self.read_u16()?,
            },
            suppressed: self.read_u8()? != 0,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        let tag = self.read_u8()?;
        let at_us = self.read_u64()?;
        let event = match tag {
            TAG_PAINT_BEGIN => self.decode_paint_begin(),
            TAG_WINDOW_PAINTED => self.decode_window_painted(),
            TAG_PAINT_END => self.decode_paint_end(),
            TAG_ERROR => self.decode_error(),
            _ => None,
        }?;
        Some(Record { at_us, event })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_pass(sink: &mut RecorderSink) {
        sink.on_paint_begin(&PaintBeginEvent {
            pass_index: 1,
            windows: 3,
            clip_changed: true,
        });
        sink.on_window_painted(&WindowPaintEvent {
            pass_index: 1,
            window: WindowId(0x60_0003),
            mode: Mode::Argb,
            phase: PaintPhase::Blend,
        });
        sink.on_error(&ErrorEvent {
            error: ProtocolError {
                sequence: Sequence(0x1_0000_0004),
                code: ErrorCode::Other(200),
                major_opcode: 142,
                minor_opcode: 2,
            },
            suppressed: false,
        });
        sink.on_paint_end(&PaintSummary {
            pass_index: 1,
            solid: 1,
            blended: 1,
            skipped: 1,
        });
    }

    #[test]
    fn pass_decodes_in_order() {
        let mut sink = RecorderSink::new();
        record_pass(&mut sink);
        let records: Vec<Record> = decode(sink.as_bytes()).collect();
        assert_eq!(records.len(), 4, "every event decodes");

        assert!(
            matches!(
                records[0].event,
                RecordedEvent::PaintBegin(PaintBeginEvent { windows: 3, clip_changed: true, .. })
            ),
            "got {:?}",
            records[0]
        );
        let RecordedEvent::WindowPainted(w) = records[1].event else {
            panic!("expected window record, got {:?}", records[1]);
        };
        assert_eq!(w.window, WindowId(0x60_0003));
        assert_eq!(w.mode, Mode::Argb);
        assert_eq!(w.phase, PaintPhase::Blend);

        let RecordedEvent::Error(e) = records[2].event else {
            panic!("expected error record, got {:?}", records[2]);
        };
        assert_eq!(e.error.sequence, Sequence(0x1_0000_0004), "64-bit sequence kept");
        assert_eq!(e.error.code, ErrorCode::Other(200), "raw code kept");
        assert!(!e.suppressed, "flag kept");

        assert!(
            records.windows(2).all(|p| p[0].at_us <= p[1].at_us),
            "timestamps never go backwards"
        );
    }

    #[test]
    fn truncated_tail_is_dropped() {
        let mut sink = RecorderSink::new();
        record_pass(&mut sink);
        let bytes = sink.into_bytes();
        let cut = &bytes[..bytes.len() - 3];
        assert_eq!(decode(cut).count(), 3, "partial last record ignored");
    }

    #[test]
    fn unknown_tag_stops_decoding() {
        let mut bytes = vec![0xEE];
        bytes.extend_from_slice(&0_u64.to_le_bytes());
        assert_eq!(decode(&bytes).count(), 0, "unknown tag ends the stream");
    }
}
