// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//! Each paint pass becomes a `B`/`E` span; painted windows and protocol
//! errors become instant events inside it.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{Record, RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let events: Vec<Value> = decode(bytes).map(to_json).collect();
    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn to_json(Record { at_us, event }: Record) -> Value {
    match event {
        RecordedEvent::PaintBegin(e) => json!({
            "ph": "B",
            "name": "Paint",
            "cat": "Paint",
            "ts": at_us,
            "pid": 0,
            "tid": 0,
            "args": {
                "pass_index": e.pass_index,
                "windows": e.windows,
                "clip_changed": e.clip_changed,
            }
        }),
        RecordedEvent::PaintEnd(s) => json!({
            "ph": "E",
            "name": "Paint",
            "cat": "Paint",
            "ts": at_us,
            "pid": 0,
            "tid": 0,
            "args": {
                "pass_index": s.pass_index,
                "solid": s.solid,
                "blended": s.blended,
                "skipped": s.skipped,
            }
        }),
        RecordedEvent::WindowPainted(e) => json!({
            "ph": "i",
            "name": format!("{:?}", e.phase),
            "cat": "Window",
            "ts": at_us,
            "pid": 0,
            "tid": 0,
            "s": "t",
            "args": {
                "pass_index": e.pass_index,
                "window": format!("{:#x}", e.window.0),
                "mode": format!("{:?}", e.mode),
            }
        }),
        RecordedEvent::Error(e) => json!({
            "ph": "i",
            "name": e.error.code.name(),
            "cat": "Error",
            "ts": at_us,
            "pid": 0,
            "tid": 0,
            "s": "g",
            "args": {
                "sequence": e.error.sequence.0,
                "major_opcode": e.error.major_opcode,
                "minor_opcode": e.error.minor_opcode,
                "suppressed": e.suppressed,
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use lucent_core::error::{ErrorCode, ProtocolError};
    use lucent_core::id::{Sequence, WindowId};
    use lucent_core::mode::Mode;
    use lucent_core::trace::{
        ErrorEvent, PaintBeginEvent, PaintPhase, PaintSummary, TraceSink, WindowPaintEvent,
    };

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_paint_begin(&PaintBeginEvent {
            pass_index: 0,
            windows: 1,
            clip_changed: false,
        });
        rec.on_window_painted(&WindowPaintEvent {
            pass_index: 0,
            window: WindowId(0x20_0001),
            mode: Mode::Solid,
            phase: PaintPhase::Opaque,
        });
        rec.on_error(&ErrorEvent {
            error: ProtocolError {
                sequence: Sequence(12),
                code: ErrorCode::Window,
                major_opcode: 3,
                minor_opcode: 0,
            },
            suppressed: true,
        });
        rec.on_paint_end(&PaintSummary {
            pass_index: 0,
            solid: 1,
            blended: 0,
            skipped: 0,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 4, "one object per event");

        assert_eq!(parsed[0]["ph"], "B", "pass opens a span");
        assert_eq!(parsed[1]["ph"], "i", "window is an instant");
        assert_eq!(parsed[1]["args"]["window"], "0x200001");
        assert_eq!(parsed[1]["args"]["mode"], "Solid");
        assert_eq!(parsed[2]["name"], "BadWindow");
        assert_eq!(parsed[2]["args"]["suppressed"], true);
        assert_eq!(parsed[3]["ph"], "E", "pass closes the span");
        assert_eq!(parsed[3]["args"]["solid"], 1);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty(), "no events in, none out");
    }
}
