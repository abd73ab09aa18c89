// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wire event translation.

use lucent_core::error::{ErrorCode, ProtocolError};
use lucent_core::event::{ConfigureNotify, Event, Place, ShapeKind, ShapeNotify};
use lucent_core::geometry::{Geometry, ScreenRect};
use lucent_core::id::{Atom, Sequence, WindowId};
use x11rb::protocol::shape::SK;
use x11rb::protocol::xproto;
use x11rb::protocol::{ErrorKind, Event as XEvent};

/// Converts a wire event into a compositor notification.
///
/// `sequence` is the full sequence number reported alongside the event.
/// Events the compositor has no use for yield `None`.
#[must_use]
pub fn translate(event: XEvent, sequence: u64) -> Option<Event> {
    let e = match event {
        XEvent::CreateNotify(e) => Event::Create {
            window: WindowId(e.window),
        },
        XEvent::DestroyNotify(e) => Event::Destroy {
            window: WindowId(e.window),
        },
        XEvent::MapNotify(e) => Event::Map {
            window: WindowId(e.window),
        },
        XEvent::UnmapNotify(e) => Event::Unmap {
            window: WindowId(e.window),
        },
        XEvent::ConfigureNotify(e) => Event::Configure(configure(&e)),
        XEvent::ReparentNotify(e) => Event::Reparent {
            window: WindowId(e.window),
            parent: WindowId(e.parent),
        },
        XEvent::CirculateNotify(e) => Event::Circulate {
            window: WindowId(e.window),
            place: if e.place == xproto::Place::ON_TOP {
                Place::OnTop
            } else {
                Place::OnBottom
            },
        },
        XEvent::Expose(e) => Event::Expose {
            window: WindowId(e.window),
            rect: rect(e.x.into(), e.y.into(), e.width, e.height),
            count: e.count,
        },
        XEvent::PropertyNotify(e) => Event::Property {
            window: WindowId(e.window),
            atom: Atom(e.atom),
        },
        XEvent::DamageNotify(e) => Event::Damage {
            window: WindowId(e.drawable),
        },
        XEvent::ShapeNotify(e) => Event::Shape(ShapeNotify {
            window: WindowId(e.affected_window),
            kind: match e.shape_kind {
                SK::BOUNDING => ShapeKind::Bounding,
                SK::CLIP => ShapeKind::Clip,
                _ => ShapeKind::Input,
            },
            shaped: e.shaped,
            bounds: rect(
                e.extents_x.into(),
                e.extents_y.into(),
                e.extents_width,
                e.extents_height,
            ),
        }),
        XEvent::Error(e) => Event::Error(ProtocolError {
            sequence: Sequence(sequence),
            code: error_code(e.error_kind, e.error_code),
            major_opcode: e.major_opcode,
            minor_opcode: e.minor_opcode,
        }),
        _ => return None,
    };
    Some(e)
}

fn configure(e: &xproto::ConfigureNotifyEvent) -> ConfigureNotify {
    ConfigureNotify {
        window: WindowId(e.window),
        geometry: Geometry {
            x: e.x.into(),
            y: e.y.into(),
            width: e.width.into(),
            height: e.height.into(),
            border_width: e.border_width.into(),
        },
        above: (e.above_sibling != x11rb::NONE).then_some(WindowId(e.above_sibling)),
        override_redirect: e.override_redirect,
    }
}

fn rect(x: i32, y: i32, width: u16, height: u16) -> ScreenRect {
    ScreenRect::new(x, y, width.into(), height.into())
}

/// Names a wire error; unrecognized kinds keep their raw code.
#[must_use]
pub fn error_code(kind: ErrorKind, raw: u8) -> ErrorCode {
    match kind {
        ErrorKind::Request => ErrorCode::Request,
        ErrorKind::Value => ErrorCode::Value,
        ErrorKind::Window => ErrorCode::Window,
        ErrorKind::Pixmap => ErrorCode::Pixmap,
        ErrorKind::Atom => ErrorCode::Atom,
        ErrorKind::Match => ErrorCode::Match,
        ErrorKind::Drawable => ErrorCode::Drawable,
        ErrorKind::Access => ErrorCode::Access,
        ErrorKind::Alloc => ErrorCode::Alloc,
        ErrorKind::IDChoice => ErrorCode::IdChoice,
        ErrorKind::Implementation => ErrorCode::Implementation,
        ErrorKind::XfixesBadRegion => ErrorCode::BadRegion,
        ErrorKind::DamageBadDamage => ErrorCode::BadDamage,
        ErrorKind::RenderPictFormat => ErrorCode::BadPictFormat,
        ErrorKind::RenderPicture => ErrorCode::BadPicture,
        ErrorKind::RenderPictOp => ErrorCode::BadPictOp,
        ErrorKind::RenderGlyphSet => ErrorCode::BadGlyphSet,
        ErrorKind::RenderGlyph => ErrorCode::BadGlyph,
        _ => ErrorCode::Other(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configure_without_sibling_has_no_above() {
        let e = xproto::ConfigureNotifyEvent {
            response_type: xproto::CONFIGURE_NOTIFY_EVENT,
            sequence: 9,
            event: 0x100,
            window: 0x40_0001,
            above_sibling: x11rb::NONE,
            x: -5,
            y: 10,
            width: 200,
            height: 100,
            border_width: 2,
            override_redirect: true,
        };
        let Some(Event::Configure(c)) = translate(XEvent::ConfigureNotify(e), 9) else {
            panic!("configure must translate");
        };
        assert_eq!(c.above, None, "NONE sibling means bottom of the stack");
        assert_eq!(c.geometry.x, -5);
        assert_eq!(c.geometry.extents().width, 204, "border on both sides");
        assert!(c.override_redirect, "flag carried over");
    }

    #[test]
    fn circulate_place_maps_to_top_or_bottom() {
        let e = xproto::CirculateNotifyEvent {
            response_type: xproto::CIRCULATE_NOTIFY_EVENT,
            sequence: 1,
            event: 0x100,
            window: 0x40_0002,
            place: xproto::Place::ON_BOTTOM,
        };
        assert_eq!(
            translate(XEvent::CirculateNotify(e), 1),
            Some(Event::Circulate {
                window: WindowId(0x40_0002),
                place: Place::OnBottom,
            })
        );
    }

    #[test]
    fn extension_errors_are_named() {
        assert_eq!(error_code(ErrorKind::RenderPicture, 143), ErrorCode::BadPicture);
        assert_eq!(error_code(ErrorKind::XfixesBadRegion, 140), ErrorCode::BadRegion);
        assert_eq!(error_code(ErrorKind::Unknown(201), 201), ErrorCode::Other(201));
    }

    #[test]
    fn uninteresting_events_are_dropped() {
        let e = xproto::FocusInEvent {
            response_type: xproto::FOCUS_IN_EVENT,
            detail: xproto::NotifyDetail::NONLINEAR,
            sequence: 0,
            event: 0x100,
            mode: xproto::NotifyMode::NORMAL,
        };
        assert_eq!(translate(XEvent::FocusIn(e), 0), None);
    }
}
