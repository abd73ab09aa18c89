// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Notifications consumed by the event reactor.
//!
//! Backends translate their wire events into [`Event`] and hand each one to
//! [`Compositor::handle_event`](crate::compositor::Compositor::handle_event)
//! together with the sequence number it carries.

use crate::error::ProtocolError;
use crate::geometry::{Geometry, ScreenRect};
use crate::id::{Atom, WindowId};

/// Which end of the stack a circulated window moved to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Place {
    /// Raised above every sibling.
    OnTop,
    /// Lowered below every sibling.
    OnBottom,
}

/// Which shape of a window changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// The bounding shape.
    Bounding,
    /// The clip shape.
    Clip,
    /// The input shape; irrelevant for painting.
    Input,
}

/// A window was moved, resized, restacked or changed its border.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConfigureNotify {
    /// The window that changed.
    pub window: WindowId,
    /// New geometry.
    pub geometry: Geometry,
    /// Sibling the window now sits directly above; `None` at the bottom.
    pub above: Option<WindowId>,
    /// New override-redirect flag.
    pub override_redirect: bool,
}

/// A shape of a window changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShapeNotify {
    /// The window whose shape changed.
    pub window: WindowId,
    /// Which shape changed.
    pub kind: ShapeKind,
    /// Whether the window now has a non-default shape.
    pub shaped: bool,
    /// Extents of the new shape, relative to the window origin.
    pub bounds: ScreenRect,
}

/// A notification from the display service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// A top-level window was created.
    Create {
        /// The new window.
        window: WindowId,
    },
    /// A window was destroyed.
    Destroy {
        /// The destroyed window.
        window: WindowId,
    },
    /// A window was mapped.
    Map {
        /// The mapped window.
        window: WindowId,
    },
    /// A window was unmapped.
    Unmap {
        /// The unmapped window.
        window: WindowId,
    },
    /// A window's geometry or stacking changed.
    Configure(ConfigureNotify),
    /// A window was reparented.
    Reparent {
        /// The reparented window.
        window: WindowId,
        /// Its new parent.
        parent: WindowId,
    },
    /// A window was raised to the top or lowered to the bottom.
    Circulate {
        /// The moved window.
        window: WindowId,
        /// Where it went.
        place: Place,
    },
    /// Part of a window needs repainting.
    Expose {
        /// The exposed window.
        window: WindowId,
        /// The exposed rectangle.
        rect: ScreenRect,
        /// How many more expose events of this burst follow.
        count: u16,
    },
    /// A window property changed.
    Property {
        /// The window owning the property.
        window: WindowId,
        /// The property that changed.
        atom: Atom,
    },
    /// The content of a redirected window changed.
    Damage {
        /// The window whose content changed.
        window: WindowId,
    },
    /// A window's shape changed.
    Shape(ShapeNotify),
    /// A previously issued request failed.
    Error(ProtocolError),
}

impl Event {
    /// The window the event is about, if any.
    #[must_use]
    pub fn window(&self) -> Option<WindowId> {
        match *self {
            Self::Create { window }
            | Self::Destroy { window }
            | Self::Map { window }
            | Self::Unmap { window }
            | Self::Reparent { window, .. }
            | Self::Circulate { window, .. }
            | Self::Expose { window, .. }
            | Self::Property { window, .. }
            | Self::Damage { window } => Some(window),
            Self::Configure(c) => Some(c.window),
            Self::Shape(s) => Some(s.window),
            Self::Error(_) => None,
        }
    }
}
