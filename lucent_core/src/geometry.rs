// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Screen-space rectangles and window geometry.

use kurbo::Rect;

/// An axis-aligned rectangle in screen pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ScreenRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ScreenRect {
    /// Creates a rectangle from its origin and size.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns `true` if the rectangle covers no pixels.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Converts to a `kurbo` rectangle for overlap math.
    #[must_use]
    pub fn to_kurbo(self) -> Rect {
        let x0 = f64::from(self.x);
        let y0 = f64::from(self.y);
        Rect::new(
            x0,
            y0,
            x0 + f64::from(self.width),
            y0 + f64::from(self.height),
        )
    }

    /// Returns a copy moved by `(dx, dy)`.
    #[must_use]
    pub const fn translated(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }
}

/// Whether a window is mapped, and if so whether all its ancestors are too.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MapState {
    /// Not mapped.
    #[default]
    Unmapped,
    /// Mapped, but an ancestor is not.
    Unviewable,
    /// Mapped and all ancestors mapped.
    Viewable,
}

/// Window class.
///
/// Input-only windows have no content and never get damage tracking.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WindowClass {
    /// Regular window with content.
    #[default]
    InputOutput,
    /// Input-only window.
    InputOnly,
}

/// Position, size and border of a window relative to the root.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Geometry {
    /// Left edge of the outer (border-inclusive) box.
    pub x: i32,
    /// Top edge of the outer (border-inclusive) box.
    pub y: i32,
    /// Inner width, excluding the border.
    pub width: u32,
    /// Inner height, excluding the border.
    pub height: u32,
    /// Border width on every side.
    pub border_width: u32,
}

impl Geometry {
    /// Border-inclusive screen area covered by the window.
    #[must_use]
    pub const fn extents(&self) -> ScreenRect {
        ScreenRect {
            x: self.x,
            y: self.y,
            width: self.width + self.border_width * 2,
            height: self.height + self.border_width * 2,
        }
    }

    /// Screen area of the window content inside the border.
    #[must_use]
    pub const fn inner(&self) -> ScreenRect {
        let bw = self.border_width as i32;
        ScreenRect {
            x: self.x + bw,
            y: self.y + bw,
            width: self.width,
            height: self.height,
        }
    }

    /// Returns `true` if the window content overlaps a `width` × `height`
    /// screen anchored at the origin.
    #[must_use]
    pub fn is_on_screen(&self, width: u32, height: u32) -> bool {
        let body = ScreenRect::new(self.x, self.y, self.width, self.height).to_kurbo();
        let screen = ScreenRect::new(0, 0, width, height).to_kurbo();
        !body.intersect(screen).is_zero_area()
    }

    /// Returns `true` if `other` has a different width or height.
    #[must_use]
    pub const fn size_differs(&self, other: &Self) -> bool {
        self.width != other.width || self.height != other.height
    }
}
