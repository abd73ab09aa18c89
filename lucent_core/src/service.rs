// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract for the region and picture service.
//!
//! The compositor never draws or does region arithmetic itself. Every
//! operation is a request to a *service*: on a live display this is the X
//! server reached through XFixes, Render, Composite and Damage; in tests it is
//! a headless software rasterizer. Backends implement [`RenderService`].
//!
//! # Two kinds of failure
//!
//! - **Connection failures** are returned synchronously through
//!   [`RenderService::Error`]. They mean the service is gone and are always
//!   fatal to the caller.
//! - **Protocol failures** against a single resource (a window destroyed
//!   between the notification and our request, say) are *not* returned.
//!   They are delivered later as [`Event::Error`](crate::event::Event::Error)
//!   tagged with the [`Sequence`] of the failed request, which is why every
//!   request that may race against window destruction is registered in the
//!   [`SuppressionLedger`](crate::ledger::SuppressionLedger) right after it is
//!   issued.
//!
//! # Request pattern
//!
//! ```rust,ignore
//! let border = service.create_region_from_window(window)?;
//! ledger.expect(service.last_sequence());
//! ```

use alloc::vec::Vec;

use crate::geometry::{Geometry, MapState, ScreenRect, WindowClass};
use crate::id::{Atom, DamageId, FormatId, PictureId, PixmapId, RegionId, Sequence, VisualId, WindowId};

/// Something a picture can be created on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Drawable {
    /// A window, read including its inferiors.
    Window(WindowId),
    /// An off-screen pixmap.
    Pixmap(PixmapId),
}

/// A picture format as reported by the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PictFormat {
    /// Service-side identifier.
    pub id: FormatId,
    /// Bits per pixel of the underlying drawable.
    pub depth: u8,
    /// Whether the format carries a direct alpha channel.
    pub has_alpha: bool,
}

/// Well-known formats every service provides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StandardFormat {
    /// 32-bit ARGB.
    Argb32,
    /// 8-bit alpha only.
    A8,
}

/// Attributes applied when a picture is created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PictureOptions {
    /// Tile the drawable infinitely when sampled.
    pub repeat: bool,
    /// Include the contents of child windows.
    pub include_inferiors: bool,
}

/// Porter-Duff operator used by [`RenderService::composite`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompositeOp {
    /// Replace the destination with the source.
    Src,
    /// Blend the source over the destination.
    Over,
}

/// A 16-bit-per-channel color, not premultiplied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red.
    pub red: u16,
    /// Green.
    pub green: u16,
    /// Blue.
    pub blue: u16,
    /// Alpha.
    pub alpha: u16,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 0xffff);

    /// Opaque mid grey, the fallback desktop color.
    pub const GREY: Self = Self::new(0x8080, 0x8080, 0x8080, 0xffff);

    /// Creates a color from 16-bit channels.
    #[must_use]
    pub const fn new(red: u16, green: u16, blue: u16, alpha: u16) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates a color from fractional channels in `0.0..=1.0`.
    #[must_use]
    pub fn from_fractions(alpha: f64, red: f64, green: f64, blue: f64) -> Self {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "channels are clamped to the u16 range first"
        )]
        fn channel(v: f64) -> u16 {
            (v.clamp(0.0, 1.0) * f64::from(u16::MAX)) as u16
        }
        Self::new(channel(red), channel(green), channel(blue), channel(alpha))
    }
}

/// Result of a typed property read.
///
/// Absence is not an error: callers supply their own default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Property {
    /// The property does not exist or has a different type.
    Absent,
    /// The property exists. `values` may be empty.
    Present {
        /// Actual type of the property.
        kind: Atom,
        /// Element size in bits (8, 16 or 32).
        format: u8,
        /// Elements, widened to 32 bits.
        values: Vec<u32>,
    },
}

impl Property {
    /// Returns the first 32-bit element, if the property holds one.
    #[must_use]
    pub fn first_u32(&self) -> Option<u32> {
        match self {
            Self::Present {
                format: 32, values, ..
            } => values.first().copied(),
            _ => None,
        }
    }
}

/// Attributes of a window as fetched from the service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct WindowAttributes {
    /// Position, size and border.
    pub geometry: Geometry,
    /// Current map state.
    pub map_state: MapState,
    /// Input-output or input-only.
    pub class: WindowClass,
    /// Visual of the window content.
    pub visual: VisualId,
    /// Whether the window bypasses the window manager.
    pub override_redirect: bool,
}

/// The region and picture service the compositor drives.
///
/// Methods that create resources return the new handle immediately; the
/// service may still report an asynchronous failure for the request later.
pub trait RenderService {
    /// Connection-level failure.
    type Error: core::fmt::Debug + core::fmt::Display;

    /// Sequence number of the most recently issued request.
    fn last_sequence(&self) -> Sequence;

    // -- Regions --

    /// Creates a region covering `rects` (empty when `rects` is empty).
    fn create_region(&mut self, rects: &[ScreenRect]) -> Result<RegionId, Self::Error>;

    /// Creates a region from the bounding shape of `window`, relative to the
    /// window's inner origin (the border lies at negative coordinates).
    fn create_region_from_window(&mut self, window: WindowId) -> Result<RegionId, Self::Error>;

    /// Destroys a region.
    fn destroy_region(&mut self, region: RegionId) -> Result<(), Self::Error>;

    /// Replaces the contents of `dst` with those of `src`.
    fn copy_region(&mut self, dst: RegionId, src: RegionId) -> Result<(), Self::Error>;

    /// `dst = a ∪ b`.
    fn union_region(&mut self, dst: RegionId, a: RegionId, b: RegionId)
    -> Result<(), Self::Error>;

    /// `dst = a − b`.
    fn subtract_region(
        &mut self,
        dst: RegionId,
        a: RegionId,
        b: RegionId,
    ) -> Result<(), Self::Error>;

    /// `dst = a ∩ b`.
    fn intersect_region(
        &mut self,
        dst: RegionId,
        a: RegionId,
        b: RegionId,
    ) -> Result<(), Self::Error>;

    /// Moves a region by `(dx, dy)`.
    fn translate_region(&mut self, region: RegionId, dx: i32, dy: i32) -> Result<(), Self::Error>;

    // -- Formats --

    /// Looks up the picture format matching a visual.
    fn visual_format(&mut self, visual: VisualId) -> Result<Option<PictFormat>, Self::Error>;

    /// Returns one of the standard formats.
    fn standard_format(&mut self, format: StandardFormat) -> Result<PictFormat, Self::Error>;

    // -- Pictures --

    /// Creates a picture on `drawable`.
    fn create_picture(
        &mut self,
        drawable: Drawable,
        format: PictFormat,
        options: PictureOptions,
    ) -> Result<PictureId, Self::Error>;

    /// Frees a picture.
    fn free_picture(&mut self, picture: PictureId) -> Result<(), Self::Error>;

    /// Restricts drawing into `picture` to a snapshot of `clip`, or lifts the
    /// restriction when `clip` is `None`.
    fn set_picture_clip(
        &mut self,
        picture: PictureId,
        clip: Option<RegionId>,
    ) -> Result<(), Self::Error>;

    /// Composites `src` (optionally through `mask`) into `dst` at `area`.
    ///
    /// Source and mask are sampled from their own origin.
    fn composite(
        &mut self,
        op: CompositeOp,
        src: PictureId,
        mask: Option<PictureId>,
        dst: PictureId,
        area: ScreenRect,
    ) -> Result<(), Self::Error>;

    /// Fills `rect` of `picture` with a solid color.
    fn fill_rectangle(
        &mut self,
        op: CompositeOp,
        picture: PictureId,
        color: Color,
        rect: ScreenRect,
    ) -> Result<(), Self::Error>;

    // -- Pixmaps --

    /// Creates an off-screen pixmap on the root window's screen.
    fn create_pixmap(&mut self, width: u32, height: u32, depth: u8)
    -> Result<PixmapId, Self::Error>;

    /// Frees a pixmap. Pictures created on it stay valid.
    fn free_pixmap(&mut self, pixmap: PixmapId) -> Result<(), Self::Error>;

    /// Names the off-screen storage of a redirected window, or returns `None`
    /// when the service cannot do so.
    fn name_window_pixmap(&mut self, window: WindowId) -> Result<Option<PixmapId>, Self::Error>;

    // -- Windows --

    /// Fetches window attributes; `None` if the window is gone.
    fn window_attributes(
        &mut self,
        window: WindowId,
    ) -> Result<Option<WindowAttributes>, Self::Error>;

    /// Lists the children of `window` bottom-to-top; `None` if it is gone.
    fn query_tree(&mut self, window: WindowId) -> Result<Option<Vec<WindowId>>, Self::Error>;

    /// Reads a property, optionally requiring a specific type.
    fn get_property(
        &mut self,
        window: WindowId,
        property: Atom,
        kind: Option<Atom>,
    ) -> Result<Property, Self::Error>;

    /// Starts or stops listening for property changes on `window`.
    fn select_property_input(&mut self, window: WindowId, enable: bool)
    -> Result<(), Self::Error>;

    /// Starts listening for shape changes on `window`.
    fn select_shape_input(&mut self, window: WindowId) -> Result<(), Self::Error>;

    /// Clears the whole root window and generates expose notifications.
    fn clear_root(&mut self, root: WindowId) -> Result<(), Self::Error>;

    // -- Damage objects --

    /// Starts tracking content changes of `window`.
    fn create_damage(&mut self, window: WindowId) -> Result<DamageId, Self::Error>;

    /// Stops tracking content changes.
    fn destroy_damage(&mut self, damage: DamageId) -> Result<(), Self::Error>;

    /// Acknowledges all accumulated damage, storing it (window-relative) in
    /// `parts` when given.
    fn subtract_damage(
        &mut self,
        damage: DamageId,
        parts: Option<RegionId>,
    ) -> Result<(), Self::Error>;

    /// Waits until every issued request has been processed.
    fn sync(&mut self) -> Result<(), Self::Error>;
}
