// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`RenderService`] over an X11 connection.
//!
//! Requests are fire-and-forget: failures of individual requests come back
//! through the event queue as error events, carrying the full sequence
//! number of the request. Only the handful of queries the compositor needs a
//! reply for (attributes, tree, properties) wait for the server; an error
//! reply there means the window is gone.

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;

use lucent_core::geometry::{Geometry, MapState, ScreenRect, WindowClass};
use lucent_core::id::{
    Atom, DamageId, FormatId, PictureId, PixmapId, RegionId, Sequence, VisualId, WindowId,
};
use lucent_core::service::{
    Color, CompositeOp, Drawable, PictFormat, PictureOptions, Property, RenderService,
    StandardFormat, WindowAttributes,
};
use tracing::trace;
use x11rb::connection::Connection;
use x11rb::cookie::{Cookie, VoidCookie};
use x11rb::errors::ReplyError;
use x11rb::protocol::composite::ConnectionExt as _;
use x11rb::protocol::damage::{self, ConnectionExt as _};
use x11rb::protocol::render::{self, ConnectionExt as _, PictOp, PictType, Pictforminfo};
use x11rb::protocol::shape::{ConnectionExt as _, SK};
use x11rb::protocol::xfixes::ConnectionExt as _;
use x11rb::protocol::xproto::{self, ConnectionExt as _, Rectangle};
use x11rb::rust_connection::RustConnection;

use crate::error::BackendError;

/// Property reads stop after this many 32-bit units.
const PROPERTY_LENGTH: u32 = 1024;

// ---------------------------------------------------------------------------
// Picture formats
// ---------------------------------------------------------------------------

/// The server's picture formats and the visual-to-format mapping.
#[derive(Clone, Debug, Default)]
pub(crate) struct FormatTable {
    formats: Vec<Pictforminfo>,
    visuals: HashMap<u32, u32>,
}

impl FormatTable {
    pub(crate) fn new(reply: render::QueryPictFormatsReply) -> Self {
        let visuals = reply
            .screens
            .iter()
            .flat_map(|s| &s.depths)
            .flat_map(|d| &d.visuals)
            .map(|v| (v.visual, v.format))
            .collect();
        Self {
            formats: reply.formats,
            visuals,
        }
    }

    fn describe(info: &Pictforminfo) -> PictFormat {
        PictFormat {
            id: FormatId(info.id),
            depth: info.depth,
            has_alpha: info.type_ == PictType::DIRECT && info.direct.alpha_mask != 0,
        }
    }

    pub(crate) fn for_visual(&self, visual: VisualId) -> Option<PictFormat> {
        let id = *self.visuals.get(&visual.0)?;
        self.formats
            .iter()
            .find(|f| f.id == id)
            .map(Self::describe)
    }

    pub(crate) fn standard(&self, format: StandardFormat) -> Option<PictFormat> {
        self.formats
            .iter()
            .find(|f| {
                let d = &f.direct;
                f.type_ == PictType::DIRECT
                    && match format {
                        StandardFormat::Argb32 => {
                            f.depth == 32
                                && (d.alpha_shift, d.red_shift, d.green_shift, d.blue_shift)
                                    == (24, 16, 8, 0)
                                && (d.alpha_mask, d.red_mask, d.green_mask, d.blue_mask)
                                    == (0xff, 0xff, 0xff, 0xff)
                        }
                        StandardFormat::A8 => {
                            f.depth == 8
                                && d.alpha_mask == 0xff
                                && d.alpha_shift == 0
                                && (d.red_mask, d.green_mask, d.blue_mask) == (0, 0, 0)
                        }
                    }
            })
            .map(Self::describe)
    }
}

// ---------------------------------------------------------------------------
// X11Service
// ---------------------------------------------------------------------------

/// A [`RenderService`] speaking to an X server.
pub struct X11Service {
    conn: RustConnection,
    root: WindowId,
    formats: FormatTable,
    name_window_pixmap: bool,
    synchronous: bool,
    last: Cell<u64>,
}

impl fmt::Debug for X11Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("X11Service")
            .field("root", &self.root)
            .field("name_window_pixmap", &self.name_window_pixmap)
            .field("synchronous", &self.synchronous)
            .field("last", &self.last.get())
            .finish_non_exhaustive()
    }
}

impl X11Service {
    pub(crate) fn new(
        conn: RustConnection,
        root: WindowId,
        formats: FormatTable,
        name_window_pixmap: bool,
    ) -> Self {
        Self {
            conn,
            root,
            formats,
            name_window_pixmap,
            synchronous: false,
            last: Cell::new(0),
        }
    }

    /// The underlying connection.
    #[must_use]
    pub fn connection(&self) -> &RustConnection {
        &self.conn
    }

    /// Waits for the server after every request. Slow; for debugging.
    pub fn set_synchronous(&mut self, synchronous: bool) {
        self.synchronous = synchronous;
    }

    /// Records an issued request.
    fn void(&self, cookie: VoidCookie<'_, RustConnection>) -> Result<(), BackendError> {
        self.last.set(cookie.sequence_number());
        // Dropping the cookie routes a failure into the event queue.
        drop(cookie);
        if self.synchronous {
            self.round_trip()?;
        }
        Ok(())
    }

    fn round_trip(&self) -> Result<(), BackendError> {
        self.conn.get_input_focus()?.reply()?;
        Ok(())
    }

    fn id(&self) -> Result<u32, BackendError> {
        Ok(self.conn.generate_id()?)
    }

    /// Waits for a reply; an error reply means the resource is gone.
    fn answer<R>(&self, cookie: Cookie<'_, RustConnection, R>) -> Result<Option<R>, BackendError>
    where
        R: x11rb::x11_utils::TryParse,
    {
        let sequence = cookie.sequence_number();
        let reply = match cookie.reply() {
            Ok(reply) => Some(reply),
            Err(ReplyError::X11Error(e)) => {
                trace!(kind = ?e.error_kind, sequence, "query failed");
                None
            }
            Err(e) => return Err(e.into()),
        };
        self.last.set(sequence);
        Ok(reply)
    }
}

fn rectangle(r: ScreenRect) -> Rectangle {
    Rectangle {
        x: clamp_i16(r.x),
        y: clamp_i16(r.y),
        width: clamp_u16(r.width),
        height: clamp_u16(r.height),
    }
}

fn clamp_i16(v: i32) -> i16 {
    i16::try_from(v).unwrap_or(if v < 0 { i16::MIN } else { i16::MAX })
}

fn clamp_u16(v: u32) -> u16 {
    u16::try_from(v).unwrap_or(u16::MAX)
}

fn pict_op(op: CompositeOp) -> PictOp {
    match op {
        CompositeOp::Src => PictOp::SRC,
        CompositeOp::Over => PictOp::OVER,
    }
}

fn drawable(d: Drawable) -> u32 {
    match d {
        Drawable::Window(w) => w.0,
        Drawable::Pixmap(p) => p.0,
    }
}

fn map_state(s: xproto::MapState) -> MapState {
    match s {
        xproto::MapState::VIEWABLE => MapState::Viewable,
        xproto::MapState::UNVIEWABLE => MapState::Unviewable,
        _ => MapState::Unmapped,
    }
}

fn values(reply: &xproto::GetPropertyReply) -> Vec<u32> {
    match reply.format {
        8 => reply
            .value8()
            .map(|v| v.map(u32::from).collect())
            .unwrap_or_default(),
        16 => reply
            .value16()
            .map(|v| v.map(u32::from).collect())
            .unwrap_or_default(),
        _ => reply
            .value32()
            .map(Iterator::collect)
            .unwrap_or_default(),
    }
}

impl RenderService for X11Service {
    type Error = BackendError;

    fn last_sequence(&self) -> Sequence {
        Sequence(self.last.get())
    }

    // -- Regions --

    fn create_region(&mut self, rects: &[ScreenRect]) -> Result<RegionId, BackendError> {
        let id = self.id()?;
        let rects: Vec<Rectangle> = rects.iter().copied().map(rectangle).collect();
        let cookie = self.conn.xfixes_create_region(id, &rects)?;
        self.void(cookie)?;
        Ok(RegionId(id))
    }

    fn create_region_from_window(&mut self, window: WindowId) -> Result<RegionId, BackendError> {
        let id = self.id()?;
        let cookie = self
            .conn
            .xfixes_create_region_from_window(id, window.0, SK::BOUNDING)?;
        self.void(cookie)?;
        Ok(RegionId(id))
    }

    fn destroy_region(&mut self, region: RegionId) -> Result<(), BackendError> {
        let cookie = self.conn.xfixes_destroy_region(region.0)?;
        self.void(cookie)
    }

    fn copy_region(&mut self, dst: RegionId, src: RegionId) -> Result<(), BackendError> {
        let cookie = self.conn.xfixes_copy_region(src.0, dst.0)?;
        self.void(cookie)
    }

    fn union_region(&mut self, dst: RegionId, a: RegionId, b: RegionId) -> Result<(), BackendError> {
        let cookie = self.conn.xfixes_union_region(a.0, b.0, dst.0)?;
        self.void(cookie)
    }

    fn subtract_region(
        &mut self,
        dst: RegionId,
        a: RegionId,
        b: RegionId,
    ) -> Result<(), BackendError> {
        let cookie = self.conn.xfixes_subtract_region(a.0, b.0, dst.0)?;
        self.void(cookie)
    }

    fn intersect_region(
        &mut self,
        dst: RegionId,
        a: RegionId,
        b: RegionId,
    ) -> Result<(), BackendError> {
        let cookie = self.conn.xfixes_intersect_region(a.0, b.0, dst.0)?;
        self.void(cookie)
    }

    fn translate_region(&mut self, region: RegionId, dx: i32, dy: i32) -> Result<(), BackendError> {
        let cookie = self
            .conn
            .xfixes_translate_region(region.0, clamp_i16(dx), clamp_i16(dy))?;
        self.void(cookie)
    }

    // -- Formats --

    fn visual_format(&mut self, visual: VisualId) -> Result<Option<PictFormat>, BackendError> {
        Ok(self.formats.for_visual(visual))
    }

    fn standard_format(&mut self, format: StandardFormat) -> Result<PictFormat, BackendError> {
        self.formats
            .standard(format)
            .ok_or(BackendError::MissingCapability(match format {
                StandardFormat::Argb32 => "ARGB32 picture format",
                StandardFormat::A8 => "A8 picture format",
            }))
    }

    // -- Pictures --

    fn create_picture(
        &mut self,
        target: Drawable,
        format: PictFormat,
        options: PictureOptions,
    ) -> Result<PictureId, BackendError> {
        let id = self.id()?;
        let mut aux = render::CreatePictureAux::new();
        if options.repeat {
            aux = aux.repeat(render::Repeat::NORMAL);
        }
        if options.include_inferiors {
            aux = aux.subwindowmode(xproto::SubwindowMode::INCLUDE_INFERIORS);
        }
        let cookie = self
            .conn
            .render_create_picture(id, drawable(target), format.id.0, &aux)?;
        self.void(cookie)?;
        Ok(PictureId(id))
    }

    fn free_picture(&mut self, picture: PictureId) -> Result<(), BackendError> {
        let cookie = self.conn.render_free_picture(picture.0)?;
        self.void(cookie)
    }

    fn set_picture_clip(
        &mut self,
        picture: PictureId,
        clip: Option<RegionId>,
    ) -> Result<(), BackendError> {
        let region = clip.map_or(x11rb::NONE, |r| r.0);
        let cookie = self
            .conn
            .xfixes_set_picture_clip_region(picture.0, region, 0, 0)?;
        self.void(cookie)
    }

    fn composite(
        &mut self,
        op: CompositeOp,
        src: PictureId,
        mask: Option<PictureId>,
        dst: PictureId,
        area: ScreenRect,
    ) -> Result<(), BackendError> {
        let r = rectangle(area);
        let cookie = self.conn.render_composite(
            pict_op(op),
            src.0,
            mask.map_or(x11rb::NONE, |m| m.0),
            dst.0,
            0,
            0,
            0,
            0,
            r.x,
            r.y,
            r.width,
            r.height,
        )?;
        self.void(cookie)
    }

    fn fill_rectangle(
        &mut self,
        op: CompositeOp,
        picture: PictureId,
        color: Color,
        rect: ScreenRect,
    ) -> Result<(), BackendError> {
        let color = render::Color {
            red: color.red,
            green: color.green,
            blue: color.blue,
            alpha: color.alpha,
        };
        let cookie =
            self.conn
                .render_fill_rectangles(pict_op(op), picture.0, color, &[rectangle(rect)])?;
        self.void(cookie)
    }

    // -- Pixmaps --

    fn create_pixmap(&mut self, width: u32, height: u32, depth: u8) -> Result<PixmapId, BackendError> {
        let id = self.id()?;
        let cookie = self.conn.create_pixmap(
            depth,
            id,
            self.root.0,
            clamp_u16(width),
            clamp_u16(height),
        )?;
        self.void(cookie)?;
        Ok(PixmapId(id))
    }

    fn free_pixmap(&mut self, pixmap: PixmapId) -> Result<(), BackendError> {
        let cookie = self.conn.free_pixmap(pixmap.0)?;
        self.void(cookie)
    }

    fn name_window_pixmap(&mut self, window: WindowId) -> Result<Option<PixmapId>, BackendError> {
        if !self.name_window_pixmap {
            return Ok(None);
        }
        let id = self.id()?;
        let cookie = self.conn.composite_name_window_pixmap(window.0, id)?;
        self.void(cookie)?;
        Ok(Some(PixmapId(id)))
    }

    // -- Windows --

    fn window_attributes(
        &mut self,
        window: WindowId,
    ) -> Result<Option<WindowAttributes>, BackendError> {
        let attrs = self.conn.get_window_attributes(window.0)?;
        let geometry = self.conn.get_geometry(window.0)?;
        let (Some(attrs), Some(geometry)) = (self.answer(attrs)?, self.answer(geometry)?) else {
            return Ok(None);
        };
        Ok(Some(WindowAttributes {
            geometry: Geometry {
                x: geometry.x.into(),
                y: geometry.y.into(),
                width: geometry.width.into(),
                height: geometry.height.into(),
                border_width: geometry.border_width.into(),
            },
            map_state: map_state(attrs.map_state),
            class: if attrs.class == xproto::WindowClass::INPUT_ONLY {
                WindowClass::InputOnly
            } else {
                WindowClass::InputOutput
            },
            visual: VisualId(attrs.visual),
            override_redirect: attrs.override_redirect,
        }))
    }

    fn query_tree(&mut self, window: WindowId) -> Result<Option<Vec<WindowId>>, BackendError> {
        let cookie = self.conn.query_tree(window.0)?;
        Ok(self
            .answer(cookie)?
            .map(|tree| tree.children.into_iter().map(WindowId).collect()))
    }

    fn get_property(
        &mut self,
        window: WindowId,
        property: Atom,
        kind: Option<Atom>,
    ) -> Result<Property, BackendError> {
        let wanted = kind.map_or(u32::from(xproto::AtomEnum::ANY), |a| a.0);
        let cookie =
            self.conn
                .get_property(false, window.0, property.0, wanted, 0, PROPERTY_LENGTH)?;
        let Some(reply) = self.answer(cookie)? else {
            return Ok(Property::Absent);
        };
        if reply.type_ == x11rb::NONE || kind.is_some_and(|k| k.0 != reply.type_) {
            return Ok(Property::Absent);
        }
        Ok(Property::Present {
            kind: Atom(reply.type_),
            format: reply.format,
            values: values(&reply),
        })
    }

    fn select_property_input(&mut self, window: WindowId, enable: bool) -> Result<(), BackendError> {
        let mask = if enable {
            xproto::EventMask::PROPERTY_CHANGE
        } else {
            xproto::EventMask::NO_EVENT
        };
        let aux = xproto::ChangeWindowAttributesAux::new().event_mask(mask);
        let cookie = self.conn.change_window_attributes(window.0, &aux)?;
        self.void(cookie)
    }

    fn select_shape_input(&mut self, window: WindowId) -> Result<(), BackendError> {
        let cookie = self.conn.shape_select_input(window.0, true)?;
        self.void(cookie)
    }

    fn clear_root(&mut self, root: WindowId) -> Result<(), BackendError> {
        let cookie = self.conn.clear_area(true, root.0, 0, 0, 0, 0)?;
        self.void(cookie)
    }

    // -- Damage objects --

    fn create_damage(&mut self, window: WindowId) -> Result<DamageId, BackendError> {
        let id = self.id()?;
        let cookie = self
            .conn
            .damage_create(id, window.0, damage::ReportLevel::NON_EMPTY)?;
        self.void(cookie)?;
        Ok(DamageId(id))
    }

    fn destroy_damage(&mut self, damage: DamageId) -> Result<(), BackendError> {
        let cookie = self.conn.damage_destroy(damage.0)?;
        self.void(cookie)
    }

    fn subtract_damage(
        &mut self,
        damage: DamageId,
        parts: Option<RegionId>,
    ) -> Result<(), BackendError> {
        let parts = parts.map_or(x11rb::NONE, |r| r.0);
        let cookie = self.conn.damage_subtract(damage.0, x11rb::NONE, parts)?;
        self.void(cookie)
    }

    fn sync(&mut self) -> Result<(), BackendError> {
        self.conn.flush()?;
        let cookie = self.conn.get_input_focus()?;
        let sequence = cookie.sequence_number();
        cookie.reply()?;
        self.last.set(sequence);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(id: u32, depth: u8, alpha: (u16, u16), rgb_mask: u16) -> Pictforminfo {
        Pictforminfo {
            id,
            type_: PictType::DIRECT,
            depth,
            direct: render::Directformat {
                red_shift: 16,
                red_mask: rgb_mask,
                green_shift: 8,
                green_mask: rgb_mask,
                blue_shift: 0,
                blue_mask: rgb_mask,
                alpha_shift: alpha.0,
                alpha_mask: alpha.1,
            },
            colormap: x11rb::NONE,
        }
    }

    fn table() -> FormatTable {
        FormatTable {
            formats: vec![
                info(0x20, 24, (0, 0), 0xff),
                info(0x21, 32, (24, 0xff), 0xff),
                info(0x22, 8, (0, 0xff), 0),
            ],
            visuals: HashMap::from([(0x21, 0x20), (0x61, 0x21)]),
        }
    }

    #[test]
    fn visuals_resolve_to_formats() {
        let t = table();
        let rgb = t.for_visual(VisualId(0x21)).unwrap();
        assert_eq!(rgb.id, FormatId(0x20));
        assert!(!rgb.has_alpha, "depth 24 visual has no alpha");
        assert!(t.for_visual(VisualId(0x61)).unwrap().has_alpha, "argb visual");
        assert_eq!(t.for_visual(VisualId(0x99)), None, "unknown visual");
    }

    #[test]
    fn standard_formats_are_found_by_layout() {
        let t = table();
        assert_eq!(t.standard(StandardFormat::Argb32).unwrap().id, FormatId(0x21));
        assert_eq!(t.standard(StandardFormat::A8).unwrap().id, FormatId(0x22));
    }

    #[test]
    fn rectangles_saturate_at_the_wire_range() {
        let r = rectangle(ScreenRect::new(-40_000, 5, 70_000, 1));
        assert_eq!((r.x, r.y, r.width, r.height), (i16::MIN, 5, u16::MAX, 1));
    }
}
