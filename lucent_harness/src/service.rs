// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`RenderService`] for the headless display.
//!
//! Every request bumps the sequence counter. Requests against resources that
//! no longer exist do not fail synchronously: like a real server, the
//! harness queues an [`Event::Error`](lucent_core::event::Event::Error)
//! carrying the sequence of the failed request.

use core::convert::Infallible;
use std::cell::RefCell;
use std::rc::Rc;

use lucent_core::error::ErrorCode;
use lucent_core::event::Event;
use lucent_core::geometry::{MapState, ScreenRect};
use lucent_core::id::{
    Atom, DamageId, PictureId, PixmapId, RegionId, Sequence, VisualId, WindowId,
};
use lucent_core::service::{
    Color, CompositeOp, Drawable, PictFormat, PictureOptions, Property, RenderService,
    StandardFormat, WindowAttributes,
};

use crate::region::Region;
use crate::server::{
    A8, ARGB32, ARGB_VISUAL, COMPOSITE_OPCODE, CompositeRecord, DamageObject, HeadlessService,
    Picture, RGB_VISUAL, RGB24, Target,
};
use crate::surface::{Rgba, Surface, TRANSPARENT, blend, pixels_of, premultiplied};

const SHAPE: u8 = 129;
const XFIXES: u8 = 138;
const RENDER: u8 = 139;
const DAMAGE: u8 = 143;

/// `(major, minor)` of every request that can fail asynchronously.
mod op {
    use super::{COMPOSITE_OPCODE, DAMAGE, RENDER, SHAPE, XFIXES};

    pub(super) const CHANGE_WINDOW_ATTRIBUTES: (u8, u16) = (2, 0);
    pub(super) const FREE_PIXMAP: (u8, u16) = (54, 0);
    pub(super) const CLEAR_AREA: (u8, u16) = (61, 0);
    pub(super) const SHAPE_SELECT_INPUT: (u8, u16) = (SHAPE, 6);
    pub(super) const REGION_FROM_WINDOW: (u8, u16) = (XFIXES, 7);
    pub(super) const DESTROY_REGION: (u8, u16) = (XFIXES, 10);
    pub(super) const COPY_REGION: (u8, u16) = (XFIXES, 12);
    pub(super) const UNION_REGION: (u8, u16) = (XFIXES, 13);
    pub(super) const INTERSECT_REGION: (u8, u16) = (XFIXES, 14);
    pub(super) const SUBTRACT_REGION: (u8, u16) = (XFIXES, 15);
    pub(super) const TRANSLATE_REGION: (u8, u16) = (XFIXES, 17);
    pub(super) const SET_PICTURE_CLIP: (u8, u16) = (XFIXES, 22);
    pub(super) const CREATE_PICTURE: (u8, u16) = (RENDER, 4);
    pub(super) const FREE_PICTURE: (u8, u16) = (RENDER, 7);
    pub(super) const COMPOSITE: (u8, u16) = (RENDER, 8);
    pub(super) const FILL_RECTANGLES: (u8, u16) = (RENDER, 26);
    pub(super) const NAME_WINDOW_PIXMAP: (u8, u16) = (COMPOSITE_OPCODE, 6);
    pub(super) const CREATE_DAMAGE: (u8, u16) = (DAMAGE, 1);
    pub(super) const DESTROY_DAMAGE: (u8, u16) = (DAMAGE, 2);
    pub(super) const SUBTRACT_DAMAGE: (u8, u16) = (DAMAGE, 3);
}

impl HeadlessService {
    fn issue(&mut self) {
        self.sequence += 1;
    }

    fn fail_op(&mut self, code: ErrorCode, (major, minor): (u8, u16)) {
        self.fail(code, major, minor);
    }

    fn region_or_fail(&mut self, id: RegionId, op: (u8, u16)) -> Option<Region> {
        let region = self.regions.get(&id).cloned();
        if region.is_none() {
            self.fail_op(ErrorCode::BadRegion, op);
        }
        region
    }

    fn picture_or_fail(&mut self, id: PictureId, op: (u8, u16)) -> Option<Picture> {
        let picture = self.pictures.get(&id).cloned();
        if picture.is_none() {
            self.fail_op(ErrorCode::BadPicture, op);
        }
        picture
    }

    /// Runs a binary region operation, `dst = f(a, b)`.
    fn region_op(
        &mut self,
        dst: RegionId,
        a: RegionId,
        b: RegionId,
        op: (u8, u16),
        f: impl FnOnce(&Region, &Region) -> Region,
    ) {
        self.issue();
        let (Some(a), Some(b)) = (self.region_or_fail(a, op), self.region_or_fail(b, op)) else {
            return;
        };
        match self.regions.get_mut(&dst) {
            Some(slot) => *slot = f(&a, &b),
            None => self.fail_op(ErrorCode::BadRegion, op),
        }
    }

    /// The surface a picture targets and the offset of the picture origin
    /// inside it. `None` once a target window is gone.
    fn resolve(&self, target: &Target) -> Option<(Rc<RefCell<Surface>>, i32)> {
        match target {
            Target::Window(w) => self
                .windows
                .get(w)
                .map(|w| (Rc::clone(&w.content), w.border_offset())),
            Target::Surface(s) => Some((Rc::clone(s), 0)),
        }
    }

    fn sampler(&self, picture: &Picture) -> impl Fn(i32, i32) -> Rgba + use<> {
        let resolved = self.resolve(&picture.target);
        let repeat = picture.repeat;
        let has_alpha = picture.format.has_alpha;
        move |x, y| {
            let Some((surface, offset)) = &resolved else {
                return TRANSPARENT;
            };
            let surface = surface.borrow();
            let pixel = if repeat {
                Some(surface.get_tiled(x + offset, y + offset))
            } else {
                surface.get(x + offset, y + offset)
            };
            match pixel {
                Some([r, g, b, _]) if !has_alpha => [r, g, b, 1.0],
                Some(p) => p,
                None => TRANSPARENT,
            }
        }
    }

    /// Writes `pixels` (destination-relative) into `dst` through its clip.
    /// Returns how many pixels were written.
    fn write(
        &self,
        dst: &Picture,
        op: CompositeOp,
        pixels: impl Iterator<Item = (i32, i32, Rgba, f32)>,
    ) -> usize {
        let Some((surface, offset)) = self.resolve(&dst.target) else {
            return 0;
        };
        let mut surface = surface.borrow_mut();
        let mut touched = 0;
        for (x, y, src, coverage) in pixels {
            if dst.clip.as_ref().is_some_and(|c| !c.contains(x, y)) {
                continue;
            }
            let Some(current) = surface.get(x + offset, y + offset) else {
                continue;
            };
            surface.set(x + offset, y + offset, blend(op, src, coverage, current));
            touched += 1;
        }
        touched
    }
}

impl RenderService for HeadlessService {
    type Error = Infallible;

    fn last_sequence(&self) -> Sequence {
        self.current()
    }

    fn create_region(&mut self, rects: &[ScreenRect]) -> Result<RegionId, Infallible> {
        self.issue();
        let id = RegionId(self.alloc_id());
        self.regions.insert(id, Region::from_rects(rects));
        Ok(id)
    }

    fn create_region_from_window(&mut self, window: WindowId) -> Result<RegionId, Infallible> {
        self.issue();
        let id = RegionId(self.alloc_id());
        match self.windows.get(&window).map(crate::server::WindowState::bounding) {
            Some(bounding) => {
                self.regions.insert(id, bounding);
            }
            None => self.fail_op(ErrorCode::Window, op::REGION_FROM_WINDOW),
        }
        Ok(id)
    }

    fn destroy_region(&mut self, region: RegionId) -> Result<(), Infallible> {
        self.issue();
        if self.regions.remove(&region).is_none() {
            self.fail_op(ErrorCode::BadRegion, op::DESTROY_REGION);
        }
        Ok(())
    }

    fn copy_region(&mut self, dst: RegionId, src: RegionId) -> Result<(), Infallible> {
        self.region_op(dst, src, src, op::COPY_REGION, |a, _| a.clone());
        Ok(())
    }

    fn union_region(&mut self, dst: RegionId, a: RegionId, b: RegionId) -> Result<(), Infallible> {
        self.region_op(dst, a, b, op::UNION_REGION, Region::union);
        Ok(())
    }

    fn subtract_region(
        &mut self,
        dst: RegionId,
        a: RegionId,
        b: RegionId,
    ) -> Result<(), Infallible> {
        self.region_op(dst, a, b, op::SUBTRACT_REGION, Region::subtract);
        Ok(())
    }

    fn intersect_region(
        &mut self,
        dst: RegionId,
        a: RegionId,
        b: RegionId,
    ) -> Result<(), Infallible> {
        self.region_op(dst, a, b, op::INTERSECT_REGION, Region::intersect);
        Ok(())
    }

    fn translate_region(&mut self, region: RegionId, dx: i32, dy: i32) -> Result<(), Infallible> {
        self.issue();
        match self.regions.get_mut(&region) {
            Some(r) => r.translate(dx, dy),
            None => self.fail_op(ErrorCode::BadRegion, op::TRANSLATE_REGION),
        }
        Ok(())
    }

    fn visual_format(&mut self, visual: VisualId) -> Result<Option<PictFormat>, Infallible> {
        Ok(match visual {
            RGB_VISUAL => Some(RGB24),
            ARGB_VISUAL => Some(ARGB32),
            _ => None,
        })
    }

    fn standard_format(&mut self, format: StandardFormat) -> Result<PictFormat, Infallible> {
        Ok(match format {
            StandardFormat::Argb32 => ARGB32,
            StandardFormat::A8 => A8,
        })
    }

    fn create_picture(
        &mut self,
        drawable: Drawable,
        format: PictFormat,
        options: PictureOptions,
    ) -> Result<PictureId, Infallible> {
        self.issue();
        let id = PictureId(self.alloc_id());
        let target = match drawable {
            Drawable::Window(w) => self.windows.contains_key(&w).then_some(Target::Window(w)),
            Drawable::Pixmap(p) => self.pixmaps.get(&p).cloned().map(Target::Surface),
        };
        match target {
            Some(target) => {
                self.pictures.insert(
                    id,
                    Picture {
                        drawable,
                        target,
                        format,
                        repeat: options.repeat,
                        clip: None,
                    },
                );
            }
            None => self.fail_op(ErrorCode::Drawable, op::CREATE_PICTURE),
        }
        Ok(id)
    }

    fn free_picture(&mut self, picture: PictureId) -> Result<(), Infallible> {
        self.issue();
        if self.pictures.remove(&picture).is_none() {
            self.fail_op(ErrorCode::BadPicture, op::FREE_PICTURE);
        }
        Ok(())
    }

    fn set_picture_clip(
        &mut self,
        picture: PictureId,
        clip: Option<RegionId>,
    ) -> Result<(), Infallible> {
        self.issue();
        let snapshot = match clip {
            Some(region) => match self.region_or_fail(region, op::SET_PICTURE_CLIP) {
                Some(r) => Some(r),
                None => return Ok(()),
            },
            None => None,
        };
        match self.pictures.get_mut(&picture) {
            Some(p) => p.clip = snapshot,
            None => self.fail_op(ErrorCode::BadPicture, op::SET_PICTURE_CLIP),
        }
        Ok(())
    }

    fn composite(
        &mut self,
        op: CompositeOp,
        src: PictureId,
        mask: Option<PictureId>,
        dst: PictureId,
        area: ScreenRect,
    ) -> Result<(), Infallible> {
        self.issue();
        let Some(source) = self.picture_or_fail(src, op::COMPOSITE) else {
            return Ok(());
        };
        let mask = match mask {
            Some(m) => match self.picture_or_fail(m, op::COMPOSITE) {
                Some(m) => Some(m),
                None => return Ok(()),
            },
            None => None,
        };
        let Some(target) = self.picture_or_fail(dst, op::COMPOSITE) else {
            return Ok(());
        };

        let sample_src = self.sampler(&source);
        let sample_mask = mask.as_ref().map(|m| self.sampler(m));
        let samples: Vec<_> = pixels_of(area)
            .map(|(x, y)| {
                let (sx, sy) = (x - area.x, y - area.y);
                let coverage = sample_mask.as_ref().map_or(1.0, |m| m(sx, sy)[3]);
                (x, y, sample_src(sx, sy), coverage)
            })
            .collect();
        let touched = self.write(&target, op, samples.into_iter());
        self.composites.push(CompositeRecord {
            source: source.drawable,
            dst,
            area,
            touched,
        });
        Ok(())
    }

    fn fill_rectangle(
        &mut self,
        op: CompositeOp,
        picture: PictureId,
        color: Color,
        rect: ScreenRect,
    ) -> Result<(), Infallible> {
        self.issue();
        let Some(target) = self.picture_or_fail(picture, op::FILL_RECTANGLES) else {
            return Ok(());
        };
        let pixel = premultiplied(color);
        self.write(&target, op, pixels_of(rect).map(|(x, y)| (x, y, pixel, 1.0)));
        Ok(())
    }

    fn create_pixmap(&mut self, width: u32, height: u32, _depth: u8) -> Result<PixmapId, Infallible> {
        self.issue();
        let id = PixmapId(self.alloc_id());
        self.pixmaps
            .insert(id, Rc::new(RefCell::new(Surface::filled(width, height, TRANSPARENT))));
        Ok(id)
    }

    fn free_pixmap(&mut self, pixmap: PixmapId) -> Result<(), Infallible> {
        self.issue();
        if self.pixmaps.remove(&pixmap).is_none() {
            self.fail_op(ErrorCode::Pixmap, op::FREE_PIXMAP);
        }
        Ok(())
    }

    fn name_window_pixmap(&mut self, window: WindowId) -> Result<Option<PixmapId>, Infallible> {
        if !self.named_pixmaps {
            return Ok(None);
        }
        self.issue();
        let id = PixmapId(self.alloc_id());
        let content = self
            .windows
            .get(&window)
            .filter(|w| w.attrs.map_state == MapState::Viewable)
            .map(|w| Rc::clone(&w.content));
        match content {
            Some(content) => {
                self.pixmaps.insert(id, content);
            }
            None => self.fail_op(ErrorCode::Match, op::NAME_WINDOW_PIXMAP),
        }
        Ok(Some(id))
    }

    fn window_attributes(
        &mut self,
        window: WindowId,
    ) -> Result<Option<WindowAttributes>, Infallible> {
        self.issue();
        Ok(self.windows.get(&window).map(|w| w.attrs))
    }

    fn query_tree(&mut self, window: WindowId) -> Result<Option<Vec<WindowId>>, Infallible> {
        self.issue();
        Ok(self.windows.get(&window).map(|w| w.children.clone()))
    }

    fn get_property(
        &mut self,
        window: WindowId,
        property: Atom,
        kind: Option<Atom>,
    ) -> Result<Property, Infallible> {
        self.issue();
        let value = self
            .windows
            .get(&window)
            .and_then(|w| w.properties.get(&property))
            .cloned();
        Ok(match value {
            Some(Property::Present { kind: actual, .. }) if kind.is_some_and(|k| k != actual) => {
                Property::Absent
            }
            Some(value) => value,
            None => Property::Absent,
        })
    }

    fn select_property_input(&mut self, window: WindowId, enable: bool) -> Result<(), Infallible> {
        self.issue();
        match self.windows.get_mut(&window) {
            Some(w) => w.property_events = enable,
            None => self.fail_op(ErrorCode::Window, op::CHANGE_WINDOW_ATTRIBUTES),
        }
        Ok(())
    }

    fn select_shape_input(&mut self, window: WindowId) -> Result<(), Infallible> {
        self.issue();
        match self.windows.get_mut(&window) {
            Some(w) => w.shape_events = true,
            None => self.fail_op(ErrorCode::Window, op::SHAPE_SELECT_INPUT),
        }
        Ok(())
    }

    fn clear_root(&mut self, root: WindowId) -> Result<(), Infallible> {
        self.issue();
        let Some(w) = self.windows.get(&root) else {
            self.fail_op(ErrorCode::Window, op::CLEAR_AREA);
            return Ok(());
        };
        let g = w.attrs.geometry;
        let rect = ScreenRect::new(0, 0, g.width, g.height);
        w.content.borrow_mut().fill(rect, w.fill);
        self.notify(Event::Expose {
            window: root,
            rect,
            count: 0,
        });
        Ok(())
    }

    fn create_damage(&mut self, window: WindowId) -> Result<DamageId, Infallible> {
        self.issue();
        let id = DamageId(self.alloc_id());
        let Some(w) = self.windows.get(&window) else {
            self.fail_op(ErrorCode::Window, op::CREATE_DAMAGE);
            return Ok(id);
        };
        let g = w.attrs.geometry;
        let viewable = w.attrs.map_state == MapState::Viewable;
        self.damages.insert(
            id,
            DamageObject {
                window,
                pending: Region::new(),
                reported: false,
            },
        );
        if viewable {
            let whole = Region::from_rects(&[ScreenRect::new(0, 0, g.width, g.height)]);
            self.report_damage(window, &whole);
        }
        Ok(id)
    }

    fn destroy_damage(&mut self, damage: DamageId) -> Result<(), Infallible> {
        self.issue();
        if self.damages.remove(&damage).is_none() {
            self.fail_op(ErrorCode::BadDamage, op::DESTROY_DAMAGE);
        }
        Ok(())
    }

    fn subtract_damage(
        &mut self,
        damage: DamageId,
        parts: Option<RegionId>,
    ) -> Result<(), Infallible> {
        self.issue();
        let Some(d) = self.damages.get_mut(&damage) else {
            self.fail_op(ErrorCode::BadDamage, op::SUBTRACT_DAMAGE);
            return Ok(());
        };
        let pending = core::mem::take(&mut d.pending);
        d.reported = false;
        if let Some(parts) = parts {
            match self.regions.get_mut(&parts) {
                Some(r) => *r = pending,
                None => self.fail_op(ErrorCode::BadRegion, op::SUBTRACT_DAMAGE),
            }
        }
        Ok(())
    }

    fn sync(&mut self) -> Result<(), Infallible> {
        self.issue();
        Ok(())
    }
}
