// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A bookkeeping-only service for unit tests.
//!
//! Regions are plain rectangle lists and nothing is drawn. Freeing a resource
//! that is not live panics, which is what the release tests rely on.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;
use core::convert::Infallible;

use crate::geometry::ScreenRect;
use crate::id::{Atom, DamageId, FormatId, PictureId, PixmapId, RegionId, Sequence, VisualId, WindowId};
use crate::service::{
    Color, CompositeOp, Drawable, PictFormat, PictureOptions, Property, RenderService,
    StandardFormat, WindowAttributes,
};

#[derive(Debug, Default)]
pub(crate) struct RecordingService {
    next_id: u32,
    sequence: u64,
    regions: BTreeMap<RegionId, Vec<ScreenRect>>,
    pictures: BTreeSet<PictureId>,
    pixmaps: BTreeSet<PixmapId>,
    damages: BTreeSet<DamageId>,
    pub(crate) windows: BTreeMap<WindowId, WindowAttributes>,
    pub(crate) properties: BTreeMap<(WindowId, Atom), Property>,
    pub(crate) composites: Vec<(CompositeOp, PictureId, ScreenRect)>,
}

impl RecordingService {
    fn issue(&mut self) -> u32 {
        self.sequence += 1;
        self.next_id += 1;
        self.next_id
    }

    pub(crate) fn live_regions(&self) -> usize {
        self.regions.len()
    }

    pub(crate) fn live_pictures(&self) -> usize {
        self.pictures.len()
    }

    pub(crate) fn live_damages(&self) -> usize {
        self.damages.len()
    }

    pub(crate) fn region_rects(&self, region: RegionId) -> Vec<ScreenRect> {
        self.regions[&region].clone()
    }
}

fn overlap(a: ScreenRect, b: ScreenRect) -> Option<ScreenRect> {
    let x0 = a.x.max(b.x);
    let y0 = a.y.max(b.y);
    let x1 = (a.x + a.width as i32).min(b.x + b.width as i32);
    let y1 = (a.y + a.height as i32).min(b.y + b.height as i32);
    (x1 > x0 && y1 > y0).then(|| ScreenRect::new(x0, y0, (x1 - x0) as u32, (y1 - y0) as u32))
}

impl RenderService for RecordingService {
    type Error = Infallible;

    fn last_sequence(&self) -> Sequence {
        Sequence(self.sequence)
    }

    fn create_region(&mut self, rects: &[ScreenRect]) -> Result<RegionId, Infallible> {
        let id = RegionId(self.issue());
        self.regions.insert(id, rects.iter().copied().filter(|r| !r.is_empty()).collect());
        Ok(id)
    }

    fn create_region_from_window(&mut self, window: WindowId) -> Result<RegionId, Infallible> {
        let g = self.windows.get(&window).map(|a| a.geometry).unwrap_or_default();
        let bw = g.border_width as i32;
        self.create_region(&[ScreenRect::new(-bw, -bw, g.extents().width, g.extents().height)])
    }

    fn destroy_region(&mut self, region: RegionId) -> Result<(), Infallible> {
        self.sequence += 1;
        assert!(self.regions.remove(&region).is_some(), "{region:?} is not live");
        Ok(())
    }

    fn copy_region(&mut self, dst: RegionId, src: RegionId) -> Result<(), Infallible> {
        self.sequence += 1;
        let rects = self.regions[&src].clone();
        self.regions.insert(dst, rects);
        Ok(())
    }

    fn union_region(&mut self, dst: RegionId, a: RegionId, b: RegionId) -> Result<(), Infallible> {
        self.sequence += 1;
        let mut rects = self.regions[&a].clone();
        rects.extend_from_slice(&self.regions[&b]);
        self.regions.insert(dst, rects);
        Ok(())
    }

    fn subtract_region(&mut self, dst: RegionId, a: RegionId, b: RegionId) -> Result<(), Infallible> {
        self.sequence += 1;
        let cut = self.regions[&b].clone();
        let rects = self.regions[&a]
            .iter()
            .copied()
            .filter(|r| !cut.iter().any(|c| overlap(*r, *c) == Some(*r)))
            .collect();
        self.regions.insert(dst, rects);
        Ok(())
    }

    fn intersect_region(&mut self, dst: RegionId, a: RegionId, b: RegionId) -> Result<(), Infallible> {
        self.sequence += 1;
        let mut rects = Vec::new();
        for ra in &self.regions[&a] {
            for rb in &self.regions[&b] {
                rects.extend(overlap(*ra, *rb));
            }
        }
        self.regions.insert(dst, rects);
        Ok(())
    }

    fn translate_region(&mut self, region: RegionId, dx: i32, dy: i32) -> Result<(), Infallible> {
        self.sequence += 1;
        if let Some(rects) = self.regions.get_mut(&region) {
            for r in rects {
                *r = r.translated(dx, dy);
            }
        }
        Ok(())
    }

    fn visual_format(&mut self, visual: VisualId) -> Result<Option<PictFormat>, Infallible> {
        Ok(Some(PictFormat {
            id: FormatId(visual.0),
            depth: if visual.0 == 32 { 32 } else { 24 },
            has_alpha: visual.0 == 32,
        }))
    }

    fn standard_format(&mut self, format: StandardFormat) -> Result<PictFormat, Infallible> {
        Ok(match format {
            StandardFormat::Argb32 => PictFormat {
                id: FormatId(32),
                depth: 32,
                has_alpha: true,
            },
            StandardFormat::A8 => PictFormat {
                id: FormatId(8),
                depth: 8,
                has_alpha: true,
            },
        })
    }

    fn create_picture(
        &mut self,
        _drawable: Drawable,
        _format: PictFormat,
        _options: PictureOptions,
    ) -> Result<PictureId, Infallible> {
        let id = PictureId(self.issue());
        self.pictures.insert(id);
        Ok(id)
    }

    fn free_picture(&mut self, picture: PictureId) -> Result<(), Infallible> {
        self.sequence += 1;
        assert!(self.pictures.remove(&picture), "{picture:?} is not live");
        Ok(())
    }

    fn set_picture_clip(&mut self, _picture: PictureId, _clip: Option<RegionId>) -> Result<(), Infallible> {
        self.sequence += 1;
        Ok(())
    }

    fn composite(
        &mut self,
        op: CompositeOp,
        src: PictureId,
        _mask: Option<PictureId>,
        _dst: PictureId,
        area: ScreenRect,
    ) -> Result<(), Infallible> {
        self.sequence += 1;
        self.composites.push((op, src, area));
        Ok(())
    }

    fn fill_rectangle(
        &mut self,
        _op: CompositeOp,
        _picture: PictureId,
        _color: Color,
        _rect: ScreenRect,
    ) -> Result<(), Infallible> {
        self.sequence += 1;
        Ok(())
    }

    fn create_pixmap(&mut self, _width: u32, _height: u32, _depth: u8) -> Result<PixmapId, Infallible> {
        let id = PixmapId(self.issue());
        self.pixmaps.insert(id);
        Ok(id)
    }

    fn free_pixmap(&mut self, pixmap: PixmapId) -> Result<(), Infallible> {
        self.sequence += 1;
        assert!(self.pixmaps.remove(&pixmap), "{pixmap:?} is not live");
        Ok(())
    }

    fn name_window_pixmap(&mut self, _window: WindowId) -> Result<Option<PixmapId>, Infallible> {
        let id = PixmapId(self.issue());
        self.pixmaps.insert(id);
        Ok(Some(id))
    }

    fn window_attributes(&mut self, window: WindowId) -> Result<Option<WindowAttributes>, Infallible> {
        self.sequence += 1;
        Ok(self.windows.get(&window).copied())
    }

    fn query_tree(&mut self, window: WindowId) -> Result<Option<Vec<WindowId>>, Infallible> {
        self.sequence += 1;
        Ok(self.windows.contains_key(&window).then(Vec::new))
    }

    fn get_property(&mut self, window: WindowId, property: Atom, _kind: Option<Atom>) -> Result<Property, Infallible> {
        self.sequence += 1;
        Ok(self
            .properties
            .get(&(window, property))
            .cloned()
            .unwrap_or(Property::Absent))
    }

    fn select_property_input(&mut self, _window: WindowId, _enable: bool) -> Result<(), Infallible> {
        self.sequence += 1;
        Ok(())
    }

    fn select_shape_input(&mut self, _window: WindowId) -> Result<(), Infallible> {
        self.sequence += 1;
        Ok(())
    }

    fn clear_root(&mut self, _root: WindowId) -> Result<(), Infallible> {
        self.sequence += 1;
        Ok(())
    }

    fn create_damage(&mut self, _window: WindowId) -> Result<DamageId, Infallible> {
        let id = DamageId(self.issue());
        self.damages.insert(id);
        Ok(id)
    }

    fn destroy_damage(&mut self, damage: DamageId) -> Result<(), Infallible> {
        self.sequence += 1;
        assert!(self.damages.remove(&damage), "{damage:?} is not live");
        Ok(())
    }

    fn subtract_damage(&mut self, _damage: DamageId, parts: Option<RegionId>) -> Result<(), Infallible> {
        self.sequence += 1;
        if let Some(parts) = parts {
            self.regions.insert(parts, Vec::new());
        }
        Ok(())
    }

    fn sync(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}
