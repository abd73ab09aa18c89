// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-window cached state and its single release path.

use crate::atoms::WindowType;
use crate::geometry::{Geometry, MapState, ScreenRect, WindowClass};
use crate::id::{DamageId, PictureId, PixmapId, RegionId, VisualId, WindowId};
use crate::ledger::Requests;
use crate::mode::{Mode, Opacity};
use crate::service::{RenderService, WindowAttributes};

/// Why cached resources are being released.
///
/// Each transition frees a fixed subset of a window's caches. All of them go
/// through [`ManagedWindow::release`], and every cache is an `Option` taken
/// on release, so releasing twice never frees a resource twice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transition {
    /// The window was unmapped: rendering and region caches go, and the
    /// last-known extents are handed back as damage.
    Unmap,
    /// The window left the registry: everything goes.
    Destroy,
    /// The window changed size: the named pixmap and its picture go.
    Resize,
    /// The paint mode may have changed: the alpha mask goes.
    Reclassify,
    /// Global clipping changed: region caches go.
    ClipChanged,
}

/// Lazily created service-side resources of one window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Resources {
    /// Named off-screen storage of the window.
    pub(crate) pixmap: Option<PixmapId>,
    /// Source picture for compositing.
    pub(crate) picture: Option<PictureId>,
    /// Uniform alpha mask for translucent painting.
    pub(crate) alpha_mask: Option<PictureId>,
    /// Bounding shape in screen coordinates.
    pub(crate) border_size: Option<RegionId>,
    /// Border-inclusive rectangle in screen coordinates.
    pub(crate) extents: Option<RegionId>,
    /// Damage left for this window after occlusion by windows above it.
    pub(crate) border_clip: Option<RegionId>,
}

/// A top-level window mirrored from the service.
#[derive(Clone, Debug)]
pub struct ManagedWindow {
    pub(crate) id: WindowId,
    pub(crate) geometry: Geometry,
    pub(crate) map_state: MapState,
    pub(crate) class: WindowClass,
    pub(crate) visual: VisualId,
    pub(crate) override_redirect: bool,
    pub(crate) shaped: bool,
    pub(crate) shape_bounds: ScreenRect,
    pub(crate) opacity: Opacity,
    pub(crate) mode: Mode,
    pub(crate) window_type: WindowType,
    pub(crate) damaged: bool,
    pub(crate) damage: Option<DamageId>,
    pub(crate) resources: Resources,
}

impl ManagedWindow {
    pub(crate) fn new(
        id: WindowId,
        attrs: WindowAttributes,
        damage: Option<DamageId>,
        window_type: WindowType,
    ) -> Self {
        let g = attrs.geometry;
        Self {
            id,
            geometry: g,
            map_state: attrs.map_state,
            class: attrs.class,
            visual: attrs.visual,
            override_redirect: attrs.override_redirect,
            shaped: false,
            shape_bounds: ScreenRect::new(g.x, g.y, g.width, g.height),
            opacity: Opacity::OPAQUE,
            mode: Mode::Solid,
            window_type,
            damaged: false,
            damage,
            resources: Resources::default(),
        }
    }

    /// Window identity.
    #[must_use]
    pub fn id(&self) -> WindowId {
        self.id
    }

    /// Last-known geometry.
    #[must_use]
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Last-known map state.
    #[must_use]
    pub fn map_state(&self) -> MapState {
        self.map_state
    }

    /// Window class.
    #[must_use]
    pub fn class(&self) -> WindowClass {
        self.class
    }

    /// Whether the window bypasses the window manager.
    #[must_use]
    pub fn override_redirect(&self) -> bool {
        self.override_redirect
    }

    /// Current opacity.
    #[must_use]
    pub fn opacity(&self) -> Opacity {
        self.opacity
    }

    /// Current paint mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// EWMH window type resolved when the window was added.
    #[must_use]
    pub fn window_type(&self) -> WindowType {
        self.window_type
    }

    /// Whether content has arrived since the window was last mapped.
    #[must_use]
    pub fn is_damaged(&self) -> bool {
        self.damaged
    }

    /// Whether the window has a non-rectangular bounding shape.
    #[must_use]
    pub fn is_shaped(&self) -> bool {
        self.shaped
    }

    /// Bounding box of the window shape in screen coordinates.
    #[must_use]
    pub fn shape_bounds(&self) -> ScreenRect {
        self.shape_bounds
    }

    /// Whether the window has a damage tracking object.
    #[must_use]
    pub fn tracks_damage(&self) -> bool {
        self.damage.is_some()
    }

    /// Whether a source picture is currently cached.
    #[must_use]
    pub fn has_picture(&self) -> bool {
        self.resources.picture.is_some()
    }

    /// Whether an alpha mask is currently cached.
    #[must_use]
    pub fn has_alpha_mask(&self) -> bool {
        self.resources.alpha_mask.is_some()
    }

    /// Whether the screen extents region is currently cached.
    #[must_use]
    pub fn has_extents(&self) -> bool {
        self.resources.extents.is_some()
    }

    /// Origin and size at which the source picture is composited.
    ///
    /// A named pixmap covers the border too, so it is drawn at the outer box;
    /// the window drawable itself starts inside the border.
    pub(crate) fn paint_area(&self) -> ScreenRect {
        if self.resources.pixmap.is_some() {
            self.geometry.extents()
        } else {
            self.geometry.inner()
        }
    }

    /// Frees the caches that `transition` invalidates.
    ///
    /// Requests that reference the window itself are registered as racy. On
    /// [`Transition::Unmap`] the cached extents are returned instead of being
    /// destroyed so the caller can add them to the pending damage.
    pub(crate) fn release<S: RenderService>(
        &mut self,
        transition: Transition,
        req: &mut Requests<'_, S>,
    ) -> Result<Option<RegionId>, S::Error> {
        let r = &mut self.resources;
        let mut extents = None;
        match transition {
            Transition::Unmap | Transition::Destroy => {
                self.damaged = false;
                if let Some(pixmap) = r.pixmap.take() {
                    req.service.free_pixmap(pixmap)?;
                }
                if let Some(picture) = r.picture.take() {
                    req.racy(|s| s.free_picture(picture))?;
                }
                if let Some(mask) = r.alpha_mask.take() {
                    req.service.free_picture(mask)?;
                }
                if let Some(border) = r.border_size.take() {
                    req.racy(|s| s.destroy_region(border))?;
                }
                if let Some(clip) = r.border_clip.take() {
                    req.service.destroy_region(clip)?;
                }
                if transition == Transition::Unmap {
                    extents = r.extents.take();
                    req.racy(|s| s.select_property_input(self.id, false))?;
                } else {
                    if let Some(region) = r.extents.take() {
                        req.service.destroy_region(region)?;
                    }
                    if let Some(damage) = self.damage.take() {
                        req.racy(|s| s.destroy_damage(damage))?;
                    }
                }
            }
            Transition::Resize => {
                if let Some(pixmap) = r.pixmap.take() {
                    req.service.free_pixmap(pixmap)?;
                    if let Some(picture) = r.picture.take() {
                        req.service.free_picture(picture)?;
                    }
                }
            }
            Transition::Reclassify => {
                if let Some(mask) = r.alpha_mask.take() {
                    req.service.free_picture(mask)?;
                }
            }
            Transition::ClipChanged => {
                if let Some(border) = r.border_size.take() {
                    req.racy(|s| s.destroy_region(border))?;
                }
                if let Some(region) = r.extents.take() {
                    req.service.destroy_region(region)?;
                }
                if let Some(clip) = r.border_clip.take() {
                    req.service.destroy_region(clip)?;
                }
            }
        }
        Ok(extents)
    }
}
