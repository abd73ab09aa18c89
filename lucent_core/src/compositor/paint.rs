// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One full-frame paint pass.
//!
//! The pass works on the damage region it is given:
//!
//! 1. After a clip change every window's region caches are dropped.
//! 2. The off-screen destination is created if needed.
//! 3. The visible root picture is clipped to the damage.
//! 4. Windows are walked from the top down. Solid windows are copied into
//!    the destination and their shape is cut out of the damage, so nothing
//!    below them (the background included) is painted there.
//! 5. The background fills what is left of the damage.
//! 6. Blended windows are composited from the bottom up, each clipped to the
//!    damage that was left when the top-down walk reached it.
//! 7. The destination is copied to the screen.

use alloc::vec::Vec;

use tracing::debug;

use super::Compositor;
use crate::geometry::{ScreenRect, WindowClass};
use crate::id::{PictureId, PixmapId, RegionId};
use crate::ledger::Requests;
use crate::mode::Mode;
use crate::service::{
    Color, CompositeOp, Drawable, PictureOptions, Property, RenderService, StandardFormat,
};
use crate::trace::{PaintBeginEvent, PaintPhase, PaintSummary, Tracer, WindowPaintEvent};
use crate::window::{ManagedWindow, Transition};

impl<S: RenderService> Compositor<S> {
    /// Paints `region` and destroys it.
    pub(crate) fn paint(
        &mut self,
        region: RegionId,
        tracer: &mut Tracer<'_>,
    ) -> Result<PaintSummary, S::Error> {
        let pass_index = self.pass_index;
        self.pass_index += 1;
        tracer.paint_begin(&PaintBeginEvent {
            pass_index,
            windows: self.registry.len(),
            clip_changed: self.clip_changed,
        });
        let mut summary = PaintSummary {
            pass_index,
            ..PaintSummary::default()
        };
        let screen = self.screen.rect();

        if self.clip_changed {
            let mut req = Requests::new(&mut self.service, &mut self.ledger);
            for window in self.registry.iter_mut() {
                window.release(Transition::ClipChanged, &mut req)?;
            }
        }

        let buffer = self.destination()?;
        self.service.set_picture_clip(self.root.picture, Some(region))?;
        if self.config.monitor_repaint {
            let black = match self.root.black {
                Some(black) => black,
                None => {
                    let black = solid_picture(&mut self.service, true, Color::BLACK)?;
                    self.root.black = Some(black);
                    black
                }
            };
            self.service
                .composite(CompositeOp::Src, black, None, self.root.picture, screen)?;
        }

        let mut retained = Vec::new();
        let mut req = Requests::new(&mut self.service, &mut self.ledger);
        for (index, window) in self.registry.iter_mut().enumerate() {
            if !window.damaged || !window.geometry.is_on_screen(screen.width, screen.height) {
                summary.skipped += 1;
                continue;
            }
            let Some(picture) = source_picture(window, self.caps.name_window_pixmap, &mut req)?
            else {
                summary.skipped += 1;
                continue;
            };
            let border_size = border_size(window, &mut req)?;
            if window.resources.extents.is_none() {
                window.resources.extents =
                    Some(req.service.create_region(&[window.geometry.extents()])?);
            }
            if window.resources.border_clip.is_none() {
                let clip = req.service.create_region(&[])?;
                req.service.copy_region(clip, region)?;
                req.service.intersect_region(clip, clip, border_size)?;
                window.resources.border_clip = Some(clip);
            }

            if window.mode == Mode::Solid {
                req.service.set_picture_clip(buffer, Some(region))?;
                req.racy(|s| s.subtract_region(region, region, border_size))?;
                let area = window.paint_area();
                req.racy(|s| s.composite(CompositeOp::Src, picture, None, buffer, area))?;
                summary.solid += 1;
                tracer.window_painted(&WindowPaintEvent {
                    pass_index,
                    window: window.id,
                    mode: window.mode,
                    phase: PaintPhase::Opaque,
                });
            }
            retained.push(index);
        }

        req.service.set_picture_clip(buffer, Some(region))?;
        let tile = self.root_tile()?;
        self.service
            .composite(CompositeOp::Src, tile, None, buffer, screen)?;

        let mut req = Requests::new(&mut self.service, &mut self.ledger);
        for &index in retained.iter().rev() {
            let Some(window) = self.registry.at_mut(index) else {
                continue;
            };
            let Some(clip) = window.resources.border_clip.take() else {
                continue;
            };
            if window.mode.is_blended()
                && let Some(picture) = window.resources.picture
            {
                req.service.set_picture_clip(buffer, Some(clip))?;
                let mask = alpha_mask(window, req.service)?;
                let area = window.paint_area();
                req.racy(|s| s.composite(CompositeOp::Over, picture, mask, buffer, area))?;
                summary.blended += 1;
                tracer.window_painted(&WindowPaintEvent {
                    pass_index,
                    window: window.id,
                    mode: window.mode,
                    phase: PaintPhase::Blend,
                });
            }
            req.service.destroy_region(clip)?;
        }

        self.service.destroy_region(region)?;
        if buffer != self.root.picture {
            self.service.set_picture_clip(buffer, None)?;
            self.service
                .composite(CompositeOp::Src, buffer, None, self.root.picture, screen)?;
        }
        debug!(
            pass = pass_index,
            solid = summary.solid,
            blended = summary.blended,
            skipped = summary.skipped,
            "paint pass"
        );
        tracer.paint_end(&summary);
        Ok(summary)
    }

    /// The picture the pass draws into: the screen itself when monitoring
    /// repaints, an off-screen buffer otherwise.
    fn destination(&mut self) -> Result<PictureId, S::Error> {
        if self.config.monitor_repaint {
            return Ok(self.root.picture);
        }
        if let Some(buffer) = self.root.buffer {
            return Ok(buffer);
        }
        let s = self.screen;
        let pixmap = self.service.create_pixmap(s.width, s.height, s.depth)?;
        let buffer = self.service.create_picture(
            Drawable::Pixmap(pixmap),
            s.format,
            PictureOptions::default(),
        )?;
        self.service.free_pixmap(pixmap)?;
        self.root.buffer = Some(buffer);
        Ok(buffer)
    }

    /// The desktop background as a repeating picture.
    ///
    /// Uses the first background property naming a single pixmap, or a 1×1
    /// tile of the configured color.
    fn root_tile(&mut self) -> Result<PictureId, S::Error> {
        if let Some(tile) = self.root.tile {
            return Ok(tile);
        }
        let repeat = PictureOptions {
            repeat: true,
            ..PictureOptions::default()
        };
        let root = self.screen.root;
        let mut named = None;
        for atom in self.atoms.background {
            if let Property::Present {
                kind,
                format: 32,
                values,
            } = self.service.get_property(root, atom, None)?
                && kind == self.atoms.pixmap
                && let [pixmap] = values[..]
            {
                named = Some(PixmapId(pixmap));
                break;
            }
        }
        let tile = match named {
            Some(pixmap) => {
                self.service
                    .create_picture(Drawable::Pixmap(pixmap), self.screen.format, repeat)?
            }
            None => {
                let pixmap = self.service.create_pixmap(1, 1, self.screen.depth)?;
                let tile = self.service.create_picture(
                    Drawable::Pixmap(pixmap),
                    self.screen.format,
                    repeat,
                )?;
                self.service.fill_rectangle(
                    CompositeOp::Src,
                    tile,
                    self.config.background,
                    ScreenRect::new(0, 0, 1, 1),
                )?;
                self.service.free_pixmap(pixmap)?;
                tile
            }
        };
        self.root.tile = Some(tile);
        Ok(tile)
    }
}

/// Returns the cached source picture of `window`, creating it if needed.
///
/// `None` when the window's visual has no picture format.
fn source_picture<S: RenderService>(
    window: &mut ManagedWindow,
    name_window_pixmap: bool,
    req: &mut Requests<'_, S>,
) -> Result<Option<PictureId>, S::Error> {
    if let Some(picture) = window.resources.picture {
        return Ok(Some(picture));
    }
    let format = match window.class {
        WindowClass::InputOnly => None,
        WindowClass::InputOutput => req.service.visual_format(window.visual)?,
    };
    let Some(format) = format else {
        return Ok(None);
    };
    let id = window.id;
    if name_window_pixmap && window.resources.pixmap.is_none() {
        window.resources.pixmap = req.racy(|s| s.name_window_pixmap(id))?;
    }
    let drawable = window
        .resources
        .pixmap
        .map_or(Drawable::Window(id), Drawable::Pixmap);
    let options = PictureOptions {
        include_inferiors: true,
        ..PictureOptions::default()
    };
    let picture = req.racy(|s| s.create_picture(drawable, format, options))?;
    window.resources.picture = Some(picture);
    Ok(Some(picture))
}

/// Returns the cached bounding region of `window` in screen coordinates.
fn border_size<S: RenderService>(
    window: &mut ManagedWindow,
    req: &mut Requests<'_, S>,
) -> Result<RegionId, S::Error> {
    if let Some(region) = window.resources.border_size {
        return Ok(region);
    }
    let id = window.id;
    let inner = window.geometry.inner();
    let region = req.racy(|s| s.create_region_from_window(id))?;
    req.racy(|s| s.translate_region(region, inner.x, inner.y))?;
    window.resources.border_size = Some(region);
    Ok(region)
}

/// Returns the uniform alpha mask of `window`, or `None` when it is opaque.
fn alpha_mask<S: RenderService>(
    window: &mut ManagedWindow,
    service: &mut S,
) -> Result<Option<PictureId>, S::Error> {
    if window.opacity.is_opaque() {
        return Ok(None);
    }
    if window.resources.alpha_mask.is_none() {
        let color = Color::from_fractions(window.opacity.fraction(), 0.0, 0.0, 0.0);
        window.resources.alpha_mask = Some(solid_picture(service, false, color)?);
    }
    Ok(window.resources.alpha_mask)
}

/// Creates a 1×1 repeating picture of `color`, with color channels when
/// `argb` is set and alpha only otherwise.
fn solid_picture<S: RenderService>(
    service: &mut S,
    argb: bool,
    color: Color,
) -> Result<PictureId, S::Error> {
    let (depth, standard) = if argb {
        (32, StandardFormat::Argb32)
    } else {
        (8, StandardFormat::A8)
    };
    let pixmap = service.create_pixmap(1, 1, depth)?;
    let format = service.standard_format(standard)?;
    let picture = service.create_picture(
        Drawable::Pixmap(pixmap),
        format,
        PictureOptions {
            repeat: true,
            ..PictureOptions::default()
        },
    )?;
    service.fill_rectangle(CompositeOp::Src, picture, color, ScreenRect::new(0, 0, 1, 1))?;
    service.free_pixmap(pixmap)?;
    Ok(picture)
}
