// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Window bookkeeping driven by notifications.

use alloc::vec;

use tracing::debug;

use super::Compositor;
use crate::atoms::WindowType;
use crate::damage::DamageAccumulator;
use crate::event::{ConfigureNotify, Place, ShapeKind, ShapeNotify};
use crate::geometry::{MapState, ScreenRect, WindowClass};
use crate::id::{Atom, WindowId};
use crate::ledger::Requests;
use crate::mode::{Opacity, classify, read_opacity};
use crate::service::RenderService;
use crate::window::{ManagedWindow, StackPosition, Transition};

impl<S: RenderService> Compositor<S> {
    /// Starts managing `id` at `position`.
    ///
    /// A window that is already gone is dropped silently. Input-only windows
    /// get no damage tracking.
    pub(crate) fn add_window(
        &mut self,
        id: WindowId,
        position: StackPosition,
    ) -> Result<(), S::Error> {
        if self.registry.contains(id) {
            return Ok(());
        }
        let Some(attrs) = self.service.window_attributes(id)? else {
            debug!(window = ?id, "window vanished before it could be added");
            return Ok(());
        };

        let mut req = Requests::new(&mut self.service, &mut self.ledger);
        let damage = if attrs.class == WindowClass::InputOnly {
            None
        } else {
            let damage = req.racy(|s| s.create_damage(id))?;
            req.racy(|s| s.select_shape_input(id))?;
            Some(damage)
        };
        let window_type = self.resolve_window_type(id)?;

        self.registry
            .insert(ManagedWindow::new(id, attrs, damage, window_type), position);
        debug!(window = ?id, ?window_type, ?position, "window added");

        if attrs.map_state == MapState::Viewable {
            self.map_window(id)?;
        }
        Ok(())
    }

    /// Finds the EWMH type of `id`, falling back to the first typed
    /// descendant in depth-first order.
    fn resolve_window_type(&mut self, id: WindowId) -> Result<WindowType, S::Error> {
        let mut stack = vec![id];
        while let Some(window) = stack.pop() {
            let property =
                self.service
                    .get_property(window, self.atoms.window_type, Some(self.atoms.atom))?;
            if let Some(atom) = property.first_u32() {
                let kind = self.atoms.window_type_of(Atom(atom));
                if kind != WindowType::Normal {
                    return Ok(kind);
                }
            }
            if let Some(children) = self.service.query_tree(window)? {
                stack.extend(children.into_iter().rev());
            }
        }
        Ok(WindowType::Normal)
    }

    pub(crate) fn map_window(&mut self, id: WindowId) -> Result<(), S::Error> {
        let Some(window) = self.registry.get_mut(id) else {
            return Ok(());
        };
        window.map_state = MapState::Viewable;

        let mut req = Requests::new(&mut self.service, &mut self.ledger);
        // Property changes are only reported while selected, so re-read.
        req.racy(|s| s.select_property_input(id, true))?;
        window.opacity = read_opacity(req.service, &self.atoms, id, Opacity::OPAQUE)?;
        window.damaged = false;
        reclassify(window, &mut req, &mut self.damage)
    }

    pub(crate) fn unmap_window(&mut self, id: WindowId) -> Result<(), S::Error> {
        let Some(window) = self.registry.get_mut(id) else {
            return Ok(());
        };
        window.map_state = MapState::Unmapped;

        let mut req = Requests::new(&mut self.service, &mut self.ledger);
        if let Some(extents) = window.release(Transition::Unmap, &mut req)? {
            self.damage.add(req.service, extents)?;
        }
        self.clip_changed = true;
        Ok(())
    }

    /// Stops managing `id`. `gone` is set when the window itself was
    /// destroyed, which also runs the unmap transition.
    pub(crate) fn destroy_window(&mut self, id: WindowId, gone: bool) -> Result<(), S::Error> {
        let Some(mut window) = self.registry.remove(id) else {
            return Ok(());
        };
        let mut req = Requests::new(&mut self.service, &mut self.ledger);
        if gone {
            if let Some(extents) = window.release(Transition::Unmap, &mut req)? {
                self.damage.add(req.service, extents)?;
            }
            self.clip_changed = true;
        }
        window.release(Transition::Destroy, &mut req)?;
        debug!(window = ?id, gone, "window destroyed");
        Ok(())
    }

    pub(crate) fn configure(&mut self, c: ConfigureNotify) -> Result<(), S::Error> {
        if c.window == self.screen.root {
            if let Some(buffer) = self.root.buffer.take() {
                self.service.free_picture(buffer)?;
            }
            self.screen.width = c.geometry.width;
            self.screen.height = c.geometry.height;
            debug!(width = self.screen.width, height = self.screen.height, "screen resized");
            return Ok(());
        }
        let Some(window) = self.registry.get_mut(c.window) else {
            return Ok(());
        };

        let mut req = Requests::new(&mut self.service, &mut self.ledger);
        let damage = req.service.create_region(&[])?;
        if let Some(extents) = window.resources.extents {
            req.service.copy_region(damage, extents)?;
        }

        let old = window.geometry;
        let relative = window.shape_bounds.translated(-old.x, -old.y);
        window.geometry = c.geometry;
        window.override_redirect = c.override_redirect;
        if old.size_differs(&c.geometry) {
            window.release(Transition::Resize, &mut req)?;
        }
        window.release(Transition::ClipChanged, &mut req)?;

        let extents = req.service.create_region(&[c.geometry.extents()])?;
        req.service.union_region(damage, damage, extents)?;
        req.service.destroy_region(extents)?;
        self.damage.add(req.service, damage)?;

        window.shape_bounds = relative.translated(c.geometry.x, c.geometry.y);
        if !window.shaped {
            window.shape_bounds.width = c.geometry.width;
            window.shape_bounds.height = c.geometry.height;
        }

        let position = c.above.map_or(StackPosition::Bottom, StackPosition::Above);
        self.registry.restack(c.window, position);
        self.clip_changed = true;
        Ok(())
    }

    pub(crate) fn circulate(&mut self, id: WindowId, place: Place) {
        let position = match place {
            Place::OnTop => StackPosition::Top,
            Place::OnBottom => StackPosition::Bottom,
        };
        if self.registry.contains(id) {
            self.registry.restack(id, position);
            self.clip_changed = true;
        }
    }

    pub(crate) fn reparent(&mut self, id: WindowId, parent: WindowId) -> Result<(), S::Error> {
        if parent == self.screen.root {
            self.add_window(id, StackPosition::Top)
        } else {
            self.destroy_window(id, false)
        }
    }

    /// Buffers root exposures until the last rectangle of the burst.
    pub(crate) fn expose(
        &mut self,
        id: WindowId,
        rect: ScreenRect,
        count: u16,
    ) -> Result<(), S::Error> {
        if id != self.screen.root {
            return Ok(());
        }
        self.expose.push(rect);
        if count == 0 {
            self.damage.add_rects(&mut self.service, &self.expose)?;
            self.expose.clear();
        }
        Ok(())
    }

    pub(crate) fn property(&mut self, id: WindowId, atom: Atom) -> Result<(), S::Error> {
        if id == self.screen.root
            && self.atoms.is_background(atom)
            && let Some(tile) = self.root.tile.take()
        {
            self.service.clear_root(self.screen.root)?;
            self.service.free_picture(tile)?;
            debug!("background changed");
        }
        if atom == self.atoms.opacity {
            let Some(window) = self.registry.get_mut(id) else {
                return Ok(());
            };
            let mut req = Requests::new(&mut self.service, &mut self.ledger);
            window.opacity = read_opacity(req.service, &self.atoms, id, Opacity::OPAQUE)?;
            reclassify(window, &mut req, &mut self.damage)?;
        }
        Ok(())
    }

    pub(crate) fn damage_notify(&mut self, id: WindowId) -> Result<(), S::Error> {
        let Some(window) = self.registry.get_mut(id) else {
            return Ok(());
        };
        let mut req = Requests::new(&mut self.service, &mut self.ledger);
        self.damage.repair(window, &mut req)
    }

    /// Records the new shape and damages both the old and new bounds.
    pub(crate) fn shape(&mut self, s: ShapeNotify) -> Result<(), S::Error> {
        if s.kind == ShapeKind::Input {
            return Ok(());
        }
        let Some(window) = self.registry.get_mut(s.window) else {
            return Ok(());
        };
        let old = window.shape_bounds;
        let g = window.geometry;
        window.shaped = s.shaped;
        window.shape_bounds = if s.shaped {
            s.bounds.translated(g.x, g.y)
        } else {
            ScreenRect::new(g.x, g.y, g.width, g.height)
        };
        let new = window.shape_bounds;
        self.clip_changed = true;
        self.damage.add_rects(&mut self.service, &[old, new])
    }
}

/// Recomputes the paint mode of `window` and damages its known extents.
fn reclassify<S: RenderService>(
    window: &mut ManagedWindow,
    req: &mut Requests<'_, S>,
    damage: &mut DamageAccumulator,
) -> Result<(), S::Error> {
    window.release(Transition::Reclassify, req)?;
    let format = match window.class {
        WindowClass::InputOnly => None,
        WindowClass::InputOutput => req.service.visual_format(window.visual)?,
    };
    window.mode = classify(format, window.opacity);
    if let Some(extents) = window.resources.extents {
        let region = req.service.create_region(&[])?;
        req.service.copy_region(region, extents)?;
        damage.add(req.service, region)?;
    }
    Ok(())
}
