// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Accumulation of screen area that needs redrawing.
//!
//! The accumulator owns at most one service-side region. Damage only grows
//! by union until a paint pass [`consume`](DamageAccumulator::consume)s it.

use crate::geometry::ScreenRect;
use crate::id::RegionId;
use crate::ledger::Requests;
use crate::service::RenderService;
use crate::window::ManagedWindow;

/// Running union of regions that need redrawing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DamageAccumulator {
    pending: Option<RegionId>,
}

impl DamageAccumulator {
    /// Creates an accumulator with nothing pending.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a redraw is needed.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Merges `region` into the pending damage.
    ///
    /// Ownership of `region` passes to the accumulator: it is either adopted
    /// as the pending damage or destroyed after the union.
    pub fn add<S: RenderService>(
        &mut self,
        service: &mut S,
        region: RegionId,
    ) -> Result<(), S::Error> {
        match self.pending {
            Some(pending) => {
                service.union_region(pending, pending, region)?;
                service.destroy_region(region)?;
            }
            None => self.pending = Some(region),
        }
        Ok(())
    }

    /// Merges a list of rectangles into the pending damage.
    pub fn add_rects<S: RenderService>(
        &mut self,
        service: &mut S,
        rects: &[ScreenRect],
    ) -> Result<(), S::Error> {
        let region = service.create_region(rects)?;
        self.add(service, region)
    }

    /// Removes and returns the pending damage, or a region covering the whole
    /// `screen` when nothing is pending.
    ///
    /// The caller owns the returned region.
    pub fn consume<S: RenderService>(
        &mut self,
        service: &mut S,
        screen: ScreenRect,
    ) -> Result<RegionId, S::Error> {
        match self.pending.take() {
            Some(region) => Ok(region),
            None => service.create_region(&[screen]),
        }
    }

    /// Folds new content of `window` into the pending damage.
    ///
    /// The first damage after a map covers the whole window: its server-side
    /// record is discarded without fetching parts. Later damage adds only the
    /// modified parts, moved into screen coordinates.
    pub(crate) fn repair<S: RenderService>(
        &mut self,
        window: &mut ManagedWindow,
        req: &mut Requests<'_, S>,
    ) -> Result<(), S::Error> {
        let Some(damage) = window.damage else {
            return Ok(());
        };
        let parts = if window.damaged {
            let parts = req.service.create_region(&[])?;
            req.racy(|s| s.subtract_damage(damage, Some(parts)))?;
            let inner = window.geometry.inner();
            req.service.translate_region(parts, inner.x, inner.y)?;
            parts
        } else {
            let parts = req.service.create_region(&[window.geometry.extents()])?;
            req.racy(|s| s.subtract_damage(damage, None))?;
            parts
        };
        self.add(req.service, parts)?;
        window.damaged = true;
        Ok(())
    }

    /// Destroys the pending damage without painting it.
    pub fn clear<S: RenderService>(&mut self, service: &mut S) -> Result<(), S::Error> {
        if let Some(region) = self.pending.take() {
            service.destroy_region(region)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingService;

    #[test]
    fn first_region_is_adopted() {
        let mut service = RecordingService::default();
        let mut damage = DamageAccumulator::new();
        let r = service.create_region(&[ScreenRect::new(0, 0, 4, 4)]).unwrap();
        damage.add(&mut service, r).unwrap();
        let screen = ScreenRect::new(0, 0, 640, 480);
        assert_eq!(
            damage.consume(&mut service, screen).unwrap(),
            r,
            "no union needed for the first region"
        );
    }

    #[test]
    fn later_regions_are_unioned_and_consumed() {
        let mut service = RecordingService::default();
        let mut damage = DamageAccumulator::new();
        damage
            .add_rects(&mut service, &[ScreenRect::new(0, 0, 4, 4)])
            .unwrap();
        damage
            .add_rects(&mut service, &[ScreenRect::new(8, 8, 4, 4)])
            .unwrap();
        assert_eq!(service.live_regions(), 1, "the second input is destroyed");

        let region = damage
            .consume(&mut service, ScreenRect::new(0, 0, 640, 480))
            .unwrap();
        assert_eq!(service.region_rects(region).len(), 2);
        assert!(!damage.has_pending());
    }

    #[test]
    fn consume_without_pending_covers_screen() {
        let mut service = RecordingService::default();
        let mut damage = DamageAccumulator::new();
        let screen = ScreenRect::new(0, 0, 640, 480);

        let region = damage.consume(&mut service, screen).unwrap();
        assert_eq!(service.region_rects(region), [screen]);
        assert!(!damage.has_pending());
    }
}
