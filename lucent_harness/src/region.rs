// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rectangle-list regions.

use kurbo::{Point, Rect, Vec2};
use lucent_core::geometry::ScreenRect;

/// A set of pixels stored as disjoint rectangles.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Region {
    rects: Vec<Rect>,
}

impl Region {
    /// The empty region.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The union of `rects`.
    #[must_use]
    pub fn from_rects(rects: &[ScreenRect]) -> Self {
        rects.iter().fold(Self::new(), |acc, r| {
            acc.union(&Self {
                rects: vec![r.to_kurbo()],
            })
        })
    }

    /// Returns `true` if the region covers no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Number of pixels covered.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.rects.iter().map(Rect::area).sum()
    }

    /// Returns `true` if pixel `(x, y)` is inside the region.
    #[must_use]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
        self.rects.iter().any(|r| r.contains(center))
    }

    /// `self ∪ other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut rects = self.rects.clone();
        rects.extend(other.subtract(self).rects);
        Self { rects }
    }

    /// `self − other`.
    #[must_use]
    pub fn subtract(&self, other: &Self) -> Self {
        let mut rects = self.rects.clone();
        for cut in &other.rects {
            rects = rects
                .into_iter()
                .flat_map(|r| subtract_rect(r, *cut))
                .collect();
        }
        Self { rects }
    }

    /// `self ∩ other`.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        let rects = self
            .rects
            .iter()
            .flat_map(|a| other.rects.iter().map(move |b| a.intersect(*b)))
            .filter(|r| !r.is_zero_area())
            .collect();
        Self { rects }
    }

    /// Moves the region by `(dx, dy)`.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        let offset = Vec2::new(f64::from(dx), f64::from(dy));
        for r in &mut self.rects {
            *r = *r + offset;
        }
    }

    /// Smallest rectangle containing the region.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.rects
            .iter()
            .copied()
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::ZERO)
    }
}

/// Splits `r − cut` into at most four rectangles.
fn subtract_rect(r: Rect, cut: Rect) -> Vec<Rect> {
    let i = r.intersect(cut);
    if i.is_zero_area() {
        return vec![r];
    }
    [
        Rect::new(r.x0, r.y0, r.x1, i.y0),
        Rect::new(r.x0, i.y1, r.x1, r.y1),
        Rect::new(r.x0, i.y0, i.x0, i.y1),
        Rect::new(i.x1, i.y0, r.x1, i.y1),
    ]
    .into_iter()
    .filter(|piece| !piece.is_zero_area())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: i32, y: i32, w: u32, h: u32) -> Region {
        Region::from_rects(&[ScreenRect::new(x, y, w, h)])
    }

    #[test]
    fn union_does_not_double_count_overlap() {
        let r = rect(0, 0, 10, 10).union(&rect(5, 5, 10, 10));
        assert_eq!(r.area(), 175.0, "100 + 100 - 25");
        assert!(r.contains(14, 14));
        assert!(!r.contains(14, 0));
    }

    #[test]
    fn subtract_cuts_a_hole() {
        let r = rect(0, 0, 10, 10).subtract(&rect(3, 3, 4, 4));
        assert_eq!(r.area(), 84.0);
        assert!(!r.contains(4, 4), "the hole is gone");
        assert!(r.contains(0, 0));
    }

    #[test]
    fn covering_subtract_empties() {
        let r = rect(2, 2, 4, 4).subtract(&rect(0, 0, 10, 10));
        assert!(r.is_empty(), "left {r:?}");
    }

    #[test]
    fn intersect_and_translate() {
        let mut r = rect(0, 0, 10, 10).intersect(&rect(5, 0, 10, 3));
        assert_eq!(r.bounds(), Rect::new(5.0, 0.0, 10.0, 3.0));
        r.translate(-5, 2);
        assert_eq!(r.bounds(), Rect::new(0.0, 2.0, 5.0, 5.0));
    }
}
