// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Software pixel storage and Porter-Duff math.

use lucent_core::geometry::ScreenRect;
use lucent_core::service::{Color, CompositeOp};

/// A premultiplied RGBA pixel with channels in `0.0..=1.0`.
pub type Rgba = [f32; 4];

/// Fully transparent black.
pub const TRANSPARENT: Rgba = [0.0; 4];

/// Converts a straight-alpha 16-bit color to a premultiplied pixel.
#[must_use]
pub fn premultiplied(color: Color) -> Rgba {
    let channel = |v: u16| f32::from(v) / f32::from(u16::MAX);
    let a = channel(color.alpha);
    [
        channel(color.red) * a,
        channel(color.green) * a,
        channel(color.blue) * a,
        a,
    ]
}

/// Applies `op` for one pixel: `src` scaled by `coverage` onto `dst`.
#[must_use]
pub fn blend(op: CompositeOp, src: Rgba, coverage: f32, dst: Rgba) -> Rgba {
    let s = src.map(|c| c * coverage);
    match op {
        CompositeOp::Src => s,
        CompositeOp::Over => {
            let keep = 1.0 - s[3];
            [
                s[0] + dst[0] * keep,
                s[1] + dst[1] * keep,
                s[2] + dst[2] * keep,
                s[3] + dst[3] * keep,
            ]
        }
    }
}

/// A rectangular grid of pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Surface {
    /// Creates a surface filled with `fill`.
    #[must_use]
    pub fn filled(width: u32, height: u32, fill: Rgba) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: vec![fill; len],
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < self.width as usize && y < self.height as usize)
            .then(|| y * self.width as usize + x)
    }

    /// Reads a pixel; `None` outside the surface.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<Rgba> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Reads a pixel, wrapping coordinates around the surface edges.
    #[must_use]
    pub fn get_tiled(&self, x: i32, y: i32) -> Rgba {
        if self.width == 0 || self.height == 0 {
            return TRANSPARENT;
        }
        let w = i64::from(self.width);
        let h = i64::from(self.height);
        let tx = i64::from(x).rem_euclid(w);
        let ty = i64::from(y).rem_euclid(h);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "rem_euclid keeps the value below the u32 dimensions"
        )]
        let i = (ty * w + tx) as usize;
        self.pixels[i]
    }

    /// Writes a pixel; out-of-bounds writes are dropped.
    pub fn set(&mut self, x: i32, y: i32, pixel: Rgba) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = pixel;
        }
    }

    /// Fills `rect` with `pixel`, clipped to the surface.
    pub fn fill(&mut self, rect: ScreenRect, pixel: Rgba) {
        for (x, y) in pixels_of(rect) {
            self.set(x, y, pixel);
        }
    }
}

/// Every pixel coordinate covered by `rect`, row by row.
pub fn pixels_of(rect: ScreenRect) -> impl Iterator<Item = (i32, i32)> {
    let w = i32::try_from(rect.width).unwrap_or(i32::MAX);
    let h = i32::try_from(rect.height).unwrap_or(i32::MAX);
    (rect.y..rect.y.saturating_add(h))
        .flat_map(move |y| (rect.x..rect.x.saturating_add(w)).map(move |x| (x, y)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Rgba, b: Rgba) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-4)
    }

    #[test]
    fn over_with_half_coverage() {
        let red = [1.0, 0.0, 0.0, 1.0];
        let green = [0.0, 1.0, 0.0, 1.0];
        let out = blend(CompositeOp::Over, green, 0.5, red);
        assert!(close(out, [0.5, 0.5, 0.0, 1.0]), "got {out:?}");
    }

    #[test]
    fn src_replaces() {
        let out = blend(CompositeOp::Src, [0.0, 0.0, 0.5, 0.5], 1.0, [1.0; 4]);
        assert!(close(out, [0.0, 0.0, 0.5, 0.5]), "got {out:?}");
    }

    #[test]
    fn tiled_reads_wrap() {
        let mut s = Surface::filled(2, 1, TRANSPARENT);
        s.set(1, 0, [1.0; 4]);
        assert_eq!(s.get_tiled(3, 5), [1.0; 4]);
        assert_eq!(s.get_tiled(-2, 0), TRANSPARENT);
        assert_eq!(s.get(2, 0), None, "outside");
    }

    #[test]
    fn premultiply_half_alpha() {
        let p = premultiplied(Color::new(u16::MAX, 0, 0, 0x8000));
        assert!((p[0] - p[3]).abs() < 1e-6, "red equals alpha when premultiplied");
    }
}
