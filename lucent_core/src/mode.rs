// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint-strategy classification.
//!
//! Every window is painted in one of three ways, decided purely by its visual
//! format and its opacity:
//!
//! | Format has alpha | Opacity | [`Mode`] |
//! |---|---|---|
//! | yes | any | [`Mode::Argb`] |
//! | no | below [`Opacity::OPAQUE`] | [`Mode::Translucent`] |
//! | no | [`Opacity::OPAQUE`] | [`Mode::Solid`] |

use crate::atoms::Atoms;
use crate::id::WindowId;
use crate::service::{PictFormat, RenderService};

/// How a window is composited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Opaque copy; occludes everything below it.
    #[default]
    Solid,
    /// Blended through a uniform alpha mask.
    Translucent,
    /// Blended using the window's own alpha channel.
    Argb,
}

impl Mode {
    /// Returns `true` if the window is blended rather than copied.
    #[must_use]
    pub const fn is_blended(self) -> bool {
        !matches!(self, Self::Solid)
    }
}

/// Window opacity as a fraction of [`Opacity::OPAQUE`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Opacity(pub u32);

impl Opacity {
    /// Fully opaque.
    pub const OPAQUE: Self = Self(u32::MAX);

    /// Opacity as a fraction in `0.0..=1.0`.
    #[must_use]
    pub fn fraction(self) -> f64 {
        f64::from(self.0) / f64::from(Self::OPAQUE.0)
    }

    /// Builds an opacity from a fraction, clamped to `0.0..=1.0`.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the fraction is clamped so the product fits in u32"
    )]
    pub fn from_fraction(fraction: f64) -> Self {
        Self((fraction.clamp(0.0, 1.0) * f64::from(Self::OPAQUE.0)) as u32)
    }

    /// Returns `true` for [`Opacity::OPAQUE`].
    #[must_use]
    pub const fn is_opaque(self) -> bool {
        self.0 == Self::OPAQUE.0
    }
}

impl Default for Opacity {
    fn default() -> Self {
        Self::OPAQUE
    }
}

/// Chooses the paint strategy for a window.
///
/// `format` is `None` for input-only windows and visuals without a picture
/// format.
#[must_use]
pub fn classify(format: Option<PictFormat>, opacity: Opacity) -> Mode {
    match format {
        Some(f) if f.has_alpha => Mode::Argb,
        _ if !opacity.is_opaque() => Mode::Translucent,
        _ => Mode::Solid,
    }
}

/// Reads the opacity property of `window`, falling back to `default` when it
/// is absent or malformed.
pub fn read_opacity<S: RenderService>(
    service: &mut S,
    atoms: &Atoms,
    window: WindowId,
    default: Opacity,
) -> Result<Opacity, S::Error> {
    let property = service.get_property(window, atoms.opacity, Some(atoms.cardinal))?;
    Ok(property.first_u32().map_or(default, Opacity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::FormatId;

    const RGB: PictFormat = PictFormat {
        id: FormatId(1),
        depth: 24,
        has_alpha: false,
    };
    const ARGB: PictFormat = PictFormat {
        id: FormatId(2),
        depth: 32,
        has_alpha: true,
    };

    #[test]
    fn opaque_without_alpha_is_solid() {
        assert_eq!(classify(Some(RGB), Opacity::OPAQUE), Mode::Solid);
        assert_eq!(classify(None, Opacity::OPAQUE), Mode::Solid);
    }

    #[test]
    fn half_opacity_is_translucent() {
        let half = Opacity(Opacity::OPAQUE.0 / 2);
        assert_eq!(classify(Some(RGB), half), Mode::Translucent);
        assert!((half.fraction() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn alpha_visual_is_argb_regardless_of_opacity() {
        assert_eq!(classify(Some(ARGB), Opacity::OPAQUE), Mode::Argb);
        assert_eq!(classify(Some(ARGB), Opacity(0)), Mode::Argb);
    }

    #[test]
    fn fraction_round_trips_at_the_ends() {
        assert_eq!(Opacity::from_fraction(1.0), Opacity::OPAQUE);
        assert_eq!(Opacity::from_fraction(-3.0), Opacity(0));
        assert!(Mode::Translucent.is_blended());
        assert!(!Mode::Solid.is_blended());
    }
}
