// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Protocol resource handles.
//!
//! Every resource the compositor names on the service side is a plain 32-bit
//! identifier wrapped in its own type so that a region can never be passed
//! where a picture is expected. Core code never interprets the values.

use core::fmt;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({:#x})"), self.0)
            }
        }
    };
}

handle!(
    /// A window on the display server.
    WindowId
);
handle!(
    /// A server-side region (a set of rectangles).
    RegionId
);
handle!(
    /// A drawable wrapped with a pixel format.
    PictureId
);
handle!(
    /// An off-screen drawable.
    PixmapId
);
handle!(
    /// A per-window damage tracking object.
    DamageId
);
handle!(
    /// An interned property name or type.
    Atom
);
handle!(
    /// A visual describing how a window's pixels are laid out.
    VisualId
);
handle!(
    /// A picture format.
    FormatId
);

/// Sequence number of a request issued to the service.
///
/// Sequences are extended to 64 bits by the backend and never wrap, so plain
/// ordering is meaningful.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Sequence(pub u64);

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sequence({})", self.0)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::format;

    use super::*;

    #[test]
    fn handles_debug_in_hex() {
        assert_eq!(format!("{:?}", WindowId(0x40_0001)), "WindowId(0x400001)");
        assert_eq!(format!("{:?}", RegionId(7)), "RegionId(0x7)");
    }

    #[test]
    fn handles_default_to_none() {
        assert_eq!(VisualId::default(), VisualId(0));
        assert_eq!(WindowId::default(), WindowId(0));
    }

    #[test]
    fn sequences_order_numerically() {
        assert!(Sequence(10) < Sequence(12));
        assert_eq!(format!("{}", Sequence(42)), "42");
    }
}
