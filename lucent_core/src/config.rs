// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compositor configuration.

use crate::service::Color;

/// Tunables for a [`Compositor`](crate::compositor::Compositor).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompositorConfig {
    /// Color of the 1×1 tile used when no background property names a
    /// desktop pixmap.
    pub background: Color,
    /// Paint straight to the screen after blacking out the damaged area, so
    /// every repaint is visible.
    pub monitor_repaint: bool,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            background: Color::GREY,
            monitor_repaint: false,
        }
    }
}
