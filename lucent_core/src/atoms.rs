// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interned atoms and window-type classification.

use crate::id::Atom;

/// Property holding a window's opacity as a 32-bit cardinal.
pub const OPACITY_PROPERTY: &str = "_NET_WM_WINDOW_OPACITY";

/// Root properties that may name the desktop background pixmap, in lookup
/// order.
pub const BACKGROUND_PROPERTIES: [&str; 2] = ["_XROOTPMAP_ID", "_XSETROOT_ID"];

/// The atoms the compositor needs, interned once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Atoms {
    /// `_NET_WM_WINDOW_OPACITY`.
    pub opacity: Atom,
    /// `_NET_WM_WINDOW_TYPE`.
    pub window_type: Atom,
    /// `_NET_WM_WINDOW_TYPE_DESKTOP`.
    pub type_desktop: Atom,
    /// `_NET_WM_WINDOW_TYPE_DOCK`.
    pub type_dock: Atom,
    /// `_NET_WM_WINDOW_TYPE_TOOLBAR`.
    pub type_toolbar: Atom,
    /// `_NET_WM_WINDOW_TYPE_MENU`.
    pub type_menu: Atom,
    /// `_NET_WM_WINDOW_TYPE_UTILITY`.
    pub type_utility: Atom,
    /// `_NET_WM_WINDOW_TYPE_SPLASH`.
    pub type_splash: Atom,
    /// `_NET_WM_WINDOW_TYPE_DIALOG`.
    pub type_dialog: Atom,
    /// `_NET_WM_WINDOW_TYPE_NORMAL`.
    pub type_normal: Atom,
    /// Background properties, in lookup order.
    pub background: [Atom; 2],
    /// The `PIXMAP` type.
    pub pixmap: Atom,
    /// The `CARDINAL` type.
    pub cardinal: Atom,
    /// The `ATOM` type.
    pub atom: Atom,
}

impl Atoms {
    /// Interns every atom through `intern`, which is called once per name.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `intern`.
    pub fn intern_with<E>(mut intern: impl FnMut(&'static str) -> Result<Atom, E>) -> Result<Self, E> {
        Ok(Self {
            opacity: intern(OPACITY_PROPERTY)?,
            window_type: intern("_NET_WM_WINDOW_TYPE")?,
            type_desktop: intern("_NET_WM_WINDOW_TYPE_DESKTOP")?,
            type_dock: intern("_NET_WM_WINDOW_TYPE_DOCK")?,
            type_toolbar: intern("_NET_WM_WINDOW_TYPE_TOOLBAR")?,
            type_menu: intern("_NET_WM_WINDOW_TYPE_MENU")?,
            type_utility: intern("_NET_WM_WINDOW_TYPE_UTILITY")?,
            type_splash: intern("_NET_WM_WINDOW_TYPE_SPLASH")?,
            type_dialog: intern("_NET_WM_WINDOW_TYPE_DIALOG")?,
            type_normal: intern("_NET_WM_WINDOW_TYPE_NORMAL")?,
            background: [
                intern(BACKGROUND_PROPERTIES[0])?,
                intern(BACKGROUND_PROPERTIES[1])?,
            ],
            pixmap: intern("PIXMAP")?,
            cardinal: intern("CARDINAL")?,
            atom: intern("ATOM")?,
        })
    }

    /// Returns `true` if `atom` is one of the background properties.
    #[must_use]
    pub fn is_background(&self, atom: Atom) -> bool {
        self.background.contains(&atom)
    }

    /// Maps a `_NET_WM_WINDOW_TYPE` value to a [`WindowType`].
    #[must_use]
    pub fn window_type_of(&self, atom: Atom) -> WindowType {
        match atom {
            a if a == self.type_desktop => WindowType::Desktop,
            a if a == self.type_dock => WindowType::Dock,
            a if a == self.type_toolbar => WindowType::Toolbar,
            a if a == self.type_menu => WindowType::Menu,
            a if a == self.type_utility => WindowType::Utility,
            a if a == self.type_splash => WindowType::Splash,
            a if a == self.type_dialog => WindowType::Dialog,
            a if a == self.type_normal => WindowType::Normal,
            other => WindowType::Other(other),
        }
    }
}

/// EWMH window type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WindowType {
    /// Desktop background window.
    Desktop,
    /// Panel or dock.
    Dock,
    /// Torn-off toolbar.
    Toolbar,
    /// Torn-off menu.
    Menu,
    /// Utility palette.
    Utility,
    /// Splash screen.
    Splash,
    /// Dialog.
    Dialog,
    /// Ordinary top-level window.
    #[default]
    Normal,
    /// A type atom the compositor does not know.
    Other(Atom),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequential() -> Atoms {
        let mut next = 0_u32;
        Atoms::intern_with(|_| -> Result<Atom, ()> {
            next += 1;
            Ok(Atom(next))
        })
        .unwrap()
    }

    #[test]
    fn interns_each_name_once() {
        let atoms = sequential();
        assert_eq!(atoms.opacity, Atom(1));
        assert_eq!(atoms.atom, Atom(15));
        assert!(atoms.is_background(atoms.background[1]));
        assert!(!atoms.is_background(atoms.opacity));
    }

    #[test]
    fn unknown_type_atoms_are_preserved() {
        let atoms = sequential();
        assert_eq!(atoms.window_type_of(atoms.type_dock), WindowType::Dock);
        assert_eq!(atoms.window_type_of(Atom(999)), WindowType::Other(Atom(999)));
    }
}
