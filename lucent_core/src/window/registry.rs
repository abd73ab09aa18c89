// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stacking-ordered window store.

use alloc::vec::Vec;

use crate::id::WindowId;

use super::ManagedWindow;

/// Where a window goes in the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StackPosition {
    /// Above every other window.
    Top,
    /// Below every other window.
    Bottom,
    /// Directly above the given sibling.
    Above(WindowId),
}

/// Managed windows in stacking order, topmost first.
///
/// Lookups are linear; a screen rarely holds more than a few hundred
/// top-level windows.
#[derive(Clone, Debug, Default)]
pub struct WindowRegistry {
    windows: Vec<ManagedWindow>,
}

impl WindowRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of managed windows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Returns `true` if no window is managed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Index of `id`, counting from the top.
    #[must_use]
    pub fn position(&self, id: WindowId) -> Option<usize> {
        self.windows.iter().position(|w| w.id == id)
    }

    /// Returns `true` if `id` is managed.
    #[must_use]
    pub fn contains(&self, id: WindowId) -> bool {
        self.position(id).is_some()
    }

    /// Looks up a window.
    #[must_use]
    pub fn get(&self, id: WindowId) -> Option<&ManagedWindow> {
        self.windows.iter().find(|w| w.id == id)
    }

    /// Looks up a window for mutation.
    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut ManagedWindow> {
        self.windows.iter_mut().find(|w| w.id == id)
    }

    /// Windows from the top of the stack down.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ManagedWindow> {
        self.windows.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut ManagedWindow> {
        self.windows.iter_mut()
    }

    /// Window ids from the top of the stack down.
    #[must_use]
    pub fn ids(&self) -> Vec<WindowId> {
        self.windows.iter().map(|w| w.id).collect()
    }

    /// Resolves `position` to an insertion index. `None` for an unknown
    /// sibling.
    fn index_for(&self, position: StackPosition) -> Option<usize> {
        match position {
            StackPosition::Top => Some(0),
            StackPosition::Bottom => Some(self.windows.len()),
            StackPosition::Above(sibling) => self.position(sibling),
        }
    }

    /// Inserts a window. An unknown sibling places it on top.
    pub(crate) fn insert(&mut self, window: ManagedWindow, position: StackPosition) {
        let index = self.index_for(position).unwrap_or(0);
        self.windows.insert(index, window);
    }

    /// Moves `id` to `position`, leaving every other window in place.
    ///
    /// An unknown sibling moves the window to the bottom. Returns `false` if
    /// `id` is not managed or is already in place.
    pub fn restack(&mut self, id: WindowId, position: StackPosition) -> bool {
        let Some(from) = self.position(id) else {
            return false;
        };
        if position == StackPosition::Above(id) {
            return false;
        }
        let target = self.index_for(position).unwrap_or(self.windows.len());
        let to = if target > from { target - 1 } else { target };
        if to == from {
            return false;
        }
        let window = self.windows.remove(from);
        self.windows.insert(to, window);
        true
    }

    pub(crate) fn at_mut(&mut self, index: usize) -> Option<&mut ManagedWindow> {
        self.windows.get_mut(index)
    }

    /// Removes and returns a window.
    pub(crate) fn remove(&mut self, id: WindowId) -> Option<ManagedWindow> {
        let index = self.position(id)?;
        Some(self.windows.remove(index))
    }

    pub(crate) fn drain(&mut self) -> alloc::vec::Drain<'_, ManagedWindow> {
        self.windows.drain(..)
    }
}
