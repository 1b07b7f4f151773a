//! Scoped selection preservation
//!
//! [`SelectionGuard`] captures the scene selection when created and puts it
//! back when dropped, on every exit path including early returns and panics.

use std::ops::{Deref, DerefMut};
use sysnode_scene::{NodeHandle, SceneGraph};

/// Restores the scene selection on drop
///
/// Derefs to the scene, so work that changes the selection goes through the
/// guard. Handles that died while the guard was held are left out of the
/// restored selection.
pub struct SelectionGuard<'a, S: SceneGraph + ?Sized> {
    scene: &'a mut S,
    saved: Vec<NodeHandle>,
}

impl<'a, S: SceneGraph + ?Sized> SelectionGuard<'a, S> {
    /// Capture the current selection
    pub fn new(scene: &'a mut S) -> Self {
        let saved = scene.selection();
        Self { scene, saved }
    }

    /// Selection captured at creation
    #[inline]
    #[must_use]
    pub fn saved(&self) -> &[NodeHandle] {
        &self.saved
    }
}

impl<S: SceneGraph + ?Sized> Deref for SelectionGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &*self.scene
    }
}

impl<S: SceneGraph + ?Sized> DerefMut for SelectionGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut *self.scene
    }
}

impl<S: SceneGraph + ?Sized> Drop for SelectionGuard<'_, S> {
    fn drop(&mut self) {
        let live: Vec<NodeHandle> = self
            .saved
            .iter()
            .copied()
            .filter(|h| self.scene.is_alive(*h))
            .collect();
        if let Err(e) = self.scene.set_selection(&live) {
            tracing::warn!("Failed to restore selection: {}", e);
        }
    }
}
