//! Render Index
//!
//! Scene-side registry consumed by the task engine:
//! - render buffers, stored in a slot arena and addressed by [`ScenePath`]
//! - cameras, addressed by [`ScenePath`]
//! - the [`ChangeTracker`] holding per-task dirty bits
//!
//! Tasks never own render buffers. They keep the path used to create the
//! slot and look the slot up again whenever they need it.

use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};

use super::{Camera, ChangeTracker, RenderBuffer, ScenePath};
use crate::renderer::device::TextureView;

new_key_type! {
    pub struct RenderBufferKey;
}

#[derive(Default)]
pub struct RenderIndex {
    buffers: SlotMap<RenderBufferKey, RenderBuffer>,
    buffer_keys: FxHashMap<ScenePath, RenderBufferKey>,
    cameras: FxHashMap<ScenePath, Camera>,
    change_tracker: ChangeTracker,
}

impl RenderIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Render Buffers ─────────────────────────────────────────────────────

    /// Creates an empty render buffer at `id`, or returns the existing one.
    pub fn insert_render_buffer(&mut self, id: ScenePath) -> RenderBufferKey {
        if let Some(&key) = self.buffer_keys.get(&id) {
            return key;
        }
        let key = self.buffers.insert(RenderBuffer::new(id));
        self.buffer_keys.insert(id, key);
        key
    }

    pub fn remove_render_buffer(&mut self, id: ScenePath) -> Option<RenderBuffer> {
        let key = self.buffer_keys.remove(&id)?;
        self.buffers.remove(key)
    }

    #[must_use]
    pub fn render_buffer_key(&self, id: ScenePath) -> Option<RenderBufferKey> {
        self.buffer_keys.get(&id).copied()
    }

    #[must_use]
    pub fn render_buffer(&self, id: ScenePath) -> Option<&RenderBuffer> {
        self.buffer_keys.get(&id).and_then(|&key| self.buffers.get(key))
    }

    pub fn render_buffer_mut(&mut self, id: ScenePath) -> Option<&mut RenderBuffer> {
        let key = *self.buffer_keys.get(&id)?;
        self.buffers.get_mut(key)
    }

    #[must_use]
    pub fn render_buffer_by_key(&self, key: RenderBufferKey) -> Option<&RenderBuffer> {
        self.buffers.get(key)
    }

    /// The view bound to the render buffer at `id`, if both exist.
    #[must_use]
    pub fn render_buffer_target(&self, id: ScenePath) -> Option<TextureView> {
        self.render_buffer(id).and_then(RenderBuffer::target)
    }

    #[must_use]
    pub fn render_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    // ─── Cameras ────────────────────────────────────────────────────────────

    pub fn insert_camera(&mut self, id: ScenePath, camera: Camera) {
        self.cameras.insert(id, camera);
    }

    pub fn remove_camera(&mut self, id: ScenePath) -> Option<Camera> {
        self.cameras.remove(&id)
    }

    #[must_use]
    pub fn camera(&self, id: ScenePath) -> Option<&Camera> {
        self.cameras.get(&id)
    }

    pub fn camera_mut(&mut self, id: ScenePath) -> Option<&mut Camera> {
        self.cameras.get_mut(&id)
    }

    // ─── Change Tracking ────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub fn change_tracker(&self) -> &ChangeTracker {
        &self.change_tracker
    }

    #[inline]
    pub fn change_tracker_mut(&mut self) -> &mut ChangeTracker {
        &mut self.change_tracker
    }
}
