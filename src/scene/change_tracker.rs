use bitflags::bitflags;
use rustc_hash::FxHashMap;

use super::ScenePath;

bitflags! {
    /// Per-task change notifications.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct DirtyBits: u32 {
        /// The task's parameter block changed.
        const PARAMS      = 1 << 0;
        const COLLECTION  = 1 << 1;
        const RENDER_TAGS = 1 << 2;
    }
}

impl DirtyBits {
    pub const CLEAN: Self = Self::empty();
}

/// Tracks dirty bits of registered tasks.
///
/// Every mutation bumps a global version so that observers can detect
/// "something changed" without scanning.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    tasks: FxHashMap<ScenePath, DirtyBits>,
    version: u64,
}

impl ChangeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task_inserted(&mut self, id: ScenePath, initial: DirtyBits) {
        self.tasks.insert(id, initial);
        self.changed();
    }

    pub fn task_removed(&mut self, id: ScenePath) {
        if self.tasks.remove(&id).is_some() {
            self.changed();
        }
    }

    /// ORs `bits` into the task's dirty state. Unknown tasks are ignored.
    pub fn mark_task_dirty(&mut self, id: ScenePath, bits: DirtyBits) {
        if let Some(dirty) = self.tasks.get_mut(&id) {
            *dirty |= bits;
            self.changed();
        } else {
            log::warn!("ChangeTracker: task {id} is not registered");
        }
    }

    #[must_use]
    pub fn task_dirty_bits(&self, id: ScenePath) -> DirtyBits {
        self.tasks.get(&id).copied().unwrap_or_default()
    }

    /// Stores the bits a task left after syncing.
    pub fn set_task_dirty_bits(&mut self, id: ScenePath, bits: DirtyBits) {
        if let Some(dirty) = self.tasks.get_mut(&id) {
            *dirty = bits;
        }
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    fn changed(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}
