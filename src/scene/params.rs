use rustc_hash::FxHashMap;

use super::ScenePath;
use crate::renderer::settings::TaskParams;

/// Supplies per-task parameter blocks.
pub trait ParamsDelegate {
    fn task_params(&self, id: ScenePath) -> Option<&TaskParams>;
}

/// In-memory [`ParamsDelegate`].
#[derive(Debug, Default)]
pub struct TaskParamsStore {
    params: FxHashMap<ScenePath, TaskParams>,
}

impl TaskParamsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `params` for task `id`. Callers mark the task's
    /// [`DirtyBits::PARAMS`](super::DirtyBits::PARAMS) bit for it to be re-read.
    pub fn set(&mut self, id: ScenePath, params: impl Into<TaskParams>) {
        self.params.insert(id, params.into());
    }

    pub fn remove(&mut self, id: ScenePath) -> Option<TaskParams> {
        self.params.remove(&id)
    }

    pub fn get_mut(&mut self, id: ScenePath) -> Option<&mut TaskParams> {
        self.params.get_mut(&id)
    }
}

impl ParamsDelegate for TaskParamsStore {
    fn task_params(&self, id: ScenePath) -> Option<&TaskParams> {
        self.params.get(&id)
    }
}
