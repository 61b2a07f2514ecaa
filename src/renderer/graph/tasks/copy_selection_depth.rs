//! Copies the selection depth buffer into the main depth buffer.
//!
//! Neither buffer is owned here: both ids are read from the frame context
//! published by the task that owns them.

use crate::errors::{HydrogentError, Result};
use crate::renderer::delegate::RenderDelegate;
use crate::renderer::graph::frame_context::{FrameContext, FrameKey};
use crate::renderer::graph::task::{DirtyBits, Task, TaskState};
use crate::scene::{ParamsDelegate, RenderIndex, ScenePath, TargetId};

const TASK_NAME: &str = "CopySelectionDepthTask";

pub struct CopySelectionDepthTask {
    id: ScenePath,
    state: TaskState,
    selection_depth_id: TargetId,
    depth_id: TargetId,
}

impl CopySelectionDepthTask {
    pub fn new(id: ScenePath) -> Result<Self> {
        if id.is_empty() {
            return Err(HydrogentError::InvalidTaskId);
        }
        Ok(Self {
            id,
            state: TaskState::Uninitialized,
            selection_depth_id: ScenePath::EMPTY,
            depth_id: ScenePath::EMPTY,
        })
    }

    #[must_use]
    pub fn state(&self) -> TaskState {
        self.state
    }
}

impl Task for CopySelectionDepthTask {
    fn id(&self) -> ScenePath {
        self.id
    }

    fn name(&self) -> &str {
        TASK_NAME
    }

    fn initial_dirty_bits(&self) -> DirtyBits {
        DirtyBits::CLEAN
    }

    fn sync(&mut self, _params: &dyn ParamsDelegate, dirty_bits: &mut DirtyBits) {
        self.state = TaskState::Synced;
        *dirty_bits = DirtyBits::CLEAN;
    }

    fn prepare(&mut self, ctx: &mut FrameContext, _index: &mut RenderIndex, _delegate: &mut RenderDelegate) {
        self.state = TaskState::Synced;

        let (Some(selection_depth_id), Some(depth_id)) = (
            ctx.target(FrameKey::SelectionDepthBuffer),
            ctx.target(FrameKey::DepthBuffer),
        ) else {
            log::error!("{TASK_NAME}: selection depth or depth buffer id is not published in the frame context");
            return;
        };

        self.selection_depth_id = selection_depth_id;
        self.depth_id = depth_id;
        self.state = TaskState::Prepared;
    }

    fn execute(&mut self, _ctx: &FrameContext, index: &RenderIndex, delegate: &mut RenderDelegate) {
        if !self.state.is_prepared() {
            log::error!("{TASK_NAME}: render index is not set. This likely indicates that prepare() has not been called");
            return;
        }

        let Some(src) = index.render_buffer_target(self.selection_depth_id) else {
            log::error!("{TASK_NAME}: selection depth buffer {} is not bound", self.selection_depth_id);
            return;
        };
        let Some(dst) = index.render_buffer_target(self.depth_id) else {
            log::error!("{TASK_NAME}: depth buffer {} is not bound", self.depth_id);
            return;
        };
        if src.size() != dst.size() || src.format != dst.format {
            log::error!(
                "{TASK_NAME}: selection depth ({}x{} {:?}) does not match depth buffer ({}x{} {:?})",
                src.width,
                src.height,
                src.format,
                dst.width,
                dst.height,
                dst.format
            );
            return;
        }

        delegate.device_mut().copy_texture(&src, &dst);
        self.state = TaskState::Executed;
    }
}
