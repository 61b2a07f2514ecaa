//! Setup-Rendering Task
//!
//! Forward-rendering counterpart of the Begin-Frame task: one offscreen color
//! target plus the mesh id target, with the selection depth buffer bound for
//! depth-stencil. Frame constants are left to other tasks.

use super::{bind_and_clear, executable_targets, final_color_view, insert_render_buffer, remove_render_buffers};
use crate::errors::{HydrogentError, Result};
use crate::renderer::delegate::RenderDelegate;
use crate::renderer::graph::frame_context::{FrameContext, FrameKey};
use crate::renderer::graph::framebuffer::{FramebufferTargets, GBufferTarget};
use crate::renderer::graph::render_pass_state::{RenderPassState, SharedRenderPassState};
use crate::renderer::graph::target_resolver::TargetResolver;
use crate::renderer::graph::task::{DirtyBits, Task, TaskState};
use crate::renderer::settings::SetupRenderingTaskParams;
use crate::scene::{ParamsDelegate, RenderIndex, ScenePath, TargetId};

const TASK_NAME: &str = "SetupRenderingTask";

/// Bound color slots: offscreen color, mesh id.
const NUM_RENDER_TARGETS: usize = 2;

pub struct SetupRenderingTask {
    id: ScenePath,
    state: TaskState,
    params: SetupRenderingTaskParams,
    render_pass_state: SharedRenderPassState,

    offscreen_color_id: TargetId,
    mesh_id_target_id: TargetId,
    selection_depth_id: TargetId,
    depth_id: TargetId,
    closest_selected_location_ids: [TargetId; 2],
}

impl SetupRenderingTask {
    pub fn new(id: ScenePath, index: &mut RenderIndex) -> Result<Self> {
        if id.is_empty() {
            return Err(HydrogentError::InvalidTaskId);
        }

        let task = Self {
            id,
            state: TaskState::Uninitialized,
            params: SetupRenderingTaskParams::default(),
            render_pass_state: RenderPassState::new_shared(),
            offscreen_color_id: insert_render_buffer(index, id, FrameKey::OffscreenColorTarget.token()),
            mesh_id_target_id: insert_render_buffer(index, id, FrameKey::MeshIdTarget.token()),
            selection_depth_id: insert_render_buffer(index, id, FrameKey::SelectionDepthBuffer.token()),
            depth_id: insert_render_buffer(index, id, FrameKey::DepthBuffer.token()),
            closest_selected_location_ids: [
                insert_render_buffer(index, id, FrameKey::ClosestSelectedLocation0Target.token()),
                insert_render_buffer(index, id, FrameKey::ClosestSelectedLocation1Target.token()),
            ],
        };
        task.update_render_pass_state();
        Ok(task)
    }

    fn update_render_pass_state(&self) {
        let params = &self.params;
        if params.color_format.is_none() {
            log::warn!("{TASK_NAME}: color format is not set, the offscreen color target is disabled");
        }

        let mut state = self.render_pass_state.write();
        state.set_num_render_targets(NUM_RENDER_TARGETS);
        state.set_render_target_format(GBufferTarget::SceneColor as usize, params.color_format);
        state.set_render_target_format(GBufferTarget::MeshId as usize, params.mesh_id_format);
        state.set_depth_stencil_format(params.depth_format);
        state.apply_pass_params(&params.state);
        state.set_clear_color(params.clear_color);
        state.set_clear_depth(params.clear_depth);
    }

    #[must_use]
    pub fn params(&self) -> &SetupRenderingTaskParams {
        &self.params
    }

    #[must_use]
    pub fn state(&self) -> TaskState {
        self.state
    }

    #[must_use]
    pub fn render_pass_state(&self) -> SharedRenderPassState {
        self.render_pass_state.clone()
    }

    #[must_use]
    pub fn offscreen_color_id(&self) -> TargetId {
        self.offscreen_color_id
    }

    #[must_use]
    pub fn mesh_id_target_id(&self) -> TargetId {
        self.mesh_id_target_id
    }

    #[must_use]
    pub fn selection_depth_id(&self) -> TargetId {
        self.selection_depth_id
    }

    #[must_use]
    pub fn depth_id(&self) -> TargetId {
        self.depth_id
    }

    fn owned_target_ids(&self) -> [TargetId; 6] {
        [
            self.offscreen_color_id,
            self.mesh_id_target_id,
            self.selection_depth_id,
            self.depth_id,
            self.closest_selected_location_ids[0],
            self.closest_selected_location_ids[1],
        ]
    }
}

impl Task for SetupRenderingTask {
    fn id(&self) -> ScenePath {
        self.id
    }

    fn name(&self) -> &str {
        TASK_NAME
    }

    fn sync(&mut self, params: &dyn ParamsDelegate, dirty_bits: &mut DirtyBits) {
        if dirty_bits.contains(DirtyBits::PARAMS) {
            match params.task_params(self.id).and_then(|p| p.as_setup_rendering()) {
                Some(p) => {
                    self.params = *p;
                    self.update_render_pass_state();
                }
                None => log::warn!("{TASK_NAME}: no parameters for task {}", self.id),
            }
        }

        self.state = TaskState::Synced;
        *dirty_bits = DirtyBits::CLEAN;
    }

    fn prepare(&mut self, ctx: &mut FrameContext, index: &mut RenderIndex, delegate: &mut RenderDelegate) {
        self.state = TaskState::Synced;
        self.render_pass_state.write().reset_framebuffer_targets();

        ctx.publish_render_pass_state(self.render_pass_state.clone());
        ctx.publish_target(FrameKey::FinalColorTarget, self.params.final_color_target_id);
        ctx.publish_target(FrameKey::OffscreenColorTarget, self.offscreen_color_id);
        ctx.publish_target(FrameKey::MeshIdTarget, self.mesh_id_target_id);
        ctx.publish_target(FrameKey::SelectionDepthBuffer, self.selection_depth_id);
        ctx.publish_target(FrameKey::DepthBuffer, self.depth_id);
        ctx.publish_target(
            FrameKey::ClosestSelectedLocation0Target,
            self.closest_selected_location_ids[0],
        );
        ctx.publish_target(
            FrameKey::ClosestSelectedLocation1Target,
            self.closest_selected_location_ids[1],
        );

        let Some(final_view) = final_color_view(TASK_NAME, index, self.params.final_color_target_id) else {
            return;
        };

        let params = &self.params;
        let mut resolver = TargetResolver::new(TASK_NAME, index, delegate.device_mut(), &final_view);
        let mut targets = FramebufferTargets {
            final_color: Some(final_view),
            ..Default::default()
        };
        targets.gbuffer[GBufferTarget::SceneColor as usize] =
            resolver.resolve(self.offscreen_color_id, params.color_format, "Offscreen color target");
        targets.gbuffer[GBufferTarget::MeshId as usize] =
            resolver.resolve(self.mesh_id_target_id, params.mesh_id_format, "Mesh Id target");
        targets.selection_depth = resolver.resolve(self.selection_depth_id, params.depth_format, "Selection depth buffer");
        targets.depth = resolver.resolve(self.depth_id, params.depth_format, "Depth buffer");
        for (i, id) in self.closest_selected_location_ids.into_iter().enumerate() {
            targets.closest_selected_location[i] = resolver.resolve(
                id,
                params.closest_selected_location_format,
                &format!("Closest selected location {i}"),
            );
        }

        self.render_pass_state.write().set_framebuffer_targets(targets);
        self.state = TaskState::Prepared;
    }

    fn execute(&mut self, _ctx: &FrameContext, _index: &RenderIndex, delegate: &mut RenderDelegate) {
        let Some(targets) = executable_targets(TASK_NAME, self.state, &self.render_pass_state) else {
            return;
        };

        let (clear_color, clear_depth, stencil_ref) = {
            let state = self.render_pass_state.read();
            (state.clear_color(), state.clear_depth(), state.stencil_ref())
        };
        bind_and_clear(
            delegate.device_mut(),
            &targets.gbuffer[..NUM_RENDER_TARGETS],
            targets.selection_depth,
            clear_color,
            clear_depth,
            stencil_ref,
        );

        self.state = TaskState::Executed;
    }

    fn teardown(&mut self, index: &mut RenderIndex, delegate: &mut RenderDelegate) {
        remove_render_buffers(index, delegate.device_mut(), &self.owned_target_ids());
        self.render_pass_state.write().reset_framebuffer_targets();
        self.state = TaskState::Uninitialized;
    }
}
