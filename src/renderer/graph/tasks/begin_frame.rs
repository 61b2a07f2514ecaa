//! Begin-Frame Task
//!
//! First task of the frame. It owns the G-buffer and the auxiliary depth
//! targets, keeps them sized after the final color target, fills the
//! per-frame constant buffer and leaves the G-buffer bound and cleared for
//! the draw tasks that follow.

use glam::{UVec2, Vec4};

use super::{bind_and_clear, executable_targets, final_color_view, insert_render_buffer, remove_render_buffers};
use crate::errors::{HydrogentError, Result};
use crate::renderer::delegate::RenderDelegate;
use crate::renderer::device::{BufferHandle, DeviceResource, ResourceState, StateTransition};
use crate::renderer::graph::frame_context::{FrameContext, FrameKey};
use crate::renderer::graph::framebuffer::{FramebufferTargets, GBUFFER_TARGET_COUNT, GBufferTarget};
use crate::renderer::graph::render_pass_state::{RenderPassState, SharedRenderPassState};
use crate::renderer::graph::target_resolver::TargetResolver;
use crate::renderer::graph::task::{DirtyBits, Task, TaskState};
use crate::renderer::settings::BeginFrameTaskParams;
use crate::renderer::uniforms::{CameraAttribs, PbrFrameAttribs, PbrLightAttribs};
use crate::scene::{Camera, ParamsDelegate, RenderIndex, ScenePath, TargetId};
use crate::utils::time::FrameTimer;

const TASK_NAME: &str = "BeginFrameTask";

// Tone mapping runs in a later stage; the G-buffer pass uses fixed exposure.
const AVERAGE_LOG_LUM: f32 = 0.3;
const MIDDLE_GRAY: f32 = 0.18;
const WHITE_POINT: f32 = 3.0;

pub struct BeginFrameTask {
    id: ScenePath,
    state: TaskState,
    params: BeginFrameTaskParams,
    render_pass_state: SharedRenderPassState,

    gbuffer_target_ids: [TargetId; GBUFFER_TARGET_COUNT],
    selection_depth_id: TargetId,
    depth_id: TargetId,
    closest_selected_location_ids: [TargetId; 2],

    framebuffer_size: UVec2,
    frame_attribs: PbrFrameAttribs,
    timer: FrameTimer,
}

impl BeginFrameTask {
    /// Creates the task and registers its render buffers under `id`.
    pub fn new(id: ScenePath, index: &mut RenderIndex) -> Result<Self> {
        if id.is_empty() {
            return Err(HydrogentError::InvalidTaskId);
        }

        let gbuffer_target_ids = GBufferTarget::ALL.map(|t| insert_render_buffer(index, id, t.token()));
        let selection_depth_id = insert_render_buffer(index, id, FrameKey::SelectionDepthBuffer.token());
        let depth_id = insert_render_buffer(index, id, FrameKey::DepthBuffer.token());
        let closest_selected_location_ids = [
            insert_render_buffer(index, id, FrameKey::ClosestSelectedLocation0Target.token()),
            insert_render_buffer(index, id, FrameKey::ClosestSelectedLocation1Target.token()),
        ];

        let task = Self {
            id,
            state: TaskState::Uninitialized,
            params: BeginFrameTaskParams::default(),
            render_pass_state: RenderPassState::new_shared(),
            gbuffer_target_ids,
            selection_depth_id,
            depth_id,
            closest_selected_location_ids,
            framebuffer_size: UVec2::ZERO,
            frame_attribs: PbrFrameAttribs::default(),
            timer: FrameTimer::new(),
        };
        task.update_render_pass_state();
        Ok(task)
    }

    fn update_render_pass_state(&self) {
        let params = &self.params;
        let mut state = self.render_pass_state.write();

        state.set_num_render_targets(GBUFFER_TARGET_COUNT);
        for target in GBufferTarget::ALL {
            state.set_render_target_format(target as usize, params.formats.gbuffer(target));
        }
        state.set_depth_stencil_format(params.formats.depth);
        state.apply_pass_params(&params.state);
        state.set_clear_color(params.clear_color);
        state.set_clear_depth(params.clear_depth);
    }

    fn publish_targets(&self, ctx: &mut FrameContext) {
        ctx.publish_render_pass_state(self.render_pass_state.clone());
        ctx.publish_target(FrameKey::FinalColorTarget, self.params.final_color_target_id);
        for target in GBufferTarget::ALL {
            ctx.publish_target(target.frame_key(), self.gbuffer_target_ids[target as usize]);
        }
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
    }

    fn resolve_targets(&self, resolver: &mut TargetResolver<'_>) -> FramebufferTargets {
        let formats = &self.params.formats;
        let mut targets = FramebufferTargets::default();

        for target in GBufferTarget::ALL {
            let slot = target as usize;
            let name = format!("GBuffer target {slot}");
            targets.gbuffer[slot] = resolver.resolve(self.gbuffer_target_ids[slot], formats.gbuffer(target), &name);
            targets.gbuffer_srvs[slot] = targets.gbuffer[slot].and_then(|rtv| resolver.shader_resource_view(&rtv));
        }

        targets.selection_depth = resolver.resolve(self.selection_depth_id, formats.depth, "Selection depth buffer");
        targets.depth = resolver.resolve(self.depth_id, formats.depth, "Depth buffer");
        for (i, id) in self.closest_selected_location_ids.into_iter().enumerate() {
            targets.closest_selected_location[i] = resolver.resolve(
                id,
                formats.closest_selected_location,
                &format!("Closest selected location {i}"),
            );
        }

        targets
    }

    /// Fills and uploads the frame constants.
    fn update_frame_constants(&mut self, index: &RenderIndex, delegate: &mut RenderDelegate, buffer: BufferHandle) {
        let attribs = &mut self.frame_attribs;

        attribs.prev_camera = attribs.camera;
        if let Some(camera) = find_camera(index, self.params.camera_id) {
            attribs.camera = camera_attribs(camera, self.framebuffer_size);
        }
        // First frame: no history yet.
        if attribs.prev_camera.viewport_size.x == 0.0 {
            attribs.prev_camera = attribs.camera;
        }

        if let Some(light) = delegate.lights().iter().find(|l| l.has_direction()) {
            attribs.light = PbrLightAttribs {
                direction: light.direction,
                intensity: light.intensity,
            };
        }

        let overrides = &self.params.renderer;
        let renderer = &mut attribs.renderer;
        delegate.internal_shader_parameters(renderer);
        renderer.occlusion_strength = overrides.occlusion_strength;
        renderer.emission_scale = overrides.emission_scale;
        renderer.ibl_scale = overrides.ibl_scale;
        renderer.unshaded_color = overrides.unshaded_color;
        renderer.point_size = overrides.point_size;
        renderer.highlight_color = Vec4::ZERO;
        renderer.average_log_lum = AVERAGE_LOG_LUM;
        renderer.middle_gray = MIDDLE_GRAY;
        renderer.white_point = WHITE_POINT;

        let device = delegate.device_mut();
        device.update_buffer(buffer, 0, self.frame_attribs.as_bytes());
        device.transition_resource_states(&[StateTransition {
            resource: DeviceResource::Buffer(buffer),
            old_state: ResourceState::Unknown,
            new_state: ResourceState::ConstantBuffer,
            update_state: true,
        }]);
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    #[must_use]
    pub fn params(&self) -> &BeginFrameTaskParams {
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
    pub fn frame_attribs(&self) -> &PbrFrameAttribs {
        &self.frame_attribs
    }

    #[must_use]
    pub fn gbuffer_target_id(&self, target: GBufferTarget) -> TargetId {
        self.gbuffer_target_ids[target as usize]
    }

    #[must_use]
    pub fn selection_depth_id(&self) -> TargetId {
        self.selection_depth_id
    }

    #[must_use]
    pub fn depth_id(&self) -> TargetId {
        self.depth_id
    }

    #[must_use]
    pub fn closest_selected_location_id(&self, i: usize) -> Option<TargetId> {
        self.closest_selected_location_ids.get(i).copied()
    }

    /// Size of the final color target at the last successful prepare.
    #[must_use]
    pub fn framebuffer_size(&self) -> UVec2 {
        self.framebuffer_size
    }

    fn owned_target_ids(&self) -> Vec<TargetId> {
        let mut ids = self.gbuffer_target_ids.to_vec();
        ids.extend([self.selection_depth_id, self.depth_id]);
        ids.extend(self.closest_selected_location_ids);
        ids
    }
}

impl Task for BeginFrameTask {
    fn id(&self) -> ScenePath {
        self.id
    }

    fn name(&self) -> &str {
        TASK_NAME
    }

    fn sync(&mut self, params: &dyn ParamsDelegate, dirty_bits: &mut DirtyBits) {
        if dirty_bits.contains(DirtyBits::PARAMS) {
            match params.task_params(self.id).and_then(|p| p.as_begin_frame()) {
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
        self.publish_targets(ctx);

        let Some(final_view) = final_color_view(TASK_NAME, index, self.params.final_color_target_id) else {
            return;
        };

        let mut resolver = TargetResolver::new(TASK_NAME, index, delegate.device_mut(), &final_view);
        let mut targets = self.resolve_targets(&mut resolver);
        targets.final_color = Some(final_view);

        self.render_pass_state.write().set_framebuffer_targets(targets);
        self.framebuffer_size = UVec2::new(final_view.width, final_view.height);
        self.state = TaskState::Prepared;
    }

    fn execute(&mut self, _ctx: &FrameContext, index: &RenderIndex, delegate: &mut RenderDelegate) {
        let Some(targets) = executable_targets(TASK_NAME, self.state, &self.render_pass_state) else {
            return;
        };

        if let Some(render_param) = delegate.render_param_mut() {
            let (frame_time, elapsed_time) = self.timer.tick();
            render_param.set_frame_time(frame_time);
            render_param.set_elapsed_time(elapsed_time);
            render_param.advance_frame();
        }

        match delegate.frame_attribs_buffer() {
            Some(buffer) => self.update_frame_constants(index, delegate, buffer),
            None => log::error!("{TASK_NAME}: frame attribs buffer is not initialized"),
        }

        let (clear_color, clear_depth, stencil_ref) = {
            let state = self.render_pass_state.read();
            (state.clear_color(), state.clear_depth(), state.stencil_ref())
        };
        bind_and_clear(
            delegate.device_mut(),
            &targets.gbuffer,
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

fn find_camera(index: &RenderIndex, camera_id: ScenePath) -> Option<&Camera> {
    if camera_id.is_empty() {
        log::error!("{TASK_NAME}: camera is not set");
        return None;
    }
    let camera = index.camera(camera_id);
    if camera.is_none() {
        log::error!("{TASK_NAME}: camera {camera_id} is not set in the render index");
    }
    camera
}

/// Camera block for a `size` viewport. Matrices are stored transposed.
fn camera_attribs(camera: &Camera, size: UVec2) -> CameraAttribs {
    let width = size.x.max(1) as f32;
    let height = size.y.max(1) as f32;

    let view = camera.view_matrix();
    let proj = camera.projection_matrix();
    let view_proj = proj * view;

    CameraAttribs {
        position: camera.world_matrix().w_axis,
        viewport_size: Vec4::new(width, height, 1.0 / width, 1.0 / height),
        view_t: view.transpose(),
        proj_t: proj.transpose(),
        view_proj_t: view_proj.transpose(),
        view_inv_t: view.inverse().transpose(),
        proj_inv_t: proj.inverse().transpose(),
        view_proj_inv_t: view_proj.inverse().transpose(),
    }
}
