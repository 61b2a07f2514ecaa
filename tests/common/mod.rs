//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use glam::{Mat4, Vec3};
use hydrogent::renderer::device::{
    CommandLog, DeviceCommand, GraphicsDevice, RecordingDevice, TextureDesc, TextureView, ViewId, ViewKind,
};
use hydrogent::renderer::graph::{FrameContext, Task};
use hydrogent::renderer::settings::DelegateSettings;
use hydrogent::renderer::uniforms::PbrFrameAttribs;
use hydrogent::scene::{Camera, RenderIndex, ScenePath, TaskParamsStore};
use hydrogent::RenderDelegate;

pub const FINAL_COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Render index, delegate over a recording device, and a bound final color target.
pub struct Harness {
    pub index: RenderIndex,
    pub delegate: RenderDelegate,
    pub log: CommandLog,
    pub params: TaskParamsStore,
    pub final_id: ScenePath,
    pub final_view: TextureView,
}

impl Harness {
    pub fn new(root: &str, width: u32, height: u32) -> Self {
        Self::with_device(root, RecordingDevice::new(), width, height)
    }

    /// Builds the harness on `device`. The command log starts empty.
    pub fn with_device(root: &str, device: RecordingDevice, width: u32, height: u32) -> Self {
        init_logger();
        let log = device.log();
        let delegate = RenderDelegate::new(Box::new(device), DelegateSettings::default());
        let mut harness = Self {
            index: RenderIndex::new(),
            delegate,
            log,
            params: TaskParamsStore::new(),
            final_id: ScenePath::new(root).append_child("finalColor"),
            final_view: placeholder_view(),
        };
        harness.index.insert_render_buffer(harness.final_id);
        harness.resize_final(width, height);
        harness.log.clear();
        harness
    }

    /// Binds a new `width`x`height` final color image.
    pub fn resize_final(&mut self, width: u32, height: u32) -> TextureView {
        let device = self.delegate.device_mut();
        let desc = TextureDesc::offscreen_target("Final color", width, height, FINAL_COLOR_FORMAT);
        let texture = device.create_texture(&desc).unwrap();
        let view = device.default_view(texture, ViewKind::RenderTarget).unwrap();
        self.index.render_buffer_mut(self.final_id).unwrap().set_target(view);
        self.final_view = view;
        view
    }

    pub fn add_camera(&mut self, id: ScenePath, eye: Vec3) -> ScenePath {
        let mut camera = Camera::new_perspective(45.0, 1.0, 0.1, 100.0);
        camera.set_world_matrix(Mat4::from_translation(eye));
        self.index.insert_camera(id, camera);
        id
    }

    /// Registers `task`'s initial dirty bits with the change tracker.
    pub fn register(&mut self, task: &dyn Task) {
        self.index
            .change_tracker_mut()
            .task_inserted(task.id(), task.initial_dirty_bits());
    }

    /// Runs sync, prepare and execute on a single task.
    pub fn run_frame(&mut self, task: &mut dyn Task) -> FrameContext {
        let mut ctx = FrameContext::new();
        let id = task.id();
        let mut dirty = self.index.change_tracker().task_dirty_bits(id);
        task.sync(&self.params, &mut dirty);
        self.index.change_tracker_mut().set_task_dirty_bits(id, dirty);
        task.prepare(&mut ctx, &mut self.index, &mut self.delegate);
        task.execute(&ctx, &self.index, &mut self.delegate);
        ctx
    }
}

fn placeholder_view() -> TextureView {
    let mut device = RecordingDevice::new();
    let desc = TextureDesc::offscreen_target("placeholder", 1, 1, FINAL_COLOR_FORMAT);
    let texture = device.create_texture(&desc).unwrap();
    device.default_view(texture, ViewKind::RenderTarget).unwrap()
}

// ============================================================================
// Command log queries
// ============================================================================

pub fn render_target_bindings(log: &CommandLog) -> Vec<(Vec<Option<ViewId>>, Option<ViewId>)> {
    log.snapshot()
        .into_iter()
        .filter_map(|c| match c {
            DeviceCommand::SetRenderTargets { color, depth_stencil } => Some((color, depth_stencil)),
            _ => None,
        })
        .collect()
}

pub fn color_clears(log: &CommandLog) -> Vec<(ViewId, [f32; 4])> {
    log.snapshot()
        .into_iter()
        .filter_map(|c| match c {
            DeviceCommand::ClearRenderTarget { view, color } => Some((view, color)),
            _ => None,
        })
        .collect()
}

pub fn created_texture_names(log: &CommandLog) -> Vec<String> {
    log.snapshot()
        .into_iter()
        .filter_map(|c| match c {
            DeviceCommand::CreateTexture { desc, .. } => Some(desc.name),
            _ => None,
        })
        .collect()
}

/// Decodes the last frame constant upload.
pub fn last_uploaded_frame_attribs(log: &CommandLog) -> Option<PbrFrameAttribs> {
    log.snapshot().into_iter().rev().find_map(|c| match c {
        DeviceCommand::UpdateBuffer { data, .. } if data.len() == PbrFrameAttribs::SIZE as usize => {
            Some(bytemuck::pod_read_unaligned::<PbrFrameAttribs>(&data))
        }
        _ => None,
    })
}

pub fn is_device_work(command: &DeviceCommand) -> bool {
    matches!(
        command,
        DeviceCommand::SetRenderTargets { .. }
            | DeviceCommand::ClearRenderTarget { .. }
            | DeviceCommand::ClearDepthStencil { .. }
            | DeviceCommand::SetStencilRef(_)
            | DeviceCommand::UpdateBuffer { .. }
            | DeviceCommand::CopyTexture { .. }
    )
}
