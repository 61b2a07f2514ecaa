//! Task Parameter Blocks & Delegate Settings
//!
//! Configuration consumed by the built-in tasks during `sync`, and by the
//! [`RenderDelegate`](crate::renderer::RenderDelegate) at construction.
//! All blocks are plain structs with public fields and sensible defaults.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use hydrogent::renderer::settings::{BeginFrameTaskParams, RenderTargetFormats};
//!
//! let params = BeginFrameTaskParams {
//!     final_color_target_id: ScenePath::new("/swapchain"),
//!     camera_id: ScenePath::new("/cameras/main"),
//!     clear_color: Vec4::new(0.1, 0.1, 0.1, 1.0),
//!     ..Default::default()
//! };
//! ```
//!
//! A pixel format of `None` disables the corresponding target slot.

use glam::Vec4;

use crate::renderer::graph::framebuffer::{GBUFFER_TARGET_COUNT, GBufferTarget};
use crate::renderer::graph::render_pass_state::CullStyle;
use crate::renderer::render_param::DebugView;
use crate::scene::ScenePath;

// ---------------------------------------------------------------------------
// Render target formats
// ---------------------------------------------------------------------------

/// Pixel formats of the offscreen targets owned by the Begin-Frame task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTargetFormats {
    /// Indexed by [`GBufferTarget`].
    pub gbuffer: [Option<wgpu::TextureFormat>; GBUFFER_TARGET_COUNT],
    pub depth: Option<wgpu::TextureFormat>,
    pub closest_selected_location: Option<wgpu::TextureFormat>,
}

impl Default for RenderTargetFormats {
    fn default() -> Self {
        let mut gbuffer = [None; GBUFFER_TARGET_COUNT];
        for target in GBufferTarget::ALL {
            gbuffer[target as usize] = Some(target.default_format());
        }
        Self {
            gbuffer,
            depth: Some(wgpu::TextureFormat::Depth32Float),
            closest_selected_location: Some(wgpu::TextureFormat::Rg16Float),
        }
    }
}

impl RenderTargetFormats {
    #[inline]
    #[must_use]
    pub fn gbuffer(&self, target: GBufferTarget) -> Option<wgpu::TextureFormat> {
        self.gbuffer[target as usize]
    }

    pub fn set_gbuffer(&mut self, target: GBufferTarget, format: Option<wgpu::TextureFormat>) {
        self.gbuffer[target as usize] = format;
    }
}

// ---------------------------------------------------------------------------
// Fixed-function state
// ---------------------------------------------------------------------------

/// Depth, stencil, and rasterizer configuration applied to the render pass state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassStateParams {
    pub depth_bias: f32,
    pub slope_scaled_depth_bias: f32,
    pub depth_func: wgpu::CompareFunction,
    pub depth_bias_enabled: bool,
    pub depth_test_enabled: bool,
    pub depth_write_enabled: bool,
    pub depth_clamp_enabled: bool,

    pub cull_style: CullStyle,

    pub stencil_func: wgpu::CompareFunction,
    pub stencil_ref: u32,
    pub stencil_mask: u32,
    pub stencil_fail_op: wgpu::StencilOperation,
    pub stencil_depth_fail_op: wgpu::StencilOperation,
    pub stencil_pass_op: wgpu::StencilOperation,

    pub front_face_ccw: bool,
}

impl Default for PassStateParams {
    fn default() -> Self {
        Self {
            depth_bias: 0.0,
            slope_scaled_depth_bias: 0.0,
            depth_func: wgpu::CompareFunction::LessEqual,
            depth_bias_enabled: false,
            depth_test_enabled: true,
            depth_write_enabled: true,
            depth_clamp_enabled: false,
            cull_style: CullStyle::Back,
            stencil_func: wgpu::CompareFunction::Always,
            stencil_ref: 0,
            stencil_mask: 0xFF,
            stencil_fail_op: wgpu::StencilOperation::Keep,
            stencil_depth_fail_op: wgpu::StencilOperation::Keep,
            stencil_pass_op: wgpu::StencilOperation::Keep,
            front_face_ccw: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Renderer tuning overrides
// ---------------------------------------------------------------------------

/// Task-level overrides merged into the renderer shader parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererParams {
    pub occlusion_strength: f32,
    pub emission_scale: f32,
    pub ibl_scale: f32,
    pub unshaded_color: Vec4,
    pub point_size: f32,
}

impl Default for RendererParams {
    fn default() -> Self {
        Self {
            occlusion_strength: 1.0,
            emission_scale: 1.0,
            ibl_scale: 1.0,
            unshaded_color: Vec4::ONE,
            point_size: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-task parameter blocks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeginFrameTaskParams {
    pub final_color_target_id: ScenePath,
    pub camera_id: ScenePath,
    pub formats: RenderTargetFormats,
    pub state: PassStateParams,
    pub clear_color: Vec4,
    pub clear_depth: f32,
    pub renderer: RendererParams,
}

impl Default for BeginFrameTaskParams {
    fn default() -> Self {
        Self {
            final_color_target_id: ScenePath::EMPTY,
            camera_id: ScenePath::EMPTY,
            formats: RenderTargetFormats::default(),
            state: PassStateParams::default(),
            clear_color: Vec4::ZERO,
            clear_depth: 1.0,
            renderer: RendererParams::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetupRenderingTaskParams {
    pub final_color_target_id: ScenePath,
    pub color_format: Option<wgpu::TextureFormat>,
    pub mesh_id_format: Option<wgpu::TextureFormat>,
    pub depth_format: Option<wgpu::TextureFormat>,
    pub closest_selected_location_format: Option<wgpu::TextureFormat>,
    pub state: PassStateParams,
    pub clear_color: Vec4,
    pub clear_depth: f32,
}

impl Default for SetupRenderingTaskParams {
    fn default() -> Self {
        Self {
            final_color_target_id: ScenePath::EMPTY,
            color_format: Some(wgpu::TextureFormat::Rgba8Unorm),
            mesh_id_format: Some(wgpu::TextureFormat::R32Float),
            depth_format: Some(wgpu::TextureFormat::Depth32Float),
            closest_selected_location_format: Some(wgpu::TextureFormat::Rg16Float),
            state: PassStateParams::default(),
            clear_color: Vec4::ZERO,
            clear_depth: 1.0,
        }
    }
}

/// Parameter block of any built-in task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaskParams {
    BeginFrame(BeginFrameTaskParams),
    SetupRendering(SetupRenderingTaskParams),
}

impl From<BeginFrameTaskParams> for TaskParams {
    fn from(params: BeginFrameTaskParams) -> Self {
        Self::BeginFrame(params)
    }
}

impl From<SetupRenderingTaskParams> for TaskParams {
    fn from(params: SetupRenderingTaskParams) -> Self {
        Self::SetupRendering(params)
    }
}

impl TaskParams {
    #[must_use]
    pub fn as_begin_frame(&self) -> Option<&BeginFrameTaskParams> {
        match self {
            Self::BeginFrame(p) => Some(p),
            Self::SetupRendering(_) => None,
        }
    }

    #[must_use]
    pub fn as_setup_rendering(&self) -> Option<&SetupRenderingTaskParams> {
        match self {
            Self::SetupRendering(p) => Some(p),
            Self::BeginFrame(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Delegate settings
// ---------------------------------------------------------------------------

/// Renderer-wide settings the delegate derives its internal shader
/// parameters from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelegateSettings {
    pub prefiltered_cube_mip_levels: f32,
    pub debug_view: DebugView,
}

impl Default for DelegateSettings {
    fn default() -> Self {
        Self {
            prefiltered_cube_mip_levels: 0.0,
            debug_view: DebugView::None,
        }
    }
}
