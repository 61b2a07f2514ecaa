//! Render Pass State
//!
//! Fixed-function configuration shared by the draw passes of a frame, plus
//! the framebuffer targets resolved for the current frame.
//!
//! The owning task writes it during `sync` (configuration) and `prepare`
//! (targets). Downstream tasks receive a [`SharedRenderPassState`] through
//! the frame context and read it. The configuration can be exported as wgpu
//! pipeline state.

use std::sync::Arc;

use glam::Vec4;
use parking_lot::RwLock;
use smallvec::SmallVec;

use crate::renderer::graph::framebuffer::{FramebufferTargets, MAX_RENDER_TARGETS};
use crate::renderer::render_param::RenderMode;
use crate::renderer::settings::PassStateParams;

/// Handle through which tasks share a pass state within a frame.
pub type SharedRenderPassState = Arc<RwLock<RenderPassState>>;

/// Face culling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullStyle {
    #[default]
    DontCare,
    Nothing,
    Back,
    Front,
    BackUnlessDoubleSided,
    FrontUnlessDoubleSided,
}

impl CullStyle {
    #[must_use]
    pub fn cull_face(self, double_sided: bool) -> Option<wgpu::Face> {
        match self {
            Self::DontCare | Self::Nothing => None,
            Self::Back => Some(wgpu::Face::Back),
            Self::Front => Some(wgpu::Face::Front),
            Self::BackUnlessDoubleSided => (!double_sided).then_some(wgpu::Face::Back),
            Self::FrontUnlessDoubleSided => (!double_sided).then_some(wgpu::Face::Front),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilParams {
    pub func: wgpu::CompareFunction,
    pub reference: u32,
    pub mask: u32,
    pub fail_op: wgpu::StencilOperation,
    pub depth_fail_op: wgpu::StencilOperation,
    pub pass_op: wgpu::StencilOperation,
}

impl Default for StencilParams {
    fn default() -> Self {
        Self {
            func: wgpu::CompareFunction::Always,
            reference: 0,
            mask: 0xFF,
            fail_op: wgpu::StencilOperation::Keep,
            depth_fail_op: wgpu::StencilOperation::Keep,
            pass_op: wgpu::StencilOperation::Keep,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderPassState {
    num_render_targets: usize,
    rtv_formats: [Option<wgpu::TextureFormat>; MAX_RENDER_TARGETS],
    depth_stencil_format: Option<wgpu::TextureFormat>,

    depth_bias: f32,
    slope_scaled_depth_bias: f32,
    depth_func: wgpu::CompareFunction,
    depth_bias_enabled: bool,
    depth_test_enabled: bool,
    depth_write_enabled: bool,
    depth_clamp_enabled: bool,

    cull_style: CullStyle,
    stencil: StencilParams,
    front_face_ccw: bool,

    clear_color: Vec4,
    clear_depth: f32,

    framebuffer_targets: FramebufferTargets,
}

impl Default for RenderPassState {
    fn default() -> Self {
        Self {
            num_render_targets: 0,
            rtv_formats: [None; MAX_RENDER_TARGETS],
            depth_stencil_format: None,
            depth_bias: 0.0,
            slope_scaled_depth_bias: 0.0,
            depth_func: wgpu::CompareFunction::LessEqual,
            depth_bias_enabled: false,
            depth_test_enabled: true,
            depth_write_enabled: true,
            depth_clamp_enabled: false,
            cull_style: CullStyle::default(),
            stencil: StencilParams::default(),
            front_face_ccw: true,
            clear_color: Vec4::ZERO,
            clear_depth: 1.0,
            framebuffer_targets: FramebufferTargets::default(),
        }
    }
}

impl RenderPassState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn new_shared() -> SharedRenderPassState {
        Arc::new(RwLock::new(Self::default()))
    }

    // ─── Target formats ─────────────────────────────────────────────────────

    pub fn set_num_render_targets(&mut self, count: usize) {
        debug_assert!(count <= MAX_RENDER_TARGETS);
        self.num_render_targets = count.min(MAX_RENDER_TARGETS);
    }

    #[must_use]
    pub fn num_render_targets(&self) -> usize {
        self.num_render_targets
    }

    pub fn set_render_target_format(&mut self, slot: usize, format: Option<wgpu::TextureFormat>) {
        if let Some(f) = self.rtv_formats.get_mut(slot) {
            *f = format;
        } else {
            log::error!("RenderPassState: render target slot {slot} out of range");
        }
    }

    #[must_use]
    pub fn render_target_format(&self, slot: usize) -> Option<wgpu::TextureFormat> {
        self.rtv_formats.get(slot).copied().flatten()
    }

    pub fn set_depth_stencil_format(&mut self, format: Option<wgpu::TextureFormat>) {
        self.depth_stencil_format = format;
    }

    #[must_use]
    pub fn depth_stencil_format(&self) -> Option<wgpu::TextureFormat> {
        self.depth_stencil_format
    }

    /// Number of declared slots with a non-disabled format.
    #[must_use]
    pub fn configured_render_target_count(&self) -> usize {
        self.rtv_formats[..self.num_render_targets].iter().flatten().count()
    }

    /// Formats of the declared slots, for pipeline creation.
    #[must_use]
    pub fn color_target_formats(&self) -> SmallVec<[Option<wgpu::TextureFormat>; MAX_RENDER_TARGETS]> {
        self.rtv_formats[..self.num_render_targets].iter().copied().collect()
    }

    // ─── Fixed-function state ───────────────────────────────────────────────

    pub fn set_depth_bias(&mut self, depth_bias: f32, slope_scaled_depth_bias: f32) {
        self.depth_bias = depth_bias;
        self.slope_scaled_depth_bias = slope_scaled_depth_bias;
    }

    pub fn set_depth_func(&mut self, func: wgpu::CompareFunction) {
        self.depth_func = func;
    }

    pub fn set_depth_bias_enabled(&mut self, enabled: bool) {
        self.depth_bias_enabled = enabled;
    }

    pub fn set_enable_depth_test(&mut self, enabled: bool) {
        self.depth_test_enabled = enabled;
    }

    pub fn set_enable_depth_write(&mut self, enabled: bool) {
        self.depth_write_enabled = enabled;
    }

    pub fn set_enable_depth_clamp(&mut self, enabled: bool) {
        self.depth_clamp_enabled = enabled;
    }

    pub fn set_cull_style(&mut self, cull_style: CullStyle) {
        self.cull_style = cull_style;
    }

    pub fn set_stencil(
        &mut self,
        func: wgpu::CompareFunction,
        reference: u32,
        mask: u32,
        fail_op: wgpu::StencilOperation,
        depth_fail_op: wgpu::StencilOperation,
        pass_op: wgpu::StencilOperation,
    ) {
        self.stencil = StencilParams {
            func,
            reference,
            mask,
            fail_op,
            depth_fail_op,
            pass_op,
        };
    }

    pub fn set_front_face_ccw(&mut self, ccw: bool) {
        self.front_face_ccw = ccw;
    }

    pub fn set_clear_color(&mut self, color: Vec4) {
        self.clear_color = color;
    }

    pub fn set_clear_depth(&mut self, depth: f32) {
        self.clear_depth = depth;
    }

    /// Applies a task's depth/stencil/rasterizer block.
    pub fn apply_pass_params(&mut self, params: &PassStateParams) {
        self.set_depth_bias(params.depth_bias, params.slope_scaled_depth_bias);
        self.set_depth_func(params.depth_func);
        self.set_depth_bias_enabled(params.depth_bias_enabled);
        self.set_enable_depth_test(params.depth_test_enabled);
        self.set_enable_depth_write(params.depth_write_enabled);
        self.set_enable_depth_clamp(params.depth_clamp_enabled);
        self.set_cull_style(params.cull_style);
        self.set_stencil(
            params.stencil_func,
            params.stencil_ref,
            params.stencil_mask,
            params.stencil_fail_op,
            params.stencil_depth_fail_op,
            params.stencil_pass_op,
        );
        self.set_front_face_ccw(params.front_face_ccw);
    }

    #[must_use]
    pub fn depth_bias(&self) -> (f32, f32) {
        (self.depth_bias, self.slope_scaled_depth_bias)
    }

    #[must_use]
    pub fn depth_func(&self) -> wgpu::CompareFunction {
        self.depth_func
    }

    #[must_use]
    pub fn depth_bias_enabled(&self) -> bool {
        self.depth_bias_enabled
    }

    #[must_use]
    pub fn depth_test_enabled(&self) -> bool {
        self.depth_test_enabled
    }

    #[must_use]
    pub fn depth_write_enabled(&self) -> bool {
        self.depth_write_enabled
    }

    #[must_use]
    pub fn depth_clamp_enabled(&self) -> bool {
        self.depth_clamp_enabled
    }

    #[must_use]
    pub fn cull_style(&self) -> CullStyle {
        self.cull_style
    }

    #[must_use]
    pub fn stencil(&self) -> &StencilParams {
        &self.stencil
    }

    #[must_use]
    pub fn stencil_ref(&self) -> u32 {
        self.stencil.reference
    }

    #[must_use]
    pub fn front_face_ccw(&self) -> bool {
        self.front_face_ccw
    }

    #[must_use]
    pub fn clear_color(&self) -> Vec4 {
        self.clear_color
    }

    #[must_use]
    pub fn clear_depth(&self) -> f32 {
        self.clear_depth
    }

    // ─── Framebuffer targets ────────────────────────────────────────────────

    /// Stores this frame's targets. Warns when the number of bound color
    /// views differs from the number of configured slots.
    pub fn set_framebuffer_targets(&mut self, targets: FramebufferTargets) {
        let bound = targets.gbuffer.iter().take(self.num_render_targets).flatten().count();
        let configured = self.configured_render_target_count();
        if !targets.is_empty() && bound != configured {
            log::warn!("RenderPassState: {bound} render targets bound, {configured} configured");
        }
        self.framebuffer_targets = targets;
    }

    pub fn reset_framebuffer_targets(&mut self) {
        self.framebuffer_targets = FramebufferTargets::default();
    }

    #[must_use]
    pub fn framebuffer_targets(&self) -> &FramebufferTargets {
        &self.framebuffer_targets
    }

    // ─── wgpu export ────────────────────────────────────────────────────────

    /// Depth-stencil state for pipelines drawing into this pass, or `None`
    /// when no depth format is configured.
    #[must_use]
    pub fn depth_stencil_state(&self) -> Option<wgpu::DepthStencilState> {
        let format = self.depth_stencil_format?;

        let face = wgpu::StencilFaceState {
            compare: self.stencil.func,
            fail_op: self.stencil.fail_op,
            depth_fail_op: self.stencil.depth_fail_op,
            pass_op: self.stencil.pass_op,
        };
        let bias = if self.depth_bias_enabled {
            wgpu::DepthBiasState {
                constant: self.depth_bias as i32,
                slope_scale: self.slope_scaled_depth_bias,
                clamp: 0.0,
            }
        } else {
            wgpu::DepthBiasState::default()
        };

        Some(wgpu::DepthStencilState {
            format,
            depth_write_enabled: Some(self.depth_write_enabled),
            depth_compare: Some(if self.depth_test_enabled {
                self.depth_func
            } else {
                wgpu::CompareFunction::Always
            }),
            stencil: wgpu::StencilState {
                front: face,
                back: face,
                read_mask: self.stencil.mask,
                write_mask: self.stencil.mask,
            },
            bias,
        })
    }

    #[must_use]
    pub fn primitive_state(&self, mode: RenderMode, double_sided: bool) -> wgpu::PrimitiveState {
        wgpu::PrimitiveState {
            topology: mode.topology(),
            front_face: if self.front_face_ccw {
                wgpu::FrontFace::Ccw
            } else {
                wgpu::FrontFace::Cw
            },
            cull_mode: match mode {
                RenderMode::Solid => self.cull_style.cull_face(double_sided),
                RenderMode::MeshEdges | RenderMode::Points => None,
            },
            unclipped_depth: self.depth_clamp_enabled,
            ..Default::default()
        }
    }
}
