//! Render Parameters
//!
//! Renderer state shared by every task of a frame: frame timing written by
//! the Begin-Frame task, the rasterization mode, and the debug view.

/// How geometry is rasterized by the draw passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderMode {
    #[default]
    Solid,
    MeshEdges,
    Points,
}

impl RenderMode {
    #[must_use]
    pub fn topology(self) -> wgpu::PrimitiveTopology {
        match self {
            Self::Solid => wgpu::PrimitiveTopology::TriangleList,
            Self::MeshEdges => wgpu::PrimitiveTopology::LineList,
            Self::Points => wgpu::PrimitiveTopology::PointList,
        }
    }
}

/// Material channel visualized instead of the shaded result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum DebugView {
    #[default]
    None = 0,
    BaseColor = 1,
    Normal = 2,
    Occlusion = 3,
    Emissive = 4,
    Metallic = 5,
    Roughness = 6,
    MotionVectors = 7,
}

/// Renderer state shared by all tasks of a frame.
#[derive(Debug, Clone, Default)]
pub struct RenderParam {
    frame_time: f64,
    elapsed_time: f32,
    frame_number: u64,
    pub render_mode: RenderMode,
    pub debug_view: DebugView,
}

impl RenderParam {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the renderer started, sampled at the start of the frame.
    #[must_use]
    pub fn frame_time(&self) -> f64 {
        self.frame_time
    }

    /// Seconds since the previous frame.
    #[must_use]
    pub fn elapsed_time(&self) -> f32 {
        self.elapsed_time
    }

    #[must_use]
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    pub fn set_frame_time(&mut self, frame_time: f64) {
        self.frame_time = frame_time;
    }

    pub fn set_elapsed_time(&mut self, elapsed_time: f32) {
        self.elapsed_time = elapsed_time;
    }

    /// Starts a new frame.
    pub fn advance_frame(&mut self) {
        self.frame_number += 1;
    }
}
