//! Framebuffer target slots and the per-frame set of resolved views.

use crate::renderer::device::TextureView;
use crate::renderer::graph::frame_context::FrameKey;

pub const GBUFFER_TARGET_COUNT: usize = 7;

/// Upper bound on simultaneously bound color targets.
pub const MAX_RENDER_TARGETS: usize = 8;

/// G-buffer slots, in binding order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(usize)]
pub enum GBufferTarget {
    SceneColor = 0,
    MeshId = 1,
    MotionVector = 2,
    Normal = 3,
    BaseColor = 4,
    Material = 5,
    Ibl = 6,
}

impl GBufferTarget {
    pub const ALL: [Self; GBUFFER_TARGET_COUNT] = [
        Self::SceneColor,
        Self::MeshId,
        Self::MotionVector,
        Self::Normal,
        Self::BaseColor,
        Self::Material,
        Self::Ibl,
    ];

    #[must_use]
    pub fn default_format(self) -> wgpu::TextureFormat {
        match self {
            Self::SceneColor | Self::Normal | Self::Ibl => wgpu::TextureFormat::Rgba16Float,
            Self::MeshId => wgpu::TextureFormat::R32Float,
            Self::MotionVector => wgpu::TextureFormat::Rg16Float,
            Self::BaseColor => wgpu::TextureFormat::Rgba8Unorm,
            Self::Material => wgpu::TextureFormat::Rg8Unorm,
        }
    }

    /// Frame context key the slot's render buffer id is published under.
    #[must_use]
    pub fn frame_key(self) -> FrameKey {
        match self {
            Self::SceneColor => FrameKey::OffscreenColorTarget,
            Self::MeshId => FrameKey::MeshIdTarget,
            Self::MotionVector => FrameKey::MotionVectorsTarget,
            Self::Normal => FrameKey::NormalTarget,
            Self::BaseColor => FrameKey::BaseColorTarget,
            Self::Material => FrameKey::MaterialDataTarget,
            Self::Ibl => FrameKey::IblTarget,
        }
    }

    /// Child name of the slot's render buffer under the owning task.
    #[must_use]
    pub fn token(self) -> &'static str {
        self.frame_key().token()
    }
}

/// Image views resolved for one frame.
///
/// Empty (no final color view) until a task's `prepare` succeeds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FramebufferTargets {
    pub final_color: Option<TextureView>,
    /// Render-target views, indexed by [`GBufferTarget`].
    pub gbuffer: [Option<TextureView>; GBUFFER_TARGET_COUNT],
    /// Shader-resource views of the same images.
    pub gbuffer_srvs: [Option<TextureView>; GBUFFER_TARGET_COUNT],
    pub selection_depth: Option<TextureView>,
    pub depth: Option<TextureView>,
    pub closest_selected_location: [Option<TextureView>; 2],
}

impl FramebufferTargets {
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.final_color.is_none()
    }

    #[inline]
    #[must_use]
    pub fn gbuffer(&self, target: GBufferTarget) -> Option<TextureView> {
        self.gbuffer[target as usize]
    }

    #[inline]
    #[must_use]
    pub fn gbuffer_srv(&self, target: GBufferTarget) -> Option<TextureView> {
        self.gbuffer_srvs[target as usize]
    }

    /// Number of resolved G-buffer render-target views.
    #[must_use]
    pub fn bound_color_count(&self) -> usize {
        self.gbuffer.iter().flatten().count()
    }
}
