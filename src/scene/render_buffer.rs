use crate::renderer::device::TextureView;

use super::ScenePath;

/// A named slot in the render index holding an optional bound image view.
///
/// The slot is created empty when a task is constructed; the view is bound
/// (and rebound on resize or format change) during target resolution.
#[derive(Debug, Clone)]
pub struct RenderBuffer {
    id: ScenePath,
    target: Option<TextureView>,
}

impl RenderBuffer {
    #[must_use]
    pub fn new(id: ScenePath) -> Self {
        Self { id, target: None }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> ScenePath {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> Option<TextureView> {
        self.target
    }

    /// Binds `view`, returning the previously bound view.
    pub fn set_target(&mut self, view: TextureView) -> Option<TextureView> {
        self.target.replace(view)
    }

    pub fn clear_target(&mut self) -> Option<TextureView> {
        self.target.take()
    }

    /// Whether the bound view already has the given footprint and format.
    #[must_use]
    pub fn matches(&self, width: u32, height: u32, format: wgpu::TextureFormat) -> bool {
        self.target
            .is_some_and(|v| v.width == width && v.height == height && v.format == format)
    }
}
