//! Render-Target Resolution
//!
//! Guarantees that a render buffer holds a view whose size matches the
//! frame's final color target and whose format matches the request,
//! allocating a new image only when it does not.
//!
//! ```text
//! format None ───────────────► no target (slot disabled)
//! buffer missing ────────────► RenderBufferMissing
//! bound view matches ────────► reuse
//! otherwise ─────────────────► allocate, bind, release old image
//! ```

use crate::errors::{HydrogentError, Result};
use crate::renderer::device::{GraphicsDevice, TextureDesc, TextureView, ViewKind, is_depth_format};
use crate::scene::{RenderIndex, TargetId};

pub struct TargetResolver<'a> {
    owner: &'a str,
    index: &'a mut RenderIndex,
    device: &'a mut dyn GraphicsDevice,
    width: u32,
    height: u32,
}

impl<'a> TargetResolver<'a> {
    /// Creates a resolver that sizes every target after `final_view`.
    /// `owner` prefixes log lines.
    pub fn new(
        owner: &'a str,
        index: &'a mut RenderIndex,
        device: &'a mut dyn GraphicsDevice,
        final_view: &TextureView,
    ) -> Self {
        Self {
            owner,
            index,
            device,
            width: final_view.width,
            height: final_view.height,
        }
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Resolves the render buffer at `id` to a view of `format`.
    ///
    /// Returns `Ok(None)` when `format` is `None`.
    pub fn try_resolve(
        &mut self,
        id: TargetId,
        format: Option<wgpu::TextureFormat>,
        name: &str,
    ) -> Result<Option<TextureView>> {
        let Some(format) = format else {
            return Ok(None);
        };

        let buffer = self
            .index
            .render_buffer(id)
            .ok_or(HydrogentError::RenderBufferMissing(id))?;
        if buffer.matches(self.width, self.height, format) {
            return Ok(buffer.target());
        }

        let desc = TextureDesc::offscreen_target(name, self.width, self.height, format);
        let texture = self.device.create_texture(&desc)?;
        let kind = if is_depth_format(format) {
            ViewKind::DepthStencil
        } else {
            ViewKind::RenderTarget
        };
        let view = match self.device.default_view(texture, kind) {
            Ok(view) => view,
            Err(err) => {
                self.device.release_texture(texture);
                return Err(err);
            }
        };

        log::info!("{}: created {}x{} {} texture", self.owner, self.width, self.height, name);

        let previous = self
            .index
            .render_buffer_mut(id)
            .and_then(|buffer| buffer.set_target(view));
        if let Some(old) = previous.filter(|old| old.texture != view.texture) {
            self.device.release_texture(old.texture);
        }

        Ok(Some(view))
    }

    /// Like [`try_resolve`](Self::try_resolve), logging failures. The slot is
    /// disabled for this frame on error.
    pub fn resolve(&mut self, id: TargetId, format: Option<wgpu::TextureFormat>, name: &str) -> Option<TextureView> {
        match self.try_resolve(id, format, name) {
            Ok(view) => view,
            Err(err) => {
                log::error!("{}: failed to resolve {name}: {err}", self.owner);
                None
            }
        }
    }

    /// Shader-resource view of the image behind `view`.
    pub fn shader_resource_view(&mut self, view: &TextureView) -> Option<TextureView> {
        match self.device.default_view(view.texture, ViewKind::ShaderResource) {
            Ok(srv) => Some(srv),
            Err(err) => {
                log::error!("{}: {err}", self.owner);
                None
            }
        }
    }
}
