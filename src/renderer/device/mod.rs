//! Graphics Device Abstraction
//!
//! The task engine talks to the GPU through the [`GraphicsDevice`] trait only.
//! Resources are referred to by small `Copy` handles; image views carry the
//! description of the image they were created from so that render-target
//! resolution can validate size and format without a device round-trip.
//!
//! Two implementations are provided:
//! - [`RecordingDevice`]: headless, records every command (tests, tooling)
//! - [`WgpuDevice`]: backed by `wgpu`

mod recording;
mod wgpu_device;

pub use recording::{CommandLog, DeviceCommand, FailurePolicy, RecordingDevice};
pub use wgpu_device::WgpuDevice;

use bitflags::bitflags;

use crate::errors::Result;

// ─── Handles ─────────────────────────────────────────────────────────────────

/// Opaque handle to a device texture.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TextureHandle(pub(crate) u64);

/// Opaque handle to a device buffer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BufferHandle(pub(crate) u64);

/// Unique id of a texture view. Two views compare equal only if they are the
/// same device object.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ViewId(pub(crate) u64);

// ─── Descriptors ─────────────────────────────────────────────────────────────

bitflags! {
    /// How a resource may be bound to the pipeline.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct BindFlags: u32 {
        const RENDER_TARGET   = 1 << 0;
        const DEPTH_STENCIL   = 1 << 1;
        const SHADER_RESOURCE = 1 << 2;
        const UNIFORM_BUFFER  = 1 << 3;
    }
}

bitflags! {
    /// Aspects touched by [`GraphicsDevice::clear_depth_stencil`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ClearDepthStencilFlags: u8 {
        const DEPTH   = 1 << 0;
        const STENCIL = 1 << 1;
    }
}

/// Kind of default view requested from a texture.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ViewKind {
    RenderTarget,
    DepthStencil,
    ShaderResource,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureDesc {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    pub bind_flags: BindFlags,
}

impl TextureDesc {
    /// Describes an offscreen target: depth-stencil + shader-read for depth
    /// formats, render-target + shader-read otherwise.
    #[must_use]
    pub fn offscreen_target(name: &str, width: u32, height: u32, format: wgpu::TextureFormat) -> Self {
        let bind_flags = if is_depth_format(format) {
            BindFlags::DEPTH_STENCIL | BindFlags::SHADER_RESOURCE
        } else {
            BindFlags::RENDER_TARGET | BindFlags::SHADER_RESOURCE
        };
        Self {
            name: name.to_string(),
            width,
            height,
            format,
            bind_flags,
        }
    }

    /// Whether this texture can provide a default view of `kind`.
    #[must_use]
    pub fn supports_view(&self, kind: ViewKind) -> bool {
        match kind {
            ViewKind::RenderTarget => {
                self.bind_flags.contains(BindFlags::RENDER_TARGET) && !is_depth_format(self.format)
            }
            ViewKind::DepthStencil => {
                self.bind_flags.contains(BindFlags::DEPTH_STENCIL) && is_depth_format(self.format)
            }
            ViewKind::ShaderResource => self.bind_flags.contains(BindFlags::SHADER_RESOURCE),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BufferDesc {
    pub name: String,
    pub size: u64,
    pub bind_flags: BindFlags,
}

/// A view onto a device texture.
///
/// Carries the footprint of the underlying image so that callers can
/// check compatibility without querying the device.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TextureView {
    pub id: ViewId,
    pub texture: TextureHandle,
    pub kind: ViewKind,
    pub format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
}

impl TextureView {
    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

// ─── State Transitions ───────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ResourceState {
    Unknown,
    ConstantBuffer,
    RenderTarget,
    DepthWrite,
    ShaderResource,
    CopySource,
    CopyDest,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DeviceResource {
    Texture(TextureHandle),
    Buffer(BufferHandle),
}

/// A resource barrier.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct StateTransition {
    pub resource: DeviceResource,
    pub old_state: ResourceState,
    pub new_state: ResourceState,
    /// Record `new_state` as the tracked state of the resource.
    pub update_state: bool,
}

// ─── Device Trait ────────────────────────────────────────────────────────────

/// Device interface consumed by the task engine.
///
/// Commands are recorded in call order on a single command stream; `submit`
/// closes the frame's stream.
pub trait GraphicsDevice {
    fn name(&self) -> &str;

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<TextureHandle>;

    fn texture_desc(&self, texture: TextureHandle) -> Option<&TextureDesc>;

    /// Returns the full-resource view of `kind`. Repeated calls return the
    /// same view.
    fn default_view(&mut self, texture: TextureHandle, kind: ViewKind) -> Result<TextureView>;

    fn release_texture(&mut self, texture: TextureHandle);

    fn create_buffer(&mut self, desc: &BufferDesc) -> Result<BufferHandle>;

    fn update_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]);

    fn transition_resource_states(&mut self, barriers: &[StateTransition]);

    /// Binds color targets by slot and an optional depth-stencil target.
    fn set_render_targets(&mut self, color: &[Option<TextureView>], depth_stencil: Option<TextureView>);

    fn clear_render_target(&mut self, view: &TextureView, color: [f32; 4]);

    fn clear_depth_stencil(&mut self, view: &TextureView, flags: ClearDepthStencilFlags, depth: f32, stencil: u8);

    fn set_stencil_ref(&mut self, reference: u32);

    fn copy_texture(&mut self, src: &TextureView, dst: &TextureView);

    fn submit(&mut self);
}

/// Whether `format` has a depth and/or stencil aspect.
#[inline]
#[must_use]
pub fn is_depth_format(format: wgpu::TextureFormat) -> bool {
    format.is_depth_stencil_format()
}
