//! Headless recording device.
//!
//! Allocates opaque handles and appends every command to a shared
//! [`CommandLog`]. No GPU work is performed. Allocation failures can be
//! injected through [`FailurePolicy`].

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::{
    BufferDesc, BufferHandle, ClearDepthStencilFlags, GraphicsDevice, StateTransition, TextureDesc,
    TextureHandle, TextureView, ViewId, ViewKind,
};
use crate::errors::{HydrogentError, Result};

/// A command as seen by the device.
#[derive(Clone, Debug, PartialEq)]
pub enum DeviceCommand {
    CreateTexture { texture: TextureHandle, desc: TextureDesc },
    ReleaseTexture(TextureHandle),
    CreateBuffer { buffer: BufferHandle, desc: BufferDesc },
    UpdateBuffer { buffer: BufferHandle, offset: u64, data: Vec<u8> },
    TransitionStates(Vec<StateTransition>),
    SetRenderTargets { color: Vec<Option<ViewId>>, depth_stencil: Option<ViewId> },
    ClearRenderTarget { view: ViewId, color: [f32; 4] },
    ClearDepthStencil { view: ViewId, flags: ClearDepthStencilFlags, depth: f32, stencil: u8 },
    SetStencilRef(u32),
    CopyTexture { src: ViewId, dst: ViewId },
    Submit,
}

/// Shared, cloneable view of the recorded command stream.
#[derive(Clone, Default, Debug)]
pub struct CommandLog(Arc<Mutex<Vec<DeviceCommand>>>);

impl CommandLog {
    fn push(&self, command: DeviceCommand) {
        self.0.lock().push(command);
    }

    /// Copy of all commands recorded so far.
    #[must_use]
    pub fn snapshot(&self) -> Vec<DeviceCommand> {
        self.0.lock().clone()
    }

    /// Drains the log.
    pub fn take(&self) -> Vec<DeviceCommand> {
        std::mem::take(&mut *self.0.lock())
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    /// Number of recorded commands matching `pred`.
    pub fn count(&self, pred: impl Fn(&DeviceCommand) -> bool) -> usize {
        self.0.lock().iter().filter(|c| pred(c)).count()
    }

    #[must_use]
    pub fn texture_allocations(&self) -> usize {
        self.count(|c| matches!(c, DeviceCommand::CreateTexture { .. }))
    }
}

/// Which allocations the device should refuse.
#[derive(Clone, Debug, Default)]
pub struct FailurePolicy {
    pub fail_all_textures: bool,
    /// Texture names that fail to allocate.
    pub failing_texture_names: Vec<String>,
    pub fail_buffers: bool,
}

struct TextureEntry {
    desc: TextureDesc,
    views: FxHashMap<ViewKind, TextureView>,
}

/// Headless [`GraphicsDevice`].
pub struct RecordingDevice {
    log: CommandLog,
    policy: FailurePolicy,
    textures: FxHashMap<TextureHandle, TextureEntry>,
    buffers: FxHashMap<BufferHandle, BufferDesc>,
    next_id: u64,
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingDevice {
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(FailurePolicy::default())
    }

    #[must_use]
    pub fn with_policy(policy: FailurePolicy) -> Self {
        Self {
            log: CommandLog::default(),
            policy,
            textures: FxHashMap::default(),
            buffers: FxHashMap::default(),
            next_id: 1,
        }
    }

    /// Handle to the command stream; stays valid after the device is boxed.
    #[must_use]
    pub fn log(&self) -> CommandLog {
        self.log.clone()
    }

    #[must_use]
    pub fn live_texture_count(&self) -> usize {
        self.textures.len()
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl GraphicsDevice for RecordingDevice {
    fn name(&self) -> &str {
        "Recording Device"
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<TextureHandle> {
        let refused = self.policy.fail_all_textures
            || self.policy.failing_texture_names.iter().any(|n| *n == desc.name);
        if refused || desc.width == 0 || desc.height == 0 {
            return Err(HydrogentError::TextureCreation {
                name: desc.name.clone(),
                reason: if refused {
                    "allocation refused".to_string()
                } else {
                    format!("invalid size {}x{}", desc.width, desc.height)
                },
            });
        }

        let texture = TextureHandle(self.next_id());
        log::trace!(
            "RecordingDevice: creating texture {:?} ({}x{}, {:?})",
            desc.name,
            desc.width,
            desc.height,
            desc.format
        );
        self.textures.insert(
            texture,
            TextureEntry {
                desc: desc.clone(),
                views: FxHashMap::default(),
            },
        );
        self.log.push(DeviceCommand::CreateTexture {
            texture,
            desc: desc.clone(),
        });
        Ok(texture)
    }

    fn texture_desc(&self, texture: TextureHandle) -> Option<&TextureDesc> {
        self.textures.get(&texture).map(|e| &e.desc)
    }

    fn default_view(&mut self, texture: TextureHandle, kind: ViewKind) -> Result<TextureView> {
        let id = ViewId(self.next_id);
        let entry = self
            .textures
            .get_mut(&texture)
            .ok_or(HydrogentError::InvalidTexture)?;

        if let Some(view) = entry.views.get(&kind) {
            return Ok(*view);
        }
        if !entry.desc.supports_view(kind) {
            return Err(HydrogentError::ViewUnavailable {
                name: entry.desc.name.clone(),
                kind,
            });
        }

        let view = TextureView {
            id,
            texture,
            kind,
            format: entry.desc.format,
            width: entry.desc.width,
            height: entry.desc.height,
        };
        entry.views.insert(kind, view);
        self.next_id += 1;
        Ok(view)
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        if self.textures.remove(&texture).is_some() {
            self.log.push(DeviceCommand::ReleaseTexture(texture));
        }
    }

    fn create_buffer(&mut self, desc: &BufferDesc) -> Result<BufferHandle> {
        if self.policy.fail_buffers {
            return Err(HydrogentError::BufferCreation {
                name: desc.name.clone(),
                reason: "allocation refused".to_string(),
            });
        }
        let buffer = BufferHandle(self.next_id());
        log::trace!("RecordingDevice: creating buffer {:?} (size: {})", desc.name, desc.size);
        self.buffers.insert(buffer, desc.clone());
        self.log.push(DeviceCommand::CreateBuffer {
            buffer,
            desc: desc.clone(),
        });
        Ok(buffer)
    }

    fn update_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) {
        match self.buffers.get(&buffer) {
            Some(desc) if offset + data.len() as u64 <= desc.size => {
                self.log.push(DeviceCommand::UpdateBuffer {
                    buffer,
                    offset,
                    data: data.to_vec(),
                });
            }
            Some(desc) => log::error!(
                "RecordingDevice: update of {} bytes at {offset} overflows buffer {:?} ({} bytes)",
                data.len(),
                desc.name,
                desc.size
            ),
            None => log::error!("RecordingDevice: update of unknown buffer {buffer:?}"),
        }
    }

    fn transition_resource_states(&mut self, barriers: &[StateTransition]) {
        self.log.push(DeviceCommand::TransitionStates(barriers.to_vec()));
    }

    fn set_render_targets(&mut self, color: &[Option<TextureView>], depth_stencil: Option<TextureView>) {
        self.log.push(DeviceCommand::SetRenderTargets {
            color: color.iter().map(|v| v.map(|v| v.id)).collect(),
            depth_stencil: depth_stencil.map(|v| v.id),
        });
    }

    fn clear_render_target(&mut self, view: &TextureView, color: [f32; 4]) {
        self.log.push(DeviceCommand::ClearRenderTarget { view: view.id, color });
    }

    fn clear_depth_stencil(&mut self, view: &TextureView, flags: ClearDepthStencilFlags, depth: f32, stencil: u8) {
        self.log.push(DeviceCommand::ClearDepthStencil {
            view: view.id,
            flags,
            depth,
            stencil,
        });
    }

    fn set_stencil_ref(&mut self, reference: u32) {
        self.log.push(DeviceCommand::SetStencilRef(reference));
    }

    fn copy_texture(&mut self, src: &TextureView, dst: &TextureView) {
        self.log.push(DeviceCommand::CopyTexture {
            src: src.id,
            dst: dst.id,
        });
    }

    fn submit(&mut self) {
        self.log.push(DeviceCommand::Submit);
    }
}
