//! wgpu-backed device.
//!
//! Commands are encoded into one frame encoder which is submitted on
//! [`GraphicsDevice::submit`]. Clears are encoded as empty render passes with
//! `LoadOp::Clear`. Resource-state transitions are tracked by wgpu itself and
//! are only logged here.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::{
    BindFlags, BufferDesc, BufferHandle, ClearDepthStencilFlags, GraphicsDevice, StateTransition,
    TextureDesc, TextureHandle, TextureView, ViewId, ViewKind, is_depth_format,
};
use crate::errors::{HydrogentError, Result};

struct GpuTexture {
    texture: wgpu::Texture,
    desc: TextureDesc,
    views: FxHashMap<ViewKind, TextureView>,
}

struct GpuBuffer {
    buffer: wgpu::Buffer,
    desc: BufferDesc,
}

#[derive(Default)]
struct BoundTargets {
    color: SmallVec<[Option<TextureView>; 8]>,
    depth_stencil: Option<TextureView>,
}

pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    textures: FxHashMap<TextureHandle, GpuTexture>,
    buffers: FxHashMap<BufferHandle, GpuBuffer>,
    views: FxHashMap<ViewId, wgpu::TextureView>,
    encoder: Option<wgpu::CommandEncoder>,
    bound: BoundTargets,
    stencil_ref: u32,
    next_id: u64,
}

impl WgpuDevice {
    #[must_use]
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            textures: FxHashMap::default(),
            buffers: FxHashMap::default(),
            views: FxHashMap::default(),
            encoder: None,
            bound: BoundTargets::default(),
            stencil_ref: 0,
            next_id: 1,
        }
    }

    /// Creates a device on the default adapter without a presentation surface.
    pub fn new_headless() -> Result<Self> {
        pollster::block_on(async {
            let instance = wgpu::Instance::default();
            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::default(),
                    compatible_surface: None,
                    force_fallback_adapter: false,
                })
                .await
                .map_err(|e| HydrogentError::AdapterRequestFailed(e.to_string()))?;

            let (device, queue) = adapter
                .request_device(&wgpu::DeviceDescriptor {
                    label: Some("Hydrogent Device"),
                    ..Default::default()
                })
                .await?;

            Ok(Self::new(device, queue))
        })
    }

    #[inline]
    #[must_use]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[inline]
    #[must_use]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    #[must_use]
    pub fn texture(&self, texture: TextureHandle) -> Option<&wgpu::Texture> {
        self.textures.get(&texture).map(|t| &t.texture)
    }

    #[must_use]
    pub fn view(&self, view: ViewId) -> Option<&wgpu::TextureView> {
        self.views.get(&view)
    }

    #[must_use]
    pub fn buffer(&self, buffer: BufferHandle) -> Option<&wgpu::Buffer> {
        self.buffers.get(&buffer).map(|b| &b.buffer)
    }

    /// Registers an externally created texture (e.g. a presentation target).
    pub fn import_texture(&mut self, name: &str, texture: wgpu::Texture) -> TextureHandle {
        let usage = texture.usage();
        let format = texture.format();
        let mut bind_flags = BindFlags::empty();
        if usage.contains(wgpu::TextureUsages::RENDER_ATTACHMENT) {
            bind_flags |= if is_depth_format(format) {
                BindFlags::DEPTH_STENCIL
            } else {
                BindFlags::RENDER_TARGET
            };
        }
        if usage.contains(wgpu::TextureUsages::TEXTURE_BINDING) {
            bind_flags |= BindFlags::SHADER_RESOURCE;
        }

        let handle = TextureHandle(self.next_id());
        let desc = TextureDesc {
            name: name.to_string(),
            width: texture.width(),
            height: texture.height(),
            format,
            bind_flags,
        };
        self.textures.insert(
            handle,
            GpuTexture {
                texture,
                desc,
                views: FxHashMap::default(),
            },
        );
        handle
    }

    /// Opens a render pass over the currently bound targets, loading their
    /// contents and applying the current stencil reference.
    pub fn begin_bound_pass(&mut self, label: &str) -> Option<wgpu::RenderPass<'_>> {
        let views = &self.views;
        let color_attachments: SmallVec<[Option<wgpu::RenderPassColorAttachment<'_>>; 8]> = self
            .bound
            .color
            .iter()
            .map(|slot| {
                slot.and_then(|v| views.get(&v.id))
                    .map(|view| wgpu::RenderPassColorAttachment {
                        view,
                        depth_slice: None,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })
            })
            .collect();

        let depth_stencil_attachment = self.bound.depth_stencil.and_then(|target| {
            views.get(&target.id).map(|view| wgpu::RenderPassDepthStencilAttachment {
                view,
                depth_ops: target.format.has_depth_aspect().then_some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: target.format.has_stencil_aspect().then_some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
            })
        });

        if color_attachments.iter().all(Option::is_none) && depth_stencil_attachment.is_none() {
            log::error!("WgpuDevice: no render targets bound for pass {label}");
            return None;
        }

        let encoder = frame_encoder(&mut self.encoder, &self.device);
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &color_attachments,
            depth_stencil_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        pass.set_stencil_reference(self.stencil_ref);
        Some(pass)
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

fn frame_encoder<'a>(encoder: &'a mut Option<wgpu::CommandEncoder>, device: &wgpu::Device) -> &'a mut wgpu::CommandEncoder {
    encoder.get_or_insert_with(|| {
        device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Hydrogent Frame Encoder"),
        })
    })
}

fn texture_usages(bind_flags: BindFlags) -> wgpu::TextureUsages {
    let mut usage = wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::COPY_DST;
    if bind_flags.intersects(BindFlags::RENDER_TARGET | BindFlags::DEPTH_STENCIL) {
        usage |= wgpu::TextureUsages::RENDER_ATTACHMENT;
    }
    if bind_flags.contains(BindFlags::SHADER_RESOURCE) {
        usage |= wgpu::TextureUsages::TEXTURE_BINDING;
    }
    usage
}

impl GraphicsDevice for WgpuDevice {
    fn name(&self) -> &str {
        "wgpu"
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<TextureHandle> {
        let max_dim = self.device.limits().max_texture_dimension_2d;
        if desc.width == 0 || desc.height == 0 || desc.width > max_dim || desc.height > max_dim {
            return Err(HydrogentError::TextureCreation {
                name: desc.name.clone(),
                reason: format!("size {}x{} outside 1..={max_dim}", desc.width, desc.height),
            });
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&desc.name),
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: desc.format,
            usage: texture_usages(desc.bind_flags),
            view_formats: &[],
        });

        let handle = TextureHandle(self.next_id());
        self.textures.insert(
            handle,
            GpuTexture {
                texture,
                desc: desc.clone(),
                views: FxHashMap::default(),
            },
        );
        Ok(handle)
    }

    fn texture_desc(&self, texture: TextureHandle) -> Option<&TextureDesc> {
        self.textures.get(&texture).map(|t| &t.desc)
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

        let format = entry.desc.format;
        // Sampling a combined depth-stencil image reads the depth aspect only.
        let aspect = if kind == ViewKind::ShaderResource && format.has_depth_aspect() && format.has_stencil_aspect() {
            wgpu::TextureAspect::DepthOnly
        } else {
            wgpu::TextureAspect::All
        };
        let gpu_view = entry.texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&entry.desc.name),
            aspect,
            ..Default::default()
        });

        let view = TextureView {
            id,
            texture,
            kind,
            format,
            width: entry.desc.width,
            height: entry.desc.height,
        };
        entry.views.insert(kind, view);
        self.views.insert(id, gpu_view);
        self.next_id += 1;
        Ok(view)
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        if let Some(entry) = self.textures.remove(&texture) {
            for view in entry.views.values() {
                self.views.remove(&view.id);
            }
        }
    }

    fn create_buffer(&mut self, desc: &BufferDesc) -> Result<BufferHandle> {
        let mut usage = wgpu::BufferUsages::COPY_DST;
        if desc.bind_flags.contains(BindFlags::UNIFORM_BUFFER) {
            usage |= wgpu::BufferUsages::UNIFORM;
        }
        if desc.bind_flags.contains(BindFlags::SHADER_RESOURCE) {
            usage |= wgpu::BufferUsages::STORAGE;
        }
        if desc.size > self.device.limits().max_buffer_size {
            return Err(HydrogentError::BufferCreation {
                name: desc.name.clone(),
                reason: format!("size {} exceeds device limit", desc.size),
            });
        }

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&desc.name),
            size: desc.size,
            usage,
            mapped_at_creation: false,
        });

        let handle = BufferHandle(self.next_id());
        self.buffers.insert(
            handle,
            GpuBuffer {
                buffer,
                desc: desc.clone(),
            },
        );
        Ok(handle)
    }

    fn update_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) {
        let Some(entry) = self.buffers.get(&buffer) else {
            log::error!("WgpuDevice: update of unknown buffer {buffer:?}");
            return;
        };
        if offset + data.len() as u64 > entry.desc.size {
            log::error!(
                "WgpuDevice: update of {} bytes at {offset} overflows buffer {:?}",
                data.len(),
                entry.desc.name
            );
            return;
        }
        self.queue.write_buffer(&entry.buffer, offset, data);
    }

    fn transition_resource_states(&mut self, barriers: &[StateTransition]) {
        for barrier in barriers {
            log::trace!(
                "WgpuDevice: {:?} {:?} -> {:?}",
                barrier.resource,
                barrier.old_state,
                barrier.new_state
            );
        }
    }

    fn set_render_targets(&mut self, color: &[Option<TextureView>], depth_stencil: Option<TextureView>) {
        self.bound.color = color.iter().copied().collect();
        self.bound.depth_stencil = depth_stencil;
    }

    fn clear_render_target(&mut self, view: &TextureView, color: [f32; 4]) {
        let Some(target) = self.views.get(&view.id) else {
            log::error!("WgpuDevice: clear of unknown view {:?}", view.id);
            return;
        };
        let encoder = frame_encoder(&mut self.encoder, &self.device);
        let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Clear Render Target"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: f64::from(color[0]),
                        g: f64::from(color[1]),
                        b: f64::from(color[2]),
                        a: f64::from(color[3]),
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
    }

    fn clear_depth_stencil(&mut self, view: &TextureView, flags: ClearDepthStencilFlags, depth: f32, stencil: u8) {
        let Some(target) = self.views.get(&view.id) else {
            log::error!("WgpuDevice: clear of unknown view {:?}", view.id);
            return;
        };

        let depth_ops = view.format.has_depth_aspect().then(|| wgpu::Operations {
            load: if flags.contains(ClearDepthStencilFlags::DEPTH) {
                wgpu::LoadOp::Clear(depth)
            } else {
                wgpu::LoadOp::Load
            },
            store: wgpu::StoreOp::Store,
        });
        let stencil_ops = view.format.has_stencil_aspect().then(|| wgpu::Operations {
            load: if flags.contains(ClearDepthStencilFlags::STENCIL) {
                wgpu::LoadOp::Clear(u32::from(stencil))
            } else {
                wgpu::LoadOp::Load
            },
            store: wgpu::StoreOp::Store,
        });

        let encoder = frame_encoder(&mut self.encoder, &self.device);
        let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Clear Depth Stencil"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target,
                depth_ops,
                stencil_ops,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
    }

    fn set_stencil_ref(&mut self, reference: u32) {
        self.stencil_ref = reference;
    }

    fn copy_texture(&mut self, src: &TextureView, dst: &TextureView) {
        let (Some(src_tex), Some(dst_tex)) = (self.textures.get(&src.texture), self.textures.get(&dst.texture)) else {
            log::error!("WgpuDevice: copy between unknown textures");
            return;
        };
        let encoder = frame_encoder(&mut self.encoder, &self.device);
        encoder.copy_texture_to_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &src_tex.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyTextureInfo {
                texture: &dst_tex.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::Extent3d {
                width: src.width.min(dst.width),
                height: src.height.min(dst.height),
                depth_or_array_layers: 1,
            },
        );
    }

    fn submit(&mut self) {
        if let Some(encoder) = self.encoder.take() {
            self.queue.submit(std::iter::once(encoder.finish()));
        }
    }
}
