//! Render Delegate
//!
//! Owns the device and the renderer-wide state that tasks read each frame:
//! the frame-constant buffer, the ordered light registry, and the render
//! parameters. A delegate is passed explicitly into every task phase.

use crate::renderer::device::{BindFlags, BufferDesc, BufferHandle, GraphicsDevice};
use crate::renderer::render_param::RenderParam;
use crate::renderer::settings::DelegateSettings;
use crate::renderer::uniforms::{PbrFrameAttribs, PbrRendererShaderParameters};
use crate::scene::LightRegistry;

pub struct RenderDelegate {
    device: Box<dyn GraphicsDevice>,
    frame_attribs_cb: Option<BufferHandle>,
    lights: LightRegistry,
    render_param: Option<RenderParam>,
    settings: DelegateSettings,
}

impl RenderDelegate {
    /// Creates the delegate and its frame-constant buffer.
    ///
    /// A buffer allocation failure is logged; tasks then skip the frame
    /// constant update.
    pub fn new(mut device: Box<dyn GraphicsDevice>, settings: DelegateSettings) -> Self {
        let frame_attribs_cb = match device.create_buffer(&BufferDesc {
            name: "PBR frame attribs CB".to_string(),
            size: PbrFrameAttribs::SIZE,
            bind_flags: BindFlags::UNIFORM_BUFFER,
        }) {
            Ok(buffer) => Some(buffer),
            Err(err) => {
                log::error!("RenderDelegate: {err}");
                None
            }
        };

        log::debug!("RenderDelegate: created on {} device", device.name());

        Self {
            device,
            frame_attribs_cb,
            lights: LightRegistry::default(),
            render_param: Some(RenderParam::new()),
            settings,
        }
    }

    #[inline]
    #[must_use]
    pub fn device(&self) -> &dyn GraphicsDevice {
        self.device.as_ref()
    }

    #[inline]
    pub fn device_mut(&mut self) -> &mut dyn GraphicsDevice {
        self.device.as_mut()
    }

    #[inline]
    #[must_use]
    pub fn frame_attribs_buffer(&self) -> Option<BufferHandle> {
        self.frame_attribs_cb
    }

    #[inline]
    #[must_use]
    pub fn lights(&self) -> &LightRegistry {
        &self.lights
    }

    #[inline]
    pub fn lights_mut(&mut self) -> &mut LightRegistry {
        &mut self.lights
    }

    #[must_use]
    pub fn render_param(&self) -> Option<&RenderParam> {
        self.render_param.as_ref()
    }

    pub fn render_param_mut(&mut self) -> Option<&mut RenderParam> {
        self.render_param.as_mut()
    }

    pub fn set_render_param(&mut self, render_param: Option<RenderParam>) {
        self.render_param = render_param;
    }

    #[must_use]
    pub fn settings(&self) -> &DelegateSettings {
        &self.settings
    }

    /// Writes the renderer-owned shader parameters into `params`, leaving
    /// every other field untouched.
    pub fn internal_shader_parameters(&self, params: &mut PbrRendererShaderParameters) {
        let debug_view = self
            .render_param
            .as_ref()
            .map_or(self.settings.debug_view, |rp| rp.debug_view);

        params.prefiltered_cube_mip_levels = self.settings.prefiltered_cube_mip_levels;
        params.debug_view_type = debug_view as i32;
    }
}
