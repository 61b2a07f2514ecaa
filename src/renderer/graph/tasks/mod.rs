//! Built-in tasks.
//!
//! - [`BeginFrameTask`]: G-buffer targets and frame constants
//! - [`SetupRenderingTask`]: offscreen color and mesh id targets
//! - [`CopySelectionDepthTask`]: copies the selection depth into the main depth buffer

mod begin_frame;
mod copy_selection_depth;
mod setup_rendering;

pub use begin_frame::BeginFrameTask;
pub use copy_selection_depth::CopySelectionDepthTask;
pub use setup_rendering::SetupRenderingTask;

use glam::Vec4;

use crate::renderer::device::{ClearDepthStencilFlags, GraphicsDevice, TextureView};
use crate::renderer::graph::framebuffer::FramebufferTargets;
use crate::renderer::graph::render_pass_state::SharedRenderPassState;
use crate::renderer::graph::task::TaskState;
use crate::scene::{RenderIndex, ScenePath, TargetId};

/// Creates the render buffer `task_id/token` and returns its id.
fn insert_render_buffer(index: &mut RenderIndex, task_id: ScenePath, token: &str) -> TargetId {
    let id = task_id.append_child(token);
    index.insert_render_buffer(id);
    id
}

/// Removes the task's render buffers and releases their images.
fn remove_render_buffers(index: &mut RenderIndex, device: &mut dyn GraphicsDevice, ids: &[TargetId]) {
    for &id in ids {
        if let Some(view) = index.remove_render_buffer(id).and_then(|b| b.target()) {
            device.release_texture(view.texture);
        }
    }
}

/// Looks up the view bound to the final color render buffer.
fn final_color_view(owner: &str, index: &RenderIndex, id: TargetId) -> Option<TextureView> {
    if id.is_empty() {
        log::error!("{owner}: final color target id is not set");
        return None;
    }
    let view = index.render_buffer_target(id);
    if view.is_none() {
        log::error!("{owner}: unable to get final color target from Bprim {id}");
    }
    view
}

/// The targets `execute` may use, or `None` (logged) when the task was not
/// prepared this frame or resolved nothing.
fn executable_targets(owner: &str, state: TaskState, pass_state: &SharedRenderPassState) -> Option<FramebufferTargets> {
    if !state.is_prepared() {
        log::error!("{owner}: render index is not set. This likely indicates that prepare() has not been called");
        return None;
    }
    let targets = *pass_state.read().framebuffer_targets();
    if targets.is_empty() {
        log::error!("{owner}: framebuffer targets are empty");
        return None;
    }
    Some(targets)
}

/// Binds `colors` with `depth_stencil`, clears slot 0 to `clear_color` and
/// every other bound slot to zero, clears depth, then sets the stencil ref.
fn bind_and_clear(
    device: &mut dyn GraphicsDevice,
    colors: &[Option<TextureView>],
    depth_stencil: Option<TextureView>,
    clear_color: Vec4,
    clear_depth: f32,
    stencil_ref: u32,
) {
    device.set_render_targets(colors, depth_stencil);

    for (slot, view) in colors.iter().enumerate() {
        if let Some(view) = view {
            let color = if slot == 0 { clear_color.to_array() } else { [0.0; 4] };
            device.clear_render_target(view, color);
        }
    }

    if let Some(depth) = depth_stencil {
        device.clear_depth_stencil(&depth, ClearDepthStencilFlags::DEPTH, clear_depth, 0);
    }

    device.set_stencil_ref(stencil_ref);
}
