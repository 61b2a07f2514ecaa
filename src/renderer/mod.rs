//! Renderer Module
//!
//! Everything below the scene side of the task engine:
//!
//! - [`device`]: the [`GraphicsDevice`](device::GraphicsDevice) abstraction and its implementations
//! - [`delegate`]: the [`RenderDelegate`] handed to every task phase
//! - [`graph`]: frame context, render pass state, tasks, and the task graph
//! - [`settings`]: task parameter blocks and delegate settings
//! - [`uniforms`]: frame constant layouts
//! - [`render_param`]: frame timing and render mode

pub mod delegate;
pub mod device;
pub mod graph;
pub mod render_param;
pub mod settings;
pub mod uniforms;

pub use delegate::RenderDelegate;
pub use render_param::{DebugView, RenderMode, RenderParam};
