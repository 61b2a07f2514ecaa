//! Task Engine
//!
//! Per-frame execution of [`Task`]s against a [`GraphicsDevice`](crate::renderer::device::GraphicsDevice).
//!
//! - [`frame_context`]: per-frame publication channel between tasks
//! - [`render_pass_state`]: fixed-function state and resolved framebuffer targets
//! - [`target_resolver`]: lookup-or-allocate of render targets
//! - [`task_graph`]: ordered Sync / Prepare / Execute driver
//! - [`tasks`]: built-in tasks

pub mod frame_context;
pub mod framebuffer;
pub mod render_pass_state;
pub mod target_resolver;
pub mod task;
pub mod task_graph;
pub mod tasks;

pub use frame_context::{FrameContext, FrameKey, FrameValue};
pub use framebuffer::{FramebufferTargets, GBUFFER_TARGET_COUNT, GBufferTarget, MAX_RENDER_TARGETS};
pub use render_pass_state::{CullStyle, RenderPassState, SharedRenderPassState, StencilParams};
pub use target_resolver::TargetResolver;
pub use task::{DirtyBits, Task, TaskState};
pub use task_graph::TaskGraph;
pub use tasks::{BeginFrameTask, CopySelectionDepthTask, SetupRenderingTask};
