//! # Hydrogent
//!
//! Per-frame task engine of a Hydra-style render delegate.
//!
//! A frame is a fixed sequence of tasks, each driven through `sync`,
//! `prepare` and `execute`. Tasks resolve their offscreen render targets
//! against the size of the frame's final color target, publish resource ids
//! to later tasks through a per-frame context, upload the frame constants and
//! record clears and bindings on a [`GraphicsDevice`](renderer::device::GraphicsDevice).
//!
//! ```rust,ignore
//! use hydrogent::prelude::*;
//!
//! let mut index = RenderIndex::new();
//! let device = RecordingDevice::new();
//! let mut delegate = RenderDelegate::new(Box::new(device), DelegateSettings::default());
//!
//! let task_id = ScenePath::new("/tasks/beginFrame");
//! let mut graph = TaskGraph::new();
//! graph.add_task(Box::new(BeginFrameTask::new(task_id, &mut index)?), &mut index);
//!
//! let mut params = TaskParamsStore::new();
//! params.set(task_id, BeginFrameTaskParams {
//!     final_color_target_id: ScenePath::new("/swapchain"),
//!     camera_id: ScenePath::new("/cameras/main"),
//!     ..Default::default()
//! });
//!
//! graph.execute_frame(&mut index, &mut delegate, &params);
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod errors;
pub mod renderer;
pub mod scene;
pub mod utils;

pub use errors::{HydrogentError, Result};
pub use renderer::RenderDelegate;
pub use renderer::graph::{BeginFrameTask, CopySelectionDepthTask, FrameContext, FrameKey, SetupRenderingTask, Task, TaskGraph};
pub use scene::{RenderIndex, ScenePath};

pub mod prelude {
    pub use crate::errors::{HydrogentError, Result};
    pub use crate::renderer::delegate::RenderDelegate;
    pub use crate::renderer::device::{GraphicsDevice, RecordingDevice, TextureView, WgpuDevice};
    pub use crate::renderer::graph::{
        BeginFrameTask, CopySelectionDepthTask, DirtyBits, FrameContext, FrameKey, GBufferTarget, RenderPassState,
        SetupRenderingTask, Task, TaskGraph,
    };
    pub use crate::renderer::settings::{
        BeginFrameTaskParams, DelegateSettings, PassStateParams, RenderTargetFormats, SetupRenderingTaskParams,
        TaskParams,
    };
    pub use crate::scene::{Camera, Light, ParamsDelegate, RenderIndex, ScenePath, TaskParamsStore};
}
