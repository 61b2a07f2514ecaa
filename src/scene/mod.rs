//! Scene-side collaborators of the task engine.
//!
//! - [`ScenePath`]: interned identifiers (task ids, camera ids, target slots)
//! - [`RenderIndex`]: render buffers, cameras, change tracking
//! - [`Camera`], [`Light`]: attribute objects read when building frame constants
//! - [`ParamsDelegate`]: per-task parameter blocks

pub mod camera;
pub mod change_tracker;
pub mod light;
pub mod params;
pub mod path;
pub mod render_buffer;
pub mod render_index;

pub use camera::{Camera, ProjectionType};
pub use change_tracker::{ChangeTracker, DirtyBits};
pub use light::{Light, LightRegistry};
pub use params::{ParamsDelegate, TaskParamsStore};
pub use path::{ScenePath, TargetId};
pub use render_buffer::RenderBuffer;
pub use render_index::{RenderBufferKey, RenderIndex};
