//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`HydrogentError`] covers:
//! - task construction failures
//! - render-target resolution failures (missing slots, failed allocations)
//! - GPU device initialization failures
//!
//! Task phases (`sync`, `prepare`, `execute`) never return these errors to the
//! frame loop. Failures are logged at the phase boundary and the affected
//! sub-step is skipped for the current frame.
//!
//! ```rust,ignore
//! use hydrogent::errors::{HydrogentError, Result};
//!
//! fn resolve() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::renderer::device::ViewKind;
use crate::scene::ScenePath;

/// The main error type for the crate.
#[derive(Error, Debug)]
pub enum HydrogentError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// A task was constructed with an empty id.
    #[error("Task id must not be empty")]
    InvalidTaskId,

    /// No render buffer is registered at the given path.
    #[error("Render buffer is not set at Id {0}")]
    RenderBufferMissing(ScenePath),

    // ========================================================================
    // Device Resource Errors
    // ========================================================================
    /// The device refused to allocate a texture.
    #[error("Failed to create {name} texture: {reason}")]
    TextureCreation {
        /// Debug name of the texture
        name: String,
        /// Device-provided reason
        reason: String,
    },

    /// The device refused to allocate a buffer.
    #[error("Failed to create {name} buffer: {reason}")]
    BufferCreation {
        /// Debug name of the buffer
        name: String,
        /// Device-provided reason
        reason: String,
    },

    /// A texture handle does not belong to this device (or was released).
    #[error("Invalid texture handle")]
    InvalidTexture,

    /// A buffer handle does not belong to this device (or was released).
    #[error("Invalid buffer handle")]
    InvalidBuffer,

    /// The texture cannot provide a view of the requested kind.
    #[error("Texture {name} has no {kind:?} view")]
    ViewUnavailable {
        /// Debug name of the texture
        name: String,
        /// Requested view kind
        kind: ViewKind,
    },

    // ========================================================================
    // GPU Initialization Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),
}

/// Alias for `Result<T, HydrogentError>`.
pub type Result<T> = std::result::Result<T, HydrogentError>;
