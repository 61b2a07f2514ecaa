//! Utility Module
//!
//! - [`interner`]: global string interning backing [`ScenePath`](crate::scene::ScenePath)
//! - [`time`]: monotonic frame timer
//!
//! ```rust,ignore
//! use hydrogent::utils::interner;
//!
//! let a = interner::intern("/task/depthBuffer");
//! let b = interner::intern("/task/depthBuffer");
//! assert_eq!(a, b);
//! ```

pub mod interner;
pub mod time;

pub use interner::Symbol;
pub use time::FrameTimer;
