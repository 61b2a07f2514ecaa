//! Task Trait
//!
//! A task is one unit of per-frame GPU work. The frame loop drives every
//! task through three phases, strictly in order:
//!
//! - `sync`: re-read the parameter block when the `PARAMS` dirty bit is set
//! - `prepare`: publish resource ids into the [`FrameContext`], resolve
//!   render targets
//! - `execute`: record device commands using the targets resolved in
//!   `prepare`
//!
//! Phases never fail the frame. Errors are logged and the affected step is
//! skipped; the next frame's cycle is the recovery path.

use crate::renderer::delegate::RenderDelegate;
use crate::renderer::graph::frame_context::FrameContext;
use crate::scene::{ParamsDelegate, RenderIndex, ScenePath};

pub use crate::scene::DirtyBits;

/// Lifecycle position of a task within the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskState {
    #[default]
    Uninitialized,
    Synced,
    Prepared,
    Executed,
}

impl TaskState {
    /// Whether `execute` may record commands.
    #[inline]
    #[must_use]
    pub fn is_prepared(self) -> bool {
        self == Self::Prepared
    }
}

pub trait Task {
    fn id(&self) -> ScenePath;

    /// Short name used as a log prefix.
    fn name(&self) -> &str;

    /// Dirty bits the task starts with when registered.
    fn initial_dirty_bits(&self) -> DirtyBits {
        DirtyBits::all()
    }

    /// Re-reads parameters if `dirty_bits` asks for it. Clears `dirty_bits`.
    fn sync(&mut self, params: &dyn ParamsDelegate, dirty_bits: &mut DirtyBits);

    fn prepare(&mut self, ctx: &mut FrameContext, index: &mut RenderIndex, delegate: &mut RenderDelegate);

    fn execute(&mut self, ctx: &FrameContext, index: &RenderIndex, delegate: &mut RenderDelegate);

    /// Removes everything the task registered in `index` and releases the
    /// images bound to it.
    fn teardown(&mut self, _index: &mut RenderIndex, _delegate: &mut RenderDelegate) {}
}
