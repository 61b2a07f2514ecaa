//! Task Graph
//!
//! Runs a list of tasks once per frame. Tasks execute in insertion order;
//! the caller is responsible for adding producers before consumers.
//!
//! ```text
//! execute_frame
//!   ├─ clear frame context
//!   ├─ sync     (every task, with its dirty bits)
//!   ├─ prepare  (every task, in order)
//!   ├─ execute  (every task, in order)
//!   └─ submit
//! ```

use crate::renderer::delegate::RenderDelegate;
use crate::renderer::graph::frame_context::FrameContext;
use crate::renderer::graph::task::Task;
use crate::scene::{ParamsDelegate, RenderIndex, ScenePath};

#[derive(Default)]
pub struct TaskGraph {
    tasks: Vec<Box<dyn Task>>,
    context: FrameContext,
}

impl TaskGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tasks: Vec::with_capacity(capacity),
            context: FrameContext::new(),
        }
    }

    /// Appends a task and registers its initial dirty bits.
    pub fn add_task(&mut self, task: Box<dyn Task>, index: &mut RenderIndex) {
        index
            .change_tracker_mut()
            .task_inserted(task.id(), task.initial_dirty_bits());
        log::debug!("TaskGraph: added task {} ({})", task.name(), task.id());
        self.tasks.push(task);
    }

    /// Removes the task registered under `id`, tearing down its resources.
    pub fn remove_task(&mut self, id: ScenePath, index: &mut RenderIndex, delegate: &mut RenderDelegate) -> bool {
        let Some(pos) = self.tasks.iter().position(|t| t.id() == id) else {
            return false;
        };
        let mut task = self.tasks.remove(pos);
        task.teardown(index, delegate);
        index.change_tracker_mut().task_removed(id);
        true
    }

    /// Runs one frame.
    pub fn execute_frame(&mut self, index: &mut RenderIndex, delegate: &mut RenderDelegate, params: &dyn ParamsDelegate) {
        self.context.clear();

        for task in &mut self.tasks {
            let id = task.id();
            let mut dirty_bits = index.change_tracker().task_dirty_bits(id);
            task.sync(params, &mut dirty_bits);
            index.change_tracker_mut().set_task_dirty_bits(id, dirty_bits);
        }

        for task in &mut self.tasks {
            task.prepare(&mut self.context, index, delegate);
        }

        for task in &mut self.tasks {
            task.execute(&self.context, index, delegate);
        }

        delegate.device_mut().submit();
    }

    /// Context of the last frame.
    #[inline]
    #[must_use]
    pub fn frame_context(&self) -> &FrameContext {
        &self.context
    }

    #[inline]
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn task(&self, id: ScenePath) -> Option<&dyn Task> {
        self.tasks.iter().find(|t| t.id() == id).map(|t| &**t)
    }

    /// Tears down and drops every task.
    pub fn clear(&mut self, index: &mut RenderIndex, delegate: &mut RenderDelegate) {
        for mut task in self.tasks.drain(..) {
            task.teardown(index, delegate);
            index.change_tracker_mut().task_removed(task.id());
        }
        self.context.clear();
    }
}
