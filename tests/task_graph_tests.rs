//! Task Graph Integration Tests
//!
//! Tests for:
//! - Frame driving: sync / prepare / execute order, submit
//! - Dirty-bit handling through the change tracker
//! - Cross-task exchange through the frame context (copy selection depth)
//! - Task removal

mod common;

use common::Harness;
use glam::Vec4;
use hydrogent::renderer::device::DeviceCommand;
use hydrogent::renderer::graph::{
    BeginFrameTask, CopySelectionDepthTask, DirtyBits, FrameKey, SetupRenderingTask, TaskGraph,
};
use hydrogent::renderer::settings::{BeginFrameTaskParams, SetupRenderingTaskParams};
use hydrogent::scene::ScenePath;

fn begin_frame_graph(root: &str) -> anyhow::Result<(Harness, TaskGraph, ScenePath)> {
    let mut h = Harness::new(root, 64, 64);
    let task_id = ScenePath::new(root).append_child("beginFrame");
    h.params.set(
        task_id,
        BeginFrameTaskParams {
            final_color_target_id: h.final_id,
            clear_color: Vec4::new(1.0, 0.0, 0.0, 1.0),
            ..Default::default()
        },
    );

    let mut graph = TaskGraph::new();
    let task = BeginFrameTask::new(task_id, &mut h.index)?;
    graph.add_task(Box::new(task), &mut h.index);
    Ok((h, graph, task_id))
}

fn execute(h: &mut Harness, graph: &mut TaskGraph) {
    graph.execute_frame(&mut h.index, &mut h.delegate, &h.params);
}

// ============================================================================
// Frame Driving
// ============================================================================

#[test]
fn frame_ends_with_submit() -> anyhow::Result<()> {
    let (mut h, mut graph, _) = begin_frame_graph("/tg/submit")?;
    execute(&mut h, &mut graph);

    assert_eq!(graph.task_count(), 1);
    assert_eq!(h.log.snapshot().last(), Some(&DeviceCommand::Submit));
    assert_eq!(h.log.count(|c| *c == DeviceCommand::Submit), 1);
    Ok(())
}

#[test]
fn frame_context_holds_last_frame() -> anyhow::Result<()> {
    let (mut h, mut graph, task_id) = begin_frame_graph("/tg/context")?;
    execute(&mut h, &mut graph);

    let ctx = graph.frame_context();
    assert_eq!(ctx.iter().next().map(|(k, _)| k), Some(FrameKey::RenderPassState));
    assert_eq!(
        ctx.target(FrameKey::DepthBuffer),
        Some(task_id.append_child("depthBuffer"))
    );
    assert!(graph.task(task_id).is_some());
    Ok(())
}

#[test]
fn later_task_overrides_published_keys() -> anyhow::Result<()> {
    let mut h = Harness::new("/tg/override", 32, 32);
    let bf_id = ScenePath::new("/tg/override/beginFrame");
    let sr_id = ScenePath::new("/tg/override/setupRendering");
    h.params.set(
        bf_id,
        BeginFrameTaskParams {
            final_color_target_id: h.final_id,
            ..Default::default()
        },
    );
    h.params.set(
        sr_id,
        SetupRenderingTaskParams {
            final_color_target_id: h.final_id,
            ..Default::default()
        },
    );

    let mut graph = TaskGraph::with_capacity(2);
    graph.add_task(Box::new(BeginFrameTask::new(bf_id, &mut h.index)?), &mut h.index);
    graph.add_task(Box::new(SetupRenderingTask::new(sr_id, &mut h.index)?), &mut h.index);
    execute(&mut h, &mut graph);

    assert_eq!(
        graph.frame_context().target(FrameKey::DepthBuffer),
        Some(sr_id.append_child("depthBuffer"))
    );
    // Both tasks bound and cleared their own targets.
    assert_eq!(h.log.count(|c| matches!(c, DeviceCommand::SetRenderTargets { .. })), 2);
    Ok(())
}

// ============================================================================
// Dirty Bits
// ============================================================================

#[test]
fn registration_marks_task_dirty() -> anyhow::Result<()> {
    let (h, _graph, task_id) = begin_frame_graph("/tg/register")?;
    assert_eq!(h.index.change_tracker().task_dirty_bits(task_id), DirtyBits::all());
    Ok(())
}

#[test]
fn sync_clears_dirty_bits() -> anyhow::Result<()> {
    let (mut h, mut graph, task_id) = begin_frame_graph("/tg/clean")?;
    execute(&mut h, &mut graph);
    assert!(h.index.change_tracker().task_dirty_bits(task_id).is_empty());
    Ok(())
}

#[test]
fn parameters_are_reread_only_when_dirty() -> anyhow::Result<()> {
    let (mut h, mut graph, task_id) = begin_frame_graph("/tg/dirty")?;
    execute(&mut h, &mut graph);

    let green = Vec4::new(0.0, 1.0, 0.0, 1.0);
    h.params.set(
        task_id,
        BeginFrameTaskParams {
            final_color_target_id: h.final_id,
            clear_color: green,
            ..Default::default()
        },
    );

    h.log.clear();
    execute(&mut h, &mut graph);
    assert_eq!(
        h.log.count(|c| matches!(c, DeviceCommand::ClearRenderTarget { color, .. } if *color == [1.0, 0.0, 0.0, 1.0])),
        1
    );

    h.index.change_tracker_mut().mark_task_dirty(task_id, DirtyBits::PARAMS);
    h.log.clear();
    execute(&mut h, &mut graph);
    assert_eq!(
        h.log.count(|c| matches!(c, DeviceCommand::ClearRenderTarget { color, .. } if *color == green.to_array())),
        1
    );
    Ok(())
}

// ============================================================================
// Copy Selection Depth
// ============================================================================

#[test]
fn copy_selection_depth_reads_frame_context() -> anyhow::Result<()> {
    let (mut h, mut graph, task_id) = begin_frame_graph("/tg/copy")?;
    graph.add_task(
        Box::new(CopySelectionDepthTask::new(ScenePath::new("/tg/copy/copyDepth"))?),
        &mut h.index,
    );
    execute(&mut h, &mut graph);

    let selection_depth = h
        .index
        .render_buffer_target(task_id.append_child("selectionDepthBuffer"))
        .unwrap();
    let depth = h.index.render_buffer_target(task_id.append_child("depthBuffer")).unwrap();

    let commands = h.log.snapshot();
    let copy = commands
        .iter()
        .position(|c| *c == DeviceCommand::CopyTexture { src: selection_depth.id, dst: depth.id })
        .unwrap();
    let last_clear = commands
        .iter()
        .rposition(|c| matches!(c, DeviceCommand::ClearDepthStencil { .. }))
        .unwrap();
    assert!(last_clear < copy);
    Ok(())
}

#[test]
fn copy_selection_depth_without_producer_is_noop() -> anyhow::Result<()> {
    let mut h = Harness::new("/tg/copy_alone", 32, 32);
    let mut graph = TaskGraph::new();
    graph.add_task(
        Box::new(CopySelectionDepthTask::new(ScenePath::new("/tg/copy_alone/copyDepth"))?),
        &mut h.index,
    );
    execute(&mut h, &mut graph);

    assert_eq!(h.log.snapshot(), vec![DeviceCommand::Submit]);
    Ok(())
}

#[test]
fn copy_selection_depth_skips_unbound_depth() -> anyhow::Result<()> {
    let device = hydrogent::renderer::device::RecordingDevice::with_policy(
        hydrogent::renderer::device::FailurePolicy {
            failing_texture_names: vec!["Depth buffer".to_string()],
            ..Default::default()
        },
    );
    let mut h = Harness::with_device("/tg/copy_unbound", device, 32, 32);
    let bf_id = ScenePath::new("/tg/copy_unbound/beginFrame");
    h.params.set(
        bf_id,
        BeginFrameTaskParams {
            final_color_target_id: h.final_id,
            ..Default::default()
        },
    );

    let mut graph = TaskGraph::new();
    graph.add_task(Box::new(BeginFrameTask::new(bf_id, &mut h.index)?), &mut h.index);
    graph.add_task(
        Box::new(CopySelectionDepthTask::new(ScenePath::new("/tg/copy_unbound/copyDepth"))?),
        &mut h.index,
    );
    execute(&mut h, &mut graph);

    assert_eq!(h.log.count(|c| matches!(c, DeviceCommand::CopyTexture { .. })), 0);
    Ok(())
}

// ============================================================================
// Removal
// ============================================================================

#[test]
fn remove_task_releases_render_buffers() -> anyhow::Result<()> {
    let (mut h, mut graph, task_id) = begin_frame_graph("/tg/remove")?;
    execute(&mut h, &mut graph);
    let buffers = h.index.render_buffer_count();

    assert!(graph.remove_task(task_id, &mut h.index, &mut h.delegate));
    assert!(!graph.remove_task(task_id, &mut h.index, &mut h.delegate));

    assert_eq!(graph.task_count(), 0);
    assert_eq!(h.index.render_buffer_count(), buffers - 11);
    assert_eq!(h.log.count(|c| matches!(c, DeviceCommand::ReleaseTexture(_))), 11);
    assert!(h.index.render_buffer_target(h.final_id).is_some());
    Ok(())
}

#[test]
fn clear_tears_down_every_task() -> anyhow::Result<()> {
    let (mut h, mut graph, _) = begin_frame_graph("/tg/clear")?;
    execute(&mut h, &mut graph);

    graph.clear(&mut h.index, &mut h.delegate);
    assert_eq!(graph.task_count(), 0);
    assert!(graph.frame_context().is_empty());
    assert_eq!(h.index.render_buffer_count(), 1);
    Ok(())
}
