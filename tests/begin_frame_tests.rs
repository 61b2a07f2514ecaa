//! Begin-Frame Task Integration Tests
//!
//! Tests for:
//! - Target resolution: 512x512 scenario, reuse, resize, disabled slots, allocation failure
//! - Execute: binding, clears, stencil ref, sequencing errors
//! - Frame constants: camera history, light selection, renderer overrides, upload
//! - Frame timing

mod common;

use common::{Harness, color_clears, created_texture_names, is_device_work, last_uploaded_frame_attribs, render_target_bindings};
use glam::{Mat4, Vec3, Vec4};
use hydrogent::renderer::device::{
    ClearDepthStencilFlags, DeviceCommand, DeviceResource, FailurePolicy, RecordingDevice, ResourceState, ViewKind,
};
use hydrogent::renderer::graph::{BeginFrameTask, FrameKey, GBUFFER_TARGET_COUNT, GBufferTarget, Task, TaskState};
use hydrogent::renderer::settings::BeginFrameTaskParams;
use hydrogent::scene::{Light, ScenePath};

const CLEAR_COLOR: Vec4 = Vec4::new(0.1, 0.2, 0.3, 1.0);

fn setup(root: &str, width: u32, height: u32) -> anyhow::Result<(Harness, BeginFrameTask)> {
    setup_with(Harness::new(root, width, height), root, |_| {})
}

fn setup_with(
    mut h: Harness,
    root: &str,
    customize: impl FnOnce(&mut BeginFrameTaskParams),
) -> anyhow::Result<(Harness, BeginFrameTask)> {
    let task_id = ScenePath::new(root).append_child("beginFrame");
    let camera_id = h.add_camera(camera_path(root), Vec3::new(0.0, 1.0, 5.0));

    let mut params = BeginFrameTaskParams {
        final_color_target_id: h.final_id,
        camera_id,
        clear_color: CLEAR_COLOR,
        clear_depth: 1.0,
        ..Default::default()
    };
    customize(&mut params);
    h.params.set(task_id, params);

    let task = BeginFrameTask::new(task_id, &mut h.index)?;
    h.register(&task);
    Ok((h, task))
}

fn camera_path(root: &str) -> ScenePath {
    ScenePath::new(root).append_child("camera")
}

// ============================================================================
// Target Resolution
// ============================================================================

#[test]
fn scenario_512_resolves_color_and_depth() -> anyhow::Result<()> {
    let (mut h, mut task) = setup("/bf/scenario512", 512, 512)?;
    h.run_frame(&mut task);

    assert_eq!(task.state(), TaskState::Executed);
    assert_eq!(task.framebuffer_size(), glam::UVec2::new(512, 512));

    let targets = *task.render_pass_state().read().framebuffer_targets();
    let depth = targets.depth.unwrap();
    assert_eq!(depth.kind, ViewKind::DepthStencil);
    assert_eq!(depth.size(), (512, 512));
    let selection_depth = targets.selection_depth.unwrap();
    assert_eq!(selection_depth.size(), (512, 512));

    let color = targets.gbuffer(GBufferTarget::SceneColor).unwrap();
    assert_eq!(color.kind, ViewKind::RenderTarget);
    assert_eq!(color.size(), (512, 512));
    assert_eq!(color.format, wgpu::TextureFormat::Rgba16Float);
    assert_eq!(targets.final_color, Some(h.final_view));

    // 7 G-buffer targets, 2 depth buffers, 2 closest-location targets
    assert_eq!(h.log.texture_allocations(), 11);
    Ok(())
}

#[test]
fn texture_names_follow_slots() -> anyhow::Result<()> {
    let (mut h, mut task) = setup("/bf/names", 64, 64)?;
    h.run_frame(&mut task);

    let names = created_texture_names(&h.log);
    for i in 0..GBUFFER_TARGET_COUNT {
        assert!(names.contains(&format!("GBuffer target {i}")));
    }
    for name in ["Selection depth buffer", "Depth buffer", "Closest selected location 0", "Closest selected location 1"] {
        assert!(names.iter().any(|n| n == name), "missing {name}");
    }
    Ok(())
}

#[test]
fn stable_size_reuses_views() -> anyhow::Result<()> {
    let (mut h, mut task) = setup("/bf/reuse", 128, 128)?;
    h.run_frame(&mut task);
    let first = *task.render_pass_state().read().framebuffer_targets();
    let allocations = h.log.texture_allocations();

    h.run_frame(&mut task);
    let second = *task.render_pass_state().read().framebuffer_targets();

    assert_eq!(h.log.texture_allocations(), allocations);
    assert_eq!(first.gbuffer, second.gbuffer);
    assert_eq!(first.depth, second.depth);
    assert_eq!(first.closest_selected_location, second.closest_selected_location);
    Ok(())
}

#[test]
fn resize_reallocates_every_active_slot() -> anyhow::Result<()> {
    let (mut h, mut task) = setup("/bf/resize", 128, 128)?;
    h.run_frame(&mut task);

    h.resize_final(300, 200);
    h.log.clear();
    h.run_frame(&mut task);

    assert_eq!(h.log.texture_allocations(), 11);
    assert_eq!(h.log.count(|c| matches!(c, DeviceCommand::ReleaseTexture(_))), 11);

    let targets = *task.render_pass_state().read().framebuffer_targets();
    for view in targets.gbuffer.iter().flatten() {
        assert_eq!(view.size(), (300, 200));
    }
    assert_eq!(targets.depth.unwrap().size(), (300, 200));
    assert_eq!(task.framebuffer_size(), glam::UVec2::new(300, 200));
    Ok(())
}

#[test]
fn disabled_format_skips_slot() -> anyhow::Result<()> {
    let (mut h, mut task) = setup_with(Harness::new("/bf/disabled", 64, 64), "/bf/disabled", |p| {
        p.formats.set_gbuffer(GBufferTarget::Normal, None);
    })?;
    h.run_frame(&mut task);

    assert_eq!(h.log.texture_allocations(), 10);
    let state = task.render_pass_state();
    let state = state.read();
    assert_eq!(state.configured_render_target_count(), 6);
    assert!(state.framebuffer_targets().gbuffer(GBufferTarget::Normal).is_none());
    assert!(state.framebuffer_targets().gbuffer_srv(GBufferTarget::Normal).is_none());

    let bindings = render_target_bindings(&h.log);
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].0.iter().flatten().count(), 6);
    assert_eq!(bindings[0].0[GBufferTarget::Normal as usize], None);
    Ok(())
}

#[test]
fn allocation_failure_disables_only_that_slot() -> anyhow::Result<()> {
    let device = RecordingDevice::with_policy(FailurePolicy {
        failing_texture_names: vec!["Depth buffer".to_string()],
        ..Default::default()
    });
    let (mut h, mut task) = setup_with(Harness::with_device("/bf/failure", device, 64, 64), "/bf/failure", |_| {})?;
    h.run_frame(&mut task);

    let targets = *task.render_pass_state().read().framebuffer_targets();
    assert!(targets.depth.is_none());
    assert!(targets.selection_depth.is_some());
    assert_eq!(targets.bound_color_count(), GBUFFER_TARGET_COUNT);
    assert_eq!(task.state(), TaskState::Executed);
    assert_eq!(render_target_bindings(&h.log).len(), 1);
    Ok(())
}

#[test]
fn shader_resource_views_are_created_for_gbuffer() -> anyhow::Result<()> {
    let (mut h, mut task) = setup("/bf/srv", 32, 32)?;
    h.run_frame(&mut task);

    let targets = *task.render_pass_state().read().framebuffer_targets();
    for target in GBufferTarget::ALL {
        let rtv = targets.gbuffer(target).unwrap();
        let srv = targets.gbuffer_srv(target).unwrap();
        assert_eq!(srv.kind, ViewKind::ShaderResource);
        assert_eq!(srv.texture, rtv.texture);
        assert_ne!(srv.id, rtv.id);
    }
    Ok(())
}

// ============================================================================
// Execute
// ============================================================================

#[test]
fn execute_binds_and_clears_gbuffer() -> anyhow::Result<()> {
    let (mut h, mut task) = setup("/bf/clears", 512, 512)?;
    h.run_frame(&mut task);
    let targets = *task.render_pass_state().read().framebuffer_targets();

    let bindings = render_target_bindings(&h.log);
    assert_eq!(bindings.len(), 1);
    let (colors, depth_stencil) = &bindings[0];
    assert_eq!(colors.len(), GBUFFER_TARGET_COUNT);
    assert_eq!(
        colors.iter().flatten().count(),
        task.render_pass_state().read().configured_render_target_count()
    );
    assert_eq!(*depth_stencil, targets.selection_depth.map(|v| v.id));

    let scene_color = targets.gbuffer(GBufferTarget::SceneColor).unwrap().id;
    let clears = color_clears(&h.log);
    assert_eq!(clears.len(), GBUFFER_TARGET_COUNT);
    for (view, color) in clears {
        if view == scene_color {
            assert_eq!(color, CLEAR_COLOR.to_array());
        } else {
            assert_eq!(color, [0.0; 4]);
        }
    }

    let depth_clears: Vec<_> = h
        .log
        .snapshot()
        .into_iter()
        .filter_map(|c| match c {
            DeviceCommand::ClearDepthStencil { view, flags, depth, stencil } => Some((view, flags, depth, stencil)),
            _ => None,
        })
        .collect();
    assert_eq!(
        depth_clears,
        vec![(targets.selection_depth.unwrap().id, ClearDepthStencilFlags::DEPTH, 1.0, 0)]
    );
    Ok(())
}

#[test]
fn stencil_ref_follows_pass_params() -> anyhow::Result<()> {
    let (mut h, mut task) = setup_with(Harness::new("/bf/stencil", 16, 16), "/bf/stencil", |p| {
        p.state.stencil_ref = 7;
    })?;
    h.run_frame(&mut task);

    let last = h.log.snapshot().into_iter().filter(is_device_work).last();
    assert_eq!(last, Some(DeviceCommand::SetStencilRef(7)));
    Ok(())
}

#[test]
fn execute_without_prepare_is_noop() -> anyhow::Result<()> {
    let (mut h, mut task) = setup("/bf/noprepare", 64, 64)?;
    let ctx = hydrogent::FrameContext::new();

    let mut dirty = h.index.change_tracker().task_dirty_bits(task.id());
    task.sync(&h.params, &mut dirty);
    task.execute(&ctx, &h.index, &mut h.delegate);

    assert!(h.log.is_empty());
    assert_eq!(task.state(), TaskState::Synced);
    Ok(())
}

#[test]
fn missing_final_target_skips_frame() -> anyhow::Result<()> {
    let (mut h, mut task) = setup_with(Harness::new("/bf/nofinal", 64, 64), "/bf/nofinal", |p| {
        p.final_color_target_id = ScenePath::new("/bf/nofinal/missing");
    })?;
    let ctx = h.run_frame(&mut task);

    assert_eq!(task.state(), TaskState::Synced);
    assert!(task.render_pass_state().read().framebuffer_targets().is_empty());
    assert!(h.log.is_empty());
    // Ids are published even when resolution fails.
    assert_eq!(ctx.target(FrameKey::DepthBuffer), Some(task.depth_id()));
    Ok(())
}

#[test]
fn failed_prepare_after_good_frame_blocks_execute() -> anyhow::Result<()> {
    let (mut h, mut task) = setup("/bf/regress", 64, 64)?;
    h.run_frame(&mut task);

    h.index.remove_render_buffer(h.final_id);
    h.log.clear();
    h.run_frame(&mut task);

    assert!(h.log.is_empty());
    assert_eq!(task.state(), TaskState::Synced);
    Ok(())
}

#[test]
fn prepare_publishes_owned_ids() -> anyhow::Result<()> {
    let (mut h, mut task) = setup("/bf/publish", 64, 64)?;
    let ctx = h.run_frame(&mut task);

    assert_eq!(ctx.target(FrameKey::FinalColorTarget), Some(h.final_id));
    assert_eq!(ctx.target(FrameKey::SelectionDepthBuffer), Some(task.selection_depth_id()));
    assert_eq!(
        ctx.target(FrameKey::MeshIdTarget),
        Some(task.gbuffer_target_id(GBufferTarget::MeshId))
    );
    assert_eq!(
        ctx.target(FrameKey::ClosestSelectedLocation1Target),
        task.closest_selected_location_id(1)
    );
    assert!(ctx.render_pass_state().is_some());
    assert_eq!(ctx.len(), FrameKey::COUNT);
    Ok(())
}

// ============================================================================
// Frame Constants
// ============================================================================

#[test]
fn first_frame_seeds_previous_camera() -> anyhow::Result<()> {
    let (mut h, mut task) = setup("/bf/firstframe", 512, 512)?;
    h.run_frame(&mut task);

    let attribs = task.frame_attribs();
    assert_eq!(attribs.prev_camera, attribs.camera);
    assert_eq!(attribs.camera.viewport_size, Vec4::new(512.0, 512.0, 1.0 / 512.0, 1.0 / 512.0));
    assert_eq!(attribs.camera.position, Vec4::new(0.0, 1.0, 5.0, 1.0));
    Ok(())
}

#[test]
fn camera_history_is_one_frame_deep() -> anyhow::Result<()> {
    let (mut h, mut task) = setup("/bf/history", 256, 256)?;

    h.run_frame(&mut task);
    // Parameters, including the camera id, are only read during sync.
    assert_eq!(task.params().camera_id, camera_path("/bf/history"));
    let frame1 = task.frame_attribs().camera;

    h.index
        .camera_mut(camera_path("/bf/history"))
        .ok_or_else(|| anyhow::anyhow!("camera not registered"))?
        .set_world_matrix(Mat4::from_translation(Vec3::new(2.0, 0.0, 5.0)));
    h.run_frame(&mut task);

    let frame2 = task.frame_attribs().camera;
    assert_eq!(task.frame_attribs().prev_camera, frame1);
    assert_ne!(frame2, frame1);
    assert_eq!(frame2.position, Vec4::new(2.0, 0.0, 5.0, 1.0));

    // A still camera drops frame 1 from the history.
    h.run_frame(&mut task);
    let attribs = task.frame_attribs();
    assert_eq!(attribs.prev_camera, frame2);
    assert_eq!(attribs.camera, frame2);
    Ok(())
}

#[test]
fn first_light_with_direction_wins() -> anyhow::Result<()> {
    let (mut h, mut task) = setup("/bf/lights", 64, 64)?;
    let lights = h.delegate.lights_mut();
    lights.insert(ScenePath::new("/bf/lights/disabled"), Light::new_directional(Vec3::ZERO, 5.0));
    lights.insert(
        ScenePath::new("/bf/lights/sun"),
        Light::new_directional(Vec3::new(0.0, -1.0, 0.0), 2.0),
    );
    lights.insert(
        ScenePath::new("/bf/lights/fill"),
        Light::new_directional(Vec3::new(1.0, 0.0, 0.0), 0.5),
    );

    h.run_frame(&mut task);

    let light = task.frame_attribs().light;
    assert_eq!(light.direction, Vec3::new(0.0, -1.0, 0.0));
    assert_eq!(light.intensity, 2.0);
    Ok(())
}

#[test]
fn renderer_block_merges_overrides() -> anyhow::Result<()> {
    let (mut h, mut task) = setup_with(Harness::new("/bf/renderer", 64, 64), "/bf/renderer", |p| {
        p.renderer.occlusion_strength = 0.5;
        p.renderer.emission_scale = 2.0;
        p.renderer.ibl_scale = 0.25;
        p.renderer.point_size = 3.0;
        p.renderer.unshaded_color = Vec4::new(1.0, 0.0, 0.0, 1.0);
    })?;
    h.run_frame(&mut task);

    let renderer = task.frame_attribs().renderer;
    assert_eq!(renderer.occlusion_strength, 0.5);
    assert_eq!(renderer.emission_scale, 2.0);
    assert_eq!(renderer.ibl_scale, 0.25);
    assert_eq!(renderer.point_size, 3.0);
    assert_eq!(renderer.unshaded_color, Vec4::new(1.0, 0.0, 0.0, 1.0));
    assert_eq!(renderer.highlight_color, Vec4::ZERO);
    assert_eq!(renderer.average_log_lum, 0.3);
    assert_eq!(renderer.middle_gray, 0.18);
    assert_eq!(renderer.white_point, 3.0);
    Ok(())
}

#[test]
fn frame_constants_are_uploaded_before_binding() -> anyhow::Result<()> {
    let (mut h, mut task) = setup("/bf/upload", 64, 64)?;
    h.run_frame(&mut task);

    assert_eq!(last_uploaded_frame_attribs(&h.log).as_ref(), Some(task.frame_attribs()));

    let commands = h.log.snapshot();
    let upload = commands
        .iter()
        .position(|c| matches!(c, DeviceCommand::UpdateBuffer { .. }))
        .unwrap();
    let barrier = commands
        .iter()
        .position(|c| {
            matches!(c, DeviceCommand::TransitionStates(t)
                if t.iter().any(|b| matches!(b.resource, DeviceResource::Buffer(_))
                    && b.new_state == ResourceState::ConstantBuffer))
        })
        .unwrap();
    let bind = commands
        .iter()
        .position(|c| matches!(c, DeviceCommand::SetRenderTargets { .. }))
        .unwrap();
    assert!(upload < barrier);
    assert!(barrier < bind);
    Ok(())
}

#[test]
fn missing_camera_keeps_camera_block() -> anyhow::Result<()> {
    let (mut h, mut task) = setup_with(Harness::new("/bf/nocamera", 64, 64), "/bf/nocamera", |p| {
        p.camera_id = ScenePath::EMPTY;
    })?;
    h.run_frame(&mut task);

    let attribs = task.frame_attribs();
    assert_eq!(attribs.camera.viewport_size, Vec4::ZERO);
    assert_eq!(attribs.camera.view_t, Mat4::IDENTITY);
    assert_eq!(attribs.prev_camera, attribs.camera);
    // Constants are still uploaded.
    assert!(last_uploaded_frame_attribs(&h.log).is_some());
    Ok(())
}

// ============================================================================
// Timing
// ============================================================================

#[test]
fn execute_advances_frame_timing() -> anyhow::Result<()> {
    let (mut h, mut task) = setup("/bf/timing", 16, 16)?;
    h.run_frame(&mut task);
    h.run_frame(&mut task);

    let render_param = h.delegate.render_param().unwrap();
    assert_eq!(render_param.frame_number(), 2);
    assert!(render_param.frame_time() >= 0.0);
    assert!(render_param.elapsed_time() >= 0.0);
    Ok(())
}

#[test]
fn missing_render_param_is_tolerated() -> anyhow::Result<()> {
    let (mut h, mut task) = setup("/bf/noparam", 16, 16)?;
    h.delegate.set_render_param(None);
    h.run_frame(&mut task);

    assert_eq!(task.state(), TaskState::Executed);
    Ok(())
}
