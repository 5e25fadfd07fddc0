mod common;

use glam::{Vec2, Vec3};

use common::{Op, RecordingBackend};
use path_tracer::core::{Button, DeviceSnapshot, PointerButton};
use path_tracer::render_loop::{RenderLoop, TickControl, INITIAL_ZOOM};
use path_tracer::scene::{FieldKind, ScenePool};
use path_tracer::settings::{AccumulationMode, SettingsState, ViewMode};
use path_tracer::traits::{Camera, Surface};

fn render_loop() -> RenderLoop<RecordingBackend> {
    RenderLoop::new(RecordingBackend::new(), ScenePool::default(), SettingsState::default())
        .expect("render loop")
}

fn idle() -> DeviceSnapshot {
    DeviceSnapshot::default()
}

#[test]
fn test_tick_runs_update_then_draw_then_present() {
    let mut rl = render_loop();
    assert_eq!(rl.tick(idle()).unwrap(), TickControl::Continue);

    let ops = rl.backend_mut().take_ops();
    assert_eq!(ops.first(), Some(&Op::Begin));
    assert_eq!(ops.last(), Some(&Op::Present));
}

#[test]
fn test_escape_exits_before_draw() {
    let mut rl = render_loop();
    let result = rl.tick(idle().with_key(Button::Escape)).unwrap();

    assert_eq!(result, TickControl::Exit);
    assert!(rl.backend_mut().take_ops().is_empty());
}

#[test]
fn test_back_button_exits() {
    let mut rl = render_loop();
    assert_eq!(rl.update(idle().with_key(Button::GamepadBack)), TickControl::Exit);
}

#[test]
fn test_v_release_flips_view() {
    let mut rl = render_loop();
    rl.tick(idle().with_key(Button::KeyV)).unwrap();
    assert_eq!(rl.settings().view, ViewMode::PathTrace);

    rl.backend_mut().take_ops();
    rl.tick(idle()).unwrap();
    assert_eq!(rl.settings().view, ViewMode::Raster);

    let ops = rl.backend_mut().take_ops();
    assert!(ops.contains(&Op::Composite {
        primary: Surface::Raster,
        inset: Surface::PathTrace
    }));
}

#[test]
fn test_t_release_cycles_accumulation() {
    let mut rl = render_loop();
    rl.update(idle().with_key(Button::KeyT));
    rl.update(idle());
    assert_eq!(rl.settings().accumulation, AccumulationMode::Constant);
}

#[test]
fn test_right_drag_orbits_camera() {
    let mut rl = render_loop();
    let start = rl.camera().position();

    rl.update(idle().with_pointer(PointerButton::Right, Vec2::ZERO));
    rl.update(idle().with_pointer(PointerButton::Right, Vec2::new(180.0, 0.0)));

    // 180 px * 0.5 deg/px = 90 degrees of yaw
    let moved = rl.camera().position();
    assert!((moved - Vec3::new(-5.0, 0.0, 0.0)).length() < 1e-4, "{moved:?}");
    assert!((moved.length() - start.length()).abs() < 1e-4);
}

#[test]
fn test_scroll_zooms_and_r_resets() {
    let mut rl = render_loop();
    rl.update(idle().scrolled(4.0));
    assert!((rl.camera().position().z - (INITIAL_ZOOM + 2.0)).abs() < 1e-5);

    rl.update(idle().with_key(Button::KeyR));
    rl.update(idle().scrolled(4.0));
    assert!((rl.camera().position().z - INITIAL_ZOOM).abs() < 1e-5);
    assert_eq!(rl.controls().zoom.value(), INITIAL_ZOOM);
}

#[test]
fn test_held_keys_adjust_samples_and_bounces() {
    let mut rl = render_loop();
    let plus = idle().with_key(Button::Equal);
    for _ in 0..3 {
        rl.update(plus.clone());
    }
    assert_eq!(rl.settings().samples, 52);

    let shift_b = idle().with_key(Button::KeyB).with_key(Button::Shift);
    rl.update(shift_b.clone());
    rl.update(shift_b);
    assert_eq!(rl.settings().bounces, 2);
}

#[test]
fn test_key_pair_follows_external_settings_edits() {
    let mut rl = render_loop();
    rl.settings_mut().set_samples(999);
    let plus = idle().with_key(Button::Equal);
    for _ in 0..4 {
        rl.update(plus.clone());
    }
    assert_eq!(rl.settings().samples, 1000);
}

#[test]
fn test_request_sync_uploads_on_next_draw() {
    let mut rl = render_loop();
    rl.tick(idle()).unwrap();
    rl.backend_mut().take_ops();

    rl.scene_mut().get_mut(0).unwrap().position = Vec3::new(0.0, 10.0, 60.0);
    rl.request_sync([FieldKind::Position, FieldKind::Position]);
    rl.tick(idle()).unwrap();

    let ops = rl.backend_mut().take_ops();
    assert!(ops.contains(&Op::PathTrace {
        dirty: vec!["SPHERE_POS"]
    }));

    rl.tick(idle()).unwrap();
    let ops = rl.backend_mut().take_ops();
    assert!(ops.contains(&Op::PathTrace { dirty: vec![] }));
}

#[test]
fn test_resize_restarts_weighted_accumulation() {
    let mut rl = render_loop();
    rl.settings_mut().accumulation = AccumulationMode::Weighted;
    for _ in 0..5 {
        rl.tick(idle()).unwrap();
    }
    assert_eq!(rl.backend_mut().accumulate_steps().last().unwrap().frames, 4);

    rl.resized(1024, 768);
    rl.tick(idle()).unwrap();

    let step = *rl.backend_mut().accumulate_steps().last().unwrap();
    assert_eq!(step.frames, 0);
    assert_eq!(step.weight, 1.0);
    assert_eq!(rl.pipeline().accumulated_frames(), 1);
}

#[test]
fn test_zero_size_resize_keeps_accumulation() {
    let mut rl = render_loop();
    rl.settings_mut().accumulation = AccumulationMode::Weighted;
    for _ in 0..3 {
        rl.tick(idle()).unwrap();
    }
    rl.resized(0, 0);
    rl.tick(idle()).unwrap();

    assert_eq!(rl.backend_mut().accumulate_steps().last().unwrap().frames, 3);
}
