use std::collections::BTreeSet;

use glam::{Vec2, Vec3};

use crate::camera::{ArcballCamera, Projection};
use crate::core::controller::{Button, DeviceSnapshot, PointerButton};
use crate::core::controls::{DragControl, KeyPair, ScrollControl, ToggleControl};
use crate::core::input_mapper::InputMapper;
use crate::core::render_pipeline::RenderPipeline;
use crate::error::Result;
use crate::scene::{FieldKind, ScenePool};
use crate::settings::{SettingsState, BOUNCES_RANGE, SAMPLES_RANGE};
use crate::traits::camera::Camera;
use crate::traits::renderer::RenderBackend;

pub const ROTATE_SENSITIVITY: Vec2 = Vec2::new(0.5, 0.7);
pub const PAN_SENSITIVITY: Vec2 = Vec2::new(0.05, 0.07);
pub const ZOOM_SENSITIVITY: f32 = 0.5;
pub const INITIAL_ZOOM: f32 = -5.0;
pub const ZOOM_RANGE: (f32, f32) = (-60.0, -1.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Exit,
}

/// Default bindings
#[derive(Debug, Clone)]
pub struct CameraControls {
    pub rotate: DragControl,
    pub pan: DragControl,
    pub zoom: ScrollControl,
    pub reset: ToggleControl,
    pub view: ToggleControl,
    pub accumulation: ToggleControl,
    pub samples: KeyPair,
    pub bounces: KeyPair,
}

impl CameraControls {
    pub fn new(settings: &SettingsState) -> Self {
        Self {
            rotate: DragControl::new(PointerButton::Right, ROTATE_SENSITIVITY),
            pan: DragControl::new(PointerButton::Middle, PAN_SENSITIVITY),
            zoom: ScrollControl::new(ZOOM_SENSITIVITY, INITIAL_ZOOM).clamped(ZOOM_RANGE.0, ZOOM_RANGE.1),
            reset: ToggleControl::new(Button::KeyR),
            view: ToggleControl::new(Button::KeyV),
            accumulation: ToggleControl::new(Button::KeyT),
            samples: KeyPair::new(Button::Equal, Button::Minus, 1.0, settings.samples as f32)
                .clamped(SAMPLES_RANGE.0 as f32, SAMPLES_RANGE.1 as f32),
            bounces: KeyPair::combo(Button::KeyB, Button::Shift, 1.0, settings.bounces as f32)
                .clamped(BOUNCES_RANGE.0 as f32, BOUNCES_RANGE.1 as f32),
        }
    }

    /// Offset the camera translation is built from
    pub fn translation(&self) -> Vec3 {
        let pan = self.pan.value();
        Vec3::new(pan.x, pan.y, self.zoom.value())
    }

    fn reset_motion(&mut self) {
        self.rotate.reset();
        self.pan.reset();
        self.zoom.reset();
    }
}

/// Update (input -> camera) then Draw (pipeline), once per tick
pub struct RenderLoop<B: RenderBackend> {
    input: InputMapper,
    controls: CameraControls,
    camera: ArcballCamera,
    scene: ScenePool,
    settings: SettingsState,
    pipeline: RenderPipeline<B>,
    pending_sync: BTreeSet<FieldKind>,
}

impl<B: RenderBackend> RenderLoop<B> {
    pub fn new(backend: B, scene: ScenePool, settings: SettingsState) -> Result<Self> {
        let (width, height) = backend.screen_size();
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        let camera = ArcballCamera::new(
            Vec3::new(0.0, 0.0, INITIAL_ZOOM),
            Vec3::ZERO,
            Projection::with_aspect(aspect),
        );
        let pipeline = RenderPipeline::new(backend, &scene)?;

        Ok(Self {
            input: InputMapper::new(),
            controls: CameraControls::new(&settings),
            camera,
            scene,
            settings,
            pipeline,
            pending_sync: BTreeSet::new(),
        })
    }

    /// Update phase: poll input and apply it to the camera and settings
    pub fn update(&mut self, snapshot: DeviceSnapshot) -> TickControl {
        self.input.begin_tick(snapshot);

        if self.input.exit_requested() {
            log::info!("exit requested");
            self.input.end_tick();
            return TickControl::Exit;
        }

        let input = &self.input;
        let controls = &mut self.controls;

        if let Some(angles) = input.poll_drag(&mut controls.rotate) {
            self.camera.rotate(angles.extend(0.0));
        }
        let panned = input.poll_drag(&mut controls.pan).is_some();
        let zoomed = input.poll_scroll(&mut controls.zoom).is_some();
        if panned || zoomed {
            self.camera.translate(controls.translation());
        }

        if input.key_released(controls.reset.key) {
            log::info!("camera reset");
            controls.reset_motion();
            self.camera.reset();
        }

        input.poll_toggle(&controls.view, &mut self.settings.view);
        input.poll_toggle(&controls.accumulation, &mut self.settings.accumulation);

        // The inspector may have changed these since the last tick
        controls.samples.set(self.settings.samples as f32);
        if let Some(samples) = input.poll_key_pair(&mut controls.samples) {
            self.settings.set_samples(samples.round() as u32);
        }
        controls.bounces.set(self.settings.bounces as f32);
        if let Some(bounces) = input.poll_key_pair(&mut controls.bounces) {
            self.settings.set_bounces(bounces.round() as u32);
        }

        self.input.end_tick();
        TickControl::Continue
    }

    /// Draw phase: flush requested scene syncs, then run the pass sequence
    pub fn draw(&mut self) -> Result<()> {
        for kind in std::mem::take(&mut self.pending_sync) {
            self.pipeline.sync_scene(&self.scene, kind)?;
        }
        self.pipeline.draw(&self.camera, &self.scene, &self.settings)
    }

    pub fn present(&mut self) -> Result<()> {
        self.pipeline.backend_mut().present()
    }

    /// One full tick without an overlay between composite and present
    pub fn tick(&mut self, snapshot: DeviceSnapshot) -> Result<TickControl> {
        if self.update(snapshot) == TickControl::Exit {
            return Ok(TickControl::Exit);
        }
        self.draw()?;
        self.present()?;
        Ok(TickControl::Continue)
    }

    /// Queue field arrays to re-upload before the next draw
    pub fn request_sync<I: IntoIterator<Item = FieldKind>>(&mut self, kinds: I) {
        self.pending_sync.extend(kinds);
    }

    pub fn resized(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.camera.set_aspect(width as f32 / height as f32);
            self.pipeline.surfaces_reset();
        }
    }

    pub fn camera(&self) -> &ArcballCamera {
        &self.camera
    }

    pub fn controls(&self) -> &CameraControls {
        &self.controls
    }

    pub fn scene(&self) -> &ScenePool {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut ScenePool {
        &mut self.scene
    }

    pub fn settings(&self) -> &SettingsState {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SettingsState {
        &mut self.settings
    }

    /// Scene and settings together, for the inspector
    pub fn editable(&mut self) -> (&mut ScenePool, &mut SettingsState) {
        (&mut self.scene, &mut self.settings)
    }

    pub fn pipeline(&self) -> &RenderPipeline<B> {
        &self.pipeline
    }

    pub fn backend_mut(&mut self) -> &mut B {
        self.pipeline.backend_mut()
    }
}
