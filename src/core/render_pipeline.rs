use crate::camera::ArcballCamera;
use crate::core::frame::{AccumulationStep, FrameCounter};
use crate::core::params::{self, ParamValue, ParameterTable, ProgramLayout};
use crate::error::{Error, Result};
use crate::scene::{FieldKind, ScenePool};
use crate::settings::{SettingsState, ViewMode};
use crate::traits::camera::Camera;
use crate::traits::renderer::{RenderBackend, Surface};

/// Runs raster -> path-trace -> accumulate -> composite once per tick.
///
/// Owns the parameter table; scene and settings changes reach the GPU program only through
/// this type.
pub struct RenderPipeline<B: RenderBackend> {
    backend: B,
    params: ParameterTable,
    frames: FrameCounter,
    last_output: Surface,
}

impl<B: RenderBackend> RenderPipeline<B> {
    /// Declares the program layout for `scene` and binds every field array
    pub fn new(backend: B, scene: &ScenePool) -> Result<Self> {
        let capacity = backend.sphere_capacity();
        if scene.len() > capacity {
            return Err(Error::ArrayLength {
                name: "SPHERE_*".to_string(),
                expected: capacity,
                actual: scene.len(),
            });
        }

        let mut pipeline = Self {
            backend,
            params: ParameterTable::new(ProgramLayout::path_tracer(scene.len())),
            frames: FrameCounter::new(),
            last_output: Surface::PathTrace,
        };
        for kind in FieldKind::ALL {
            pipeline.sync_scene(scene, kind)?;
        }

        log::info!("render pipeline ready: {} spheres", scene.len());
        Ok(pipeline)
    }

    /// Pushes one field array of `scene` to the path-trace program
    pub fn sync_scene(&mut self, scene: &ScenePool, kind: FieldKind) -> Result<()> {
        scene.set_data(kind, &mut self.params)
    }

    pub fn draw(
        &mut self,
        camera: &ArcballCamera,
        scene: &ScenePool,
        settings: &SettingsState,
    ) -> Result<()> {
        self.backend.begin_frame()?;

        // Must precede the path-trace pass, which overwrites the source surface
        self.backend.capture_previous(self.last_output)?;

        self.backend
            .raster_pass(scene, camera.view(), camera.projection())?;

        self.bind_frame(camera, settings)?;
        self.params.ensure_bound()?;
        self.backend.path_trace_pass(&self.params)?;
        self.params.clear_dirty();

        let output = match self.frames.advance(settings.accumulation) {
            Some(step) => {
                self.accumulate(&step)?;
                Surface::Accumulated
            }
            None => Surface::PathTrace,
        };

        let (primary, inset) = match settings.view {
            ViewMode::PathTrace => (output, Surface::Raster),
            ViewMode::Raster => (Surface::Raster, output),
        };
        self.backend.composite_pass(primary, inset)?;

        self.last_output = output;
        self.frames.finish_tick();
        Ok(())
    }

    fn accumulate(&mut self, step: &AccumulationStep) -> Result<()> {
        self.backend.accumulate_pass(step)
    }

    fn bind_frame(&mut self, camera: &ArcballCamera, settings: &SettingsState) -> Result<()> {
        let (width, height) = self.backend.screen_size();
        let viewport = camera.viewport();
        let frame = (self.frames.total() % i32::MAX as u64) as i32;

        let p = &mut self.params;
        p.set(params::CAMERA_POSITION, ParamValue::Vec3(camera.position()))?;
        p.set(params::CAMERA_TRANSFORM, ParamValue::Mat4(camera.transform()))?;
        p.set(params::VIEWPORT_SIZE, ParamValue::Vec2(viewport.size()))?;
        p.set(params::FOCAL_LENGTH, ParamValue::Float(viewport.focal_length()))?;
        p.set(params::FRAME, ParamValue::Int(frame))?;
        p.set(params::SCREEN_X, ParamValue::Int(width as i32))?;
        p.set(params::SCREEN_Y, ParamValue::Int(height as i32))?;
        p.set(params::SAMPLES, ParamValue::Int(settings.samples as i32))?;
        p.set(params::BOUNCES, ParamValue::Int(settings.bounces as i32))?;
        Ok(())
    }

    /// The backend recreated its surfaces (resize), so the accumulated image is gone
    pub fn surfaces_reset(&mut self) {
        log::debug!("render surfaces recreated, restarting accumulation");
        self.frames.restart();
    }

    pub fn params(&self) -> &ParameterTable {
        &self.params
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn total_frames(&self) -> u64 {
        self.frames.total()
    }

    pub fn accumulated_frames(&self) -> u32 {
        self.frames.accumulated()
    }

    /// Surface holding the latest path-trace result
    pub fn last_output(&self) -> Surface {
        self.last_output
    }
}
