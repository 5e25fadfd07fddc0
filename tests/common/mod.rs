#![allow(dead_code)]

use glam::Mat4;

use path_tracer::core::{AccumulationStep, ParameterTable};
use path_tracer::scene::{ScenePool, MAX_SPHERES};
use path_tracer::traits::{RenderBackend, Surface};
use path_tracer::Result;

/// Pass invocations in call order
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Begin,
    Capture(Surface),
    Raster { spheres: usize },
    PathTrace { dirty: Vec<&'static str> },
    Accumulate(AccumulationStep),
    Composite { primary: Surface, inset: Surface },
    Present,
}

/// Headless backend that records every pass and the last bound parameter table
pub struct RecordingBackend {
    pub ops: Vec<Op>,
    pub last_params: Option<ParameterTable>,
    pub last_view: Option<Mat4>,
    pub capacity: usize,
    pub size: (u32, u32),
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::with_capacity(MAX_SPHERES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ops: Vec::new(),
            last_params: None,
            last_view: None,
            capacity,
            size: (800, 600),
        }
    }

    /// Ops recorded since the last call
    pub fn take_ops(&mut self) -> Vec<Op> {
        std::mem::take(&mut self.ops)
    }

    pub fn accumulate_steps(&self) -> Vec<AccumulationStep> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Accumulate(step) => Some(*step),
                _ => None,
            })
            .collect()
    }
}

impl RenderBackend for RecordingBackend {
    fn screen_size(&self) -> (u32, u32) {
        self.size
    }

    fn sphere_capacity(&self) -> usize {
        self.capacity
    }

    fn begin_frame(&mut self) -> Result<()> {
        self.ops.push(Op::Begin);
        Ok(())
    }

    fn capture_previous(&mut self, source: Surface) -> Result<()> {
        self.ops.push(Op::Capture(source));
        Ok(())
    }

    fn raster_pass(&mut self, scene: &ScenePool, view: Mat4, _projection: Mat4) -> Result<()> {
        self.last_view = Some(view);
        self.ops.push(Op::Raster {
            spheres: scene.len(),
        });
        Ok(())
    }

    fn path_trace_pass(&mut self, params: &ParameterTable) -> Result<()> {
        let dirty = params.dirty_arrays().map(|(name, _)| name).collect();
        self.last_params = Some(params.clone());
        self.ops.push(Op::PathTrace { dirty });
        Ok(())
    }

    fn accumulate_pass(&mut self, step: &AccumulationStep) -> Result<()> {
        self.ops.push(Op::Accumulate(*step));
        Ok(())
    }

    fn composite_pass(&mut self, primary: Surface, inset: Surface) -> Result<()> {
        self.ops.push(Op::Composite { primary, inset });
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.ops.push(Op::Present);
        Ok(())
    }
}
