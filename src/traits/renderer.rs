use glam::Mat4;

use crate::core::frame::AccumulationStep;
use crate::core::params::ParameterTable;
use crate::error::Result;
use crate::scene::ScenePool;

/// GPU-addressable pixel buffers owned by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    /// Rasterised proxy preview
    Raster,
    /// Output of the current path-trace pass
    PathTrace,
    /// Temporal blend of path-trace and previous
    Accumulated,
    /// Last tick's displayed path-trace output
    Previous,
}

/// Opaque pass stages the render pipeline sequences each tick
pub trait RenderBackend {
    /// Current drawable size in pixels
    fn screen_size(&self) -> (u32, u32);

    /// Largest sphere count the path-trace program can hold
    fn sphere_capacity(&self) -> usize;

    fn begin_frame(&mut self) -> Result<()>;

    /// Copy `source` into `Surface::Previous` before it is overwritten this tick
    fn capture_previous(&mut self, source: Surface) -> Result<()>;

    fn raster_pass(&mut self, scene: &ScenePool, view: Mat4, projection: Mat4) -> Result<()>;

    /// Uploads dirty parameters and traces into `Surface::PathTrace`
    fn path_trace_pass(&mut self, params: &ParameterTable) -> Result<()>;

    /// Blends `Surface::PathTrace` with `Surface::Previous` into `Surface::Accumulated`
    fn accumulate_pass(&mut self, step: &AccumulationStep) -> Result<()>;

    /// Draws `primary` full-screen and `inset` scaled down in one batch
    fn composite_pass(&mut self, primary: Surface, inset: Surface) -> Result<()>;

    fn present(&mut self) -> Result<()>;
}
