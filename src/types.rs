use crate::core::params::{self, ParameterTable};
use crate::error::Result;
use crate::scene::Sphere;

/// Scalar block of the path-trace program (WGSL `Frame`, 112 bytes)
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PathTraceUniform {
    pub camera_transform: [[f32; 4]; 4],
    pub camera_position: [f32; 3],
    pub focal_length: f32,
    pub viewport_size: [f32; 2],
    pub screen: [i32; 2],
    pub frame: i32,
    pub samples: i32,
    pub bounces: i32,
    pub sphere_count: u32,
}

impl PathTraceUniform {
    pub fn from_params(params: &ParameterTable, sphere_count: usize) -> Result<Self> {
        Ok(Self {
            camera_transform: params.mat4(params::CAMERA_TRANSFORM)?.to_cols_array_2d(),
            camera_position: params.vec3(params::CAMERA_POSITION)?.to_array(),
            focal_length: params.float(params::FOCAL_LENGTH)?,
            viewport_size: params.vec2(params::VIEWPORT_SIZE)?.to_array(),
            screen: [params.int(params::SCREEN_X)?, params.int(params::SCREEN_Y)?],
            frame: params.int(params::FRAME)?,
            samples: params.int(params::SAMPLES)?,
            bounces: params.int(params::BOUNCES)?,
            sphere_count: sphere_count as u32,
        })
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RasterUniform {
    pub view_proj: [[f32; 4]; 4],
    pub light_dir: [f32; 3],
    pub _pad: f32,
}

/// Per-instance data for the raster proxy spheres
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SphereInstance {
    pub center: [f32; 3],
    pub radius: f32,
    pub color: [f32; 4],
}

impl From<&Sphere> for SphereInstance {
    fn from(sphere: &Sphere) -> Self {
        let material = &sphere.material;
        // Emitters preview in their light colour
        let color = if material.light_intensity() > 0.0 {
            material.light_color.extend(1.0)
        } else {
            material.diffuse
        };
        Self {
            center: sphere.position.to_array(),
            radius: sphere.radius,
            color: color.to_array(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct AccumulateUniform {
    pub frames: u32,
    pub constant_weight: f32,
    pub _pad: [u32; 2],
}

/// Placement of a composited surface in normalized device coordinates
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ScreenRect {
    pub center: [f32; 2],
    pub half_size: [f32; 2],
}

pub const INSET_MARGIN_PX: f32 = 25.0;
pub const INSET_FRACTION: f32 = 0.25;

impl ScreenRect {
    pub const FULL: ScreenRect = ScreenRect {
        center: [0.0, 0.0],
        half_size: [1.0, 1.0],
    };

    /// Quarter-size rectangle anchored 25 px from the bottom-right corner
    pub fn inset(width: u32, height: u32) -> Self {
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        let inset_w = w * INSET_FRACTION;
        let inset_h = h * INSET_FRACTION;
        let center_x = w - INSET_MARGIN_PX - inset_w / 2.0;
        let center_y = h - INSET_MARGIN_PX - inset_h / 2.0;
        Self {
            center: [center_x / w * 2.0 - 1.0, 1.0 - center_y / h * 2.0],
            half_size: [INSET_FRACTION, INSET_FRACTION],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_sizes_match_wgsl() {
        assert_eq!(std::mem::size_of::<PathTraceUniform>(), 112);
        assert_eq!(std::mem::size_of::<RasterUniform>(), 80);
        assert_eq!(std::mem::size_of::<SphereInstance>(), 32);
        assert_eq!(std::mem::size_of::<AccumulateUniform>(), 16);
        assert_eq!(std::mem::size_of::<ScreenRect>(), 16);
    }

    #[test]
    fn inset_sits_in_bottom_right() {
        let rect = ScreenRect::inset(800, 400);
        // right edge: 775 px -> 0.9375 ndc
        assert!((rect.center[0] + rect.half_size[0] - 0.9375).abs() < 1e-6);
        // bottom edge: 375 px from top -> -0.875 ndc
        assert!((rect.center[1] - rect.half_size[1] + 0.875).abs() < 1e-6);
    }
}
