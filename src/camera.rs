use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

use crate::traits::camera::Camera;

pub const DEFAULT_FOV_DEGREES: f32 = 60.0;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 100.0;
pub const VIEWPORT_POINTS: (usize, usize) = (160, 90);

const DEGENERATE_EPSILON: f32 = 1e-10;

/// Perspective parameters; the field of view is vertical and in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov_degrees,
            aspect,
            near,
            far,
        }
    }

    pub fn with_aspect(aspect: f32) -> Self {
        Self::new(DEFAULT_FOV_DEGREES, aspect, DEFAULT_NEAR, DEFAULT_FAR)
    }

    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_radians(), self.aspect, self.near, self.far)
    }
}

/// Ray sample grid on the near plane, in camera space.
///
/// Built once from the projection; it does not follow the window size.
#[derive(Debug, Clone)]
pub struct ViewportGrid {
    points: Vec<Vec3>,
    dimensions: (usize, usize),
    width: f32,
    height: f32,
    focal_length: f32,
}

impl ViewportGrid {
    pub fn new(projection: &Projection, dimensions: (usize, usize)) -> Self {
        let focal_length = projection.near;
        let height = 2.0 * focal_length * (projection.fov_radians() / 2.0).tan();
        let width = height * projection.aspect;

        let (nx, ny) = dimensions;
        let delta = Vec2::new(width / nx as f32, height / ny as f32);
        let corner = Vec2::new(-width / 2.0, -height / 2.0);

        let points = (0..ny)
            .flat_map(|y| (0..nx).map(move |x| (x, y)))
            .map(|(x, y)| {
                let p = corner + delta * Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                Vec3::new(p.x, p.y, -focal_length)
            })
            .collect();

        Self {
            points,
            dimensions,
            width,
            height,
            focal_length,
        }
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn point(&self, x: usize, y: usize) -> Option<Vec3> {
        if x >= self.dimensions.0 || y >= self.dimensions.1 {
            return None;
        }
        self.points.get(y * self.dimensions.0 + x).copied()
    }

    /// Spacing between neighbouring points
    pub fn point_delta(&self) -> Vec2 {
        Vec2::new(
            self.width / self.dimensions.0 as f32,
            self.height / self.dimensions.1 as f32,
        )
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.dimensions
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn focal_length(&self) -> f32 {
        self.focal_length
    }
}

/// Orbit camera around a fixed target.
///
/// `translate` and `rotate` replace the offset and rotation outright; the drag controls
/// feeding them already carry the integrated state.
#[derive(Debug, Clone)]
pub struct ArcballCamera {
    initial_position: Vec3,
    target: Vec3,
    projection: Projection,
    offset: Mat4,
    rotation: Quat,
    viewport: ViewportGrid,
}

impl ArcballCamera {
    pub fn new(position: Vec3, target: Vec3, projection: Projection) -> Self {
        Self {
            initial_position: position,
            target,
            projection,
            offset: Mat4::from_translation(position),
            rotation: Quat::IDENTITY,
            viewport: ViewportGrid::new(&projection, VIEWPORT_POINTS),
        }
    }

    pub fn world_up() -> Vec3 {
        Vec3::Y
    }

    pub fn initial_position(&self) -> Vec3 {
        self.initial_position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn offset(&self) -> Mat4 {
        self.offset
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn projection_params(&self) -> &Projection {
        &self.projection
    }

    pub fn viewport(&self) -> &ViewportGrid {
        &self.viewport
    }

    /// Offset followed by rotation, as one matrix
    pub fn transform(&self) -> Mat4 {
        Mat4::from_quat(self.rotation) * self.offset
    }

    /// Window resizes only change the projection; the sample grid keeps its construction aspect
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.projection.aspect = aspect;
        }
    }
}

impl Camera for ArcballCamera {
    fn translate(&mut self, offset: Vec3) {
        self.offset = Mat4::from_translation(offset);
    }

    fn rotate(&mut self, euler_degrees: Vec3) {
        self.rotation = Quat::from_euler(
            EulerRot::YXZ,
            euler_degrees.x.to_radians(),
            euler_degrees.y.to_radians(),
            euler_degrees.z.to_radians(),
        );
    }

    fn reset(&mut self) {
        self.rotate(Vec3::ZERO);
        self.translate(self.initial_position);
    }

    fn view(&self) -> Mat4 {
        let eye = self.position();
        // Rotated up vector keeps look_at stable when orbiting over the poles
        let up = self.rotation * Self::world_up();
        let forward = self.target - eye;

        if forward.length_squared() < DEGENERATE_EPSILON {
            // Eye on the target: look along the rig's own forward axis
            return Mat4::look_to_rh(eye, self.rotation * Vec3::NEG_Z, up);
        }
        let up = if forward.normalize().cross(up).length_squared() < DEGENERATE_EPSILON {
            self.rotation * Vec3::Z
        } else {
            up
        };
        Mat4::look_at_rh(eye, self.target, up)
    }

    fn position(&self) -> Vec3 {
        self.rotation * self.offset.transform_point3(Vec3::ZERO)
    }

    fn projection(&self) -> Mat4 {
        self.projection.matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> ArcballCamera {
        ArcballCamera::new(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO, Projection::with_aspect(16.0 / 9.0))
    }

    #[test]
    fn viewport_dimensions_follow_projection() {
        let grid = camera().viewport().clone();
        let expected_height = 2.0 * 0.1 * (30.0f32.to_radians()).tan();
        assert!((grid.height() - expected_height).abs() < 1e-6);
        assert!((grid.width() - expected_height * 16.0 / 9.0).abs() < 1e-6);
        assert_eq!(grid.points().len(), 160 * 90);
        assert_eq!(grid.focal_length(), 0.1);
    }

    #[test]
    fn viewport_points_are_centred() {
        let cam = camera();
        let grid = cam.viewport();
        let first = grid.point(0, 0).unwrap();
        let last = grid.point(159, 89).unwrap();
        assert!((first.x + last.x).abs() < 1e-6);
        assert!((first.y + last.y).abs() < 1e-6);
        assert_eq!(first.z, -0.1);
        assert!(grid.point(160, 0).is_none());
    }

    #[test]
    fn yaw_quarter_turn_orbits_position() {
        let mut cam = camera();
        cam.rotate(Vec3::new(90.0, 0.0, 0.0));
        let pos = cam.position();
        assert!((pos - Vec3::new(-5.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn transform_moves_origin_to_position() {
        let mut cam = camera();
        cam.rotate(Vec3::new(30.0, 20.0, 0.0));
        cam.translate(Vec3::new(1.0, 2.0, -7.0));
        let moved = cam.transform().transform_point3(Vec3::ZERO);
        assert!((moved - cam.position()).length() < 1e-5);
    }

    #[test]
    fn resize_keeps_viewport() {
        let mut cam = camera();
        let width = cam.viewport().width();
        cam.set_aspect(1.0);
        assert_eq!(cam.projection_params().aspect, 1.0);
        assert_eq!(cam.viewport().width(), width);
        cam.set_aspect(0.0);
        assert_eq!(cam.projection_params().aspect, 1.0);
    }
}
