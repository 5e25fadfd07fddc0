use glam::{Mat4, Vec3};

/// Camera capability used by the render loop and pipeline
pub trait Camera {
    /// Replace the offset with a translation by `offset`
    fn translate(&mut self, offset: Vec3);

    /// Replace the rotation with the given absolute yaw, pitch and roll in degrees
    fn rotate(&mut self, euler_degrees: Vec3);

    /// Back to the construction-time offset and identity rotation
    fn reset(&mut self);

    fn view(&self) -> Mat4;

    /// Camera position in world space
    fn position(&self) -> Vec3;

    fn projection(&self) -> Mat4;
}
