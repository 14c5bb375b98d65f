use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Anything the cruise controller can fly: a pose with a position and an
/// orientation.
///
/// The host engine usually owns the real camera object; implementing this
/// trait on it (or on a thin wrapper) lets the controller mutate it
/// directly.
pub trait CameraRig {
    /// World-space position.
    fn position(&self) -> Vec3;

    /// Replace the world-space position.
    fn set_position(&mut self, position: Vec3);

    /// World-space orientation. The camera looks down its local `-Z`.
    fn orientation(&self) -> Quat;

    /// Replace the orientation.
    fn set_orientation(&mut self, orientation: Quat);

    /// Translate by `offset` expressed in the camera's local axes.
    fn translate_local(&mut self, offset: Vec3) {
        let world = self.orientation() * offset;
        self.set_position(self.position() + world);
    }
}

/// Serializable snapshot of a rig's pose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    /// World-space position.
    pub position: [f32; 3],
    /// Orientation quaternion as `[x, y, z, w]`.
    pub orientation: [f32; 4],
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 100.0],
            orientation: Quat::IDENTITY.to_array(),
        }
    }
}

impl CameraPose {
    /// Capture the pose of `rig`.
    #[must_use]
    pub fn of(rig: &impl CameraRig) -> Self {
        Self {
            position: rig.position().to_array(),
            orientation: rig.orientation().to_array(),
        }
    }

    /// Move `rig` to this pose. The orientation is normalized first.
    pub fn apply_to(&self, rig: &mut impl CameraRig) {
        rig.set_position(Vec3::from(self.position));
        let orientation = Quat::from_array(self.orientation);
        if orientation.length_squared() > f32::EPSILON {
            rig.set_orientation(orientation.normalize());
        }
    }
}

/// Perspective camera defined by a pose and projection parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    orientation: Quat,
    /// Euler angles (XYZ order, radians) re-derived on every orientation
    /// change, for display.
    euler: Vec3,
    /// Viewport aspect ratio (width / height).
    pub aspect: f32,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}

impl Camera {
    /// Viewer default: 45° field of view, 0.1–100000 clip range, sitting at
    /// `(0, 0, 100)` looking at the origin.
    #[must_use]
    pub fn new(aspect: f32) -> Self {
        let mut camera = Self {
            position: Vec3::new(0.0, 0.0, 100.0),
            orientation: Quat::IDENTITY,
            euler: Vec3::ZERO,
            aspect,
            fovy: 45.0,
            znear: 0.1,
            zfar: 100_000.0,
        };
        camera.look_at(Vec3::ZERO, Vec3::Y);
        camera
    }

    /// Turn to face `target`, keeping `up` as close to vertical as possible.
    /// No-op if `target` coincides with the position.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let forward = target - self.position;
        if forward.length_squared() <= f32::EPSILON {
            return;
        }
        let view = Mat4::look_at_rh(self.position, target, up);
        let (_, rotation, _) = view.inverse().to_scale_rotation_translation();
        self.set_orientation(rotation);
    }

    /// Update the aspect ratio after a resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    /// Euler angles (XYZ order, radians) of the current orientation.
    #[must_use]
    pub fn euler(&self) -> Vec3 {
        self.euler
    }

    /// Unit vector the camera is looking along.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    /// World-to-camera matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
            .inverse()
    }

    /// Build the combined view-projection matrix.
    #[must_use]
    pub fn build_matrix(&self) -> Mat4 {
        self.build_projection() * self.view_matrix()
    }

    /// Get just the projection matrix.
    #[must_use]
    pub fn build_projection(&self) -> Mat4 {
        // perspective_rh already uses [0,1] depth range (wgpu/Vulkan
        // convention)
        Mat4::perspective_rh(
            self.fovy.to_radians(),
            self.aspect,
            self.znear,
            self.zfar,
        )
    }
}

impl CameraRig for Camera {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn orientation(&self) -> Quat {
        self.orientation
    }

    fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation;
        let (x, y, z) = orientation.to_euler(EulerRot::XYZ);
        self.euler = Vec3::new(x, y, z);
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
/// GPU uniform buffer holding the view-projection matrix and camera pose,
/// laid out for a WGSL/GLSL `std140` uniform block.
pub struct CameraUniform {
    /// Combined view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// Camera world-space position.
    pub position: [f32; 3],
    /// Viewport aspect ratio.
    pub aspect: f32,
    /// Camera forward direction for lighting.
    pub forward: [f32; 3],
    /// Vertical field of view in degrees.
    pub fovy: f32,
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraUniform {
    /// Create a new camera uniform with identity view-projection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            position: [0.0; 3],
            aspect: 1.6,
            forward: [0.0, 0.0, -1.0],
            fovy: 45.0,
        }
    }

    /// Update uniform fields from the given camera's current state.
    pub fn update_view_proj(&mut self, camera: &Camera) {
        self.view_proj = camera.build_matrix().to_cols_array_2d();
        self.position = camera.position().to_array();
        self.aspect = camera.aspect;
        self.forward = camera.forward().to_array();
        self.fovy = camera.fovy;
    }

    /// Raw bytes for a buffer upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera_looks_at_origin() {
        let camera = Camera::new(1.0);
        assert_eq!(camera.position(), Vec3::new(0.0, 0.0, 100.0));
        assert!(camera.forward().abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }

    #[test]
    fn look_at_turns_towards_target() {
        let mut camera = Camera::new(1.0);
        camera.look_at(Vec3::new(100.0, 0.0, 0.0), Vec3::Y);
        let expected = Vec3::new(1.0, 0.0, -1.0).normalize();
        assert!(camera.forward().abs_diff_eq(expected, 1e-5));
        assert!((camera.euler().y + std::f32::consts::FRAC_PI_4).abs() < 1e-4);
    }

    #[test]
    fn translate_local_follows_orientation() {
        let mut camera = Camera::new(1.0);
        camera.set_orientation(Quat::from_rotation_y(
            std::f32::consts::FRAC_PI_2,
        ));
        camera.translate_local(Vec3::new(0.0, 0.0, -10.0));
        assert!(camera
            .position()
            .abs_diff_eq(Vec3::new(-10.0, 0.0, 100.0), 1e-4));
    }

    #[test]
    fn pose_snapshot_restores() {
        let mut camera = Camera::new(1.0);
        camera.set_position(Vec3::new(5.0, 6.0, 7.0));
        camera.set_orientation(Quat::from_rotation_x(0.3));
        let pose = CameraPose::of(&camera);

        let mut other = Camera::new(1.0);
        pose.apply_to(&mut other);
        assert_eq!(other.position(), camera.position());
        assert!(other.orientation().abs_diff_eq(camera.orientation(), 1e-6));
        assert!(other.euler().abs_diff_eq(camera.euler(), 1e-6));
    }

    #[test]
    fn view_matrix_maps_position_to_origin() {
        let camera = Camera::new(1.0);
        let eye = camera.view_matrix().transform_point3(camera.position());
        assert!(eye.abs_diff_eq(Vec3::ZERO, 1e-4));
    }

    #[test]
    fn uniform_tracks_camera() {
        let mut camera = Camera::new(2.0);
        camera.set_position(Vec3::new(1.0, 2.0, 3.0));
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera);
        assert_eq!(uniform.position, [1.0, 2.0, 3.0]);
        assert_eq!(uniform.aspect, 2.0);
        assert_eq!(uniform.as_bytes().len(), 96);
    }
}
