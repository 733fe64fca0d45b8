//! Look-at camera with reverse-Z perspective projection, plus mouse orbit controls.

use glam::{Mat4, Vec2, Vec3};

/// A perspective camera looking from `eye` at `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    /// Near clip plane distance (always positive).
    pub near: f32,
    /// Far clip plane distance (always positive, > near).
    pub far: f32,
}

impl Camera {
    pub fn new(eye: Vec3, target: Vec3, aspect_ratio: f32) -> Self {
        Self {
            eye,
            target,
            aspect_ratio,
            ..Self::default()
        }
    }

    /// Update the aspect ratio after a resize. Zero height is treated as 1.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        self.aspect_ratio = width / height.max(1.0);
    }

    /// Right-handed look-at view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Perspective projection with reverse-Z: near maps to depth 1, far to 0.
    pub fn projection_matrix(&self) -> Mat4 {
        // Swapping near and far in the standard projection yields reverse-Z.
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.far, self.near)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: std::f32::consts::FRAC_PI_4,
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Orbits the camera eye around its target: drag rotates, scroll zooms.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    /// Rotation about the up axis in radians.
    pub yaw: f32,
    /// Elevation above the target's horizontal plane in radians.
    pub pitch: f32,
    pub distance: f32,
    /// Radians per pixel of drag.
    pub rotate_speed: f32,
    /// Fractional distance change per scroll line.
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl OrbitControls {
    /// Keeps the eye just short of the poles so the look-at basis stays defined.
    pub const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

    /// Derive yaw, pitch and distance from the camera's current eye and target.
    pub fn from_camera(camera: &Camera) -> Self {
        let offset = camera.eye - camera.target;
        let distance = offset.length().max(f32::EPSILON);
        Self {
            yaw: offset.x.atan2(offset.z),
            pitch: (offset.y / distance).clamp(-1.0, 1.0).asin(),
            distance,
            ..Self::default()
        }
    }

    /// Apply a drag delta (pixels) and scroll amount (lines), then move the camera eye.
    pub fn update(&mut self, camera: &mut Camera, drag: Vec2, scroll: f32) {
        self.yaw -= drag.x * self.rotate_speed;
        self.pitch = (self.pitch + drag.y * self.rotate_speed)
            .clamp(-Self::MAX_PITCH, Self::MAX_PITCH);
        self.distance = (self.distance * (1.0 - scroll * self.zoom_speed))
            .clamp(self.min_distance, self.max_distance);
        camera.eye = camera.target + self.offset();
    }

    /// Eye position relative to the target.
    pub fn offset(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw) * self.distance
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance: 5.0,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            min_distance: 1.5,
            max_distance: 50.0,
        }
    }
}
