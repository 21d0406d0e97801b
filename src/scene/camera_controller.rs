//! Orbit camera controller
//!
//! - Left drag: orbit around the focal point
//! - Right drag: dolly toward or away from the focal point
//! - Scroll: zoom by a fixed factor per notch

use glam::{Vec2, Vec3};

use super::Camera;

/// Input state for the camera controller
#[derive(Debug, Clone, Default)]
pub struct CameraInput {
    /// Mouse delta since last frame (in pixels)
    pub mouse_delta: Vec2,

    /// Mouse scroll delta in notches (positive = scroll up)
    pub scroll_delta: f32,

    /// Left button held
    pub rotate_active: bool,

    /// Right button held
    pub dolly_active: bool,
}

impl CameraInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset per-frame deltas (call after update)
    pub fn reset_deltas(&mut self) {
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
    }
}

/// Orbit camera controller
///
/// Rotates around a target point at a variable distance.
pub struct OrbitController {
    /// Target point to orbit around
    pub target: Vec3,
    /// Distance from target
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Current azimuth angle (horizontal) in radians
    pub azimuth: f32,
    /// Current elevation angle (vertical) in radians
    pub elevation: f32,
    pub max_elevation: f32,
    /// Orbit sensitivity (radians per pixel)
    pub orbit_sensitivity: f32,
    /// Zoom factor per scroll notch
    pub zoom_factor: f32,
    /// Scroll notches per pixel of right drag
    pub dolly_sensitivity: f32,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 10.0,
            min_distance: 0.01,
            max_distance: 1000.0,
            azimuth: std::f32::consts::FRAC_PI_2,
            elevation: 0.0,
            max_elevation: std::f32::consts::FRAC_PI_2 - 0.01,
            orbit_sensitivity: 0.01,
            zoom_factor: 1.1,
            dolly_sensitivity: 0.05,
        }
    }
}

impl OrbitController {
    /// Initialize from camera's current position and target
    pub fn from_camera(camera: &Camera) -> Self {
        let mut controller = Self::default();
        controller.sync_with_camera(camera);
        controller
    }

    /// Initialize from camera's current position and target
    pub fn sync_with_camera(&mut self, camera: &Camera) {
        self.target = camera.target;
        let offset = camera.position - camera.target;
        self.distance = offset.length().max(f32::EPSILON);
        self.min_distance = self.distance * 0.02;
        self.max_distance = self.distance * 50.0;

        self.elevation = (offset.y / self.distance).clamp(-1.0, 1.0).asin();
        self.azimuth = offset.z.atan2(offset.x);
    }

    /// Calculate camera position from orbit parameters
    fn calculate_position(&self) -> Vec3 {
        let x = self.distance * self.elevation.cos() * self.azimuth.cos();
        let y = self.distance * self.elevation.sin();
        let z = self.distance * self.elevation.cos() * self.azimuth.sin();
        self.target + Vec3::new(x, y, z)
    }

    fn zoom(&mut self, notches: f32) {
        self.distance /= self.zoom_factor.powf(notches);
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
    }

    pub fn update(&mut self, camera: &mut Camera, input: &CameraInput) {
        if input.scroll_delta != 0.0 {
            self.zoom(input.scroll_delta);
        }

        if input.dolly_active && input.mouse_delta.y != 0.0 {
            // Dragging up moves closer
            self.zoom(-input.mouse_delta.y * self.dolly_sensitivity);
        } else if input.rotate_active && input.mouse_delta != Vec2::ZERO {
            self.azimuth += input.mouse_delta.x * self.orbit_sensitivity;
            self.elevation += input.mouse_delta.y * self.orbit_sensitivity;
            self.elevation = self.elevation.clamp(-self.max_elevation, self.max_elevation);
            self.azimuth %= 2.0 * std::f32::consts::PI;
        }

        self.apply(camera);
    }

    /// Look at the target from along `direction`, keeping the distance.
    ///
    /// Directions along Y stop at the elevation limit and keep the
    /// current azimuth.
    pub fn snap_to(&mut self, camera: &mut Camera, direction: Vec3) {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return;
        }
        self.elevation = direction
            .y
            .asin()
            .clamp(-self.max_elevation, self.max_elevation);
        if Vec2::new(direction.x, direction.z).length_squared() > 1e-8 {
            self.azimuth = direction.z.atan2(direction.x);
        }
        self.apply(camera);
    }

    fn apply(&self, camera: &mut Camera) {
        camera.position = self.calculate_position();
        camera.target = self.target;
        camera.up = Vec3::Y;
    }
}
