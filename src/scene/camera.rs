//! Camera system

use glam::{Mat4, Vec3};

/// Perspective camera looking at a focal point
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub view_angle: f32,
    pub aspect: f32,
    /// Radius of the framed geometry, used to place the clipping planes
    pub scene_radius: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 1.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            view_angle: 30.0,
            aspect: 4.0 / 3.0,
            scene_radius: 1.0,
        }
    }
}

impl Camera {
    /// Frame a bounding sphere: look down -Z with +Y up, far enough that the
    /// sphere fits the view angle.
    pub fn reset_to_bounds(&mut self, center: Vec3, radius: f32) {
        let radius = if radius > 0.0 { radius } else { 1.0 };
        let distance = radius / (self.view_angle.to_radians() * 0.5).sin();
        self.target = center;
        self.position = center + Vec3::Z * distance;
        self.up = Vec3::Y;
        self.scene_radius = radius;
    }

    /// Distance from the camera to the focal point
    pub fn distance(&self) -> f32 {
        (self.position - self.target).length()
    }

    /// Near and far planes enclosing the framed geometry from where the
    /// camera currently is.
    pub fn clipping_range(&self) -> (f32, f32) {
        let distance = self.distance();
        let far = distance + self.scene_radius * 1.5;
        let near = (distance - self.scene_radius * 1.5).max(far * 1e-3);
        (near, far)
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        let (near, far) = self.clipping_range();
        Mat4::perspective_rh(self.view_angle.to_radians(), self.aspect, near, far)
    }

    /// Get combined view-projection matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Get the forward direction
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Update aspect ratio for perspective projection
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_frames_bounding_sphere() {
        let mut camera = Camera::default();
        camera.reset_to_bounds(Vec3::new(0.0, 5.0, 15.0), 2.0);
        let expected = 2.0 / 15f32.to_radians().sin();
        assert!((camera.distance() - expected).abs() < 1e-4);
        assert_eq!(camera.target, Vec3::new(0.0, 5.0, 15.0));
        assert!((camera.forward() + Vec3::Z).length() < 1e-6);
        assert_eq!(camera.up, Vec3::Y);
    }

    #[test]
    fn test_clipping_range_encloses_geometry() {
        let mut camera = Camera::default();
        camera.reset_to_bounds(Vec3::ZERO, 1.0);
        let (near, far) = camera.clipping_range();
        assert!(near > 0.0);
        assert!(near < camera.distance() - 1.0);
        assert!(far > camera.distance() + 1.0);
    }

    #[test]
    fn test_target_projects_to_screen_centre() {
        let mut camera = Camera::default();
        camera.reset_to_bounds(Vec3::new(1.0, 2.0, 3.0), 0.5);
        let clip = camera.view_projection_matrix() * camera.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
