//! Scene management
//!
//! A scene is one PBR actor in front of a skybox, lit by the same
//! environment, plus an orientation axes overlay.

mod camera;
mod camera_controller;
mod light;
mod tone_mapping;

pub use camera::*;
pub use camera_controller::*;
pub use light::*;
pub use tone_mapping::*;

use std::sync::Arc;

use glam::Vec3;
use parking_lot::RwLock;

use crate::colors::{self, NamedColor};
use crate::profile::ViewerProfile;
use crate::resources::{EnvironmentMap, Mesh, PbrMaterial};

/// Normalized viewport with a bottom-left origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}

impl Viewport {
    pub const fn new(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Pixel rectangle `(x, y, width, height)` with a top-left origin.
    pub fn to_pixels(&self, width: u32, height: u32) -> (f32, f32, f32, f32) {
        let (w, h) = (width as f32, height as f32);
        (
            self.xmin * w,
            (1.0 - self.ymax) * h,
            (self.xmax - self.xmin) * w,
            (self.ymax - self.ymin) * h,
        )
    }
}

/// The mesh and how it is shaded
#[derive(Debug, Clone)]
pub struct Actor {
    pub mesh: Mesh,
    pub material: PbrMaterial,
}

/// Environment drawn behind everything
#[derive(Debug, Clone)]
pub struct Skybox {
    pub environment: Arc<EnvironmentMap>,
}

/// Axes triad drawn in a corner viewport
#[derive(Debug, Clone)]
pub struct OrientationAxes {
    pub viewport: Viewport,
    pub outline_color: Option<NamedColor>,
    /// Colours of the X, Y and Z axes
    pub axis_colors: [NamedColor; 3],
}

impl OrientationAxes {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            outline_color: None,
            axis_colors: [colors::RED, colors::YELLOW, colors::LIME],
        }
    }

    pub fn with_outline(mut self, color: NamedColor) -> Self {
        self.outline_color = Some(color);
        self
    }
}

/// Everything the renderer draws
pub struct Scene {
    pub camera: Camera,
    pub actor: Actor,
    pub skybox: Skybox,
    pub lighting: Lighting,
    pub orientation_axes: OrientationAxes,
    /// Clear colour, sRGB in [0, 1]
    pub background: Vec3,
    pub tone_mapping: SharedToneMapping,
}

impl Scene {
    /// Put `mesh` with `material` in front of `environment`, configured by
    /// `profile`, and frame it with the camera.
    pub fn assemble(
        profile: &ViewerProfile,
        mesh: Mesh,
        material: PbrMaterial,
        environment: Arc<EnvironmentMap>,
    ) -> Self {
        let mut lighting = Lighting::new(Arc::clone(&environment));
        lighting.automatic_light_creation = profile.automatic_light_creation;
        lighting.use_spherical_harmonics = profile.use_spherical_harmonics;

        let mut orientation_axes = OrientationAxes::new(profile.axes_viewport);
        if let Some(color) = profile.axes_outline {
            orientation_axes = orientation_axes.with_outline(color);
        }

        let mut scene = Self {
            camera: Camera {
                aspect: profile.width as f32 / profile.height.max(1) as f32,
                ..Default::default()
            },
            actor: Actor { mesh, material },
            skybox: Skybox { environment },
            lighting,
            orientation_axes,
            background: profile.background.to_vec3(),
            tone_mapping: Arc::new(RwLock::new(profile.tone_mapping)),
        };
        scene.reset_camera();
        scene
    }

    /// Frame the actor's bounds.
    pub fn reset_camera(&mut self) {
        let (center, radius) = self.actor.mesh.bounding_sphere();
        self.camera.reset_to_bounds(center, radius);
        log::debug!(
            "Camera reset: focal point {}, distance {:.3}",
            center,
            self.camera.distance()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Variant;
    use crate::resources::MaterialParameters;

    #[test]
    fn test_viewport_to_pixels_flips_y() {
        let close = |a: (f32, f32, f32, f32), b: (f32, f32, f32, f32)| {
            (a.0 - b.0).abs() < 1e-3
                && (a.1 - b.1).abs() < 1e-3
                && (a.2 - b.2).abs() < 1e-3
                && (a.3 - b.3).abs() < 1e-3
        };
        let viewport = Viewport::new(0.0, 0.2, 0.2, 0.4);
        assert!(close(viewport.to_pixels(640, 480), (0.0, 288.0, 128.0, 96.0)));
        let corner = Viewport::new(0.0, 0.0, 0.2, 0.2);
        assert!(close(corner.to_pixels(800, 500), (0.0, 400.0, 160.0, 100.0)));
    }

    #[test]
    fn test_skybox_and_lighting_share_environment() {
        let profile = ViewerProfile::for_variant(Variant::Texturing);
        let environment = Arc::new(EnvironmentMap::black());
        let scene = Scene::assemble(
            &profile,
            Mesh::cube(),
            PbrMaterial::new("cube", MaterialParameters::default()),
            Arc::clone(&environment),
        );
        assert!(Arc::ptr_eq(&scene.skybox.environment, &scene.lighting.environment));
        assert!(Arc::ptr_eq(&scene.skybox.environment, &environment));
        assert!(!scene.lighting.automatic_light_creation);
        assert!(!scene.lighting.use_spherical_harmonics);
        assert!(scene.lighting.use_image_based_lighting);
        assert_eq!(scene.orientation_axes.outline_color, Some(colors::CARROT));
    }

    #[test]
    fn test_simple_variant_lighting_defaults() {
        let profile = ViewerProfile::for_variant(Variant::Skybox);
        let scene = Scene::assemble(
            &profile,
            Mesh::cube(),
            PbrMaterial::new("cube", profile.material),
            Arc::new(EnvironmentMap::black()),
        );
        assert!(scene.lighting.automatic_light_creation);
        assert!(scene.lighting.use_spherical_harmonics);
        assert_eq!(scene.orientation_axes.viewport, Viewport::new(0.0, 0.2, 0.2, 0.4));
        assert_eq!(scene.tone_mapping.read().operator, TonemapOperator::None);
    }

    #[test]
    fn test_assemble_frames_the_mesh() {
        let profile = ViewerProfile::for_variant(Variant::Skybox);
        let scene = Scene::assemble(
            &profile,
            Mesh::cube(),
            PbrMaterial::new("cube", profile.material),
            Arc::new(EnvironmentMap::black()),
        );
        assert_eq!(scene.camera.target, Vec3::ZERO);
        assert!(scene.camera.position.z > 0.75f32.sqrt());
        assert!((scene.camera.aspect - 640.0 / 480.0).abs() < 1e-6);
    }
}
