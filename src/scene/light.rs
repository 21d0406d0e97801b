//! Scene lighting

use std::sync::Arc;

use glam::Vec3;

use super::Camera;
use crate::resources::EnvironmentMap;

/// How the surface is lit
#[derive(Debug, Clone)]
pub struct Lighting {
    /// Light the surface from the environment map
    pub use_image_based_lighting: bool,
    /// Add a headlight at the camera
    pub automatic_light_creation: bool,
    /// Diffuse environment light from SH9 coefficients instead of the
    /// irradiance cube map
    pub use_spherical_harmonics: bool,
    pub environment: Arc<EnvironmentMap>,
}

impl Lighting {
    pub fn new(environment: Arc<EnvironmentMap>) -> Self {
        Self {
            use_image_based_lighting: true,
            automatic_light_creation: true,
            use_spherical_harmonics: true,
            environment,
        }
    }

    /// The headlight, if automatic light creation is on
    pub fn headlight(&self, camera: &Camera) -> Option<Headlight> {
        self.automatic_light_creation
            .then(|| Headlight::at_camera(camera))
    }
}

/// White directional light shining from the camera toward the focal point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Headlight {
    /// Direction the light travels
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl Headlight {
    pub fn at_camera(camera: &Camera) -> Self {
        Self {
            direction: camera.forward(),
            color: Vec3::ONE,
            intensity: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headlight_follows_flag() {
        let mut lighting = Lighting::new(Arc::new(EnvironmentMap::black()));
        let mut camera = Camera::default();
        camera.reset_to_bounds(Vec3::ZERO, 1.0);

        let light = lighting.headlight(&camera).map(|l| l.direction);
        assert_eq!(light, Some(-Vec3::Z));

        lighting.automatic_light_creation = false;
        assert!(lighting.headlight(&camera).is_none());
    }
}
