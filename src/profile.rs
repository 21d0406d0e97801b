//! Per-program settings
//!
//! Both viewers share the same code path; everything that differs between
//! them lives in a [`ViewerProfile`].

use glam::Vec2;

use crate::colors::{self, NamedColor};
use crate::resources::MaterialParameters;
use crate::scene::{ToneMapping, TonemapOperator, Viewport};
use crate::surfaces::UvGeneration;
use crate::ui::{ParameterId, SliderRepresentation, SliderWidget};

/// Which of the two programs is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Textured surface, environment from a folder or a single image
    Texturing,
    /// Untextured surface, environment from a six-image folder
    Skybox,
}

impl Variant {
    pub fn uv_generation(self) -> UvGeneration {
        match self {
            Variant::Texturing => UvGeneration::Automatic,
            Variant::Skybox => UvGeneration::Manual,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewerProfile {
    pub variant: Variant,
    pub title: &'static str,
    pub width: u32,
    pub height: u32,
    pub material: MaterialParameters,
    pub automatic_light_creation: bool,
    pub use_spherical_harmonics: bool,
    pub axes_viewport: Viewport,
    pub axes_outline: Option<NamedColor>,
    pub tone_mapping: ToneMapping,
    pub background: NamedColor,
    pub sliders: Vec<SliderWidget>,
}

impl ViewerProfile {
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Texturing => Self::texturing(),
            Variant::Skybox => Self::skybox(),
        }
    }

    pub fn texturing() -> Self {
        let material = MaterialParameters::default()
            .with_diffuse(1.0)
            .with_roughness(0.8)
            .with_metallic(1.0)
            .with_occlusion_strength(1.0)
            .with_normal_scale(1.0);

        let slider = |title: &str, value: f32, maximum: f32, p1: (f32, f32), p2: (f32, f32)| {
            SliderRepresentation::new(title)
                .with_range(0.0, maximum)
                .with_value(value)
                .with_endpoints(Vec2::from(p1), Vec2::from(p2))
        };
        let sliders = vec![
            SliderWidget::new(
                ParameterId::Metallic,
                slider("Metallicity", material.metallic, 1.0, (0.2, 0.1), (0.8, 0.1)),
            ),
            SliderWidget::new(
                ParameterId::Roughness,
                slider("Roughness", material.roughness, 1.0, (0.2, 0.9), (0.8, 0.9)),
            ),
            SliderWidget::new(
                ParameterId::OcclusionStrength,
                slider("Occlusion", 1.0, 1.0, (0.1, 0.2), (0.1, 0.8)),
            ),
            SliderWidget::new(
                ParameterId::NormalScale,
                slider("Normal", 1.0, 5.0, (0.85, 0.2), (0.85, 0.8)),
            ),
            SliderWidget::new(
                ParameterId::Exposure,
                slider("Exposure", 1.0, 5.0, (0.3, 0.2), (0.7, 0.2)),
            ),
        ];

        Self {
            variant: Variant::Texturing,
            title: "PBR_Skybox_Texturing",
            width: 800,
            height: 500,
            material,
            automatic_light_creation: false,
            use_spherical_harmonics: false,
            axes_viewport: Viewport::new(0.0, 0.0, 0.2, 0.2),
            axes_outline: Some(colors::CARROT),
            tone_mapping: ToneMapping::new(TonemapOperator::Aces),
            background: colors::BACKGROUND,
            sliders,
        }
    }

    pub fn skybox() -> Self {
        let material = MaterialParameters::default()
            .with_diffuse(1.0)
            .with_roughness(0.05)
            .with_metallic(1.0);

        let slider = |title: &str, value: f32, p1: (f32, f32), p2: (f32, f32)| {
            SliderRepresentation::new(title)
                .with_value(value)
                .with_endpoints(Vec2::from(p1), Vec2::from(p2))
                .with_text_heights(0.02, 0.02)
        };
        let sliders = vec![
            SliderWidget::new(
                ParameterId::Metallic,
                slider("Metallicity", material.metallic, (0.1, 0.1), (0.9, 0.1)),
            ),
            SliderWidget::new(
                ParameterId::Roughness,
                slider("Roughness", material.roughness, (0.1, 0.9), (0.9, 0.9)),
            ),
        ];

        Self {
            variant: Variant::Skybox,
            title: "Skybox-PBR",
            width: 640,
            height: 480,
            material,
            automatic_light_creation: true,
            use_spherical_harmonics: true,
            axes_viewport: Viewport::new(0.0, 0.2, 0.2, 0.4),
            axes_outline: Some(colors::CARROT),
            tone_mapping: ToneMapping::new(TonemapOperator::None),
            background: colors::BACKGROUND,
            sliders,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::SliderOrientation;

    #[test]
    fn test_texturing_profile() {
        let profile = ViewerProfile::texturing();
        assert_eq!((profile.width, profile.height), (800, 500));
        assert_eq!(profile.material.roughness, 0.8);
        assert_eq!(profile.material.metallic, 1.0);
        assert_eq!(profile.material.emissive_factor, glam::Vec3::ONE);
        assert_eq!(profile.sliders.len(), 5);

        let normal = &profile.sliders[3];
        assert_eq!(normal.parameter, ParameterId::NormalScale);
        assert_eq!(normal.representation.maximum, 5.0);
        assert_eq!(normal.representation.value(), 1.0);
        assert_eq!(normal.representation.orientation(), SliderOrientation::Vertical);

        let roughness = &profile.sliders[1];
        assert_eq!(roughness.representation.value(), 0.8);
        assert_eq!(roughness.representation.orientation(), SliderOrientation::Horizontal);
    }

    #[test]
    fn test_skybox_profile() {
        let profile = ViewerProfile::skybox();
        assert_eq!((profile.width, profile.height), (640, 480));
        assert_eq!(profile.material.roughness, 0.05);
        let parameters: Vec<_> = profile.sliders.iter().map(|s| s.parameter).collect();
        assert_eq!(parameters, vec![ParameterId::Metallic, ParameterId::Roughness]);
        for slider in &profile.sliders {
            assert_eq!(slider.representation.title_height, 0.02);
            assert_eq!(slider.representation.maximum, 1.0);
        }
    }

    #[test]
    fn test_uv_conventions() {
        assert_eq!(Variant::Texturing.uv_generation(), UvGeneration::Automatic);
        assert_eq!(Variant::Skybox.uv_generation(), UvGeneration::Manual);
    }
}
