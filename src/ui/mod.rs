//! Material tuning sliders
//!
//! Each [`SliderWidget`] is bound to one [`ParameterId`]. When the user moves
//! it, the [`SliderController`] calls its [`SliderHandler`], which writes the
//! value straight into the shared state the renderer reads every frame.

mod slider;

pub use slider::*;

use crate::resources::SharedMaterialParameters;
use crate::scene::SharedToneMapping;

/// The scalar a slider controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterId {
    Metallic,
    Roughness,
    OcclusionStrength,
    NormalScale,
    Exposure,
}

/// Receives slider change events
pub trait SliderHandler {
    fn on_value_changed(&mut self, parameter: ParameterId, value: f32);
}

/// Writes slider values into the material and tone mapping
pub struct ParameterRouter {
    material: SharedMaterialParameters,
    tone_mapping: SharedToneMapping,
}

impl ParameterRouter {
    pub fn new(material: SharedMaterialParameters, tone_mapping: SharedToneMapping) -> Self {
        Self {
            material,
            tone_mapping,
        }
    }
}

impl SliderHandler for ParameterRouter {
    fn on_value_changed(&mut self, parameter: ParameterId, value: f32) {
        log::trace!("{:?} = {}", parameter, value);
        match parameter {
            ParameterId::Metallic => self.material.write().metallic = value,
            ParameterId::Roughness => self.material.write().roughness = value,
            ParameterId::OcclusionStrength => self.material.write().occlusion_strength = value,
            ParameterId::NormalScale => self.material.write().normal_scale = value,
            ParameterId::Exposure => self.tone_mapping.write().exposure = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parking_lot::RwLock;
    use rstest::rstest;

    use crate::resources::MaterialParameters;
    use crate::scene::ToneMapping;

    #[rstest]
    #[case(ParameterId::Metallic, 0.3)]
    #[case(ParameterId::Roughness, 0.6)]
    #[case(ParameterId::OcclusionStrength, 0.1)]
    #[case(ParameterId::NormalScale, 4.0)]
    fn test_router_writes_one_material_field(#[case] parameter: ParameterId, #[case] value: f32) {
        let material = Arc::new(RwLock::new(MaterialParameters::default()));
        let tone_mapping = Arc::new(RwLock::new(ToneMapping::default()));
        let mut router = ParameterRouter::new(Arc::clone(&material), Arc::clone(&tone_mapping));

        router.on_value_changed(parameter, value);

        let mut expected = MaterialParameters::default();
        match parameter {
            ParameterId::Metallic => expected.metallic = value,
            ParameterId::Roughness => expected.roughness = value,
            ParameterId::OcclusionStrength => expected.occlusion_strength = value,
            ParameterId::NormalScale => expected.normal_scale = value,
            ParameterId::Exposure => unreachable!(),
        }
        assert_eq!(*material.read(), expected);
        assert_eq!(*tone_mapping.read(), ToneMapping::default());
    }

    #[test]
    fn test_router_writes_exposure() {
        let material = Arc::new(RwLock::new(MaterialParameters::default()));
        let tone_mapping = Arc::new(RwLock::new(ToneMapping::default()));
        let mut router = ParameterRouter::new(Arc::clone(&material), Arc::clone(&tone_mapping));

        router.on_value_changed(ParameterId::Exposure, 2.5);

        assert_eq!(tone_mapping.read().exposure, 2.5);
        assert_eq!(*material.read(), MaterialParameters::default());
    }
}
