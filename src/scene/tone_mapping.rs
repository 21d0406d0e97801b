//! Tone mapping settings

use std::sync::Arc;

use parking_lot::RwLock;

/// Tonemapping operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TonemapOperator {
    Reinhard,
    #[default]
    Aces,
    /// Clamp to [0, 1]
    None,
}

impl TonemapOperator {
    /// Operator index read by the tone mapping shader
    pub fn shader_index(self) -> u32 {
        match self {
            TonemapOperator::Reinhard => 0,
            TonemapOperator::Aces => 1,
            TonemapOperator::None => 2,
        }
    }
}

/// Operator and exposure applied when resolving the HDR frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneMapping {
    pub operator: TonemapOperator,
    pub exposure: f32,
}

impl Default for ToneMapping {
    fn default() -> Self {
        Self {
            operator: TonemapOperator::Aces,
            exposure: 1.0,
        }
    }
}

impl ToneMapping {
    pub fn new(operator: TonemapOperator) -> Self {
        Self {
            operator,
            ..Default::default()
        }
    }

    /// Map one linear colour the way the shader does, before gamma.
    pub fn apply(&self, color: glam::Vec3) -> glam::Vec3 {
        let color = color * self.exposure;
        match self.operator {
            TonemapOperator::Reinhard => color / (color + glam::Vec3::ONE),
            TonemapOperator::Aces => {
                let (a, b, c, d, e) = (2.51, 0.03, 2.43, 0.59, 0.14);
                ((color * (a * color + b)) / (color * (c * color + d) + e))
                    .clamp(glam::Vec3::ZERO, glam::Vec3::ONE)
            }
            TonemapOperator::None => color.clamp(glam::Vec3::ZERO, glam::Vec3::ONE),
        }
    }
}

/// Tone mapping shared between the exposure slider and the renderer
pub type SharedToneMapping = Arc<RwLock<ToneMapping>>;

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_operators_stay_in_display_range() {
        for operator in [TonemapOperator::Reinhard, TonemapOperator::Aces, TonemapOperator::None] {
            let mapping = ToneMapping {
                operator,
                exposure: 3.0,
            };
            let mapped = mapping.apply(Vec3::new(0.0, 0.5, 100.0));
            assert!(mapped.min_element() >= 0.0 && mapped.max_element() <= 1.0);
        }
    }

    #[test]
    fn test_exposure_brightens() {
        let dim = ToneMapping::default().apply(Vec3::splat(0.2));
        let bright = ToneMapping {
            exposure: 2.0,
            ..Default::default()
        }
        .apply(Vec3::splat(0.2));
        assert!(bright.x > dim.x);
    }

    #[test]
    fn test_shader_indices_are_distinct() {
        assert_eq!(TonemapOperator::Reinhard.shader_index(), 0);
        assert_eq!(TonemapOperator::Aces.shader_index(), 1);
        assert_eq!(TonemapOperator::None.shader_index(), 2);
    }
}
