//! Named colours used by the scene and the widgets

use glam::Vec3;

/// 8-bit sRGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedColor {
    pub name: &'static str,
    pub rgb: [u8; 3],
}

impl NamedColor {
    pub const fn new(name: &'static str, r: u8, g: u8, b: u8) -> Self {
        Self {
            name,
            rgb: [r, g, b],
        }
    }

    /// Components scaled to [0, 1], still sRGB encoded
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.rgb[0] as f32, self.rgb[1] as f32, self.rgb[2] as f32) / 255.0
    }

    pub fn to_egui(self) -> egui::Color32 {
        egui::Color32::from_rgb(self.rgb[0], self.rgb[1], self.rgb[2])
    }
}

pub const BACKGROUND: NamedColor = NamedColor::new("BkgColor", 26, 51, 102);
pub const CARROT: NamedColor = NamedColor::new("Carrot", 237, 145, 33);
pub const MISTY_ROSE: NamedColor = NamedColor::new("MistyRose", 255, 228, 225);
pub const CYAN: NamedColor = NamedColor::new("Cyan", 0, 255, 255);
pub const CORAL: NamedColor = NamedColor::new("Coral", 255, 127, 80);
pub const LIME: NamedColor = NamedColor::new("Lime", 0, 255, 0);
pub const PEACH_PUFF: NamedColor = NamedColor::new("PeachPuff", 255, 218, 185);
pub const THISTLE: NamedColor = NamedColor::new("Thistle", 216, 191, 216);
pub const RED: NamedColor = NamedColor::new("Red", 255, 0, 0);
pub const YELLOW: NamedColor = NamedColor::new("Yellow", 255, 255, 0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carrot_components() {
        let carrot = CARROT.to_vec3();
        assert!((carrot - Vec3::new(0.93, 0.57, 0.13)).abs().max_element() < 0.005);
    }

    #[test]
    fn test_background_components() {
        assert_eq!(BACKGROUND.to_vec3(), Vec3::new(26.0, 51.0, 102.0) / 255.0);
    }
}
