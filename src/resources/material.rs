//! PBR material description

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};
use parking_lot::RwLock;

use super::TextureData;

/// Scalar and colour coefficients of the metallic/roughness model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialParameters {
    pub color: Vec3,
    pub diffuse: f32,
    pub roughness: f32,
    pub metallic: f32,
    pub occlusion_strength: f32,
    pub normal_scale: f32,
    pub emissive_factor: Vec3,
}

impl Default for MaterialParameters {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            diffuse: 1.0,
            roughness: 0.5,
            metallic: 0.0,
            occlusion_strength: 1.0,
            normal_scale: 1.0,
            emissive_factor: Vec3::ONE,
        }
    }
}

impl MaterialParameters {
    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    pub fn with_diffuse(mut self, diffuse: f32) -> Self {
        self.diffuse = diffuse;
        self
    }

    pub fn with_metallic(mut self, metallic: f32) -> Self {
        self.metallic = metallic;
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn with_occlusion_strength(mut self, strength: f32) -> Self {
        self.occlusion_strength = strength;
        self
    }

    pub fn with_normal_scale(mut self, scale: f32) -> Self {
        self.normal_scale = scale;
        self
    }

    pub fn with_emissive_factor(mut self, factor: Vec3) -> Self {
        self.emissive_factor = factor;
        self
    }
}

/// Shared handle to material coefficients, written by the slider router
/// and read by the renderer every frame.
pub type SharedMaterialParameters = Arc<RwLock<MaterialParameters>>;

/// Texture slots of a PBR material
#[derive(Debug, Clone, Default)]
pub struct MaterialTextures {
    pub base_color: Option<TextureData>,
    pub normal: Option<TextureData>,
    /// Occlusion in R, roughness in G, metallic in B
    pub orm: Option<TextureData>,
    pub emissive: Option<TextureData>,
}

/// PBR material: shared coefficients plus optional textures
#[derive(Debug, Clone)]
pub struct PbrMaterial {
    pub name: String,
    pub parameters: SharedMaterialParameters,
    pub textures: MaterialTextures,
}

impl PbrMaterial {
    pub fn new(name: &str, parameters: MaterialParameters) -> Self {
        Self {
            name: name.to_string(),
            parameters: Arc::new(RwLock::new(parameters)),
            textures: MaterialTextures::default(),
        }
    }

    pub fn with_base_color_texture(mut self, texture: TextureData) -> Self {
        self.textures.base_color = Some(texture);
        self
    }

    pub fn with_normal_texture(mut self, texture: TextureData) -> Self {
        self.textures.normal = Some(texture);
        self
    }

    pub fn with_orm_texture(mut self, texture: TextureData) -> Self {
        self.textures.orm = Some(texture);
        self
    }

    pub fn with_emissive_texture(mut self, texture: TextureData) -> Self {
        self.textures.emissive = Some(texture);
        self
    }

    /// Snapshot the coefficients for the GPU.
    pub fn uniform_data(&self) -> MaterialUniformData {
        let params = *self.parameters.read();
        let mut flags = 0u32;
        if self.textures.normal.is_some() {
            flags |= MaterialUniformData::HAS_NORMAL_MAP;
        }
        MaterialUniformData {
            base_color: params.color.extend(1.0),
            emissive: params.emissive_factor.extend(0.0),
            factors: Vec4::new(
                params.metallic,
                params.roughness,
                params.occlusion_strength,
                params.normal_scale,
            ),
            diffuse: [params.diffuse, 0.0, 0.0, 0.0],
            flags: [flags, 0, 0, 0],
        }
    }
}

/// Material uniform data for GPU
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MaterialUniformData {
    pub base_color: Vec4,
    /// xyz = emissive factor
    pub emissive: Vec4,
    /// x = metallic, y = roughness, z = occlusion strength, w = normal scale
    pub factors: Vec4,
    /// x = diffuse coefficient
    pub diffuse: [f32; 4],
    pub flags: [u32; 4],
}

impl MaterialUniformData {
    pub const HAS_NORMAL_MAP: u32 = 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_data_reflects_shared_writes() {
        let material = PbrMaterial::new(
            "surface",
            MaterialParameters::default()
                .with_metallic(1.0)
                .with_roughness(0.8),
        );
        let handle = Arc::clone(&material.parameters);
        handle.write().roughness = 0.25;

        let data = material.uniform_data();
        assert_eq!(data.factors, Vec4::new(1.0, 0.25, 1.0, 1.0));
        assert_eq!(data.flags[0], 0);
    }

    #[test]
    fn test_normal_map_flag() {
        let material = PbrMaterial::new("surface", MaterialParameters::default())
            .with_normal_texture(TextureData::default_normal());
        assert_eq!(
            material.uniform_data().flags[0] & MaterialUniformData::HAS_NORMAL_MAP,
            MaterialUniformData::HAS_NORMAL_MAP
        );
    }

    #[test]
    fn test_uniform_size_is_16_byte_multiple() {
        assert_eq!(std::mem::size_of::<MaterialUniformData>() % 16, 0);
    }
}
