//! Per-frame uniform data shared by the skybox and PBR passes

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

use crate::scene::Scene;

/// Frame uniform data for GPU
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: Mat4,
    pub inv_view_proj: Mat4,
    pub camera_pos: Vec4,
    /// x = use SH, y = highest prefiltered mip, z = image based lighting on
    pub params: Vec4,
    /// xyz = headlight direction, w = intensity (0 when off)
    pub light: Vec4,
    pub sh: [Vec4; 9],
}

impl FrameUniforms {
    pub fn new(scene: &Scene, sh: &[Vec3; 9], max_prefilter_mip: f32) -> Self {
        let view_proj = scene.camera.view_projection_matrix();
        let lighting = &scene.lighting;
        let light = lighting
            .headlight(&scene.camera)
            .map(|l| l.direction.extend(l.intensity))
            .unwrap_or(Vec4::ZERO);

        Self {
            view_proj,
            inv_view_proj: view_proj.inverse(),
            camera_pos: scene.camera.position.extend(1.0),
            params: Vec4::new(
                if lighting.use_spherical_harmonics { 1.0 } else { 0.0 },
                max_prefilter_mip,
                if lighting.use_image_based_lighting { 1.0 } else { 0.0 },
                0.0,
            ),
            light,
            sh: sh.map(|c| c.extend(0.0)),
        }
    }
}

/// Tone mapping uniform data for GPU
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct TonemapUniforms {
    pub exposure: f32,
    pub gamma: f32,
    pub tonemap_op: u32,
    pub _padding: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::profile::{Variant, ViewerProfile};
    use crate::resources::{EnvironmentMap, Mesh, PbrMaterial};

    #[test]
    fn test_uniform_sizes() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 320);
        assert_eq!(std::mem::size_of::<TonemapUniforms>(), 16);
    }

    #[test]
    fn test_flags_follow_lighting() {
        let profile = ViewerProfile::for_variant(Variant::Skybox);
        let mut scene = Scene::assemble(
            &profile,
            Mesh::cube(),
            PbrMaterial::new("cube", profile.material),
            Arc::new(EnvironmentMap::black()),
        );
        let uniforms = FrameUniforms::new(&scene, &[Vec3::ONE; 9], 7.0);
        assert_eq!(uniforms.params, Vec4::new(1.0, 7.0, 1.0, 0.0));
        assert_eq!(uniforms.light, Vec4::new(0.0, 0.0, -1.0, 1.0));

        scene.lighting.automatic_light_creation = false;
        scene.lighting.use_spherical_harmonics = false;
        let uniforms = FrameUniforms::new(&scene, &[Vec3::ONE; 9], 7.0);
        assert_eq!(uniforms.params.x, 0.0);
        assert_eq!(uniforms.light, Vec4::ZERO);
    }
}
