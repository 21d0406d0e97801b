//! Surface factory
//!
//! Builds the mesh shown in the viewer from a surface name. Every surface
//! carries texture coordinates and tangents so it can be normal mapped.

mod parametric;
mod primitives;

pub use parametric::*;
pub use primitives::*;

use glam::{Mat4, Vec3};

use crate::profile::Variant;
use crate::resources::Mesh;

/// Grid resolution of the parametric surfaces, in both directions
pub const PARAMETRIC_RESOLUTION: u32 = 51;
/// Theta and phi resolution of the sphere
pub const SPHERE_RESOLUTION: u32 = 32;
pub const SPHERE_RADIUS: f32 = 0.5;
/// Number of linear subdivision passes applied to the cube
pub const CUBE_SUBDIVISIONS: u32 = 3;

/// The surfaces that can be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SurfaceKind {
    #[default]
    Boy,
    Mobius,
    RandomHills,
    Torus,
    Sphere,
    Cube,
}

impl SurfaceKind {
    pub const ALL: [SurfaceKind; 6] = [
        SurfaceKind::Boy,
        SurfaceKind::Mobius,
        SurfaceKind::RandomHills,
        SurfaceKind::Torus,
        SurfaceKind::Sphere,
        SurfaceKind::Cube,
    ];

    /// Look up a surface by name, ignoring case. Unknown names give the
    /// default surface.
    pub fn from_name(name: &str) -> Self {
        let name = name.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .unwrap_or_default()
    }

    pub fn name(&self) -> &'static str {
        match self {
            SurfaceKind::Boy => "boy",
            SurfaceKind::Mobius => "mobius",
            SurfaceKind::RandomHills => "randomhills",
            SurfaceKind::Torus => "torus",
            SurfaceKind::Sphere => "sphere",
            SurfaceKind::Cube => "cube",
        }
    }

    /// Orientation baked into the mesh so each surface faces the camera.
    ///
    /// Operations are listed in the order they are applied to the transform;
    /// each one is pre-multiplied, so the last listed acts on points first.
    pub fn transform(&self, variant: Variant) -> Mat4 {
        let rotate_x = |degrees: f32| Mat4::from_rotation_x(degrees.to_radians());
        match (self, variant) {
            (SurfaceKind::Mobius | SurfaceKind::Torus, Variant::Texturing) => rotate_x(-90.0),
            (SurfaceKind::Mobius | SurfaceKind::Torus, Variant::Skybox) => rotate_x(90.0),
            (SurfaceKind::RandomHills, Variant::Texturing) => {
                Mat4::from_translation(Vec3::new(0.0, 5.0, 15.0)) * rotate_x(-90.0)
            }
            (SurfaceKind::RandomHills, Variant::Skybox) => {
                Mat4::from_rotation_z(180f32.to_radians()) * rotate_x(90.0)
            }
            (SurfaceKind::Boy | SurfaceKind::Sphere | SurfaceKind::Cube, _) => Mat4::IDENTITY,
        }
    }
}

impl std::fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Build the mesh for `kind` as `variant` shows it.
pub fn build_surface(kind: SurfaceKind, variant: Variant) -> Mesh {
    let uv = variant.uv_generation();
    let mut mesh = match kind {
        SurfaceKind::Boy => sample_surface(
            &Boy::default(),
            PARAMETRIC_RESOLUTION,
            PARAMETRIC_RESOLUTION,
            uv,
        ),
        SurfaceKind::Mobius => {
            let mobius = Mobius {
                v_min: -0.25,
                v_max: 0.25,
                ..Default::default()
            };
            sample_surface(&mobius, PARAMETRIC_RESOLUTION, PARAMETRIC_RESOLUTION, uv)
        }
        SurfaceKind::RandomHills => sample_surface(
            &RandomHills::default(),
            PARAMETRIC_RESOLUTION,
            PARAMETRIC_RESOLUTION,
            uv,
        ),
        SurfaceKind::Torus => sample_surface(
            &Torus::default(),
            PARAMETRIC_RESOLUTION,
            PARAMETRIC_RESOLUTION,
            uv,
        ),
        SurfaceKind::Sphere => textured_sphere(SPHERE_RADIUS, SPHERE_RESOLUTION, SPHERE_RESOLUTION),
        SurfaceKind::Cube => subdivided_cube(CUBE_SUBDIVISIONS),
    };

    mesh.compute_tangents();
    mesh.transform(kind.transform(variant));
    log::debug!(
        "Built {} surface: {} vertices, {} triangles",
        kind,
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("boy", SurfaceKind::Boy)]
    #[case("TORUS", SurfaceKind::Torus)]
    #[case("Mobius", SurfaceKind::Mobius)]
    #[case("RandomHills", SurfaceKind::RandomHills)]
    #[case("sphere", SurfaceKind::Sphere)]
    #[case("cUbE", SurfaceKind::Cube)]
    #[case("unknown", SurfaceKind::Boy)]
    #[case("", SurfaceKind::Boy)]
    fn test_from_name(#[case] name: &str, #[case] expected: SurfaceKind) {
        assert_eq!(SurfaceKind::from_name(name), expected);
    }

    #[test]
    fn test_names_round_trip() {
        for kind in SurfaceKind::ALL {
            assert_eq!(SurfaceKind::from_name(kind.name()), kind);
        }
    }

    #[test]
    fn test_random_hills_transform_textured() {
        let m = SurfaceKind::RandomHills.transform(Variant::Texturing);
        assert!((m.transform_point3(Vec3::ZERO) - Vec3::new(0.0, 5.0, 15.0)).length() < 1e-5);
        // Height along +z becomes +y, rotated before the translation
        let up = m.transform_point3(Vec3::Z) - Vec3::new(0.0, 5.0, 15.0);
        assert!((up - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_random_hills_transform_simple() {
        let m = SurfaceKind::RandomHills.transform(Variant::Skybox);
        assert!((m.transform_point3(Vec3::Z) - Vec3::Y).length() < 1e-5);
        assert!((m.transform_point3(Vec3::X) + Vec3::X).length() < 1e-5);
    }

    #[rstest]
    #[case(SurfaceKind::Torus)]
    #[case(SurfaceKind::Mobius)]
    fn test_variants_rotate_opposite_ways(#[case] kind: SurfaceKind) {
        let textured = kind.transform(Variant::Texturing).transform_point3(Vec3::Z);
        let simple = kind.transform(Variant::Skybox).transform_point3(Vec3::Z);
        assert!((textured - Vec3::Y).length() < 1e-5);
        assert!((simple + Vec3::Y).length() < 1e-5);
    }

    #[rstest]
    #[case(SurfaceKind::Boy)]
    #[case(SurfaceKind::Mobius)]
    #[case(SurfaceKind::RandomHills)]
    #[case(SurfaceKind::Torus)]
    #[case(SurfaceKind::Sphere)]
    #[case(SurfaceKind::Cube)]
    fn test_every_surface_is_textured_and_tangent_framed(#[case] kind: SurfaceKind) {
        for variant in [Variant::Texturing, Variant::Skybox] {
            let mesh = build_surface(kind, variant);
            assert!(mesh.triangle_count() > 0);
            for v in &mesh.vertices {
                assert!(v.uv.x >= -1e-4 && v.uv.x <= 1.0 + 1e-4);
                assert!(v.uv.y >= -1e-4 && v.uv.y <= 1.0 + 1e-4);
                assert!((v.tangent.truncate().length() - 1.0).abs() < 1e-3);
                assert!(v.tangent.w.abs() == 1.0);
            }
        }
    }

    #[test]
    fn test_parametric_surfaces_use_full_grid() {
        let mesh = build_surface(SurfaceKind::Torus, Variant::Skybox);
        assert_eq!(mesh.vertex_count(), 51 * 51);
        let mesh = build_surface(SurfaceKind::Sphere, Variant::Skybox);
        assert_eq!(mesh.vertex_count(), 33 * 33);
    }
}
