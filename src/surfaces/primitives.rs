//! Closed primitives: a textured sphere and a subdivided cube

use std::collections::HashMap;
use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use crate::resources::{Mesh, Vertex};

/// UV sphere with texture coordinates wrapping once around the equator.
///
/// Vertex `(i, j)` sits at longitude `2 pi i / theta_resolution` and
/// colatitude `pi j / phi_resolution`, and has texture coordinate
/// `(i / theta_resolution, 1 - j / phi_resolution)`.
pub fn textured_sphere(radius: f32, theta_resolution: u32, phi_resolution: u32) -> Mesh {
    let theta_resolution = theta_resolution.max(3);
    let phi_resolution = phi_resolution.max(2);
    let mut mesh = Mesh::new("sphere");

    for i in 0..=theta_resolution {
        let theta = i as f32 * 2.0 * PI / theta_resolution as f32;
        let (sin_theta, cos_theta) = theta.sin_cos();
        for j in 0..=phi_resolution {
            let phi = j as f32 * PI / phi_resolution as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();
            let normal = Vec3::new(sin_phi * cos_theta, sin_phi * sin_theta, cos_phi);
            let uv = Vec2::new(
                i as f32 / theta_resolution as f32,
                1.0 - j as f32 / phi_resolution as f32,
            );
            mesh.vertices.push(Vertex::new(normal * radius, normal, uv));
        }
    }

    let stride = phi_resolution + 1;
    for i in 0..theta_resolution {
        for j in 0..phi_resolution {
            let a = i * stride + j;
            let b = a + 1;
            let c = (i + 1) * stride + j + 1;
            let d = (i + 1) * stride + j;
            // Skip the zero-area halves of the polar quads
            if j != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if j != phi_resolution - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    mesh
}

/// Split every triangle into four, sharing the new edge midpoints.
pub fn subdivide_linear(mesh: &Mesh) -> Mesh {
    let mut out = Mesh::new(&mesh.name);
    out.vertices = mesh.vertices.clone();
    let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();

    let mut midpoint = |a: u32, b: u32, vertices: &mut Vec<Vertex>| -> u32 {
        let key = (a.min(b), a.max(b));
        *midpoints.entry(key).or_insert_with(|| {
            let (va, vb) = (vertices[a as usize], vertices[b as usize]);
            vertices.push(Vertex::new(
                (va.position + vb.position) * 0.5,
                (va.normal + vb.normal).normalize_or_zero(),
                (va.uv + vb.uv) * 0.5,
            ));
            (vertices.len() - 1) as u32
        })
    };

    for tri in mesh.indices.chunks_exact(3) {
        let (a, b, c) = (tri[0], tri[1], tri[2]);
        let ab = midpoint(a, b, &mut out.vertices);
        let bc = midpoint(b, c, &mut out.vertices);
        let ca = midpoint(c, a, &mut out.vertices);
        out.indices
            .extend_from_slice(&[a, ab, ca, ab, b, bc, ca, bc, c, ab, bc, ca]);
    }

    out
}

/// Unit cube refined `levels` times by [`subdivide_linear`].
pub fn subdivided_cube(levels: u32) -> Mesh {
    (0..levels).fold(Mesh::cube(), |mesh, _| subdivide_linear(&mesh))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_points_on_radius() {
        let mesh = textured_sphere(0.5, 32, 32);
        assert_eq!(mesh.vertex_count(), 33 * 33);
        assert_eq!(mesh.triangle_count(), 32 * 32 * 2 - 2 * 32);
        for v in &mesh.vertices {
            assert!((v.position.length() - 0.5).abs() < 1e-5);
            assert!((v.normal - v.position * 2.0).length() < 1e-5);
        }
    }

    #[test]
    fn test_sphere_tcoords() {
        let mesh = textured_sphere(0.5, 4, 2);
        // North pole at the top of the texture
        assert_eq!(mesh.vertices[0].uv, Vec2::new(0.0, 1.0));
        assert!((mesh.vertices[0].position - Vec3::new(0.0, 0.0, 0.5)).length() < 1e-6);
        // Equator of the last meridian
        let last = mesh.vertices[4 * 3 + 1];
        assert_eq!(last.uv, Vec2::new(1.0, 0.5));
    }

    #[test]
    fn test_sphere_triangles_face_outward() {
        let mesh = textured_sphere(1.0, 16, 8);
        for tri in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| mesh.vertices[i as usize].position);
            let face_normal = (b - a).cross(c - a);
            assert!(face_normal.dot((a + b + c) / 3.0) > 0.0);
        }
    }

    #[test]
    fn test_subdivision_shares_midpoints() {
        let once = subdivide_linear(&Mesh::cube());
        assert_eq!(once.triangle_count(), 48);
        // Each face grows from a 2x2 to a 3x3 grid of points
        assert_eq!(once.vertex_count(), 6 * 9);
    }

    #[test]
    fn test_subdivided_cube() {
        let mesh = subdivided_cube(3);
        assert_eq!(mesh.triangle_count(), 12 * 64);
        assert_eq!(mesh.vertex_count(), 6 * 81);
        assert_eq!(mesh.bounds(), (Vec3::splat(-0.5), Vec3::splat(0.5)));
    }
}
