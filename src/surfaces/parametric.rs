//! Parametric surfaces sampled on a regular (u, v) grid.
//!
//! Domains and coefficients follow the classic parametric function
//! definitions: Boy's surface, the Möbius strip, a torus and a field of
//! random Gaussian hills.

use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use crate::resources::{Mesh, Vertex};

/// How texture coordinates are assigned to grid points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UvGeneration {
    /// `((u - u_min) / (u_max - u_min), (v - v_min) / (v_max - v_min))`
    Automatic,
    /// [`uv_tcoords`]: u walks down from 1, v walks up from 0
    Manual,
}

/// A surface `(u, v) -> point`
pub trait ParametricFunction {
    fn name(&self) -> &'static str;

    fn u_range(&self) -> (f32, f32);

    fn v_range(&self) -> (f32, f32);

    fn evaluate(&self, u: f32, v: f32) -> Vec3;

    /// Surface normal from central differences, nudged toward the interior of
    /// the domain where the parameterization degenerates (poles, pinches).
    fn normal(&self, u: f32, v: f32) -> Vec3 {
        let (u_min, u_max) = self.u_range();
        let (v_min, v_max) = self.v_range();
        let hu = (u_max - u_min) * 1e-3;
        let hv = (v_max - v_min) * 1e-3;

        let at = |u: f32, v: f32| {
            let du = self.evaluate(u + hu, v) - self.evaluate(u - hu, v);
            let dv = self.evaluate(u, v + hv) - self.evaluate(u, v - hv);
            du.cross(dv)
        };

        let n = at(u, v);
        if n.length_squared() > 1e-12 {
            return n.normalize();
        }
        let toward_u = if u < (u_min + u_max) * 0.5 { 1.0 } else { -1.0 };
        let toward_v = if v < (v_min + v_max) * 0.5 { 1.0 } else { -1.0 };
        at(u + toward_u * hu * 10.0, v + toward_v * hv * 10.0).normalize_or_zero()
    }
}

/// Boy's surface, an immersion of the real projective plane
#[derive(Debug, Clone, Copy)]
pub struct Boy {
    pub z_scale: f32,
}

impl Default for Boy {
    fn default() -> Self {
        Self { z_scale: 0.125 }
    }
}

impl ParametricFunction for Boy {
    fn name(&self) -> &'static str {
        "boy"
    }

    fn u_range(&self) -> (f32, f32) {
        (0.0, PI)
    }

    fn v_range(&self) -> (f32, f32) {
        (0.0, PI)
    }

    fn evaluate(&self, u: f32, v: f32) -> Vec3 {
        let (su, cu) = u.sin_cos();
        let (sv, cv) = v.sin_cos();

        let x = cu * sv;
        let y = su * sv;
        let z = cv;
        let (x2, y2, z2) = (x * x, y * y, z * z);
        let s = x + y + z;

        Vec3::new(
            0.5 * ((2.0 * x2 - y2 - z2)
                + 2.0 * y * z * (y2 - z2)
                + z * x * (x2 - z2)
                + x * y * (y2 - x2)),
            3f32.sqrt() / 2.0 * ((y2 - z2) + z * x * (z2 - x2) + x * y * (y2 - x2)),
            self.z_scale * s * (s * s * s + 4.0 * (y - x) * (z - y) * (x - z)),
        )
    }
}

/// Möbius strip of the given radius, narrowed to `v` in `[v_min, v_max]`
#[derive(Debug, Clone, Copy)]
pub struct Mobius {
    pub radius: f32,
    pub v_min: f32,
    pub v_max: f32,
}

impl Default for Mobius {
    fn default() -> Self {
        Self {
            radius: 1.0,
            v_min: -1.0,
            v_max: 1.0,
        }
    }
}

impl ParametricFunction for Mobius {
    fn name(&self) -> &'static str {
        "mobius"
    }

    fn u_range(&self) -> (f32, f32) {
        (0.0, 2.0 * PI)
    }

    fn v_range(&self) -> (f32, f32) {
        (self.v_min, self.v_max)
    }

    fn evaluate(&self, u: f32, v: f32) -> Vec3 {
        let (su, cu) = u.sin_cos();
        let (su2, cu2) = (u / 2.0).sin_cos();
        let t = self.radius - v * su2;
        Vec3::new(t * su, t * cu, v * cu2)
    }
}

/// Torus around the z axis
#[derive(Debug, Clone, Copy)]
pub struct Torus {
    pub ring_radius: f32,
    pub cross_section_radius: f32,
}

impl Default for Torus {
    fn default() -> Self {
        Self {
            ring_radius: 1.0,
            cross_section_radius: 0.5,
        }
    }
}

impl ParametricFunction for Torus {
    fn name(&self) -> &'static str {
        "torus"
    }

    fn u_range(&self) -> (f32, f32) {
        (0.0, 2.0 * PI)
    }

    fn v_range(&self) -> (f32, f32) {
        (0.0, 2.0 * PI)
    }

    fn evaluate(&self, u: f32, v: f32) -> Vec3 {
        let (su, cu) = u.sin_cos();
        let (sv, cv) = v.sin_cos();
        let ring = self.ring_radius + self.cross_section_radius * cv;
        Vec3::new(ring * cu, ring * su, self.cross_section_radius * sv)
    }
}

/// Park-Miller "minimal standard" generator.
#[derive(Debug, Clone)]
pub struct MinimalStandardRandom {
    seed: i32,
}

impl MinimalStandardRandom {
    const A: i32 = 16807;
    const M: i32 = 2147483647;
    const Q: i32 = 127773; // M / A
    const R: i32 = 2836; // M % A

    /// Seed the sequence. The first value is skipped since it is strongly
    /// correlated with the seed.
    pub fn new(seed: i32) -> Self {
        let mut rng = Self {
            seed: seed.rem_euclid(Self::M).max(1),
        };
        rng.next_seed();
        rng
    }

    fn next_seed(&mut self) {
        let hi = self.seed / Self::Q;
        let lo = self.seed % Self::Q;
        self.seed = Self::A * lo - Self::R * hi;
        if self.seed <= 0 {
            self.seed += Self::M;
        }
    }

    /// Current value in (0, 1), then advance.
    pub fn next_value(&mut self) -> f32 {
        let value = self.seed as f64 / Self::M as f64;
        self.next_seed();
        value as f32
    }
}

/// One Gaussian hill: centre, spread and height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hill {
    pub center: Vec2,
    pub variance: Vec2,
    pub amplitude: f32,
}

/// Gaussian hills scattered over a square domain
#[derive(Debug, Clone)]
pub struct RandomHills {
    pub hills: Vec<Hill>,
    pub u_range: (f32, f32),
    pub v_range: (f32, f32),
}

impl Default for RandomHills {
    fn default() -> Self {
        Self::generate(RandomHillsSettings::default())
    }
}

/// Inputs to [`RandomHills::generate`]
#[derive(Debug, Clone, Copy)]
pub struct RandomHillsSettings {
    pub number_of_hills: u32,
    pub hill_x_variance: f32,
    pub hill_y_variance: f32,
    pub hill_amplitude: f32,
    pub random_seed: i32,
    pub x_variance_scale_factor: f32,
    pub y_variance_scale_factor: f32,
    pub amplitude_scale_factor: f32,
}

impl Default for RandomHillsSettings {
    fn default() -> Self {
        Self {
            number_of_hills: 30,
            hill_x_variance: 2.5,
            hill_y_variance: 2.5,
            hill_amplitude: 2.0,
            random_seed: 1,
            x_variance_scale_factor: 1.0 / 3.0,
            y_variance_scale_factor: 1.0 / 3.0,
            amplitude_scale_factor: 1.0 / 3.0,
        }
    }
}

impl RandomHills {
    pub fn generate(settings: RandomHillsSettings) -> Self {
        let u_range = (-10.0, 10.0);
        let v_range = (-10.0, 10.0);
        let du = u_range.1 - u_range.0;
        let dv = v_range.1 - v_range.0;

        let mut rng = MinimalStandardRandom::new(settings.random_seed);
        let hills = (0..settings.number_of_hills)
            .map(|_| {
                let center = Vec2::new(
                    u_range.0 + rng.next_value() * du,
                    v_range.0 + rng.next_value() * dv,
                );
                let variance = Vec2::new(
                    settings.hill_x_variance * rng.next_value()
                        + settings.hill_x_variance * settings.x_variance_scale_factor,
                    settings.hill_y_variance * rng.next_value()
                        + settings.hill_y_variance * settings.y_variance_scale_factor,
                );
                let amplitude = settings.hill_amplitude * rng.next_value()
                    + settings.hill_amplitude * settings.amplitude_scale_factor;
                Hill {
                    center,
                    variance,
                    amplitude,
                }
            })
            .collect();

        Self {
            hills,
            u_range,
            v_range,
        }
    }
}

impl ParametricFunction for RandomHills {
    fn name(&self) -> &'static str {
        "randomhills"
    }

    fn u_range(&self) -> (f32, f32) {
        self.u_range
    }

    fn v_range(&self) -> (f32, f32) {
        self.v_range
    }

    fn evaluate(&self, u: f32, v: f32) -> Vec3 {
        let height = self
            .hills
            .iter()
            .map(|hill| {
                let d = (Vec2::new(u, v) - hill.center) / hill.variance;
                hill.amplitude * (-d.length_squared() / 2.0).exp()
            })
            .sum();
        Vec3::new(u, v, height)
    }
}

/// Texture coordinates on a `u0 - i * du`, `v0 + j * dv` grid, u-major.
pub fn uv_grid(u0: f32, v0: f32, du: f32, dv: f32, u_resolution: u32, v_resolution: u32) -> Vec<Vec2> {
    let mut tcoords = Vec::with_capacity((u_resolution * v_resolution) as usize);
    let mut u = u0;
    for _ in 0..u_resolution {
        let mut v = v0;
        for _ in 0..v_resolution {
            tcoords.push(Vec2::new(u, v));
            v += dv;
        }
        u -= du;
    }
    tcoords
}

/// Hand-computed texture coordinates covering `[0, 1] x [0, 1]`.
pub fn uv_tcoords(u_resolution: u32, v_resolution: u32) -> Vec<Vec2> {
    let du = 1.0 / (u_resolution.max(2) - 1) as f32;
    let dv = 1.0 / (v_resolution.max(2) - 1) as f32;
    uv_grid(1.0, 0.0, du, dv, u_resolution, v_resolution)
}

/// Sample `function` on a `u_resolution x v_resolution` grid of points.
///
/// Point `(i, j)` has index `i * v_resolution + j`; each grid cell becomes
/// two triangles.
pub fn sample_surface(
    function: &dyn ParametricFunction,
    u_resolution: u32,
    v_resolution: u32,
    uv: UvGeneration,
) -> Mesh {
    let u_resolution = u_resolution.max(2);
    let v_resolution = v_resolution.max(2);
    let (u_min, u_max) = function.u_range();
    let (v_min, v_max) = function.v_range();

    let tcoords = match uv {
        UvGeneration::Automatic => uv_grid(
            0.0,
            0.0,
            -1.0 / (u_resolution - 1) as f32,
            1.0 / (v_resolution - 1) as f32,
            u_resolution,
            v_resolution,
        ),
        UvGeneration::Manual => uv_tcoords(u_resolution, v_resolution),
    };

    let mut mesh = Mesh::new(function.name());
    mesh.vertices.reserve((u_resolution * v_resolution) as usize);
    for i in 0..u_resolution {
        let s = i as f32 / (u_resolution - 1) as f32;
        let u = u_min + s * (u_max - u_min);
        for j in 0..v_resolution {
            let t = j as f32 / (v_resolution - 1) as f32;
            let v = v_min + t * (v_max - v_min);
            let index = (i * v_resolution + j) as usize;
            mesh.vertices.push(Vertex::new(
                function.evaluate(u, v),
                function.normal(u, v),
                tcoords[index],
            ));
        }
    }

    for i in 0..u_resolution - 1 {
        for j in 0..v_resolution - 1 {
            let a = i * v_resolution + j;
            let b = (i + 1) * v_resolution + j;
            let c = (i + 1) * v_resolution + j + 1;
            let d = i * v_resolution + j + 1;
            mesh.indices.extend_from_slice(&[a, b, c, a, c, d]);
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uv_grid_two_by_two() {
        let tcoords = uv_grid(1.0, 0.0, 1.0, 1.0, 2, 2);
        assert_eq!(
            tcoords,
            vec![
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 0.0),
                Vec2::new(0.0, 1.0),
            ]
        );
        assert_eq!(uv_tcoords(2, 2), tcoords);
    }

    #[test]
    fn test_manual_uvs_mirror_automatic_in_u() {
        let torus = Torus::default();
        let manual = sample_surface(&torus, 51, 51, UvGeneration::Manual);
        let automatic = sample_surface(&torus, 51, 51, UvGeneration::Automatic);
        assert_eq!(manual.vertex_count(), automatic.vertex_count());
        for (m, a) in manual.vertices.iter().zip(&automatic.vertices) {
            assert!((m.uv.x - (1.0 - a.uv.x)).abs() < 1e-4);
            assert!((m.uv.y - a.uv.y).abs() < 1e-4);
            for uv in [m.uv, a.uv] {
                assert!(uv.x > -1e-4 && uv.x < 1.0 + 1e-4);
                assert!(uv.y > -1e-4 && uv.y < 1.0 + 1e-4);
            }
        }
    }

    #[test]
    fn test_automatic_uvs_follow_parameters() {
        let mesh = sample_surface(&Torus::default(), 3, 5, UvGeneration::Automatic);
        // Last u row, second v column
        assert!((mesh.vertices[2 * 5 + 1].uv - Vec2::new(1.0, 0.25)).length() < 1e-6);
        assert_eq!(mesh.vertices[0].uv, Vec2::ZERO);
    }

    #[test]
    fn test_grid_topology() {
        let mesh = sample_surface(&Boy::default(), 51, 51, UvGeneration::Automatic);
        assert_eq!(mesh.vertex_count(), 51 * 51);
        assert_eq!(mesh.triangle_count(), 50 * 50 * 2);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn test_torus_points_and_outward_normals() {
        let torus = Torus::default();
        assert!((torus.evaluate(0.0, 0.0) - Vec3::new(1.5, 0.0, 0.0)).length() < 1e-6);
        assert!((torus.normal(0.0, 0.0) - Vec3::X).length() < 1e-3);
        assert!((torus.normal(0.0, PI) + Vec3::X).length() < 1e-3);
    }

    #[test]
    fn test_normals_are_unit_even_at_poles() {
        let mesh = sample_surface(&Boy::default(), 11, 11, UvGeneration::Automatic);
        for v in &mesh.vertices {
            assert!((v.normal.length() - 1.0).abs() < 1e-3, "{:?}", v);
        }
    }

    #[test]
    fn test_mobius_centre_line() {
        let mobius = Mobius {
            v_min: -0.25,
            v_max: 0.25,
            ..Default::default()
        };
        for k in 0..8 {
            let u = k as f32 * PI / 4.0;
            assert!((mobius.evaluate(u, 0.0).length() - 1.0).abs() < 1e-5);
        }
        assert_eq!(mobius.v_range(), (-0.25, 0.25));
    }

    #[test]
    fn test_random_sequence_is_deterministic() {
        let mut a = MinimalStandardRandom::new(1);
        let mut b = MinimalStandardRandom::new(1);
        for _ in 0..100 {
            let value = a.next_value();
            assert_eq!(value, b.next_value());
            assert!(value > 0.0 && value < 1.0);
        }
        // The seed is advanced once on creation
        let mut rng = MinimalStandardRandom::new(1);
        assert!((rng.next_value() - 16807.0 / 2147483647.0).abs() < 1e-9);
        assert!((rng.next_value() - 282475249.0 / 2147483647.0).abs() < 1e-6);
    }

    #[test]
    fn test_random_hills_layout() {
        let hills = RandomHills::default();
        assert_eq!(hills.hills.len(), 30);
        for hill in &hills.hills {
            assert!(hill.center.x >= -10.0 && hill.center.x <= 10.0);
            assert!(hill.variance.x >= 2.5 / 3.0 && hill.variance.x <= 2.5 * 4.0 / 3.0);
            assert!(hill.amplitude >= 2.0 / 3.0 && hill.amplitude <= 2.0 * 4.0 / 3.0);
        }
        let p = hills.evaluate(1.0, -2.0);
        assert_eq!((p.x, p.y), (1.0, -2.0));
        assert!(p.z > 0.0);
    }
}
