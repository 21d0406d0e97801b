//! Image-Based Lighting (IBL) computation on CPU.
//!
//! Precomputes, from an [`EnvironmentMap`]:
//! - a diffuse irradiance cube map (cosine weighted hemisphere integral)
//! - nine spherical harmonics coefficients of the same irradiance
//! - a GGX prefiltered cube map with one roughness per mip level
//! - the split-sum BRDF lookup table
//!
//! The integrators follow the LearnOpenGL PBR tutorials:
//! - https://learnopengl.com/PBR/IBL/Diffuse-irradiance
//! - https://learnopengl.com/PBR/IBL/Specular-IBL

use std::f32::consts::PI;

use glam::{Vec2, Vec3};
use half::f16;

use crate::resources::{cubemap_dir, EnvironmentMap};

/// Sizes and sample counts used by the precomputation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IblSettings {
    /// Face size of the irradiance cube map
    pub irradiance_size: u32,
    /// Face size of mip 0 of the prefiltered cube map
    pub prefilter_size: u32,
    /// Width and height of the BRDF lookup table
    pub brdf_lut_size: u32,
    /// Angular step of the irradiance hemisphere integration, in radians
    pub irradiance_sample_delta: f32,
    /// Importance samples per prefiltered texel
    pub prefilter_samples: u32,
    /// Importance samples per BRDF lookup table texel
    pub brdf_samples: u32,
}

impl Default for IblSettings {
    fn default() -> Self {
        Self {
            irradiance_size: 32,
            prefilter_size: 128,
            brdf_lut_size: 64,
            irradiance_sample_delta: 0.05,
            prefilter_samples: 128,
            brdf_samples: 128,
        }
    }
}

impl IblSettings {
    /// Number of mip levels of the prefiltered cube map
    pub fn prefilter_mip_levels(&self) -> u32 {
        (self.prefilter_size.max(1) as f32).log2().floor() as u32 + 1
    }
}

/// One square cube map level, faces in +X, -X, +Y, -Y, +Z, -Z order
#[derive(Debug, Clone)]
pub struct CubeLevel {
    pub size: u32,
    pub faces: [Vec<Vec3>; 6],
}

impl CubeLevel {
    fn from_fn(size: u32, f: impl Fn(Vec3) -> Vec3) -> Self {
        let faces = std::array::from_fn(|face| {
            let mut texels = Vec::with_capacity((size * size) as usize);
            for y in 0..size {
                for x in 0..size {
                    texels.push(f(cubemap_dir(face, x, y, size)));
                }
            }
            texels
        });
        Self { size, faces }
    }

    /// RGBA half floats of one face, alpha 1.
    pub fn face_rgba16f(&self, face: usize) -> Vec<f16> {
        rgba16f(&self.faces[face])
    }
}

/// Results of the precomputation
#[derive(Debug, Clone)]
pub struct IblData {
    pub irradiance: CubeLevel,
    /// Mip chain; level `m` was filtered with roughness `m / (levels - 1)`
    pub prefiltered: Vec<CubeLevel>,
    pub brdf_lut_size: u32,
    /// Scale and bias of F0, row-major with roughness growing down the rows
    pub brdf_lut: Vec<Vec2>,
    /// SH9 radiance coefficients, see [`project_sh9`]
    pub sh: [Vec3; 9],
}

impl IblData {
    /// BRDF lookup table as two-channel half floats.
    pub fn brdf_lut_rg16f(&self) -> Vec<f16> {
        self.brdf_lut
            .iter()
            .flat_map(|v| [f16::from_f32(v.x), f16::from_f32(v.y)])
            .collect()
    }
}

/// Run every precomputation step for `environment`.
pub fn compute_ibl(environment: &EnvironmentMap, settings: &IblSettings) -> IblData {
    let sample_env = |dir: Vec3| environment.sample(dir);

    log::info!(
        "Computing irradiance cubemap ({0}x{0})...",
        settings.irradiance_size
    );
    let irradiance = CubeLevel::from_fn(settings.irradiance_size.max(1), |dir| {
        compute_irradiance(dir, settings.irradiance_sample_delta, &sample_env)
    });

    log::info!("Computing spherical harmonics...");
    let sh = project_sh9(environment);

    let mip_levels = settings.prefilter_mip_levels();
    log::info!(
        "Computing pre-filtered environment map ({}x{}, {} mips)...",
        settings.prefilter_size,
        settings.prefilter_size,
        mip_levels
    );
    let prefiltered = (0..mip_levels)
        .map(|mip| {
            let mip_size = (settings.prefilter_size >> mip).max(1);
            let roughness = if mip_levels > 1 {
                mip as f32 / (mip_levels - 1) as f32
            } else {
                0.0
            };
            CubeLevel::from_fn(mip_size, |dir| {
                compute_prefiltered(dir, roughness, settings.prefilter_samples, &sample_env)
            })
        })
        .collect();

    log::info!("Computing BRDF lookup table ({0}x{0})...", settings.brdf_lut_size);
    let brdf_lut = compute_brdf_lut(settings.brdf_lut_size, settings.brdf_samples);

    IblData {
        irradiance,
        prefiltered,
        brdf_lut_size: settings.brdf_lut_size,
        brdf_lut,
        sh,
    }
}

/// Pack linear colours as RGBA half floats with alpha 1.
pub fn rgba16f(texels: &[Vec3]) -> Vec<f16> {
    texels
        .iter()
        .flat_map(|c| {
            [
                f16::from_f32(c.x),
                f16::from_f32(c.y),
                f16::from_f32(c.z),
                f16::ONE,
            ]
        })
        .collect()
}

/// Compute irradiance for a given normal direction.
///
/// The result is the cosine weighted average radiance, so a constant
/// environment of radiance `L` gives about `L`.
pub fn compute_irradiance<F: Fn(Vec3) -> Vec3>(normal: Vec3, sample_delta: f32, sample_env: &F) -> Vec3 {
    let mut irradiance = Vec3::ZERO;

    let up = if normal.y.abs() < 0.999 {
        Vec3::Y
    } else {
        Vec3::X
    };
    let right = up.cross(normal).normalize();
    let up = normal.cross(right);

    let sample_delta = sample_delta.max(1e-3);
    let mut nr_samples = 0.0;

    let mut phi = 0.0f32;
    while phi < 2.0 * PI {
        let mut theta = 0.0f32;
        while theta < 0.5 * PI {
            let (sin_theta, cos_theta) = theta.sin_cos();
            let tangent_sample = Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta);
            let sample_vec =
                tangent_sample.x * right + tangent_sample.y * up + tangent_sample.z * normal;

            irradiance += sample_env(sample_vec) * cos_theta * sin_theta;
            nr_samples += 1.0;

            theta += sample_delta;
        }
        phi += sample_delta;
    }

    PI * irradiance / nr_samples
}

/// Compute pre-filtered environment map value.
pub fn compute_prefiltered<F: Fn(Vec3) -> Vec3>(
    normal: Vec3,
    roughness: f32,
    sample_count: u32,
    sample_env: &F,
) -> Vec3 {
    let v = normal;
    let sample_count = sample_count.max(1);
    let mut prefiltered = Vec3::ZERO;
    let mut total_weight = 0.0;

    for i in 0..sample_count {
        let xi = hammersley(i, sample_count);
        let h = importance_sample_ggx(xi, normal, roughness);
        let l = (2.0 * v.dot(h) * h - v).normalize();

        let n_dot_l = normal.dot(l).max(0.0);
        if n_dot_l > 0.0 {
            prefiltered += sample_env(l) * n_dot_l;
            total_weight += n_dot_l;
        }
    }

    prefiltered / total_weight.max(0.001)
}

/// Split-sum table: texel `(x, y)` holds the scale and bias applied to F0
/// for `n.v = (x + 0.5) / size` and `roughness = (y + 0.5) / size`.
pub fn compute_brdf_lut(size: u32, sample_count: u32) -> Vec<Vec2> {
    let size = size.max(1);
    let mut lut = Vec::with_capacity((size * size) as usize);
    for y in 0..size {
        let roughness = (y as f32 + 0.5) / size as f32;
        for x in 0..size {
            let n_dot_v = (x as f32 + 0.5) / size as f32;
            lut.push(integrate_brdf(n_dot_v, roughness, sample_count));
        }
    }
    lut
}

fn integrate_brdf(n_dot_v: f32, roughness: f32, sample_count: u32) -> Vec2 {
    let v = Vec3::new((1.0 - n_dot_v * n_dot_v).sqrt(), 0.0, n_dot_v);
    let n = Vec3::Z;
    let sample_count = sample_count.max(1);

    let mut a = 0.0;
    let mut b = 0.0;
    for i in 0..sample_count {
        let xi = hammersley(i, sample_count);
        let h = importance_sample_ggx(xi, n, roughness);
        let l = (2.0 * v.dot(h) * h - v).normalize();

        let n_dot_l = l.z.max(0.0);
        let n_dot_h = h.z.max(0.0);
        let v_dot_h = v.dot(h).max(0.0);

        if n_dot_l > 0.0 {
            let g = geometry_smith(n_dot_v, n_dot_l, roughness);
            let g_vis = g * v_dot_h / (n_dot_h * n_dot_v).max(1e-6);
            let fc = (1.0 - v_dot_h).powi(5);
            a += (1.0 - fc) * g_vis;
            b += fc * g_vis;
        }
    }

    Vec2::new(a, b) / sample_count as f32
}

fn geometry_schlick_ggx(n_dot_v: f32, roughness: f32) -> f32 {
    // IBL remapping of k
    let k = roughness * roughness / 2.0;
    n_dot_v / (n_dot_v * (1.0 - k) + k)
}

fn geometry_smith(n_dot_v: f32, n_dot_l: f32, roughness: f32) -> f32 {
    geometry_schlick_ggx(n_dot_v, roughness) * geometry_schlick_ggx(n_dot_l, roughness)
}

/// Hammersley sequence for low-discrepancy sampling.
fn hammersley(i: u32, n: u32) -> Vec2 {
    Vec2::new(i as f32 / n as f32, radical_inverse_vdc(i))
}

fn radical_inverse_vdc(bits: u32) -> f32 {
    bits.reverse_bits() as f32 * 2.328_306_4e-10
}

/// GGX importance sampling.
fn importance_sample_ggx(xi: Vec2, n: Vec3, roughness: f32) -> Vec3 {
    let a = roughness * roughness;

    let phi = 2.0 * PI * xi.x;
    let cos_theta = ((1.0 - xi.y) / (1.0 + (a * a - 1.0) * xi.y)).sqrt();
    let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

    let h = Vec3::new(phi.cos() * sin_theta, phi.sin() * sin_theta, cos_theta);

    let up = if n.z.abs() < 0.999 { Vec3::Z } else { Vec3::X };
    let tangent = up.cross(n).normalize();
    let bitangent = n.cross(tangent);

    (tangent * h.x + bitangent * h.y + n * h.z).normalize()
}

/// Real SH basis up to band 2, in the order
/// `Y00, Y1-1, Y10, Y11, Y2-2, Y2-1, Y20, Y21, Y22`.
fn sh9_basis(d: Vec3) -> [f32; 9] {
    [
        0.282_095,
        0.488_603 * d.y,
        0.488_603 * d.z,
        0.488_603 * d.x,
        1.092_548 * d.x * d.y,
        1.092_548 * d.y * d.z,
        0.315_392 * (3.0 * d.z * d.z - 1.0),
        1.092_548 * d.x * d.z,
        0.546_274 * (d.x * d.x - d.y * d.y),
    ]
}

/// Project the environment radiance onto nine SH coefficients.
///
/// Each texel is weighted by its solid angle; the weights are renormalized
/// to cover exactly `4 pi`.
pub fn project_sh9(environment: &EnvironmentMap) -> [Vec3; 9] {
    let size = environment.face_size;
    let mut coefficients = [Vec3::ZERO; 9];
    let mut total_weight = 0.0f64;

    for (face, texels) in environment.faces.iter().enumerate() {
        for y in 0..size {
            for x in 0..size {
                let u = (x as f32 + 0.5) / size as f32 * 2.0 - 1.0;
                let v = (y as f32 + 0.5) / size as f32 * 2.0 - 1.0;
                let weight =
                    4.0 / ((size * size) as f32 * (1.0 + u * u + v * v).powf(1.5));
                let dir = cubemap_dir(face, x, y, size);
                let radiance = texels[(y * size + x) as usize];
                for (c, basis) in coefficients.iter_mut().zip(sh9_basis(dir)) {
                    *c += radiance * basis * weight;
                }
                total_weight += weight as f64;
            }
        }
    }

    let scale = (4.0 * PI as f64 / total_weight.max(f64::EPSILON)) as f32;
    coefficients.map(|c| c * scale)
}

const SH_C1: f32 = 0.429_043;
const SH_C2: f32 = 0.511_664;
const SH_C3: f32 = 0.743_125;
const SH_C4: f32 = 0.886_227;
const SH_C5: f32 = 0.247_708;

/// Irradiance `E(n)` from SH9 radiance coefficients (Ramamoorthi and
/// Hanrahan). A constant environment of radiance 1 gives `pi`.
pub fn sh_irradiance(sh: &[Vec3; 9], n: Vec3) -> Vec3 {
    let (x, y, z) = (n.x, n.y, n.z);
    SH_C1 * sh[8] * (x * x - y * y) + SH_C3 * sh[6] * z * z + SH_C4 * sh[0] - SH_C5 * sh[6]
        + 2.0 * SH_C1 * (sh[4] * x * y + sh[7] * x * z + sh[5] * y * z)
        + 2.0 * SH_C2 * (sh[3] * x + sh[1] * y + sh[2] * z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_settings() -> IblSettings {
        IblSettings {
            irradiance_size: 4,
            prefilter_size: 8,
            brdf_lut_size: 8,
            irradiance_sample_delta: 0.1,
            prefilter_samples: 32,
            brdf_samples: 64,
        }
    }

    fn sky(dir: Vec3) -> Vec3 {
        Vec3::splat(dir.y.max(0.0))
    }

    #[test]
    fn test_mip_levels() {
        assert_eq!(IblSettings::default().prefilter_mip_levels(), 8);
        assert_eq!(small_settings().prefilter_mip_levels(), 4);
        let single = IblSettings {
            prefilter_size: 1,
            ..small_settings()
        };
        assert_eq!(single.prefilter_mip_levels(), 1);
    }

    #[test]
    fn test_uniform_environment_is_preserved() {
        let color = Vec3::new(0.5, 1.0, 2.0);
        let env = EnvironmentMap::uniform(color, 4);
        let data = compute_ibl(&env, &small_settings());

        for texel in data.irradiance.faces.iter().flatten() {
            assert!((*texel - color).abs().max_element() < 0.05 * 2.0, "{texel}");
        }
        for level in &data.prefiltered {
            for texel in level.faces.iter().flatten() {
                assert!((*texel - color).abs().max_element() < 1e-3, "{texel}");
            }
        }
        assert_eq!(data.prefiltered.len(), 4);
        assert_eq!(data.prefiltered[3].size, 1);
    }

    #[test]
    fn test_irradiance_follows_the_sky() {
        let up = compute_irradiance(Vec3::Y, 0.05, &sky);
        let down = compute_irradiance(-Vec3::Y, 0.05, &sky);
        let side = compute_irradiance(Vec3::X, 0.05, &sky);
        assert!(up.x > side.x && side.x > down.x);
        assert!(down.x < 1e-3);
    }

    #[test]
    fn test_smooth_prefilter_reflects_environment() {
        let value = compute_prefiltered(Vec3::Y, 0.0, 16, &sky);
        assert!((value - Vec3::ONE).length() < 1e-3);
    }

    #[test]
    fn test_sh_of_constant_environment() {
        let env = EnvironmentMap::uniform(Vec3::ONE, 8);
        let sh = project_sh9(&env);
        assert!((sh[0].x - 3.5449).abs() < 1e-3);
        for c in &sh[1..] {
            assert!(c.abs().max_element() < 1e-3);
        }
        for n in [Vec3::X, -Vec3::Y, Vec3::new(1.0, 1.0, 1.0).normalize()] {
            assert!((sh_irradiance(&sh, n).x - PI).abs() < 1e-2);
        }
    }

    #[test]
    fn test_sh_matches_irradiance_map() {
        let env = EnvironmentMap::from_fn(16, sky);
        let sh = project_sh9(&env);
        for n in [Vec3::Y, Vec3::X, -Vec3::Y, Vec3::Z] {
            let from_sh = sh_irradiance(&sh, n) / PI;
            let integrated = compute_irradiance(n, 0.05, &|d| env.sample(d));
            assert!((from_sh.x - integrated.x).abs() < 0.1, "{n}: {from_sh} vs {integrated}");
        }
    }

    #[test]
    fn test_brdf_lut_range() {
        let lut = compute_brdf_lut(8, 64);
        assert_eq!(lut.len(), 64);
        for v in &lut {
            assert!(v.x >= 0.0 && v.y >= 0.0);
            assert!(v.x + v.y <= 1.05);
        }
        // Smooth surface seen head on reflects all of F0
        let smooth = integrate_brdf(0.99, 0.05, 64);
        assert!((smooth.x + smooth.y - 1.0).abs() < 0.05);
    }

    #[test]
    fn test_half_packing() {
        let packed = rgba16f(&[Vec3::new(0.5, 2.0, 0.0)]);
        assert_eq!(
            packed,
            vec![f16::from_f32(0.5), f16::from_f32(2.0), f16::ZERO, f16::ONE]
        );
    }
}
