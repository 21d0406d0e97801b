//! GPU copies of the environment cube map and the precomputed IBL data

use half::f16;

use super::gpu::HDR_FORMAT;
use crate::ibl::{rgba16f, CubeLevel, IblData};
use crate::resources::EnvironmentMap;

/// Bytes per Rgba16Float texel
const RGBA16F_TEXEL_SIZE: u32 = 8;
/// Bytes per Rg16Float texel
const RG16F_TEXEL_SIZE: u32 = 4;

fn create_cube_texture(
    device: &wgpu::Device,
    label: &str,
    size: u32,
    mip_level_count: u32,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 6,
        },
        mip_level_count,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: HDR_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    })
}

/// Write one face of one mip level. `texels` is tightly packed RGBA half floats.
fn write_cube_face(
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    mip_level: u32,
    face: u32,
    size: u32,
    texels: &[f16],
) {
    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture,
            mip_level,
            origin: wgpu::Origin3d { x: 0, y: 0, z: face },
            aspect: wgpu::TextureAspect::All,
        },
        bytemuck::cast_slice(texels),
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(size * RGBA16F_TEXEL_SIZE),
            rows_per_image: Some(size),
        },
        wgpu::Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 1,
        },
    );
}

fn upload_cube_levels(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    levels: &[CubeLevel],
) -> wgpu::Texture {
    let size = levels.first().map(|l| l.size).unwrap_or(1);
    let texture = create_cube_texture(device, label, size, levels.len().max(1) as u32);
    for (mip, level) in levels.iter().enumerate() {
        for face in 0..6 {
            write_cube_face(
                queue,
                &texture,
                mip as u32,
                face as u32,
                level.size,
                &level.face_rgba16f(face),
            );
        }
    }
    texture
}

fn cube_view(texture: &wgpu::Texture, label: &str) -> wgpu::TextureView {
    texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some(label),
        dimension: Some(wgpu::TextureViewDimension::Cube),
        ..Default::default()
    })
}

/// Environment cube map sampled by the skybox
pub struct EnvironmentTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl EnvironmentTexture {
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, environment: &EnvironmentMap) -> Self {
        let size = environment.face_size.max(1);
        let texture = create_cube_texture(device, "environment_cubemap", size, 1);
        for (face, texels) in environment.faces.iter().enumerate() {
            write_cube_face(queue, &texture, 0, face as u32, size, &rgba16f(texels));
        }
        let view = cube_view(&texture, "environment_cubemap_view");
        log::info!("Environment cube map uploaded: {0}x{0} per face", size);
        Self { texture, view }
    }
}

/// Irradiance and prefiltered cube maps plus the BRDF lookup table
pub struct IblTextures {
    pub irradiance: wgpu::Texture,
    pub irradiance_view: wgpu::TextureView,
    pub prefilter: wgpu::Texture,
    pub prefilter_view: wgpu::TextureView,
    pub brdf_lut: wgpu::Texture,
    pub brdf_lut_view: wgpu::TextureView,
    /// Highest mip level of the prefiltered cube map
    pub max_prefilter_mip: f32,
}

impl IblTextures {
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, data: &IblData) -> Self {
        let irradiance = upload_cube_levels(
            device,
            queue,
            "irradiance_cubemap",
            std::slice::from_ref(&data.irradiance),
        );
        let prefilter = upload_cube_levels(device, queue, "prefilter_cubemap", &data.prefiltered);

        let lut_size = data.brdf_lut_size.max(1);
        let brdf_lut = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("brdf_lut"),
            size: wgpu::Extent3d {
                width: lut_size,
                height: lut_size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rg16Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &brdf_lut,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&data.brdf_lut_rg16f()),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(lut_size * RG16F_TEXEL_SIZE),
                rows_per_image: Some(lut_size),
            },
            wgpu::Extent3d {
                width: lut_size,
                height: lut_size,
                depth_or_array_layers: 1,
            },
        );

        let max_prefilter_mip = data.prefiltered.len().saturating_sub(1) as f32;
        log::info!(
            "IBL textures uploaded: irradiance {}, prefilter {} ({} mips), BRDF LUT {}",
            data.irradiance.size,
            data.prefiltered.first().map(|l| l.size).unwrap_or(0),
            data.prefiltered.len(),
            lut_size
        );

        Self {
            irradiance_view: cube_view(&irradiance, "irradiance_cubemap_view"),
            irradiance,
            prefilter_view: cube_view(&prefilter, "prefilter_cubemap_view"),
            prefilter,
            brdf_lut_view: brdf_lut.create_view(&wgpu::TextureViewDescriptor::default()),
            brdf_lut,
            max_prefilter_mip,
        }
    }
}

/// Trilinear clamp-to-edge sampler used for every IBL lookup
pub fn create_ibl_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("ibl_sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}
