//! Forward PBR shading of the actor, lit by the image based lighting
//! textures and an optional headlight

use wgpu::util::DeviceExt;

use super::gpu::{DEPTH_FORMAT, HDR_FORMAT};
use super::ibl_textures::IblTextures;
use crate::resources::{ColorSpace, Mesh, PbrMaterial, TextureData, Vertex};

/// Material texture slots in binding order, with the stand-in used when a
/// slot is empty.
fn material_slots(material: &PbrMaterial) -> [(&'static str, TextureData); 4] {
    let textures = &material.textures;
    [
        (
            "base_color",
            textures
                .base_color
                .clone()
                .unwrap_or_else(TextureData::white)
                .with_color_space(ColorSpace::Srgb),
        ),
        (
            "normal",
            textures
                .normal
                .clone()
                .unwrap_or_else(TextureData::default_normal),
        ),
        (
            "orm",
            textures.orm.clone().unwrap_or_else(TextureData::white),
        ),
        (
            "emissive",
            textures
                .emissive
                .clone()
                .unwrap_or_else(TextureData::black)
                .with_color_space(ColorSpace::Srgb),
        ),
    ]
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    data: &TextureData,
) -> wgpu::TextureView {
    let format = match data.color_space {
        ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
        ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
    };
    let size = wgpu::Extent3d {
        width: data.width.max(1),
        height: data.height.max(1),
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &data.data,
    );
    log::debug!(
        "Uploaded {} texture '{}' ({}x{}, {:?})",
        label,
        data.name,
        data.width,
        data.height,
        format
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn texture_entry(binding: u32, view_dimension: wgpu::TextureViewDimension) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

/// Layout shared by the skybox and PBR pipelines for the frame uniforms
pub fn frame_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("frame_bind_group_layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

/// Pipeline, mesh buffers and bind groups of the shaded actor
pub struct PbrPass {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    material_buffer: wgpu::Buffer,
    material_bind_group: wgpu::BindGroup,
    ibl_bind_group: wgpu::BindGroup,
}

impl PbrPass {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        frame_layout: &wgpu::BindGroupLayout,
        mesh: &Mesh,
        material: &PbrMaterial,
        ibl: &IblTextures,
        ibl_sampler: &wgpu::Sampler,
    ) -> Self {
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                texture_entry(1, wgpu::TextureViewDimension::D2),
                texture_entry(2, wgpu::TextureViewDimension::D2),
                texture_entry(3, wgpu::TextureViewDimension::D2),
                texture_entry(4, wgpu::TextureViewDimension::D2),
                sampler_entry(5),
            ],
        });

        let ibl_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ibl_bind_group_layout"),
            entries: &[
                texture_entry(0, wgpu::TextureViewDimension::Cube),
                texture_entry(1, wgpu::TextureViewDimension::Cube),
                texture_entry(2, wgpu::TextureViewDimension::D2),
                sampler_entry(3),
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("pbr_shader"),
            source: wgpu::ShaderSource::Wgsl(PBR_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pbr_pipeline_layout"),
            bind_group_layouts: &[frame_layout, &material_layout, &ibl_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("pbr_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[Vertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: HDR_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                // Open surfaces (Mobius, hills) are seen from both sides
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{}_vertices", mesh.name)),
            contents: mesh.vertex_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{}_indices", mesh.name)),
            contents: mesh.index_bytes(),
            usage: wgpu::BufferUsages::INDEX,
        });

        let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("material_uniforms"),
            contents: bytemuck::bytes_of(&material.uniform_data()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let max_dimension = device.limits().max_texture_dimension_2d;
        let views = material_slots(material).map(|(label, data)| {
            upload_texture(device, queue, label, &data.fit_within(max_dimension))
        });
        let material_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("material_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let material_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("material_bind_group"),
            layout: &material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: material_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&views[0]),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&views[1]),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&views[2]),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(&views[3]),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::Sampler(&material_sampler),
                },
            ],
        });

        let ibl_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ibl_bind_group"),
            layout: &ibl_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&ibl.irradiance_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&ibl.prefilter_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&ibl.brdf_lut_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(ibl_sampler),
                },
            ],
        });

        log::info!(
            "PBR pass ready: '{}' with {} triangles",
            mesh.name,
            mesh.triangle_count()
        );

        Self {
            pipeline,
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count() as u32,
            material_buffer,
            material_bind_group,
            ibl_bind_group,
        }
    }

    /// Upload the current slider-driven coefficients.
    pub fn update_material(&self, queue: &wgpu::Queue, material: &PbrMaterial) {
        queue.write_buffer(
            &self.material_buffer,
            0,
            bytemuck::bytes_of(&material.uniform_data()),
        );
    }

    pub fn draw<'a>(&'a self, rpass: &mut wgpu::RenderPass<'a>, frame_bind_group: &'a wgpu::BindGroup) {
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, frame_bind_group, &[]);
        rpass.set_bind_group(1, &self.material_bind_group, &[]);
        rpass.set_bind_group(2, &self.ibl_bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        rpass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Metallic/roughness shading with split-sum image based lighting
pub const PBR_SHADER: &str = r#"
struct FrameUniforms {
    view_proj: mat4x4<f32>,
    inv_view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    // x = use SH, y = highest prefiltered mip, z = IBL on
    params: vec4<f32>,
    // xyz = headlight direction, w = intensity
    light: vec4<f32>,
    sh: array<vec4<f32>, 9>,
}

struct MaterialUniforms {
    base_color: vec4<f32>,
    emissive: vec4<f32>,
    // x = metallic, y = roughness, z = occlusion strength, w = normal scale
    factors: vec4<f32>,
    diffuse: vec4<f32>,
    flags: vec4<u32>,
}

@group(0) @binding(0) var<uniform> frame: FrameUniforms;

@group(1) @binding(0) var<uniform> material: MaterialUniforms;
@group(1) @binding(1) var base_color_texture: texture_2d<f32>;
@group(1) @binding(2) var normal_texture: texture_2d<f32>;
@group(1) @binding(3) var orm_texture: texture_2d<f32>;
@group(1) @binding(4) var emissive_texture: texture_2d<f32>;
@group(1) @binding(5) var material_sampler: sampler;

@group(2) @binding(0) var irradiance_map: texture_cube<f32>;
@group(2) @binding(1) var prefilter_map: texture_cube<f32>;
@group(2) @binding(2) var brdf_lut: texture_2d<f32>;
@group(2) @binding(3) var ibl_sampler: sampler;

const PI: f32 = 3.14159265359;
const HAS_NORMAL_MAP: u32 = 1u;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) tangent: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) tangent: vec4<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var output: VertexOutput;
    output.clip_position = frame.view_proj * vec4<f32>(input.position, 1.0);
    output.world_position = input.position;
    output.normal = input.normal;
    // Texture rows are stored top-down, texture coordinates grow upwards
    output.uv = vec2<f32>(input.uv.x, 1.0 - input.uv.y);
    output.tangent = input.tangent;
    return output;
}

fn distribution_ggx(n_dot_h: f32, roughness: f32) -> f32 {
    let a = roughness * roughness;
    let a2 = a * a;
    let denom = n_dot_h * n_dot_h * (a2 - 1.0) + 1.0;
    return a2 / (PI * denom * denom);
}

fn geometry_schlick_ggx(n_dot_v: f32, roughness: f32) -> f32 {
    let r = roughness + 1.0;
    let k = (r * r) / 8.0;
    return n_dot_v / (n_dot_v * (1.0 - k) + k);
}

fn geometry_smith(n_dot_v: f32, n_dot_l: f32, roughness: f32) -> f32 {
    return geometry_schlick_ggx(n_dot_v, roughness) * geometry_schlick_ggx(n_dot_l, roughness);
}

fn fresnel_schlick(cos_theta: f32, f0: vec3<f32>) -> vec3<f32> {
    return f0 + (1.0 - f0) * pow(clamp(1.0 - cos_theta, 0.0, 1.0), 5.0);
}

fn fresnel_schlick_roughness(cos_theta: f32, f0: vec3<f32>, roughness: f32) -> vec3<f32> {
    return f0 + (max(vec3<f32>(1.0 - roughness), f0) - f0) * pow(clamp(1.0 - cos_theta, 0.0, 1.0), 5.0);
}

// Irradiance E(n) from SH9 radiance coefficients
fn sh_irradiance(n: vec3<f32>) -> vec3<f32> {
    let c1 = 0.429043;
    let c2 = 0.511664;
    let c3 = 0.743125;
    let c4 = 0.886227;
    let c5 = 0.247708;
    let x = n.x;
    let y = n.y;
    let z = n.z;
    return c1 * frame.sh[8].xyz * (x * x - y * y)
        + c3 * frame.sh[6].xyz * z * z
        + c4 * frame.sh[0].xyz
        - c5 * frame.sh[6].xyz
        + 2.0 * c1 * (frame.sh[4].xyz * x * y + frame.sh[7].xyz * x * z + frame.sh[5].xyz * y * z)
        + 2.0 * c2 * (frame.sh[3].xyz * x + frame.sh[1].xyz * y + frame.sh[2].xyz * z);
}

@fragment
fn fs_main(input: VertexOutput, @builtin(front_facing) front_facing: bool) -> @location(0) vec4<f32> {
    let base_sample = textureSample(base_color_texture, material_sampler, input.uv);
    let normal_sample = textureSample(normal_texture, material_sampler, input.uv).xyz;
    let orm = textureSample(orm_texture, material_sampler, input.uv).rgb;
    let emissive_sample = textureSample(emissive_texture, material_sampler, input.uv).rgb;

    let albedo = base_sample.rgb * material.base_color.rgb;
    let occlusion = mix(1.0, orm.r, material.factors.z);
    let roughness = clamp(orm.g * material.factors.y, 0.04, 1.0);
    let metallic = clamp(orm.b * material.factors.x, 0.0, 1.0);
    let emissive = emissive_sample * material.emissive.rgb;
    let diffuse_strength = material.diffuse.x;

    var n = normalize(input.normal);
    let tangent_length = length(input.tangent.xyz);
    if (material.flags.x & HAS_NORMAL_MAP) != 0u && tangent_length > 1e-4 {
        let t = normalize(input.tangent.xyz - n * dot(n, input.tangent.xyz));
        let b = cross(n, t) * input.tangent.w;
        let tn = normal_sample * 2.0 - 1.0;
        let scaled = vec3<f32>(tn.xy * material.factors.w, tn.z);
        n = normalize(mat3x3<f32>(t, b, n) * scaled);
    }
    n = n * select(-1.0, 1.0, front_facing);

    let v = normalize(frame.camera_pos.xyz - input.world_position);
    let n_dot_v = max(dot(n, v), 1e-4);
    let f0 = mix(vec3<f32>(0.04), albedo, metallic);

    var color = vec3<f32>(0.0);

    if frame.light.w > 0.0 {
        let l = -normalize(frame.light.xyz);
        let h = normalize(v + l);
        let n_dot_l = max(dot(n, l), 0.0);
        let n_dot_h = max(dot(n, h), 0.0);

        let d = distribution_ggx(n_dot_h, roughness);
        let g = geometry_smith(n_dot_v, n_dot_l, roughness);
        let f = fresnel_schlick(max(dot(h, v), 0.0), f0);

        let specular = d * g * f / (4.0 * n_dot_v * max(n_dot_l, 1e-4));
        let kd = (vec3<f32>(1.0) - f) * (1.0 - metallic);
        color += (kd * albedo * diffuse_strength / PI + specular) * frame.light.w * n_dot_l;
    }

    if frame.params.z > 0.5 {
        let f = fresnel_schlick_roughness(n_dot_v, f0, roughness);
        let kd = (vec3<f32>(1.0) - f) * (1.0 - metallic);

        var irradiance: vec3<f32>;
        if frame.params.x > 0.5 {
            irradiance = max(sh_irradiance(n), vec3<f32>(0.0)) / PI;
        } else {
            irradiance = textureSampleLevel(irradiance_map, ibl_sampler, n, 0.0).rgb;
        }

        let r = reflect(-v, n);
        let prefiltered = textureSampleLevel(prefilter_map, ibl_sampler, r, roughness * frame.params.y).rgb;
        let brdf = textureSampleLevel(brdf_lut, ibl_sampler, vec2<f32>(n_dot_v, roughness), 0.0).rg;

        let diffuse = kd * irradiance * albedo * diffuse_strength;
        let specular = prefiltered * (f * brdf.x + brdf.y);
        color += (diffuse + specular) * occlusion;
    }

    color += emissive;
    return vec4<f32>(color, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::MaterialParameters;

    #[test]
    fn test_pbr_shader_is_valid_wgsl() {
        let module = naga::front::wgsl::parse_str(PBR_SHADER).expect("PBR shader should parse");
        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .expect("PBR shader should validate");
        let entry_points: Vec<_> = module.entry_points.iter().map(|ep| ep.name.as_str()).collect();
        assert_eq!(entry_points, vec!["vs_main", "fs_main"]);
    }

    #[test]
    fn test_empty_slots_get_neutral_textures() {
        let material = PbrMaterial::new("plain", MaterialParameters::default());
        let slots = material_slots(&material);

        assert_eq!(slots[0].1.data, vec![255, 255, 255, 255]);
        assert_eq!(slots[0].1.color_space, ColorSpace::Srgb);
        assert_eq!(slots[1].1.data, vec![128, 128, 255, 255]);
        assert_eq!(slots[1].1.color_space, ColorSpace::Linear);
        assert_eq!(slots[2].1.data, vec![255, 255, 255, 255]);
        assert_eq!(slots[3].1.data, vec![0, 0, 0, 255]);
        assert_eq!(slots[3].1.color_space, ColorSpace::Srgb);
    }

    #[test]
    fn test_loaded_textures_keep_their_data() {
        let albedo = TextureData::solid_color([10, 20, 30, 255], "albedo");
        let material = PbrMaterial::new("textured", MaterialParameters::default())
            .with_base_color_texture(albedo)
            .with_orm_texture(TextureData::solid_color([255, 128, 0, 255], "orm"));
        let slots = material_slots(&material);

        assert_eq!(slots[0].1.name, "albedo");
        assert_eq!(slots[0].1.data, vec![10, 20, 30, 255]);
        assert_eq!(slots[2].1.data, vec![255, 128, 0, 255]);
        assert_eq!(slots[2].1.color_space, ColorSpace::Linear);
    }
}
