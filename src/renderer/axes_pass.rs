//! Orientation axes overlay
//!
//! A line-list triad that follows the camera rotation, drawn in its own
//! corner viewport on top of the tone mapped image, with an optional
//! outline around the viewport. Axis labels are painted with egui.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};

use crate::colors::NamedColor;
use crate::resources::srgb_to_linear;
use crate::scene::{Camera, OrientationAxes};

/// Half extent of the triad in the viewport's clip space
const AXIS_EXTENT: f32 = 0.7;
/// Outline corners sit just inside the viewport so the edges stay visible
const OUTLINE_INSET: f32 = 0.99;
/// Axis tips are pushed out a little so labels do not cover the lines
const LABEL_OFFSET: f32 = 1.2;
/// Pick tolerance around an axis tip, relative to the smaller viewport side
const PICK_RADIUS: f32 = 0.15;

pub const AXIS_LABELS: [&str; 3] = ["X", "Y", "Z"];

/// A line vertex: position plus colour.
///
/// Every pair of consecutive vertices forms one segment. Vertices with
/// `screen_space` set bypass the rotation and are given in clip space.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct AxesVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub screen_space: f32,
}

impl AxesVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x4,
        2 => Float32,
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Uniform buffer data for the axes shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct AxesUniforms {
    pub transform: Mat4,
}

/// Colour as written to the surface: linearized when the surface encodes sRGB.
fn surface_color(color: NamedColor, srgb_surface: bool) -> [f32; 4] {
    let c = color.to_vec3();
    let c = if srgb_surface {
        Vec3::new(srgb_to_linear(c.x), srgb_to_linear(c.y), srgb_to_linear(c.z))
    } else {
        c
    };
    [c.x, c.y, c.z, 1.0]
}

/// Line vertices of the triad and, if requested, the viewport outline.
pub fn axes_vertices(axes: &OrientationAxes, srgb_surface: bool) -> Vec<AxesVertex> {
    let mut vertices = Vec::with_capacity(14);
    for (axis, color) in [Vec3::X, Vec3::Y, Vec3::Z].into_iter().zip(axes.axis_colors) {
        let color = surface_color(color, srgb_surface);
        for position in [Vec3::ZERO, axis] {
            vertices.push(AxesVertex {
                position: position.to_array(),
                color,
                screen_space: 0.0,
            });
        }
    }

    if let Some(outline) = axes.outline_color {
        let color = surface_color(outline, srgb_surface);
        let i = OUTLINE_INSET;
        let corners = [[-i, -i], [i, -i], [i, i], [-i, i]];
        for k in 0..corners.len() {
            for [x, y] in [corners[k], corners[(k + 1) % corners.len()]] {
                vertices.push(AxesVertex {
                    position: [x, y, 0.5],
                    color,
                    screen_space: 1.0,
                });
            }
        }
    }
    vertices
}

/// Rotation of the camera applied to the triad, scaled to fit a viewport
/// with `aspect` (width / height) and mapped into the [0, 1] depth range.
pub fn axes_transform(camera: &Camera, aspect: f32) -> Mat4 {
    let rotation = Mat4::from_mat3(Mat3::from_mat4(camera.view_matrix()));
    let aspect = if aspect > 0.0 { aspect } else { 1.0 };
    let (sx, sy) = if aspect >= 1.0 {
        (AXIS_EXTENT / aspect, AXIS_EXTENT)
    } else {
        (AXIS_EXTENT, AXIS_EXTENT * aspect)
    };
    Mat4::from_translation(Vec3::new(0.0, 0.0, 0.5))
        * Mat4::from_scale(Vec3::new(sx, sy, 0.4))
        * rotation
}

/// Pixel positions (top-left origin) of the X, Y and Z labels.
pub fn label_positions(
    axes: &OrientationAxes,
    camera: &Camera,
    width: u32,
    height: u32,
) -> [(f32, f32); 3] {
    let (vx, vy, vw, vh) = axes.viewport.to_pixels(width, height);
    let transform = axes_transform(camera, vw / vh.max(1.0));
    [Vec3::X, Vec3::Y, Vec3::Z].map(|axis| {
        let clip = transform * (axis * LABEL_OFFSET).extend(1.0);
        (
            vx + (clip.x + 1.0) * 0.5 * vw,
            vy + (1.0 - clip.y) * 0.5 * vh,
        )
    })
}

/// Axis direction whose tip lies under `cursor`, in window pixels.
///
/// Both ends of every axis can be picked. The tip closest to the cursor
/// wins, and of two overlapping tips the one nearer the viewer.
pub fn pick_axis(
    axes: &OrientationAxes,
    camera: &Camera,
    cursor: (f32, f32),
    width: u32,
    height: u32,
) -> Option<Vec3> {
    let (vx, vy, vw, vh) = axes.viewport.to_pixels(width, height);
    let inside = cursor.0 >= vx && cursor.0 <= vx + vw && cursor.1 >= vy && cursor.1 <= vy + vh;
    if !inside {
        return None;
    }
    let transform = axes_transform(camera, vw / vh.max(1.0));
    let radius = PICK_RADIUS * vw.min(vh);
    [Vec3::X, Vec3::Y, Vec3::Z, Vec3::NEG_X, Vec3::NEG_Y, Vec3::NEG_Z]
        .into_iter()
        .filter_map(|axis| {
            let clip = transform * axis.extend(1.0);
            let x = vx + (clip.x + 1.0) * 0.5 * vw;
            let y = vy + (1.0 - clip.y) * 0.5 * vh;
            let offset = (x - cursor.0).hypot(y - cursor.1);
            (offset <= radius).then_some((axis, offset, clip.z))
        })
        .min_by(|a, b| {
            if (a.1 - b.1).abs() < 1.0 {
                // Tips pointing at the viewer have the larger depth
                b.2.total_cmp(&a.2)
            } else {
                a.1.total_cmp(&b.1)
            }
        })
        .map(|(axis, _, _)| axis)
}

/// Line pipeline and buffers for the orientation axes
pub struct AxesPass {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl AxesPass {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        axes: &OrientationAxes,
    ) -> Self {
        use wgpu::util::DeviceExt;

        let vertices = axes_vertices(axes, surface_format.is_srgb());
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("axes_vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("axes_uniforms"),
            contents: bytemuck::bytes_of(&AxesUniforms {
                transform: Mat4::IDENTITY,
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("axes_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("axes_bind_group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("axes_shader"),
            source: wgpu::ShaderSource::Wgsl(AXES_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("axes_pipeline_layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("axes_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[AxesVertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Self {
            pipeline,
            vertex_buffer,
            vertex_count: vertices.len() as u32,
            uniform_buffer,
            bind_group,
        }
    }

    pub fn update(&self, queue: &wgpu::Queue, camera: &Camera, aspect: f32) {
        let uniforms = AxesUniforms {
            transform: axes_transform(camera, aspect),
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Draw into the pixel rectangle `(x, y, width, height)`.
    pub fn draw<'a>(&'a self, rpass: &mut wgpu::RenderPass<'a>, viewport: (f32, f32, f32, f32)) {
        let (x, y, width, height) = viewport;
        if width < 1.0 || height < 1.0 {
            return;
        }
        rpass.set_viewport(x, y, width, height, 0.0, 1.0);
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        rpass.draw(0..self.vertex_count, 0..1);
    }
}

pub const AXES_SHADER: &str = r#"
struct AxesUniforms {
    transform: mat4x4<f32>,
}

@group(0) @binding(0) var<uniform> uniforms: AxesUniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
    @location(2) screen_space: f32,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var output: VertexOutput;
    if input.screen_space > 0.5 {
        output.position = vec4<f32>(input.position, 1.0);
    } else {
        output.position = uniforms.transform * vec4<f32>(input.position, 1.0);
    }
    output.color = input.color;
    return output;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    return input.color;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    use crate::colors;
    use crate::scene::Viewport;

    fn corner_axes() -> OrientationAxes {
        OrientationAxes::new(Viewport::new(0.0, 0.0, 0.2, 0.2))
    }

    #[test]
    fn test_vertices_with_and_without_outline() {
        let plain = axes_vertices(&corner_axes(), false);
        assert_eq!(plain.len(), 6);
        assert!(plain.iter().all(|v| v.screen_space == 0.0));
        assert_eq!(plain[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(plain[1].color, [1.0, 0.0, 0.0, 1.0]);

        let outlined = axes_vertices(&corner_axes().with_outline(colors::CARROT), false);
        assert_eq!(outlined.len(), 14);
        assert!(outlined[6..].iter().all(|v| v.screen_space == 1.0));
        assert_eq!(outlined[6].color, surface_color(colors::CARROT, false));
    }

    #[test]
    fn test_srgb_surface_linearizes_colors() {
        let linear = surface_color(colors::CARROT, true);
        let encoded = surface_color(colors::CARROT, false);
        assert!(linear[0] < encoded[0]);
        assert!(linear[2] < encoded[2]);
        assert_eq!(surface_color(colors::RED, true), [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_transform_follows_camera_rotation() {
        let camera = Camera {
            position: Vec3::new(0.0, 0.0, 5.0),
            ..Default::default()
        };
        let transform = axes_transform(&camera, 1.0);
        let x_tip = transform * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert!((x_tip.x - AXIS_EXTENT).abs() < 1e-5);
        assert!(x_tip.y.abs() < 1e-5);
        assert!(x_tip.z > 0.0 && x_tip.z < 1.0);

        // Looking from +X, the X axis points at the viewer
        let side = Camera {
            position: Vec3::new(5.0, 0.0, 0.0),
            ..Default::default()
        };
        let x_tip = axes_transform(&side, 1.0) * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert!(x_tip.x.abs() < 1e-5);
        assert!(x_tip.y.abs() < 1e-5);
    }

    #[test]
    fn test_wide_viewport_squeezes_x() {
        let camera = Camera::default();
        let tip = axes_transform(&camera, 2.0) * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert!((tip.x - AXIS_EXTENT / 2.0).abs() < 1e-5);
        let tip = axes_transform(&camera, 2.0) * Vec4::new(0.0, 1.0, 0.0, 1.0);
        assert!((tip.y - AXIS_EXTENT).abs() < 1e-5);
    }

    #[test]
    fn test_label_positions_inside_viewport() {
        let axes = corner_axes();
        let camera = Camera {
            position: Vec3::new(0.0, 0.0, 5.0),
            ..Default::default()
        };
        let [x, y, z] = label_positions(&axes, &camera, 800, 500);
        let (vx, vy, vw, vh) = axes.viewport.to_pixels(800, 500);
        let center = (vx + vw * 0.5, vy + vh * 0.5);
        assert!(x.0 > center.0);
        assert!(y.1 < center.1);
        assert!((z.0 - center.0).abs() < 1e-3 && (z.1 - center.1).abs() < 1e-3);
        for (px, py) in [x, y] {
            assert!(px >= vx && px <= vx + vw);
            assert!(py >= vy && py <= vy + vh);
        }
    }

    #[test]
    fn test_pick_axis_tip() {
        let axes = corner_axes();
        let camera = Camera {
            position: Vec3::new(0.0, 0.0, 5.0),
            ..Default::default()
        };
        // 160x100 viewport at the bottom-left of 800x500, X squeezed by 1.6
        let x_tip = (80.0 + AXIS_EXTENT / 1.6 * 80.0, 450.0);
        assert_eq!(pick_axis(&axes, &camera, x_tip, 800, 500), Some(Vec3::X));
        let near_x_tip = (x_tip.0 + 4.0, x_tip.1 - 3.0);
        assert_eq!(pick_axis(&axes, &camera, near_x_tip, 800, 500), Some(Vec3::X));
        let neg_y_tip = (80.0, 450.0 + AXIS_EXTENT * 50.0);
        assert_eq!(pick_axis(&axes, &camera, neg_y_tip, 800, 500), Some(Vec3::NEG_Y));
    }

    #[test]
    fn test_pick_prefers_axis_facing_viewer() {
        let axes = corner_axes();
        let camera = Camera {
            position: Vec3::new(0.0, 0.0, 5.0),
            ..Default::default()
        };
        // Both Z tips project onto the viewport center
        assert_eq!(pick_axis(&axes, &camera, (80.0, 450.0), 800, 500), Some(Vec3::Z));
    }

    #[test]
    fn test_pick_misses_outside_tips() {
        let axes = corner_axes();
        let camera = Camera::default();
        assert_eq!(pick_axis(&axes, &camera, (400.0, 100.0), 800, 500), None);
        // Inside the viewport but away from every tip
        assert_eq!(pick_axis(&axes, &camera, (5.0, 405.0), 800, 500), None);
    }

    #[test]
    fn test_axes_shader_is_valid_wgsl() {
        let module = naga::front::wgsl::parse_str(AXES_SHADER).expect("axes shader should parse");
        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator.validate(&module).expect("axes shader should validate");
    }
}
