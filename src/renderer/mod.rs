//! wgpu renderer
//!
//! One frame is four passes:
//! 1. skybox and PBR actor into an HDR target with depth
//! 2. tone mapping onto the window surface
//! 3. orientation axes in their corner viewport
//! 4. egui (sliders and axis labels)

mod axes_pass;
mod egui_integration;
mod gpu;
mod ibl_textures;
mod pbr_pass;
mod skybox_pass;
mod tonemapping;
mod uniforms;

pub use axes_pass::*;
pub use egui_integration::EguiIntegration;
pub use gpu::*;
pub use ibl_textures::*;
pub use pbr_pass::*;
pub use skybox_pass::*;
pub use tonemapping::*;
pub use uniforms::*;

use std::sync::Arc;

use glam::Vec3;
use winit::event::WindowEvent;
use winit::window::Window;

use crate::error::{ViewerError, ViewerResult};
use crate::ibl::{compute_ibl, IblData};
use crate::resources::srgb_to_linear;
use crate::scene::Scene;
use crate::ui::SliderController;
use crate::ViewerConfig;

/// Offscreen HDR colour and depth targets, recreated on resize
struct RenderTargets {
    hdr_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
}

impl RenderTargets {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };
        let create = |label: &str, format: wgpu::TextureFormat, usage: wgpu::TextureUsages| {
            device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some(label),
                    size,
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format,
                    usage,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        };
        Self {
            hdr_view: create(
                "hdr_color",
                HDR_FORMAT,
                wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            ),
            depth_view: create(
                "depth",
                DEPTH_FORMAT,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
            ),
        }
    }
}

/// Linear clear colour for an sRGB encoded background
fn clear_color(background: Vec3) -> wgpu::Color {
    wgpu::Color {
        r: srgb_to_linear(background.x) as f64,
        g: srgb_to_linear(background.y) as f64,
        b: srgb_to_linear(background.z) as f64,
        a: 1.0,
    }
}

/// Owns the GPU context and every pass
pub struct Renderer {
    window: Arc<Window>,
    gpu: GpuContext,
    targets: RenderTargets,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    sh: [Vec3; 9],
    max_prefilter_mip: f32,
    skybox_pass: SkyboxPass,
    pbr_pass: PbrPass,
    tonemapping_pass: TonemappingPass,
    axes_pass: AxesPass,
    egui: EguiIntegration,
}

impl Renderer {
    /// Create the device, precompute image based lighting for the scene's
    /// environment and build every pass.
    pub fn new(window: Arc<Window>, scene: &Scene, config: &ViewerConfig) -> ViewerResult<Self> {
        let gpu = GpuContext::new(Arc::clone(&window), config)?;
        let device = &gpu.device;
        let queue = &gpu.queue;
        let (width, height) = gpu.surface_size();
        let surface_format = gpu.surface_format();
        log::info!("Surface {}x{} {:?}", width, height, surface_format);

        let ibl_data: IblData = compute_ibl(&scene.lighting.environment, &config.ibl);
        let ibl = IblTextures::upload(device, queue, &ibl_data);
        let environment = EnvironmentTexture::upload(device, queue, &scene.skybox.environment);
        let sampler = create_ibl_sampler(device);

        let frame_layout = frame_bind_group_layout(device);
        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame_uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let targets = RenderTargets::new(device, width, height);
        let skybox_pass = SkyboxPass::new(device, &frame_layout, &environment, &sampler);
        let pbr_pass = PbrPass::new(
            device,
            queue,
            &frame_layout,
            &scene.actor.mesh,
            &scene.actor.material,
            &ibl,
            &sampler,
        );
        let tonemapping_pass = TonemappingPass::new(device, surface_format, &targets.hdr_view);
        let axes_pass = AxesPass::new(device, surface_format, &scene.orientation_axes);
        let egui = EguiIntegration::new(device, surface_format, &window);

        Ok(Self {
            window,
            targets,
            frame_buffer,
            frame_bind_group,
            sh: ibl_data.sh,
            max_prefilter_mip: ibl.max_prefilter_mip,
            skybox_pass,
            pbr_pass,
            tonemapping_pass,
            axes_pass,
            egui,
            gpu,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.gpu.surface_size()
    }

    pub fn on_window_event(&mut self, event: &WindowEvent) -> bool {
        self.egui.on_window_event(&self.window, event)
    }

    pub fn wants_pointer_input(&self) -> bool {
        self.egui.wants_pointer_input()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.gpu.resize(width, height);
        let (width, height) = self.gpu.surface_size();
        self.targets = RenderTargets::new(&self.gpu.device, width, height);
        self.tonemapping_pass
            .set_input(&self.gpu.device, &self.targets.hdr_view);
        log::debug!("Resized render targets to {}x{}", width, height);
    }

    /// Render one frame of `scene` with the slider overlay.
    pub fn render(&mut self, scene: &Scene, sliders: &mut SliderController) -> ViewerResult<()> {
        let frame = match self.gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.gpu.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timeout, skipping frame");
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(ViewerError::OutOfMemory),
        };
        let surface_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let (width, height) = self.gpu.surface_size();

        let uniforms = FrameUniforms::new(scene, &self.sh, self.max_prefilter_mip);
        self.gpu
            .queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&uniforms));
        self.pbr_pass
            .update_material(&self.gpu.queue, &scene.actor.material);
        self.tonemapping_pass
            .update(&self.gpu.queue, &scene.tone_mapping.read());
        let axes_viewport = scene.orientation_axes.viewport.to_pixels(width, height);
        self.axes_pass.update(
            &self.gpu.queue,
            &scene.camera,
            axes_viewport.2 / axes_viewport.3.max(1.0),
        );

        let labels = label_positions(&scene.orientation_axes, &scene.camera, width, height);
        let label_colors = scene.orientation_axes.axis_colors;
        self.egui.run(&self.window, |ctx| {
            sliders.show(ctx);
            let pixels_per_point = ctx.pixels_per_point();
            let painter = ctx.layer_painter(egui::LayerId::new(
                egui::Order::Foreground,
                egui::Id::new("axes_labels"),
            ));
            for ((text, (x, y)), color) in AXIS_LABELS.iter().zip(labels).zip(label_colors) {
                painter.text(
                    egui::pos2(x / pixels_per_point, y / pixels_per_point),
                    egui::Align2::CENTER_CENTER,
                    *text,
                    egui::FontId::proportional(14.0),
                    color.to_egui(),
                );
            }
        });

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.hdr_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(scene.background)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.skybox_pass.draw(&mut rpass, &self.frame_bind_group);
            self.pbr_pass.draw(&mut rpass, &self.frame_bind_group);
        }

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("resolve_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.tonemapping_pass.draw(&mut rpass);
            self.axes_pass.draw(&mut rpass, axes_viewport);
        }

        let egui_commands = self.egui.render(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &surface_view,
            [width, height],
        );

        self.gpu
            .queue
            .submit(egui_commands.into_iter().chain(std::iter::once(encoder.finish())));
        frame.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_color_is_linear() {
        let color = clear_color(Vec3::new(26.0, 51.0, 102.0) / 255.0);
        assert!((color.r - 0.0103).abs() < 1e-3);
        assert!((color.g - 0.0331).abs() < 1e-3);
        assert!((color.b - 0.1329).abs() < 1e-3);
        assert_eq!(color.a, 1.0);
    }
}
