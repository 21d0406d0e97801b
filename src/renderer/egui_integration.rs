//! egui integration
//!
//! Feeds winit events to egui and draws its output on top of the frame.

use egui::ViewportId;
use egui_wgpu::ScreenDescriptor;
use winit::event::WindowEvent;
use winit::window::Window;

pub struct EguiIntegration {
    ctx: egui::Context,
    winit_state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    /// Tessellated output of the last [`EguiIntegration::run`]
    paint_jobs: Vec<egui::ClippedPrimitive>,
    /// Texture uploads and frees not yet applied to the GPU
    pending_textures: egui::TexturesDelta,
}

impl EguiIntegration {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat, window: &Window) -> Self {
        let ctx = egui::Context::default();

        let scale = window.scale_factor() as f32;
        let winit_state = egui_winit::State::new(ctx.clone(), ViewportId::ROOT, window, Some(scale), None);

        Self {
            ctx,
            winit_state,
            // No depth attachment, single sample
            renderer: egui_wgpu::Renderer::new(device, surface_format, None, 1),
            paint_jobs: Vec::new(),
            pending_textures: egui::TexturesDelta::default(),
        }
    }

    /// Handle a winit window event; returns true when egui consumed it.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.winit_state.on_window_event(window, event).consumed
    }

    /// Build one UI frame with `build_ui` and tessellate it.
    pub fn run(&mut self, window: &Window, build_ui: impl FnOnce(&egui::Context)) {
        let input = self.winit_state.take_egui_input(window);
        let full_output = self.ctx.run(input, build_ui);
        self.winit_state
            .handle_platform_output(window, full_output.platform_output);
        self.paint_jobs = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        self.pending_textures.append(full_output.textures_delta);
    }

    /// Record the egui draw into `encoder`, loading the existing contents of
    /// `target`. Returns command buffers egui needs submitted first.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        size_in_pixels: [u32; 2],
    ) -> Vec<wgpu::CommandBuffer> {
        let screen = ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: self.ctx.pixels_per_point(),
        };

        let pending = std::mem::take(&mut self.pending_textures);
        for (id, delta) in &pending.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }

        let command_buffers = self.renderer.update_buffers(
            device,
            queue,
            encoder,
            &self.paint_jobs,
            &screen,
        );

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.renderer
                .render(&mut rpass, &self.paint_jobs, &screen);
        }

        pending.free.iter().for_each(|id| self.renderer.free_texture(id));

        command_buffers
    }

    /// Whether the pointer is over, or dragging, an egui widget.
    pub fn wants_pointer_input(&self) -> bool {
        self.ctx.wants_pointer_input()
    }
}
