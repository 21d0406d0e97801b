//! wgpu device and surface setup

use std::sync::Arc;

use winit::window::Window;

use crate::error::{ViewerError, ViewerResult};
use crate::ViewerConfig;

/// Format of the offscreen HDR colour target and the IBL cube maps
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Capabilities an adapter needs to run the viewer
#[derive(Debug, Clone, Copy)]
pub struct MinimumRequirements {
    pub max_texture_dimension_2d: u32,
    pub max_bind_groups: u32,
}

impl Default for MinimumRequirements {
    fn default() -> Self {
        Self {
            max_texture_dimension_2d: 2048,
            max_bind_groups: 3,
        }
    }
}

impl MinimumRequirements {
    /// Whether an adapter with `limits` that can (or cannot) filter
    /// half-float textures is good enough.
    pub fn is_met_by(&self, limits: &wgpu::Limits, filterable_half_float: bool) -> bool {
        limits.max_texture_dimension_2d >= self.max_texture_dimension_2d
            && limits.max_bind_groups >= self.max_bind_groups
            && filterable_half_float
    }

    pub fn check(&self, adapter: &wgpu::Adapter) -> ViewerResult<()> {
        let filterable = adapter
            .get_texture_format_features(HDR_FORMAT)
            .flags
            .contains(wgpu::TextureFormatFeatureFlags::FILTERABLE);
        if self.is_met_by(&adapter.limits(), filterable) {
            Ok(())
        } else {
            log::error!(
                "Adapter below minimum requirements: {:?}, filterable {:?}: {}",
                self,
                HDR_FORMAT,
                filterable
            );
            Err(ViewerError::UnsupportedPlatform)
        }
    }
}

/// Fit `(width, height)` inside `max_size` keeping the aspect ratio.
pub fn clamp_surface_size(width: u32, height: u32, max_size: u32) -> (u32, u32) {
    if width > max_size || height > max_size {
        let scale = (max_size as f32 / width as f32).min(max_size as f32 / height as f32);
        let new_width = ((width as f32 * scale) as u32).clamp(1, max_size);
        let new_height = ((height as f32 * scale) as u32).clamp(1, max_size);
        (new_width, new_height)
    } else {
        (width.max(1), height.max(1))
    }
}

/// Device, queue and the window surface
pub struct GpuContext {
    pub surface: wgpu::Surface<'static>,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface_config: wgpu::SurfaceConfiguration,
}

impl GpuContext {
    pub fn new(window: Arc<Window>, config: &ViewerConfig) -> ViewerResult<Self> {
        pollster::block_on(Self::new_async(window, config))
    }

    async fn new_async(window: Arc<Window>, config: &ViewerConfig) -> ViewerResult<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: config.backends,
            ..Default::default()
        });

        let surface = instance
            .create_surface(Arc::clone(&window))
            .map_err(|e| ViewerError::SurfaceCreation(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(ViewerError::AdapterNotFound)?;

        let adapter_info = adapter.get_info();
        log::info!(
            "Selected GPU: {} ({:?} backend)",
            adapter_info.name,
            adapter_info.backend
        );

        MinimumRequirements::default().check(&adapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Viewer Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults()
                        .using_resolution(adapter.limits()),
                },
                None,
            )
            .await
            .map_err(|e| ViewerError::DeviceCreation(e.to_string()))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| ViewerError::SurfaceCreation("surface reports no formats".into()))?;

        let present_mode = if config.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let (width, height) = clamp_surface_size(
            size.width,
            size.height,
            device.limits().max_texture_dimension_2d,
        );

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        Ok(Self {
            surface,
            adapter,
            device,
            queue,
            surface_config,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let (width, height) =
            clamp_surface_size(width, height, self.device.limits().max_texture_dimension_2d);
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Reconfigure with the current size, after the surface was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.surface_config);
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_config.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(800, 500, 2048, (800, 500))]
    #[case(0, 0, 2048, (1, 1))]
    #[case(4096, 2048, 2048, (2048, 1024))]
    #[case(1000, 8000, 4000, (500, 4000))]
    fn test_clamp_surface_size(
        #[case] width: u32,
        #[case] height: u32,
        #[case] max: u32,
        #[case] expected: (u32, u32),
    ) {
        assert_eq!(clamp_surface_size(width, height, max), expected);
    }

    #[test]
    fn test_minimum_requirements() {
        let requirements = MinimumRequirements::default();
        let limits = wgpu::Limits::default();
        assert!(requirements.is_met_by(&limits, true));
        assert!(!requirements.is_met_by(&limits, false));

        let small = wgpu::Limits {
            max_texture_dimension_2d: 1024,
            ..wgpu::Limits::default()
        };
        assert!(!requirements.is_met_by(&small, true));

        let few_groups = wgpu::Limits {
            max_bind_groups: 2,
            ..wgpu::Limits::default()
        };
        assert!(!requirements.is_met_by(&few_groups, true));
    }
}
