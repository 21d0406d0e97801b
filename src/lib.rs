//! PBR Skybox - physically based rendering viewers with image based lighting
//!
//! Two small programs share this crate:
//! - **pbr_skybox_texturing**: a textured PBR surface (albedo, normal, ORM and
//!   emissive maps) lit by a cube map or an equirectangular environment
//! - **skybox_pbr**: an untextured PBR surface lit by a six-image cube map
//!
//! # Features
//! - Cube map assembly from six images or projection of a single equirectangular image
//! - CPU precomputed image based lighting (irradiance or SH9, GGX prefiltered mips, BRDF LUT)
//! - Six procedural surfaces with texture coordinates and tangents
//! - Skybox, tone mapping and an orientation axes overlay
//! - Live material tuning with egui sliders

pub mod app;
pub mod cli;
pub mod colors;
pub mod error;
pub mod ibl;
pub mod profile;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod surfaces;
pub mod ui;

pub use app::Viewer;
pub use error::{ViewerError, ViewerResult};
pub use ibl::IblSettings;
pub use profile::{Variant, ViewerProfile};

/// Configuration for creating the viewer window and GPU device
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Window title
    pub title: String,
    /// Initial window width
    pub width: u32,
    /// Initial window height
    pub height: u32,
    /// Enable vsync
    pub vsync: bool,
    /// wgpu backends the adapter may come from
    pub backends: wgpu::Backends,
    /// Exit after this many rendered frames
    pub max_frames: Option<u64>,
    /// Image based lighting precomputation settings
    pub ibl: IblSettings,
    /// Upper bound for cube map faces projected from an equirectangular image
    pub max_environment_face_size: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "PBR Skybox".to_string(),
            width: 800,
            height: 600,
            vsync: true,
            backends: wgpu::Backends::all(),
            max_frames: None,
            ibl: IblSettings::default(),
            max_environment_face_size: 1024,
        }
    }
}

/// Initialize `env_logger` with `info` as the default level.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
