//! Command line arguments and environment path resolution.
//!
//! Both viewers take positional arguments in a fixed order. Missing required
//! arguments are reported with a hand-written usage text on standard output,
//! while `--help` and `--version` are still served by clap. The optional
//! window flags follow the usual viewer conventions:
//!
//! ```bash
//! # Textured viewer on a cube map folder, torus surface
//! ./pbr_skybox_texturing skyboxes/skybox2 albedo.png normal.png orm.png emissive.png torus
//!
//! # Untextured viewer, forced Vulkan, exit after 100 frames
//! ./skybox_pbr skyboxes/skybox2 --gpu-api vulkan --max-frames 100
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use clap::Parser;

use crate::error::{ViewerError, ViewerResult};
use crate::surfaces::SurfaceKind;
use crate::ViewerConfig;

/// Replace every backslash with a forward slash.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Normalize separators and split a path into its segments.
///
/// Empty segments are kept, so `"a//b"` has three segments and a trailing
/// separator produces an empty final segment.
pub fn split_path(path: &str) -> Vec<String> {
    normalize_path(path).split('/').map(str::to_string).collect()
}

/// Program name as shown in usage text: directory and extension removed.
pub fn program_name(argv0: &str) -> String {
    let normalized = normalize_path(argv0);
    let file = normalized.rsplit('/').next().unwrap_or_default();
    match file.rfind('.') {
        Some(idx) if idx > 0 => file[..idx].to_string(),
        _ => file.to_string(),
    }
}

/// Where the environment comes from, decided by the final path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentSource {
    /// A single equirectangular image (the final segment contains a '.').
    EquirectangularFile(PathBuf),
    /// A folder holding six cube map faces.
    CubemapFolder {
        /// The folder path exactly as given, separators normalized.
        root: String,
        /// Last non-empty segment, used to pick the face naming.
        folder: String,
    },
}

impl EnvironmentSource {
    pub fn classify(path: &str) -> Self {
        let segments = split_path(path);
        let last = segments.last().map(String::as_str).unwrap_or_default();
        if last.contains('.') {
            return Self::EquirectangularFile(PathBuf::from(normalize_path(path)));
        }
        let folder = segments
            .iter()
            .rev()
            .find(|segment| !segment.is_empty())
            .cloned()
            .unwrap_or_default();
        Self::CubemapFolder {
            root: normalize_path(path),
            folder,
        }
    }

    pub fn is_single_file(&self) -> bool {
        matches!(self, Self::EquirectangularFile(_))
    }
}

/// GPU API selection, mapped onto wgpu backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CliGpuApi {
    /// Let wgpu pick the platform default.
    #[default]
    Auto,
    Vulkan,
    Metal,
    Dx12,
    Gl,
}

impl CliGpuApi {
    pub fn backends(self) -> wgpu::Backends {
        match self {
            CliGpuApi::Auto => wgpu::Backends::all(),
            CliGpuApi::Vulkan => wgpu::Backends::VULKAN,
            CliGpuApi::Metal => wgpu::Backends::METAL,
            CliGpuApi::Dx12 => wgpu::Backends::DX12,
            CliGpuApi::Gl => wgpu::Backends::GL,
        }
    }
}

/// Window and device options shared by both viewers.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct WindowArgs {
    /// Initial window width in pixels.
    #[arg(long)]
    pub width: Option<u32>,

    /// Initial window height in pixels.
    #[arg(long)]
    pub height: Option<u32>,

    /// Disable vertical sync (may cause tearing).
    #[arg(long)]
    pub no_vsync: bool,

    /// GPU API used by wgpu.
    #[arg(long, default_value = "auto", value_enum)]
    pub gpu_api: CliGpuApi,

    /// Exit after rendering N frames (useful for testing).
    #[arg(long)]
    pub max_frames: Option<u64>,
}

impl WindowArgs {
    /// Apply the overrides to a config built from a viewer profile.
    pub fn apply(&self, mut config: ViewerConfig) -> ViewerConfig {
        if let Some(width) = self.width {
            config.width = width.max(1);
        }
        if let Some(height) = self.height {
            config.height = height.max(1);
        }
        config.vsync = !self.no_vsync;
        config.backends = self.gpu_api.backends();
        config.max_frames = self.max_frames;
        config
    }
}

/// Arguments of the textured viewer.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "PBR_Skybox_Texturing",
    about = "Physically based rendering with image based lighting, texturing and a skybox",
    version
)]
pub struct TexturingArgs {
    /// Cube map folder (skybox0, skybox1, skybox2) or an equirectangular .hdr/.png/.jpg file.
    pub path: String,

    /// Base colour (albedo) texture.
    pub albedo: PathBuf,

    /// Normal map texture.
    pub normal: PathBuf,

    /// Packed occlusion/roughness/metallic texture.
    pub material: PathBuf,

    /// Emissive texture.
    pub emissive: PathBuf,

    /// Surface to show; Boy's surface when omitted or unknown.
    pub surface: Option<String>,

    #[command(flatten)]
    pub window: WindowArgs,
}

impl TexturingArgs {
    pub fn usage(program: &str) -> String {
        format!(
            "\nusage: {program} path albedo_fn normal_fn material_fn emissive_fn [surface]\n\n\
             Demonstrates physically based rendering, image based lighting, texturing and a skybox.\n\n\
             positional arguments:\n\
             \x20 path         The path to the cubemap files e.g. skyboxes/skybox2/\n\
             \x20              or to a .hdr, .png, or .jpg equirectangular file.\n\
             \x20 albedo_fn    The path to the base colour (albedo) texture file e.g. Textures/Isotropic/vtk_Base_Color.png\n\
             \x20 normal_fn    The path to the normal texture file e.g. Textures/Isotropic/vtk_Normal.png\n\
             \x20 material_fn  The path to the material (orm) texture file e.g. Textures/Isotropic/vtk_Material.png\n\
             \x20 emissive_fn  The path to the emissive texture file e.g. Textures/Isotropic/vtk_dark_bkg.png\n\
             \x20 surface      The surface to use. Boy's surface is the default.\n\n\
             Physically based rendering sets color, metallicity and roughness of the object.\n\
             Image based lighting uses a cubemap texture to specify the environment.\n\
             Texturing is used to generate lighting effects.\n\
             A Skybox is used to create the illusion of distant three-dimensional surroundings.\n"
        )
    }

    /// Parse, reporting missing arguments as [`ViewerError::Usage`].
    pub fn parse_from_args<I, T>(args: I) -> ViewerResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        parse_with_usage(args, Self::usage)
    }

    pub fn environment(&self) -> EnvironmentSource {
        EnvironmentSource::classify(&self.path)
    }

    pub fn surface_kind(&self) -> SurfaceKind {
        SurfaceKind::from_name(self.surface.as_deref().unwrap_or_default())
    }
}

/// Arguments of the untextured viewer.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "Skybox-PBR",
    about = "Physically based rendering with image based lighting and a skybox",
    version
)]
pub struct SkyboxArgs {
    /// Folder holding posx/negx/posy/negy/posz/negz .jpg faces.
    pub path: String,

    /// Surface to show; Boy's surface when omitted or unknown.
    pub surface: Option<String>,

    #[command(flatten)]
    pub window: WindowArgs,
}

impl SkyboxArgs {
    pub fn usage(program: &str) -> String {
        format!(
            "\nusage: {program} path [surface]\n\n\
             Demonstrates physically based rendering, image based lighting and a skybox.\n\n\
             positional arguments:\n\
             \x20 path        The path to the cubemap files e.g. skyboxes/skybox2/\n\
             \x20 surface     The surface to use. Boy's surface is the default.\n\n\
             Physically based rendering sets color, metallicity and roughness of the object.\n\
             Image based lighting uses a cubemap texture to specify the environment.\n\
             A Skybox is used to create the illusion of distant three-dimensional surroundings.\n"
        )
    }

    pub fn parse_from_args<I, T>(args: I) -> ViewerResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        parse_with_usage(args, Self::usage)
    }

    pub fn surface_kind(&self) -> SurfaceKind {
        SurfaceKind::from_name(self.surface.as_deref().unwrap_or_default())
    }
}

fn parse_with_usage<P, I, T>(args: I, usage: fn(&str) -> String) -> ViewerResult<P>
where
    P: Parser,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let argv0 = args
        .first()
        .map(|arg| arg.to_string_lossy().into_owned())
        .unwrap_or_default();

    match P::try_parse_from(&args) {
        Ok(parsed) => Ok(parsed),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            log::debug!("argument parsing failed: {}", err);
            Err(ViewerError::Usage(usage(&program_name(&argv0))))
        }
    }
}

/// Join a folder and a file name, inserting '/' only when missing.
pub fn join_folder(folder: &str, file: &str) -> String {
    if folder.ends_with('/') {
        format!("{folder}{file}")
    } else {
        format!("{folder}/{file}")
    }
}

/// Lower-cased extension with a leading dot, e.g. `".png"`.
///
/// Extensions that are not purely alphanumeric are treated as absent.
pub fn extension_of(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(format!(".{}", ext.to_ascii_lowercase()))
}
