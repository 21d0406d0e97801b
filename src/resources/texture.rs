//! Material texture loading

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, RgbaImage};
use std::path::Path;

use crate::cli::extension_of;

/// Extensions accepted for material textures.
pub const TEXTURE_EXTENSIONS: [&str; 7] = [".jpg", ".png", ".bmp", ".tiff", ".pnm", ".pgm", ".ppm"];

/// How texel values are encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpace {
    #[default]
    Linear,
    /// Decoded to linear by the sampler (albedo, emissive)
    Srgb,
}

/// Loaded texture data (RGBA8)
#[derive(Debug, Clone)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub name: String,
    pub color_space: ColorSpace,
    /// Set when loading failed and a stand-in was produced
    pub placeholder: bool,
}

impl TextureData {
    /// Load a material texture, degrading to a placeholder on failure.
    ///
    /// Files whose extension is not in [`TEXTURE_EXTENSIONS`], missing files
    /// and undecodable files are reported and replaced by a 1x1 black texture.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let supported = extension_of(path)
            .map(|ext| TEXTURE_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false);
        if !supported {
            log::warn!("Unable to read the texture file: {}", path.display());
            return Self::placeholder(&name);
        }
        if !path.is_file() {
            log::warn!("Nonexistent texture file: {}", path.display());
            return Self::placeholder(&name);
        }

        match image::open(path) {
            Ok(img) => {
                let texture = Self::from_image(img, &name);
                log::info!(
                    "Loaded texture {} ({}x{})",
                    texture.name,
                    texture.width,
                    texture.height
                );
                texture
            }
            Err(err) => {
                log::warn!("Unable to read the texture file: {} ({})", path.display(), err);
                Self::placeholder(&name)
            }
        }
    }

    /// Create texture from image
    pub fn from_image(img: DynamicImage, name: &str) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.to_rgba8().into_raw(),
            name: name.to_string(),
            color_space: ColorSpace::Linear,
            placeholder: false,
        }
    }

    pub fn with_color_space(mut self, color_space: ColorSpace) -> Self {
        self.color_space = color_space;
        self
    }

    /// Create a solid color texture
    pub fn solid_color(color: [u8; 4], name: &str) -> Self {
        Self {
            width: 1,
            height: 1,
            data: color.to_vec(),
            name: name.to_string(),
            color_space: ColorSpace::Linear,
            placeholder: false,
        }
    }

    /// Empty stand-in for a texture that failed to load
    pub fn placeholder(name: &str) -> Self {
        Self {
            placeholder: true,
            ..Self::solid_color([0, 0, 0, 0], name)
        }
    }

    pub fn white() -> Self {
        Self::solid_color([255, 255, 255, 255], "white")
    }

    pub fn black() -> Self {
        Self::solid_color([0, 0, 0, 255], "black")
    }

    /// Flat normal map: (0, 0, 1) in tangent space
    pub fn default_normal() -> Self {
        Self::solid_color([128, 128, 255, 255], "default_normal")
    }

    /// Downscale so neither side exceeds `max_dimension`, keeping the aspect
    /// ratio. Textures that already fit are returned unchanged.
    pub fn fit_within(self, max_dimension: u32) -> Self {
        let max_dimension = max_dimension.max(1);
        if self.width <= max_dimension && self.height <= max_dimension {
            return self;
        }
        let scale = max_dimension as f32 / self.width.max(self.height) as f32;
        let width = ((self.width as f32 * scale).round() as u32).clamp(1, max_dimension);
        let height = ((self.height as f32 * scale).round() as u32).clamp(1, max_dimension);

        let Some(img) = RgbaImage::from_raw(self.width, self.height, self.data.clone()) else {
            log::warn!("Texture {} has inconsistent size, using a placeholder", self.name);
            return Self::placeholder(&self.name);
        };
        log::info!(
            "Downscaling texture {} from {}x{} to {}x{}",
            self.name,
            self.width,
            self.height,
            width,
            height
        );
        let resized = image::imageops::resize(&img, width, height, FilterType::Triangle);
        Self {
            width,
            height,
            data: resized.into_raw(),
            ..self
        }
    }
}
