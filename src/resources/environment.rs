//! Environment cube maps
//!
//! An [`EnvironmentMap`] is six square faces of linear RGB radiance in
//! +X, -X, +Y, -Y, +Z, -Z order. Face texel (0, 0) is the top-left corner as
//! seen from the cube's centre, which is the row order `image` decodes and
//! the order wgpu samples cube textures in.
//!
//! Two ways of building one:
//! - six face images, named either by a skybox folder ([`SkyboxFolder`]) or by
//!   a naming convention ([`CubemapNaming`])
//! - one equirectangular image projected onto the six faces

use std::f32::consts::PI;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use glam::{Vec2, Vec3};
use image::{DynamicImage, Rgb32FImage};

use crate::cli::{extension_of, join_folder};
use crate::error::{ViewerError, ViewerResult};

/// Extensions decoded by the generic (8-bit) decoder.
pub const LDR_ENVIRONMENT_EXTENSIONS: [&str; 2] = [".jpg", ".png"];

/// Extensions decoded by the Radiance HDR decoder.
pub const HDR_EXTENSIONS: [&str; 2] = [".hdr", ".pic"];

/// Smallest face produced by equirectangular projection.
const MIN_PROJECTED_FACE_SIZE: u32 = 16;

/// Face naming of the skybox folders shipped with the textured viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkyboxFolder {
    Skybox0,
    Skybox1,
    Skybox2,
}

impl SkyboxFolder {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "skybox0" => Some(Self::Skybox0),
            "skybox1" => Some(Self::Skybox1),
            "skybox2" => Some(Self::Skybox2),
            _ => None,
        }
    }

    /// Face file names in +X, -X, +Y, -Y, +Z, -Z order.
    pub fn file_names(self) -> [&'static str; 6] {
        match self {
            Self::Skybox0 => [
                "right.jpg",
                "left.jpg",
                "top.jpg",
                "bottom.jpg",
                "front.jpg",
                "back.jpg",
            ],
            Self::Skybox1 => [
                "skybox-px.jpg",
                "skybox-nx.jpg",
                "skybox-py.jpg",
                "skybox-ny.jpg",
                "skybox-pz.jpg",
                "skybox-nz.jpg",
            ],
            Self::Skybox2 => [
                "posx.jpg",
                "negx.jpg",
                "posy.jpg",
                "negy.jpg",
                "posz.jpg",
                "negz.jpg",
            ],
        }
    }

    /// Full face paths inside `folder`.
    pub fn paths(self, folder: &str) -> [String; 6] {
        self.file_names().map(|name| join_folder(folder, name))
    }
}

/// Face naming convention selected by a numeric key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubemapNaming {
    /// right, left, top, bottom, front, back
    Sides,
    /// posx, negx, posy, negy, posz, negz
    PosNeg,
    /// -px, -nx, -py, -ny, -pz, -nz
    AxisSuffix,
    /// 0 to 5
    Numbered,
}

impl CubemapNaming {
    pub fn from_key(key: i32) -> ViewerResult<Self> {
        match key {
            0 => Ok(Self::Sides),
            1 => Ok(Self::PosNeg),
            2 => Ok(Self::AxisSuffix),
            3 => Ok(Self::Numbered),
            _ => Err(ViewerError::InvalidCubemapKey),
        }
    }

    pub fn face_names(self) -> [&'static str; 6] {
        match self {
            Self::Sides => ["right", "left", "top", "bottom", "front", "back"],
            Self::PosNeg => ["posx", "negx", "posy", "negy", "posz", "negz"],
            Self::AxisSuffix => ["-px", "-nx", "-py", "-ny", "-pz", "-nz"],
            Self::Numbered => ["0", "1", "2", "3", "4", "5"],
        }
    }

    /// `root + file_root + name + ext` for every face.
    pub fn file_names(self, root: &str, file_root: &str, ext: &str) -> [String; 6] {
        self.face_names()
            .map(|name| format!("{root}{file_root}{name}{ext}"))
    }
}

/// Direction through the centre of texel (x, y) of a cube face.
pub fn cubemap_dir(face: usize, x: u32, y: u32, size: u32) -> Vec3 {
    let u = (x as f32 + 0.5) / size as f32 * 2.0 - 1.0;
    let v = (y as f32 + 0.5) / size as f32 * 2.0 - 1.0;
    face_dir(face, u, v)
}

/// Direction for face coordinates in [-1, 1].
fn face_dir(face: usize, u: f32, v: f32) -> Vec3 {
    let dir = match face {
        0 => Vec3::new(1.0, -v, -u),  // +X
        1 => Vec3::new(-1.0, -v, u),  // -X
        2 => Vec3::new(u, 1.0, v),    // +Y
        3 => Vec3::new(u, -1.0, -v),  // -Y
        4 => Vec3::new(u, -v, 1.0),   // +Z
        _ => Vec3::new(-u, -v, -1.0), // -Z
    };
    dir.normalize()
}

/// Inverse of [`cubemap_dir`]: face index and face coordinates in [0, 1].
pub fn direction_to_face_uv(dir: Vec3) -> (usize, Vec2) {
    let a = dir.abs();
    let (face, sc, tc, ma) = if a.x >= a.y && a.x >= a.z {
        if dir.x > 0.0 {
            (0, -dir.z, -dir.y, a.x)
        } else {
            (1, dir.z, -dir.y, a.x)
        }
    } else if a.y >= a.z {
        if dir.y > 0.0 {
            (2, dir.x, dir.z, a.y)
        } else {
            (3, dir.x, -dir.z, a.y)
        }
    } else if dir.z > 0.0 {
        (4, dir.x, -dir.y, a.z)
    } else {
        (5, -dir.x, -dir.y, a.z)
    };
    let ma = ma.max(f32::EPSILON);
    (face, Vec2::new(sc / ma + 1.0, tc / ma + 1.0) * 0.5)
}

/// sRGB transfer function to linear.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Six-face linear radiance cube map
#[derive(Debug, Clone)]
pub struct EnvironmentMap {
    pub face_size: u32,
    pub faces: [Vec<Vec3>; 6],
}

impl EnvironmentMap {
    /// Every face filled with one colour
    pub fn uniform(color: Vec3, face_size: u32) -> Self {
        let face_size = face_size.max(1);
        let texels = (face_size * face_size) as usize;
        Self {
            face_size,
            faces: std::array::from_fn(|_| vec![color; texels]),
        }
    }

    /// Stand-in for an environment that could not be read
    pub fn black() -> Self {
        Self::uniform(Vec3::ZERO, 1)
    }

    /// Build from one function of direction.
    pub fn from_fn(face_size: u32, f: impl Fn(Vec3) -> Vec3) -> Self {
        let face_size = face_size.max(1);
        let faces = std::array::from_fn(|face| {
            let mut texels = Vec::with_capacity((face_size * face_size) as usize);
            for y in 0..face_size {
                for x in 0..face_size {
                    texels.push(f(cubemap_dir(face, x, y, face_size)));
                }
            }
            texels
        });
        Self { face_size, faces }
    }

    /// Load six face images in +X, -X, +Y, -Y, +Z, -Z order.
    ///
    /// Faces are resampled to the size of the first readable face, capped at
    /// `max_face_size`. A face that cannot be read is reported and left black.
    pub fn from_face_files<P: AsRef<Path>>(paths: &[P; 6], max_face_size: u32) -> Self {
        let images: Vec<Option<Rgb32FImage>> = paths
            .iter()
            .map(|path| {
                let path = path.as_ref();
                match image::open(path) {
                    Ok(img) => Some(to_linear_rgb(img)),
                    Err(err) => {
                        log::error!("Unable to read the file: {} ({})", path.display(), err);
                        None
                    }
                }
            })
            .collect();

        let face_size = images
            .iter()
            .flatten()
            .next()
            .map(|img| img.width().max(img.height()))
            .unwrap_or(1)
            .min(max_face_size.max(1));

        let faces = std::array::from_fn(|face| match &images[face] {
            Some(img) => face_texels(img, face_size),
            None => vec![Vec3::ZERO; (face_size * face_size) as usize],
        });

        log::info!("Assembled cube map with {}x{} faces", face_size, face_size);
        Self { face_size, faces }
    }

    /// Load a single equirectangular image and project it onto a cube.
    ///
    /// `.jpg`/`.png` use the generic decoder, `.hdr`/`.pic` the Radiance
    /// decoder after its header has been accepted. Anything else degrades to
    /// a black environment with a diagnostic.
    pub fn load_equirectangular<P: AsRef<Path>>(path: P, max_face_size: u32) -> Self {
        let path = path.as_ref();
        match Self::read_equirectangular(path) {
            Ok(img) => {
                let face_size = (img.width() / 4).clamp(MIN_PROJECTED_FACE_SIZE, max_face_size.max(1));
                log::info!(
                    "Projecting {}x{} equirectangular image onto {}x{} faces",
                    img.width(),
                    img.height(),
                    face_size,
                    face_size
                );
                Self::from_equirectangular(&img, face_size)
            }
            Err(err) => {
                log::error!("{}", err);
                Self::black()
            }
        }
    }

    fn read_equirectangular(path: &Path) -> ViewerResult<Rgb32FImage> {
        let ext = extension_of(path).unwrap_or_default();
        if LDR_ENVIRONMENT_EXTENSIONS.contains(&ext.as_str()) {
            let img = image::open(path).map_err(|e| ViewerError::image(path, e))?;
            return Ok(to_linear_rgb(img));
        }
        if HDR_EXTENSIONS.contains(&ext.as_str()) {
            // Header check first: only commit to decoding files the HDR reader accepts.
            let file = File::open(path).map_err(|e| ViewerError::image(path, e))?;
            image::codecs::hdr::HdrDecoder::new(BufReader::new(file))
                .map_err(|e| ViewerError::image(path, e))?;
            let img = image::io::Reader::open(path)
                .and_then(|reader| reader.with_guessed_format())
                .map_err(|e| ViewerError::image(path, e))?
                .decode()
                .map_err(|e| ViewerError::image(path, e))?;
            return Ok(img.to_rgb32f());
        }
        Err(ViewerError::image(path, "unsupported environment format"))
    }

    /// Project an equirectangular image onto six faces.
    pub fn from_equirectangular(img: &Rgb32FImage, face_size: u32) -> Self {
        Self::from_fn(face_size, |dir| sample_equirect(img, dir))
    }

    /// Bilinear radiance lookup along `dir`.
    pub fn sample(&self, dir: Vec3) -> Vec3 {
        let (face, uv) = direction_to_face_uv(dir);
        let size = self.face_size as i32;
        let texels = &self.faces[face];

        let fx = uv.x * self.face_size as f32 - 0.5;
        let fy = uv.y * self.face_size as f32 - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;

        let fetch = |x: i32, y: i32| {
            let x = x.clamp(0, size - 1);
            let y = y.clamp(0, size - 1);
            texels[(y * size + x) as usize]
        };

        let (x0, y0) = (x0 as i32, y0 as i32);
        let top = fetch(x0, y0).lerp(fetch(x0 + 1, y0), tx);
        let bottom = fetch(x0, y0 + 1).lerp(fetch(x0 + 1, y0 + 1), tx);
        top.lerp(bottom, ty)
    }

    /// Mean radiance over all texels.
    pub fn average(&self) -> Vec3 {
        let count: usize = self.faces.iter().map(Vec::len).sum();
        let sum: Vec3 = self.faces.iter().flatten().copied().sum();
        sum / count.max(1) as f32
    }
}

fn to_linear_rgb(img: DynamicImage) -> Rgb32FImage {
    let is_float = matches!(
        img,
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_)
    );
    let mut rgb = img.to_rgb32f();
    if !is_float {
        for pixel in rgb.pixels_mut() {
            for channel in pixel.0.iter_mut() {
                *channel = srgb_to_linear(*channel);
            }
        }
    }
    rgb
}

fn face_texels(img: &Rgb32FImage, face_size: u32) -> Vec<Vec3> {
    let resized;
    let img = if img.width() == face_size && img.height() == face_size {
        img
    } else {
        resized = image::imageops::resize(
            img,
            face_size,
            face_size,
            image::imageops::FilterType::Triangle,
        );
        &resized
    };
    img.pixels().map(|p| Vec3::from_array(p.0)).collect()
}

fn sample_equirect(img: &Rgb32FImage, dir: Vec3) -> Vec3 {
    let (width, height) = (img.width() as i32, img.height() as i32);
    let inv_atan = Vec2::new(0.5 / PI, 1.0 / PI);
    let uv = Vec2::new(dir.z.atan2(dir.x), dir.y.clamp(-1.0, 1.0).asin()) * inv_atan + 0.5;

    let fx = uv.x * width as f32 - 0.5;
    let fy = (1.0 - uv.y) * height as f32 - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = fx - x0;
    let ty = fy - y0;

    // Wraps around horizontally, clamps at the poles.
    let fetch = |x: i32, y: i32| {
        let x = x.rem_euclid(width) as u32;
        let y = y.clamp(0, height - 1) as u32;
        Vec3::from_array(img.get_pixel(x, y).0)
    };

    let (x0, y0) = (x0 as i32, y0 as i32);
    let top = fetch(x0, y0).lerp(fetch(x0 + 1, y0), tx);
    let bottom = fetch(x0, y0 + 1).lerp(fetch(x0 + 1, y0 + 1), tx);
    top.lerp(bottom, ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("pbr_skybox_env_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_naming_key_one() {
        let names = CubemapNaming::from_key(1).unwrap().file_names("env/", "/", ".jpg");
        assert_eq!(
            names,
            [
                "env//posx.jpg",
                "env//negx.jpg",
                "env//posy.jpg",
                "env//negy.jpg",
                "env//posz.jpg",
                "env//negz.jpg",
            ]
        );
    }

    #[test]
    fn test_naming_other_keys() {
        assert_eq!(
            CubemapNaming::from_key(2).unwrap().file_names("sky", "/box", ".png")[5],
            "sky/box-nz.png"
        );
        assert_eq!(
            CubemapNaming::from_key(3).unwrap().file_names("sky", "/", ".jpg")[0],
            "sky/0.jpg"
        );
        assert_eq!(CubemapNaming::from_key(0).unwrap().face_names()[2], "top");
    }

    #[test]
    fn test_invalid_naming_key() {
        assert!(matches!(
            CubemapNaming::from_key(4),
            Err(ViewerError::InvalidCubemapKey)
        ));
        assert!(matches!(
            CubemapNaming::from_key(-1),
            Err(ViewerError::InvalidCubemapKey)
        ));
    }

    #[test]
    fn test_skybox_folders() {
        assert_eq!(SkyboxFolder::from_name("skybox1"), Some(SkyboxFolder::Skybox1));
        assert_eq!(SkyboxFolder::from_name("skybox3"), None);
        assert_eq!(
            SkyboxFolder::Skybox0.paths("skyboxes/skybox0/")[1],
            "skyboxes/skybox0/left.jpg"
        );
        assert_eq!(
            SkyboxFolder::Skybox2.paths("skyboxes/skybox2")[4],
            "skyboxes/skybox2/posz.jpg"
        );
    }

    #[test]
    fn test_face_lookup_inverts_texel_direction() {
        let size = 8;
        for face in 0..6 {
            for (x, y) in [(0, 0), (3, 5), (7, 7), (6, 1)] {
                let (found, uv) = direction_to_face_uv(cubemap_dir(face, x, y, size));
                assert_eq!(found, face);
                let texel = uv * size as f32 - Vec2::splat(0.5);
                assert!((texel.x - x as f32).abs() < 1e-3, "face {face} x {x}: {texel}");
                assert!((texel.y - y as f32).abs() < 1e-3, "face {face} y {y}: {texel}");
            }
        }
    }

    #[test]
    fn test_uniform_sampling() {
        let env = EnvironmentMap::uniform(Vec3::new(0.25, 0.5, 1.0), 4);
        let sample = env.sample(Vec3::new(0.3, -0.8, 0.2));
        assert!((sample - Vec3::new(0.25, 0.5, 1.0)).length() < 1e-6);
        assert!((env.average() - Vec3::new(0.25, 0.5, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_sample_picks_face() {
        let env = EnvironmentMap::from_fn(4, |dir| {
            if dir.y > 0.9 {
                Vec3::ONE
            } else {
                Vec3::ZERO
            }
        });
        assert_eq!(env.sample(Vec3::Y), Vec3::ONE);
        assert_eq!(env.sample(Vec3::NEG_Y), Vec3::ZERO);
        assert_eq!(env.sample(Vec3::X), Vec3::ZERO);
    }

    #[test]
    fn test_equirect_projection_orientation() {
        // Bright upper half, dark lower half
        let img = Rgb32FImage::from_fn(16, 8, |_, y| {
            if y < 4 {
                Rgb([2.0, 2.0, 2.0])
            } else {
                Rgb([0.0, 0.0, 0.0])
            }
        });
        let env = EnvironmentMap::from_equirectangular(&img, 8);
        assert!(env.sample(Vec3::Y).x > 1.9);
        assert!(env.sample(Vec3::NEG_Y).x < 0.1);
    }

    #[test]
    fn test_face_files_assign_in_order() {
        let colors = [0u8, 50, 100, 150, 200, 255];
        let paths: [std::path::PathBuf; 6] =
            std::array::from_fn(|i| temp_path(&format!("face{i}.png")));
        for (path, c) in paths.iter().zip(colors) {
            RgbImage::from_pixel(2, 2, Rgb([c, c, c])).save(path).unwrap();
        }
        // Drop one face to exercise the black fallback
        std::fs::remove_file(&paths[3]).unwrap();

        let env = EnvironmentMap::from_face_files(&paths, 1024);
        assert_eq!(env.face_size, 2);
        assert_eq!(env.faces[0][0], Vec3::ZERO);
        assert!((env.faces[5][0].x - 1.0).abs() < 1e-6);
        assert!((env.faces[2][0].x - srgb_to_linear(100.0 / 255.0)).abs() < 1e-5);
        assert_eq!(env.faces[3], vec![Vec3::ZERO; 4]);

        for path in &paths {
            std::fs::remove_file(path).ok();
        }
    }

    #[test]
    fn test_face_files_are_capped() {
        let paths: [std::path::PathBuf; 6] =
            std::array::from_fn(|i| temp_path(&format!("large_face{i}.png")));
        for path in &paths {
            RgbImage::from_pixel(64, 64, Rgb([255, 255, 255])).save(path).unwrap();
        }

        let env = EnvironmentMap::from_face_files(&paths, 16);
        assert_eq!(env.face_size, 16);
        for face in &env.faces {
            assert_eq!(face.len(), 16 * 16);
            assert!((face[0].x - 1.0).abs() < 1e-5);
        }

        for path in &paths {
            std::fs::remove_file(path).ok();
        }
    }

    #[test]
    fn test_unsupported_environment_degrades_to_black() {
        let env = EnvironmentMap::load_equirectangular(temp_path("room.exr"), 64);
        assert_eq!(env.face_size, 1);
        assert_eq!(env.average(), Vec3::ZERO);
    }

    #[test]
    fn test_unreadable_hdr_degrades_to_black() {
        let path = temp_path("broken.hdr");
        std::fs::write(&path, b"definitely not radiance").unwrap();
        let env = EnvironmentMap::load_equirectangular(&path, 64);
        assert_eq!(env.face_size, 1);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_png_equirect_face_size() {
        let path = temp_path("pano.png");
        RgbImage::from_pixel(128, 64, Rgb([255, 255, 255])).save(&path).unwrap();
        let env = EnvironmentMap::load_equirectangular(&path, 16);
        assert_eq!(env.face_size, 16);
        assert!((env.average() - Vec3::ONE).length() < 1e-4);
        std::fs::remove_file(path).ok();
    }
}
