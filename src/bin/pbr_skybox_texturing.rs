//! # PBR Skybox Texturing
//!
//! A textured PBR surface lit by image based lighting, in front of a skybox.
//! The environment is either a skybox folder of six `.jpg` faces or a single
//! equirectangular `.hdr`/`.png`/`.jpg` image.

use std::process::ExitCode;
use std::sync::Arc;

use pbr_skybox::cli::{EnvironmentSource, TexturingArgs};
use pbr_skybox::resources::{ColorSpace, EnvironmentMap, PbrMaterial, SkyboxFolder, TextureData};
use pbr_skybox::scene::Scene;
use pbr_skybox::surfaces::build_surface;
use pbr_skybox::ui::{ParameterRouter, SliderController};
use pbr_skybox::{
    init_logging, Variant, Viewer, ViewerConfig, ViewerError, ViewerProfile, ViewerResult,
};

fn load_environment(source: &EnvironmentSource, max_face_size: u32) -> ViewerResult<EnvironmentMap> {
    match source {
        EnvironmentSource::EquirectangularFile(path) => {
            Ok(EnvironmentMap::load_equirectangular(path, max_face_size))
        }
        EnvironmentSource::CubemapFolder { root, folder } => {
            let naming = SkyboxFolder::from_name(folder).ok_or(ViewerError::InvalidCubemapKey)?;
            Ok(EnvironmentMap::from_face_files(&naming.paths(root), max_face_size))
        }
    }
}

fn load_material(args: &TexturingArgs, profile: &ViewerProfile) -> PbrMaterial {
    PbrMaterial::new("textured", profile.material)
        .with_base_color_texture(TextureData::load(&args.albedo).with_color_space(ColorSpace::Srgb))
        .with_normal_texture(TextureData::load(&args.normal))
        .with_orm_texture(TextureData::load(&args.material))
        .with_emissive_texture(
            TextureData::load(&args.emissive).with_color_space(ColorSpace::Srgb),
        )
}

fn run() -> ViewerResult<()> {
    let args = TexturingArgs::parse_from_args(std::env::args_os())?;
    let profile = ViewerProfile::for_variant(Variant::Texturing);
    let config = args.window.apply(ViewerConfig {
        title: profile.title.to_string(),
        width: profile.width,
        height: profile.height,
        ..Default::default()
    });

    let environment = load_environment(&args.environment(), config.max_environment_face_size)?;
    let material = load_material(&args, &profile);
    let mesh = build_surface(args.surface_kind(), profile.variant);
    log::info!(
        "{} with {} vertices, {} triangles",
        args.surface_kind().name(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );

    let parameters = Arc::clone(&material.parameters);
    let scene = Scene::assemble(&profile, mesh, material, Arc::new(environment));
    let router = ParameterRouter::new(parameters, Arc::clone(&scene.tone_mapping));
    let sliders = SliderController::new(profile.sliders.clone(), Box::new(router));

    Viewer::new(config, scene, sliders).run()
}

fn main() -> ExitCode {
    init_logging();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => e.report(),
    }
}
