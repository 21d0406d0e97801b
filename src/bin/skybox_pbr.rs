//! # Skybox PBR
//!
//! An untextured, mirror-like PBR surface lit by a six-image cube map that
//! also serves as the skybox.

use std::process::ExitCode;
use std::sync::Arc;

use pbr_skybox::cli::{join_folder, SkyboxArgs};
use pbr_skybox::resources::{CubemapNaming, EnvironmentMap, PbrMaterial};
use pbr_skybox::scene::Scene;
use pbr_skybox::surfaces::build_surface;
use pbr_skybox::ui::{ParameterRouter, SliderController};
use pbr_skybox::{init_logging, Variant, Viewer, ViewerConfig, ViewerProfile, ViewerResult};

/// Face naming of the cube map folders this viewer reads (posx, negx, ...).
const CUBEMAP_KEY: i32 = 1;

fn run() -> ViewerResult<()> {
    let args = SkyboxArgs::parse_from_args(std::env::args_os())?;
    let profile = ViewerProfile::for_variant(Variant::Skybox);
    let config = args.window.apply(ViewerConfig {
        title: profile.title.to_string(),
        width: profile.width,
        height: profile.height,
        ..Default::default()
    });

    let naming = CubemapNaming::from_key(CUBEMAP_KEY)?;
    let faces = naming.file_names(&join_folder(&args.path, ""), "", ".jpg");
    let environment = EnvironmentMap::from_face_files(&faces, config.max_environment_face_size);

    let material = PbrMaterial::new("untextured", profile.material);
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
