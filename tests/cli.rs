//! Argument handling of the two viewer binaries

use std::process::Command;

fn run(binary: &str, args: &[&str]) -> std::process::Output {
    Command::new(binary)
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("binary should start")
}

#[test]
fn test_texturing_without_arguments_prints_usage() {
    let output = run(env!("CARGO_BIN_EXE_pbr_skybox_texturing"), &[]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("usage: pbr_skybox_texturing path albedo_fn normal_fn material_fn emissive_fn [surface]"));
}

#[test]
fn test_texturing_with_too_few_arguments_prints_usage() {
    let output = run(
        env!("CARGO_BIN_EXE_pbr_skybox_texturing"),
        &["skyboxes/skybox2", "albedo.png", "normal.png", "orm.png"],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("emissive_fn"));
}

#[test]
fn test_texturing_rejects_unknown_skybox_folder() {
    let output = run(
        env!("CARGO_BIN_EXE_pbr_skybox_texturing"),
        &["skyboxes/skybox9", "a.png", "n.png", "m.png", "e.png"],
    );
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ReadCubeMap(): invalid key, unable to continue."));
}

#[test]
fn test_skybox_without_arguments_prints_usage() {
    let output = run(env!("CARGO_BIN_EXE_skybox_pbr"), &[]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("usage: skybox_pbr path [surface]"));
    assert!(output.stderr.is_empty());
}

#[test]
fn test_fatal_error_is_reported_once() {
    let output = Command::new(env!("CARGO_BIN_EXE_pbr_skybox_texturing"))
        .args(["skyboxes/skybox9", "a.png", "n.png", "m.png", "e.png"])
        .env_remove("RUST_LOG")
        .output()
        .expect("binary should start");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("invalid key, unable to continue").count(), 1);
}
