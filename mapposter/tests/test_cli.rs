// Allow deprecated APIs (assert_cmd::cargo_bin is deprecated but still works)
#![allow(deprecated)]

use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("mapposter-rs")
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn export_cmd(output_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("mapposter").unwrap();
    cmd.arg("export")
        .arg("-i")
        .arg(fixture("paris_heart.json"))
        .arg("-o")
        .arg(output_dir)
        .arg("--size")
        .arg("web")
        .arg("--no-system-fonts");
    cmd
}

#[test]
fn test_styles_lists_registry() -> Result<(), Box<dyn std::error::Error>> {
    Command::cargo_bin("mapposter")?
        .arg("styles")
        .assert()
        .success()
        .stdout(predicate::str::contains("minimal").and(predicate::str::contains("midnight")));
    Ok(())
}

#[test]
fn test_validate_accepts_design() -> Result<(), Box<dyn std::error::Error>> {
    Command::cargo_bin("mapposter")?
        .arg("validate")
        .arg("-i")
        .arg(fixture("paris_heart.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Paris: valid (heart frame, vintage style)"));
    Ok(())
}

#[rstest]
#[case("unknown_shape.json", "unknown variant")]
#[case("future_version.json", "Unsupported design version 2")]
fn test_validate_rejects_design(
    #[case] name: &str,
    #[case] message: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    Command::cargo_bin("mapposter")?
        .arg("validate")
        .arg("-i")
        .arg(fixture(name))
        .assert()
        .failure()
        .stderr(predicate::str::contains(message));
    Ok(())
}

#[test]
fn test_scene_prints_json() -> Result<(), Box<dyn std::error::Error>> {
    let output = Command::cargo_bin("mapposter")?
        .arg("scene")
        .arg("-i")
        .arg(fixture("minimal.json"))
        .output()?;
    assert!(output.status.success());
    let scene: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(scene["title"], "Lisbon");
    assert_eq!(scene["width"], 800);
    assert!(scene["ops"]
        .as_array()
        .unwrap()
        .iter()
        .any(|op| op["type"] == "basemap"));
    Ok(())
}

#[test]
fn test_export_png_and_pdf() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    export_cmd(dir.path())
        .arg("--format")
        .arg("png")
        .arg("--format")
        .arg("pdf")
        .assert()
        .success()
        .stdout(predicate::str::contains("paris-web.png (800x1000 px)"));

    let png = image::open(dir.path().join("paris-web.png"))?;
    assert_eq!((png.width(), png.height()), (800, 1000));
    let pdf = std::fs::read(dir.path().join("paris-web.pdf"))?;
    assert!(pdf.starts_with(b"%PDF"));
    Ok(())
}

#[test]
fn test_export_with_basemap_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let basemap = dir.path().join("basemap.png");
    image::RgbaImage::from_pixel(32, 32, image::Rgba([20, 120, 200, 255])).save(&basemap)?;

    export_cmd(dir.path())
        .arg("--format")
        .arg("jpeg")
        .arg("--basemap-file")
        .arg(&basemap)
        .assert()
        .success();
    assert!(dir.path().join("paris-web.jpg").exists());
    Ok(())
}

#[test]
fn test_unreachable_basemap_still_exports() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    export_cmd(dir.path())
        .arg("--basemap-url")
        .arg("http://127.0.0.1:9/{lat},{lng}.png")
        .assert()
        .success();
    assert!(dir.path().join("paris-web.png").exists());
    Ok(())
}

#[rstest]
#[case(&["--format", "tiff"], "unknown format")]
#[case(&["--size", "3x5"], "unknown size preset")]
fn test_export_rejects_bad_arguments(
    #[case] args: &[&str],
    #[case] message: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    export_cmd(dir.path())
        .args(args)
        .assert()
        .failure()
        .stderr(predicate::str::contains(message));
    Ok(())
}

#[test]
fn test_export_rejects_dpi_out_of_range() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    Command::cargo_bin("mapposter")?
        .arg("export")
        .arg("-i")
        .arg(fixture("minimal.json"))
        .arg("-o")
        .arg(dir.path())
        .arg("--size")
        .arg("8x10")
        .arg("--dpi")
        .arg("1000")
        .arg("--no-system-fonts")
        .assert()
        .failure()
        .stderr(predicate::str::contains("dpi 1000 outside 72..=600"));
    Ok(())
}
