use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use shotscribe::capture::{decode_png, encode_png};
use shotscribe::draw::{BLACK, PixelBuffer, WHITE};
use tempfile::TempDir;

fn shotscribe_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("shotscribe").expect("binary exists");
    cmd.env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"));
    cmd
}

fn write_png(path: &Path, image: &PixelBuffer) {
    std::fs::write(path, encode_png(image).unwrap()).unwrap();
}

#[test]
fn help_prints_description() {
    let temp = TempDir::new().unwrap();
    shotscribe_cmd(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Screenshot cropping and annotation tool",
        ));
}

#[test]
fn without_input_prints_usage() {
    let temp = TempDir::new().unwrap();
    shotscribe_cmd(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("shield-block"));
}

#[test]
fn malformed_crop_is_rejected() {
    let temp = TempDir::new().unwrap();
    shotscribe_cmd(temp.path())
        .args(["--input", "shot.png", "--crop", "1,2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected four integers"));
}

#[test]
fn missing_input_fails() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope.png");
    shotscribe_cmd(temp.path())
        .arg("--input")
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to capture"));
}

#[test]
fn crops_and_annotates_into_output() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("shot.png");
    write_png(&input, &PixelBuffer::filled(40, 30, WHITE));

    let script = temp.path().join("notes.toml");
    std::fs::write(
        &script,
        r#"
[[annotation]]
kind = "shield-block"
from = [12, 12]
to = [18, 18]
color = "black"
"#,
    )
    .unwrap();

    let output = temp.path().join("out").join("result.png");
    shotscribe_cmd(temp.path())
        .arg("--input")
        .arg(&input)
        .arg("--annotations")
        .arg(&script)
        .args(["--crop", "10,10,30,25"])
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("result.png"));

    let result = decode_png(&std::fs::read(&output).unwrap()).unwrap();
    assert_eq!(result.size(), (20, 15));
    assert_eq!(result.get(0, 0), Some(WHITE));
    // Script coordinates are screenshot pixels: (15, 15) lands at (5, 5) of the crop.
    assert_eq!(result.get(5, 5), Some(BLACK));
    assert_eq!(result.get(10, 10), Some(WHITE));
}

#[test]
fn default_output_goes_to_configured_directory() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("shot.png");
    write_png(&input, &PixelBuffer::filled(8, 8, WHITE));

    let shots = temp.path().join("shots");
    let config = temp.path().join("config.toml");
    std::fs::write(
        &config,
        format!(
            "[save]\ndirectory = {:?}\nfilename_template = \"annotated\"\n",
            shots.display().to_string()
        ),
    )
    .unwrap();

    shotscribe_cmd(temp.path())
        .arg("--input")
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("annotated.png"));

    assert!(shots.join("annotated.png").exists());
    assert!(
        temp.path()
            .join("data")
            .join("shotscribe")
            .join("preferences.toml")
            .exists()
    );
}
