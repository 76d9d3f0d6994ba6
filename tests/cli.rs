//! Tests for the `htmlshot` command line renderer
#![cfg(feature = "cdp")]

use std::process::Command;

fn htmlshot() -> Command {
    Command::new(env!("CARGO_BIN_EXE_htmlshot"))
}

#[test]
fn test_missing_input_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.png");

    let status = htmlshot()
        .arg("--input")
        .arg(dir.path().join("does-not-exist.html"))
        .arg("--output")
        .arg(&output)
        .status()
        .expect("run htmlshot");

    assert!(!status.success());
    assert_eq!(status.code(), Some(1));
    assert!(!output.exists());
}

#[test]
fn test_directory_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.png");

    let status = htmlshot()
        .arg("-i")
        .arg(dir.path())
        .arg("-o")
        .arg(&output)
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(1));
    assert!(!output.exists());
}

#[test]
fn test_input_is_required() {
    let output = htmlshot().output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--input"));
}

#[test]
fn test_quality_out_of_range() {
    let output = htmlshot().args(["-i", "page.html", "-q", "101"]).output().unwrap();
    assert!(!output.status.success());
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_renders_html_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("page.html");
    let output = dir.path().join("page.png");
    std::fs::write(&input, "<html><body><h1>htmlshot</h1></body></html>").unwrap();
    std::fs::write(&output, b"stale").unwrap();

    let status = htmlshot()
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .arg("--no-sandbox")
        .status()
        .unwrap();

    assert!(status.success());
    let image = std::fs::read(&output).unwrap();
    assert!(image.len() > 5, "output should be overwritten with the image");
    // JPEG at the default quality
    assert_eq!(&image[..2], &[0xFF, 0xD8]);
}
