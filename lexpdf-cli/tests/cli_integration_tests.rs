//! Integration tests for the lexpdf CLI
//!
//! Tests command-line interface functionality including:
//! - Token dumps with and without options
//! - Xref offset recovery
//! - Error handling for missing and malformed files

use anyhow::Result;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::{tempdir, TempDir};

/// Test helper to get the CLI binary path
fn get_cli_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_lexpdf"))
}

/// Test helper to create a temporary directory
fn setup_temp_dir() -> TempDir {
    tempdir().expect("Failed to create temp directory")
}

/// Test helper to run CLI command and return output
fn run_cli_command(args: &[&str]) -> Result<Output> {
    let output = Command::new(get_cli_path())
        .args(args)
        .env_remove("RUST_LOG")
        .output()?;
    Ok(output)
}

fn write_fixture(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write fixture");
    path
}

fn sample_pdf() -> Vec<u8> {
    let mut pdf = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n".to_vec();
    let xref = pdf.len();
    pdf.extend_from_slice(b"xref\n0 2\n0000000000 65535 f \n0000000009 00000 n \n");
    pdf.extend_from_slice(b"trailer\n<< /Size 2 /Root 1 0 R >>\n");
    pdf.extend_from_slice(format!("startxref\n{xref}\n%%EOF\n").as_bytes());
    pdf
}

fn token_lines(stdout: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_cli_tokens_command() {
    let temp_dir = setup_temp_dir();
    let path = write_fixture(temp_dir.path(), "dict.pdf", b"<< /Type /Page /Parent 3 0 R >>");

    let output = run_cli_command(&["tokens", path.to_str().unwrap()]).unwrap();
    assert!(output.status.success());
    assert_eq!(
        token_lines(&output.stdout),
        vec!["<<", "/", "Type", "/", "Page", "/", "Parent", "3 0 R", ">>"]
    );
}

#[test]
fn test_cli_tokens_with_seek_and_limit() {
    let temp_dir = setup_temp_dir();
    let path = write_fixture(temp_dir.path(), "seek.pdf", b"junk junk a b c d e");

    let output = run_cli_command(&[
        "tokens",
        path.to_str().unwrap(),
        "--seek",
        "10",
        "--limit",
        "2",
    ])
    .unwrap();
    assert!(output.status.success());
    assert_eq!(token_lines(&output.stdout), vec!["a", "b"]);
}

#[test]
fn test_cli_tokens_stream_body_summary() {
    let temp_dir = setup_temp_dir();
    let path = write_fixture(
        temp_dir.path(),
        "stream.pdf",
        b"stream\r\n\x00\x01\x02\x03\r\nendstream",
    );

    let output = run_cli_command(&["tokens", path.to_str().unwrap()]).unwrap();
    assert!(output.status.success());
    assert_eq!(
        token_lines(&output.stdout),
        vec!["stream", "[stream body: 4 bytes]", "endstream"]
    );
}

#[test]
fn test_cli_xref_offset_command() {
    let temp_dir = setup_temp_dir();
    let pdf = sample_pdf();
    let path = write_fixture(temp_dir.path(), "sample.pdf", &pdf);

    let output = run_cli_command(&["xref-offset", path.to_str().unwrap()]).unwrap();
    assert!(output.status.success());

    let expected = pdf
        .windows(4)
        .position(|w| w == b"xref")
        .expect("fixture has an xref section");
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        expected.to_string()
    );
}

#[test]
fn test_cli_xref_offset_empty_file() {
    let temp_dir = setup_temp_dir();
    let path = write_fixture(temp_dir.path(), "empty.pdf", b"");

    let output = run_cli_command(&["xref-offset", path.to_str().unwrap()]).unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("PDF file is empty"), "stderr: {stderr}");
}

#[test]
fn test_cli_xref_offset_missing_marker() {
    let temp_dir = setup_temp_dir();
    let path = write_fixture(temp_dir.path(), "cut.pdf", b"%PDF-1.4\nstartxref\n10\n");

    let output = run_cli_command(&["xref-offset", path.to_str().unwrap()]).unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("EOF marker"), "stderr: {stderr}");
}

#[test]
fn test_cli_missing_input_file() {
    let temp_dir = setup_temp_dir();
    let missing = temp_dir.path().join("nope.pdf");

    let output = run_cli_command(&["tokens", missing.to_str().unwrap()]).unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to open"));
}

#[test]
fn test_cli_help() {
    let output = run_cli_command(&["--help"]).unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tokens"));
    assert!(stdout.contains("xref-offset"));
}
