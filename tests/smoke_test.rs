/// Smoke tests to verify the binary runs without panicking
use std::fs;
use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_latency-globe"))
        .args(args)
        .output()
        .expect("Failed to execute latency-globe")
}

#[test]
fn binary_shows_help() {
    let output = run(&["--help"]);

    assert!(
        output.status.success(),
        "Binary failed to run --help: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("latency-globe"), "Help output should mention latency-globe");
    for sub in ["globe", "export", "heatmap", "history"] {
        assert!(stdout.contains(sub), "Help output should list {sub}");
    }
}

#[test]
fn binary_shows_version() {
    let output = run(&["--version"]);

    assert!(
        output.status.success(),
        "Binary failed to run --version: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn invalid_subcommand_fails_gracefully() {
    let output = run(&["nonexistent-command"]);

    assert!(!output.status.success(), "Invalid subcommand should return error status");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("panicked at"), "Invalid subcommand should not cause panic");
}

#[test]
fn export_writes_one_row_per_pair() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&["export", "--dir", dir.path().to_str().unwrap(), "--seed", "7"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
    assert!(path.contains("latency-data-"));
    let csv = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "From,To,Latency (ms),Timestamp");
    assert_eq!(lines.len(), 29);
}

#[test]
fn heatmap_writes_png() {
    let dir = tempfile::tempdir().unwrap();
    let png = dir.path().join("heat.png");
    let output = run(&["heatmap", "--output", png.to_str().unwrap(), "--size", "64", "--seed", "3"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let bytes = fs::read(&png).unwrap();
    assert_eq!(&bytes[..4], b"\x89PNG");
}

#[test]
fn heatmap_rejects_oversized_texture() {
    let dir = tempfile::tempdir().unwrap();
    let png = dir.path().join("huge.png");
    let output = run(&["heatmap", "--output", png.to_str().unwrap(), "--size", "100000"]);
    assert!(!output.status.success(), "Oversized texture should return error status");
    assert!(!String::from_utf8_lossy(&output.stderr).contains("panicked at"));
    assert!(!png.exists());
}

#[test]
fn history_prints_stats() {
    let output = run(&["history", "--from", "binance-tokyo", "--to", "okx-singapore", "--range", "24h", "--seed", "1"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("binance-tokyo -> okx-singapore (24h)"));
    assert!(stdout.contains("Min") && stdout.contains("Max") && stdout.contains("Avg"));
    assert_eq!(stdout.lines().count(), 145 + 2);
}

#[test]
fn history_rejects_unknown_link() {
    let output = run(&["history", "--from", "nowhere", "--to", "binance-tokyo"]);
    assert!(!output.status.success());
    assert!(!String::from_utf8_lossy(&output.stderr).contains("panicked at"));
}
