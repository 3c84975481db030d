use std::{
    path::{Path, PathBuf},
    process::{Command, Output},
};

fn demo(file: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos")
        .join(file)
}

fn path_defence(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_path-defence"))
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .expect("failed to launch the path-defence binary")
}

#[test]
fn help_lists_every_flag() {
    let output = path_defence(&["--help"]);
    assert!(output.status.success());

    let help = String::from_utf8_lossy(&output.stdout);
    for flag in ["--config", "--waves", "--duration-secs", "--wave-gap-ms"] {
        assert!(help.contains(flag), "help text is missing {flag}");
    }
}

#[test]
fn demo_run_prints_a_summary() {
    let config = demo("config.toml");
    let waves = demo("waves.txt");
    let output = path_defence(&[
        "--config",
        config.to_str().expect("demo path is utf-8"),
        "--waves",
        waves.to_str().expect("demo path is utf-8"),
        "--duration-secs",
        "1",
        "--wave-gap-ms",
        "10",
    ]);

    assert!(output.status.success(), "demo run exits cleanly");
    let summary = String::from_utf8_lossy(&output.stdout);
    assert!(summary.contains("waves released: 4"), "summary: {summary}");
    assert!(summary.contains("17 spawned"), "summary: {summary}");
}

#[test]
fn missing_wave_file_fails_with_context() {
    let output = path_defence(&["--waves", "/nonexistent/path-defence/waves.txt"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("failed to load waves from"),
        "stderr: {stderr}"
    );
}
