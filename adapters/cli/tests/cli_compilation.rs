use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "rope-timer"])
        .status()
        .expect("failed to invoke cargo check for rope-timer CLI binary");

    assert!(status.success(), "cargo check --bin rope-timer should succeed");
}

#[test]
fn cli_solves_the_default_puzzle() {
    let output = Command::new(env!("CARGO_BIN_EXE_rope-timer"))
        .args(["--speed", "3600", "--format", "json"])
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run rope-timer binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"target_reached\": true"), "{stdout}");
    assert!(stdout.contains("\"elapsed\": \"45:00\""), "{stdout}");
}
