use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "isleweave"])
        .status()
        .expect("failed to invoke cargo check for isleweave CLI binary");

    assert!(status.success(), "cargo check --bin isleweave should succeed");
}

#[test]
fn generate_prints_a_layout_code_that_inspects() {
    let generated = Command::new(env!("CARGO_BIN_EXE_isleweave"))
        .args(["generate", "--seed", "5", "--format", "code"])
        .current_dir(env!("CARGO_TARGET_TMPDIR"))
        .output()
        .expect("failed to run isleweave generate");
    assert!(generated.status.success(), "generate should succeed");

    let code = String::from_utf8(generated.stdout).expect("utf-8 output");
    assert!(code.starts_with("isle:v1:"), "unexpected output: {code}");

    let inspected = Command::new(env!("CARGO_BIN_EXE_isleweave"))
        .args(["inspect", code.trim()])
        .output()
        .expect("failed to run isleweave inspect");
    assert!(inspected.status.success(), "inspect should succeed");
    let preview = String::from_utf8(inspected.stdout).expect("utf-8 output");
    assert!(preview.contains("bridges"));
}

#[test]
fn malformed_codes_fail_with_a_message() {
    let output = Command::new(env!("CARGO_BIN_EXE_isleweave"))
        .args(["inspect", "isle:v2:0:e30"])
        .output()
        .expect("failed to run isleweave inspect");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not supported"), "stderr: {stderr}");
}
