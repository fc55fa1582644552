use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "blast-arena"])
        .status()
        .expect("failed to invoke cargo check for blast-arena CLI binary");

    assert!(status.success(), "cargo check --bin blast-arena should succeed");
}

#[test]
fn encoded_layouts_load_back_unchanged() {
    let encoded = run_blast_arena(&["encode"]);
    assert!(
        encoded.starts_with("arena:v1:13x11:"),
        "unexpected snapshot {encoded}"
    );

    let reencoded = run_blast_arena(&["--layout", &encoded, "encode"]);
    assert_eq!(reencoded, encoded);
}

fn run_blast_arena(args: &[&str]) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_blast-arena"))
        .args(args)
        .output()
        .expect("failed to run the blast-arena binary");
    assert!(output.status.success(), "blast-arena {args:?} failed");
    String::from_utf8(output.stdout)
        .expect("stdout is utf-8")
        .trim()
        .to_owned()
}
