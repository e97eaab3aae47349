//! CLI smoke tests: run the binary against real files on disk

use std::fs;
use std::process::Command;

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cpp-header-model"))
}

#[test]
fn test_single_file_outputs_json_object() {
    let dir = tempfile::tempdir().unwrap();
    let header = dir.path().join("point.h");
    fs::write(
        &header,
        "struct Point {\n  int x;\n  int y;\n  double length() const;\n};\n",
    )
    .unwrap();

    let output = binary().arg(&header).arg("--format").arg("json").output().unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["fileName"], "point.h");
    assert_eq!(json["classes"][0]["name"], "Point");
    assert_eq!(json["classes"][0]["stereotype"], "struct");
    assert_eq!(json["classes"][0]["properties"].as_array().unwrap().len(), 2);
    assert_eq!(json["classes"][0]["methods"][0]["name"], "length");
}

#[test]
fn test_multiple_files_output_json_array() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.h");
    let b = dir.path().join("b.h");
    fs::write(&a, "class A {};\n").unwrap();
    fs::write(&b, "class B {};\n").unwrap();

    let output = binary()
        .arg(&a)
        .arg(&b)
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let models = json.as_array().unwrap();
    assert_eq!(models.len(), 2);
    assert_eq!(models[0]["fileName"], "a.h");
    assert_eq!(models[1]["fileName"], "b.h");
}

#[test]
fn test_missing_file_exits_with_code_one() {
    let output = binary().arg("/nonexistent/missing.h").output().unwrap();
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("File not found"));
}

#[test]
fn test_pretty_format_is_default() {
    let dir = tempfile::tempdir().unwrap();
    let header = dir.path().join("c.h");
    fs::write(&header, "class C {};\n").unwrap();

    let output = binary().arg(&header).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    // indented output spans multiple lines
    assert!(stdout.lines().count() > 3);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["classes"][0]["name"], "C");
}

#[test]
fn test_print_ast_dumps_sexp_to_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let header = dir.path().join("d.h");
    fs::write(&header, "class D {};\n").unwrap();

    let output = binary().arg(&header).arg("--print-ast").output().unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("translation_unit"));
}
