//! Exercises the `impc` binary end to end, per the CLI contract in `main.rs`.

use std::fs;
use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn write_source(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn compiles_a_valid_program_and_writes_output() {
    let input = write_source("return 0");
    let output_dir = tempfile::tempdir().unwrap();
    let output_path = output_dir.path().join("out.ll");

    Command::cargo_bin("impc")
        .unwrap()
        .arg(input.path())
        .arg(&output_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("compiled successfully"));

    let ir = fs::read_to_string(&output_path).unwrap();
    assert!(ir.contains("define i32 @main"));
}

#[test]
fn missing_input_file_exits_nonzero() {
    let output_dir = tempfile::tempdir().unwrap();
    let output_path = output_dir.path().join("out.ll");

    Command::cargo_bin("impc")
        .unwrap()
        .arg("/no/such/file.imp")
        .arg(&output_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn semantic_error_exits_nonzero_with_a_marked_message() {
    let input = write_source("return x");
    let output_dir = tempfile::tempdir().unwrap();
    let output_path = output_dir.path().join("out.ll");

    Command::cargo_bin("impc")
        .unwrap()
        .arg(input.path())
        .arg(&output_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn emit_ast_flag_dumps_to_stderr() {
    let input = write_source("return 0");
    let output_dir = tempfile::tempdir().unwrap();
    let output_path = output_dir.path().join("out.ll");

    Command::cargo_bin("impc")
        .unwrap()
        .arg(input.path())
        .arg(&output_path)
        .arg("--emit-ast")
        .assert()
        .success()
        .stderr(predicate::str::contains("Program"));
}
