//! End-to-end tests that exercise the actual `lispy` binary: script-loading
//! mode against temp files, and the bare `--help`/`--version` surface.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn script(src: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().expect("failed to create temp script");
    write!(f, "{src}").expect("failed to write temp script");
    f
}

#[test]
fn version_flag_reports_the_binary_name() {
    let mut cmd = Command::cargo_bin("lispy").unwrap();
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("lispy"));
}

#[test]
fn help_flag_documents_the_script_argument() {
    let mut cmd = Command::cargo_bin("lispy").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn loads_and_runs_a_script_with_definitions() {
    let f = script(
        r#"
        (def {add-up} (-> {& xs} (if (== (len xs) 0) {0} {+ (eval (head xs)) (eval (cons add-up (tail xs)))})))
        (print (add-up 1 2 3 4))
        "#,
    );
    let mut cmd = Command::cargo_bin("lispy").unwrap();
    cmd.arg(f.path());
    cmd.assert().success();
}

#[test]
fn missing_script_file_fails_with_a_nonzero_exit_code() {
    let mut cmd = Command::cargo_bin("lispy").unwrap();
    cmd.arg("/nonexistent/path/to/a/script.lispy");
    cmd.assert().failure();
}

#[test]
fn runtime_errors_in_a_script_still_exit_successfully() {
    // A runtime Error Value is printed as a diagnostic, not a process failure:
    // Lispy treats errors as first-class data, not exceptions.
    let f = script("(head {})");
    let mut cmd = Command::cargo_bin("lispy").unwrap();
    cmd.arg(f.path());
    cmd.assert().success();
}

#[test]
fn script_definitions_are_visible_to_later_top_level_forms() {
    let f = script("(def {x} 10) (def {y} 32) (print (+ x y))");
    let mut cmd = Command::cargo_bin("lispy").unwrap();
    cmd.arg(f.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("42"));
}
