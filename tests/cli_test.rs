//! End-to-end tests for the `domwalk` binary.

#![cfg(feature = "cli")]

use std::io::Write;
use std::process::{Command, Output};

use tempfile::NamedTempFile;

const PAGE: &str = r#"<!DOCTYPE html>
<html><body>
  <section class="grid" id="grid">
    <article class="card featured" id="a1"><button id="like">Like</button></article>
    <article class="card" id="a2"></article>
  </section>
</body></html>"#;

fn page_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(PAGE.as_bytes()).unwrap();
    file
}

fn domwalk(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_domwalk"))
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn test_prints_start_element() {
    let file = page_file();
    let path = file.path().to_str().unwrap();

    let output = domwalk(&[path, "--start", ".featured"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "article#a1.card.featured");
}

#[test]
fn test_applies_path() {
    let file = page_file();
    let path = file.path().to_str().unwrap();

    let output = domwalk(&[path, "-s", "#like", "-p", "closest(.card)/next"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "article#a2.card");

    let output = domwalk(&[path, "-s", "#a2", "-p", "next"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "null");
}

#[test]
fn test_children_listing() {
    let file = page_file();
    let path = file.path().to_str().unwrap();

    let output = domwalk(&[path, "-s", "#grid", "--children"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "article#a1.card.featured\narticle#a2.card");
}

#[test]
fn test_missing_target_prints_null() {
    let file = page_file();
    let path = file.path().to_str().unwrap();

    for extra in [&["--children"][..], &["--json"], &["--children", "--json"]] {
        let mut args = vec![path, "-s", "#a2", "-p", "next"];
        args.extend_from_slice(extra);
        let output = domwalk(&args);
        assert!(output.status.success());
        assert_eq!(stdout(&output), "null");
    }
}

#[test]
fn test_json_output() {
    let file = page_file();
    let path = file.path().to_str().unwrap();

    let output = domwalk(&[path, "-s", "#like", "-p", "parent", "--json"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["tag"], "article");
    assert_eq!(value["id"], "a1");
    assert_eq!(value["classes"], serde_json::json!(["card", "featured"]));
    assert_eq!(value["index"], 0);

    let output = domwalk(&[path, "-s", "#grid", "--children", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value.as_array().map(Vec::len), Some(2));
    assert_eq!(value[1]["index"], 1);
}

#[test]
fn test_errors_exit_nonzero() {
    let file = page_file();
    let path = file.path().to_str().unwrap();

    let no_match = domwalk(&[path, "-s", "table"]);
    assert!(!no_match.status.success());
    assert!(String::from_utf8_lossy(&no_match.stderr).contains("error:"));

    let bad_path = domwalk(&[path, "-s", "#like", "-p", "sideways"]);
    assert!(!bad_path.status.success());

    let missing = domwalk(&["/nonexistent/page.html", "-s", "p"]);
    assert!(!missing.status.success());
}
