// Copyright (c) 2018 Fabian Schuiki

//! Tests that run the `gramlab` binary on grammar files.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn write_grammar(name: &str, text: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("gramlab-{}-{}.g", name, std::process::id()));
    fs::write(&path, text).unwrap();
    path
}

fn gramlab(grammar: &PathBuf, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gramlab"))
        .arg(grammar)
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn reads_grammar_file() {
    let path = write_grammar("cnf", "S : A B ; A : 'a' ; B : 'b' ;");
    let out = gramlab(&path, &["cyk", "ab"]);
    fs::remove_file(&path).unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.starts_with("accepted\n"), "stdout: {}", stdout);
}

#[test]
fn empty_file_is_empty_grammar() {
    let path = write_grammar("empty", "");
    let out = gramlab(&path, &["info"]);
    fs::remove_file(&path).unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert_eq!(stderr, "error: grammar has no rules\n");
}

#[test]
fn missing_file_fails() {
    let path = std::env::temp_dir().join("gramlab-does-not-exist.g");
    let out = gramlab(&path, &["info"]);
    assert!(!out.status.success());
}
