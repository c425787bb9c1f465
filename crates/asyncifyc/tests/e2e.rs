//! End-to-end tests for the asyncifyc binary.
//!
//! Each test writes a script (and sometimes a registry) into a temporary
//! directory, runs the built binary on it and checks stdout, stderr and
//! the exit status.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// Locate the asyncifyc binary built by cargo.
fn asyncifyc_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_asyncifyc"))
}

fn write_script(dir: &Path, name: &str, source: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, source).unwrap();
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(asyncifyc_bin())
        .args(args)
        .output()
        .expect("failed to run asyncifyc")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ── Rewriting ────────────────────────────────────────────────────────

#[test]
fn rewrites_with_the_bundled_registry() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "seed.js",
        "db.users.insertOne({ name: 'a' })\nconst n = db.users.countDocuments()\nprint(n)\n",
    );

    let output = run(&[script.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "await db.users.insertOne({ name: 'a' })\nconst n = await db.users.countDocuments()\nprint(n)\n"
    );
    assert!(stderr(&output).is_empty(), "stderr: {}", stderr(&output));
}

#[test]
fn plain_scripts_pass_through() {
    let dir = tempfile::tempdir().unwrap();
    let source = "const docs = db.users.find({ age: { $gt: 3 } }).limit(2)\nprint(docs)\n";
    let script = write_script(dir.path(), "plain.js", source);

    let output = run(&[script.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), source);
}

#[test]
fn reads_stdin_when_given_a_dash() {
    let mut child = Command::new(asyncifyc_bin())
        .arg("-")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn asyncifyc");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"db.logs.deleteMany({})")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "await db.logs.deleteMany({})");
}

#[test]
fn custom_toml_registry() {
    let dir = tempfile::tempdir().unwrap();
    let registry = dir.path().join("shapes.toml");
    std::fs::write(
        &registry,
        r#"
[globals.store]
kind = "property"
returns = "Store"

[shapes.Store.members.fetch]
deferred = true
returns = "Record"

[shapes.Record.members.save]
deferred = true
"#,
    )
    .unwrap();
    let script = write_script(dir.path(), "job.js", "store.fetch(1).save()\ndb.users.insertOne({})\n");

    let output = run(&["--registry", registry.to_str().unwrap(), script.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "await (await store.fetch(1)).save()\ndb.users.insertOne({})\n"
    );
}

#[test]
fn dump_symbols_goes_to_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "sym.js", "let total = 1\n");

    let output = run(&["--dump-symbols", script.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "let total = 1\n");
    assert_eq!(stderr(&output), "scope 0:\n  total: number\n");
}

// ── Failures ─────────────────────────────────────────────────────────

#[test]
fn destructuring_fails_with_a_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "bad.js", "const { users } = db\n");

    let output = run(&["--no-color", script.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty(), "stdout: {}", stdout(&output));

    let err = stderr(&output);
    assert!(err.contains("ASYNC-10001"), "stderr: {err}");
    assert!(err.contains("destructuring a `Database` value is not supported"), "stderr: {err}");
    assert!(err.contains("bad.js"), "stderr: {err}");
    assert!(!err.contains('\u{1b}'), "stderr: {err}");
}

#[test]
fn syntax_error_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "broken.js", "db.users.insertOne(\n");

    let output = run(&["--json", script.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty(), "stdout: {}", stdout(&output));

    let err = stderr(&output);
    let json: serde_json::Value =
        serde_json::from_str(err.trim_end()).expect("stderr is one JSON object");
    assert_eq!(json["code"], "P0001");
    assert_eq!(json["severity"], "error");
    assert_eq!(json["message"], "expected `)`");
    assert!(json["file"].as_str().unwrap().ends_with("broken.js"));
    assert!(json["spans"].as_array().is_some_and(|s| !s.is_empty()));
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.js");

    let output = run(&[missing.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.starts_with("error: failed to read"), "stderr: {err}");
    assert!(err.contains("nope.js"), "stderr: {err}");
}

#[test]
fn invalid_registry_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let registry = dir.path().join("shapes.json");
    std::fs::write(&registry, r#"{ "shapes": { "A": { "any_member": "Missing" } } }"#).unwrap();
    let script = write_script(dir.path(), "s.js", "x\n");

    let output = run(&["--registry", registry.to_str().unwrap(), script.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.starts_with("error: failed to load registry"), "stderr: {err}");
    assert!(err.contains("Missing"), "stderr: {err}");
}

#[test]
fn unsupported_registry_extension() {
    let dir = tempfile::tempdir().unwrap();
    let registry = dir.path().join("shapes.yaml");
    std::fs::write(&registry, "shapes: {}\n").unwrap();
    let script = write_script(dir.path(), "s.js", "x\n");

    let output = run(&["--registry", registry.to_str().unwrap(), script.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("expected .json or .toml"), "stderr: {}", stderr(&output));
}
