//! Tests for diagnostic rendering.
//!
//! Each test triggers one error, renders it through ariadne or JSON and
//! checks what a user sees: the code, the message, the label and the help
//! line.

use asyncify_typeck::diagnostics::{render_diagnostic, render_json, DiagnosticOptions};
use asyncify_typeck::{infer, RegistryBuilder, RewriteError};

// ── Helpers ────────────────────────────────────────────────────────────

fn first_error(src: &str) -> RewriteError {
    let registry = RegistryBuilder::new()
        .property("Database", "coll", false, "Collection")
        .shape("Collection")
        .global("db", "Database")
        .build()
        .expect("valid registry");
    let parse = asyncify_parser::parse(src);
    infer(&parse, &registry).expect_err("expected an error")
}

fn render(src: &str) -> String {
    render_diagnostic(&first_error(src), src, "test.js", &DiagnosticOptions::colorless())
}

// ── Ariadne ────────────────────────────────────────────────────────────

#[test]
fn destructuring_report() {
    let output = render("const { a, b } = db;");
    assert!(output.contains("ASYNC-10001"), "{output}");
    assert!(output.contains("destructuring a `Database` value is not supported"), "{output}");
    assert!(output.contains("this reads from a `Database`"), "{output}");
    assert!(output.contains("test.js"), "{output}");
    assert!(
        output.contains("bind the value to a name and read its members one by one"),
        "{output}"
    );
}

#[test]
fn syntax_report_shows_the_opening_delimiter() {
    let output = render("find(db.coll\n");
    assert!(output.contains("P0001"), "{output}");
    assert!(output.contains("expected `)`"), "{output}");
    assert!(output.contains("argument list opened here"), "{output}");
}

#[test]
fn colorless_output_has_no_escape_codes() {
    let output = render("const [x] = db.coll");
    assert!(!output.contains('\u{1b}'), "{output}");
}

// ── JSON ───────────────────────────────────────────────────────────────

#[test]
fn destructuring_json() {
    let src = "let n = 1\nconst { a } = db.coll";
    let value = render_json(&first_error(src), src, "test.js");
    assert_eq!(
        value,
        serde_json::json!({
            "code": "ASYNC-10001",
            "severity": "error",
            "message": "destructuring a `Collection` value is not supported",
            "file": "test.js",
            "spans": [{
                "start": 16,
                "end": 21,
                "line": 2,
                "column": 7,
                "label": "this reads from a `Collection`",
            }],
            "help": "bind the value to a name and read its members one by one",
        })
    );
}

#[test]
fn syntax_json_carries_the_related_span() {
    let src = "f(";
    let value = render_json(&first_error(src), src, "test.js");
    assert_eq!(value["code"], "P0001");
    assert_eq!(value["message"], "expected `)`");
    assert_eq!(value["spans"][0]["start"], 2);
    assert_eq!(value["spans"][1]["label"], "argument list opened here");
    assert_eq!(value["spans"][1]["column"], 2);
}
