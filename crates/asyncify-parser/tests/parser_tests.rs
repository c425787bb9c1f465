//! Parser integration tests.
//!
//! Each test parses a script and snapshots the debug tree, checking
//! precedence, node nesting and where trivia lands.

use asyncify_parser::{debug_tree, parse};
use insta::assert_snapshot;

fn parse_and_debug(source: &str) -> String {
    let parse = parse(source);
    let tree = debug_tree(&parse.syntax());
    if parse.errors().is_empty() {
        tree
    } else {
        format!(
            "{}errors:\n{}",
            tree,
            parse
                .errors()
                .iter()
                .map(|e| format!("  - {} @{}..{}", e.message, e.span.start, e.span.end))
                .collect::<Vec<_>>()
                .join("\n")
        )
    }
}

// ── Expressions ────────────────────────────────────────────────────────

#[test]
fn member_call_chain() {
    assert_snapshot!(parse_and_debug("db.users.find()"), @r#"
    SOURCE_FILE@0..15
      EXPR_STMT@0..15
        CALL_EXPR@0..15
          MEMBER_EXPR@0..13
            MEMBER_EXPR@0..8
              NAME_REF@0..2
                IDENT@0..2 "db"
              DOT@2..3 "."
              NAME@3..8
                IDENT@3..8 "users"
            DOT@8..9 "."
            NAME@9..13
              IDENT@9..13 "find"
          ARG_LIST@13..15
            L_PAREN@13..14 "("
            R_PAREN@14..15 ")"
    "#);
}

#[test]
fn await_binds_tighter_than_binary_operators() {
    assert_snapshot!(parse_and_debug("await a + b * c"), @r#"
    SOURCE_FILE@0..15
      EXPR_STMT@0..15
        BINARY_EXPR@0..15
          AWAIT_EXPR@0..7
            AWAIT_KW@0..5 "await"
            NAME_REF@6..7
              IDENT@6..7 "a"
          PLUS@8..9 "+"
          BINARY_EXPR@10..15
            NAME_REF@10..11
              IDENT@10..11 "b"
            STAR@12..13 "*"
            NAME_REF@14..15
              IDENT@14..15 "c"
    "#);
}

#[test]
fn arrow_returning_object_literal() {
    assert_snapshot!(parse_and_debug("x => ({ a })"), @r#"
    SOURCE_FILE@0..12
      EXPR_STMT@0..12
        ARROW_FN@0..12
          PARAM_LIST@0..1
            PARAM@0..1
              IDENT_PAT@0..1
                IDENT@0..1 "x"
          FAT_ARROW@2..4 "=>"
          PAREN_EXPR@5..12
            L_PAREN@5..6 "("
            OBJECT_EXPR@6..11
              L_BRACE@6..7 "{"
              PROPERTY@8..9
                NAME_REF@8..9
                  IDENT@8..9 "a"
              R_BRACE@10..11 "}"
            R_PAREN@11..12 ")"
    "#);
}

// ── Statements ─────────────────────────────────────────────────────────

#[test]
fn statements_split_at_line_breaks() {
    assert_snapshot!(parse_and_debug("a = 1\nb"), @r#"
    SOURCE_FILE@0..7
      EXPR_STMT@0..5
        ASSIGN_EXPR@0..5
          NAME_REF@0..1
            IDENT@0..1 "a"
          EQ@2..3 "="
          LITERAL@4..5
            NUMBER@4..5 "1"
      EXPR_STMT@6..7
        NAME_REF@6..7
          IDENT@6..7 "b"
    "#);
}

#[test]
fn for_of_loop() {
    assert_snapshot!(parse_and_debug("for (const d of ds) f(d)"), @r#"
    SOURCE_FILE@0..24
      FOR_IN_STMT@0..24
        FOR_KW@0..3 "for"
        L_PAREN@4..5 "("
        VAR_DECL@5..12
          CONST_KW@5..10 "const"
          DECLARATOR@11..12
            IDENT_PAT@11..12
              IDENT@11..12 "d"
        IDENT@13..15 "of"
        NAME_REF@16..18
          IDENT@16..18 "ds"
        R_PAREN@18..19 ")"
        EXPR_STMT@20..24
          CALL_EXPR@20..24
            NAME_REF@20..21
              IDENT@20..21 "f"
            ARG_LIST@21..24
              L_PAREN@21..22 "("
              NAME_REF@22..23
                IDENT@22..23 "d"
              R_PAREN@23..24 ")"
    "#);
}

// ── Errors ─────────────────────────────────────────────────────────────

#[test]
fn unclosed_argument_list() {
    assert_snapshot!(parse_and_debug("f("), @r#"
    SOURCE_FILE@0..2
      EXPR_STMT@0..2
        CALL_EXPR@0..2
          NAME_REF@0..1
            IDENT@0..1 "f"
          ARG_LIST@1..2
            L_PAREN@1..2 "("
    errors:
      - expected `)` @2..2
    "#);
}

#[test]
fn classes_are_rejected() {
    let parse = parse("class A {}");
    assert_eq!(parse.errors().len(), 1);
    assert_eq!(parse.errors()[0].message, "classes are not supported");
}

// ── Losslessness ───────────────────────────────────────────────────────

#[test]
fn tree_text_matches_source() {
    let sources = [
        "// header\nconst c = db.getCollection('x');\n\nfor (let i = 0; i < 3; i++) {\n  c.insertOne({ i }) /* n */\n}\n",
        "function f(a = 1, ...rest) { return `${a}-${rest.length}` }\r\nf()",
        "const r = /ab+c/gi.test(s) ? x?.y ?? z : [1, , 2]",
        "if (x) {\n  broken(",
    ];
    for source in sources {
        let parse = parse(source);
        assert_eq!(parse.syntax().text().to_string(), source);
    }
}
