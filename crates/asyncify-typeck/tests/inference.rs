//! Integration tests for deferred-value inference.
//!
//! Each test parses a script, runs inference against a small registry and
//! asserts on the suspension sites, promoted functions or the final symbol
//! table.

use asyncify_typeck::{infer, InferResult, Registry, RegistryBuilder, RewriteError, Ty};
use insta::assert_snapshot;

// ── Helpers ────────────────────────────────────────────────────────────

/// `Collection.find` is deferred, `Collection.toString` is plain,
/// `Database.coll` is a `Collection` and `db` is the global database.
fn registry() -> Registry {
    RegistryBuilder::new()
        .method("Collection", "find", true, "Cursor")
        .method("Collection", "toString", false, "string")
        .shape("Cursor")
        .property("Database", "coll", false, "Collection")
        .global("db", "Database")
        .build()
        .expect("valid registry")
}

fn run(src: &str) -> InferResult {
    let parse = asyncify_parser::parse(src);
    infer(&parse, &registry()).expect("inference succeeds")
}

fn run_err(src: &str) -> RewriteError {
    let parse = asyncify_parser::parse(src);
    infer(&parse, &registry()).expect_err("inference fails")
}

fn text(src: &str, range: rowan::TextRange) -> &str {
    &src[usize::from(range.start())..usize::from(range.end())]
}

fn sites(src: &str) -> Vec<&str> {
    run(src).suspensions.iter().map(|r| text(src, *r)).collect()
}

fn promoted(src: &str) -> Vec<&str> {
    run(src).promoted.iter().map(|r| text(src, *r)).collect()
}

fn dump(src: &str) -> String {
    run(src).symbols.dump()
}

// ── Suspension sites ───────────────────────────────────────────────────

#[test]
fn bound_deferred_call_is_suspended_once() {
    let src = "const c = db.coll.find(); c.toString();";
    assert_eq!(sites(src), vec!["db.coll.find()"]);
    assert_snapshot!(dump(src), @r"
    scope 0:
      c: Cursor
    ");
}

#[test]
fn unknown_callees_are_never_suspended() {
    assert!(sites("other.find(); db.nope.find(); db.coll.toString()").is_empty());
}

#[test]
fn arguments_and_operands_are_consumed() {
    let src = "print(db.coll.find(), [db.coll.find()], `${db.coll.find()}`, !db.coll.find())";
    assert_eq!(sites(src).len(), 4);
}

#[test]
fn for_of_iterable_is_consumed_once() {
    let src = "for (const d of db.coll.find()) { d.find() }";
    assert_eq!(sites(src), vec!["db.coll.find()"]);
}

#[test]
fn wildcard_members_resolve_through_the_builtin_catalogue() {
    let src = "db.users.insertOne({ a: 1 }); db.getCollection('x').find(); db['logs'].count()";
    let parse = asyncify_parser::parse(src);
    let result = infer(&parse, &Registry::builtin()).expect("inference succeeds");
    let sites: Vec<_> = result.suspensions.iter().map(|r| text(src, *r)).collect();
    assert_eq!(sites, vec!["db.users.insertOne({ a: 1 })", "db['logs'].count()"]);
}

// ── Widening ───────────────────────────────────────────────────────────

#[test]
fn branch_assignments_widen_on_disagreement() {
    let src = "if (k) { x = db.coll.find(); } else { x = 1; } x + 1;";
    assert_eq!(sites(src), vec!["db.coll.find()"]);
    assert_snapshot!(dump(src), @r"
    scope 0:
      x: unknown
    ");
}

#[test]
fn branch_assignments_keep_agreement() {
    let src = "let n = 1\nif (k) { n = 2 } else { n = 3 }";
    assert_snapshot!(dump(src), @r"
    scope 0:
      n: number
    ");
}

#[test]
fn logical_operators_join_their_right_operand() {
    let src = "let v = 1\nk && (v = 'a')\nconst o = a || 1";
    assert_snapshot!(dump(src), @r"
    scope 0:
      v: unknown
      o: unknown
    ");
}

#[test]
fn switch_without_default_joins_the_entry_state() {
    let src = "let t = db.coll\nswitch (k) { case 1: t = db.coll; break }\nlet u = db.coll\nswitch (k) { case 1: u = 2; break; default: u = 3 }";
    assert_snapshot!(dump(src), @r"
    scope 0:
      t: Collection
      u: unknown
    ");
}

#[test]
fn finally_runs_after_the_join() {
    let src = "try { t = db.coll } catch (e) { t = db.coll } finally { f = 1 }";
    assert_snapshot!(dump(src), @r"
    scope 0:
      t: Collection
      f: number
    ");
}

#[test]
fn loop_back_edge_widens_before_the_first_iteration() {
    let src = "let c = db.coll\nwhile (k) {\n  c.find()\n  c = 1\n}";
    assert!(sites(src).is_empty());
    assert_snapshot!(dump(src), @r"
    scope 0:
      c: unknown
    ");
}

#[test]
fn loop_without_widening_still_suspends() {
    let src = "for (let i = 0; i < 3; i++) { db.coll.find() }";
    assert_eq!(sites(src), vec!["db.coll.find()"]);
    assert_snapshot!(dump(src), @"scope 0:");
}

#[test]
fn operator_results() {
    let src = "const s = 'a' + 1\nconst n = 1 + 2\nconst u = x + 1\nconst b = n < 2\nconst t = typeof n";
    assert_snapshot!(dump(src), @r"
    scope 0:
      s: string
      n: number
      u: unknown
      b: boolean
      t: string
    ");
}

// ── Scopes ─────────────────────────────────────────────────────────────

#[test]
fn function_scopes_do_not_leak() {
    let src = "function f(a) { let inner = db.coll }\nlet outer = 1\n{ let hidden = 2 }";
    assert_snapshot!(dump(src), @r"
    scope 0:
      f: fn() -> unknown
      outer: number
    ");
}

// ── Functions ──────────────────────────────────────────────────────────

#[test]
fn suspending_function_is_promoted_and_its_calls_suspend() {
    let src = "function load() { return db.coll.find() }\nconst r = load()";
    assert_eq!(sites(src), vec!["db.coll.find()", "load()"]);
    assert_eq!(promoted(src), vec!["function load() { return db.coll.find() }"]);
    assert_snapshot!(dump(src), @r"
    scope 0:
      load: fn() -> Deferred<Cursor>
      r: Cursor
    ");
}

#[test]
fn declarations_are_hoisted_within_their_list() {
    let src = "f();\nfunction f() { db.coll.find() }";
    assert_eq!(sites(src), vec!["f()", "db.coll.find()"]);
    assert_eq!(promoted(src), vec!["function f() { db.coll.find() }"]);

    let src = "function a() { return b() }\nfunction b() { return db.coll.find() }\na()";
    assert_eq!(sites(src), vec!["b()", "db.coll.find()", "a()"]);
    assert_eq!(promoted(src).len(), 2);
}

#[test]
fn hoisted_switch_case_declarations() {
    let src = "switch (k) {\ncase 1: h(); break\ncase 2: function h() { return db.coll.find() }\n}";
    assert_eq!(sites(src), vec!["h()", "db.coll.find()"]);
}

#[test]
fn parameter_defaults_do_not_promote() {
    let src = "function f(a = db.coll.find(), [b] = [db.coll.find()]) { return a }";
    assert!(sites(src).is_empty());
    assert!(promoted(src).is_empty());
    assert_eq!(run(src).symbols.lookup("f"), Ty::callable(Ty::Unknown));
}

#[test]
fn source_async_functions_are_left_as_is() {
    let src = "async function f() { await db.coll.find() }\nf()";
    assert!(sites(src).is_empty());
    assert!(promoted(src).is_empty());
    assert_eq!(run(src).symbols.lookup("f"), Ty::callable(Ty::Unknown));
}

#[test]
fn only_the_function_holding_the_site_is_promoted() {
    let src = "function outer() { const g = () => db.coll.find(); return 1 }";
    assert_eq!(promoted(src), vec!["() => db.coll.find()"]);
    assert_eq!(run(src).symbols.lookup("outer"), Ty::callable(Ty::number()));
}

#[test]
fn object_methods_are_promoted() {
    let src = "const api = { all() { return db.coll.find() } }";
    assert_eq!(promoted(src), vec!["all() { return db.coll.find() }"]);
}

// ── Destructuring ──────────────────────────────────────────────────────

#[test]
fn destructuring_a_shape_is_rejected() {
    let err = run_err("const { a, b } = db;");
    assert_eq!(err.code(), "ASYNC-10001");
    assert_eq!(err.to_string(), "destructuring a `Database` value is not supported");
    assert_eq!(err.span(), rowan::TextRange::new(6.into(), 14.into()));
}

#[test]
fn destructuring_a_resolved_deferred_shape_is_rejected() {
    let err = run_err("let [first] = db.coll.find()");
    assert_eq!(err.to_string(), "destructuring a `Cursor` value is not supported");
}

#[test]
fn destructuring_a_literal_holding_a_shape_is_rejected() {
    let err = run_err("[a, b] = [1, db]");
    assert_eq!(err.code(), "ASYNC-10001");
    assert_eq!(err.span(), rowan::TextRange::new(0.into(), 6.into()));
}

#[test]
fn for_of_over_a_literal_of_shapes_is_rejected() {
    let err = run_err("for (const { a } of [db]) {}");
    assert_eq!(err.to_string(), "destructuring a `Database` value is not supported");
    assert_eq!(err.span(), rowan::TextRange::new(11.into(), 16.into()));

    let err = run_err("for ([k] of [1, db.coll]) {}");
    assert_eq!(err.to_string(), "destructuring a `Collection` value is not supported");
    assert_eq!(err.span(), rowan::TextRange::new(5.into(), 8.into()));
}

#[test]
fn for_heads_over_plain_literals_are_accepted() {
    run("for (const { a } of [1, {}]) {}");
    run("for (const k in [db]) {}");
    run("for (const d of [db]) { d.coll }");
}

#[test]
fn destructuring_plain_values_binds_unknown() {
    let src = "const [a, { b = 1 }, ...rest] = [1, {}, 3]\nfunction f({ p }, [q] = db) {}";
    assert_snapshot!(dump(src), @r"
    scope 0:
      f: fn() -> unknown
      a: unknown
      b: unknown
      rest: unknown
    ");
}
