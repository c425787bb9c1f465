//! Pratt expression parser.
//!
//! Covers the shell's expression grammar: literals and templates, object
//! and array literals, functions and arrows, member/index/call chains with
//! optional chaining, `new`, prefix/postfix/binary operators, the
//! conditional operator, assignment and the comma operator.

use crate::syntax_kind::SyntaxKind;

use super::{patterns, statements, MarkClosed, Parser};

// ── Binding Power Tables ───────────────────────────────────────────────

/// Returns (left_bp, right_bp) for infix operators.
///
/// Left < right means left-associative; `**` is the one right-associative
/// operator. `in` is not an operator while a `for` head is being parsed.
fn infix_binding_power(p: &Parser, op: SyntaxKind) -> Option<(u8, u8)> {
    let bp = match op {
        SyntaxKind::QUESTION_QUESTION => (1, 2),
        SyntaxKind::PIPE_PIPE => (3, 4),
        SyntaxKind::AMP_AMP => (5, 6),
        SyntaxKind::PIPE => (7, 8),
        SyntaxKind::CARET => (9, 10),
        SyntaxKind::AMP => (11, 12),
        SyntaxKind::EQ_EQ | SyntaxKind::NOT_EQ | SyntaxKind::EQ_EQ_EQ | SyntaxKind::NOT_EQ_EQ => {
            (13, 14)
        }
        SyntaxKind::IN_KW if p.no_in => return None,
        SyntaxKind::LT
        | SyntaxKind::GT
        | SyntaxKind::LT_EQ
        | SyntaxKind::GT_EQ
        | SyntaxKind::INSTANCEOF_KW
        | SyntaxKind::IN_KW => (15, 16),
        SyntaxKind::SHL | SyntaxKind::SHR | SyntaxKind::USHR => (17, 18),
        SyntaxKind::PLUS | SyntaxKind::MINUS => (19, 20),
        SyntaxKind::STAR | SyntaxKind::SLASH | SyntaxKind::PERCENT => (21, 22),
        SyntaxKind::STAR_STAR => (24, 23),
        _ => return None,
    };
    Some(bp)
}

fn is_prefix_op(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::BANG
            | SyntaxKind::TILDE
            | SyntaxKind::PLUS
            | SyntaxKind::MINUS
            | SyntaxKind::PLUS_PLUS
            | SyntaxKind::MINUS_MINUS
            | SyntaxKind::TYPEOF_KW
            | SyntaxKind::VOID_KW
            | SyntaxKind::DELETE_KW
    )
}

// ── Expression Entry Points ────────────────────────────────────────────

/// Full expression, comma operator included.
pub(crate) fn expr(p: &mut Parser) -> Option<MarkClosed> {
    let first = assign_expr(p)?;
    if !p.at(SyntaxKind::COMMA) {
        return Some(first);
    }
    let m = p.open_before(first);
    while p.eat(SyntaxKind::COMMA) {
        if assign_expr(p).is_none() {
            break;
        }
    }
    Some(p.close(m, SyntaxKind::SEQUENCE_EXPR))
}

/// Assignment-level expression: arrows, the conditional operator and
/// (compound) assignment.
pub(crate) fn assign_expr(p: &mut Parser) -> Option<MarkClosed> {
    if at_arrow_function(p) {
        return Some(arrow_fn(p));
    }
    if p.at(SyntaxKind::YIELD_KW) {
        p.error("generators are not supported");
        return None;
    }

    let lhs = expr_bp(p, 0)?;

    if p.at(SyntaxKind::QUESTION) {
        let m = p.open_before(lhs);
        p.advance(); // ?
        let saved = std::mem::replace(&mut p.no_in, false);
        assign_expr(p);
        p.no_in = saved;
        p.expect(SyntaxKind::COLON);
        assign_expr(p);
        return Some(p.close(m, SyntaxKind::COND_EXPR));
    }

    if p.current().is_assign_op() {
        let m = p.open_before(lhs);
        p.advance(); // operator
        assign_expr(p);
        return Some(p.close(m, SyntaxKind::ASSIGN_EXPR));
    }

    Some(lhs)
}

/// Binary operator loop.
fn expr_bp(p: &mut Parser, min_bp: u8) -> Option<MarkClosed> {
    let mut lhs = unary(p)?;

    loop {
        if p.has_error() {
            break;
        }
        let Some((l_bp, r_bp)) = infix_binding_power(p, p.current()) else {
            break;
        };
        if l_bp < min_bp {
            break;
        }
        let m = p.open_before(lhs);
        p.advance(); // operator
        expr_bp(p, r_bp);
        lhs = p.close(m, SyntaxKind::BINARY_EXPR);
    }

    Some(lhs)
}

/// Prefix operators, `await`, and postfix `++`/`--`.
fn unary(p: &mut Parser) -> Option<MarkClosed> {
    let current = p.current();

    if current == SyntaxKind::AWAIT_KW {
        let m = p.open();
        p.advance(); // await
        unary(p);
        return Some(p.close(m, SyntaxKind::AWAIT_EXPR));
    }

    if is_prefix_op(current) {
        let m = p.open();
        p.advance(); // operator
        unary(p);
        return Some(p.close(m, SyntaxKind::PREFIX_EXPR));
    }

    let operand = postfix(p)?;
    if p.at_any(&[SyntaxKind::PLUS_PLUS, SyntaxKind::MINUS_MINUS]) && !p.line_break_before(0) {
        let m = p.open_before(operand);
        p.advance(); // ++ / --
        return Some(p.close(m, SyntaxKind::POSTFIX_EXPR));
    }
    Some(operand)
}

/// A primary expression followed by member accesses, index accesses,
/// calls and tagged templates.
fn postfix(p: &mut Parser) -> Option<MarkClosed> {
    let mut lhs = primary(p)?;

    loop {
        if p.has_error() {
            break;
        }
        match p.current() {
            SyntaxKind::DOT => {
                let m = p.open_before(lhs);
                p.advance(); // .
                member_name(p);
                lhs = p.close(m, SyntaxKind::MEMBER_EXPR);
            }
            SyntaxKind::QUESTION_DOT => {
                let m = p.open_before(lhs);
                p.advance(); // ?.
                let kind = match p.current() {
                    SyntaxKind::L_PAREN => {
                        arg_list(p);
                        SyntaxKind::CALL_EXPR
                    }
                    SyntaxKind::L_BRACKET => {
                        index_tail(p);
                        SyntaxKind::INDEX_EXPR
                    }
                    _ => {
                        member_name(p);
                        SyntaxKind::MEMBER_EXPR
                    }
                };
                lhs = p.close(m, kind);
            }
            SyntaxKind::L_BRACKET => {
                let m = p.open_before(lhs);
                index_tail(p);
                lhs = p.close(m, SyntaxKind::INDEX_EXPR);
            }
            SyntaxKind::L_PAREN => {
                let m = p.open_before(lhs);
                arg_list(p);
                lhs = p.close(m, SyntaxKind::CALL_EXPR);
            }
            SyntaxKind::TEMPLATE_START => {
                let m = p.open_before(lhs);
                template(p);
                lhs = p.close(m, SyntaxKind::TAGGED_TEMPLATE);
            }
            _ => break,
        }
    }

    Some(lhs)
}

/// `[ expr ]` after a base expression.
fn index_tail(p: &mut Parser) {
    let open_span = p.current_span();
    p.advance(); // [
    let saved = std::mem::replace(&mut p.no_in, false);
    expr(p);
    p.no_in = saved;
    p.expect_closing(SyntaxKind::R_BRACKET, open_span, "index");
}

/// Member name after `.` or `?.`. Reserved words are allowed.
fn member_name(p: &mut Parser) {
    let m = p.open();
    if p.at(SyntaxKind::IDENT) || p.current().is_keyword() {
        p.advance();
    } else {
        p.error("expected a property name after `.`");
    }
    p.close(m, SyntaxKind::NAME);
}

// ── Atoms ──────────────────────────────────────────────────────────────

fn primary(p: &mut Parser) -> Option<MarkClosed> {
    match p.current() {
        SyntaxKind::NUMBER
        | SyntaxKind::STRING
        | SyntaxKind::REGEX
        | SyntaxKind::TRUE_KW
        | SyntaxKind::FALSE_KW
        | SyntaxKind::NULL_KW => {
            let m = p.open();
            p.advance();
            Some(p.close(m, SyntaxKind::LITERAL))
        }

        SyntaxKind::IDENT
            if p.current_text() == "async"
                && p.nth(1) == SyntaxKind::FUNCTION_KW
                && !p.line_break_before(1) =>
        {
            let m = p.open();
            function_tail(p, false);
            Some(p.close(m, SyntaxKind::FN_EXPR))
        }

        SyntaxKind::IDENT => {
            let m = p.open();
            p.advance();
            Some(p.close(m, SyntaxKind::NAME_REF))
        }

        SyntaxKind::THIS_KW => {
            let m = p.open();
            p.advance();
            Some(p.close(m, SyntaxKind::THIS_EXPR))
        }

        SyntaxKind::L_PAREN => {
            let m = p.open();
            let open_span = p.current_span();
            p.advance(); // (
            let saved = std::mem::replace(&mut p.no_in, false);
            expr(p);
            p.no_in = saved;
            p.expect_closing(SyntaxKind::R_PAREN, open_span, "parenthesis");
            Some(p.close(m, SyntaxKind::PAREN_EXPR))
        }

        SyntaxKind::L_BRACKET => Some(array_expr(p)),
        SyntaxKind::L_BRACE => Some(object_expr(p)),
        SyntaxKind::TEMPLATE_START => Some(template(p)),
        SyntaxKind::NEW_KW => Some(new_expr(p)),

        SyntaxKind::FUNCTION_KW => {
            let m = p.open();
            function_tail(p, false);
            Some(p.close(m, SyntaxKind::FN_EXPR))
        }

        SyntaxKind::CLASS_KW => {
            p.error("classes are not supported");
            None
        }

        SyntaxKind::ERROR => {
            p.error("unterminated literal or unexpected character");
            None
        }

        _ => {
            p.error("expected expression");
            None
        }
    }
}

/// `new Callee[(args)]`. The callee is a member chain without calls.
fn new_expr(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // new

    let callee = if p.at(SyntaxKind::NEW_KW) {
        Some(new_expr(p))
    } else {
        primary(p)
    };

    if let Some(mut callee) = callee {
        loop {
            if p.has_error() {
                break;
            }
            match p.current() {
                SyntaxKind::DOT => {
                    let member = p.open_before(callee);
                    p.advance(); // .
                    member_name(p);
                    callee = p.close(member, SyntaxKind::MEMBER_EXPR);
                }
                SyntaxKind::L_BRACKET => {
                    let index = p.open_before(callee);
                    index_tail(p);
                    callee = p.close(index, SyntaxKind::INDEX_EXPR);
                }
                _ => break,
            }
        }
        if p.at(SyntaxKind::L_PAREN) {
            arg_list(p);
        }
    }

    p.close(m, SyntaxKind::NEW_EXPR)
}

/// `( args )`, spread arguments included.
fn arg_list(p: &mut Parser) {
    let m = p.open();
    let open_span = p.current_span();
    p.advance(); // (
    let saved = std::mem::replace(&mut p.no_in, false);

    while !p.at(SyntaxKind::R_PAREN) && !p.at(SyntaxKind::EOF) && !p.has_error() {
        if p.at(SyntaxKind::DOT_DOT_DOT) {
            spread_element(p);
        } else {
            assign_expr(p);
        }
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }

    p.no_in = saved;
    p.expect_closing(SyntaxKind::R_PAREN, open_span, "argument list");
    p.close(m, SyntaxKind::ARG_LIST);
}

fn spread_element(p: &mut Parser) {
    let m = p.open();
    p.advance(); // ...
    assign_expr(p);
    p.close(m, SyntaxKind::SPREAD_ELEMENT);
}

fn array_expr(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    let open_span = p.current_span();
    p.advance(); // [
    let saved = std::mem::replace(&mut p.no_in, false);

    while !p.at(SyntaxKind::R_BRACKET) && !p.at(SyntaxKind::EOF) && !p.has_error() {
        // Elision: `[, a]`, `[a,, b]`.
        if p.eat(SyntaxKind::COMMA) {
            continue;
        }
        if p.at(SyntaxKind::DOT_DOT_DOT) {
            spread_element(p);
        } else {
            assign_expr(p);
        }
        if !p.at(SyntaxKind::R_BRACKET) && !p.expect(SyntaxKind::COMMA) {
            break;
        }
    }

    p.no_in = saved;
    p.expect_closing(SyntaxKind::R_BRACKET, open_span, "array");
    p.close(m, SyntaxKind::ARRAY_EXPR)
}

fn object_expr(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    let open_span = p.current_span();
    p.advance(); // {
    let saved = std::mem::replace(&mut p.no_in, false);

    while !p.at(SyntaxKind::R_BRACE) && !p.at(SyntaxKind::EOF) && !p.has_error() {
        property(p);
        if !p.at(SyntaxKind::R_BRACE) && !p.expect(SyntaxKind::COMMA) {
            break;
        }
    }

    p.no_in = saved;
    p.expect_closing(SyntaxKind::R_BRACE, open_span, "object literal");
    p.close(m, SyntaxKind::OBJECT_EXPR)
}

/// Whether the current token can start an object key.
pub(crate) fn at_property_key(p: &Parser) -> bool {
    let kind = p.current();
    kind.is_keyword()
        || matches!(
            kind,
            SyntaxKind::IDENT | SyntaxKind::STRING | SyntaxKind::NUMBER | SyntaxKind::L_BRACKET
        )
}

fn property(p: &mut Parser) {
    if p.at(SyntaxKind::DOT_DOT_DOT) {
        spread_element(p);
        return;
    }

    let m = p.open();

    let modifier_follows = !matches!(
        p.nth(1),
        SyntaxKind::COMMA | SyntaxKind::COLON | SyntaxKind::L_PAREN | SyntaxKind::R_BRACE | SyntaxKind::EQ
    );
    if (p.at_contextual("get") || p.at_contextual("set")) && modifier_follows {
        p.error("getters and setters are not supported");
        p.close(m, SyntaxKind::ERROR_NODE);
        return;
    }
    if p.at(SyntaxKind::STAR) {
        p.error("generators are not supported");
        p.close(m, SyntaxKind::ERROR_NODE);
        return;
    }
    if p.at_contextual("async") && modifier_follows && !p.line_break_before(1) {
        p.advance(); // async
        property_key(p);
        param_list(p);
        statements::block(p);
        p.close(m, SyntaxKind::METHOD);
        return;
    }

    // Shorthand `{ name }`.
    if p.at(SyntaxKind::IDENT) && matches!(p.nth(1), SyntaxKind::COMMA | SyntaxKind::R_BRACE) {
        let name = p.open();
        p.advance();
        p.close(name, SyntaxKind::NAME_REF);
        p.close(m, SyntaxKind::PROPERTY);
        return;
    }

    property_key(p);
    if p.at(SyntaxKind::L_PAREN) {
        param_list(p);
        statements::block(p);
        p.close(m, SyntaxKind::METHOD);
    } else {
        p.expect(SyntaxKind::COLON);
        assign_expr(p);
        p.close(m, SyntaxKind::PROPERTY);
    }
}

/// Object key: a name, string or number (`PROP_NAME`) or `[expr]`
/// (`COMPUTED_NAME`).
pub(crate) fn property_key(p: &mut Parser) {
    if p.at(SyntaxKind::L_BRACKET) {
        let m = p.open();
        let open_span = p.current_span();
        p.advance(); // [
        assign_expr(p);
        p.expect_closing(SyntaxKind::R_BRACKET, open_span, "computed key");
        p.close(m, SyntaxKind::COMPUTED_NAME);
    } else if at_property_key(p) {
        let m = p.open();
        p.advance();
        p.close(m, SyntaxKind::PROP_NAME);
    } else {
        p.error("expected a property name");
    }
}

/// Template literal: backticks, text, and `${ expr }` interpolations.
fn template(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // `
    loop {
        match p.current() {
            SyntaxKind::TEMPLATE_CONTENT => p.advance(),
            SyntaxKind::INTERPOLATION_START => {
                let interp = p.open();
                p.advance(); // ${
                expr(p);
                p.expect(SyntaxKind::INTERPOLATION_END);
                p.close(interp, SyntaxKind::INTERPOLATION);
            }
            SyntaxKind::TEMPLATE_END => {
                p.advance();
                break;
            }
            _ => {
                p.error("unterminated template literal");
                break;
            }
        }
        if p.has_error() {
            break;
        }
    }
    p.close(m, SyntaxKind::TEMPLATE)
}

// ── Functions ──────────────────────────────────────────────────────────

/// `[async] function [name](params) { body }`, shared by declarations and
/// function expressions. The caller opens and closes the node.
pub(crate) fn function_tail(p: &mut Parser, require_name: bool) {
    if p.at_contextual("async") {
        p.advance();
    }
    p.expect(SyntaxKind::FUNCTION_KW);
    if p.at(SyntaxKind::STAR) {
        p.error("generators are not supported");
        return;
    }
    if p.at(SyntaxKind::IDENT) {
        p.advance();
    } else if require_name {
        p.error("expected a function name");
        return;
    }
    param_list(p);
    if !p.has_error() {
        statements::block(p);
    }
}

pub(crate) fn param_list(p: &mut Parser) {
    let m = p.open();
    let open_span = p.current_span();
    if !p.expect(SyntaxKind::L_PAREN) {
        p.close(m, SyntaxKind::PARAM_LIST);
        return;
    }

    while !p.at(SyntaxKind::R_PAREN) && !p.at(SyntaxKind::EOF) && !p.has_error() {
        param(p);
        if !p.at(SyntaxKind::R_PAREN) && !p.expect(SyntaxKind::COMMA) {
            break;
        }
    }

    p.expect_closing(SyntaxKind::R_PAREN, open_span, "parameter list");
    p.close(m, SyntaxKind::PARAM_LIST);
}

fn param(p: &mut Parser) {
    let m = p.open();
    p.eat(SyntaxKind::DOT_DOT_DOT);
    patterns::pattern(p);
    if p.eat(SyntaxKind::EQ) {
        assign_expr(p);
    }
    p.close(m, SyntaxKind::PARAM);
}

fn at_arrow_function(p: &Parser) -> bool {
    match p.current() {
        SyntaxKind::IDENT if p.nth(1) == SyntaxKind::FAT_ARROW => true,
        SyntaxKind::L_PAREN => p.arrow_params_at(0),
        SyntaxKind::IDENT if p.current_text() == "async" && !p.line_break_before(1) => {
            match p.nth(1) {
                SyntaxKind::IDENT => p.nth(2) == SyntaxKind::FAT_ARROW,
                SyntaxKind::L_PAREN => p.arrow_params_at(1),
                _ => false,
            }
        }
        _ => false,
    }
}

/// `[async] params => body`, where params is a single name or a list.
fn arrow_fn(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    if p.at_contextual("async") && p.nth(1) != SyntaxKind::FAT_ARROW {
        p.advance(); // async
    }

    if p.at(SyntaxKind::IDENT) {
        let list = p.open();
        let param = p.open();
        let name = p.open();
        p.advance();
        p.close(name, SyntaxKind::IDENT_PAT);
        p.close(param, SyntaxKind::PARAM);
        p.close(list, SyntaxKind::PARAM_LIST);
    } else {
        param_list(p);
    }

    p.expect(SyntaxKind::FAT_ARROW);
    if p.at(SyntaxKind::L_BRACE) {
        statements::block(p);
    } else {
        assign_expr(p);
    }
    p.close(m, SyntaxKind::ARROW_FN)
}

#[cfg(test)]
mod tests {
    use crate::{debug_tree, parse, SyntaxKind};

    fn kinds_in(source: &str) -> Vec<SyntaxKind> {
        let parse = parse(source);
        assert!(parse.ok(), "unexpected errors: {:?}", parse.errors());
        parse.syntax().descendants().map(|n| n.kind()).collect()
    }

    #[test]
    fn exponent_is_right_associative() {
        let parse = parse("a ** b ** c");
        let tree = debug_tree(&parse.syntax());
        let outer = parse
            .syntax()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::BINARY_EXPR)
            .expect("binary expr");
        // The outer node's right operand is the nested `b ** c`.
        assert_eq!(outer.last_child().map(|n| n.kind()), Some(SyntaxKind::BINARY_EXPR), "{tree}");
    }

    #[test]
    fn async_arrow_with_single_param() {
        let kinds = kinds_in("const f = async x => x");
        assert!(kinds.contains(&SyntaxKind::ARROW_FN));
    }

    #[test]
    fn async_call_is_not_an_arrow() {
        let kinds = kinds_in("async(x)");
        assert!(kinds.contains(&SyntaxKind::CALL_EXPR));
        assert!(!kinds.contains(&SyntaxKind::ARROW_FN));
    }

    #[test]
    fn optional_chain_forms() {
        let kinds = kinds_in("a?.b?.(c)?.[d]");
        assert!(kinds.contains(&SyntaxKind::MEMBER_EXPR));
        assert!(kinds.contains(&SyntaxKind::CALL_EXPR));
        assert!(kinds.contains(&SyntaxKind::INDEX_EXPR));
    }

    #[test]
    fn reserved_word_member_names() {
        let kinds = kinds_in("cursor.delete().default");
        assert_eq!(kinds.iter().filter(|k| **k == SyntaxKind::NAME).count(), 2);
    }

    #[test]
    fn new_with_member_callee_then_chain() {
        let parse = parse("new Date(0).getTime()");
        assert!(parse.ok());
        let call = parse
            .syntax()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::CALL_EXPR)
            .expect("call");
        let callee = call.first_child().expect("callee");
        assert_eq!(callee.kind(), SyntaxKind::MEMBER_EXPR);
        assert_eq!(callee.first_child().map(|n| n.kind()), Some(SyntaxKind::NEW_EXPR));
    }

    #[test]
    fn getters_are_rejected() {
        let parse = parse("({ get x() { return 1 } })");
        assert_eq!(parse.errors()[0].message, "getters and setters are not supported");
    }
}
