//! Statement parsing.

use crate::syntax_kind::SyntaxKind;

use super::{expressions, patterns, MarkClosed, Parser};

pub(crate) fn stmt(p: &mut Parser) {
    match p.current() {
        SyntaxKind::L_BRACE => {
            block(p);
        }
        SyntaxKind::VAR_KW | SyntaxKind::LET_KW | SyntaxKind::CONST_KW => {
            let m = p.open();
            var_decl_body(p);
            p.semicolon();
            p.close(m, SyntaxKind::VAR_DECL);
        }
        SyntaxKind::FUNCTION_KW => fn_decl(p),
        SyntaxKind::IDENT
            if p.current_text() == "async"
                && p.nth(1) == SyntaxKind::FUNCTION_KW
                && !p.line_break_before(1) =>
        {
            fn_decl(p)
        }
        SyntaxKind::IF_KW => if_stmt(p),
        SyntaxKind::WHILE_KW => while_stmt(p),
        SyntaxKind::DO_KW => do_while_stmt(p),
        SyntaxKind::FOR_KW => for_stmt(p),
        SyntaxKind::RETURN_KW => return_stmt(p),
        SyntaxKind::BREAK_KW => jump_stmt(p, SyntaxKind::BREAK_STMT),
        SyntaxKind::CONTINUE_KW => jump_stmt(p, SyntaxKind::CONTINUE_STMT),
        SyntaxKind::THROW_KW => throw_stmt(p),
        SyntaxKind::TRY_KW => try_stmt(p),
        SyntaxKind::SWITCH_KW => switch_stmt(p),
        SyntaxKind::SEMICOLON => {
            let m = p.open();
            p.advance();
            p.close(m, SyntaxKind::EMPTY_STMT);
        }
        SyntaxKind::CLASS_KW => p.error("classes are not supported"),
        SyntaxKind::IMPORT_KW | SyntaxKind::EXPORT_KW => p.error("modules are not supported"),
        SyntaxKind::IDENT if p.nth(1) == SyntaxKind::COLON => p.error("labels are not supported"),
        _ => expr_stmt(p),
    }
}

/// `{ stmt* }`.
pub(crate) fn block(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    let open_span = p.current_span();
    p.expect(SyntaxKind::L_BRACE);
    while !p.at(SyntaxKind::R_BRACE) && !p.at(SyntaxKind::EOF) && !p.has_error() {
        stmt(p);
    }
    p.expect_closing(SyntaxKind::R_BRACE, open_span, "block");
    p.close(m, SyntaxKind::BLOCK)
}

/// `var|let|const declarator (, declarator)*` without the terminator.
fn var_decl_body(p: &mut Parser) {
    p.advance(); // var / let / const
    loop {
        let m = p.open();
        patterns::pattern(p);
        if p.eat(SyntaxKind::EQ) {
            expressions::assign_expr(p);
        }
        p.close(m, SyntaxKind::DECLARATOR);
        if p.has_error() || !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
}

fn fn_decl(p: &mut Parser) {
    let m = p.open();
    expressions::function_tail(p, true);
    p.close(m, SyntaxKind::FN_DECL);
}

fn expr_stmt(p: &mut Parser) {
    let m = p.open();
    if expressions::expr(p).is_some() {
        p.semicolon();
    }
    p.close(m, SyntaxKind::EXPR_STMT);
}

/// `( expr )` heads of `if`, `while`, `do-while` and `switch`.
fn paren_condition(p: &mut Parser) {
    let open_span = p.current_span();
    if !p.expect(SyntaxKind::L_PAREN) {
        return;
    }
    expressions::expr(p);
    p.expect_closing(SyntaxKind::R_PAREN, open_span, "condition");
}

fn if_stmt(p: &mut Parser) {
    let m = p.open();
    p.advance(); // if
    paren_condition(p);
    stmt(p);
    if p.at(SyntaxKind::ELSE_KW) && !p.has_error() {
        let e = p.open();
        p.advance(); // else
        stmt(p);
        p.close(e, SyntaxKind::ELSE_CLAUSE);
    }
    p.close(m, SyntaxKind::IF_STMT);
}

fn while_stmt(p: &mut Parser) {
    let m = p.open();
    p.advance(); // while
    paren_condition(p);
    if !p.has_error() {
        stmt(p);
    }
    p.close(m, SyntaxKind::WHILE_STMT);
}

fn do_while_stmt(p: &mut Parser) {
    let m = p.open();
    p.advance(); // do
    stmt(p);
    p.expect(SyntaxKind::WHILE_KW);
    paren_condition(p);
    // A semicolon is always optional after `do ... while (cond)`.
    p.eat(SyntaxKind::SEMICOLON);
    p.close(m, SyntaxKind::DO_WHILE_STMT);
}

fn for_stmt(p: &mut Parser) {
    let m = p.open();
    p.advance(); // for
    if p.at(SyntaxKind::AWAIT_KW) {
        p.error("`for await` is not supported");
        p.close(m, SyntaxKind::FOR_STMT);
        return;
    }
    let paren_span = p.current_span();
    if !p.expect(SyntaxKind::L_PAREN) {
        p.close(m, SyntaxKind::FOR_STMT);
        return;
    }

    let saved = std::mem::replace(&mut p.no_in, true);
    let head = if p.at(SyntaxKind::SEMICOLON) {
        None
    } else if p.at_any(&[SyntaxKind::VAR_KW, SyntaxKind::LET_KW, SyntaxKind::CONST_KW]) {
        let d = p.open();
        var_decl_body(p);
        Some(p.close(d, SyntaxKind::VAR_DECL))
    } else {
        expressions::expr(p)
    };
    p.no_in = saved;

    if p.has_error() {
        p.close(m, SyntaxKind::FOR_STMT);
        return;
    }

    // for (head in obj) / for (head of iterable)
    if head.is_some() && (p.at(SyntaxKind::IN_KW) || p.at_contextual("of")) {
        let is_of = p.at_contextual("of");
        p.advance(); // in / of
        if is_of {
            expressions::assign_expr(p);
        } else {
            expressions::expr(p);
        }
        p.expect_closing(SyntaxKind::R_PAREN, paren_span, "loop head");
        if !p.has_error() {
            stmt(p);
        }
        p.close(m, SyntaxKind::FOR_IN_STMT);
        return;
    }

    let init = match head {
        Some(head) => p.open_before(head),
        None => p.open(),
    };
    p.close(init, SyntaxKind::FOR_INIT);
    p.expect(SyntaxKind::SEMICOLON);

    let test = p.open();
    if !p.at(SyntaxKind::SEMICOLON) && !p.has_error() {
        expressions::expr(p);
    }
    p.close(test, SyntaxKind::FOR_TEST);
    p.expect(SyntaxKind::SEMICOLON);

    let update = p.open();
    if !p.at(SyntaxKind::R_PAREN) && !p.has_error() {
        expressions::expr(p);
    }
    p.close(update, SyntaxKind::FOR_UPDATE);
    p.expect_closing(SyntaxKind::R_PAREN, paren_span, "loop head");

    if !p.has_error() {
        stmt(p);
    }
    p.close(m, SyntaxKind::FOR_STMT);
}

fn return_stmt(p: &mut Parser) {
    let m = p.open();
    p.advance(); // return
    if !p.at_statement_end() {
        expressions::expr(p);
    }
    p.semicolon();
    p.close(m, SyntaxKind::RETURN_STMT);
}

fn jump_stmt(p: &mut Parser, kind: SyntaxKind) {
    let m = p.open();
    p.advance(); // break / continue
    if p.at(SyntaxKind::IDENT) && !p.line_break_before(0) {
        p.error("labels are not supported");
    }
    p.semicolon();
    p.close(m, kind);
}

fn throw_stmt(p: &mut Parser) {
    let m = p.open();
    p.advance(); // throw
    if p.line_break_before(0) {
        p.error("line break is not allowed after `throw`");
    } else {
        expressions::expr(p);
        p.semicolon();
    }
    p.close(m, SyntaxKind::THROW_STMT);
}

fn try_stmt(p: &mut Parser) {
    let m = p.open();
    p.advance(); // try
    block(p);

    let mut handled = false;
    if p.at(SyntaxKind::CATCH_KW) && !p.has_error() {
        handled = true;
        let c = p.open();
        p.advance(); // catch
        if p.at(SyntaxKind::L_PAREN) {
            let open_span = p.current_span();
            p.advance(); // (
            patterns::pattern(p);
            p.expect_closing(SyntaxKind::R_PAREN, open_span, "catch binding");
        }
        block(p);
        p.close(c, SyntaxKind::CATCH_CLAUSE);
    }
    if p.at(SyntaxKind::FINALLY_KW) && !p.has_error() {
        handled = true;
        let f = p.open();
        p.advance(); // finally
        block(p);
        p.close(f, SyntaxKind::FINALLY_CLAUSE);
    }
    if !handled {
        p.error("expected `catch` or `finally` after `try` block");
    }
    p.close(m, SyntaxKind::TRY_STMT);
}

fn switch_stmt(p: &mut Parser) {
    let m = p.open();
    p.advance(); // switch
    paren_condition(p);

    let open_span = p.current_span();
    if !p.expect(SyntaxKind::L_BRACE) {
        p.close(m, SyntaxKind::SWITCH_STMT);
        return;
    }

    while !p.at(SyntaxKind::R_BRACE) && !p.at(SyntaxKind::EOF) && !p.has_error() {
        let case = p.open();
        if p.eat(SyntaxKind::CASE_KW) {
            expressions::expr(p);
        } else if !p.eat(SyntaxKind::DEFAULT_KW) {
            p.error("expected `case` or `default`");
            p.close(case, SyntaxKind::SWITCH_CASE);
            break;
        }
        p.expect(SyntaxKind::COLON);
        while !p.at_any(&[
            SyntaxKind::CASE_KW,
            SyntaxKind::DEFAULT_KW,
            SyntaxKind::R_BRACE,
            SyntaxKind::EOF,
        ]) && !p.has_error()
        {
            stmt(p);
        }
        p.close(case, SyntaxKind::SWITCH_CASE);
    }

    p.expect_closing(SyntaxKind::R_BRACE, open_span, "switch body");
    p.close(m, SyntaxKind::SWITCH_STMT);
}
