//! Binding patterns: names, array and object destructuring, defaults and
//! rest elements.

use crate::syntax_kind::SyntaxKind;

use super::{expressions, MarkClosed, Parser};

/// A binding target without a default.
pub(crate) fn pattern(p: &mut Parser) -> Option<MarkClosed> {
    match p.current() {
        SyntaxKind::IDENT => {
            let m = p.open();
            p.advance();
            Some(p.close(m, SyntaxKind::IDENT_PAT))
        }
        SyntaxKind::L_BRACKET => Some(array_pattern(p)),
        SyntaxKind::L_BRACE => Some(object_pattern(p)),
        _ => {
            p.error("expected a binding name or pattern");
            None
        }
    }
}

/// `pattern [= default]`.
fn pattern_with_default(p: &mut Parser) {
    let Some(target) = pattern(p) else {
        return;
    };
    if p.at(SyntaxKind::EQ) {
        let m = p.open_before(target);
        p.advance(); // =
        expressions::assign_expr(p);
        p.close(m, SyntaxKind::ASSIGN_PAT);
    }
}

fn rest_pattern(p: &mut Parser) {
    let m = p.open();
    p.advance(); // ...
    pattern(p);
    p.close(m, SyntaxKind::REST_PAT);
}

fn array_pattern(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    let open_span = p.current_span();
    p.advance(); // [

    while !p.at(SyntaxKind::R_BRACKET) && !p.at(SyntaxKind::EOF) && !p.has_error() {
        if p.eat(SyntaxKind::COMMA) {
            continue;
        }
        if p.at(SyntaxKind::DOT_DOT_DOT) {
            rest_pattern(p);
        } else {
            pattern_with_default(p);
        }
        if !p.at(SyntaxKind::R_BRACKET) && !p.expect(SyntaxKind::COMMA) {
            break;
        }
    }

    p.expect_closing(SyntaxKind::R_BRACKET, open_span, "array pattern");
    p.close(m, SyntaxKind::ARRAY_PAT)
}

fn object_pattern(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    let open_span = p.current_span();
    p.advance(); // {

    while !p.at(SyntaxKind::R_BRACE) && !p.at(SyntaxKind::EOF) && !p.has_error() {
        if p.at(SyntaxKind::DOT_DOT_DOT) {
            rest_pattern(p);
        } else {
            pattern_property(p);
        }
        if !p.at(SyntaxKind::R_BRACE) && !p.expect(SyntaxKind::COMMA) {
            break;
        }
    }

    p.expect_closing(SyntaxKind::R_BRACE, open_span, "object pattern");
    p.close(m, SyntaxKind::OBJECT_PAT)
}

/// `key: pattern [= default]` or shorthand `name [= default]`.
fn pattern_property(p: &mut Parser) {
    let m = p.open();
    if p.at(SyntaxKind::IDENT) && p.nth(1) != SyntaxKind::COLON {
        pattern_with_default(p);
    } else {
        expressions::property_key(p);
        p.expect(SyntaxKind::COLON);
        pattern_with_default(p);
    }
    p.close(m, SyntaxKind::PAT_PROP);
}

#[cfg(test)]
mod tests {
    use crate::{parse, SyntaxKind};

    #[test]
    fn nested_patterns_with_defaults_and_rest() {
        let parse = parse("const { a, b: [c = 1, ...d], ...e } = x");
        assert!(parse.ok(), "{:?}", parse.errors());
        let kinds: Vec<_> = parse.syntax().descendants().map(|n| n.kind()).collect();
        assert!(kinds.contains(&SyntaxKind::OBJECT_PAT));
        assert!(kinds.contains(&SyntaxKind::ARRAY_PAT));
        assert!(kinds.contains(&SyntaxKind::ASSIGN_PAT));
        assert_eq!(kinds.iter().filter(|k| **k == SyntaxKind::REST_PAT).count(), 2);
    }

    #[test]
    fn literal_is_not_a_pattern() {
        let parse = parse("let 1 = x");
        assert_eq!(parse.errors()[0].message, "expected a binding name or pattern");
    }
}
