//! Source emission.
//!
//! Reproduces the script token by token, trivia included, inserting
//! `await` before each suspension site and `async` before each promoted
//! function. All insertions sit at node boundaries, so a single preorder
//! walk of the CST produces them in source order.

use std::mem;

use asyncify_parser::{Parse, SyntaxKind, SyntaxNode};
use asyncify_typeck::InferResult;
use rowan::NodeOrToken;

/// Rewrite `parse` using the sites and promotions in `result`.
pub fn emit(parse: &Parse, result: &InferResult) -> String {
    let root = parse.syntax();
    let extra = result.suspensions.len() * "(await )".len() + result.promoted.len() * "async ".len();
    let mut emitter = Emitter {
        result,
        out: String::with_capacity(usize::from(root.text_range().len()) + extra),
        asi_guard: false,
        resume_chain: false,
    };
    emitter.node(&root);
    emitter.out
}

struct Emitter<'a> {
    result: &'a InferResult,
    out: String,
    /// Set on entering an expression statement that could be glued onto
    /// the previous statement; cleared by the first text emitted.
    asi_guard: bool,
    /// Set after closing `(await …)` around an optional chain. The next
    /// link is then emitted with `?.` so a short-circuit still skips the
    /// rest of the chain.
    resume_chain: bool,
}

impl Emitter<'_> {
    fn node(&mut self, node: &SyntaxNode) {
        let range = node.text_range();
        if node.kind() == SyntaxKind::EXPR_STMT {
            self.asi_guard = follows_unterminated_stmt(node);
        }

        let site = is_site_kind(node.kind()) && self.result.is_suspended(range);
        let wrap = site && in_postfix_position(node);
        if site {
            if wrap {
                if self.asi_guard {
                    self.out.push(';');
                }
                self.out.push_str("(await ");
            } else {
                self.out.push_str("await ");
            }
            self.asi_guard = false;
        }
        if is_function_kind(node.kind()) && self.result.is_promoted(range) {
            self.out.push_str("async ");
            self.asi_guard = false;
        }

        for child in node.children_with_tokens() {
            match child {
                NodeOrToken::Node(child) => self.node(&child),
                NodeOrToken::Token(token) => {
                    if !token.kind().is_trivia() {
                        self.asi_guard = false;
                        if mem::take(&mut self.resume_chain) {
                            match token.kind() {
                                SyntaxKind::DOT => {
                                    self.out.push_str("?.");
                                    continue;
                                }
                                SyntaxKind::L_BRACKET | SyntaxKind::L_PAREN => self.out.push_str("?."),
                                _ => {}
                            }
                        }
                    }
                    self.out.push_str(token.text());
                }
            }
        }

        if wrap {
            self.out.push(')');
            self.resume_chain = continues_chain(node) && has_optional_link(node);
        }
    }
}

fn is_site_kind(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::CALL_EXPR
            | SyntaxKind::MEMBER_EXPR
            | SyntaxKind::INDEX_EXPR
            | SyntaxKind::NEW_EXPR
            | SyntaxKind::TAGGED_TEMPLATE
    )
}

fn is_chain_kind(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::CALL_EXPR | SyntaxKind::MEMBER_EXPR | SyntaxKind::INDEX_EXPR
    )
}

/// Whether `node` is the base of a member access, index access or call.
fn continues_chain(node: &SyntaxNode) -> bool {
    node.parent().is_some_and(|parent| {
        is_chain_kind(parent.kind()) && parent.children().next().as_ref() == Some(node)
    })
}

/// Whether the chain ending at `node` holds a `?.` link.
fn has_optional_link(node: &SyntaxNode) -> bool {
    let mut link = Some(node.clone());
    while let Some(current) = link.filter(|n| is_chain_kind(n.kind())) {
        let optional = current
            .children_with_tokens()
            .filter_map(NodeOrToken::into_token)
            .any(|t| t.kind() == SyntaxKind::QUESTION_DOT);
        if optional {
            return true;
        }
        link = current.children().next();
    }
    false
}

fn is_function_kind(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::FN_DECL | SyntaxKind::FN_EXPR | SyntaxKind::ARROW_FN | SyntaxKind::METHOD
    )
}

/// Whether `await node` would bind wrongly here: the node is the base of
/// an access, a callee, a template tag or the left side of `**`.
fn in_postfix_position(node: &SyntaxNode) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    let is_first_operand = parent.children().next().as_ref() == Some(node);
    match parent.kind() {
        SyntaxKind::MEMBER_EXPR
        | SyntaxKind::INDEX_EXPR
        | SyntaxKind::CALL_EXPR
        | SyntaxKind::NEW_EXPR
        | SyntaxKind::TAGGED_TEMPLATE => is_first_operand,
        SyntaxKind::BINARY_EXPR => {
            is_first_operand
                && parent
                    .children_with_tokens()
                    .filter_map(NodeOrToken::into_token)
                    .any(|t| t.kind() == SyntaxKind::STAR_STAR)
        }
        _ => false,
    }
}

/// Whether a `(` at the start of `stmt` would continue the previous
/// statement under automatic semicolon insertion.
fn follows_unterminated_stmt(stmt: &SyntaxNode) -> bool {
    let in_stmt_list = stmt.parent().is_some_and(|p| {
        matches!(
            p.kind(),
            SyntaxKind::SOURCE_FILE | SyntaxKind::BLOCK | SyntaxKind::SWITCH_CASE
        )
    });
    if !in_stmt_list {
        return false;
    }
    let Some(prev) = stmt.prev_sibling() else {
        return false;
    };
    if !is_stmt_kind(prev.kind()) {
        return false;
    }
    let Some(last) = prev.last_token() else {
        return false;
    };
    match last.kind() {
        SyntaxKind::SEMICOLON => false,
        // A statement block ends the statement; a function body or object
        // literal inside an expression does not.
        SyntaxKind::R_BRACE => last.parent().is_some_and(|closed| {
            !matches!(closed.kind(), SyntaxKind::BLOCK | SyntaxKind::SWITCH_STMT)
                || closed.parent().is_some_and(|owner| {
                    matches!(
                        owner.kind(),
                        SyntaxKind::FN_EXPR | SyntaxKind::ARROW_FN | SyntaxKind::METHOD
                    )
                })
        }),
        _ => true,
    }
}

fn is_stmt_kind(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::VAR_DECL
            | SyntaxKind::FN_DECL
            | SyntaxKind::BLOCK
            | SyntaxKind::EXPR_STMT
            | SyntaxKind::RETURN_STMT
            | SyntaxKind::IF_STMT
            | SyntaxKind::WHILE_STMT
            | SyntaxKind::DO_WHILE_STMT
            | SyntaxKind::FOR_STMT
            | SyntaxKind::FOR_IN_STMT
            | SyntaxKind::BREAK_STMT
            | SyntaxKind::CONTINUE_STMT
            | SyntaxKind::THROW_STMT
            | SyntaxKind::TRY_STMT
            | SyntaxKind::SWITCH_STMT
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmt_at(source: &str, index: usize) -> SyntaxNode {
        let parse = asyncify_parser::parse(source);
        assert!(parse.ok(), "{:?}", parse.errors());
        parse
            .syntax()
            .children()
            .nth(index)
            .expect("statement exists")
    }

    #[test]
    fn unterminated_predecessors() {
        assert!(follows_unterminated_stmt(&stmt_at("a\nb", 1)));
        assert!(follows_unterminated_stmt(&stmt_at("x = function () {}\nb", 1)));
        assert!(follows_unterminated_stmt(&stmt_at("if (k) a\nb", 1)));
    }

    fn first_expr(source: &str) -> SyntaxNode {
        let stmt = stmt_at(source, 0);
        stmt.first_child().expect("expression")
    }

    #[test]
    fn optional_links_along_the_chain() {
        // `a?.b.c()`: the callee `a?.b.c` reaches the optional link.
        let call = first_expr("a?.b.c()");
        let callee = call.first_child().expect("callee");
        assert!(has_optional_link(&callee));
        assert!(continues_chain(&callee));

        let call = first_expr("a.b.c()");
        assert!(!has_optional_link(&call.first_child().expect("callee")));
        // Parentheses end a chain.
        let call = first_expr("(a?.b).c()");
        assert!(!has_optional_link(&call.first_child().expect("callee")));
    }

    #[test]
    fn terminated_predecessors() {
        assert!(!follows_unterminated_stmt(&stmt_at("a;\nb", 1)));
        assert!(!follows_unterminated_stmt(&stmt_at("if (k) {}\nb", 1)));
        assert!(!follows_unterminated_stmt(&stmt_at("function f() {}\nb", 1)));
        assert!(!follows_unterminated_stmt(&stmt_at("b", 0)));
    }
}
