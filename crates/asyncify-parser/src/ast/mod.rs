//! Typed AST layer on top of the rowan CST.
//!
//! The wrappers are newtypes around `SyntaxNode` with accessor methods that
//! walk the tree on demand, rust-analyzer style.
//!
//! - [`AstNode`]: every wrapper implements `cast()` and `syntax()`.
//! - `ast_node!`: generates the wrapper boilerplate.
//! - [`child_node`], [`child_nodes`], [`child_token`]: navigation helpers.

pub mod expr;
pub mod pat;
pub mod stmt;

use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

/// A typed view over a `SyntaxNode` of one specific kind.
pub trait AstNode: Sized {
    /// Returns `Some` if the node's kind matches.
    fn cast(node: SyntaxNode) -> Option<Self>;

    fn syntax(&self) -> &SyntaxNode;
}

/// Generate a wrapper struct and its `AstNode` impl for one `SyntaxKind`.
macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            pub(crate) syntax: SyntaxNode,
        }

        impl AstNode for $name {
            fn cast(node: SyntaxNode) -> Option<Self> {
                if node.kind() == SyntaxKind::$kind {
                    Some(Self { syntax: node })
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.syntax
            }
        }
    };
}

pub(crate) use ast_node;

/// First child node castable to `N`.
pub fn child_node<N: AstNode>(parent: &SyntaxNode) -> Option<N> {
    parent.children().find_map(N::cast)
}

/// All child nodes castable to `N`.
pub fn child_nodes<'a, N: AstNode + 'a>(parent: &'a SyntaxNode) -> impl Iterator<Item = N> + 'a {
    parent.children().filter_map(N::cast)
}

/// First direct child token of the given kind.
pub fn child_token(parent: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    parent
        .children_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|it| it.kind() == kind)
}

/// First direct child token that is not trivia.
pub(crate) fn first_significant_token(parent: &SyntaxNode) -> Option<SyntaxToken> {
    parent
        .children_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|it| !it.kind().is_trivia())
}

#[cfg(test)]
mod tests {
    use super::expr::Expr;
    use super::stmt::Stmt;
    use crate::parse;

    #[test]
    fn statements_and_expressions_cast() {
        let parse = parse("db.users.find({ age: 1 })");
        let stmts: Vec<_> = parse.tree().stmts().collect();
        assert_eq!(stmts.len(), 1);
        let Stmt::Expr(stmt) = &stmts[0] else {
            panic!("expected expression statement, got {:?}", stmts[0]);
        };
        let Some(Expr::Call(call)) = stmt.expr() else {
            panic!("expected call");
        };
        let Some(Expr::Member(member)) = call.callee() else {
            panic!("expected member callee");
        };
        assert_eq!(member.name().as_deref(), Some("find"));
        assert_eq!(call.args().count(), 1);
    }
}
