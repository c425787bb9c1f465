//! Typed AST nodes for binding patterns and parameter lists.

use crate::ast::expr::{Expr, PropKey};
use crate::ast::{ast_node, child_nodes, child_token, AstNode};
use crate::cst::SyntaxNode;
use crate::syntax_kind::SyntaxKind;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pat {
    Ident(IdentPat),
    Array(ArrayPat),
    Object(ObjectPat),
    Assign(AssignPat),
    Rest(RestPat),
}

impl Pat {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        let pat = match node.kind() {
            SyntaxKind::IDENT_PAT => Pat::Ident(IdentPat { syntax: node }),
            SyntaxKind::ARRAY_PAT => Pat::Array(ArrayPat { syntax: node }),
            SyntaxKind::OBJECT_PAT => Pat::Object(ObjectPat { syntax: node }),
            SyntaxKind::ASSIGN_PAT => Pat::Assign(AssignPat { syntax: node }),
            SyntaxKind::REST_PAT => Pat::Rest(RestPat { syntax: node }),
            _ => return None,
        };
        Some(pat)
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Pat::Ident(n) => &n.syntax,
            Pat::Array(n) => &n.syntax,
            Pat::Object(n) => &n.syntax,
            Pat::Assign(n) => &n.syntax,
            Pat::Rest(n) => &n.syntax,
        }
    }

    /// Whether this pattern destructures (anything but a plain name).
    pub fn is_destructuring(&self) -> bool {
        match self {
            Pat::Ident(_) => false,
            Pat::Assign(p) => p.pattern().is_some_and(|inner| inner.is_destructuring()),
            Pat::Rest(p) => p.pattern().is_some_and(|inner| inner.is_destructuring()),
            Pat::Array(_) | Pat::Object(_) => true,
        }
    }

    /// Every name this pattern binds, in source order.
    pub fn bound_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names(&self, out: &mut Vec<String>) {
        match self {
            Pat::Ident(p) => out.extend(p.name()),
            Pat::Assign(p) => {
                if let Some(inner) = p.pattern() {
                    inner.collect_names(out);
                }
            }
            Pat::Rest(p) => {
                if let Some(inner) = p.pattern() {
                    inner.collect_names(out);
                }
            }
            Pat::Array(p) => {
                for element in p.elements() {
                    element.collect_names(out);
                }
            }
            Pat::Object(p) => {
                for element in p.elements() {
                    element.collect_names(out);
                }
            }
        }
    }

    /// Default-value expressions and computed keys inside the pattern, in
    /// source order.
    pub fn nested_exprs(&self) -> Vec<Expr> {
        let mut exprs = Vec::new();
        self.collect_exprs(&mut exprs);
        exprs
    }

    fn collect_exprs(&self, out: &mut Vec<Expr>) {
        match self {
            Pat::Ident(_) => {}
            Pat::Assign(p) => {
                if let Some(inner) = p.pattern() {
                    inner.collect_exprs(out);
                }
                out.extend(p.default());
            }
            Pat::Rest(p) => {
                if let Some(inner) = p.pattern() {
                    inner.collect_exprs(out);
                }
            }
            Pat::Array(p) => {
                for element in p.elements() {
                    element.collect_exprs(out);
                }
            }
            Pat::Object(p) => {
                for node in p.syntax.children() {
                    if let Some(prop) = PatProp::cast(node.clone()) {
                        if let Some(PropKey::Computed(key)) = prop.key() {
                            out.extend(key.expr());
                        }
                        if let Some(inner) = prop.pattern() {
                            inner.collect_exprs(out);
                        }
                    } else if let Some(rest) = Pat::cast(node) {
                        rest.collect_exprs(out);
                    }
                }
            }
        }
    }
}

fn first_pat(node: &SyntaxNode) -> Option<Pat> {
    node.children().find_map(Pat::cast)
}

ast_node!(IdentPat, IDENT_PAT);

impl IdentPat {
    pub fn name(&self) -> Option<String> {
        child_token(&self.syntax, SyntaxKind::IDENT).map(|t| t.text().to_string())
    }
}

ast_node!(ArrayPat, ARRAY_PAT);

impl ArrayPat {
    pub fn elements(&self) -> impl Iterator<Item = Pat> + '_ {
        self.syntax.children().filter_map(Pat::cast)
    }
}

ast_node!(ObjectPat, OBJECT_PAT);

impl ObjectPat {
    /// Properties and rest elements, each as the pattern it binds.
    pub fn elements(&self) -> impl Iterator<Item = Pat> + '_ {
        self.syntax.children().filter_map(|node| match node.kind() {
            SyntaxKind::PAT_PROP => PatProp { syntax: node }.pattern(),
            _ => Pat::cast(node),
        })
    }
}

ast_node!(PatProp, PAT_PROP);

impl PatProp {
    /// `None` for shorthand properties.
    pub fn key(&self) -> Option<PropKey> {
        PropKey::find(&self.syntax)
    }

    pub fn pattern(&self) -> Option<Pat> {
        first_pat(&self.syntax)
    }
}

ast_node!(AssignPat, ASSIGN_PAT);

impl AssignPat {
    pub fn pattern(&self) -> Option<Pat> {
        first_pat(&self.syntax)
    }

    pub fn default(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }
}

ast_node!(RestPat, REST_PAT);

impl RestPat {
    pub fn pattern(&self) -> Option<Pat> {
        first_pat(&self.syntax)
    }
}

// ── Parameters ─────────────────────────────────────────────────────────

ast_node!(ParamList, PARAM_LIST);

impl ParamList {
    pub fn params(&self) -> impl Iterator<Item = Param> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(Param, PARAM);

impl Param {
    pub fn pattern(&self) -> Option<Pat> {
        first_pat(&self.syntax)
    }

    pub fn default(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }

    pub fn is_rest(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::DOT_DOT_DOT).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::stmt::Stmt;
    use crate::parse;

    fn declared_pattern(source: &str) -> Pat {
        let parse = parse(source);
        assert!(parse.ok(), "{:?}", parse.errors());
        let Some(Stmt::VarDecl(decl)) = parse.tree().stmts().next() else {
            panic!("expected declaration");
        };
        let pat = decl
            .declarators()
            .next()
            .and_then(|d| d.pattern())
            .expect("pattern");
        pat
    }

    #[test]
    fn names_bound_by_nested_pattern() {
        let pat = declared_pattern("const { a, b: [c, , d = 2], ...rest } = x");
        assert!(pat.is_destructuring());
        assert_eq!(pat.bound_names(), vec!["a", "c", "d", "rest"]);
        assert_eq!(pat.nested_exprs().len(), 1);
    }

    #[test]
    fn plain_name_is_not_destructuring() {
        let pat = declared_pattern("let total = 0");
        assert!(!pat.is_destructuring());
        assert_eq!(pat.bound_names(), vec!["total"]);
    }
}
