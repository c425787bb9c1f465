//! Script parser: recursive descent producing a lossless rowan CST.
//!
//! The token stream from `asyncify-lexer` is turned into a concrete syntax
//! tree that keeps every token, trivia included, so the rewriter can
//! reproduce the input byte for byte around its insertions.

pub mod ast;
pub mod cst;
pub mod error;
mod parser;
pub mod syntax_kind;

pub use cst::{ScriptLanguage, SyntaxElement, SyntaxNode, SyntaxToken};
pub use error::ParseError;
pub use syntax_kind::SyntaxKind;

/// Result of parsing a script.
///
/// Holds the green tree and the parse errors. Parsing stops at the first
/// error, so `errors` has at most one entry.
#[derive(Debug, Clone)]
pub struct Parse {
    green: rowan::GreenNode,
    errors: Vec<ParseError>,
}

impl Parse {
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    /// Typed root of the tree.
    pub fn tree(&self) -> ast::stmt::SourceFile {
        ast::AstNode::cast(self.syntax()).expect("parser always produces a SOURCE_FILE root")
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse a script into a CST.
pub fn parse(source: &str) -> Parse {
    let tokens = asyncify_lexer::Lexer::tokenize(source);
    let mut p = parser::Parser::new(tokens, source);
    parser::parse_source_file(&mut p);
    let (green, errors) = p.build_tree();
    Parse { green, errors }
}

/// Indented `KIND@start..end` dump of the tree, tokens shown with their text.
/// Trivia tokens are left out.
pub fn debug_tree(node: &SyntaxNode) -> String {
    let mut out = String::new();
    write_tree(&mut out, node, 0);
    out
}

fn write_tree(out: &mut String, node: &SyntaxNode, indent: usize) {
    use std::fmt::Write;

    let range = node.text_range();
    let _ = writeln!(
        out,
        "{:indent$}{:?}@{}..{}",
        "",
        node.kind(),
        u32::from(range.start()),
        u32::from(range.end()),
        indent = indent
    );
    for child in node.children_with_tokens() {
        match child {
            rowan::NodeOrToken::Node(n) => write_tree(out, &n, indent + 2),
            rowan::NodeOrToken::Token(t) => {
                if t.kind().is_trivia() || t.kind() == SyntaxKind::EOF {
                    continue;
                }
                let range = t.text_range();
                let _ = writeln!(
                    out,
                    "{:indent$}{:?}@{}..{} {:?}",
                    "",
                    t.kind(),
                    u32::from(range.start()),
                    u32::from(range.end()),
                    t.text(),
                    indent = indent + 2
                );
            }
        }
    }
}
