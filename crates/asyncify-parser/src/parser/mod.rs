//! Event-based parser for shell scripts.
//!
//! The parser consumes the lossless token stream and produces events
//! (Open/Close/Advance) that are later converted into a rowan green tree.
//!
//! # Architecture
//!
//! Parse functions call `open()` to start a node, `advance()` to consume a
//! token and `close()` to finish a node with its real kind. `open_before()`
//! wraps an already completed node (turning `callee` into
//! `call_expr(callee, arg_list)`) through a forward-parent link on the
//! completed node's Open event.
//!
//! # Trivia
//!
//! Lookahead (`current()`, `nth()`) never sees whitespace, line breaks or
//! comments. Only significant tokens get Advance events; `build_tree` puts
//! skipped trivia back in front of the next token or node, so a node's text
//! range starts at its first significant token.
//!
//! # Automatic semicolons
//!
//! A statement may end at `;`, before `}`, at end of input, or before a token
//! that starts on a new line. See [`Parser::at_statement_end`].

pub(crate) mod expressions;
pub(crate) mod patterns;
pub(crate) mod statements;

use asyncify_common::span::Span;
use asyncify_common::token::{Token, TokenKind};

use crate::error::ParseError;
use crate::syntax_kind::SyntaxKind;

/// A parser event, converted into tree structure by [`Parser::build_tree`].
#[derive(Debug)]
enum Event {
    /// Start a node. `kind` stays TOMBSTONE until `close()` patches it.
    /// `forward_parent` points at a wrapper opened later by `open_before()`.
    Open {
        kind: SyntaxKind,
        forward_parent: Option<usize>,
    },
    Close,
    /// Consume the next significant token (and the trivia before it).
    Advance,
}

/// A started but not-yet-closed node.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkOpened {
    index: usize,
}

/// A completed node, usable with `open_before()`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkClosed {
    index: usize,
}

pub(crate) struct Parser<'src> {
    /// All tokens from the lexer, trivia and `Eof` included.
    tokens: Vec<Token>,
    /// Raw index of the next unconsumed token.
    pos: usize,
    events: Vec<Event>,
    source: &'src str,
    errors: Vec<ParseError>,
    /// First-error-only: once set, parse functions bail out.
    has_error: bool,
    /// Set while parsing a `for` head so `in` is not taken as an operator.
    pub(crate) no_in: bool,
}

impl<'src> Parser<'src> {
    pub(crate) fn new(tokens: Vec<Token>, source: &'src str) -> Self {
        Self {
            tokens,
            pos: 0,
            events: Vec::new(),
            source,
            errors: Vec::new(),
            has_error: false,
            no_in: false,
        }
    }

    // ── Lookahead ──────────────────────────────────────────────────────

    /// Raw index of the `n`th significant token ahead, if any.
    fn significant(&self, n: usize) -> Option<usize> {
        let mut remaining = n;
        let mut pos = self.pos;
        while pos < self.tokens.len() {
            if !self.tokens[pos].kind.is_trivia() {
                if remaining == 0 {
                    return Some(pos);
                }
                remaining -= 1;
            }
            pos += 1;
        }
        None
    }

    pub(crate) fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    /// Kind of the `n`th significant token ahead, or `EOF` past the end.
    pub(crate) fn nth(&self, n: usize) -> SyntaxKind {
        self.significant(n)
            .map(|i| SyntaxKind::from(self.tokens[i].kind))
            .unwrap_or(SyntaxKind::EOF)
    }

    pub(crate) fn nth_text(&self, n: usize) -> &'src str {
        match self.significant(n) {
            Some(i) => self.token_text(i),
            None => "",
        }
    }

    pub(crate) fn current_text(&self) -> &'src str {
        self.nth_text(0)
    }

    pub(crate) fn current_span(&self) -> Span {
        match self.significant(0) {
            Some(i) => self.tokens[i].span,
            None => Span::empty(self.source.len() as u32),
        }
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    pub(crate) fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.current())
    }

    /// Whether the current token is the identifier `word` (`async`, `of`...).
    pub(crate) fn at_contextual(&self, word: &str) -> bool {
        self.at(SyntaxKind::IDENT) && self.current_text() == word
    }

    /// Whether a line break separates the `n`th significant token from the
    /// one before it. Block comments spanning lines count as line breaks.
    pub(crate) fn line_break_before(&self, n: usize) -> bool {
        let Some(target) = self.significant(n) else {
            return false;
        };
        let from = if n == 0 {
            self.pos
        } else {
            self.significant(n - 1).map_or(self.pos, |i| i + 1)
        };
        self.tokens[from..target].iter().any(|t| match t.kind {
            TokenKind::Newline => true,
            TokenKind::Comment => self.source[t.span.to_range()].contains('\n'),
            _ => false,
        })
    }

    /// Whether the statement being parsed may end here.
    pub(crate) fn at_statement_end(&self) -> bool {
        self.at_any(&[SyntaxKind::SEMICOLON, SyntaxKind::R_BRACE, SyntaxKind::EOF])
            || self.line_break_before(0)
    }

    /// Whether the `(` at significant offset `n` opens an arrow function's
    /// parameter list: its matching `)` is directly followed by `=>`.
    pub(crate) fn arrow_params_at(&self, n: usize) -> bool {
        let Some(start) = self.significant(n) else {
            return false;
        };
        if self.tokens[start].kind != TokenKind::LParen {
            return false;
        }
        let mut depth = 0u32;
        let mut i = start;
        while i < self.tokens.len() {
            match self.tokens[i].kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::InterpolationStart => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        break;
                    }
                }
                TokenKind::InterpolationEnd => depth = depth.saturating_sub(1),
                TokenKind::Eof => return false,
                _ => {}
            }
            i += 1;
        }
        self.tokens[i + 1..]
            .iter()
            .find(|t| !t.kind.is_trivia())
            .is_some_and(|t| t.kind == TokenKind::FatArrow)
    }

    fn token_text(&self, index: usize) -> &'src str {
        &self.source[self.tokens[index].span.to_range()]
    }

    // ── Mutation: node management ──────────────────────────────────────

    pub(crate) fn open(&mut self) -> MarkOpened {
        let mark = MarkOpened {
            index: self.events.len(),
        };
        self.events.push(Event::Open {
            kind: SyntaxKind::TOMBSTONE,
            forward_parent: None,
        });
        mark
    }

    /// Start a node that will become the parent of `completed`.
    pub(crate) fn open_before(&mut self, completed: MarkClosed) -> MarkOpened {
        let mark = self.open();
        if let Event::Open { forward_parent, .. } = &mut self.events[completed.index] {
            *forward_parent = Some(mark.index);
        }
        mark
    }

    pub(crate) fn close(&mut self, m: MarkOpened, kind: SyntaxKind) -> MarkClosed {
        if let Event::Open {
            kind: slot_kind, ..
        } = &mut self.events[m.index]
        {
            *slot_kind = kind;
        }
        self.events.push(Event::Close);
        MarkClosed { index: m.index }
    }

    // ── Mutation: token consumption ────────────────────────────────────

    /// Consume the next significant token together with the trivia before it.
    pub(crate) fn advance(&mut self) {
        if let Some(i) = self.significant(0) {
            self.events.push(Event::Advance);
            self.pos = i + 1;
        }
    }

    /// Consume the current token inside an ERROR_NODE.
    pub(crate) fn advance_with_error(&mut self, message: &str) {
        let m = self.open();
        self.error(message);
        self.advance();
        self.close(m, SyntaxKind::ERROR_NODE);
    }

    pub(crate) fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            self.error(&format!("expected {}", describe(kind)));
            false
        }
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Close delimiter `kind`, pointing back at the opener when missing.
    pub(crate) fn expect_closing(&mut self, kind: SyntaxKind, opened_at: Span, what: &str) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error_with_related(
            &format!("expected {}", describe(kind)),
            opened_at,
            &format!("{what} opened here"),
        );
        false
    }

    /// End a statement: an explicit `;` or an automatic one.
    pub(crate) fn semicolon(&mut self) {
        if self.eat(SyntaxKind::SEMICOLON) || self.at_statement_end() {
            return;
        }
        self.error("expected `;` or a line break");
    }

    // ── Error reporting ────────────────────────────────────────────────

    pub(crate) fn error(&mut self, message: &str) {
        if self.has_error {
            return;
        }
        let span = self.current_span();
        self.errors.push(ParseError::new(message, span));
        self.has_error = true;
    }

    pub(crate) fn error_with_related(&mut self, message: &str, related_span: Span, related_msg: &str) {
        if self.has_error {
            return;
        }
        let span = self.current_span();
        self.errors
            .push(ParseError::with_related(message, span, related_msg, related_span));
        self.has_error = true;
    }

    pub(crate) fn has_error(&self) -> bool {
        self.has_error
    }

    // ── Tree building ──────────────────────────────────────────────────

    /// Convert the collected events into a rowan `GreenNode`.
    ///
    /// Forward parents are resolved as in rust-analyzer: the chain starting
    /// at a completed node is opened outermost first and the wrapper events
    /// are tombstoned so they are skipped later. Trivia is emitted in front
    /// of whatever comes next, except before the root node opens.
    pub(crate) fn build_tree(mut self) -> (rowan::GreenNode, Vec<ParseError>) {
        let mut builder = rowan::GreenNodeBuilder::new();
        let mut token_pos = 0usize;
        let mut depth = 0usize;
        let mut chain: Vec<SyntaxKind> = Vec::new();

        for i in 0..self.events.len() {
            match self.events[i] {
                Event::Open {
                    kind,
                    forward_parent,
                } => {
                    chain.clear();
                    chain.push(kind);
                    let mut next = forward_parent;
                    while let Some(fp) = next {
                        let Event::Open {
                            kind,
                            forward_parent,
                        } = std::mem::replace(
                            &mut self.events[fp],
                            Event::Open {
                                kind: SyntaxKind::TOMBSTONE,
                                forward_parent: None,
                            },
                        )
                        else {
                            unreachable!("forward parent must be an Open event")
                        };
                        chain.push(kind);
                        next = forward_parent;
                    }
                    for &kind in chain.iter().rev() {
                        if kind == SyntaxKind::TOMBSTONE {
                            continue;
                        }
                        if depth > 0 {
                            token_pos = self.emit_trivia(&mut builder, token_pos);
                        }
                        builder.start_node(rowan::SyntaxKind(kind as u16));
                        depth += 1;
                    }
                }
                Event::Close => {
                    if depth == 1 {
                        token_pos = self.emit_trivia(&mut builder, token_pos);
                    }
                    builder.finish_node();
                    depth -= 1;
                }
                Event::Advance => {
                    token_pos = self.emit_trivia(&mut builder, token_pos);
                    if token_pos < self.tokens.len() {
                        self.emit_token(&mut builder, token_pos);
                        token_pos += 1;
                    }
                }
            }
        }

        (builder.finish(), self.errors)
    }

    fn emit_trivia(&self, builder: &mut rowan::GreenNodeBuilder<'static>, mut pos: usize) -> usize {
        while pos < self.tokens.len() && self.tokens[pos].kind.is_trivia() {
            self.emit_token(builder, pos);
            pos += 1;
        }
        pos
    }

    fn emit_token(&self, builder: &mut rowan::GreenNodeBuilder<'static>, pos: usize) {
        let kind = SyntaxKind::from(self.tokens[pos].kind);
        builder.token(rowan::SyntaxKind(kind as u16), self.token_text(pos));
    }
}

/// Human-readable name of a token kind for error messages.
pub(crate) fn describe(kind: SyntaxKind) -> String {
    let text = match kind {
        SyntaxKind::L_PAREN => "(",
        SyntaxKind::R_PAREN => ")",
        SyntaxKind::L_BRACKET => "[",
        SyntaxKind::R_BRACKET => "]",
        SyntaxKind::L_BRACE => "{",
        SyntaxKind::R_BRACE => "}",
        SyntaxKind::COMMA => ",",
        SyntaxKind::SEMICOLON => ";",
        SyntaxKind::COLON => ":",
        SyntaxKind::EQ => "=",
        SyntaxKind::FAT_ARROW => "=>",
        SyntaxKind::WHILE_KW => "while",
        SyntaxKind::INTERPOLATION_END => "}",
        SyntaxKind::IDENT => return "an identifier".to_string(),
        SyntaxKind::EOF => return "end of input".to_string(),
        other => return format!("{other:?}"),
    };
    format!("`{text}`")
}

// ── Top-level parsing ──────────────────────────────────────────────────

/// Parse a whole script into a SOURCE_FILE node.
pub(crate) fn parse_source_file(p: &mut Parser) {
    let root = p.open();
    while !p.at(SyntaxKind::EOF) && !p.has_error() {
        statements::stmt(p);
    }
    // After the first error the rest of the input is kept verbatim.
    while !p.at(SyntaxKind::EOF) {
        p.advance();
    }
    p.advance();
    p.close(root, SyntaxKind::SOURCE_FILE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use asyncify_lexer::Lexer;

    fn parser(source: &str) -> Parser<'_> {
        Parser::new(Lexer::tokenize(source), source)
    }

    #[test]
    fn lookahead_skips_trivia() {
        let p = parser("  db /* c */ . coll");
        assert_eq!(p.current(), SyntaxKind::IDENT);
        assert_eq!(p.nth(1), SyntaxKind::DOT);
        assert_eq!(p.nth_text(2), "coll");
        assert_eq!(p.nth(3), SyntaxKind::EOF);
    }

    #[test]
    fn line_break_detection() {
        let p = parser("a\n/* x\n */ b c");
        assert!(!p.line_break_before(0));
        assert!(p.line_break_before(1));
        assert!(!p.line_break_before(2));
    }

    #[test]
    fn arrow_param_scan() {
        assert!(parser("(a, [b], {c}) => a").arrow_params_at(0));
        assert!(!parser("(a, b) + c").arrow_params_at(0));
        assert!(parser("async (x) => x").arrow_params_at(1));
    }

    #[test]
    fn trivia_attaches_before_nodes() {
        let source = "  x ";
        let mut p = parser(source);
        let root = p.open();
        let m = p.open();
        p.advance();
        p.close(m, SyntaxKind::NAME_REF);
        p.advance();
        p.close(root, SyntaxKind::SOURCE_FILE);
        let (green, errors) = p.build_tree();
        assert!(errors.is_empty());

        let root = crate::cst::SyntaxNode::new_root(green);
        assert_eq!(root.text().to_string(), source);
        let name = root.first_child().expect("name node");
        assert_eq!(name.kind(), SyntaxKind::NAME_REF);
        assert_eq!(u32::from(name.text_range().start()), 2);
        assert_eq!(u32::from(name.text_range().end()), 3);
    }

    #[test]
    fn only_first_error_is_kept() {
        let mut p = parser(")");
        p.error("first");
        p.error("second");
        assert_eq!(p.errors.len(), 1);
        assert!(p.has_error());
    }
}
