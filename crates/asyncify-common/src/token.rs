use serde::Serialize;

use crate::span::Span;

/// A token produced by the script lexer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, start: u32, end: u32) -> Self {
        Self {
            kind,
            span: Span::new(start, end),
        }
    }
}

/// Every kind of token in the shell's script language.
///
/// The lexer is lossless: whitespace, line breaks and comments are real
/// tokens, so concatenating the text of every token reproduces the input.
/// Contextual words (`async`, `of`, `get`, `set`) are plain identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // ── Keywords ───────────────────────────────────────────────────────
    Await,
    Break,
    Case,
    Catch,
    Class,
    Const,
    Continue,
    Default,
    Delete,
    Do,
    Else,
    Export,
    False,
    Finally,
    For,
    Function,
    If,
    Import,
    In,
    Instanceof,
    Let,
    New,
    Null,
    Return,
    Switch,
    This,
    Throw,
    True,
    Try,
    Typeof,
    Var,
    Void,
    While,
    Yield,

    // ── Operators ──────────────────────────────────────────────────────
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,
    Eq,
    EqEq,
    EqEqEq,
    NotEq,
    NotEqEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Shl,
    Shr,
    UShr,
    Amp,
    Pipe,
    Caret,
    Tilde,
    Bang,
    AmpAmp,
    PipePipe,
    QuestionQuestion,
    Question,
    QuestionDot,
    Colon,
    Dot,
    DotDotDot,
    FatArrow,

    // ── Compound assignment ────────────────────────────────────────────
    PlusEq,
    MinusEq,
    StarEq,
    StarStarEq,
    SlashEq,
    PercentEq,
    ShlEq,
    ShrEq,
    UShrEq,
    AmpEq,
    PipeEq,
    CaretEq,
    AmpAmpEq,
    PipePipeEq,
    QuestionQuestionEq,

    // ── Delimiters ─────────────────────────────────────────────────────
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Semicolon,

    // ── Literals ───────────────────────────────────────────────────────
    Number,
    String,
    Regex,

    // ── Template literals ──────────────────────────────────────────────
    /// Opening backtick.
    TemplateStart,
    /// Literal text between backticks and interpolations.
    TemplateContent,
    /// `${` inside a template.
    InterpolationStart,
    /// `}` closing an interpolation.
    InterpolationEnd,
    /// Closing backtick.
    TemplateEnd,

    // ── Trivia ─────────────────────────────────────────────────────────
    Whitespace,
    Newline,
    /// `// ...` or `/* ... */`.
    Comment,

    // ── Special ────────────────────────────────────────────────────────
    Ident,
    Eof,
    Error,
}

impl TokenKind {
    /// Tokens the parser never looks at.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::Newline | TokenKind::Comment
        )
    }

    /// Whether a `/` after this token is a division operator rather than the
    /// start of a regular expression literal.
    pub fn ends_operand(self) -> bool {
        matches!(
            self,
            TokenKind::Ident
                | TokenKind::Number
                | TokenKind::String
                | TokenKind::Regex
                | TokenKind::TemplateEnd
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
                | TokenKind::This
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
        )
    }
}

/// Look up a reserved word.
pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
    match s {
        "await" => Some(TokenKind::Await),
        "break" => Some(TokenKind::Break),
        "case" => Some(TokenKind::Case),
        "catch" => Some(TokenKind::Catch),
        "class" => Some(TokenKind::Class),
        "const" => Some(TokenKind::Const),
        "continue" => Some(TokenKind::Continue),
        "default" => Some(TokenKind::Default),
        "delete" => Some(TokenKind::Delete),
        "do" => Some(TokenKind::Do),
        "else" => Some(TokenKind::Else),
        "export" => Some(TokenKind::Export),
        "false" => Some(TokenKind::False),
        "finally" => Some(TokenKind::Finally),
        "for" => Some(TokenKind::For),
        "function" => Some(TokenKind::Function),
        "if" => Some(TokenKind::If),
        "import" => Some(TokenKind::Import),
        "in" => Some(TokenKind::In),
        "instanceof" => Some(TokenKind::Instanceof),
        "let" => Some(TokenKind::Let),
        "new" => Some(TokenKind::New),
        "null" => Some(TokenKind::Null),
        "return" => Some(TokenKind::Return),
        "switch" => Some(TokenKind::Switch),
        "this" => Some(TokenKind::This),
        "throw" => Some(TokenKind::Throw),
        "true" => Some(TokenKind::True),
        "try" => Some(TokenKind::Try),
        "typeof" => Some(TokenKind::Typeof),
        "var" => Some(TokenKind::Var),
        "void" => Some(TokenKind::Void),
        "while" => Some(TokenKind::While),
        "yield" => Some(TokenKind::Yield),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_words_resolve() {
        assert_eq!(keyword_from_str("function"), Some(TokenKind::Function));
        assert_eq!(keyword_from_str("await"), Some(TokenKind::Await));
        assert_eq!(keyword_from_str("instanceof"), Some(TokenKind::Instanceof));
    }

    #[test]
    fn contextual_words_are_identifiers() {
        for word in ["async", "of", "get", "set", "db", "undefined"] {
            assert_eq!(keyword_from_str(word), None, "{word} should not be reserved");
        }
    }

    #[test]
    fn trivia_kinds() {
        assert!(TokenKind::Whitespace.is_trivia());
        assert!(TokenKind::Newline.is_trivia());
        assert!(TokenKind::Comment.is_trivia());
        assert!(!TokenKind::Ident.is_trivia());
        assert!(!TokenKind::Eof.is_trivia());
    }

    #[test]
    fn slash_after_operand_is_division() {
        assert!(TokenKind::Ident.ends_operand());
        assert!(TokenKind::RParen.ends_operand());
        assert!(!TokenKind::Eq.ends_operand());
        assert!(!TokenKind::LParen.ends_operand());
        assert!(!TokenKind::Return.ends_operand());
    }
}
