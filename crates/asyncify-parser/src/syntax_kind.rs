//! SyntaxKind enum for the script CST.
//!
//! A superset of `TokenKind` (mapped to SCREAMING_SNAKE_CASE) plus the
//! composite node kinds produced by the parser.

use asyncify_common::token::TokenKind;

/// Every kind of syntax element in the script CST.
///
/// The first two values are sentinels used by the event-based parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // ── Sentinels ──────────────────────────────────────────────────────
    /// Placeholder kind for incomplete/unfinished parser events.
    TOMBSTONE = 0,
    /// Wrapper for tokens/nodes that couldn't be parsed.
    ERROR_NODE = 1,

    // ── Keywords ───────────────────────────────────────────────────────
    AWAIT_KW,
    BREAK_KW,
    CASE_KW,
    CATCH_KW,
    CLASS_KW,
    CONST_KW,
    CONTINUE_KW,
    DEFAULT_KW,
    DELETE_KW,
    DO_KW,
    ELSE_KW,
    EXPORT_KW,
    FALSE_KW,
    FINALLY_KW,
    FOR_KW,
    FUNCTION_KW,
    IF_KW,
    IMPORT_KW,
    IN_KW,
    INSTANCEOF_KW,
    LET_KW,
    NEW_KW,
    NULL_KW,
    RETURN_KW,
    SWITCH_KW,
    THIS_KW,
    THROW_KW,
    TRUE_KW,
    TRY_KW,
    TYPEOF_KW,
    VAR_KW,
    VOID_KW,
    WHILE_KW,
    YIELD_KW,

    // ── Operators ──────────────────────────────────────────────────────
    PLUS,
    MINUS,
    STAR,
    STAR_STAR,
    SLASH,
    PERCENT,
    PLUS_PLUS,
    MINUS_MINUS,
    EQ,
    EQ_EQ,
    EQ_EQ_EQ,
    NOT_EQ,
    NOT_EQ_EQ,
    LT,
    GT,
    LT_EQ,
    GT_EQ,
    SHL,
    SHR,
    USHR,
    AMP,
    PIPE,
    CARET,
    TILDE,
    BANG,
    AMP_AMP,
    PIPE_PIPE,
    QUESTION_QUESTION,
    QUESTION,
    QUESTION_DOT,
    COLON,
    DOT,
    DOT_DOT_DOT,
    FAT_ARROW,
    PLUS_EQ,
    MINUS_EQ,
    STAR_EQ,
    STAR_STAR_EQ,
    SLASH_EQ,
    PERCENT_EQ,
    SHL_EQ,
    SHR_EQ,
    USHR_EQ,
    AMP_EQ,
    PIPE_EQ,
    CARET_EQ,
    AMP_AMP_EQ,
    PIPE_PIPE_EQ,
    QUESTION_QUESTION_EQ,

    // ── Delimiters ─────────────────────────────────────────────────────
    L_PAREN,
    R_PAREN,
    L_BRACKET,
    R_BRACKET,
    L_BRACE,
    R_BRACE,
    COMMA,
    SEMICOLON,

    // ── Literals and templates ─────────────────────────────────────────
    NUMBER,
    STRING,
    REGEX,
    TEMPLATE_START,
    TEMPLATE_CONTENT,
    INTERPOLATION_START,
    INTERPOLATION_END,
    TEMPLATE_END,

    // ── Trivia and special ─────────────────────────────────────────────
    WHITESPACE,
    NEWLINE,
    COMMENT,
    IDENT,
    EOF,
    ERROR,

    // ── Statement nodes ────────────────────────────────────────────────
    /// Root node.
    SOURCE_FILE,
    /// `var`/`let`/`const` with one or more declarators.
    VAR_DECL,
    /// `pattern [= init]`.
    DECLARATOR,
    /// `[async] function name(params) { ... }`.
    FN_DECL,
    PARAM_LIST,
    /// `[...]pattern [= default]`.
    PARAM,
    BLOCK,
    EXPR_STMT,
    EMPTY_STMT,
    RETURN_STMT,
    IF_STMT,
    ELSE_CLAUSE,
    WHILE_STMT,
    DO_WHILE_STMT,
    /// `for (init; test; update) body`.
    FOR_STMT,
    FOR_INIT,
    FOR_TEST,
    FOR_UPDATE,
    /// `for (x in e)` and `for (x of e)`.
    FOR_IN_STMT,
    BREAK_STMT,
    CONTINUE_STMT,
    THROW_STMT,
    TRY_STMT,
    CATCH_CLAUSE,
    FINALLY_CLAUSE,
    SWITCH_STMT,
    SWITCH_CASE,

    // ── Pattern nodes ──────────────────────────────────────────────────
    IDENT_PAT,
    ARRAY_PAT,
    OBJECT_PAT,
    /// `key: pattern` or shorthand `name` inside an object pattern.
    PAT_PROP,
    /// `pattern = default`.
    ASSIGN_PAT,
    /// `...pattern`.
    REST_PAT,

    // ── Expression nodes ───────────────────────────────────────────────
    LITERAL,
    TEMPLATE,
    INTERPOLATION,
    TAGGED_TEMPLATE,
    NAME_REF,
    THIS_EXPR,
    ARRAY_EXPR,
    OBJECT_EXPR,
    /// `key: value` or shorthand `name` in an object literal.
    PROPERTY,
    /// `[async] key(params) { ... }` in an object literal.
    METHOD,
    PROP_NAME,
    COMPUTED_NAME,
    SPREAD_ELEMENT,
    FN_EXPR,
    ARROW_FN,
    PAREN_EXPR,
    /// `base.name` or `base?.name`.
    MEMBER_EXPR,
    /// Member name after `.`; may be a reserved word.
    NAME,
    /// `base[index]`.
    INDEX_EXPR,
    CALL_EXPR,
    ARG_LIST,
    NEW_EXPR,
    PREFIX_EXPR,
    AWAIT_EXPR,
    POSTFIX_EXPR,
    BINARY_EXPR,
    ASSIGN_EXPR,
    COND_EXPR,
    SEQUENCE_EXPR,
}

impl SyntaxKind {
    /// Whether this kind is trivia (whitespace, line breaks, comments).
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            SyntaxKind::WHITESPACE | SyntaxKind::NEWLINE | SyntaxKind::COMMENT
        )
    }

    /// Whether this kind is a reserved word. Reserved words are valid
    /// property names (`cursor.delete`, `{ default: 1 }`).
    pub fn is_keyword(self) -> bool {
        (SyntaxKind::AWAIT_KW as u16..=SyntaxKind::YIELD_KW as u16).contains(&(self as u16))
    }

    /// Whether this kind is `=` or a compound assignment operator.
    pub fn is_assign_op(self) -> bool {
        matches!(
            self,
            SyntaxKind::EQ
                | SyntaxKind::PLUS_EQ
                | SyntaxKind::MINUS_EQ
                | SyntaxKind::STAR_EQ
                | SyntaxKind::STAR_STAR_EQ
                | SyntaxKind::SLASH_EQ
                | SyntaxKind::PERCENT_EQ
                | SyntaxKind::SHL_EQ
                | SyntaxKind::SHR_EQ
                | SyntaxKind::USHR_EQ
                | SyntaxKind::AMP_EQ
                | SyntaxKind::PIPE_EQ
                | SyntaxKind::CARET_EQ
                | SyntaxKind::AMP_AMP_EQ
                | SyntaxKind::PIPE_PIPE_EQ
                | SyntaxKind::QUESTION_QUESTION_EQ
        )
    }
}

impl From<TokenKind> for SyntaxKind {
    fn from(kind: TokenKind) -> Self {
        match kind {
            // Keywords
            TokenKind::Await => SyntaxKind::AWAIT_KW,
            TokenKind::Break => SyntaxKind::BREAK_KW,
            TokenKind::Case => SyntaxKind::CASE_KW,
            TokenKind::Catch => SyntaxKind::CATCH_KW,
            TokenKind::Class => SyntaxKind::CLASS_KW,
            TokenKind::Const => SyntaxKind::CONST_KW,
            TokenKind::Continue => SyntaxKind::CONTINUE_KW,
            TokenKind::Default => SyntaxKind::DEFAULT_KW,
            TokenKind::Delete => SyntaxKind::DELETE_KW,
            TokenKind::Do => SyntaxKind::DO_KW,
            TokenKind::Else => SyntaxKind::ELSE_KW,
            TokenKind::Export => SyntaxKind::EXPORT_KW,
            TokenKind::False => SyntaxKind::FALSE_KW,
            TokenKind::Finally => SyntaxKind::FINALLY_KW,
            TokenKind::For => SyntaxKind::FOR_KW,
            TokenKind::Function => SyntaxKind::FUNCTION_KW,
            TokenKind::If => SyntaxKind::IF_KW,
            TokenKind::Import => SyntaxKind::IMPORT_KW,
            TokenKind::In => SyntaxKind::IN_KW,
            TokenKind::Instanceof => SyntaxKind::INSTANCEOF_KW,
            TokenKind::Let => SyntaxKind::LET_KW,
            TokenKind::New => SyntaxKind::NEW_KW,
            TokenKind::Null => SyntaxKind::NULL_KW,
            TokenKind::Return => SyntaxKind::RETURN_KW,
            TokenKind::Switch => SyntaxKind::SWITCH_KW,
            TokenKind::This => SyntaxKind::THIS_KW,
            TokenKind::Throw => SyntaxKind::THROW_KW,
            TokenKind::True => SyntaxKind::TRUE_KW,
            TokenKind::Try => SyntaxKind::TRY_KW,
            TokenKind::Typeof => SyntaxKind::TYPEOF_KW,
            TokenKind::Var => SyntaxKind::VAR_KW,
            TokenKind::Void => SyntaxKind::VOID_KW,
            TokenKind::While => SyntaxKind::WHILE_KW,
            TokenKind::Yield => SyntaxKind::YIELD_KW,
            // Operators
            TokenKind::Plus => SyntaxKind::PLUS,
            TokenKind::Minus => SyntaxKind::MINUS,
            TokenKind::Star => SyntaxKind::STAR,
            TokenKind::StarStar => SyntaxKind::STAR_STAR,
            TokenKind::Slash => SyntaxKind::SLASH,
            TokenKind::Percent => SyntaxKind::PERCENT,
            TokenKind::PlusPlus => SyntaxKind::PLUS_PLUS,
            TokenKind::MinusMinus => SyntaxKind::MINUS_MINUS,
            TokenKind::Eq => SyntaxKind::EQ,
            TokenKind::EqEq => SyntaxKind::EQ_EQ,
            TokenKind::EqEqEq => SyntaxKind::EQ_EQ_EQ,
            TokenKind::NotEq => SyntaxKind::NOT_EQ,
            TokenKind::NotEqEq => SyntaxKind::NOT_EQ_EQ,
            TokenKind::Lt => SyntaxKind::LT,
            TokenKind::Gt => SyntaxKind::GT,
            TokenKind::LtEq => SyntaxKind::LT_EQ,
            TokenKind::GtEq => SyntaxKind::GT_EQ,
            TokenKind::Shl => SyntaxKind::SHL,
            TokenKind::Shr => SyntaxKind::SHR,
            TokenKind::UShr => SyntaxKind::USHR,
            TokenKind::Amp => SyntaxKind::AMP,
            TokenKind::Pipe => SyntaxKind::PIPE,
            TokenKind::Caret => SyntaxKind::CARET,
            TokenKind::Tilde => SyntaxKind::TILDE,
            TokenKind::Bang => SyntaxKind::BANG,
            TokenKind::AmpAmp => SyntaxKind::AMP_AMP,
            TokenKind::PipePipe => SyntaxKind::PIPE_PIPE,
            TokenKind::QuestionQuestion => SyntaxKind::QUESTION_QUESTION,
            TokenKind::Question => SyntaxKind::QUESTION,
            TokenKind::QuestionDot => SyntaxKind::QUESTION_DOT,
            TokenKind::Colon => SyntaxKind::COLON,
            TokenKind::Dot => SyntaxKind::DOT,
            TokenKind::DotDotDot => SyntaxKind::DOT_DOT_DOT,
            TokenKind::FatArrow => SyntaxKind::FAT_ARROW,
            TokenKind::PlusEq => SyntaxKind::PLUS_EQ,
            TokenKind::MinusEq => SyntaxKind::MINUS_EQ,
            TokenKind::StarEq => SyntaxKind::STAR_EQ,
            TokenKind::StarStarEq => SyntaxKind::STAR_STAR_EQ,
            TokenKind::SlashEq => SyntaxKind::SLASH_EQ,
            TokenKind::PercentEq => SyntaxKind::PERCENT_EQ,
            TokenKind::ShlEq => SyntaxKind::SHL_EQ,
            TokenKind::ShrEq => SyntaxKind::SHR_EQ,
            TokenKind::UShrEq => SyntaxKind::USHR_EQ,
            TokenKind::AmpEq => SyntaxKind::AMP_EQ,
            TokenKind::PipeEq => SyntaxKind::PIPE_EQ,
            TokenKind::CaretEq => SyntaxKind::CARET_EQ,
            TokenKind::AmpAmpEq => SyntaxKind::AMP_AMP_EQ,
            TokenKind::PipePipeEq => SyntaxKind::PIPE_PIPE_EQ,
            TokenKind::QuestionQuestionEq => SyntaxKind::QUESTION_QUESTION_EQ,
            // Delimiters
            TokenKind::LParen => SyntaxKind::L_PAREN,
            TokenKind::RParen => SyntaxKind::R_PAREN,
            TokenKind::LBracket => SyntaxKind::L_BRACKET,
            TokenKind::RBracket => SyntaxKind::R_BRACKET,
            TokenKind::LBrace => SyntaxKind::L_BRACE,
            TokenKind::RBrace => SyntaxKind::R_BRACE,
            TokenKind::Comma => SyntaxKind::COMMA,
            TokenKind::Semicolon => SyntaxKind::SEMICOLON,
            // Literals
            TokenKind::Number => SyntaxKind::NUMBER,
            TokenKind::String => SyntaxKind::STRING,
            TokenKind::Regex => SyntaxKind::REGEX,
            TokenKind::TemplateStart => SyntaxKind::TEMPLATE_START,
            TokenKind::TemplateContent => SyntaxKind::TEMPLATE_CONTENT,
            TokenKind::InterpolationStart => SyntaxKind::INTERPOLATION_START,
            TokenKind::InterpolationEnd => SyntaxKind::INTERPOLATION_END,
            TokenKind::TemplateEnd => SyntaxKind::TEMPLATE_END,
            // Trivia and special
            TokenKind::Whitespace => SyntaxKind::WHITESPACE,
            TokenKind::Newline => SyntaxKind::NEWLINE,
            TokenKind::Comment => SyntaxKind::COMMENT,
            TokenKind::Ident => SyntaxKind::IDENT,
            TokenKind::Eof => SyntaxKind::EOF,
            TokenKind::Error => SyntaxKind::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_kinds_are_first_values() {
        assert_eq!(SyntaxKind::TOMBSTONE as u16, 0);
        assert_eq!(SyntaxKind::ERROR_NODE as u16, 1);
    }

    #[test]
    fn keyword_range_is_contiguous() {
        assert!(SyntaxKind::AWAIT_KW.is_keyword());
        assert!(SyntaxKind::DELETE_KW.is_keyword());
        assert!(SyntaxKind::YIELD_KW.is_keyword());
        assert!(!SyntaxKind::IDENT.is_keyword());
        assert!(!SyntaxKind::PLUS.is_keyword());
    }

    #[test]
    fn token_kinds_convert() {
        assert_eq!(SyntaxKind::from(TokenKind::QuestionDot), SyntaxKind::QUESTION_DOT);
        assert_eq!(SyntaxKind::from(TokenKind::Function), SyntaxKind::FUNCTION_KW);
        assert!(SyntaxKind::from(TokenKind::Comment).is_trivia());
    }

    #[test]
    fn assignment_operators() {
        assert!(SyntaxKind::EQ.is_assign_op());
        assert!(SyntaxKind::QUESTION_QUESTION_EQ.is_assign_op());
        assert!(!SyntaxKind::EQ_EQ.is_assign_op());
    }
}
