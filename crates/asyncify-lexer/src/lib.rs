// Script lexer for the asyncify pipeline.

mod cursor;

use asyncify_common::token::{keyword_from_str, Token, TokenKind};
use cursor::Cursor;

/// Lexing context pushed while inside template literals.
#[derive(Debug, Clone, Copy)]
enum Mode {
    /// Between backticks: the next token is template text, `${` or the
    /// closing backtick.
    Template,
    /// Inside `${ ... }`. Tracks nested braces so the right `}` closes it.
    Interpolation { depth: u32 },
}

/// Punctuation, longest spelling first so the first prefix match wins.
const PUNCTUATION: &[(&str, TokenKind)] = &[
    (">>>=", TokenKind::UShrEq),
    ("===", TokenKind::EqEqEq),
    ("!==", TokenKind::NotEqEq),
    ("**=", TokenKind::StarStarEq),
    ("<<=", TokenKind::ShlEq),
    (">>=", TokenKind::ShrEq),
    (">>>", TokenKind::UShr),
    ("&&=", TokenKind::AmpAmpEq),
    ("||=", TokenKind::PipePipeEq),
    ("??=", TokenKind::QuestionQuestionEq),
    ("...", TokenKind::DotDotDot),
    ("=>", TokenKind::FatArrow),
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::NotEq),
    ("<=", TokenKind::LtEq),
    (">=", TokenKind::GtEq),
    ("<<", TokenKind::Shl),
    (">>", TokenKind::Shr),
    ("**", TokenKind::StarStar),
    ("++", TokenKind::PlusPlus),
    ("--", TokenKind::MinusMinus),
    ("&&", TokenKind::AmpAmp),
    ("||", TokenKind::PipePipe),
    ("??", TokenKind::QuestionQuestion),
    ("+=", TokenKind::PlusEq),
    ("-=", TokenKind::MinusEq),
    ("*=", TokenKind::StarEq),
    ("/=", TokenKind::SlashEq),
    ("%=", TokenKind::PercentEq),
    ("&=", TokenKind::AmpEq),
    ("|=", TokenKind::PipeEq),
    ("^=", TokenKind::CaretEq),
    ("=", TokenKind::Eq),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("&", TokenKind::Amp),
    ("|", TokenKind::Pipe),
    ("^", TokenKind::Caret),
    ("~", TokenKind::Tilde),
    ("!", TokenKind::Bang),
    ("?", TokenKind::Question),
    (":", TokenKind::Colon),
    (".", TokenKind::Dot),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    (",", TokenKind::Comma),
    (";", TokenKind::Semicolon),
];

/// The script lexer. Converts source text into a lossless token stream.
///
/// Implements `Iterator<Item = Token>`; the final token is always `Eof`.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    emitted_eof: bool,
    modes: Vec<Mode>,
    /// Last non-trivia token kind, used to tell `/` from a regex literal.
    last_significant: Option<TokenKind>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            emitted_eof: false,
            modes: Vec::new(),
            last_significant: None,
        }
    }

    /// Tokenize the entire source, including the final `Eof` token.
    pub fn tokenize(source: &str) -> Vec<Token> {
        Lexer::new(source).collect()
    }

    fn next_token(&mut self) -> Token {
        if let Some(Mode::Template) = self.modes.last() {
            return self.lex_template_part();
        }

        let start = self.cursor.pos();
        let Some(c) = self.cursor.peek() else {
            return Token::new(TokenKind::Eof, start, start);
        };

        match c {
            // ── Trivia ───────────────────────────────────────────────────
            '\n' | '\r' | '\u{2028}' | '\u{2029}' => self.lex_newline(start),
            c if c.is_whitespace() || c == '\u{feff}' => {
                self.cursor.eat_while(|c| {
                    (c.is_whitespace() || c == '\u{feff}') && !is_line_terminator(c)
                });
                Token::new(TokenKind::Whitespace, start, self.cursor.pos())
            }
            '#' if start == 0 && self.cursor.peek_next() == Some('!') => {
                self.cursor.eat_while(|c| !is_line_terminator(c));
                Token::new(TokenKind::Comment, start, self.cursor.pos())
            }
            '/' if self.cursor.peek_next() == Some('/') => {
                self.cursor.eat_while(|c| !is_line_terminator(c));
                Token::new(TokenKind::Comment, start, self.cursor.pos())
            }
            '/' if self.cursor.peek_next() == Some('*') => self.lex_block_comment(start),

            // ── Literals ─────────────────────────────────────────────────
            '0'..='9' => self.lex_number(start),
            '.' if self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit()) => {
                self.lex_number(start)
            }
            '"' | '\'' => self.lex_string(start, c),
            '`' => {
                self.cursor.advance();
                self.modes.push(Mode::Template);
                Token::new(TokenKind::TemplateStart, start, self.cursor.pos())
            }
            '/' if !self.last_significant.is_some_and(TokenKind::ends_operand) => {
                self.lex_regex(start)
            }

            // ── Braces (interpolation aware) ─────────────────────────────
            '{' => {
                if let Some(Mode::Interpolation { depth }) = self.modes.last_mut() {
                    *depth += 1;
                }
                self.single_char_token(TokenKind::LBrace, start)
            }
            '}' => match self.modes.last_mut() {
                Some(Mode::Interpolation { depth: 0 }) => {
                    self.modes.pop();
                    self.single_char_token(TokenKind::InterpolationEnd, start)
                }
                Some(Mode::Interpolation { depth }) => {
                    *depth -= 1;
                    self.single_char_token(TokenKind::RBrace, start)
                }
                _ => self.single_char_token(TokenKind::RBrace, start),
            },

            // ── Identifiers and keywords ─────────────────────────────────
            c if is_ident_start(c) => self.lex_ident(start),

            _ => self.lex_punctuation(start),
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────────

    fn single_char_token(&mut self, kind: TokenKind, start: u32) -> Token {
        self.cursor.advance();
        Token::new(kind, start, self.cursor.pos())
    }

    /// One line break; `\r\n` is a single token.
    fn lex_newline(&mut self, start: u32) -> Token {
        if self.cursor.advance() == Some('\r') {
            self.cursor.eat('\n');
        }
        Token::new(TokenKind::Newline, start, self.cursor.pos())
    }

    fn lex_block_comment(&mut self, start: u32) -> Token {
        self.cursor.advance();
        self.cursor.advance();
        loop {
            if self.cursor.at_str("*/") {
                self.cursor.advance();
                self.cursor.advance();
                return Token::new(TokenKind::Comment, start, self.cursor.pos());
            }
            if self.cursor.advance().is_none() {
                return Token::new(TokenKind::Error, start, self.cursor.pos());
            }
        }
    }

    fn lex_punctuation(&mut self, start: u32) -> Token {
        // `?.` is optional chaining unless a digit follows (`a?.5:b`).
        if self.cursor.at_str("?.") {
            self.cursor.advance();
            if self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit()) {
                return Token::new(TokenKind::Question, start, self.cursor.pos());
            }
            self.cursor.advance();
            return Token::new(TokenKind::QuestionDot, start, self.cursor.pos());
        }
        for &(text, kind) in PUNCTUATION {
            if self.cursor.at_str(text) {
                for _ in 0..text.len() {
                    self.cursor.advance();
                }
                return Token::new(kind, start, self.cursor.pos());
            }
        }
        self.cursor.advance();
        Token::new(TokenKind::Error, start, self.cursor.pos())
    }

    // ── Number literals ──────────────────────────────────────────────────

    /// Decimal, hex, octal and binary numbers, fractions, exponents,
    /// `_` separators and the `n` BigInt suffix.
    fn lex_number(&mut self, start: u32) -> Token {
        if self.cursor.peek() == Some('0')
            && matches!(
                self.cursor.peek_next(),
                Some('x' | 'X' | 'o' | 'O' | 'b' | 'B')
            )
        {
            self.cursor.advance();
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_hexdigit() || c == '_');
        } else {
            self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
            if self.cursor.peek() == Some('.') {
                self.cursor.advance();
                self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
            }
            if matches!(self.cursor.peek(), Some('e' | 'E')) {
                self.cursor.advance();
                if matches!(self.cursor.peek(), Some('+' | '-')) {
                    self.cursor.advance();
                }
                self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
            }
        }
        self.cursor.eat('n');
        Token::new(TokenKind::Number, start, self.cursor.pos())
    }

    // ── String, template and regex literals ──────────────────────────────

    /// A complete quoted string, quotes included. An unescaped line break or
    /// the end of input produces an `Error` token.
    fn lex_string(&mut self, start: u32, quote: char) -> Token {
        self.cursor.advance();
        loop {
            match self.cursor.peek() {
                None => return Token::new(TokenKind::Error, start, self.cursor.pos()),
                Some(c) if is_line_terminator(c) => {
                    return Token::new(TokenKind::Error, start, self.cursor.pos());
                }
                Some('\\') => {
                    self.cursor.advance();
                    if self.cursor.advance() == Some('\r') {
                        self.cursor.eat('\n');
                    }
                }
                Some(c) => {
                    self.cursor.advance();
                    if c == quote {
                        return Token::new(TokenKind::String, start, self.cursor.pos());
                    }
                }
            }
        }
    }

    /// The next piece of a template literal: text, `${` or the closing backtick.
    fn lex_template_part(&mut self) -> Token {
        let start = self.cursor.pos();
        if self.cursor.eat('`') {
            self.modes.pop();
            return Token::new(TokenKind::TemplateEnd, start, self.cursor.pos());
        }
        if self.cursor.at_str("${") {
            self.cursor.advance();
            self.cursor.advance();
            self.modes.push(Mode::Interpolation { depth: 0 });
            return Token::new(TokenKind::InterpolationStart, start, self.cursor.pos());
        }
        loop {
            match self.cursor.peek() {
                None => {
                    self.modes.pop();
                    return Token::new(TokenKind::Error, start, self.cursor.pos());
                }
                Some('`') => break,
                Some('$') if self.cursor.at_str("${") => break,
                Some('\\') => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
        Token::new(TokenKind::TemplateContent, start, self.cursor.pos())
    }

    /// `/body/flags`. A `/` inside a character class does not close the body.
    fn lex_regex(&mut self, start: u32) -> Token {
        self.cursor.advance();
        let mut in_class = false;
        loop {
            match self.cursor.advance() {
                None => return Token::new(TokenKind::Error, start, self.cursor.pos()),
                Some(c) if is_line_terminator(c) => {
                    return Token::new(TokenKind::Error, start, self.cursor.pos());
                }
                Some('\\') => {
                    self.cursor.advance();
                }
                Some('[') => in_class = true,
                Some(']') => in_class = false,
                Some('/') if !in_class => break,
                Some(_) => {}
            }
        }
        self.cursor.eat_while(is_ident_continue);
        Token::new(TokenKind::Regex, start, self.cursor.pos())
    }

    // ── Identifiers and keywords ─────────────────────────────────────────

    fn lex_ident(&mut self, start: u32) -> Token {
        self.cursor.advance();
        self.cursor.eat_while(is_ident_continue);
        let text = self.cursor.slice(start, self.cursor.pos());
        let kind = keyword_from_str(text).unwrap_or(TokenKind::Ident);
        Token::new(kind, start, self.cursor.pos())
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.emitted_eof {
            return None;
        }
        let token = self.next_token();
        match token.kind {
            TokenKind::Eof => self.emitted_eof = true,
            kind if kind.is_trivia() => {}
            kind => self.last_significant = Some(kind),
        }
        Some(token)
    }
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source)
            .into_iter()
            .map(|t| t.kind)
            .filter(|k| !k.is_trivia())
            .collect()
    }

    #[test]
    fn token_text_reproduces_source() {
        let source = "const c = db.coll.find({ a: 1 }); // done\n/* x */ c.toArray()";
        let rebuilt: String = Lexer::tokenize(source)
            .iter()
            .map(|t| &source[t.span.start as usize..t.span.end as usize])
            .collect();
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn member_call_chain() {
        use TokenKind::*;
        assert_eq!(
            kinds("db.coll.find()"),
            vec![Ident, Dot, Ident, Dot, Ident, LParen, RParen, Eof]
        );
    }

    #[test]
    fn longest_operator_wins() {
        use TokenKind::*;
        assert_eq!(
            kinds("a === b !== c >>>= d ?? e"),
            vec![Ident, EqEqEq, Ident, NotEqEq, Ident, UShrEq, Ident, QuestionQuestion, Ident, Eof]
        );
    }

    #[test]
    fn optional_chaining_versus_conditional() {
        use TokenKind::*;
        assert_eq!(kinds("a?.b"), vec![Ident, QuestionDot, Ident, Eof]);
        assert_eq!(
            kinds("a?.5:1"),
            vec![Ident, Question, Number, Colon, Number, Eof]
        );
    }

    #[test]
    fn slash_is_division_after_operand() {
        use TokenKind::*;
        assert_eq!(kinds("x / 2 / y"), vec![Ident, Slash, Number, Slash, Ident, Eof]);
        assert_eq!(kinds("(a) / 2"), vec![LParen, Ident, RParen, Slash, Number, Eof]);
    }

    #[test]
    fn slash_starts_regex_after_operator() {
        use TokenKind::*;
        assert_eq!(
            kinds("find({ name: /^a[/]b/i })"),
            vec![Ident, LParen, LBrace, Ident, Colon, Regex, RBrace, RParen, Eof]
        );
    }

    #[test]
    fn template_with_nested_braces() {
        use TokenKind::*;
        assert_eq!(
            kinds("`n=${ f({a: 1}) }!`"),
            vec![
                TemplateStart,
                TemplateContent,
                InterpolationStart,
                Ident,
                LParen,
                LBrace,
                Ident,
                Colon,
                Number,
                RBrace,
                RParen,
                InterpolationEnd,
                TemplateContent,
                TemplateEnd,
                Eof
            ]
        );
    }

    #[test]
    fn numbers_in_all_radixes() {
        let source = "0x1F 0b10 1_000 1.5e-3 .5 10n";
        let numbers = kinds(source)
            .into_iter()
            .filter(|k| *k == TokenKind::Number)
            .count();
        assert_eq!(numbers, 6);
    }

    #[test]
    fn unterminated_string_is_error() {
        assert_eq!(kinds("'abc"), vec![TokenKind::Error, TokenKind::Eof]);
        assert_eq!(
            kinds("\"ab\ncd\""),
            vec![TokenKind::Error, TokenKind::Ident, TokenKind::Error, TokenKind::Eof]
        );
    }

    #[test]
    fn crlf_is_one_newline() {
        let tokens = Lexer::tokenize("a\r\nb");
        assert_eq!(tokens[1].kind, TokenKind::Newline);
        assert_eq!((tokens[1].span.start, tokens[1].span.end), (1, 3));
    }
}
