/// Character iterator over a script with byte-offset tracking.
///
/// All positions are byte offsets into the original UTF-8 text.
pub struct Cursor<'src> {
    source: &'src str,
    pos: u32,
    chars: std::str::Chars<'src>,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            chars: source.chars(),
        }
    }

    /// The current character, without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    /// The character after the current one.
    pub fn peek_next(&self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next()
    }

    /// Consume the current character.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos += c.len_utf8() as u32;
        Some(c)
    }

    /// Consume the current character if it equals `expected`.
    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Whether the remaining input starts with `prefix`.
    pub fn at_str(&self, prefix: &str) -> bool {
        self.chars.as_str().starts_with(prefix)
    }

    pub fn pos(&self) -> u32 {
        self.pos
    }

    pub fn is_eof(&self) -> bool {
        self.peek().is_none()
    }

    pub fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.advance();
        }
    }

    /// Slice of the source between two byte offsets.
    pub fn slice(&self, start: u32, end: u32) -> &'src str {
        &self.source[start as usize..end as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_tracks_byte_offsets() {
        let mut cursor = Cursor::new("é=1");
        assert_eq!(cursor.advance(), Some('é'));
        assert_eq!(cursor.pos(), 2);
        assert_eq!(cursor.peek(), Some('='));
        assert_eq!(cursor.peek_next(), Some('1'));
    }

    #[test]
    fn eat_only_consumes_matching_char() {
        let mut cursor = Cursor::new("=>");
        assert!(!cursor.eat('>'));
        assert!(cursor.eat('='));
        assert!(cursor.eat('>'));
        assert!(cursor.is_eof());
    }

    #[test]
    fn at_str_looks_ahead_without_consuming() {
        let mut cursor = Cursor::new("`${x}`");
        cursor.advance();
        assert!(cursor.at_str("${"));
        assert_eq!(cursor.pos(), 1);
    }

    #[test]
    fn eat_while_then_slice() {
        let mut cursor = Cursor::new("findOne(");
        cursor.eat_while(|c| c.is_alphanumeric());
        assert_eq!(cursor.slice(0, cursor.pos()), "findOne");
        assert_eq!(cursor.peek(), Some('('));
    }
}
