use std::ops::Range;

use serde::Serialize;

/// Byte-offset span into a script. Start is inclusive, end is exclusive.
///
/// Every position handed between the lexer, the parser and diagnostics is a
/// byte offset. Lines and columns are only computed on demand through
/// [`LineIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "span start ({start}) must be <= end ({end})");
        Self { start, end }
    }

    /// Zero-length span at `offset`.
    pub fn empty(offset: u32) -> Self {
        Self::new(offset, offset)
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// The span as a `usize` range, suitable for slicing and for ariadne.
    pub fn to_range(self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

/// Line start table for a script, used to turn offsets into `(line, column)`.
#[derive(Debug)]
pub struct LineIndex {
    /// Byte offset of the start of each line. The first entry is always 0.
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self { line_starts }
    }

    /// Convert a byte offset to a 1-based `(line, column)` pair.
    ///
    /// Columns count bytes from the start of the line.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line_idx = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line = (line_idx as u32) + 1;
        let col = offset - self.line_starts[line_idx] + 1;
        (line, col)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_covers_both_spans() {
        let merged = Span::new(4, 9).merge(Span::new(2, 6));
        assert_eq!(merged, Span::new(2, 9));
        assert_eq!(merged.len(), 7);
    }

    #[test]
    fn empty_span_at_offset() {
        let span = Span::empty(12);
        assert!(span.is_empty());
        assert_eq!(span.to_range(), 12..12);
    }

    #[test]
    fn line_col_across_script_lines() {
        let src = "use('test')\ndb.coll.find()\n";
        let idx = LineIndex::new(src);
        assert_eq!(idx.line_col(0), (1, 1));
        assert_eq!(idx.line_col(11), (1, 12));
        assert_eq!(idx.line_col(12), (2, 1));
        assert_eq!(idx.line_col(15), (2, 4));
        assert_eq!(idx.line_count(), 3);
    }
}
