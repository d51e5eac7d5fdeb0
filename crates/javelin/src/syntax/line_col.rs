//! Byte offset to line/column translation.
//!
//! Problems carry byte ranges. Line and column numbers are only computed when
//! somebody asks for them, through a [`LineIndex`] built from the line-start table
//! of the source.

use crate::syntax::TextSize;

/// Zero-based line and column (column counted in UTF-8 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
}

impl LineCol {
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for LineCol {
    /// One-based `line:column`, the way compilers print positions.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// Sorted table of line starts.
///
/// Recognizes `\n`, `\r\n` and a lone `\r` as line terminators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
    text_len: TextSize,
}

impl LineIndex {
    /// Scans `text` once and records the offset that follows every line terminator.
    ///
    /// ```rust
    /// use javelin::syntax::{LineCol, LineIndex, TextSize};
    ///
    /// let index = LineIndex::new("class A {\n  int x;\n}");
    /// assert_eq!(index.line_col(TextSize::new(12)), LineCol::new(1, 2));
    /// ```
    #[must_use]
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut line_starts = vec![TextSize::zero()];
        let mut i = 0;
        while let Some(found) = memchr::memchr2(b'\n', b'\r', &bytes[i..]) {
            let at = i + found;
            let next = if bytes[at] == b'\r' && bytes.get(at + 1) == Some(&b'\n') {
                at + 2
            } else {
                at + 1
            };
            line_starts.push(TextSize::of_len(next));
            i = next;
        }
        Self {
            line_starts,
            text_len: TextSize::of_len(text.len()),
        }
    }

    /// Offsets past the end of the text are clamped to the end.
    #[must_use]
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = offset.min(self.text_len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let column = offset.get() - self.line_starts[line].get();
        LineCol {
            line: u32::try_from(line).unwrap_or(u32::MAX),
            column,
        }
    }

    /// Inverse of [`LineIndex::line_col`]; `None` when the line does not exist.
    #[must_use]
    pub fn offset(&self, position: LineCol) -> Option<TextSize> {
        let start = self.line_start(position.line)?;
        let offset = start + position.column;
        (offset <= self.text_len).then_some(offset)
    }

    #[must_use]
    pub fn line_count(&self) -> u32 {
        u32::try_from(self.line_starts.len()).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn line_start(&self, line: u32) -> Option<TextSize> {
        self.line_starts.get(line as usize).copied()
    }

    #[must_use]
    pub fn line_starts(&self) -> &[TextSize] {
        &self.line_starts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_unix_line_endings() {
        let index = LineIndex::new("line 1\nline 2\nline 3");
        assert_eq!(index.line_col(TextSize::new(0)), LineCol::new(0, 0));
        assert_eq!(index.line_col(TextSize::new(6)), LineCol::new(0, 6));
        assert_eq!(index.line_col(TextSize::new(7)), LineCol::new(1, 0));
        assert_eq!(index.line_col(TextSize::new(14)), LineCol::new(2, 0));
    }

    #[test]
    fn test_line_col_mixed_line_endings() {
        let index = LineIndex::new("a\r\nb\rc\nd");
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.line_col(TextSize::new(3)), LineCol::new(1, 0));
        assert_eq!(index.line_col(TextSize::new(5)), LineCol::new(2, 0));
        assert_eq!(index.line_col(TextSize::new(7)), LineCol::new(3, 0));
    }

    #[test]
    fn test_line_col_clamps_past_end() {
        let index = LineIndex::new("ab");
        assert_eq!(index.line_col(TextSize::new(99)), LineCol::new(0, 2));
    }

    #[test]
    fn test_offset_round_trip() {
        let index = LineIndex::new("class A {\n  int x;\n}\n");
        for raw in 0..20 {
            let offset = TextSize::new(raw);
            assert_eq!(index.offset(index.line_col(offset)), Some(offset));
        }
        assert_eq!(index.offset(LineCol::new(9, 0)), None);
    }

    #[test]
    fn test_display_is_one_based() {
        assert_eq!(LineCol::new(0, 4).to_string(), "1:5");
    }
}
