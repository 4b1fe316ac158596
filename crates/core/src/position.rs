//! Byte offset to 1-based line/column conversion

use serde::{Deserialize, Serialize};

/// 1-based source position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// Newline table for one source text.
///
/// `position(offset)` gives the same answer as counting the `\n` bytes in
/// `source[..offset]`, without rescanning the prefix on every call.
#[derive(Debug, Clone)]
pub struct LineIndex {
    newlines: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let newlines = source
            .bytes()
            .enumerate()
            .filter(|(_, b)| *b == b'\n')
            .map(|(i, _)| i)
            .collect();
        Self {
            newlines,
            len: source.len(),
        }
    }

    /// Convert a byte offset to a position. Offsets past the end are clamped.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.len);
        // Number of newlines strictly before `offset`
        let line_idx = self.newlines.partition_point(|&nl| nl < offset);
        let line_start = if line_idx == 0 {
            0
        } else {
            self.newlines[line_idx - 1] + 1
        };
        Position {
            line: line_idx + 1,
            column: offset - line_start + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive(source: &str, offset: usize) -> Position {
        let prefix = &source[..offset];
        let line = prefix.matches('\n').count() + 1;
        let column = prefix.len() - prefix.rfind('\n').map(|i| i + 1).unwrap_or(0) + 1;
        Position { line, column }
    }

    #[test]
    fn matches_prefix_counting() {
        let source = "const a = 1;\n\nfetch('/x');\n  eval(y)\n";
        for offset in 0..=source.len() {
            assert_eq!(LineIndex::new(source).position(offset), naive(source, offset));
        }
    }

    #[test]
    fn first_position_is_one_one() {
        let index = LineIndex::new("");
        assert_eq!(index.position(0), Position { line: 1, column: 1 });
        assert_eq!(index.position(10), Position { line: 1, column: 1 });
    }

    #[test]
    fn offset_right_after_newline_starts_next_line() {
        let index = LineIndex::new("ab\ncd");
        assert_eq!(index.position(2), Position { line: 1, column: 3 });
        assert_eq!(index.position(3), Position { line: 2, column: 1 });
    }
}
