//! Byte spans and line/column mapping for SDL source text

#![allow(clippy::cast_possible_truncation)] // Spans are u32; documents over 4GB are unsupported

use std::ops::Range;

/// A half-open byte range in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Byte offset of the first byte
    pub start: u32,
    /// Byte offset one past the last byte
    pub end: u32,
}

impl Span {
    /// Create a new span
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// A zero-width span at `offset`
    #[must_use]
    pub const fn point(offset: u32) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Span from a `usize` byte range, as logos reports it
    #[must_use]
    pub fn from_range(range: Range<usize>) -> Self {
        Self {
            start: range.start as u32,
            end: range.end as u32,
        }
    }

    /// Length in bytes
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    /// True for zero-width spans
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both `self` and `other`
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        let start = if self.start < other.start {
            self.start
        } else {
            other.start
        };
        let end = if self.end > other.end {
            self.end
        } else {
            other.end
        };
        Self { start, end }
    }

    /// Byte range for slicing the source
    #[must_use]
    pub const fn as_range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::from_range(range)
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A 1-indexed line and column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: u32,
    /// Column counted in characters, not bytes
    pub column: u32,
}

impl Location {
    /// Create a location from a 1-indexed line and column
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Maps byte offsets to line/column locations and back to line text
#[derive(Debug, Clone)]
pub struct LineIndex<'source> {
    source: &'source str,
    /// Byte offset where each line starts
    line_starts: Vec<u32>,
}

impl<'source> LineIndex<'source> {
    /// Index the line starts of `source`
    #[must_use]
    pub fn new(source: &'source str) -> Self {
        let mut line_starts = vec![0];
        for (i, c) in source.char_indices() {
            if c == '\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self {
            source,
            line_starts,
        }
    }

    /// Location of a byte offset. Offsets past the end clamp to the last line.
    #[must_use]
    pub fn location(&self, offset: u32) -> Location {
        let offset = offset.min(self.source.len() as u32);
        let line = self.line_of(offset);
        let line_start = self.line_starts[line] as usize;
        let column = self.source[line_start..offset as usize].chars().count() as u32 + 1;
        Location {
            line: (line + 1) as u32,
            column,
        }
    }

    /// Text of a 1-indexed line without its line terminator
    #[must_use]
    pub fn line_text(&self, line: u32) -> Option<&'source str> {
        let index = (line as usize).checked_sub(1)?;
        let start = *self.line_starts.get(index)? as usize;
        let end = self
            .line_starts
            .get(index + 1)
            .map_or(self.source.len(), |&next| next as usize - 1);
        Some(self.source[start..end].trim_end_matches('\r'))
    }

    /// Byte offset where a 1-indexed line starts
    #[must_use]
    pub fn line_start(&self, line: u32) -> Option<u32> {
        let index = (line as usize).checked_sub(1)?;
        self.line_starts.get(index).copied()
    }

    /// Number of lines; a trailing newline starts an empty last line
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    fn line_of(&self, offset: u32) -> usize {
        self.line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1)
    }
}
