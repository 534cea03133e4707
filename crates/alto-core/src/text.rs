//! Byte offsets and the editor's line/character coordinates.
//!
//! Trees and edits work on UTF-8 byte offsets ([`TextSize`]); the language
//! service speaks UTF-16 line/character pairs. [`LineIndex`] converts between
//! the two for one snapshot of a document.

use serde::{Deserialize, Serialize};

pub use text_size::{TextRange, TextSize};

/// Zero-based line and UTF-16 character, as exchanged with the language service.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// `other` lies inside `self`, bounds inclusive.
    pub fn contains_range(&self, other: &Range) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Byte span of one line; `content` stops before the terminator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct LineSpan {
    start: TextSize,
    content_end: TextSize,
}

/// Line table of a document snapshot. `\n`, `\r\n` and a lone `\r` all end a
/// line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LineIndex {
    lines: Vec<LineSpan>,
    len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut lines = Vec::new();
        let mut start = 0usize;
        let mut rest = text.char_indices().peekable();
        while let Some((idx, ch)) = rest.next() {
            let next_start = match ch {
                '\r' if rest.peek().is_some_and(|&(_, c)| c == '\n') => {
                    rest.next();
                    idx + 2
                }
                '\r' | '\n' => idx + 1,
                _ => continue,
            };
            lines.push(LineSpan {
                start: size(start),
                content_end: size(idx),
            });
            start = next_start;
        }
        lines.push(LineSpan {
            start: size(start),
            content_end: size(text.len()),
        });
        Self {
            lines,
            len: size(text.len()),
        }
    }

    fn line_containing(&self, offset: TextSize) -> usize {
        let offset = offset.min(self.len);
        self.lines.partition_point(|line| line.start <= offset).saturating_sub(1)
    }

    /// Offset of the first byte of the line containing `offset`.
    pub fn line_start_of(&self, offset: TextSize) -> TextSize {
        self.lines[self.line_containing(offset)].start
    }

    /// Leading whitespace of the line containing `offset`, up to `offset`.
    pub fn indentation_at<'a>(&self, text: &'a str, offset: TextSize) -> &'a str {
        let start = usize::from(self.line_start_of(offset));
        let end = usize::from(offset).min(text.len());
        let head = &text[start..end];
        let indent = head.len() - head.trim_start_matches([' ', '\t']).len();
        &head[..indent]
    }

    /// The editor position of `offset`. Offsets inside a line terminator
    /// map to the end of that line.
    ///
    /// `text` must be the snapshot this index was built from.
    pub fn position(&self, text: &str, offset: TextSize) -> Position {
        debug_assert_eq!(size(text.len()), self.len);
        let line = self.line_containing(offset);
        let span = self.lines[line];
        let end = offset.min(self.len).min(span.content_end);
        let character = text[TextRange::new(span.start, end)]
            .encode_utf16()
            .count();
        Position::new(line as u32, character as u32)
    }

    /// The byte offset of `position`, or `None` when the line does not exist,
    /// the character is past the end of the line, or it splits a surrogate
    /// pair.
    pub fn offset_of_position(&self, text: &str, position: Position) -> Option<TextSize> {
        debug_assert_eq!(size(text.len()), self.len);
        let span = *self.lines.get(position.line as usize)?;
        let content = &text[TextRange::new(span.start, span.content_end)];

        let mut character = 0u32;
        for (idx, ch) in content.char_indices() {
            match character.cmp(&position.character) {
                std::cmp::Ordering::Equal => return Some(span.start + size(idx)),
                std::cmp::Ordering::Greater => return None,
                std::cmp::Ordering::Less => character += ch.len_utf16() as u32,
            }
        }
        (character == position.character).then_some(span.content_end)
    }

    pub fn range(&self, text: &str, range: TextRange) -> Range {
        Range::new(
            self.position(text, range.start()),
            self.position(text, range.end()),
        )
    }

    pub fn text_range(&self, text: &str, range: Range) -> Option<TextRange> {
        let start = self.offset_of_position(text, range.start)?;
        let end = self.offset_of_position(text, range.end)?;
        (start <= end).then(|| TextRange::new(start, end))
    }
}

fn size(len: usize) -> TextSize {
    TextSize::from(len as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crlf_terminators_are_not_part_of_a_line() {
        let text = "begin\r\n    x := 1;\r\nend;";
        let index = LineIndex::new(text);

        assert_eq!(index.line_start_of(TextSize::from(11)), TextSize::from(7));
        assert_eq!(index.position(text, TextSize::from(11)), Position::new(1, 4));
        assert_eq!(index.position(text, TextSize::from(6)), Position::new(0, 5));
        assert_eq!(
            index.offset_of_position(text, Position::new(2, 0)),
            Some(TextSize::from(20))
        );
    }

    #[test]
    fn indentation_stops_at_offset() {
        let text = "begin\n        Foo();\nend;";
        let index = LineIndex::new(text);
        let foo = TextSize::from(text.find("Foo").unwrap() as u32);

        assert_eq!(index.indentation_at(text, foo), "        ");
        assert_eq!(index.indentation_at(text, foo + TextSize::from(1)), "        ");
        assert_eq!(index.indentation_at(text, TextSize::from(0)), "");
    }

    #[test]
    fn quoted_identifiers_with_astral_chars_count_utf16_units() {
        let text = "\"Qty😀\" := 1;\nx";
        let index = LineIndex::new(text);
        let after = TextSize::from(text.find('"').unwrap() as u32 + 9);

        assert_eq!(index.position(text, after), Position::new(0, 7));
        assert_eq!(index.offset_of_position(text, Position::new(0, 7)), Some(after));
        assert_eq!(index.offset_of_position(text, Position::new(0, 5)), None);
        assert_eq!(index.offset_of_position(text, Position::new(0, 40)), None);
        assert_eq!(index.offset_of_position(text, Position::new(3, 0)), None);
    }
}
