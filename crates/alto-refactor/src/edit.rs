use std::collections::BTreeSet;

use alto_core::{FileId, TextRange, TextSize};
use thiserror::Error;

/// Replaces `range` of the analysed snapshot of `file` with `replacement`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextEdit {
    pub file: FileId,
    pub range: TextRange,
    pub replacement: String,
}

impl TextEdit {
    pub fn insert(file: FileId, offset: TextSize, text: impl Into<String>) -> Self {
        Self::replace(file, TextRange::empty(offset), text)
    }

    pub fn replace(file: FileId, range: TextRange, text: impl Into<String>) -> Self {
        Self {
            file,
            range,
            replacement: text.into(),
        }
    }

    fn sort_key(&self) -> (&FileId, TextSize, TextSize) {
        (&self.file, self.range.start(), self.range.end())
    }
}

/// Everything a refactoring changes. Built only once an analysis has
/// succeeded, so the host either applies all of it or none.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkspaceEdit {
    pub edits: Vec<TextEdit>,
}

impl WorkspaceEdit {
    pub fn new(edits: Vec<TextEdit>) -> Self {
        Self { edits }
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Documents touched by the edit, in sorted order.
    pub fn files(&self) -> BTreeSet<&FileId> {
        self.edits.iter().map(|e| &e.file).collect()
    }

    /// Edits of one document, in document order.
    pub fn edits_for(&self, file: &FileId) -> Vec<TextEdit> {
        let mut edits: Vec<_> = self.edits.iter().filter(|e| &e.file == file).cloned().collect();
        edits.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        edits
    }

    /// Puts the edits in document order. Identical edits collapse, insertions
    /// at one offset are concatenated, and any other overlap is an error.
    pub fn normalize(&mut self) -> Result<(), EditError> {
        let mut edits = std::mem::take(&mut self.edits);
        edits.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        let mut out: Vec<TextEdit> = Vec::with_capacity(edits.len());
        for edit in edits {
            let Some(prev) = out.last_mut().filter(|prev| prev.file == edit.file) else {
                out.push(edit);
                continue;
            };
            if *prev == edit {
                continue;
            }
            if prev.range.is_empty() && prev.range == edit.range {
                prev.replacement.push_str(&edit.replacement);
                continue;
            }
            if edit.range.start() < prev.range.end() || prev.range == edit.range {
                return Err(EditError::OverlappingEdits {
                    file: edit.file,
                    first: prev.range,
                    second: edit.range,
                });
            }
            out.push(edit);
        }
        self.edits = out;
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum EditError {
    #[error("edits {first:?} and {second:?} overlap in {file}")]
    OverlappingEdits {
        file: FileId,
        first: TextRange,
        second: TextRange,
    },
    #[error("edit {range:?} does not fit a document of {len} bytes ({file})")]
    OutOfBounds {
        file: FileId,
        range: TextRange,
        len: usize,
    },
}

/// Applies `edits`, which must not overlap, to `original`.
pub fn apply_text_edits(original: &str, edits: &[TextEdit]) -> Result<String, EditError> {
    let mut ordered: Vec<&TextEdit> = edits.iter().collect();
    ordered.sort_by_key(|e| (e.range.start(), e.range.end()));

    let mut out = String::with_capacity(original.len());
    let mut copied = 0usize;
    for edit in ordered {
        let start = usize::from(edit.range.start());
        let end = usize::from(edit.range.end());
        if start < copied || original.get(start..end).is_none() {
            return Err(EditError::OutOfBounds {
                file: edit.file.clone(),
                range: edit.range,
                len: original.len(),
            });
        }
        out.push_str(&original[copied..start]);
        out.push_str(&edit.replacement);
        copied = end;
    }
    out.push_str(&original[copied..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file() -> FileId {
        FileId::new("file:///Calc.Codeunit.al")
    }

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::from(start), TextSize::from(end))
    }

    #[test]
    fn inserts_at_one_offset_are_concatenated() {
        let mut edit = WorkspaceEdit::new(vec![
            TextEdit::insert(file(), TextSize::from(7), "\n    Foo;"),
            TextEdit::replace(file(), range(0, 1), "y"),
            TextEdit::insert(file(), TextSize::from(7), "\n    Bar;"),
            TextEdit::replace(file(), range(0, 1), "y"),
        ]);
        edit.normalize().unwrap();

        assert_eq!(edit.edits.len(), 2);
        assert_eq!(
            apply_text_edits("x := 1;", &edit.edits).unwrap(),
            "y := 1;\n    Foo;\n    Bar;"
        );
    }

    #[test]
    fn overlapping_replacements_are_rejected() {
        let mut edit = WorkspaceEdit::new(vec![
            TextEdit::replace(file(), range(0, 4), "a"),
            TextEdit::replace(file(), range(2, 6), "b"),
        ]);
        assert!(matches!(
            edit.normalize(),
            Err(EditError::OverlappingEdits { .. })
        ));
    }

    #[test]
    fn edits_past_the_end_are_rejected() {
        let edits = vec![TextEdit::replace(file(), range(2, 10), "x")];
        assert!(matches!(
            apply_text_edits("end", &edits),
            Err(EditError::OutOfBounds { len: 3, .. })
        ));
    }
}
