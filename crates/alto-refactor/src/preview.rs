use std::collections::BTreeMap;

use alto_core::FileId;
use similar::TextDiff;

use crate::edit::{apply_text_edits, EditError, WorkspaceEdit};

/// The effect of a refactoring on one document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilePreview {
    pub file: FileId,
    pub modified: String,
    /// `a/<file>` → `b/<file>` unified diff with three lines of context.
    pub diff: String,
    pub edit_count: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RefactoringPreview {
    pub files: Vec<FilePreview>,
}

impl RefactoringPreview {
    pub fn edit_count(&self) -> usize {
        self.files.iter().map(|f| f.edit_count).sum()
    }
}

/// Shows what `edit` would do to `sources` without applying it anywhere.
/// Documents the edit leaves unchanged are omitted; documents missing from
/// `sources` are treated as empty.
pub fn generate_preview(
    sources: &BTreeMap<FileId, String>,
    edit: &WorkspaceEdit,
) -> Result<RefactoringPreview, EditError> {
    let mut edit = edit.clone();
    edit.normalize()?;

    let mut preview = RefactoringPreview::default();
    for file in edit.files() {
        let edits = edit.edits_for(file);
        let original = sources.get(file).map_or("", String::as_str);
        let modified = apply_text_edits(original, &edits)?;
        if modified == original {
            continue;
        }
        let diff = TextDiff::from_lines(original, modified.as_str())
            .unified_diff()
            .context_radius(3)
            .header(&format!("a/{file}"), &format!("b/{file}"))
            .to_string();
        preview.files.push(FilePreview {
            file: file.clone(),
            modified,
            diff,
            edit_count: edits.len(),
        });
    }
    Ok(preview)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::TextEdit;
    use alto_core::{TextRange, TextSize};

    #[test]
    fn unchanged_documents_are_left_out() {
        let calc = FileId::new("file:///Calc.Codeunit.al");
        let other = FileId::new("file:///Other.Codeunit.al");
        let sources = BTreeMap::from([
            (calc.clone(), "x := 1;\ny := 2;\n".to_string()),
            (other.clone(), "z := 3;\n".to_string()),
        ]);
        let edit = WorkspaceEdit::new(vec![
            TextEdit::replace(calc, TextRange::new(TextSize::from(5), TextSize::from(6)), "3"),
            TextEdit::replace(other, TextRange::new(TextSize::from(5), TextSize::from(6)), "3"),
        ]);

        let preview = generate_preview(&sources, &edit).unwrap();
        assert_eq!(preview.files.len(), 1);
        assert_eq!(preview.edit_count(), 1);
        assert_eq!(preview.files[0].modified, "x := 3;\ny := 2;\n");
        assert!(preview.files[0].diff.contains("-x := 1;\n+x := 3;"));
    }
}
