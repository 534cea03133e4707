use std::sync::Arc;

use alto_core::{FileId, TextRange, TextSize};
use alto_refactor::{
    apply_text_edits, AnalysisContext, DocumentSnapshot, RefactorConfig, SymbolOracle,
    WorkspaceEdit,
};
use alto_syntax::{SyntaxSnapshot, SyntaxTree, TreeCache};
use tokio_util::sync::CancellationToken;

use crate::oracle::FixtureOracle;
use crate::parser::parse;

pub const FIXTURE_FILE: &str = "file:///Fixture.al";

const START: &str = "/*start*/";
const END: &str = "/*end*/";

/// Removes the `/*start*/` and `/*end*/` markers from `fixture` and returns
/// the clean text with the selection they delimited.
pub fn extract_range(fixture: &str) -> (String, TextRange) {
    let (head, rest) = fixture
        .split_once(START)
        .unwrap_or_else(|| panic!("fixture has no {START} marker"));
    let (selected, tail) = rest
        .split_once(END)
        .unwrap_or_else(|| panic!("fixture has no {END} marker after {START}"));

    let selection = TextRange::at(TextSize::of(head), TextSize::of(selected));
    (format!("{head}{selected}{tail}"), selection)
}

/// Extracts a cursor offset marked with `$0`.
pub fn extract_offset(fixture: &str) -> (String, TextSize) {
    let offset = fixture.find("$0").expect("fixture missing $0 marker");
    let text = fixture.replacen("$0", "", 1);
    (text, TextSize::from(offset as u32))
}

/// A single parsed document registered in a [`TreeCache`].
pub struct Fixture {
    file: FileId,
    cache: TreeCache,
    snapshot: SyntaxSnapshot,
}

impl Fixture {
    pub fn new(text: &str) -> Self {
        let file = FileId::new(FIXTURE_FILE);
        let cache = TreeCache::new();
        let tree = parse(text, 1).unwrap_or_else(|err| panic!("fixture failed to parse: {err}"));
        let snapshot = cache.insert(file.clone(), tree);
        Self {
            file,
            cache,
            snapshot,
        }
    }

    pub fn file(&self) -> &FileId {
        &self.file
    }

    pub fn tree(&self) -> &SyntaxTree {
        self.snapshot.tree().expect("fixture snapshot is current")
    }

    /// Oracle answering from the fixture's current tree.
    pub fn oracle(&self) -> FixtureOracle {
        FixtureOracle::new(self.file.clone(), self.tree())
    }

    pub fn context(&self) -> AnalysisContext {
        self.context_with(self.oracle())
    }

    pub fn context_with(&self, oracle: impl SymbolOracle + 'static) -> AnalysisContext {
        self.context_full(Arc::new(oracle), CancellationToken::new(), RefactorConfig::default())
    }

    pub fn context_full(
        &self,
        oracle: Arc<dyn SymbolOracle>,
        cancel: CancellationToken,
        config: RefactorConfig,
    ) -> AnalysisContext {
        let document = DocumentSnapshot::new(self.file.clone(), self.snapshot.clone())
            .expect("fixture snapshot is current");
        AnalysisContext::new(document, oracle, cancel).with_config(config)
    }

    /// Publishes a new version of the document, making earlier snapshots stale.
    pub fn update(&mut self, text: &str) {
        let version = self.snapshot.version() + 1;
        tracing::debug!(file = %self.file, version, "updating fixture");
        let tree = parse(text, version).unwrap_or_else(|err| panic!("fixture failed to parse: {err}"));
        self.snapshot = self.cache.insert(self.file.clone(), tree);
    }

    /// Applies the edits targeting this fixture and returns the new text.
    pub fn apply(&self, edit: &WorkspaceEdit) -> String {
        let edits: Vec<_> = edit
            .edits
            .iter()
            .filter(|e| e.file == self.file)
            .cloned()
            .collect();
        apply_text_edits(self.tree().text(), &edits).expect("edits apply cleanly")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_markers_are_removed() {
        let (text, range) = extract_range("a /*start*/bc/*end*/ d");
        assert_eq!(text, "a bc d");
        assert_eq!(&text[range], "bc");
    }

    #[test]
    fn offset_marker_is_removed() {
        let (text, offset) = extract_offset("Foo($0);");
        assert_eq!(text, "Foo();");
        assert_eq!(offset, TextSize::from(4));
    }
}
