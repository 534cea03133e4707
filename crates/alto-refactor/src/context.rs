//! Per-invocation analysis state: the document snapshot, the symbol oracle
//! and the cancellation signal.

use std::future::Future;
use std::sync::Arc;

use alto_config::RefactorConfig;
use alto_core::{FileId, LineEnding, LineIndex, Location, Position, Range, TextRange, TextSize};
use alto_syntax::{SyntaxSnapshot, SyntaxTree};
use tokio_util::sync::CancellationToken;

use crate::oracle::{HoverSymbol, OracleError, SignatureInfo, SymbolOracle};
use crate::RefactorError;

/// One immutable version of one document.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    file: FileId,
    syntax: SyntaxSnapshot,
    text: Arc<str>,
    line_index: LineIndex,
    line_ending: LineEnding,
}

impl DocumentSnapshot {
    /// Fails if `syntax` has already been superseded.
    pub fn new(file: FileId, syntax: SyntaxSnapshot) -> Result<Self, RefactorError> {
        let tree = syntax.tree().map_err(|stale| RefactorError::stale(&file, stale))?;
        let text = tree.shared_text();
        let line_index = LineIndex::new(&text);
        let line_ending = LineEnding::detect(&text);
        Ok(Self {
            file,
            syntax,
            text,
            line_index,
            line_ending,
        })
    }

    pub fn file(&self) -> &FileId {
        &self.file
    }

    pub fn version(&self) -> i32 {
        self.syntax.version()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// The syntax tree, unless a newer version of the document has been cached.
    pub fn tree(&self) -> Result<&SyntaxTree, RefactorError> {
        self.syntax
            .tree()
            .map_err(|stale| RefactorError::stale(&self.file, stale))
    }

    pub fn slice(&self, range: TextRange) -> &str {
        &self.text[u32::from(range.start()) as usize..u32::from(range.end()) as usize]
    }

    pub fn position(&self, offset: TextSize) -> Position {
        self.line_index.position(&self.text, offset)
    }

    pub fn offset(&self, position: Position) -> Option<TextSize> {
        self.line_index.offset_of_position(&self.text, position)
    }

    pub fn range(&self, range: TextRange) -> Range {
        self.line_index.range(&self.text, range)
    }

    pub fn text_range(&self, range: Range) -> Option<TextRange> {
        self.line_index.text_range(&self.text, range)
    }

    /// Leading whitespace of the line containing `offset`.
    pub fn indentation_at(&self, offset: TextSize) -> &str {
        self.line_index.indentation_at(&self.text, offset)
    }

    /// Byte range in this document of an oracle location, if it points here.
    pub fn local_range(&self, location: &Location) -> Option<TextRange> {
        (location.file == self.file)
            .then(|| self.text_range(location.range))
            .flatten()
    }
}

/// Everything one refactoring invocation needs.
///
/// Every oracle round trip goes through the context, which aborts with
/// [`RefactorError::Cancelled`] or [`RefactorError::StaleSnapshot`] instead
/// of continuing on an outdated document.
pub struct AnalysisContext {
    document: DocumentSnapshot,
    oracle: Arc<dyn SymbolOracle>,
    cancel: CancellationToken,
    config: RefactorConfig,
}

impl AnalysisContext {
    pub fn new(
        document: DocumentSnapshot,
        oracle: Arc<dyn SymbolOracle>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            document,
            oracle,
            cancel,
            config: RefactorConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: RefactorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn document(&self) -> &DocumentSnapshot {
        &self.document
    }

    pub fn config(&self) -> &RefactorConfig {
        &self.config
    }

    pub fn tree(&self) -> Result<&SyntaxTree, RefactorError> {
        self.document.tree()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Fails if the analysis was cancelled or the document moved on.
    pub fn check(&self) -> Result<(), RefactorError> {
        if self.cancel.is_cancelled() {
            return Err(RefactorError::Cancelled);
        }
        self.document.tree().map(|_| ())
    }

    async fn ask<T: Default>(
        &self,
        request: &'static str,
        offset: TextSize,
        call: impl Future<Output = Result<T, OracleError>>,
    ) -> Result<T, RefactorError> {
        self.check()?;
        let answer = tokio::select! {
            _ = self.cancel.cancelled() => return Err(RefactorError::Cancelled),
            answer = call => answer,
        };
        self.check()?;
        match answer {
            Ok(answer) => {
                tracing::trace!(request, offset = u32::from(offset), "oracle answered");
                Ok(answer)
            }
            Err(err) => {
                tracing::warn!(request, offset = u32::from(offset), error = %err, "oracle request failed");
                Ok(T::default())
            }
        }
    }

    pub async fn hover(&self, offset: TextSize) -> Result<Option<String>, RefactorError> {
        let position = self.document.position(offset);
        self.ask("hover", offset, self.oracle.hover(self.document.file(), position))
            .await
    }

    pub async fn hover_symbol(&self, offset: TextSize) -> Result<Option<HoverSymbol>, RefactorError> {
        Ok(self
            .hover(offset)
            .await?
            .as_deref()
            .and_then(HoverSymbol::parse))
    }

    pub async fn definition(&self, offset: TextSize) -> Result<Vec<Location>, RefactorError> {
        let position = self.document.position(offset);
        self.ask(
            "definition",
            offset,
            self.oracle.definition(self.document.file(), position),
        )
        .await
    }

    pub async fn references(&self, offset: TextSize) -> Result<Vec<Location>, RefactorError> {
        let position = self.document.position(offset);
        self.ask(
            "references",
            offset,
            self.oracle.references(self.document.file(), position),
        )
        .await
    }

    pub async fn signature_help(&self, offset: TextSize) -> Result<Option<SignatureInfo>, RefactorError> {
        let position = self.document.position(offset);
        self.ask(
            "signature_help",
            offset,
            self.oracle.signature_help(self.document.file(), position),
        )
        .await
    }
}
