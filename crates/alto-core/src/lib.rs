//! Core shared types for alto.
//!
//! This crate is intentionally small: text coordinates, file identity, line
//! endings and AL identifier names. Everything else builds on top of it.

mod line_ending;
mod name;
mod text;

use serde::{Deserialize, Serialize};

pub use line_ending::LineEnding;
pub use name::Name;
pub use text::{LineIndex, Position, Range, TextRange, TextSize};

/// Identity of a document in the workspace (usually its URI).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileId(pub String);

impl FileId {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A range inside a specific document, as reported by the language service.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: FileId,
    pub range: Range,
}

impl Location {
    #[inline]
    pub fn new(file: FileId, range: Range) -> Self {
        Self { file, range }
    }
}
