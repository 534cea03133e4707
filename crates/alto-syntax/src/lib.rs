//! Syntax tree primitives for AL documents.
//!
//! Parsing itself is done by the external AL language service. Its tree is
//! replayed through [`SyntaxTreeBuilder`] into an owned, immutable
//! [`SyntaxTree`]: a flat arena of nodes addressed by [`NodeId`]. Trees are
//! versioned and shared through [`TreeCache`] as [`SyntaxSnapshot`]s, which
//! refuse access once a newer document version has been cached.

mod builder;
mod cache;
mod syntax_kind;
mod tree;

pub use builder::{Checkpoint, SyntaxTreeBuilder, TreeError};
pub use cache::{StaleTree, SyntaxSnapshot, TreeCache};
pub use syntax_kind::SyntaxKind;
pub use tree::{NodeData, NodeId, SyntaxNodeRef, SyntaxTree};
