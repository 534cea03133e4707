use std::sync::Arc;

use alto_core::{TextRange, TextSize};
use smol_str::SmolStr;
use thiserror::Error;

use crate::tree::{NodeData, NodeId, SyntaxTree};
use crate::SyntaxKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("the tree has no root node")]
    MissingRoot,
    #[error("a second root node was started")]
    MultipleRoots,
    #[error("{open} node(s) were started but never finished")]
    UnfinishedNodes { open: usize },
    #[error("finish_node called without an open node")]
    UnbalancedFinish,
    #[error("{kind:?} at {range:?} is not contained in its parent's full range {parent:?}")]
    NotContained {
        kind: SyntaxKind,
        range: TextRange,
        parent: TextRange,
    },
    #[error("siblings {first:?} and {second:?} overlap or are out of order")]
    SiblingOverlap { first: TextRange, second: TextRange },
    #[error("{kind:?} at {range:?} extends past the end of the text ({len:?})")]
    OutOfBounds {
        kind: SyntaxKind,
        range: TextRange,
        len: TextSize,
    },
    #[error("start_node_at checkpoint did not wrap any node")]
    EmptyCheckpoint,
}

/// Position in the builder that a later [`SyntaxTreeBuilder::start_node_at`]
/// can wrap from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    parent: Option<NodeId>,
    child_count: usize,
}

/// Incremental constructor for [`SyntaxTree`]s.
///
/// The bridge to the external parser walks its tree and replays it through
/// this builder. Nodes are opened with [`start_node`](Self::start_node) and
/// closed with [`finish_node`](Self::finish_node); containment and sibling
/// ordering are validated once in [`finish`](Self::finish).
pub struct SyntaxTreeBuilder {
    text: Arc<str>,
    version: i32,
    nodes: Vec<NodeData>,
    stack: Vec<NodeId>,
    root: Option<NodeId>,
    errors: Vec<TreeError>,
}

impl SyntaxTreeBuilder {
    pub fn new(text: impl Into<Arc<str>>, version: i32) -> Self {
        Self {
            text: text.into(),
            version,
            nodes: Vec::new(),
            stack: Vec::new(),
            root: None,
            errors: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId::from_raw(self.nodes.len() as u32);
        self.nodes.push(data);
        id
    }

    /// Opens a node. `full_start` is where its leading trivia begins and
    /// `start` where the node itself begins.
    pub fn start_node(&mut self, kind: SyntaxKind, full_start: TextSize, start: TextSize) -> NodeId {
        let parent = self.stack.last().copied();
        let id = self.alloc(NodeData {
            kind,
            range: TextRange::empty(start),
            full_range: TextRange::new(full_start.min(start), start),
            parent,
            children: Vec::new(),
            name: None,
            data_type: None,
        });
        match parent {
            Some(parent) => self.nodes[parent.idx()].children.push(id),
            None if self.root.is_none() => self.root = Some(id),
            None => self.errors.push(TreeError::MultipleRoots),
        }
        self.stack.push(id);
        id
    }

    pub fn checkpoint(&self) -> Checkpoint {
        let parent = self.stack.last().copied();
        let child_count = parent.map_or(0, |p| self.nodes[p.idx()].children.len());
        Checkpoint {
            parent,
            child_count,
        }
    }

    /// Opens a node that adopts every child finished since `checkpoint`.
    ///
    /// This is how left-recursive productions (binary operators, member
    /// access, calls) are built once the operator has been seen.
    pub fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) -> NodeId {
        let Some(parent) = checkpoint.parent else {
            self.errors.push(TreeError::EmptyCheckpoint);
            return self.start_node(kind, TextSize::from(0), TextSize::from(0));
        };
        let adopted: Vec<NodeId> = self.nodes[parent.idx()]
            .children
            .drain(checkpoint.child_count..)
            .collect();
        let Some(first) = adopted.first().copied() else {
            self.errors.push(TreeError::EmptyCheckpoint);
            return self.start_node(kind, TextSize::from(0), TextSize::from(0));
        };

        let first_data = &self.nodes[first.idx()];
        let (full_start, start) = (first_data.full_range.start(), first_data.range.start());
        let id = self.start_node(kind, full_start, start);
        for child in &adopted {
            self.nodes[child.idx()].parent = Some(id);
        }
        self.nodes[id.idx()].children = adopted;
        id
    }

    pub fn set_name(&mut self, name: impl AsRef<str>) {
        if let Some(id) = self.stack.last() {
            self.nodes[id.idx()].name = Some(SmolStr::new(name.as_ref()));
        }
    }

    pub fn set_data_type(&mut self, data_type: impl AsRef<str>) {
        if let Some(id) = self.stack.last() {
            self.nodes[id.idx()].data_type = Some(SmolStr::new(data_type.as_ref()));
        }
    }

    /// Closes the innermost open node at `end`.
    pub fn finish_node(&mut self, end: TextSize) {
        let Some(id) = self.stack.pop() else {
            self.errors.push(TreeError::UnbalancedFinish);
            return;
        };
        let data = &mut self.nodes[id.idx()];
        let end = end.max(data.range.start());
        data.range = TextRange::new(data.range.start(), end);
        data.full_range = TextRange::new(data.full_range.start(), end);
    }

    /// Convenience for a childless node.
    pub fn leaf(
        &mut self,
        kind: SyntaxKind,
        full_start: TextSize,
        range: TextRange,
        name: Option<&str>,
    ) -> NodeId {
        let id = self.start_node(kind, full_start, range.start());
        if let Some(name) = name {
            self.set_name(name);
        }
        self.finish_node(range.end());
        id
    }

    /// Extends the most recently finished child of the open node to `end`.
    ///
    /// Statement terminators (`;`) are attached this way once the statement
    /// list sees them.
    pub fn extend_last_child(&mut self, end: TextSize) {
        let Some(parent) = self.stack.last() else {
            return;
        };
        let Some(last) = self.nodes[parent.idx()].children.last().copied() else {
            return;
        };
        let data = &mut self.nodes[last.idx()];
        if end > data.range.end() {
            data.range = TextRange::new(data.range.start(), end);
            data.full_range = TextRange::new(data.full_range.start(), end);
        }
    }

    pub fn finish(self) -> Result<SyntaxTree, TreeError> {
        if let Some(err) = self.errors.into_iter().next() {
            return Err(err);
        }
        if !self.stack.is_empty() {
            return Err(TreeError::UnfinishedNodes {
                open: self.stack.len(),
            });
        }
        let root = self.root.ok_or(TreeError::MissingRoot)?;
        let tree = SyntaxTree {
            text: self.text,
            version: self.version,
            nodes: self.nodes,
            root,
        };
        validate(&tree)?;
        tracing::trace!(nodes = tree.len(), version = tree.version(), "built syntax tree");
        Ok(tree)
    }
}

fn validate(tree: &SyntaxTree) -> Result<(), TreeError> {
    let len = TextSize::from(tree.text.len() as u32);
    for data in &tree.nodes {
        if data.full_range.end() > len {
            return Err(TreeError::OutOfBounds {
                kind: data.kind,
                range: data.full_range,
                len,
            });
        }
        if let Some(parent) = data.parent {
            let parent_range = tree.nodes[parent.idx()].full_range;
            if !parent_range.contains_range(data.range) {
                return Err(TreeError::NotContained {
                    kind: data.kind,
                    range: data.range,
                    parent: parent_range,
                });
            }
        }
        for pair in data.children.windows(2) {
            let first = tree.nodes[pair[0].idx()].range;
            let second = tree.nodes[pair[1].idx()].range;
            if first.end() > second.start() {
                return Err(TreeError::SiblingOverlap { first, second });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: u32) -> TextSize {
        TextSize::from(n)
    }

    #[test]
    fn checkpoint_wraps_finished_children() {
        // "a + b"
        let mut builder = SyntaxTreeBuilder::new("a + b", 1);
        builder.start_node(SyntaxKind::CompilationUnit, size(0), size(0));
        let cp = builder.checkpoint();
        builder.leaf(SyntaxKind::IdentifierName, size(0), TextRange::new(size(0), size(1)), Some("a"));
        builder.start_node_at(cp, SyntaxKind::AddExpression);
        builder.leaf(SyntaxKind::IdentifierName, size(3), TextRange::new(size(4), size(5)), Some("b"));
        builder.finish_node(size(5));
        builder.finish_node(size(5));
        let tree = builder.finish().unwrap();

        let add = tree.root().child(0).unwrap();
        assert_eq!(add.kind(), SyntaxKind::AddExpression);
        assert_eq!(add.text(), "a + b");
        let names: Vec<_> = add.children().filter_map(|c| c.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(add.child(0).unwrap().parent(), Some(add));
    }

    #[test]
    fn rejects_child_outside_parent() {
        let mut builder = SyntaxTreeBuilder::new("abc def", 1);
        builder.start_node(SyntaxKind::CompilationUnit, size(0), size(0));
        builder.start_node(SyntaxKind::Block, size(0), size(0));
        builder.leaf(SyntaxKind::IdentifierName, size(4), TextRange::new(size(4), size(7)), None);
        builder.finish_node(size(3));
        builder.finish_node(size(7));

        assert!(matches!(builder.finish(), Err(TreeError::NotContained { .. })));
    }

    #[test]
    fn rejects_unfinished_nodes() {
        let mut builder = SyntaxTreeBuilder::new("x", 1);
        builder.start_node(SyntaxKind::CompilationUnit, size(0), size(0));
        assert_eq!(
            builder.finish().unwrap_err(),
            TreeError::UnfinishedNodes { open: 1 }
        );
    }
}
