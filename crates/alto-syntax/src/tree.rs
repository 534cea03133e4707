use std::fmt;
use std::sync::Arc;

use alto_core::{TextRange, TextSize};
use smol_str::SmolStr;

use crate::SyntaxKind;

/// Index of a node inside a [`SyntaxTree`] arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        NodeId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    pub kind: SyntaxKind,
    /// Span of the node without leading trivia.
    pub range: TextRange,
    /// Span of the node including leading whitespace and comments.
    pub full_range: TextRange,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Identifier text for named nodes, quotes preserved.
    pub name: Option<SmolStr>,
    /// Declared type text for declarations and type references.
    pub data_type: Option<SmolStr>,
}

/// Immutable syntax tree for one version of one document.
///
/// Nodes live in a flat arena and refer to each other by [`NodeId`]. The tree
/// is never mutated after construction; an edit to the document produces a
/// new tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    pub(crate) text: Arc<str>,
    pub(crate) version: i32,
    pub(crate) nodes: Vec<NodeData>,
    pub(crate) root: NodeId,
}

impl SyntaxTree {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn shared_text(&self) -> Arc<str> {
        Arc::clone(&self.text)
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> SyntaxNodeRef<'_> {
        self.node(self.root)
    }

    /// Cursor for `id`. Panics if `id` was not allocated by this tree.
    pub fn node(&self, id: NodeId) -> SyntaxNodeRef<'_> {
        assert!(id.idx() < self.nodes.len(), "{id:?} does not belong to this tree");
        SyntaxNodeRef { tree: self, id }
    }

    pub fn get(&self, id: NodeId) -> Option<SyntaxNodeRef<'_>> {
        (id.idx() < self.nodes.len()).then_some(SyntaxNodeRef { tree: self, id })
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.idx()]
    }

    /// Innermost node whose range contains `offset`, optionally restricted to
    /// `filter` kinds.
    ///
    /// A node contains `offset` when `start <= offset < end`.
    pub fn find_node(
        &self,
        offset: TextSize,
        filter: Option<&[SyntaxKind]>,
    ) -> Option<SyntaxNodeRef<'_>> {
        self.descend(offset, filter, |range, offset| {
            range.start() <= offset && offset < range.end()
        })
    }

    /// Like [`SyntaxTree::find_node`] but biased towards nodes ending at
    /// `offset` (`start < offset <= end`). Used for the end of a selection.
    pub fn find_node_ending_at(
        &self,
        offset: TextSize,
        filter: Option<&[SyntaxKind]>,
    ) -> Option<SyntaxNodeRef<'_>> {
        self.descend(offset, filter, |range, offset| {
            range.start() < offset && offset <= range.end()
        })
    }

    fn descend(
        &self,
        offset: TextSize,
        filter: Option<&[SyntaxKind]>,
        contains: impl Fn(TextRange, TextSize) -> bool,
    ) -> Option<SyntaxNodeRef<'_>> {
        let accepts = |node: SyntaxNodeRef<'_>| filter.map_or(true, |kinds| kinds.contains(&node.kind()));

        let mut current = self.root();
        if !contains(current.range(), offset) {
            return None;
        }
        let mut best = accepts(current).then_some(current);
        while let Some(child) = current.children().find(|c| contains(c.range(), offset)) {
            if accepts(child) {
                best = Some(child);
            }
            current = child;
        }
        best
    }

    /// Pre-order search below `node` (excluding `node`) for nodes of `kinds`.
    ///
    /// With `stop_at_first_match`, the subtree of a matching node is not
    /// searched further.
    pub fn collect_descendants(
        &self,
        node: NodeId,
        kinds: &[SyntaxKind],
        stop_at_first_match: bool,
    ) -> Vec<SyntaxNodeRef<'_>> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.data(node).children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let data = self.data(id);
            if kinds.contains(&data.kind) {
                out.push(self.node(id));
                if stop_at_first_match {
                    continue;
                }
            }
            stack.extend(data.children.iter().rev().copied());
        }
        out
    }

    /// Child-index sequence leading from `ancestor` down to `descendant`.
    ///
    /// Returns `None` if `ancestor` is not an ancestor of (or equal to)
    /// `descendant`.
    pub fn path_to(&self, ancestor: NodeId, descendant: NodeId) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        let mut current = descendant;
        while current != ancestor {
            let node = self.node(current);
            path.push(node.index_in_parent()?);
            current = node.parent()?.id();
        }
        path.reverse();
        Some(path)
    }

    /// Lowest node that is an ancestor of (or equal to) both `a` and `b`.
    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<SyntaxNodeRef<'_>> {
        let a_chain: Vec<NodeId> = self.node(a).ancestors_inclusive().map(|n| n.id()).collect();
        self.node(b)
            .ancestors_inclusive()
            .find(|candidate| a_chain.contains(&candidate.id()))
    }
}

/// Borrowed cursor into a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct SyntaxNodeRef<'a> {
    tree: &'a SyntaxTree,
    id: NodeId,
}

impl PartialEq for SyntaxNodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for SyntaxNodeRef<'_> {}

impl fmt::Debug for SyntaxNodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.range())?;
        if let Some(name) = self.name() {
            write!(f, " {name:?}")?;
        }
        Ok(())
    }
}

impl<'a> SyntaxNodeRef<'a> {
    pub fn id(self) -> NodeId {
        self.id
    }

    pub fn tree(self) -> &'a SyntaxTree {
        self.tree
    }

    fn data(self) -> &'a NodeData {
        self.tree.data(self.id)
    }

    pub fn kind(self) -> SyntaxKind {
        self.data().kind
    }

    pub fn range(self) -> TextRange {
        self.data().range
    }

    pub fn full_range(self) -> TextRange {
        self.data().full_range
    }

    pub fn text(self) -> &'a str {
        let range = self.range();
        &self.tree.text[u32::from(range.start()) as usize..u32::from(range.end()) as usize]
    }

    pub fn name(self) -> Option<&'a str> {
        self.data().name.as_deref()
    }

    pub fn data_type(self) -> Option<&'a str> {
        self.data().data_type.as_deref()
    }

    pub fn parent(self) -> Option<SyntaxNodeRef<'a>> {
        self.data().parent.map(|id| self.tree.node(id))
    }

    pub fn children(self) -> impl DoubleEndedIterator<Item = SyntaxNodeRef<'a>> + ExactSizeIterator {
        let tree = self.tree;
        self.data().children.iter().map(move |id| tree.node(*id))
    }

    pub fn child(self, index: usize) -> Option<SyntaxNodeRef<'a>> {
        self.data().children.get(index).map(|id| self.tree.node(*id))
    }

    pub fn first_child_of_kind(self, kind: SyntaxKind) -> Option<SyntaxNodeRef<'a>> {
        self.children().find(|c| c.kind() == kind)
    }

    /// Ancestors starting at the parent.
    pub fn ancestors(self) -> impl Iterator<Item = SyntaxNodeRef<'a>> {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    /// Ancestors starting at `self`.
    pub fn ancestors_inclusive(self) -> impl Iterator<Item = SyntaxNodeRef<'a>> {
        std::iter::successors(Some(self), |n| n.parent())
    }

    pub fn ancestor_of_kind(self, kinds: &[SyntaxKind]) -> Option<SyntaxNodeRef<'a>> {
        self.ancestors().find(|n| kinds.contains(&n.kind()))
    }

    /// Pre-order traversal of `self` and everything below it.
    pub fn descendants(self) -> impl Iterator<Item = SyntaxNodeRef<'a>> {
        let tree = self.tree;
        let mut stack = vec![self.id];
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(tree.data(id).children.iter().rev().copied());
            Some(tree.node(id))
        })
    }

    pub fn index_in_parent(self) -> Option<usize> {
        let parent = self.parent()?;
        parent.data().children.iter().position(|id| *id == self.id)
    }

    pub fn next_sibling(self) -> Option<SyntaxNodeRef<'a>> {
        let index = self.index_in_parent()?;
        self.parent()?.child(index + 1)
    }

    pub fn prev_sibling(self) -> Option<SyntaxNodeRef<'a>> {
        let index = self.index_in_parent()?;
        self.parent()?.child(index.checked_sub(1)?)
    }

    pub fn is_ancestor_of(self, other: SyntaxNodeRef<'a>) -> bool {
        other.ancestors().any(|a| a.id == self.id)
    }
}
