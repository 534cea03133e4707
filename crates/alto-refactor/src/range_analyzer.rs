//! Reduction of a raw editor selection to an extraction unit.
//!
//! A unit is either a run of sibling statements inside one statement list or
//! a single statement/expression node that the selection covers entirely.

use alto_core::{TextRange, TextSize};
use alto_syntax::{NodeId, SyntaxKind, SyntaxNodeRef, SyntaxTree};

use crate::error::{InvariantViolation, NotApplicableReason};
use crate::RefactorError;

/// Kinds that can be extracted without knowing a return type.
const STANDALONE: &[SyntaxKind] = &[
    SyntaxKind::InvocationExpression,
    SyntaxKind::AssignmentStatement,
    SyntaxKind::CompoundAssignmentStatement,
    SyntaxKind::IfStatement,
    SyntaxKind::CaseStatement,
    SyntaxKind::WithStatement,
    SyntaxKind::RepeatStatement,
    SyntaxKind::WhileStatement,
    SyntaxKind::ForStatement,
    SyntaxKind::ForEachStatement,
    SyntaxKind::ParenthesizedExpression,
    SyntaxKind::ExitStatement,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionTier {
    Standalone,
    /// Only extractable when a return type can be inferred.
    ReturnTypeDependent,
}

impl ExtractionTier {
    pub fn of(kind: SyntaxKind) -> Option<Self> {
        if STANDALONE.contains(&kind) {
            Some(ExtractionTier::Standalone)
        } else if kind.is_binary_expression()
            || kind.is_unary_expression()
            || matches!(kind, SyntaxKind::InList | SyntaxKind::OptionAccessExpression)
        {
            Some(ExtractionTier::ReturnTypeDependent)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionUnit {
    pub start: NodeId,
    pub end: NodeId,
    /// The enclosing procedure or trigger.
    pub method: NodeId,
    /// The `begin .. end` block of `method`.
    pub body: NodeId,
    pub range: TextRange,
    /// `range` extended to the comment lines directly above it.
    pub range_with_comments: TextRange,
    pub tier: ExtractionTier,
}

impl ExtractionUnit {
    pub fn is_single_node(&self) -> bool {
        self.start == self.end
    }
}

pub struct RangeAnalyzer<'t> {
    tree: &'t SyntaxTree,
    unit: Option<ExtractionUnit>,
}

impl<'t> RangeAnalyzer<'t> {
    pub fn new(tree: &'t SyntaxTree) -> Self {
        Self { tree, unit: None }
    }

    pub fn analyze(&mut self, selection: TextRange) -> Result<&ExtractionUnit, RefactorError> {
        self.unit = None;
        let unit = match self.reduce(selection) {
            Ok(unit) => unit,
            Err(reason) => {
                tracing::debug!(?selection, %reason, "selection is not extractable");
                return Err(reason.into());
            }
        };
        tracing::debug!(
            ?selection,
            range = ?unit.range,
            tier = ?unit.tier,
            single = unit.is_single_node(),
            "reduced selection"
        );
        Ok(self.unit.insert(unit))
    }

    /// Result of the last successful [`RangeAnalyzer::analyze`].
    pub fn unit(&self) -> Result<&ExtractionUnit, InvariantViolation> {
        self.unit.as_ref().ok_or(InvariantViolation::NotAnalyzed)
    }

    fn reduce(&self, selection: TextRange) -> Result<ExtractionUnit, NotApplicableReason> {
        let tree = self.tree;
        let selection = trim_selection(tree.text(), selection).ok_or(NotApplicableReason::EmptySelection)?;

        let method = tree
            .find_node(
                selection.start(),
                Some(&[SyntaxKind::MethodDeclaration, SyntaxKind::TriggerDeclaration]),
            )
            .ok_or(NotApplicableReason::OutsideBody)?;
        let body = method
            .first_child_of_kind(SyntaxKind::Block)
            .ok_or(NotApplicableReason::OutsideBody)?;
        let (Some(first), Some(last)) = (body.child(0), body.children().last()) else {
            return Err(NotApplicableReason::OutsideBody);
        };
        if selection.start() < first.range().start() || selection.end() > last.range().end() {
            return Err(NotApplicableReason::OutsideBody);
        }

        let start_leaf = tree
            .find_node(selection.start(), None)
            .ok_or(NotApplicableReason::OutsideBody)?;
        let end_leaf = tree
            .find_node_ending_at(selection.end(), None)
            .ok_or(NotApplicableReason::OutsideBody)?;
        let common = tree
            .common_ancestor(start_leaf.id(), end_leaf.id())
            .ok_or(NotApplicableReason::OutsideBody)?;

        // Both boundaries are children of one node, so they share a depth.
        let (start, end, tier) = if common.kind().is_statement_list()
            && common != start_leaf
            && common != end_leaf
        {
            let start = child_towards(common, start_leaf).ok_or(NotApplicableReason::OutsideBody)?;
            let end = child_towards(common, end_leaf).ok_or(NotApplicableReason::OutsideBody)?;
            match (ExtractionTier::of(start.kind()), ExtractionTier::of(end.kind())) {
                (Some(ExtractionTier::Standalone), Some(ExtractionTier::Standalone)) => {
                    (start, end, ExtractionTier::Standalone)
                }
                _ => return Err(NotApplicableReason::NotExtractable),
            }
        } else {
            let node = common
                .ancestors_inclusive()
                .take_while(|n| *n != body)
                .find_map(|n| ExtractionTier::of(n.kind()).map(|tier| (n, tier)));
            let (node, tier) = node.ok_or(NotApplicableReason::NotExtractable)?;
            if !covers(selection, node) {
                return Err(NotApplicableReason::PartialNode);
            }
            (node, node, tier)
        };

        let range = TextRange::new(start.range().start(), end.range().end());
        let range_with_comments = TextRange::new(
            leading_comment_start(tree.text(), start).unwrap_or(range.start()),
            range.end(),
        );
        Ok(ExtractionUnit {
            start: start.id(),
            end: end.id(),
            method: method.id(),
            body: body.id(),
            range,
            range_with_comments,
            tier,
        })
    }
}

/// Child of `ancestor` on the path down to `node`.
fn child_towards<'a>(ancestor: SyntaxNodeRef<'a>, node: SyntaxNodeRef<'a>) -> Option<SyntaxNodeRef<'a>> {
    node.ancestors_inclusive()
        .find(|n| n.parent().is_some_and(|p| p == ancestor))
}

/// The selection spans `node` apart from its statement terminator.
fn covers(selection: TextRange, node: SyntaxNodeRef<'_>) -> bool {
    let text = node.text();
    let core = text.trim_end();
    let core = core.strip_suffix(';').unwrap_or(core).trim_end();
    let core_end = node.range().start() + TextSize::of(core);
    selection.start() <= node.range().start() && selection.end() >= core_end
}

/// Shrinks `selection` past surrounding whitespace and comments.
///
/// Returns `None` if nothing but trivia was selected.
pub fn trim_selection(text: &str, selection: TextRange) -> Option<TextRange> {
    let bytes = text.as_bytes();
    let mut start = (u32::from(selection.start()) as usize).min(text.len());
    let mut end = (u32::from(selection.end()) as usize).min(text.len());

    loop {
        while start < end && bytes[start].is_ascii_whitespace() {
            start += 1;
        }
        let rest = &text[start..end];
        if rest.starts_with("//") {
            start = rest.find('\n').map_or(end, |idx| start + idx + 1);
        } else if rest.starts_with("/*") {
            start = rest.find("*/").map_or(end, |idx| start + idx + 2);
        } else {
            break;
        }
    }

    loop {
        while end > start && bytes[end - 1].is_ascii_whitespace() {
            end -= 1;
        }
        let head = &text[start..end];
        if head.ends_with("*/") {
            match head.rfind("/*") {
                Some(idx) => end = start + idx,
                None => break,
            }
            continue;
        }
        let line_start = head.rfind('\n').map_or(0, |idx| idx + 1);
        match line_comment_start(&head[line_start..]) {
            Some(idx) => end = start + line_start + idx,
            None => break,
        }
    }

    (start < end).then(|| TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32)))
}

/// Offset of a `//` comment in `line`, skipping string literals.
fn line_comment_start(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut in_string = false;
    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            b'\'' => in_string = !in_string,
            b'/' if !in_string && bytes.get(idx + 1) == Some(&b'/') => return Some(idx),
            _ => {}
        }
        idx += 1;
    }
    None
}

/// Start of the first comment on the lines directly above `node`.
fn leading_comment_start(text: &str, node: SyntaxNodeRef<'_>) -> Option<TextSize> {
    let full = node.full_range();
    let trivia_start = u32::from(full.start()) as usize;
    let trivia = &text[trivia_start..u32::from(node.range().start()) as usize];
    // The rest of the previous token's line belongs to that token.
    let own_lines = trivia.find('\n')? + 1;
    let offset = [trivia[own_lines..].find("//"), trivia[own_lines..].find("/*")]
        .into_iter()
        .flatten()
        .min()?;
    Some(TextSize::from((trivia_start + own_lines + offset) as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::from(start), TextSize::from(end))
    }

    fn trimmed<'a>(text: &'a str, start: u32, end: u32) -> Option<&'a str> {
        trim_selection(text, range(start, end))
            .map(|r| &text[u32::from(r.start()) as usize..u32::from(r.end()) as usize])
    }

    #[test]
    fn trims_whitespace_and_comments() {
        let text = "  // lead\n  x := 1; // tail\n  /* block */\n";
        assert_eq!(trimmed(text, 0, text.len() as u32), Some("x := 1;"));
    }

    #[test]
    fn comment_markers_inside_strings_are_kept() {
        let text = "Url := 'http://x';";
        assert_eq!(trimmed(text, 0, text.len() as u32), Some(text));
    }

    #[test]
    fn only_trivia_is_empty() {
        let text = "   // nothing\n   ";
        assert_eq!(trimmed(text, 0, text.len() as u32), None);
    }

    #[test]
    fn tiers() {
        assert_eq!(
            ExtractionTier::of(SyntaxKind::IfStatement),
            Some(ExtractionTier::Standalone)
        );
        assert_eq!(
            ExtractionTier::of(SyntaxKind::InExpression),
            Some(ExtractionTier::ReturnTypeDependent)
        );
        assert_eq!(ExtractionTier::of(SyntaxKind::IdentifierName), None);
    }
}
