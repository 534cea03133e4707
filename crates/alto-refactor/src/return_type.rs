//! Decides whether an extracted procedure returns a value, and of which type.

use alto_syntax::{SyntaxKind, SyntaxNodeRef};

use crate::context::AnalysisContext;
use crate::error::NotApplicableReason;
use crate::range_analyzer::ExtractionUnit;
use crate::type_detective::{find_return_type_of_node, method_return_type};
use crate::RefactorError;

/// Where the returned value is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnPlacement {
    /// The extracted body assigns the value to a return variable.
    ExtractedRange,
    /// The body keeps its own `exit` statements and ends in one; the caller
    /// forwards the result.
    CallingPosition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnTypeInfo {
    pub type_name: String,
    pub placement: ReturnPlacement,
}

impl ReturnTypeInfo {
    fn new(type_name: impl Into<String>, placement: ReturnPlacement) -> Self {
        Self {
            type_name: type_name.into(),
            placement,
        }
    }
}

pub async fn analyze_return_type(
    ctx: &AnalysisContext,
    unit: &ExtractionUnit,
) -> Result<Option<ReturnTypeInfo>, RefactorError> {
    let tree = ctx.tree()?;
    let start = tree.node(unit.start);
    let end = tree.node(unit.end);

    if is_condition(start) && is_condition(end) {
        tracing::debug!("selection is a condition");
        return Ok(Some(ReturnTypeInfo::new("Boolean", ReturnPlacement::ExtractedRange)));
    }

    if contains_exit(start, end, unit) {
        // `exit(Call())` at the call site is only equivalent when every path
        // through the range leaves the procedure with a value.
        if end.kind() != SyntaxKind::ExitStatement {
            tracing::debug!("selection exits the enclosing procedure on some paths only");
            return Err(NotApplicableReason::UnforwardableExit.into());
        }
        let method = tree.node(unit.method);
        let Some(ty) = method_return_type(ctx, method).await? else {
            tracing::debug!("selection exits a procedure without a return value");
            return Err(NotApplicableReason::UnforwardableExit.into());
        };
        tracing::debug!(return_type = %ty, "selection exits the enclosing procedure");
        return Ok(Some(ReturnTypeInfo::new(ty, ReturnPlacement::CallingPosition)));
    }

    if start == end {
        let ty = find_return_type_of_node(ctx, start).await?;
        return Ok(ty.map(|ty| ReturnTypeInfo::new(ty, ReturnPlacement::ExtractedRange)));
    }

    match start.parent() {
        Some(parent) if end.parent() == Some(parent) => {
            let ty = find_return_type_of_node(ctx, parent).await?;
            Ok(ty.map(|ty| ReturnTypeInfo::new(ty, ReturnPlacement::ExtractedRange)))
        }
        _ => Ok(None),
    }
}

/// `node` is the condition of an `if` or `while`.
fn is_condition(node: SyntaxNodeRef<'_>) -> bool {
    node.kind().is_expression()
        && node.index_in_parent() == Some(0)
        && node
            .parent()
            .is_some_and(|p| matches!(p.kind(), SyntaxKind::IfStatement | SyntaxKind::WhileStatement))
}

fn contains_exit(start: SyntaxNodeRef<'_>, end: SyntaxNodeRef<'_>, unit: &ExtractionUnit) -> bool {
    let mut nodes = vec![start];
    let mut next = start;
    while next != end {
        match next.next_sibling() {
            Some(sibling) => {
                nodes.push(sibling);
                next = sibling;
            }
            None => break,
        }
    }
    nodes.into_iter().flat_map(|n| n.descendants()).any(|n| {
        n.kind() == SyntaxKind::ExitStatement
            && unit.range.contains_range(n.range())
    })
}
