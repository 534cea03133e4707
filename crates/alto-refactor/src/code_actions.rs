//! Entry points used by the editor integration.
//!
//! Both run speculatively on every cursor move, so "not applicable" is an
//! empty result rather than an error.

use alto_core::{Range, TextRange, TextSize};

use crate::context::AnalysisContext;
use crate::create_procedure::{insert_procedure, CreateProcedure, CreateProcedureKind};
use crate::edit::WorkspaceEdit;
use crate::extract_procedure::ExtractProcedure;
use crate::RefactorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeActionKind {
    RefactorExtract,
    QuickFix,
}

impl CodeActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CodeActionKind::RefactorExtract => "refactor.extract",
            CodeActionKind::QuickFix => "quickfix",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeAction {
    pub title: String,
    pub kind: CodeActionKind,
    pub edit: WorkspaceEdit,
    /// Range to select once the edit is applied.
    pub reveal: Option<Range>,
}

pub async fn extract_procedure_code_actions(
    ctx: &AnalysisContext,
    selection: TextRange,
) -> Result<Vec<CodeAction>, RefactorError> {
    let result = ExtractProcedure::new(selection).apply(ctx).await.map(|outcome| {
        vec![CodeAction {
            title: "Extract to procedure".to_string(),
            kind: CodeActionKind::RefactorExtract,
            edit: outcome.edit,
            reveal: outcome.reveal,
        }]
    });
    collapse("extract procedure", result)
}

/// One action per [`CreateProcedureKind`]; events are only offered for
/// names following the `On...` convention.
pub async fn create_procedure_code_actions(
    ctx: &AnalysisContext,
    offset: TextSize,
) -> Result<Vec<CodeAction>, RefactorError> {
    let result = async {
        let base = CreateProcedure::new(offset).build(ctx).await?;
        let offers_events = base
            .name
            .trim_matches('"')
            .get(..2)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("on"));

        let mut actions = Vec::new();
        for kind in CreateProcedureKind::ALL {
            if kind != CreateProcedureKind::Procedure && !offers_events {
                continue;
            }
            let outcome = insert_procedure(ctx, kind.decorate(base.clone()))?;
            if outcome.edit.is_empty() {
                continue;
            }
            actions.push(CodeAction {
                title: kind.title(&outcome.procedure.name),
                kind: CodeActionKind::QuickFix,
                edit: outcome.edit,
                reveal: outcome.reveal,
            });
        }
        Ok::<_, RefactorError>(actions)
    }
    .await;
    collapse("create procedure", result)
}

fn collapse(
    action: &'static str,
    result: Result<Vec<CodeAction>, RefactorError>,
) -> Result<Vec<CodeAction>, RefactorError> {
    match result {
        Err(err) if err.is_not_applicable() => {
            tracing::debug!(action, reason = %err, "code action not applicable");
            Ok(Vec::new())
        }
        Err(err) if err.should_notify_user() => {
            tracing::error!(action, error = %err, "code action failed");
            Err(err)
        }
        other => other,
    }
}
