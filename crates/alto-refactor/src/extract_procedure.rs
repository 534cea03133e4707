//! Extract Procedure: moves a statement sequence or expression into a new
//! local procedure and replaces it with a call.

use alto_core::{LineIndex, Name, Range, TextRange, TextSize};
use alto_syntax::{SyntaxKind, SyntaxNodeRef};

use crate::capture::classify_variables;
use crate::context::AnalysisContext;
use crate::edit::{apply_text_edits, TextEdit, WorkspaceEdit};
use crate::error::{InvariantViolation, NotApplicableReason};
use crate::procedure::{Procedure, TargetObject};
use crate::range_analyzer::{ExtractionTier, RangeAnalyzer};
use crate::return_type::{analyze_return_type, ReturnPlacement};
use crate::synthesize::{dedent, render_procedure};
use crate::RefactorError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractProcedure {
    pub selection: TextRange,
    /// Name of the new procedure; a unique default is chosen when absent.
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractProcedureOutcome {
    pub procedure: Procedure,
    /// Text that replaces the extracted range.
    pub call_site: String,
    /// Where the declaration is inserted, in pre-edit offsets.
    pub insertion_offset: TextSize,
    pub edit: WorkspaceEdit,
    /// Post-edit range of the new procedure's name.
    pub reveal: Option<Range>,
}

impl ExtractProcedure {
    pub fn new(selection: TextRange) -> Self {
        Self {
            selection,
            name: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub async fn apply(&self, ctx: &AnalysisContext) -> Result<ExtractProcedureOutcome, RefactorError> {
        let config = ctx.config();
        let document = ctx.document();

        let mut analyzer = RangeAnalyzer::new(ctx.tree()?);
        analyzer.analyze(self.selection)?;
        let unit = analyzer.unit()?.clone();

        let return_type = analyze_return_type(ctx, &unit).await?;
        if unit.tier == ExtractionTier::ReturnTypeDependent && return_type.is_none() {
            return Err(NotApplicableReason::NoReturnType.into());
        }
        let captures = classify_variables(ctx, &unit, config.capture_policy).await?;
        ctx.check()?;

        let tree = ctx.tree()?;
        let method = tree.node(unit.method);
        let object = method
            .ancestors()
            .find(|n| n.kind().is_object())
            .ok_or(InvariantViolation::MissingNode("object"))?;
        let name = match &self.name {
            Some(name) => name.clone(),
            None => unique_procedure_name(object, &config.default_procedure_name),
        };

        let replaced = if config.move_leading_comments {
            unit.range_with_comments
        } else {
            unit.range
        };
        let source = document.slice(replaced).trim_end();
        let terminated = source.ends_with(';');
        let base_indent = document.indentation_at(replaced.start());

        let mut procedure = Procedure::new(&name);
        procedure.parameters = captures.parameters;
        procedure.variables = captures.variables;
        procedure.target = TargetObject::from_node(document.file(), object);
        procedure.jump_to_created_position = config.jump_to_created_position;

        let single_expression = unit.is_single_node() && tree.node(unit.start).kind().is_expression();
        let call = procedure.call_expression();
        let call_site = match return_type {
            Some(info) if info.placement == ReturnPlacement::CallingPosition => {
                procedure.return_type = Some(info.type_name);
                procedure.body = dedent(source, base_indent);
                format!("exit({call}){}", if terminated { ";" } else { "" })
            }
            Some(info) if single_expression => {
                let expression = source.strip_suffix(';').unwrap_or(source).trim_end();
                procedure.body = format!(
                    "{} := {};",
                    config.return_variable_name,
                    dedent(expression, base_indent)
                );
                procedure.return_type = Some(info.type_name);
                procedure.return_variable_name = Some(config.return_variable_name.clone());
                format!("{call}{}", if terminated { ";" } else { "" })
            }
            Some(info) => {
                tracing::error!(
                    return_type = %info.type_name,
                    "return type inferred for a statement sequence"
                );
                return Err(InvariantViolation::UnplacedReturnType(info.type_name).into());
            }
            None => {
                procedure.body = dedent(source, base_indent);
                format!("{call}{}", if terminated { ";" } else { "" })
            }
        };

        let line_ending = document.line_ending();
        let insertion_offset = method.range().end();
        let method_indent = document.indentation_at(method.range().start());
        let declaration = format!(
            "{eol}{eol}{}",
            render_procedure(&procedure, method_indent, line_ending, false),
            eol = line_ending.as_str()
        );

        let mut edit = WorkspaceEdit::new(vec![
            TextEdit::replace(document.file().clone(), replaced, call_site.clone()),
            TextEdit::insert(document.file().clone(), insertion_offset, declaration.clone()),
        ]);
        edit.normalize()?;

        let reveal = if procedure.jump_to_created_position {
            let shift = call_site.len() as i64 - i64::from(u32::from(replaced.len()));
            reveal_name(document.text(), &edit, &declaration, &name, insertion_offset, shift)?
        } else {
            None
        };

        tracing::debug!(
            name = %procedure.name,
            parameters = procedure.parameters.len(),
            variables = procedure.variables.len(),
            return_type = ?procedure.return_type,
            "extracted procedure"
        );
        Ok(ExtractProcedureOutcome {
            procedure,
            call_site,
            insertion_offset,
            edit,
            reveal,
        })
    }
}

/// `base`, or `base` followed by the smallest number not used by a procedure
/// of `object`.
pub(crate) fn unique_procedure_name(object: SyntaxNodeRef<'_>, base: &str) -> String {
    let existing: Vec<Name> = object
        .children()
        .filter(|c| c.kind() == SyntaxKind::MethodDeclaration)
        .filter_map(|c| c.name())
        .map(Name::new)
        .collect();
    let taken = |candidate: &str| existing.iter().any(|name| name.matches(candidate));
    if !taken(base) {
        return base.to_string();
    }
    (1u32..)
        .map(|n| format!("{base}{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Range of `name` inside the inserted `declaration` after `edit` is applied.
pub(crate) fn reveal_name(
    original: &str,
    edit: &WorkspaceEdit,
    declaration: &str,
    name: &str,
    insertion_offset: TextSize,
    shift: i64,
) -> Result<Option<Range>, RefactorError> {
    let Some(idx) = declaration.find(&format!("procedure {name}(")) else {
        return Ok(None);
    };
    let start = i64::from(u32::from(insertion_offset)) + shift + (idx + "procedure ".len()) as i64;
    let Ok(start) = u32::try_from(start) else {
        return Ok(None);
    };
    let modified = apply_text_edits(original, &edit.edits)?;
    let range = TextRange::at(TextSize::from(start), TextSize::of(name));
    let index = LineIndex::new(&modified);
    Ok(Some(index.range(&modified, range)))
}
