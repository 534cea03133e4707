//! Classification of the variables an extraction unit touches.
//!
//! Every local, parameter and named return value of the enclosing procedure
//! that is referenced inside the unit is either moved into the new procedure
//! or passed to it. Which of the two, and whether by reference, depends on
//! the references outside the unit and on the [`CapturePolicy`].

use alto_config::CapturePolicy;
use alto_core::{Name, TextRange};
use alto_syntax::{SyntaxKind, SyntaxNodeRef};

use crate::context::AnalysisContext;
use crate::procedure::Variable;
use crate::range_analyzer::ExtractionUnit;
use crate::RefactorError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures {
    /// Parameters of the new procedure, in declaration order.
    pub parameters: Vec<Variable>,
    /// Locals moved into the new procedure.
    pub variables: Vec<Variable>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Parameter { is_var: bool },
    Local,
    ReturnValue,
}

#[derive(Debug)]
struct Candidate {
    name: String,
    type_name: String,
    /// Range of the declared name.
    name_range: TextRange,
    /// Range of the whole declaration; references inside it are ignored.
    declaration: TextRange,
    origin: Origin,
}

#[derive(Debug, Default)]
struct Buckets {
    params_normal: Vec<Variable>,
    params_var: Vec<Variable>,
    locals_var: Vec<Variable>,
    locals_normal: Vec<Variable>,
    return_var: Vec<Variable>,
}

pub async fn classify_variables(
    ctx: &AnalysisContext,
    unit: &ExtractionUnit,
    policy: CapturePolicy,
) -> Result<Captures, RefactorError> {
    let tree = ctx.tree()?;
    let method = tree.node(unit.method);
    let body = tree.node(unit.body).range();
    let procedure = method.name().map(str::to_string);

    let mut captures = Captures::default();
    let mut buckets = Buckets::default();

    for candidate in candidates(method) {
        let references: Vec<TextRange> = ctx
            .references(candidate.name_range.start())
            .await?
            .iter()
            .filter_map(|location| ctx.document().local_range(location))
            .filter(|range| !candidate.declaration.contains_range(*range))
            .collect();

        if !references.iter().any(|r| unit.range.contains_range(*r)) {
            continue;
        }
        let before = references
            .iter()
            .any(|r| r.end() <= unit.range.start() && r.start() >= body.start());
        let after = references
            .iter()
            .any(|r| r.start() >= unit.range.end() && r.end() <= body.end());

        let mut variable = Variable::new(&candidate.name, &candidate.type_name);
        variable.procedure = procedure.clone();
        tracing::debug!(
            name = %candidate.name,
            origin = ?candidate.origin,
            before,
            after,
            "variable is used in the selection"
        );

        match candidate.origin {
            Origin::Parameter { is_var } => {
                let by_reference = match policy {
                    CapturePolicy::AlwaysByReference => true,
                    CapturePolicy::Precise => after || is_var,
                };
                if by_reference {
                    buckets.params_var.push(variable.by_reference(true));
                } else {
                    buckets.params_normal.push(variable);
                }
            }
            Origin::Local => {
                variable.is_local = true;
                if !before && !after {
                    captures.variables.push(variable);
                } else if after || policy == CapturePolicy::AlwaysByReference {
                    buckets.locals_var.push(variable.by_reference(true));
                } else {
                    buckets.locals_normal.push(variable);
                }
            }
            Origin::ReturnValue => {
                variable.is_result_parameter = true;
                buckets.return_var.push(variable.by_reference(true));
            }
        }
    }

    if let Some(rec) = implicit_rec(method, unit) {
        push_unique(&mut captures.parameters, rec);
    }
    for variable in buckets
        .params_normal
        .into_iter()
        .chain(buckets.params_var)
        .chain(buckets.locals_var)
        .chain(buckets.locals_normal)
        .chain(buckets.return_var)
    {
        push_unique(&mut captures.parameters, variable);
    }
    Ok(captures)
}

fn candidates(method: SyntaxNodeRef<'_>) -> Vec<Candidate> {
    let mut out = Vec::new();

    if let Some(list) = method.first_child_of_kind(SyntaxKind::ParameterList) {
        for parameter in list.children() {
            let Some(name) = parameter.first_child_of_kind(SyntaxKind::VariableDeclarationName) else {
                continue;
            };
            let is_var = parameter
                .text()
                .get(..4)
                .is_some_and(|head| head.eq_ignore_ascii_case("var "));
            out.extend(candidate(parameter, name, Origin::Parameter { is_var }));
        }
    }

    if let Some(return_value) = method.first_child_of_kind(SyntaxKind::ReturnValue) {
        if let Some(name) = return_value.first_child_of_kind(SyntaxKind::VariableDeclarationName) {
            out.extend(candidate(return_value, name, Origin::ReturnValue));
        }
    }

    if let Some(section) = method.first_child_of_kind(SyntaxKind::VarSection) {
        for declaration in section.children() {
            for name in declaration
                .children()
                .filter(|c| c.kind() == SyntaxKind::VariableDeclarationName)
            {
                out.extend(candidate(declaration, name, Origin::Local));
            }
        }
    }
    out
}

fn candidate(
    declaration: SyntaxNodeRef<'_>,
    name: SyntaxNodeRef<'_>,
    origin: Origin,
) -> Option<Candidate> {
    Some(Candidate {
        name: name.name()?.to_string(),
        type_name: declaration.data_type()?.to_string(),
        name_range: name.range(),
        declaration: declaration.range(),
        origin,
    })
}

/// The undeclared `Rec` of a codeunit's `OnRun` trigger, typed by the
/// codeunit's `TableNo` property, if the unit uses it.
fn implicit_rec(method: SyntaxNodeRef<'_>, unit: &ExtractionUnit) -> Option<Variable> {
    if method.kind() != SyntaxKind::TriggerDeclaration
        || !method.name().is_some_and(|n| Name::new(n).matches("OnRun"))
    {
        return None;
    }
    let object = method
        .parent()
        .filter(|p| p.kind() == SyntaxKind::CodeunitObject)?;
    let table = object
        .children()
        .filter(|c| c.kind() == SyntaxKind::PropertyList)
        .flat_map(|list| list.children())
        .find(|p| p.name().is_some_and(|n| Name::new(n).matches("TableNo")))?
        .data_type()?;

    let body = method.first_child_of_kind(SyntaxKind::Block)?;
    let used = body.descendants().any(|node| {
        node.kind() == SyntaxKind::IdentifierName
            && unit.range.contains_range(node.range())
            && node.name().is_some_and(|n| Name::new(n).matches("Rec"))
            && !is_member_name(node)
    });
    if !used {
        return None;
    }
    let mut rec = Variable::new("Rec", format!("Record {table}")).by_reference(true);
    rec.procedure = method.name().map(str::to_string);
    Some(rec)
}

/// `node` is the member in `x.node`.
fn is_member_name(node: SyntaxNodeRef<'_>) -> bool {
    node.parent()
        .is_some_and(|p| p.kind() == SyntaxKind::MemberAccessExpression)
        && node.index_in_parent() != Some(0)
}

/// Appends `variable`, numbering both it and an existing namesake when their
/// names collide (`No` and `No` become `No1` and `No2`).
pub fn push_unique(variables: &mut Vec<Variable>, mut variable: Variable) {
    fn taken(variables: &[Variable], name: &str) -> bool {
        variables.iter().any(|v| Name::new(&v.name).matches(name))
    }

    if let Some(idx) = variables
        .iter()
        .position(|v| Name::new(&v.name).matches(&variable.name))
    {
        let existing = variables[idx].name.clone();
        let base = variable.name.clone();
        let mut n = 1;
        while taken(variables, &with_suffix(&base, n)) {
            n += 1;
        }
        variables[idx].name = with_suffix(&existing, n);
        n += 1;
        while taken(variables, &with_suffix(&base, n)) {
            n += 1;
        }
        variable.name = with_suffix(&base, n);
    } else if taken(variables, &with_suffix(&variable.name, 1)) {
        let base = variable.name.clone();
        let mut n = 2;
        while taken(variables, &with_suffix(&base, n)) {
            n += 1;
        }
        variable.name = with_suffix(&base, n);
    }
    variables.push(variable);
}

/// `Name` -> `Name2`, `"Line No."` -> `"Line No.2"`.
fn with_suffix(name: &str, n: u32) -> String {
    match name.strip_suffix('"') {
        Some(inner) if inner.starts_with('"') => format!("{inner}{n}\""),
        _ => format!("{name}{n}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(variables: &[Variable]) -> Vec<&str> {
        variables.iter().map(|v| v.name.as_str()).collect()
    }

    #[test]
    fn colliding_names_are_numbered_in_order() {
        let mut vars = Vec::new();
        push_unique(&mut vars, Variable::new("No", "Code[20]"));
        push_unique(&mut vars, Variable::new("no", "Code[20]"));
        push_unique(&mut vars, Variable::new("No", "Code[20]"));
        assert_eq!(names(&vars), vec!["No1", "no2", "No3"]);
    }

    #[test]
    fn quoted_names_keep_the_closing_quote() {
        let mut vars = Vec::new();
        push_unique(&mut vars, Variable::new("\"Line No.\"", "Integer"));
        push_unique(&mut vars, Variable::new("\"Line No.\"", "Integer"));
        assert_eq!(names(&vars), vec!["\"Line No.1\"", "\"Line No.2\""]);
    }

    #[test]
    fn numbered_names_skip_taken_suffixes() {
        let mut vars = vec![Variable::new("Amount1", "Decimal")];
        push_unique(&mut vars, Variable::new("Amount", "Decimal"));
        push_unique(&mut vars, Variable::new("Amount", "Decimal"));
        assert_eq!(names(&vars), vec!["Amount1", "Amount2", "Amount3"]);
    }
}
