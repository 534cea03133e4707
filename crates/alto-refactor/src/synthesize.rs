//! Rendering of [`Procedure`] values to AL source text.

use alto_core::LineEnding;

use crate::procedure::Procedure;

/// One level of indentation.
pub const INDENT_UNIT: &str = "    ";

/// Renders `procedure` at `indent`, using `line_ending` between lines.
///
/// With `declaration_only` only the signature is emitted, terminated by `;`.
/// Event publishers always get an empty body.
pub fn render_procedure(
    procedure: &Procedure,
    indent: &str,
    line_ending: LineEnding,
    declaration_only: bool,
) -> String {
    let mut lines = Vec::new();
    for attribute in &procedure.attributes {
        lines.push(format!("{indent}[{attribute}]"));
    }
    let signature = format!("{indent}{}", signature(procedure));
    if declaration_only {
        lines.push(format!("{signature};"));
        return lines.join(line_ending.as_str());
    }
    lines.push(signature);

    if !procedure.variables.is_empty() {
        lines.push(format!("{indent}var"));
        for variable in &procedure.variables {
            lines.push(format!("{indent}{INDENT_UNIT}{};", variable.declaration()));
        }
    }
    lines.push(format!("{indent}begin"));
    if !procedure.is_event_publisher() {
        let body_indent = format!("{indent}{INDENT_UNIT}");
        for line in procedure.body.lines() {
            if line.trim().is_empty() {
                lines.push(String::new());
            } else {
                lines.push(format!("{body_indent}{}", line.trim_end()));
            }
        }
    }
    lines.push(format!("{indent}end;"));
    lines.join(line_ending.as_str())
}

/// `local procedure Name(a: Integer; var b: Decimal) Result: Boolean`.
pub fn signature(procedure: &Procedure) -> String {
    let mut out = String::new();
    if let Some(keyword) = procedure.access_modifier.keyword() {
        out.push_str(keyword);
        out.push(' ');
    }
    out.push_str("procedure ");
    out.push_str(&procedure.name);
    out.push('(');
    let parameters: Vec<String> = procedure.parameters.iter().map(|p| p.declaration()).collect();
    out.push_str(&parameters.join("; "));
    out.push(')');
    if let Some(return_type) = &procedure.return_type {
        if let Some(name) = &procedure.return_variable_name {
            out.push(' ');
            out.push_str(name);
        }
        out.push_str(": ");
        out.push_str(return_type);
    }
    out
}

/// Strips `old_indent` from the start of every line after the first and
/// joins the lines with `\n`.
///
/// The first line of an extracted range starts at the selection and carries
/// no indentation of its own.
pub fn dedent(text: &str, old_indent: &str) -> String {
    let normalized = LineEnding::Lf.normalize(text);
    let mut out = Vec::new();
    for (idx, line) in normalized.split('\n').enumerate() {
        let line = if idx == 0 {
            line
        } else {
            line.strip_prefix(old_indent).unwrap_or_else(|| line.trim_start())
        };
        out.push(line.trim_end());
    }
    out.join("\n")
}
