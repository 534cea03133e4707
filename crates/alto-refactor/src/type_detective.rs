//! Type and name inference for expressions.
//!
//! [`TypeDetective::analyze`] works downwards from an expression to the leaf
//! that determines its type; [`find_return_type_of_node`] works upwards from
//! an expression to the context that expects a value of some type. Only
//! identifiers, exits and arguments consult the oracle. When the oracle has
//! no answer the result degrades to [`DEFAULT_TYPE`].

use alto_syntax::{SyntaxKind, SyntaxNodeRef};

use crate::context::AnalysisContext;
use crate::oracle::SymbolKind;
use crate::RefactorError;

pub const DEFAULT_TYPE: &str = "Variant";
pub const DEFAULT_NAME: &str = "arg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: String,
    pub name: String,
    pub is_var: bool,
    pub is_temporary: bool,
    /// The expression denotes storage that may be passed to a `var` parameter.
    pub can_become_var_parameter: bool,
}

impl TypeInfo {
    fn fixed(type_name: &str, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.to_string(),
            name: name.into(),
            is_var: false,
            is_temporary: false,
            can_become_var_parameter: false,
        }
    }

    fn fallback() -> Self {
        Self::fixed(DEFAULT_TYPE, DEFAULT_NAME)
    }

    pub fn is_record(&self) -> bool {
        self.type_name
            .split_whitespace()
            .next()
            .is_some_and(|word| word.eq_ignore_ascii_case("record"))
    }
}

pub struct TypeDetective<'c> {
    ctx: &'c AnalysisContext,
}

impl<'c> TypeDetective<'c> {
    pub fn new(ctx: &'c AnalysisContext) -> Self {
        Self { ctx }
    }

    pub async fn analyze(&self, node: SyntaxNodeRef<'_>) -> Result<TypeInfo, RefactorError> {
        let mut current = node;
        let mut name_suffix = String::new();
        let mut element_of_array = false;

        let mut info = loop {
            let next = match current.kind() {
                SyntaxKind::ParenthesizedExpression
                | SyntaxKind::UnaryPlusExpression
                | SyntaxKind::UnaryMinusExpression
                | SyntaxKind::AddExpression => current.child(0),
                SyntaxKind::MemberAccessExpression => current.children().last(),
                SyntaxKind::ElementAccessExpression => {
                    element_of_array = true;
                    current.child(0)
                }
                SyntaxKind::InvocationExpression => {
                    let callee = current.child(0);
                    if callee
                        .and_then(callee_name)
                        .is_some_and(|name| name.eq_ignore_ascii_case("FieldCaption"))
                    {
                        if let Some(args) = current.first_child_of_kind(SyntaxKind::ArgumentList) {
                            name_suffix.insert_str(0, &sanitize_name(args.text()));
                        }
                    }
                    callee
                }
                SyntaxKind::OptionAccessExpression => match option_access(current) {
                    Some(info) => break info,
                    None => current.child(0),
                },
                SyntaxKind::SubtractExpression
                | SyntaxKind::MultiplyExpression
                | SyntaxKind::DivideExpression => break TypeInfo::fixed("Decimal", DEFAULT_NAME),
                SyntaxKind::IntegerDivideExpression | SyntaxKind::ModuloExpression => {
                    break TypeInfo::fixed("Integer", DEFAULT_NAME)
                }
                kind if kind.is_logical_expression()
                    || kind.is_comparison_expression()
                    || kind == SyntaxKind::UnaryNotExpression
                    || kind == SyntaxKind::InExpression =>
                {
                    break TypeInfo::fixed("Boolean", DEFAULT_NAME)
                }
                SyntaxKind::LiteralExpression => {
                    break current
                        .child(0)
                        .and_then(|value| literal_type(value.kind()))
                        .map_or_else(TypeInfo::fallback, |ty| TypeInfo::fixed(ty, DEFAULT_NAME))
                }
                SyntaxKind::IdentifierName => break self.identifier(current).await?,
                _ => None,
            };
            match next {
                Some(next) => current = next,
                None => break TypeInfo::fallback(),
            }
        };

        if element_of_array {
            if let Some(element) = array_element_type(&info.type_name) {
                info.type_name = element;
            }
        }
        info.name.push_str(&name_suffix);
        tracing::debug!(
            expr = node.text(),
            type_name = %info.type_name,
            name = %info.name,
            "inferred expression type"
        );
        Ok(info)
    }

    async fn identifier(&self, node: SyntaxNodeRef<'_>) -> Result<TypeInfo, RefactorError> {
        let offset = node.range().start();
        let Some(symbol) = self.ctx.hover_symbol(offset).await? else {
            let mut info = TypeInfo::fixed(DEFAULT_TYPE, node.text());
            info.can_become_var_parameter = true;
            return Ok(info);
        };

        let type_name = symbol
            .type_name
            .as_deref()
            .map_or_else(|| DEFAULT_TYPE.to_string(), normalize_type);
        let is_temporary = type_name
            .to_ascii_lowercase()
            .trim_end()
            .ends_with(" temporary");
        let is_var = match symbol.kind {
            SymbolKind::Parameter => self.is_var_parameter(offset).await?,
            _ => false,
        };
        Ok(TypeInfo {
            type_name,
            name: symbol.name,
            is_var,
            is_temporary,
            can_become_var_parameter: symbol.kind.is_variable() || symbol.kind == SymbolKind::Field,
        })
    }

    /// Looks up the declaring parameter and checks for a `var` modifier.
    async fn is_var_parameter(&self, offset: alto_core::TextSize) -> Result<bool, RefactorError> {
        let definitions = self.ctx.definition(offset).await?;
        let document = self.ctx.document();
        let tree = self.ctx.tree()?;
        Ok(definitions
            .iter()
            .filter_map(|location| document.local_range(location))
            .filter_map(|range| tree.find_node(range.start(), Some(&[SyntaxKind::Parameter])))
            .any(|parameter| starts_with_keyword(parameter.text(), "var")))
    }
}

/// Type expected for the value of `node` by its surrounding context.
pub async fn find_return_type_of_node(
    ctx: &AnalysisContext,
    node: SyntaxNodeRef<'_>,
) -> Result<Option<String>, RefactorError> {
    let mut child = node;
    let Some(mut parent) = node.parent() else {
        return Ok(None);
    };
    while parent.kind() == SyntaxKind::ParenthesizedExpression {
        child = parent;
        let Some(next) = parent.parent() else {
            return Ok(None);
        };
        parent = next;
    }

    let boolean = || -> Result<Option<String>, RefactorError> { Ok(Some("Boolean".to_string())) };
    match parent.kind() {
        SyntaxKind::ArgumentList => {
            let Some(signature) = ctx.signature_help(child.range().start()).await? else {
                return Ok(None);
            };
            let parameter = signature
                .active()
                .or_else(|| signature.parameters.get(child.index_in_parent()?));
            Ok(parameter.map(|p| p.type_name.clone()))
        }
        SyntaxKind::ExitStatement => match parent.ancestor_of_kind(&[
            SyntaxKind::MethodDeclaration,
            SyntaxKind::TriggerDeclaration,
        ]) {
            Some(method) => method_return_type(ctx, method).await,
            None => Ok(None),
        },
        SyntaxKind::UnaryPlusExpression | SyntaxKind::UnaryMinusExpression => {
            Ok(Some("Decimal".to_string()))
        }
        SyntaxKind::UnaryNotExpression => boolean(),
        kind if kind.is_logical_expression() => boolean(),
        SyntaxKind::IfStatement | SyntaxKind::WhileStatement if child.index_in_parent() == Some(0) => {
            boolean()
        }
        SyntaxKind::RepeatStatement if child.next_sibling().is_none() => boolean(),
        SyntaxKind::BracketedArgumentList => Ok(Some("Integer".to_string())),
        kind if kind.is_arithmetic_expression()
            || kind.is_comparison_expression()
            || kind == SyntaxKind::AssignmentStatement
            || kind == SyntaxKind::CompoundAssignmentStatement =>
        {
            let sibling = match child.index_in_parent() {
                Some(0) => parent.child(1),
                _ => parent.child(0),
            };
            match sibling {
                Some(sibling) => Ok(Some(TypeDetective::new(ctx).analyze(sibling).await?.type_name)),
                None => Ok(None),
            }
        }
        _ => Ok(None),
    }
}

/// Declared return type of a procedure: from hovering its name, else from
/// the declaration itself.
pub(crate) async fn method_return_type(
    ctx: &AnalysisContext,
    method: SyntaxNodeRef<'_>,
) -> Result<Option<String>, RefactorError> {
    let Some(return_value) = method.first_child_of_kind(SyntaxKind::ReturnValue) else {
        return Ok(None);
    };
    if let Some(name) = method.first_child_of_kind(SyntaxKind::IdentifierName) {
        if let Some(type_name) = ctx
            .hover_symbol(name.range().start())
            .await?
            .and_then(|symbol| symbol.type_name)
        {
            return Ok(Some(type_name));
        }
    }
    Ok(return_value.data_type().map(str::to_string))
}

fn callee_name(callee: SyntaxNodeRef<'_>) -> Option<&str> {
    match callee.kind() {
        SyntaxKind::IdentifierName => callee.name(),
        SyntaxKind::MemberAccessExpression => callee.children().last()?.name(),
        _ => None,
    }
}

/// `Database::Customer` and friends denote object ids; `Enum::X::Y` denotes
/// an enum value.
fn option_access(node: SyntaxNodeRef<'_>) -> Option<TypeInfo> {
    let first = node.child(0)?;
    if first.kind() == SyntaxKind::IdentifierName {
        let kind = first.name()?;
        let id_name = match kind.to_ascii_lowercase().as_str() {
            "database" => "TableId",
            "page" => "PageId",
            "report" => "ReportId",
            "codeunit" => "CodeunitId",
            "query" => "QueryId",
            "xmlport" => "XmlPortId",
            _ => return None,
        };
        return Some(TypeInfo::fixed("Integer", id_name));
    }
    if first.kind() == SyntaxKind::OptionAccessExpression {
        let keyword = first.child(0)?;
        if keyword.name().is_some_and(|n| n.eq_ignore_ascii_case("enum")) {
            let enum_name = first.child(1)?.name()?;
            return Some(TypeInfo::fixed(
                &format!("Enum {enum_name}"),
                sanitize_name(enum_name),
            ));
        }
    }
    None
}

fn literal_type(kind: SyntaxKind) -> Option<&'static str> {
    let ty = match kind {
        SyntaxKind::BooleanLiteralValue => "Boolean",
        SyntaxKind::StringLiteralValue => "Text",
        SyntaxKind::Int32SignedLiteralValue | SyntaxKind::Int64SignedLiteralValue => "Integer",
        SyntaxKind::DecimalSignedLiteralValue => "Decimal",
        SyntaxKind::DateLiteralValue => "Date",
        SyntaxKind::TimeLiteralValue => "Time",
        SyntaxKind::DateTimeLiteralValue => "DateTime",
        _ => return None,
    };
    Some(ty)
}

/// Maps declared types onto the type a new variable of that value needs.
fn normalize_type(type_name: &str) -> String {
    let trimmed = type_name.trim();
    if starts_with_keyword(trimmed, "label") {
        "Text".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `array[10] of Integer` -> `Integer`.
fn array_element_type(type_name: &str) -> Option<String> {
    if !starts_with_keyword(type_name, "array") {
        return None;
    }
    let lower = type_name.to_ascii_lowercase();
    let idx = lower.find(" of ")?;
    Some(type_name[idx + 4..].trim().to_string())
}

fn starts_with_keyword(text: &str, keyword: &str) -> bool {
    text.get(..keyword.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(keyword))
        && text[keyword.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_ascii_alphanumeric() && c != '_')
}

/// Keeps only identifier characters.
pub(crate) fn sanitize_name(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_maps_to_text() {
        assert_eq!(normalize_type("Label 'Hello %1'"), "Text");
        assert_eq!(normalize_type("Labels"), "Labels");
        assert_eq!(normalize_type(" Code[20] "), "Code[20]");
    }

    #[test]
    fn array_element() {
        assert_eq!(array_element_type("array[10] of Decimal").as_deref(), Some("Decimal"));
        assert_eq!(array_element_type("Integer"), None);
    }

    #[test]
    fn sanitized_names() {
        assert_eq!(sanitize_name("(\"No.\")"), "No");
        assert_eq!(sanitize_name("(Rec.\"Sell-to Customer No.\")"), "RecSelltoCustomerNo");
    }

    #[test]
    fn record_detection() {
        let info = TypeInfo::fixed("Record Customer temporary", "Cust");
        assert!(info.is_record());
        assert!(!TypeInfo::fixed("RecordRef", "r").is_record());
    }
}
