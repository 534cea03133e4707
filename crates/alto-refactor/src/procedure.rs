//! Value objects describing a procedure to be generated.

use alto_core::{FileId, TextRange};
use alto_syntax::{SyntaxKind, SyntaxNodeRef};

pub use alto_config::AccessModifier;

/// A parameter, local variable or implicit record of a procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    /// Type as written, e.g. `Record Customer temporary`.
    pub type_name: String,
    pub is_var: bool,
    pub is_local: bool,
    pub is_result_parameter: bool,
    /// Name of the procedure the variable was found in.
    pub procedure: Option<String>,
}

impl Variable {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            is_var: false,
            is_local: false,
            is_result_parameter: false,
            procedure: None,
        }
    }

    #[must_use]
    pub fn by_reference(mut self, is_var: bool) -> Self {
        self.is_var = is_var;
        self
    }

    /// `var Name: Type` or `Name: Type`.
    pub fn declaration(&self) -> String {
        if self.is_var {
            format!("var {}: {}", self.name, self.type_name)
        } else {
            format!("{}: {}", self.name, self.type_name)
        }
    }
}

/// The object a procedure is created in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetObject {
    pub name: String,
    pub kind: SyntaxKind,
    pub id: Option<u32>,
    /// Document and range of the object's declaration when it is known.
    pub location: Option<(FileId, TextRange)>,
}

impl TargetObject {
    /// Describes the object declared by `node`.
    pub fn from_node(file: &FileId, node: SyntaxNodeRef<'_>) -> Option<Self> {
        if !node.kind().is_object() {
            return None;
        }
        let id = node
            .first_child_of_kind(SyntaxKind::ObjectId)
            .and_then(|id| id.text().parse().ok());
        Some(Self {
            name: node.name()?.to_string(),
            kind: node.kind(),
            id,
            location: Some((file.clone(), node.range())),
        })
    }

    pub fn can_contain_procedures(&self) -> bool {
        self.kind.can_contain_procedures()
    }

    /// Interfaces only hold declarations.
    pub fn is_declaration_only(&self) -> bool {
        self.kind == SyntaxKind::Interface
    }

    pub fn keyword(&self) -> &'static str {
        self.kind.object_keyword().unwrap_or("object")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Procedure {
    pub name: String,
    pub parameters: Vec<Variable>,
    pub variables: Vec<Variable>,
    pub return_type: Option<String>,
    /// Named return value (`procedure Foo() Result: Integer`).
    pub return_variable_name: Option<String>,
    pub access_modifier: AccessModifier,
    /// Attribute text without brackets, e.g. `IntegrationEvent(false, false)`.
    pub attributes: Vec<String>,
    pub target: Option<TargetObject>,
    /// Body statements without indentation; lines are joined with `\n`.
    pub body: String,
    pub jump_to_created_position: bool,
    pub contains_snippet: bool,
}

impl Procedure {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            variables: Vec::new(),
            return_type: None,
            return_variable_name: None,
            access_modifier: AccessModifier::Local,
            attributes: Vec::new(),
            target: None,
            body: String::new(),
            jump_to_created_position: false,
            contains_snippet: false,
        }
    }

    /// Event publishers are declared with an empty body.
    pub fn is_event_publisher(&self) -> bool {
        self.attributes.iter().any(|attribute| {
            let lower = attribute.to_ascii_lowercase();
            lower.starts_with("integrationevent") || lower.starts_with("businessevent")
        })
    }

    /// `Name(arg, ...)` passing every parameter by its own name.
    pub fn call_expression(&self) -> String {
        let args: Vec<&str> = self.parameters.iter().map(|p| p.name.as_str()).collect();
        format!("{}({})", self.name, args.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declarations_and_calls() {
        let mut procedure = Procedure::new("Calc");
        procedure.parameters = vec![
            Variable::new("a", "Integer"),
            Variable::new("b", "Decimal").by_reference(true),
        ];
        assert_eq!(procedure.parameters[1].declaration(), "var b: Decimal");
        assert_eq!(procedure.call_expression(), "Calc(a, b)");
    }

    #[test]
    fn event_attributes_are_case_insensitive() {
        let mut procedure = Procedure::new("OnAfterPost");
        assert!(!procedure.is_event_publisher());
        procedure.attributes.push("integrationEvent(false, false)".into());
        assert!(procedure.is_event_publisher());
    }
}
