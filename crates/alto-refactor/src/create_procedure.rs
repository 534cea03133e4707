//! Create Procedure: declares a procedure for an invocation that does not
//! resolve yet, inferring its parameters and return type from the call.

use alto_config::AccessModifier;
use alto_core::{Name, TextSize};
use alto_syntax::{SyntaxKind, SyntaxNodeRef};

use crate::capture::push_unique;
use crate::context::AnalysisContext;
use crate::edit::{TextEdit, WorkspaceEdit};
use crate::error::{InvariantViolation, NotApplicableReason};
use crate::extract_procedure::reveal_name;
use crate::oracle::SymbolKind;
use crate::procedure::{Procedure, TargetObject, Variable};
use crate::synthesize::{render_procedure, INDENT_UNIT};
use crate::type_detective::{find_return_type_of_node, TypeDetective};
use crate::RefactorError;

pub const NOT_IMPLEMENTED_BODY: &str = "Error('Procedure not implemented.');";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateProcedureKind {
    #[default]
    Procedure,
    IntegrationEvent,
    BusinessEvent,
}

impl CreateProcedureKind {
    pub const ALL: [CreateProcedureKind; 3] = [
        CreateProcedureKind::Procedure,
        CreateProcedureKind::IntegrationEvent,
        CreateProcedureKind::BusinessEvent,
    ];

    pub fn title(self, name: &str) -> String {
        match self {
            CreateProcedureKind::Procedure => format!("Create procedure {name}"),
            CreateProcedureKind::IntegrationEvent => format!("Create integration event {name}"),
            CreateProcedureKind::BusinessEvent => format!("Create business event {name}"),
        }
    }

    /// Turns a plain procedure into an event publisher of this kind.
    pub fn decorate(self, mut procedure: Procedure) -> Procedure {
        let attribute = match self {
            CreateProcedureKind::Procedure => return procedure,
            CreateProcedureKind::IntegrationEvent => "IntegrationEvent(false, false)",
            CreateProcedureKind::BusinessEvent => "BusinessEvent(false)",
        };
        procedure.attributes.push(attribute.to_string());
        procedure.return_type = None;
        procedure.return_variable_name = None;
        procedure.body.clear();
        procedure
    }
}

/// A request to create the procedure called at `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateProcedure {
    pub offset: TextSize,
    pub kind: CreateProcedureKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProcedureOutcome {
    pub procedure: Procedure,
    /// `None` when the target object lives in another document.
    pub insertion_offset: Option<TextSize>,
    pub edit: WorkspaceEdit,
    pub reveal: Option<alto_core::Range>,
}

impl CreateProcedure {
    pub fn new(offset: TextSize) -> Self {
        Self {
            offset,
            kind: CreateProcedureKind::Procedure,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: CreateProcedureKind) -> Self {
        self.kind = kind;
        self
    }

    pub async fn apply(&self, ctx: &AnalysisContext) -> Result<CreateProcedureOutcome, RefactorError> {
        let procedure = self.kind.decorate(self.build(ctx).await?);
        insert_procedure(ctx, procedure)
    }

    /// Infers the procedure without deciding where it goes.
    pub async fn build(&self, ctx: &AnalysisContext) -> Result<Procedure, RefactorError> {
        let config = ctx.config();
        let tree = ctx.tree()?;
        let invocation = tree
            .find_node(self.offset, Some(&[SyntaxKind::InvocationExpression]))
            .ok_or(NotApplicableReason::NoInvocation)?;
        let callee = invocation
            .child(0)
            .ok_or(InvariantViolation::MissingNode("callee"))?;
        let (name_node, receiver) = match callee.kind() {
            SyntaxKind::IdentifierName => (callee, None),
            SyntaxKind::MemberAccessExpression => (
                callee
                    .children()
                    .last()
                    .ok_or(InvariantViolation::MissingNode("member name"))?,
                callee.child(0),
            ),
            _ => return Err(NotApplicableReason::NoInvocation.into()),
        };
        let name = name_node
            .name()
            .ok_or(InvariantViolation::MissingNode("identifier"))?
            .to_string();

        if let Some(symbol) = ctx.hover_symbol(name_node.range().start()).await? {
            if symbol.kind == SymbolKind::Procedure {
                return Err(NotApplicableReason::AlreadyDefined(name).into());
            }
        }

        let enclosing = invocation
            .ancestors()
            .find(|n| n.kind().is_object())
            .ok_or(InvariantViolation::MissingNode("object"))?;
        let enclosing = TargetObject::from_node(ctx.document().file(), enclosing)
            .ok_or(InvariantViolation::MissingNode("object name"))?;
        let target = match receiver {
            None => enclosing.clone(),
            Some(receiver) => resolve_receiver(ctx, receiver).await?,
        };
        if !target.can_contain_procedures() {
            return Err(NotApplicableReason::CannotContainProcedures(target.keyword().to_string()).into());
        }

        let mut procedure = Procedure::new(&name);
        procedure.access_modifier = if target.is_declaration_only() {
            AccessModifier::Public
        } else if same_object(&target, &enclosing) {
            AccessModifier::Local
        } else {
            config.external_access_modifier
        };

        if let Some(arguments) = invocation.first_child_of_kind(SyntaxKind::ArgumentList) {
            let detective = TypeDetective::new(ctx);
            for argument in arguments.children() {
                let info = detective.analyze(argument).await?;
                let by_reference = info.is_var || info.is_record();
                push_unique(
                    &mut procedure.parameters,
                    Variable::new(info.name.clone(), info.type_name.clone()).by_reference(by_reference),
                );
            }
        }

        procedure.return_type = find_return_type_of_node(ctx, invocation).await?;
        procedure.body = NOT_IMPLEMENTED_BODY.to_string();
        procedure.jump_to_created_position = config.jump_to_created_position;
        procedure.target = Some(target);
        tracing::debug!(
            name = %procedure.name,
            parameters = procedure.parameters.len(),
            return_type = ?procedure.return_type,
            "inferred missing procedure"
        );
        Ok(procedure)
    }
}

fn same_object(a: &TargetObject, b: &TargetObject) -> bool {
    a.kind == b.kind && Name::new(&a.name).matches(&b.name)
}

/// The object a receiver's declared type refers to, e.g. `Codeunit "Sales-Post"`.
async fn resolve_receiver(
    ctx: &AnalysisContext,
    receiver: SyntaxNodeRef<'_>,
) -> Result<TargetObject, RefactorError> {
    let info = TypeDetective::new(ctx).analyze(receiver).await?;
    let type_name = info.type_name.trim();
    let (keyword, rest) = type_name
        .split_once(char::is_whitespace)
        .ok_or(NotApplicableReason::UnknownTarget)?;
    let kind = match keyword.to_ascii_lowercase().as_str() {
        "record" => SyntaxKind::TableObject,
        other => SyntaxKind::from_object_keyword(other).ok_or(NotApplicableReason::UnknownTarget)?,
    };
    let object_name = strip_temporary(rest.trim()).to_string();

    let tree = ctx.tree()?;
    let declared = tree
        .root()
        .children()
        .find(|object| {
            object.kind() == kind && object.name().is_some_and(|n| Name::new(n).matches(&object_name))
        })
        .and_then(|object| TargetObject::from_node(ctx.document().file(), object));
    Ok(declared.unwrap_or(TargetObject {
        name: object_name,
        kind,
        id: None,
        location: None,
    }))
}

fn strip_temporary(type_rest: &str) -> &str {
    let trimmed = type_rest.trim_end();
    match trimmed.len().checked_sub(" temporary".len()) {
        Some(idx)
            if trimmed.is_char_boundary(idx)
                && trimmed[idx..].eq_ignore_ascii_case(" temporary") =>
        {
            trimmed[..idx].trim_end()
        }
        _ => trimmed,
    }
}

/// Builds the edit inserting `procedure` before the closing brace of its
/// target object, if that object is declared in the analysed document.
pub(crate) fn insert_procedure(
    ctx: &AnalysisContext,
    procedure: Procedure,
) -> Result<CreateProcedureOutcome, RefactorError> {
    ctx.check()?;
    let document = ctx.document();
    let target = procedure
        .target
        .as_ref()
        .ok_or(InvariantViolation::MissingNode("target object"))?;
    let Some(object_range) = target
        .location
        .as_ref()
        .filter(|(file, _)| file == document.file())
        .map(|(_, range)| *range)
    else {
        tracing::debug!(target = %target.name, "target object is declared in another document");
        return Ok(CreateProcedureOutcome {
            procedure,
            insertion_offset: None,
            edit: WorkspaceEdit::default(),
            reveal: None,
        });
    };

    let text = document.text();
    let insertion_offset = before_closing_brace(text, object_range.end());
    let indent = format!("{}{INDENT_UNIT}", document.indentation_at(object_range.start()));
    let line_ending = document.line_ending();
    let declaration = format!(
        "{eol}{eol}{}",
        render_procedure(&procedure, &indent, line_ending, target.is_declaration_only()),
        eol = line_ending.as_str()
    );

    let mut edit = WorkspaceEdit::new(vec![TextEdit::insert(
        document.file().clone(),
        insertion_offset,
        declaration.clone(),
    )]);
    edit.normalize()?;
    let reveal = if procedure.jump_to_created_position {
        reveal_name(text, &edit, &declaration, &procedure.name, insertion_offset, 0)?
    } else {
        None
    };
    Ok(CreateProcedureOutcome {
        procedure,
        insertion_offset: Some(insertion_offset),
        edit,
        reveal,
    })
}

/// End of the last line before the object's closing `}`.
fn before_closing_brace(text: &str, object_end: TextSize) -> TextSize {
    let end = u32::from(object_end) as usize;
    let brace = text[..end].rfind('}').unwrap_or(end);
    let mut offset = text[..brace].rfind('\n').unwrap_or(brace);
    if offset > 0 && text.as_bytes()[offset - 1] == b'\r' {
        offset -= 1;
    }
    TextSize::from(offset as u32)
}

/// A test handler procedure of the given handler attribute kind.
pub fn create_handler_procedure(kind: &str, name: &str) -> Result<Procedure, RefactorError> {
    let (parameters, return_type, snippet): (Vec<(&str, &str, bool)>, Option<&str>, bool) =
        match kind.to_ascii_lowercase().as_str() {
            "confirmhandler" => (
                vec![("Question", "Text[1024]", false), ("Reply", "Boolean", true)],
                None,
                false,
            ),
            "messagehandler" => (vec![("Message", "Text[1024]", false)], None, false),
            "strmenuhandler" => (
                vec![
                    ("Options", "Text[1024]", false),
                    ("Choice", "Integer", true),
                    ("Instruction", "Text[1024]", false),
                ],
                None,
                false,
            ),
            "pagehandler" | "modalpagehandler" => {
                (vec![("TestPage", "TestPage ${1:PageName}", true)], None, true)
            }
            "reporthandler" => (vec![("Report", "Report ${1:ReportName}", true)], None, true),
            "requestpagehandler" => (
                vec![("RequestPage", "TestRequestPage ${1:ReportName}", true)],
                None,
                true,
            ),
            "sendnotificationhandler" | "recallnotificationhandler" => {
                (vec![("Notification", "Notification", true)], Some("Boolean"), false)
            }
            "hyperlinkhandler" => (vec![("Hyperlink", "Text[1024]", false)], None, false),
            "filterpagehandler" => (vec![("Record", "RecordRef", true)], Some("Boolean"), false),
            "sessionsettingshandler" => (
                vec![("TestSessionSettings", "SessionSettings", true)],
                Some("Boolean"),
                false,
            ),
            _ => {
                tracing::error!(kind, "unsupported handler kind");
                return Err(InvariantViolation::UnsupportedHandler(kind.to_string()).into());
            }
        };

    let mut procedure = Procedure::new(name);
    procedure.access_modifier = AccessModifier::Public;
    procedure.attributes.push(canonical_handler(kind));
    procedure.parameters = parameters
        .into_iter()
        .map(|(name, ty, by_ref)| Variable::new(name, ty).by_reference(by_ref))
        .collect();
    procedure.return_type = return_type.map(str::to_string);
    procedure.contains_snippet = snippet;
    Ok(procedure)
}

fn canonical_handler(kind: &str) -> String {
    const KINDS: [&str; 12] = [
        "ConfirmHandler",
        "MessageHandler",
        "StrMenuHandler",
        "PageHandler",
        "ModalPageHandler",
        "ReportHandler",
        "RequestPageHandler",
        "SendNotificationHandler",
        "RecallNotificationHandler",
        "HyperlinkHandler",
        "FilterPageHandler",
        "SessionSettingsHandler",
    ];
    KINDS
        .iter()
        .find(|k| k.eq_ignore_ascii_case(kind))
        .map_or_else(|| kind.to_string(), |k| (*k).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesize::render_procedure;
    use alto_core::LineEnding;
    use pretty_assertions::assert_eq;

    #[test]
    fn confirm_handler_signature() {
        let procedure = create_handler_procedure("confirmhandler", "ConfirmYes").unwrap();
        assert_eq!(
            render_procedure(&procedure, "", LineEnding::Lf, false),
            "[ConfirmHandler]\nprocedure ConfirmYes(Question: Text[1024]; var Reply: Boolean)\nbegin\nend;"
        );
    }

    #[test]
    fn page_handlers_are_snippets() {
        let procedure = create_handler_procedure("ModalPageHandler", "LookupHandler").unwrap();
        assert!(procedure.contains_snippet);
        assert_eq!(procedure.parameters[0].declaration(), "var TestPage: TestPage ${1:PageName}");
    }

    #[test]
    fn unknown_handler_is_an_invariant_violation() {
        let err = create_handler_procedure("TeapotHandler", "X").unwrap_err();
        assert!(err.should_notify_user());
    }

    #[test]
    fn events_drop_return_type_and_body() {
        let mut procedure = Procedure::new("OnAfterPost");
        procedure.return_type = Some("Boolean".into());
        procedure.body = NOT_IMPLEMENTED_BODY.into();
        let event = CreateProcedureKind::BusinessEvent.decorate(procedure);
        assert_eq!(event.attributes, vec!["BusinessEvent(false)".to_string()]);
        assert_eq!(event.return_type, None);
        assert!(event.is_event_publisher());
    }

    #[test]
    fn temporary_suffix() {
        assert_eq!(strip_temporary("Customer temporary"), "Customer");
        assert_eq!(strip_temporary("\"Sales Header\""), "\"Sales Header\"");
    }

    #[test]
    fn insertion_goes_before_the_closing_brace_line() {
        let text = "codeunit 50100 X\r\n{\r\n    trigger OnRun()\r\n    begin\r\n    end;\r\n}\r\n";
        let end = TextSize::from(text.trim_end().len() as u32);
        let offset = u32::from(before_closing_brace(text, end)) as usize;
        assert!(text[..offset].ends_with("end;"));
    }
}
