//! A [`SymbolOracle`] that answers from a parsed fixture.
//!
//! Resolution follows AL scoping closely enough for tests: parameters, the
//! named return value and locals of the enclosing procedure, then globals and
//! procedures of the enclosing object. Members are resolved against objects
//! declared in the fixture or registered with [`FixtureOracle::with_member`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use alto_core::{FileId, LineIndex, Location, Name, Position, TextSize};
use alto_refactor::{OracleError, SignatureInfo, SignatureParameter, SymbolKind, SymbolOracle};
use alto_syntax::{NodeId, SyntaxKind, SyntaxNodeRef, SyntaxTree};
use async_trait::async_trait;

#[derive(Debug)]
pub struct FixtureOracle {
    file: FileId,
    tree: SyntaxTree,
    index: LineIndex,
    hovers: HashMap<String, String>,
    members: HashMap<(String, String), String>,
    signatures: HashMap<String, SignatureInfo>,
    unavailable: bool,
    latency: Option<Duration>,
    calls: AtomicUsize,
}

#[derive(Debug, Clone)]
enum Symbol {
    Variable {
        kind: SymbolKind,
        name: NodeId,
        declaration: NodeId,
    },
    Procedure(NodeId),
    Field {
        name: String,
        type_name: String,
    },
}

impl Symbol {
    fn same_as(&self, other: &Symbol) -> bool {
        match (self, other) {
            (Symbol::Variable { name: a, .. }, Symbol::Variable { name: b, .. }) => a == b,
            (Symbol::Procedure(a), Symbol::Procedure(b)) => a == b,
            _ => false,
        }
    }
}

const METHODS: &[SyntaxKind] = &[SyntaxKind::MethodDeclaration, SyntaxKind::TriggerDeclaration];

impl FixtureOracle {
    pub fn new(file: FileId, tree: &SyntaxTree) -> Self {
        Self {
            file,
            index: LineIndex::new(tree.text()),
            tree: tree.clone(),
            hovers: HashMap::new(),
            members: HashMap::new(),
            signatures: HashMap::new(),
            unavailable: false,
            latency: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Hover text for an identifier that does not resolve in the fixture.
    #[must_use]
    pub fn with_hover(mut self, name: &str, hover: impl Into<String>) -> Self {
        self.hovers.insert(key(name), hover.into());
        self
    }

    /// Declares `member` of `object` (e.g. a table field) with type `type_name`.
    #[must_use]
    pub fn with_member(mut self, object: &str, member: &str, type_name: impl Into<String>) -> Self {
        self.members.insert((key(object), key(member)), type_name.into());
        self
    }

    /// Signature of a procedure that is not declared in the fixture.
    #[must_use]
    pub fn with_signature(mut self, name: &str, parameters: &[(&str, &str)]) -> Self {
        let parameters: Vec<SignatureParameter> = parameters
            .iter()
            .map(|(name, type_name)| SignatureParameter {
                name: (*name).to_string(),
                type_name: (*type_name).to_string(),
            })
            .collect();
        self.signatures.insert(
            key(name),
            SignatureInfo {
                label: signature_label(name, &parameters),
                parameters,
                active_parameter: None,
            },
        );
        self
    }

    /// Every request fails with [`OracleError::Unavailable`].
    #[must_use]
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Every request waits `latency` before answering.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of requests received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self, file: &FileId) -> Result<(), OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable {
            return Err(OracleError::Unavailable("fixture oracle is offline".into()));
        }
        if file != &self.file {
            return Err(OracleError::Request(format!("unknown document {file}")));
        }
        Ok(())
    }

    fn offset(&self, position: Position) -> Option<TextSize> {
        self.index.offset_of_position(self.tree.text(), position)
    }

    fn identifier_at(&self, position: Position) -> Option<SyntaxNodeRef<'_>> {
        let offset = self.offset(position)?;
        self.tree.find_node(
            offset,
            Some(&[SyntaxKind::IdentifierName, SyntaxKind::VariableDeclarationName]),
        )
    }

    fn location(&self, node: SyntaxNodeRef<'_>) -> Location {
        Location::new(self.file.clone(), self.index.range(self.tree.text(), node.range()))
    }

    fn resolve(&self, node: SyntaxNodeRef<'_>) -> Option<Symbol> {
        let name = node.name()?;
        if node.kind() == SyntaxKind::VariableDeclarationName {
            let declaration = node.parent()?;
            return Some(Symbol::Variable {
                kind: declaration_kind(declaration)?,
                name: node.id(),
                declaration: declaration.id(),
            });
        }

        let parent = node.parent()?;
        if METHODS.contains(&parent.kind()) {
            return Some(Symbol::Procedure(parent.id()));
        }
        if parent.kind() == SyntaxKind::MemberAccessExpression && node.index_in_parent() != Some(0) {
            return self.resolve_member(parent.child(0)?, name);
        }

        if let Some(method) = node.ancestor_of_kind(METHODS) {
            if let Some(symbol) = find_in_method(method, name) {
                return Some(symbol);
            }
        }
        let object = node.ancestors().find(|n| n.kind().is_object())?;
        find_in_object(object, name)
    }

    fn resolve_member(&self, receiver: SyntaxNodeRef<'_>, member: &str) -> Option<Symbol> {
        let receiver_type = match self.resolve(receiver)? {
            Symbol::Variable { declaration, .. } => self.tree.node(declaration).data_type()?.to_string(),
            _ => return None,
        };
        let object = object_name(&receiver_type)?;
        if let Some(type_name) = self.members.get(&(key(object), key(member))) {
            return Some(Symbol::Field {
                name: member.to_string(),
                type_name: type_name.clone(),
            });
        }
        let declared = self
            .tree
            .root()
            .children()
            .find(|o| o.name().is_some_and(|n| Name::new(n).matches(object)))?;
        declared
            .children()
            .find(|c| c.kind() == SyntaxKind::MethodDeclaration && c.name().is_some_and(|n| Name::new(n).matches(member)))
            .map(|method| Symbol::Procedure(method.id()))
    }

    fn hover_text(&self, symbol: &Symbol) -> Option<String> {
        match symbol {
            Symbol::Variable {
                kind,
                name,
                declaration,
            } => {
                let word = match kind {
                    SymbolKind::Local => "local",
                    SymbolKind::Global => "global",
                    SymbolKind::Parameter => "parameter",
                    SymbolKind::ReturnValue => "return value",
                    _ => "variable",
                };
                Some(format!(
                    "({word}) {} : {}",
                    self.tree.node(*name).name()?,
                    self.tree.node(*declaration).data_type()?
                ))
            }
            Symbol::Procedure(method) => Some(procedure_hover(self.tree.node(*method))),
            Symbol::Field { name, type_name } => Some(format!("(field) {name} : {type_name}")),
        }
    }

    fn references_of(&self, symbol: &Symbol) -> Vec<Location> {
        self.tree
            .root()
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::IdentifierName)
            .filter(|n| !n.parent().is_some_and(|p| METHODS.contains(&p.kind())))
            .filter(|n| self.resolve(*n).is_some_and(|s| s.same_as(symbol)))
            .map(|n| self.location(n))
            .collect()
    }

    fn signature_at(&self, position: Position) -> Option<SignatureInfo> {
        let offset = self.offset(position)?;
        let arguments = self.tree.find_node(offset, Some(&[SyntaxKind::ArgumentList]))?;
        let callee = arguments.parent()?.child(0)?;
        let name_node = match callee.kind() {
            SyntaxKind::MemberAccessExpression => callee.children().last()?,
            _ => callee,
        };
        let mut signature = match self.resolve(name_node) {
            Some(Symbol::Procedure(method)) => method_signature(self.tree.node(method)),
            _ => self.signatures.get(&key(name_node.name()?))?.clone(),
        };
        let active = arguments.children().filter(|a| a.range().end() < offset).count();
        signature.active_parameter = Some(active as u32);
        Some(signature)
    }
}

#[async_trait]
impl SymbolOracle for FixtureOracle {
    async fn hover(&self, file: &FileId, position: Position) -> Result<Option<String>, OracleError> {
        self.enter(file).await?;
        let Some(node) = self.identifier_at(position) else {
            return Ok(None);
        };
        match self.resolve(node) {
            Some(symbol) => Ok(self.hover_text(&symbol)),
            None => Ok(node.name().and_then(|n| self.hovers.get(&key(n)).cloned())),
        }
    }

    async fn definition(&self, file: &FileId, position: Position) -> Result<Vec<Location>, OracleError> {
        self.enter(file).await?;
        let symbol = self.identifier_at(position).and_then(|n| self.resolve(n));
        let target = match symbol {
            Some(Symbol::Variable { name, .. }) => Some(self.tree.node(name)),
            Some(Symbol::Procedure(method)) => self.tree.node(method).first_child_of_kind(SyntaxKind::IdentifierName),
            _ => None,
        };
        Ok(target.map(|n| self.location(n)).into_iter().collect())
    }

    async fn references(&self, file: &FileId, position: Position) -> Result<Vec<Location>, OracleError> {
        self.enter(file).await?;
        Ok(self
            .identifier_at(position)
            .and_then(|n| self.resolve(n))
            .map(|symbol| self.references_of(&symbol))
            .unwrap_or_default())
    }

    async fn signature_help(
        &self,
        file: &FileId,
        position: Position,
    ) -> Result<Option<SignatureInfo>, OracleError> {
        self.enter(file).await?;
        Ok(self.signature_at(position))
    }
}

fn key(name: &str) -> String {
    Name::new(name).unquoted().to_ascii_lowercase()
}

fn declaration_kind(declaration: SyntaxNodeRef<'_>) -> Option<SymbolKind> {
    match declaration.kind() {
        SyntaxKind::Parameter => Some(SymbolKind::Parameter),
        SyntaxKind::ReturnValue => Some(SymbolKind::ReturnValue),
        SyntaxKind::VariableDeclaration | SyntaxKind::VariableListDeclaration => {
            match declaration.parent()?.kind() {
                SyntaxKind::GlobalVarSection => Some(SymbolKind::Global),
                _ => Some(SymbolKind::Local),
            }
        }
        _ => None,
    }
}

fn variable_in<'t>(
    declarations: impl Iterator<Item = SyntaxNodeRef<'t>>,
    name: &str,
) -> Option<Symbol> {
    for declaration in declarations {
        for name_node in declaration
            .children()
            .filter(|c| c.kind() == SyntaxKind::VariableDeclarationName)
        {
            if name_node.name().is_some_and(|n| Name::new(n).matches(name)) {
                return Some(Symbol::Variable {
                    kind: declaration_kind(declaration)?,
                    name: name_node.id(),
                    declaration: declaration.id(),
                });
            }
        }
    }
    None
}

fn find_in_method(method: SyntaxNodeRef<'_>, name: &str) -> Option<Symbol> {
    let parameters = method
        .first_child_of_kind(SyntaxKind::ParameterList)
        .into_iter()
        .flat_map(|list| list.children());
    let return_value = method.first_child_of_kind(SyntaxKind::ReturnValue).into_iter();
    let locals = method
        .first_child_of_kind(SyntaxKind::VarSection)
        .into_iter()
        .flat_map(|section| section.children());
    variable_in(parameters.chain(return_value).chain(locals), name)
}

fn find_in_object(object: SyntaxNodeRef<'_>, name: &str) -> Option<Symbol> {
    let globals = object
        .children()
        .filter(|c| c.kind() == SyntaxKind::GlobalVarSection)
        .flat_map(|section| section.children());
    if let Some(symbol) = variable_in(globals, name) {
        return Some(symbol);
    }
    object
        .children()
        .find(|c| c.kind() == SyntaxKind::MethodDeclaration && c.name().is_some_and(|n| Name::new(n).matches(name)))
        .map(|method| Symbol::Procedure(method.id()))
}

/// `Record "Sales Header" temporary` -> `"Sales Header"`.
fn object_name(type_name: &str) -> Option<&str> {
    let (_, rest) = type_name.trim().split_once(char::is_whitespace)?;
    let rest = rest.trim();
    if let Some(quoted) = rest.strip_prefix('"') {
        let end = quoted.find('"')?;
        return Some(&rest[..end + 2]);
    }
    rest.split_whitespace().next()
}

fn procedure_hover(method: SyntaxNodeRef<'_>) -> String {
    let keyword = if method.kind() == SyntaxKind::TriggerDeclaration {
        "trigger"
    } else {
        "procedure"
    };
    let modifier = method
        .first_child_of_kind(SyntaxKind::AccessModifier)
        .map(|m| format!("{} ", m.text()))
        .unwrap_or_default();
    let parameters: Vec<&str> = method
        .first_child_of_kind(SyntaxKind::ParameterList)
        .into_iter()
        .flat_map(|list| list.children())
        .map(|p| p.text())
        .collect();
    let mut text = format!(
        "{modifier}{keyword} {}({})",
        method.name().unwrap_or_default(),
        parameters.join("; ")
    );
    if let Some(return_value) = method.first_child_of_kind(SyntaxKind::ReturnValue) {
        text.push_str(&format!(": {}", return_value.data_type().unwrap_or_default()));
    }
    text
}

fn method_signature(method: SyntaxNodeRef<'_>) -> SignatureInfo {
    let parameters: Vec<SignatureParameter> = method
        .first_child_of_kind(SyntaxKind::ParameterList)
        .into_iter()
        .flat_map(|list| list.children())
        .map(|p| SignatureParameter {
            name: p.name().unwrap_or_default().to_string(),
            type_name: p.data_type().unwrap_or_default().to_string(),
        })
        .collect();
    SignatureInfo {
        label: signature_label(method.name().unwrap_or_default(), &parameters),
        parameters,
        active_parameter: None,
    }
}

fn signature_label(name: &str, parameters: &[SignatureParameter]) -> String {
    let parameters: Vec<String> = parameters
        .iter()
        .map(|p| format!("{}: {}", p.name, p.type_name))
        .collect();
    format!("{name}({})", parameters.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    const TEXT: &str = "codeunit 50100 Calc\n{\n    var\n        Total: Decimal;\n\n    procedure Add(Amount: Decimal): Decimal\n    var\n        Result: Decimal;\n    begin\n        Result := Amount + Total;\n        exit(Result);\n    end;\n}\n";

    fn oracle() -> FixtureOracle {
        FixtureOracle::new(FileId::new("file:///Calc.al"), &parse(TEXT, 1).unwrap())
    }

    fn position(needle: &str, nth: usize) -> Position {
        let offset = TEXT.match_indices(needle).nth(nth).unwrap().0;
        LineIndex::new(TEXT).position(TEXT, TextSize::from(offset as u32))
    }

    #[tokio::test]
    async fn hovers_follow_scopes() {
        let oracle = oracle();
        let file = FileId::new("file:///Calc.al");
        assert_eq!(
            oracle.hover(&file, position("Result", 1)).await.unwrap().as_deref(),
            Some("(local) Result : Decimal")
        );
        assert_eq!(
            oracle.hover(&file, position("Total", 1)).await.unwrap().as_deref(),
            Some("(global) Total : Decimal")
        );
        assert_eq!(
            oracle.hover(&file, position("Add", 0)).await.unwrap().as_deref(),
            Some("procedure Add(Amount: Decimal): Decimal")
        );
    }

    #[tokio::test]
    async fn references_exclude_the_declaration() {
        let oracle = oracle();
        let file = FileId::new("file:///Calc.al");
        let refs = oracle.references(&file, position("Result", 0)).await.unwrap();
        assert_eq!(refs.len(), 2);
    }

    #[tokio::test]
    async fn unavailable_oracle_fails_every_request() {
        let oracle = oracle().unavailable();
        let file = FileId::new("file:///Calc.al");
        assert!(oracle.hover(&file, position("Result", 1)).await.is_err());
        assert_eq!(oracle.calls(), 1);
    }

    #[test]
    fn object_names_keep_quotes() {
        assert_eq!(object_name("Record \"Sales Header\" temporary"), Some("\"Sales Header\""));
        assert_eq!(object_name("Codeunit Calc"), Some("Calc"));
    }
}
