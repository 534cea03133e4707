//! The language-service capability consulted for symbol information.

use std::sync::OnceLock;

use alto_core::{FileId, Location, Position};
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("language service is not available: {0}")]
    Unavailable(String),
    #[error("language service request failed: {0}")]
    Request(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureParameter {
    pub name: String,
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureInfo {
    pub label: String,
    pub parameters: Vec<SignatureParameter>,
    /// Index of the parameter the queried position is in.
    pub active_parameter: Option<u32>,
}

impl SignatureInfo {
    pub fn active(&self) -> Option<&SignatureParameter> {
        self.parameters.get(self.active_parameter? as usize)
    }
}

/// Symbol queries answered by the AL language service.
///
/// Implementations talk to a separate process; every call is a suspension
/// point. A failed or empty answer is never fatal to an analysis.
#[async_trait]
pub trait SymbolOracle: Send + Sync {
    /// Hover text of the symbol at `position`, e.g. `(local) Amount : Decimal`.
    async fn hover(&self, file: &FileId, position: Position) -> Result<Option<String>, OracleError>;

    async fn definition(&self, file: &FileId, position: Position)
        -> Result<Vec<Location>, OracleError>;

    async fn references(&self, file: &FileId, position: Position)
        -> Result<Vec<Location>, OracleError>;

    async fn signature_help(
        &self,
        file: &FileId,
        position: Position,
    ) -> Result<Option<SignatureInfo>, OracleError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Local,
    Global,
    Parameter,
    ReturnValue,
    Field,
    Procedure,
    Other,
}

impl SymbolKind {
    pub fn is_variable(self) -> bool {
        matches!(
            self,
            SymbolKind::Local | SymbolKind::Global | SymbolKind::Parameter | SymbolKind::ReturnValue
        )
    }
}

/// A hover answer broken into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverSymbol {
    pub kind: SymbolKind,
    pub name: String,
    /// Declared type; for procedures the return type, if any.
    pub type_name: Option<String>,
}

impl HoverSymbol {
    /// Parses `(local|global|parameter|return value|field) Name : Type` and
    /// `[local ]procedure Name(...)[ ret][: Type]`. Markdown code fences
    /// around the text are ignored.
    pub fn parse(hover: &str) -> Option<HoverSymbol> {
        static VARIABLE_RE: OnceLock<Regex> = OnceLock::new();
        static PROCEDURE_RE: OnceLock<Regex> = OnceLock::new();

        let line = hover
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.starts_with("```"))?;

        let variable_re = VARIABLE_RE.get_or_init(|| {
            Regex::new(r#"^\(([A-Za-z ]+)\)\s+("[^"]*"|[^\s:]+)\s*:\s*(.+?)\s*;?$"#)
                .expect("valid regex")
        });
        if let Some(caps) = variable_re.captures(line) {
            let kind = match caps[1].trim().to_ascii_lowercase().as_str() {
                "local" => SymbolKind::Local,
                "global" => SymbolKind::Global,
                "parameter" => SymbolKind::Parameter,
                "return value" => SymbolKind::ReturnValue,
                "field" => SymbolKind::Field,
                _ => SymbolKind::Other,
            };
            return Some(HoverSymbol {
                kind,
                name: caps[2].to_string(),
                type_name: Some(caps[3].to_string()),
            });
        }

        let procedure_re = PROCEDURE_RE.get_or_init(|| {
            Regex::new(
                r#"(?i)^(?:(?:local|internal|protected|public)\s+)?(?:procedure|trigger)\s+("[^"]*"|[A-Za-z_][A-Za-z0-9_]*)\s*\(.*\)\s*(?:(?:"[^"]*"|[A-Za-z_][A-Za-z0-9_]*)\s*)?(?::\s*(.+?))?\s*;?$"#,
            )
            .expect("valid regex")
        });
        let caps = procedure_re.captures(line)?;
        Some(HoverSymbol {
            kind: SymbolKind::Procedure,
            name: caps[1].to_string(),
            type_name: caps.get(2).map(|m| m.as_str().to_string()),
        })
    }
}
