//! Refactorings for AL.
//!
//! Two families are implemented on top of an immutable syntax snapshot and an
//! injected [`SymbolOracle`]:
//! - Extract Procedure (`extract_procedure`): range reduction, return-type
//!   inference, variable capture and procedure synthesis
//! - Create Procedure (`create_procedure`): declares a missing procedure,
//!   event publisher or test handler from a call site
//!
//! Nothing is written to the document until an analysis has fully succeeded;
//! every refactoring produces one [`WorkspaceEdit`].

mod capture;
mod code_actions;
mod context;
mod create_procedure;
mod edit;
mod error;
mod extract_procedure;
mod oracle;
mod preview;
mod procedure;
mod return_type;

pub mod range_analyzer;
pub mod synthesize;
pub mod type_detective;

pub use capture::{classify_variables, push_unique, Captures};
pub use code_actions::{
    create_procedure_code_actions, extract_procedure_code_actions, CodeAction, CodeActionKind,
};
pub use context::{AnalysisContext, DocumentSnapshot};
pub use create_procedure::{
    create_handler_procedure, CreateProcedure, CreateProcedureKind, CreateProcedureOutcome,
    NOT_IMPLEMENTED_BODY,
};
pub use edit::{apply_text_edits, EditError, TextEdit, WorkspaceEdit};
pub use error::{InvariantViolation, NotApplicableReason, RefactorError};
pub use extract_procedure::{ExtractProcedure, ExtractProcedureOutcome};
pub use oracle::{
    HoverSymbol, OracleError, SignatureInfo, SignatureParameter, SymbolKind, SymbolOracle,
};
pub use preview::{generate_preview, FilePreview, RefactoringPreview};
pub use procedure::{AccessModifier, Procedure, TargetObject, Variable};
pub use range_analyzer::{ExtractionTier, ExtractionUnit, RangeAnalyzer};
pub use return_type::{analyze_return_type, ReturnPlacement, ReturnTypeInfo};
pub use type_detective::{find_return_type_of_node, TypeDetective, TypeInfo};

pub use alto_config::{CapturePolicy, RefactorConfig};
pub use alto_core::TextRange;
