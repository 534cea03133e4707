use alto_core::FileId;
use alto_syntax::StaleTree;
use thiserror::Error;

use crate::edit::EditError;

/// Why a refactoring is not offered at a location.
///
/// These are ordinary outcomes of speculative analysis and never reach the
/// user as errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotApplicableReason {
    #[error("the selection is empty")]
    EmptySelection,
    #[error("the selection is not inside a procedure or trigger body")]
    OutsideBody,
    #[error("the selection covers only part of a statement or expression")]
    PartialNode,
    #[error("the selection is not a statement sequence or expression")]
    NotExtractable,
    #[error("no return type could be inferred for the selected expression")]
    NoReturnType,
    #[error("the selection leaves the procedure in a way a call cannot reproduce")]
    UnforwardableExit,
    #[error("there is no invocation at this position")]
    NoInvocation,
    #[error("`{0}` already resolves to a procedure")]
    AlreadyDefined(String),
    #[error("{0} objects cannot contain procedures")]
    CannotContainProcedures(String),
    #[error("the target object could not be resolved")]
    UnknownTarget,
}

/// A logic error inside the engine rather than a negative analysis result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("analysis results were requested before the range was analysed")]
    NotAnalyzed,
    #[error("expected a {0} node in the syntax tree")]
    MissingNode(&'static str),
    #[error("unsupported handler kind `{0}`")]
    UnsupportedHandler(String),
    #[error("return type `{0}` has no place in the extracted procedure")]
    UnplacedReturnType(String),
}

#[derive(Debug, Error)]
pub enum RefactorError {
    #[error("refactoring is not applicable: {0}")]
    NotApplicable(#[from] NotApplicableReason),
    #[error("the analysis was cancelled")]
    Cancelled,
    #[error("document {file} changed while analysing version {version}")]
    StaleSnapshot { file: FileId, version: i32 },
    #[error("internal error: {0}")]
    Invariant(#[from] InvariantViolation),
    #[error(transparent)]
    Edit(#[from] EditError),
}

impl RefactorError {
    pub fn is_not_applicable(&self) -> bool {
        matches!(self, RefactorError::NotApplicable(_))
    }

    /// Only logic errors are surfaced to the user; everything else is an
    /// expected outcome of running analyses speculatively.
    pub fn should_notify_user(&self) -> bool {
        matches!(self, RefactorError::Invariant(_) | RefactorError::Edit(_))
    }

    pub(crate) fn stale(file: &FileId, stale: StaleTree) -> Self {
        RefactorError::StaleSnapshot {
            file: file.clone(),
            version: stale.version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        let not_applicable = RefactorError::from(NotApplicableReason::EmptySelection);
        assert!(not_applicable.is_not_applicable());
        assert!(!not_applicable.should_notify_user());

        let invariant = RefactorError::from(InvariantViolation::UnsupportedHandler("Foo".into()));
        assert!(invariant.should_notify_user());
        assert_eq!(
            invariant.to_string(),
            "internal error: unsupported handler kind `Foo`"
        );

        assert!(!RefactorError::Cancelled.should_notify_user());
    }

    #[test]
    fn unplaced_return_type_is_reported_to_the_user() {
        let err = RefactorError::from(InvariantViolation::UnplacedReturnType("Decimal".into()));
        assert!(err.should_notify_user());
        assert_eq!(
            err.to_string(),
            "internal error: return type `Decimal` has no place in the extracted procedure"
        );

        let exit = RefactorError::from(NotApplicableReason::UnforwardableExit);
        assert!(exit.is_not_applicable());
        assert!(!exit.should_notify_user());
    }
}
