//! Unified error handling for qaforge core.
//!
//! Wraps domain and application errors behind one type with a category and
//! user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for qaforge core operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForgeError {
    /// Errors from the domain layer (business rule violations).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Errors from the application layer (orchestration and port failures).
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl ForgeError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {message}"),
                "Inspect the effective settings with: qaforge config list".into(),
            ],
            Self::Internal { .. } => vec![
                "This appears to be a bug in qaforge".into(),
                "Please report this issue at: https://github.com/qaforge/qaforge/issues".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Pack => ErrorCategory::Pack,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Application(ApplicationError::StoreLockError | ApplicationError::NotReady { .. })
        )
    }

    /// `true` for the uniform "unknown or expired project" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Application(ApplicationError::ProjectNotFound { .. }))
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad generation request.
    Validation,
    /// Combination not served by any pack.
    Compatibility,
    /// Broken or missing pack content.
    Pack,
    NotFound,
    /// Operation not allowed in the project's current state.
    State,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type ForgeResult<T> = Result<T, ForgeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProjectStatus;

    #[test]
    fn categories_flow_through_wrappers() {
        let err: ForgeError = DomainError::MissingRequiredField { field: "tool" }.into();
        assert_eq!(err.category(), ErrorCategory::Validation);

        let err: ForgeError = ApplicationError::ProjectNotFound { id: "x".into() }.into();
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert!(err.is_not_found());
    }

    #[test]
    fn not_ready_is_retryable() {
        let err: ForgeError = ApplicationError::NotReady {
            id: "x".into(),
            status: ProjectStatus::Generating,
        }
        .into();
        assert!(err.is_retryable());
        assert_eq!(err.category(), ErrorCategory::State);
    }

    #[test]
    fn every_error_has_suggestions() {
        let errors: Vec<ForgeError> = vec![
            ApplicationError::TemplateNotFound { pack: "p".into() }.into(),
            ApplicationError::StoreLockError.into(),
            DomainError::InvalidConfiguration("bad".into()).into(),
            ForgeError::Internal { message: "boom".into() },
        ];
        for err in errors {
            assert!(!err.suggestions().is_empty(), "{err}");
        }
    }
}
