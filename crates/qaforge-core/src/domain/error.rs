// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

use crate::domain::entities::project::ProjectStatus;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (records keep a copy, tests compare them)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors (400-level equivalent)
    // ========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Manifest for pack '{pack}' is invalid: {reason}")]
    ManifestInvalid { pack: String, reason: String },

    #[error("Invalid conditional on '{key}': {reason}")]
    InvalidConditional { key: String, reason: String },

    #[error("Duplicate output path: {path}")]
    DuplicatePath { path: String },

    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },

    // ========================================================================
    // Security
    // ========================================================================
    #[error("Path rejected ({reason}): {path}")]
    PathTraversalRejected { path: String, reason: &'static str },

    // ========================================================================
    // State machine
    // ========================================================================
    #[error("Illegal status transition: {from} -> {to}")]
    InvalidTransition { from: ProjectStatus, to: ProjectStatus },

    #[error("Project cannot complete: {reason}")]
    IncompleteProject { reason: String },
}

impl DomainError {
    /// Shorthand used by manifest parsing.
    pub(crate) fn manifest(pack: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ManifestInvalid {
            pack: pack.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand used by path sanitization. Null bytes are escaped so the
    /// message stays printable.
    pub(crate) fn traversal(path: &str, reason: &'static str) -> Self {
        Self::PathTraversalRejected {
            path: path.replace('\0', "\\0"),
            reason,
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidConfiguration(msg) => vec![
                "Check the generation request".into(),
                format!("Details: {msg}"),
            ],
            Self::ManifestInvalid { pack, .. } => vec![
                format!("Pack '{pack}' ships a broken manifest.json"),
                "Validate it with: qaforge packs".into(),
            ],
            Self::InvalidConditional { key, .. } => vec![
                format!("Conditional key '{key}' does not address a known context field"),
                "Known roots include: tool, language, buildTool, cicdTool, utilities".into(),
            ],
            Self::PathTraversalRejected { .. } => vec![
                "A pack produced a path outside the project directory".into(),
                "Check package names and manifest paths for '..' or absolute prefixes".into(),
            ],
            Self::InvalidTransition { .. } | Self::IncompleteProject { .. } => vec![
                "This is a bug in qaforge, please report it".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidConfiguration(_) | Self::MissingRequiredField { .. } => {
                ErrorCategory::Validation
            }
            Self::ManifestInvalid { .. }
            | Self::InvalidConditional { .. }
            | Self::DuplicatePath { .. }
            | Self::PathTraversalRejected { .. } => ErrorCategory::Pack,
            Self::InvalidTransition { .. } | Self::IncompleteProject { .. } => {
                ErrorCategory::Internal
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Pack,
    Internal,
}
