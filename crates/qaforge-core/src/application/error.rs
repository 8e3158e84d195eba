//! Application layer errors.
//!
//! These errors represent failures in orchestration and in the ports, not
//! business rules. Business rule violations are `DomainError`.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ProjectStatus;
use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// No pack directory exists for the identifier.
    #[error("Template pack not found: {pack}")]
    TemplateNotFound { pack: String },

    /// The configuration maps to no pack and fallback is disabled.
    #[error("No template pack for {requested}")]
    UnsupportedCombination { requested: String },

    /// A template expression could not be expanded.
    #[error("Rendering {path} failed: {reason}")]
    RenderError { path: String, reason: String },

    /// Writing the archive failed.
    #[error("Archive error at {path}: {reason}")]
    ArchiveError { path: PathBuf, reason: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// Unknown or expired project.
    #[error("Project not found: {id}")]
    ProjectNotFound { id: String },

    /// Download requested before the project completed.
    #[error("Project {id} is not ready (status: {status})")]
    NotReady { id: String, status: ProjectStatus },

    /// Store access failed (lock poisoned).
    #[error("Project store lock poisoned")]
    StoreLockError,

    /// Persistent record store failed to read or write.
    #[error("Project store error: {reason}")]
    StoreError { reason: String },
}

impl ApplicationError {
    pub(crate) fn fs(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::FilesystemError {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::TemplateNotFound { pack } => vec![
                format!("No directory named '{pack}' under the packs root"),
                "List installed packs with: qaforge packs".into(),
                "Point engine.packs_dir at the shipped packs/ directory".into(),
            ],
            Self::UnsupportedCombination { requested } => vec![
                format!("No pack is registered for {requested}"),
                "Set engine.strict_pack_mapping = false to use the fallback pack".into(),
            ],
            Self::RenderError { path, .. } => vec![
                format!("Check the template expressions in {path}"),
                "Every variable must exist in the generation context".into(),
            ],
            Self::FilesystemError { path, .. } | Self::ArchiveError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that engine.work_dir is writable and has free space".into(),
            ],
            Self::ProjectNotFound { .. } => vec![
                "The project id is unknown or the project has expired".into(),
                "List live projects with: qaforge list".into(),
            ],
            Self::NotReady { id, .. } => vec![
                format!("Wait for generation to finish: qaforge status {id}"),
            ],
            Self::StoreLockError => vec![
                "The project store is locked".into(),
                "Try again in a moment".into(),
            ],
            Self::StoreError { .. } => vec!["Check the records/ directory under engine.work_dir".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TemplateNotFound { .. } => ErrorCategory::Pack,
            Self::UnsupportedCombination { .. } => ErrorCategory::Compatibility,
            Self::RenderError { .. } => ErrorCategory::Pack,
            Self::ProjectNotFound { .. } => ErrorCategory::NotFound,
            Self::NotReady { .. } => ErrorCategory::State,
            Self::FilesystemError { .. }
            | Self::ArchiveError { .. }
            | Self::StoreLockError
            | Self::StoreError { .. } => ErrorCategory::Internal,
        }
    }
}
