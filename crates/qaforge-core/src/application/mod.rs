//! Application layer for qaforge.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (LifecycleManager, GenerationPipeline, ...)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business rules itself. Those live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{
    Download, GenerationPipeline, LifecycleManager, LifecycleSettings, PackRegistry, PackSummary,
    ProjectAssembler, RenderService, RenderedFile, Stage, StageError,
};

pub use ports::{Archiver, Clock, Filesystem, PackSource, ProjectStore, TemplateRenderer};

pub use error::ApplicationError;
