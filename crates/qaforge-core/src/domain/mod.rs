//! Core domain layer for qaforge.
//!
//! Pure logic: manifests, configuration, context derivation, conditional
//! predicates, the project state machine and the pack catalog. All I/O and
//! templating happen behind ports defined in the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or clock access (time is passed in)
//! - **Few crates**: std + thiserror + serde/serde_json + chrono/uuid for values
//! - **Rich domain model**: Behavior lives in entities, not services

pub mod casing;
pub mod catalog;
pub mod entities;
pub mod error;
pub mod value_objects;

pub use catalog::{FALLBACK_PACK, PACK_REGISTRY, PackDef, PackKey, PackSelection, select_pack};
pub use entities::{
    common::{FileMode, RelativePath},
    conditional::{Clause, ContextPath, Expectation, Predicate, resolve, value_matches},
    configuration::{Configuration, Integrations, ProjectSettings},
    context::{CONTEXT_KEYS, Context},
    manifest::{FileEntry, Manifest, Pack, PackId, PackVersion},
    project::{
        ArchiveSummary, FileKind, FileMetadata, GeneratedProject, ProjectId, ProjectStatus,
    },
};
pub use error::{DomainError, ErrorCategory};
pub use value_objects::{Language, TestRunner, Tool};
