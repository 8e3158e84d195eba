//! Infrastructure adapters for qaforge.
//!
//! This crate implements the ports defined in `qaforge-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod archiver;
pub mod bootstrap;
pub mod clock;
pub mod filesystem;
pub mod pack_source;
pub mod project_store;
pub mod renderer;

// Re-export commonly used adapters
pub use archiver::ZipArchiver;
pub use bootstrap::{Engine, EngineSettings, build_engine};
pub use clock::{ManualClock, SystemClock};
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use pack_source::{DirectoryPackSource, InMemoryPackSource};
pub use project_store::{InMemoryProjectStore, JsonFileProjectStore};
pub use renderer::HandlebarsRenderer;
