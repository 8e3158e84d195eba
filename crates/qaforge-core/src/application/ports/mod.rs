//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `qaforge-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `PackSource`: Pack manifests and file bytes
//!   - `TemplateRenderer`: Template expansion
//!   - `Filesystem`: Staging tree operations
//!   - `Archiver`: Packaging
//!   - `ProjectStore`: Project records
//!   - `Clock`: Current time
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - `LifecycleManager` is the single entry point (used by the CLI)

pub mod output;

pub use output::{Archiver, Clock, Filesystem, PackSource, ProjectStore, TemplateRenderer};
