//! qaforge core - template resolution and packaging engine.
//!
//! Turns a declarative test-project [`Configuration`](domain::Configuration)
//! into a rendered, archived project, following hexagonal (ports and
//! adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           qaforge-cli (CLI)             │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  LifecycleManager → GenerationPipeline  │
//! │  PackRegistry · RenderService · Assembler│
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Application Ports (Traits)       │
//! │ PackSource · TemplateRenderer · Archiver│
//! │ Filesystem · ProjectStore · Clock       │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     qaforge-adapters (Infrastructure)   │
//! └─────────────────────────────────────────┘
//!
//!             Domain Layer (pure logic)
//!   Manifest · Predicate · Context · GeneratedProject
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! # async fn demo(manager: std::sync::Arc<qaforge_core::application::LifecycleManager>)
//! # -> qaforge_core::error::ForgeResult<()> {
//! use qaforge_core::domain::Configuration;
//!
//! let config: Configuration = serde_json::from_str(
//!     r#"{"testingType":"Web","tool":"Selenium","language":"Java","testRunner":"JUnit"}"#,
//! ).unwrap();
//! let project = manager.generate(config).await?;
//! let status = manager.get(project.id())?.status();
//! # Ok(()) }
//! ```

pub mod application;
pub mod domain;
pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ApplicationError, LifecycleManager, LifecycleSettings, PackRegistry,
        ports::{Archiver, Clock, Filesystem, PackSource, ProjectStore, TemplateRenderer},
    };
    pub use crate::domain::{
        Configuration, Context, FileMetadata, GeneratedProject, PackId, ProjectId, ProjectStatus,
    };
    pub use crate::error::{ErrorCategory, ForgeError, ForgeResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
