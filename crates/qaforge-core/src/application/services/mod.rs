//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports: the pack registry caches
//! packs, the render service and assembler turn a pack into a tree, the
//! pipeline sequences one generation and the lifecycle manager owns records.

pub mod assembler;
pub mod lifecycle;
pub mod pack_registry;
pub mod pipeline;
pub mod render;

pub use assembler::ProjectAssembler;
pub use lifecycle::{Download, LifecycleManager, LifecycleSettings};
pub use pack_registry::{PackRegistry, PackSummary};
pub use pipeline::{GenerationPipeline, PipelineOutput, Stage, StageError};
pub use render::{RenderService, RenderedFile};
