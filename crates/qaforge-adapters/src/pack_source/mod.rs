//! Pack source adapters.

mod directory;
mod memory;

pub use directory::{DirectoryPackSource, FILES_DIR, MANIFEST_FILE};
pub use memory::InMemoryPackSource;
