//! Project record store adapters.

mod file;
mod memory;

pub use file::JsonFileProjectStore;
pub use memory::InMemoryProjectStore;
