//! Key-value store adapters backing the session token.

mod file;
mod memory;

pub use file::{DEFAULT_STORE_FILE, FileKeyValueStore};
pub use memory::MemoryKeyValueStore;
