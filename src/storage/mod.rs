//! Session persistence

mod backend;
mod store;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use store::{TokenStore, DEFAULT_STORAGE_KEY};
