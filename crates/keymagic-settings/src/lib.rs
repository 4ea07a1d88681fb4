//! Settings store adapters for keymagic.
//!
//! [`MemoryStore`] keeps values for the life of the process and is what
//! tests use. [`FileStore`] persists values as one JSON object on disk and
//! survives restarts.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;
