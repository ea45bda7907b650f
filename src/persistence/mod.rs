//! Persistence layer modules.

pub mod blob_store;
pub mod db;
pub mod local_mirror;
pub mod schema;

pub use blob_store::{BlobStore, FileBlobStore, MemoryBlobStore, SqliteBlobStore};
pub use local_mirror::{LocalMirror, DEFAULT_STORAGE_KEY};
