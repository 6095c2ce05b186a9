//! File-backed Memory Bank storage

mod file_store;

pub use file_store::FileContextStore;
