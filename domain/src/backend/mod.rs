//! Backend result value objects
//!
//! Backends are the text-generation services agents talk to. The trait
//! itself lives in the application layer (`ports::backend`); this module
//! holds the data that crosses that port.

pub mod options;
pub mod result;

pub use options::BackendOptions;
pub use result::BackendResult;
