//! Backend adapters
//!
//! [`ProcessBackend`] implements the [`Backend`](moa_application::Backend)
//! port over any command-line AI tool; [`BackendRegistry`] resolves them by
//! name.

mod process;
mod registry;

pub use process::{DEFAULT_TIMEOUT_SECS, ProcessBackend, ProcessBackendError};
pub use registry::{BackendRegistry, RegistryError, builtin_presets};
