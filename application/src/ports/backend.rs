//! Backend port
//!
//! Defines the interface every text-generation service is wrapped in.

use async_trait::async_trait;
use moa_domain::{BackendOptions, BackendResult};

/// A capability over one text-generation service
///
/// Implementations (adapters) live in the infrastructure layer. `run` must
/// not fail: timeouts, missing executables and transport errors are all
/// reported as a [`BackendResult`] with `success = false`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Identifier recorded on every result and turn
    fn name(&self) -> &str;

    /// Send a prompt and wait for the full response.
    ///
    /// May block up to the backend's own timeout.
    async fn run(&self, prompt: &str, options: &BackendOptions) -> BackendResult;

    /// Whether the backend can be used right now
    async fn is_available(&self) -> bool;
}
