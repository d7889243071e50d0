//! Browser lifecycle and per-page render sessions
//!
//! [`BrowserLifecycle`] owns the one shared engine instance and decides when
//! it must be relaunched. [`RenderSession`] drives a single page through
//! canvas open, load, font wait, capture and close, then writes the PNG.

mod lifecycle;
mod render;

pub use lifecycle::{BrowserLifecycle, EngineHandle, RelaunchReason};
pub use render::{GeneratedAsset, RenderSession};

use crate::{Error, Result};

/// Run a synchronous engine call on the blocking pool
pub(crate) async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Other(format!("Engine task failed: {}", e)))?
}
