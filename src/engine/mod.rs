//! Rendering engine abstraction
//!
//! An [`Engine`] is one long-lived browser process; a [`Canvas`] is a page
//! opened against it for a single render. Backends are feature gated: the
//! Chrome DevTools backend lives behind `cdp`, the noop backend is always
//! available for tests and dry runs.
//!
//! Engine calls are synchronous. The session layer moves them onto the
//! blocking pool.

#[cfg(feature = "cdp")]
pub mod cdp;
pub mod noop;

#[cfg(feature = "cdp")]
pub use cdp::{CdpCanvas, CdpEngine, CdpLauncher};
pub use noop::{NoopCanvas, NoopControl, NoopEngine, NoopLauncher};

use crate::{RenderConfig, Result, Viewport};
use std::time::Duration;

/// A captured page raster
#[derive(Debug, Clone)]
pub struct Screenshot {
    /// Width in device pixels
    pub width: u32,
    /// Height in device pixels
    pub height: u32,
    /// PNG-encoded bytes
    pub png_data: Vec<u8>,
}

/// Starts engine instances
///
/// The lifecycle manager owns a launcher and calls it on cold start and on
/// every relaunch.
pub trait Launcher: Send + Sync + 'static {
    type Engine: Engine;

    fn launch(&self, config: &RenderConfig) -> Result<Self::Engine>;
}

/// A running rendering engine shared by concurrent renders
pub trait Engine: Send + Sync + 'static {
    type Canvas: Canvas;

    /// Cheap liveness check; an error means the connection is gone
    fn probe(&self) -> Result<()>;

    /// Open a fresh canvas with the given geometry
    fn open_canvas(&self, viewport: &Viewport) -> Result<Self::Canvas>;

    /// Shut the instance down once none of its canvases is in use. Callers
    /// treat errors as non-fatal.
    fn dispose(&self) -> Result<()>;
}

/// One page open against an engine
pub trait Canvas: Send + 'static {
    /// Replace the canvas content with a complete HTML document and wait
    /// for its subresources
    fn load_document(&mut self, html: &str) -> Result<()>;

    /// Block until web fonts report ready
    fn wait_for_fonts(&mut self, timeout: Duration) -> Result<()>;

    /// Capture the full canvas at the configured device scale
    fn capture_png(&mut self) -> Result<Screenshot>;

    fn close(self) -> Result<()>;
}
