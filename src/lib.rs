//! Kidsheet
//!
//! Procedural worksheet synthesis and headless page rendering for printable
//! kids' activities. A request names a worksheet type and a few optional
//! fields; the pipeline resolves every random choice into a content spec,
//! composes a fixed-size HTML page, and rasterizes it through a shared
//! headless browser.
//!
//! # Features
//!
//! - **CDP Backend** (default): renders through headless Chrome
//! - **Noop Backend**: always available, for tests and dry runs
//! - **Remote background removal** (`remote-bg`): cleans pictures for the
//!   matching worksheets through an HTTP collaborator
//!
//! # Example
//!
//! ```no_run
//! use kidsheet::service::{ServiceConfig, WorksheetService};
//!
//! # async fn run() -> kidsheet::Result<()> {
//! let service = WorksheetService::with_chrome(ServiceConfig::from_env()?)?;
//! let url = service
//!     .generate_worksheet("number-bonds", serde_json::json!({ "theme": "ocean" }))
//!     .await?;
//! println!("Wrote {}", url);
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub mod error;
pub use error::{Error, Result};

pub mod catalog;
pub mod engine;
pub mod layout;
pub mod service;
pub mod session;
pub mod synth;
pub mod transform;

pub use catalog::{AssetCatalog, AssetRef, FsAssetCatalog, Theme, ThemePalette};
pub use layout::{Document, LayoutComposer};
pub use service::{ServiceConfig, WorksheetService};
pub use session::{BrowserLifecycle, EngineHandle, GeneratedAsset, RenderSession};
pub use synth::{ContentSpec, Difficulty, Registry, WorksheetRequest, WorksheetTypeId};

/// Configuration for the rendering side of the pipeline
///
/// The defaults produce the fixed 816×1056 page at 1.25× device scale that
/// every generated asset shares, and relaunch the browser every 15 pages.
///
/// # Examples
///
/// ```
/// let cfg = kidsheet::RenderConfig::default();
/// assert_eq!(cfg.viewport.pixel_width(), 1020);
/// assert_eq!(cfg.restart_threshold, 15);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Canvas geometry
    pub viewport: Viewport,
    /// Pages rendered by one browser instance before it is relaunched
    pub restart_threshold: u32,
    /// Upper bound on waiting for web fonts, in milliseconds
    pub font_timeout_ms: u64,
    /// Timeout for navigation and document loads, in milliseconds
    pub page_timeout_ms: u64,
    /// Whether to launch Chrome with its sandbox enabled
    pub sandbox: bool,
    /// Seconds of CDP silence before the browser connection is dropped
    pub idle_timeout_secs: u64,
    /// Directory generated PNGs are written to
    pub output_dir: PathBuf,
    /// URL path the output directory is served under
    pub public_prefix: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            restart_threshold: 15,
            font_timeout_ms: 10_000,
            page_timeout_ms: 30_000,
            sandbox: true,
            idle_timeout_secs: 300,
            output_dir: PathBuf::from("public/generated"),
            public_prefix: "/generated".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn font_timeout(&self) -> Duration {
        Duration::from_millis(self.font_timeout_ms)
    }
}

/// Canvas dimensions in CSS pixels plus the device scale factor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub device_scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: layout::PAGE_WIDTH,
            height: layout::PAGE_HEIGHT,
            device_scale: 1.25,
        }
    }
}

impl Viewport {
    /// Raster width in device pixels
    pub fn pixel_width(&self) -> u32 {
        (self.width as f64 * self.device_scale).round() as u32
    }

    /// Raster height in device pixels
    pub fn pixel_height(&self) -> u32 {
        (self.height as f64 * self.device_scale).round() as u32
    }
}
