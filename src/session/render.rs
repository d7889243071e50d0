use super::{blocking, BrowserLifecycle};
use crate::engine::{Canvas, Engine, Launcher, Screenshot};
use crate::layout::Document;
use crate::{RenderConfig, Result};
use log::{info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Process-wide suffix keeping same-millisecond outputs apart
static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// A written worksheet image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedAsset {
    /// URL path under the public prefix, e.g. `/generated/maze_1700000000000_3.png`
    pub relative_url: String,
    /// Where the file was written
    #[serde(skip)]
    pub path: PathBuf,
}

/// Renders composed documents to PNG files
pub struct RenderSession<L: Launcher> {
    lifecycle: Arc<BrowserLifecycle<L>>,
}

impl<L: Launcher> Clone for RenderSession<L> {
    fn clone(&self) -> Self {
        Self {
            lifecycle: self.lifecycle.clone(),
        }
    }
}

impl<L: Launcher> RenderSession<L> {
    pub fn new(launcher: L, config: RenderConfig) -> Self {
        Self {
            lifecycle: Arc::new(BrowserLifecycle::new(launcher, Arc::new(config))),
        }
    }

    pub fn lifecycle(&self) -> &BrowserLifecycle<L> {
        &self.lifecycle
    }

    pub fn config(&self) -> &RenderConfig {
        self.lifecycle.config()
    }

    /// Render `doc` and write it as `<prefix>_<utc-millis>_<seq>.png`
    ///
    /// The canvas is closed on every path. A failed write leaves no file
    /// behind.
    pub async fn render(&self, doc: &Document, prefix: &str) -> Result<GeneratedAsset> {
        let engine = self.lifecycle.ensure_ready().await?;
        let config = self.config();
        let viewport = config.viewport;
        let font_timeout = config.font_timeout();
        let html = doc.html.clone();

        let shot = blocking(move || {
            let mut canvas = engine.open_canvas(&viewport)?;
            let captured = draw(&mut canvas, &html, font_timeout);
            let closed = canvas.close();
            match (captured, closed) {
                (Ok(shot), Ok(())) => Ok(shot),
                (Ok(_), Err(e)) => Err(e),
                (Err(e), closed) => {
                    if let Err(close_err) = closed {
                        warn!("Failed to close canvas after error: {}", close_err);
                    }
                    Err(e)
                }
            }
        })
        .await?;

        let file_name = output_name(prefix, chrono::Utc::now().timestamp_millis());
        let path = config.output_dir.join(&file_name);
        write_output(&config.output_dir, &path, &shot).await?;

        let relative_url = format!("{}/{}", config.public_prefix.trim_end_matches('/'), file_name);
        info!("Rendered {} ({}x{})", relative_url, shot.width, shot.height);
        Ok(GeneratedAsset { relative_url, path })
    }
}

fn draw<C: Canvas>(canvas: &mut C, html: &str, font_timeout: std::time::Duration) -> Result<Screenshot> {
    canvas.load_document(html)?;
    canvas.wait_for_fonts(font_timeout)?;
    canvas.capture_png()
}

fn output_name(prefix: &str, millis: i64) -> String {
    let prefix: String = prefix
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    let prefix = if prefix.is_empty() { "worksheet".to_string() } else { prefix };
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}_{}_{}.png", prefix, millis, seq)
}

async fn write_output(dir: &Path, path: &Path, shot: &Screenshot) -> Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    if let Err(e) = tokio::fs::write(path, &shot.png_data).await {
        if let Err(rm) = tokio::fs::remove_file(path).await {
            if rm.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove partial output {}: {}", path.display(), rm);
            }
        }
        return Err(e.into());
    }
    Ok(())
}
