//! Chrome DevTools Protocol backend (uses the `headless_chrome` crate)

use super::{Canvas, Engine, Launcher, Screenshot};
use crate::{Error, RenderConfig, Result, Viewport};
use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions};
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

/// Launches headless Chrome with the window sized to the page viewport
#[derive(Debug, Clone, Copy, Default)]
pub struct CdpLauncher;

impl Launcher for CdpLauncher {
    type Engine = CdpEngine;

    fn launch(&self, config: &RenderConfig) -> Result<CdpEngine> {
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(config.sandbox)
            .window_size(Some((config.viewport.width, config.viewport.height)))
            .idle_browser_timeout(Duration::from_secs(config.idle_timeout_secs))
            .build()
            .map_err(|e| Error::EngineUnavailable(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::EngineUnavailable(format!("Failed to launch browser: {}", e)))?;

        Ok(CdpEngine {
            browser,
            page_timeout: Duration::from_millis(config.page_timeout_ms),
        })
    }
}

/// A running headless Chrome instance
pub struct CdpEngine {
    browser: Browser,
    page_timeout: Duration,
}

impl Engine for CdpEngine {
    type Canvas = CdpCanvas;

    fn probe(&self) -> Result<()> {
        let version = self
            .browser
            .get_version()
            .map_err(|e| Error::EngineUnavailable(format!("Browser did not answer: {}", e)))?;
        debug!("Browser alive: {}", version.product);
        Ok(())
    }

    fn open_canvas(&self, viewport: &Viewport) -> Result<CdpCanvas> {
        let tab = self
            .browser
            .new_tab()
            .map_err(|e| Error::RenderError(format!("Failed to create tab: {}", e)))?;
        tab.set_default_timeout(self.page_timeout);

        Ok(CdpCanvas {
            tab,
            viewport: *viewport,
        })
    }

    fn dispose(&self) -> Result<()> {
        // The process itself exits when the last `Browser` handle drops.
        let tabs: Vec<Arc<Tab>> = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| Error::Other(format!("Tab list poisoned: {}", e)))?
            .clone();

        for tab in tabs {
            tab.close(false)
                .map_err(|e| Error::CdpError(format!("Failed to close tab: {}", e)))?;
        }
        Ok(())
    }
}

fn saturating_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// A Chrome tab holding one worksheet page
pub struct CdpCanvas {
    tab: Arc<Tab>,
    viewport: Viewport,
}

impl CdpCanvas {
    fn evaluate(&self, script: &str, await_promise: bool) -> Result<serde_json::Value> {
        let result = self.tab.evaluate(script, await_promise)?;
        Ok(result.value.unwrap_or(serde_json::Value::Null))
    }
}

impl Canvas for CdpCanvas {
    fn load_document(&mut self, html: &str) -> Result<()> {
        self.tab
            .navigate_to("about:blank")
            .map_err(|e| Error::LoadError(format!("Navigation failed: {}", e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| Error::LoadError(format!("Wait for navigation failed: {}", e)))?;

        let markup = serde_json::to_string(html)?;
        let script = format!(
            r#"new Promise(function(resolve) {{
                document.open();
                document.write({markup});
                document.close();
                if (document.readyState === 'complete') {{ resolve(true); return; }}
                window.addEventListener('load', function() {{ resolve(true); }}, {{ once: true }});
            }})"#
        );

        self.evaluate(&script, true)
            .map_err(|e| Error::LoadError(format!("Document write failed: {}", e)))?;
        Ok(())
    }

    fn wait_for_fonts(&mut self, timeout: Duration) -> Result<()> {
        let ms = saturating_millis(timeout);
        let script = format!(
            r#"Promise.race([
                document.fonts.ready.then(function() {{ return 'ready'; }}),
                new Promise(function(resolve) {{ setTimeout(function() {{ resolve('timeout'); }}, {ms}); }})
            ])"#
        );

        let state = self
            .evaluate(&script, true)
            .map_err(|e| Error::RenderError(format!("Font readiness check failed: {}", e)))?;

        match state.as_str() {
            Some("ready") => Ok(()),
            Some("timeout") => {
                warn!("Fonts not ready after {}ms", ms);
                Err(Error::Timeout(ms))
            }
            _ => Err(Error::RenderError(format!("Unexpected font state: {}", state))),
        }
    }

    fn capture_png(&mut self) -> Result<Screenshot> {
        let clip = Page::Viewport {
            x: 0.0,
            y: 0.0,
            width: self.viewport.width as f64,
            height: self.viewport.height as f64,
            scale: self.viewport.device_scale,
        };

        let png_data = self
            .tab
            .capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, Some(clip), true)
            .map_err(|e| Error::RenderError(format!("Screenshot failed: {}", e)))?;

        Ok(Screenshot {
            width: self.viewport.pixel_width(),
            height: self.viewport.pixel_height(),
            png_data,
        })
    }

    fn close(self) -> Result<()> {
        self.tab
            .close(true)
            .map_err(|e| Error::RenderError(format!("Failed to close tab: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_timeout_millis_saturate() {
        assert_eq!(saturating_millis(Duration::from_secs(10)), 10_000);
        assert_eq!(saturating_millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_cdp_canvas_renders_fixed_geometry() {
        // This test requires Chrome to be installed, so we skip it in CI
        if std::env::var("CI").is_ok() {
            return;
        }
        let config = RenderConfig::default();
        let engine = match CdpLauncher.launch(&config) {
            Ok(e) => e,
            Err(e) => {
                eprintln!("Skipping CDP canvas test because Chrome is not available: {}", e);
                return;
            }
        };
        engine.probe().unwrap();

        let mut canvas = engine.open_canvas(&config.viewport).unwrap();
        canvas
            .load_document("<!DOCTYPE html><html><body><h1>Hello</h1></body></html>")
            .unwrap();
        canvas.wait_for_fonts(Duration::from_secs(5)).unwrap();
        let shot = canvas.capture_png().unwrap();
        assert_eq!((shot.width, shot.height), (1020, 1320));
        assert_eq!(&shot.png_data[1..4], b"PNG");
        canvas.close().unwrap();
        engine.dispose().unwrap();
    }
}
