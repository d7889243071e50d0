//! In-process engine that renders nothing
//!
//! Used by `--dry-run` and by the lifecycle and session tests. A shared
//! [`NoopControl`] counts launches, disposals and canvases, and can inject
//! failures at each step.

use super::{Canvas, Engine, Launcher, Screenshot};
use crate::{Error, RenderConfig, Result, Viewport};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

#[derive(Debug, Default)]
struct NoopState {
    launches: usize,
    disposals: usize,
    canvases_opened: usize,
    canvases_closed: usize,
    /// Instance that currently answers probes
    alive: Option<usize>,
    /// Instances whose canvases no longer work
    disposed: Vec<usize>,
    fail_launch: bool,
    fail_dispose: bool,
    fail_load: bool,
    fail_capture: bool,
    /// 1-based capture attempt that fails
    fail_capture_at: Option<usize>,
    captures: usize,
    last_document: Option<String>,
}

/// Shared handle for observing and steering noop engines
#[derive(Debug, Clone, Default)]
pub struct NoopControl {
    state: Arc<Mutex<NoopState>>,
}

impl NoopControl {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, NoopState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn launches(&self) -> usize {
        self.state().launches
    }

    pub fn disposals(&self) -> usize {
        self.state().disposals
    }

    pub fn canvases_opened(&self) -> usize {
        self.state().canvases_opened
    }

    /// Canvases opened and not yet closed
    pub fn open_canvases(&self) -> usize {
        let s = self.state();
        s.canvases_opened - s.canvases_closed
    }

    pub fn last_document(&self) -> Option<String> {
        self.state().last_document.clone()
    }

    /// Make the running instance stop answering probes
    pub fn kill(&self) {
        self.state().alive = None;
    }

    pub fn fail_launch(&self, fail: bool) {
        self.state().fail_launch = fail;
    }

    pub fn fail_dispose(&self, fail: bool) {
        self.state().fail_dispose = fail;
    }

    pub fn fail_load(&self, fail: bool) {
        self.state().fail_load = fail;
    }

    pub fn fail_capture(&self, fail: bool) {
        self.state().fail_capture = fail;
    }

    /// Fail only the `n`th capture attempt, counting from 1
    pub fn fail_capture_at(&self, n: usize) {
        self.state().fail_capture_at = Some(n);
    }
}

/// Launcher for [`NoopEngine`]s sharing one control
#[derive(Debug, Clone, Default)]
pub struct NoopLauncher {
    control: NoopControl,
}

impl NoopLauncher {
    pub fn new(control: NoopControl) -> Self {
        Self { control }
    }

    pub fn control(&self) -> &NoopControl {
        &self.control
    }
}

impl Launcher for NoopLauncher {
    type Engine = NoopEngine;

    fn launch(&self, _config: &RenderConfig) -> Result<NoopEngine> {
        let mut s = self.control.state();
        if s.fail_launch {
            return Err(Error::EngineUnavailable("noop launch refused".into()));
        }
        s.launches += 1;
        s.alive = Some(s.launches);
        Ok(NoopEngine {
            id: s.launches,
            control: self.control.clone(),
        })
    }
}

#[derive(Debug)]
pub struct NoopEngine {
    id: usize,
    control: NoopControl,
}

impl NoopEngine {
    /// Launch ordinal of this instance, starting at 1
    pub fn id(&self) -> usize {
        self.id
    }
}

impl Engine for NoopEngine {
    type Canvas = NoopCanvas;

    fn probe(&self) -> Result<()> {
        match self.control.state().alive {
            Some(id) if id == self.id => Ok(()),
            _ => Err(Error::EngineUnavailable(format!("noop instance {} is gone", self.id))),
        }
    }

    fn open_canvas(&self, viewport: &Viewport) -> Result<NoopCanvas> {
        self.control.state().canvases_opened += 1;
        Ok(NoopCanvas {
            engine: self.id,
            viewport: *viewport,
            control: self.control.clone(),
            loaded: false,
        })
    }

    fn dispose(&self) -> Result<()> {
        let mut s = self.control.state();
        s.disposals += 1;
        s.disposed.push(self.id);
        if s.alive == Some(self.id) {
            s.alive = None;
        }
        if s.fail_dispose {
            return Err(Error::Other(format!("noop instance {} refused to exit", self.id)));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct NoopCanvas {
    engine: usize,
    viewport: Viewport,
    control: NoopControl,
    loaded: bool,
}

impl Canvas for NoopCanvas {
    fn load_document(&mut self, html: &str) -> Result<()> {
        let mut s = self.control.state();
        if s.fail_load {
            return Err(Error::LoadError("noop load refused".into()));
        }
        s.last_document = Some(html.to_string());
        self.loaded = true;
        Ok(())
    }

    fn wait_for_fonts(&mut self, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    fn capture_png(&mut self) -> Result<Screenshot> {
        let mut s = self.control.state();
        s.captures += 1;
        if s.fail_capture_at == Some(s.captures) {
            return Err(Error::RenderError(format!("noop capture {} refused", s.captures)));
        }
        if s.disposed.contains(&self.engine) {
            return Err(Error::RenderError(format!("noop instance {} was disposed", self.engine)));
        }
        if s.fail_capture {
            return Err(Error::RenderError("noop capture refused".into()));
        }
        drop(s);
        if !self.loaded {
            return Err(Error::RenderError("nothing loaded".into()));
        }
        Ok(Screenshot {
            width: self.viewport.pixel_width(),
            height: self.viewport.pixel_height(),
            png_data: PNG_SIGNATURE.to_vec(),
        })
    }

    fn close(self) -> Result<()> {
        self.control.state().canvases_closed += 1;
        Ok(())
    }
}
