use super::blocking;
use crate::engine::{Engine, Launcher};
use crate::{Error, RenderConfig, Result};
use log::{debug, info, warn};
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Why the engine is being (re)launched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelaunchReason {
    ColdStart,
    LostConnection,
    Threshold,
}

impl fmt::Display for RelaunchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RelaunchReason::ColdStart => "cold start",
            RelaunchReason::LostConnection => "lost connection",
            RelaunchReason::Threshold => "restart threshold reached",
        })
    }
}

/// A launched engine shared by the renders counted against it
///
/// Once replaced, the instance is disposed when its last holder drops, so
/// renders already running on it finish first.
#[derive(Debug)]
pub struct EngineHandle<E: Engine> {
    engine: E,
    retired: AtomicBool,
}

impl<E: Engine> EngineHandle<E> {
    fn new(engine: E) -> Self {
        Self {
            engine,
            retired: AtomicBool::new(false),
        }
    }

    /// Whether a newer instance has replaced this one
    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::Acquire)
    }
}

impl<E: Engine> Deref for EngineHandle<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.engine
    }
}

impl<E: Engine> Drop for EngineHandle<E> {
    fn drop(&mut self) {
        if !self.is_retired() {
            return;
        }
        if let Err(e) = self.engine.dispose() {
            warn!("Ignoring engine disposal failure: {}", e);
        }
    }
}

struct LifecycleState<E: Engine> {
    engine: Option<Arc<EngineHandle<E>>>,
    pages_since_launch: u32,
}

/// Owns the shared engine instance and its render counter
///
/// `ensure_ready` is single-flight: concurrent callers queue on one lock, so
/// a cold start or a threshold relaunch happens exactly once. A replaced
/// instance outlives the relaunch until every render holding it is done.
pub struct BrowserLifecycle<L: Launcher> {
    launcher: Arc<L>,
    config: Arc<RenderConfig>,
    state: Mutex<LifecycleState<L::Engine>>,
}

impl<L: Launcher> BrowserLifecycle<L> {
    pub fn new(launcher: L, config: Arc<RenderConfig>) -> Self {
        Self {
            launcher: Arc::new(launcher),
            config,
            state: Mutex::new(LifecycleState {
                engine: None,
                pages_since_launch: 0,
            }),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Pages counted against the current instance, including the one the
    /// latest `ensure_ready` call was made for
    pub async fn pages_since_launch(&self) -> u32 {
        self.state.lock().await.pages_since_launch
    }

    /// Return a live engine, launching or relaunching as needed, and count
    /// the render about to happen against it.
    ///
    /// Launch failures surface as [`Error::EngineUnavailable`]. Disposal
    /// failures of a replaced instance are logged and ignored.
    pub async fn ensure_ready(&self) -> Result<Arc<EngineHandle<L::Engine>>> {
        let mut state = self.state.lock().await;

        let reason = match state.engine.clone() {
            None => Some(RelaunchReason::ColdStart),
            Some(engine) => match blocking(move || engine.probe()).await {
                Err(e) => {
                    warn!("Engine probe failed: {}", e);
                    Some(RelaunchReason::LostConnection)
                }
                Ok(()) if state.pages_since_launch >= self.config.restart_threshold => Some(RelaunchReason::Threshold),
                Ok(()) => None,
            },
        };

        if let Some(reason) = reason {
            if let Some(old) = state.engine.take() {
                retire(old).await;
            }
            state.pages_since_launch = 0;

            info!("Launching rendering engine ({})", reason);
            let launcher = self.launcher.clone();
            let config = self.config.clone();
            let engine = blocking(move || launcher.launch(&config))
                .await
                .map_err(|e| match e {
                    Error::EngineUnavailable(_) => e,
                    other => Error::EngineUnavailable(other.to_string()),
                })?;
            state.engine = Some(Arc::new(EngineHandle::new(engine)));
        }

        state.pages_since_launch += 1;
        debug!(
            "Engine ready, page {} of {}",
            state.pages_since_launch, self.config.restart_threshold
        );

        state
            .engine
            .clone()
            .ok_or_else(|| Error::EngineUnavailable("engine missing after launch".into()))
    }

    /// Dispose the current instance, if any
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        state.pages_since_launch = 0;
        if let Some(engine) = state.engine.take() {
            info!("Shutting down rendering engine");
            retire(engine).await;
        }
    }
}

/// Mark `old` for disposal and release the lifecycle's hold on it
///
/// Disposal runs now when nothing else holds the instance, otherwise when
/// the last in-flight render drops its handle.
async fn retire<E: Engine>(old: Arc<EngineHandle<E>>) {
    old.retired.store(true, Ordering::Release);
    match Arc::try_unwrap(old) {
        Ok(handle) => {
            let _ = blocking(move || {
                drop(handle);
                Ok(())
            })
            .await;
        }
        Err(shared) => {
            debug!(
                "Deferring engine disposal until {} in-flight render(s) finish",
                Arc::strong_count(&shared) - 1
            );
            tokio::task::spawn_blocking(move || drop(shared));
        }
    }
}
