//! The inbound worksheet operation
//!
//! [`WorksheetService`] wires the pipeline: parse the request, synthesize a
//! content spec, clean pictures where the type asks for it, compose the page
//! and render it through the shared engine.

use crate::catalog::{AssetCatalog, FsAssetCatalog};
use crate::engine::Launcher;
use crate::layout::{AssetResolver, Document, LayoutComposer};
use crate::session::{GeneratedAsset, RenderSession};
use crate::synth::{ContentSpec, Registry, WorksheetRequest, WorksheetTypeId};
use crate::transform::{clean_pictures, BackgroundRemover, NoopBackgroundRemover};
use crate::{Error, RenderConfig, Result};
use futures::stream::{self, StreamExt};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

/// Most pages one batch request may ask for
pub const MAX_PAGES: u32 = 5;

/// Configuration for the whole pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub render: RenderConfig,
    /// Root of the static asset tree (`uploads/`, `images/`, `generated/`)
    pub public_dir: PathBuf,
    /// Base URL the browser fetches rooted asset paths from; `None` leaves
    /// them relative
    pub asset_base_url: Option<String>,
    /// Theme used when a request names none
    pub default_theme: String,
    /// Background-removal endpoint (feature `remote-bg`)
    pub bg_removal_url: Option<String>,
    /// Pages of one batch rendered at the same time
    pub max_concurrent_pages: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            public_dir: PathBuf::from("public"),
            asset_base_url: Some("http://localhost:3001/".to_string()),
            default_theme: "dinosaur".to_string(),
            bg_removal_url: None,
            max_concurrent_pages: num_cpus::get().clamp(1, 6),
        }
    }
}

impl ServiceConfig {
    /// Defaults overlaid with `KIDSHEET_*` / `API_BASE_URL` variables
    pub fn from_env() -> Result<Self> {
        Self::default().apply_env()
    }

    /// Load a JSON file; missing fields keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("Failed to read {}: {}", path.display(), e)))?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn apply_env(mut self) -> Result<Self> {
        if let Ok(dir) = std::env::var("KIDSHEET_PUBLIC_DIR") {
            self.public_dir = PathBuf::from(dir);
        }
        if let Ok(base) = std::env::var("API_BASE_URL") {
            self.asset_base_url = Some(base);
        }
        if let Ok(dir) = std::env::var("KIDSHEET_OUTPUT_DIR") {
            self.render.output_dir = PathBuf::from(dir);
        }
        if let Ok(raw) = std::env::var("KIDSHEET_RESTART_THRESHOLD") {
            self.render.restart_threshold = raw
                .parse()
                .map_err(|_| Error::ConfigError(format!("KIDSHEET_RESTART_THRESHOLD is not a number: {}", raw)))?;
        }
        if let Ok(url) = std::env::var("KIDSHEET_BG_REMOVAL_URL") {
            self.bg_removal_url = Some(url);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.render.restart_threshold == 0 {
            return Err(Error::ConfigError("restart_threshold must be at least 1".into()));
        }
        if self.max_concurrent_pages == 0 {
            return Err(Error::ConfigError("max_concurrent_pages must be at least 1".into()));
        }
        self.resolver()?;
        Ok(())
    }

    /// Asset resolver for the configured base URL
    pub fn resolver(&self) -> Result<AssetResolver> {
        match &self.asset_base_url {
            Some(base) => {
                let url = Url::parse(base)
                    .map_err(|e| Error::ConfigError(format!("Invalid asset base URL {}: {}", base, e)))?;
                Ok(AssetResolver::new(url))
            }
            None => Ok(AssetResolver::relative()),
        }
    }
}

/// Generates worksheets end to end
pub struct WorksheetService<L: Launcher> {
    config: ServiceConfig,
    registry: Registry,
    catalog: Arc<dyn AssetCatalog>,
    composer: LayoutComposer,
    remover: Arc<dyn BackgroundRemover>,
    session: RenderSession<L>,
}

#[cfg(feature = "cdp")]
impl WorksheetService<crate::engine::CdpLauncher> {
    /// Service rendering through headless Chrome
    pub fn with_chrome(config: ServiceConfig) -> Result<Self> {
        Self::new(config, crate::engine::CdpLauncher)
    }
}

impl<L: Launcher> WorksheetService<L> {
    pub fn new(config: ServiceConfig, launcher: L) -> Result<Self> {
        config.validate()?;
        let composer = LayoutComposer::new(config.resolver()?);
        let catalog: Arc<dyn AssetCatalog> = Arc::new(FsAssetCatalog::new(config.public_dir.clone()));
        let remover = remover_for(&config)?;
        let session = RenderSession::new(launcher, config.render.clone());

        Ok(Self {
            config,
            registry: Registry::standard(),
            catalog,
            composer,
            remover,
            session,
        })
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn AssetCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_remover(mut self, remover: Arc<dyn BackgroundRemover>) -> Self {
        self.remover = remover;
        self
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn session(&self) -> &RenderSession<L> {
        &self.session
    }

    /// Parse a type id and its loose JSON data into a request
    pub fn request(&self, kind: &str, data: Value) -> Result<WorksheetRequest> {
        let kind: WorksheetTypeId = kind.parse()?;
        let mut request = WorksheetRequest::from_data(kind, data)?;
        if request.theme.is_none() {
            request.theme = Some(self.config.default_theme.clone());
        }
        Ok(request)
    }

    /// Resolve a request into content. A seed makes the result reproducible.
    pub fn synthesize(&self, request: &WorksheetRequest, seed: Option<u64>) -> Result<ContentSpec> {
        let mut rng = seeded(seed);
        self.registry.synthesize(request, self.catalog.as_ref(), &mut rng)
    }

    /// Clean pictures where needed and compose the page
    pub async fn compose(&self, mut spec: ContentSpec) -> Document {
        clean_pictures(self.remover.as_ref(), &mut spec).await;
        self.composer.compose(&spec, &spec.theme.palette())
    }

    /// Render one worksheet and return its URL under the public prefix
    ///
    /// An unknown type fails before any rendering work starts.
    pub async fn generate_worksheet(&self, kind: &str, data: Value) -> Result<String> {
        self.generate_worksheet_seeded(kind, data, None).await
    }

    pub async fn generate_worksheet_seeded(&self, kind: &str, data: Value, seed: Option<u64>) -> Result<String> {
        let mut urls = self.generate_pages_seeded(kind, data, 1, seed).await?;
        urls.pop()
            .ok_or_else(|| Error::RenderError("no page was rendered".into()))
    }

    /// Render `pages` independent worksheets of one type, in page order
    pub async fn generate_pages(&self, kind: &str, data: Value, pages: u32) -> Result<Vec<String>> {
        self.generate_pages_seeded(kind, data, pages, None).await
    }

    pub async fn generate_pages_seeded(
        &self,
        kind: &str,
        data: Value,
        pages: u32,
        seed: Option<u64>,
    ) -> Result<Vec<String>> {
        if pages == 0 || pages > MAX_PAGES {
            return Err(Error::InvalidRequest(format!(
                "pages must be between 1 and {}, got {}",
                MAX_PAGES, pages
            )));
        }
        let request = self.request(kind, data)?;

        let mut rng = seeded(seed);
        let mut specs = Vec::with_capacity(pages as usize);
        for _ in 0..pages {
            specs.push(self.registry.synthesize(&request, self.catalog.as_ref(), &mut rng)?);
        }

        let prefix = request.kind.as_str();
        let results: Vec<Result<GeneratedAsset>> = stream::iter(specs)
            .map(|spec| async move {
                let doc = self.compose(spec).await;
                self.session.render(&doc, prefix).await
            })
            .buffered(self.config.max_concurrent_pages)
            .collect()
            .await;

        let mut assets = Vec::with_capacity(results.len());
        let mut failure = None;
        for result in results {
            match result {
                Ok(asset) => assets.push(asset),
                Err(e) => {
                    failure.get_or_insert(e);
                }
            }
        }
        if let Some(e) = failure {
            discard(&assets).await;
            return Err(e);
        }

        info!("Generated {} page(s) of {}", assets.len(), request.kind);
        Ok(assets.into_iter().map(|asset| asset.relative_url).collect())
    }

    /// Dispose the shared engine
    pub async fn shutdown(&self) {
        self.session.lifecycle().shutdown().await;
    }
}

/// Remove the pages a failed batch already wrote
async fn discard(assets: &[GeneratedAsset]) {
    for asset in assets {
        if let Err(e) = tokio::fs::remove_file(&asset.path).await {
            warn!("Failed to remove {} from a failed batch: {}", asset.path.display(), e);
        }
    }
}

fn seeded(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

#[cfg(feature = "remote-bg")]
fn remover_for(config: &ServiceConfig) -> Result<Arc<dyn BackgroundRemover>> {
    match &config.bg_removal_url {
        Some(raw) => {
            let endpoint = Url::parse(raw)
                .map_err(|e| Error::ConfigError(format!("Invalid background removal URL {}: {}", raw, e)))?;
            let remover = crate::transform::HttpBackgroundRemover::new(endpoint, config.public_dir.clone())?;
            Ok(Arc::new(remover))
        }
        None => Ok(Arc::new(NoopBackgroundRemover)),
    }
}

#[cfg(not(feature = "remote-bg"))]
fn remover_for(config: &ServiceConfig) -> Result<Arc<dyn BackgroundRemover>> {
    if config.bg_removal_url.is_some() {
        warn!("bg_removal_url is set but the remote-bg feature is disabled; pictures stay as they are");
    }
    Ok(Arc::new(NoopBackgroundRemover))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{NoopControl, NoopLauncher};
    use serde_json::json;

    fn service(control: &NoopControl, dir: &Path) -> WorksheetService<NoopLauncher> {
        let mut config = ServiceConfig {
            public_dir: dir.join("public"),
            asset_base_url: None,
            ..Default::default()
        };
        config.render.output_dir = dir.join("out");
        WorksheetService::new(config, NoopLauncher::new(control.clone())).unwrap()
    }

    #[tokio::test]
    async fn unknown_type_fails_before_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let control = NoopControl::new();
        let svc = service(&control, dir.path());

        let err = svc.generate_worksheet("spelling-bee", json!({})).await.unwrap_err();
        assert!(matches!(err, Error::UnknownWorksheetType(_)));
        assert_eq!(control.launches(), 0);
        assert_eq!(control.canvases_opened(), 0);
    }

    #[tokio::test]
    async fn generates_a_worksheet_url() {
        let dir = tempfile::tempdir().unwrap();
        let control = NoopControl::new();
        let svc = service(&control, dir.path());

        let url = svc.generate_worksheet("number-bonds", json!({ "theme": "ocean" })).await.unwrap();
        assert!(url.starts_with("/generated/number-bonds_"));
        let html = control.last_document().unwrap();
        assert_eq!(html.matches("class=\"bond\"").count(), 8);
    }

    #[tokio::test]
    async fn page_count_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let control = NoopControl::new();
        let svc = service(&control, dir.path());

        for pages in [0, 6] {
            let err = svc.generate_pages("maze", json!({}), pages).await.unwrap_err();
            assert!(matches!(err, Error::InvalidRequest(_)));
        }
        let urls = svc.generate_pages("maze", json!({}), 3).await.unwrap();
        assert_eq!(urls.len(), 3);
        assert!(urls.iter().all(|u| u.starts_with("/generated/maze_")));
        assert_eq!(control.launches(), 1);
    }

    #[tokio::test]
    async fn failed_batch_leaves_no_pages_behind() {
        let dir = tempfile::tempdir().unwrap();
        let control = NoopControl::new();
        let svc = service(&control, dir.path());
        control.fail_capture_at(2);

        let err = svc.generate_pages("maze", json!({}), 3).await.unwrap_err();
        assert!(matches!(err, Error::RenderError(_)));
        assert_eq!(control.canvases_opened(), 3);
        assert_eq!(control.open_canvases(), 0);
        let left = std::fs::read_dir(dir.path().join("out")).map(|d| d.count()).unwrap_or(0);
        assert_eq!(left, 0);
    }

    #[tokio::test]
    async fn seeded_synthesis_is_reproducible() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&NoopControl::new(), dir.path());
        let req = svc.request("count-shapes", json!({ "difficulty": "hard" })).unwrap();
        assert_eq!(req.theme.as_deref(), Some("dinosaur"));
        let a = svc.synthesize(&req, Some(9)).unwrap();
        let b = svc.synthesize(&req, Some(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn config_rejects_a_zero_threshold() {
        let mut config = ServiceConfig::default();
        config.render.restart_threshold = 0;
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn config_file_overrides_only_named_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kidsheet.json");
        std::fs::write(&path, r#"{ "default_theme": "space", "render": { "restart_threshold": 4 } }"#).unwrap();
        let config = ServiceConfig::from_file(&path).unwrap();
        assert_eq!(config.default_theme, "space");
        assert_eq!(config.render.restart_threshold, 4);
        assert_eq!(config.render.public_prefix, "/generated");
        assert_eq!(config.public_dir, PathBuf::from("public"));
    }
}
