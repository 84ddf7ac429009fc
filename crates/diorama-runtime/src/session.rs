//! Session: one live scene and everything needed to capture and restore it

use crate::artworks::ordered_resolver;
use crate::collection::fetch_collection_bindings;
use crate::config::DioramaConfig;
use crate::remote::scenario_url_from_query;
use crate::store::{BlobStore, ByteSink, DirectorySink, MemoryStore};
use diorama_catalog::Catalogs;
use diorama_core::{DioramaError, ObjectId, Result};
use diorama_images::{BindingReport, HttpFetcher, ImageBindingLoader, ImageFetcher, SharedScene, SurfaceTarget};
use diorama_reconcile::{ApplyEngine, ApplyReport, CaptureEngine, EnvironmentApplier};
use diorama_scene::SceneWorld;
use diorama_snapshot::{from_json_with_policy, to_json_pretty, Snapshot};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// A snapshot whose objects are in place, with its images still loading
#[derive(Debug)]
pub struct AppliedScenario {
    pub report: ApplyReport,
    pub images: JoinHandle<BindingReport>,
}

impl AppliedScenario {
    /// Wait for every image binding to settle
    pub async fn images_loaded(self) -> BindingReport {
        match self.images.await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!("Image loading task ended abnormally: {}", e);
                BindingReport::default()
            }
        }
    }
}

/// Owns the live scene, its catalogs, and the last applied snapshot.
///
/// Applies go through `&mut self`, so there is one writer of the current
/// snapshot. Image loading continues in the background after `apply` returns.
pub struct Session {
    scene: SharedScene,
    catalogs: Catalogs,
    config: DioramaConfig,
    environment: EnvironmentApplier,
    capture: CaptureEngine,
    apply: ApplyEngine,
    fetcher: Arc<dyn ImageFetcher>,
    loader: ImageBindingLoader,
    store: Arc<dyn BlobStore>,
    sink: Arc<dyn ByteSink>,
    current: Option<Snapshot>,
}

impl Session {
    /// Session over `scene` with an HTTP fetcher, an in-memory store and the
    /// downloads directory as sink
    pub fn new(scene: SceneWorld, catalogs: Catalogs, config: DioramaConfig) -> Self {
        let fetcher: Arc<dyn ImageFetcher> = Arc::new(
            HttpFetcher::new()
                .with_timeout(Duration::from_secs(config.timeout_secs))
                .with_proxy(config.proxy_base.clone()),
        );
        let environment = EnvironmentApplier::new(catalogs.materials.clone())
            .with_default(config.default_environment.clone());
        let capture = CaptureEngine::new(catalogs.materials.clone(), environment.clone())
            .with_app_version(config.app_version.clone())
            .with_scene_base_id(config.scene_base_id.clone());
        let apply = ApplyEngine::new(catalogs.clone(), environment.clone())
            .with_options(config.apply_options());
        let loader = ImageBindingLoader::new(fetcher.clone(), config.max_concurrent_downloads);

        Self {
            scene: Arc::new(Mutex::new(scene)),
            catalogs,
            config,
            environment,
            capture,
            apply,
            fetcher,
            loader,
            store: Arc::new(MemoryStore::new()),
            sink: Arc::new(DirectorySink::downloads()),
            current: None,
        }
    }

    /// Replace the fetcher used for images and remote snapshots. Clears the image cache.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn ImageFetcher>) -> Self {
        self.loader = ImageBindingLoader::new(fetcher.clone(), self.config.max_concurrent_downloads);
        self.fetcher = fetcher;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn BlobStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ByteSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The live scene, shared with in-flight image loads
    pub fn scene(&self) -> SharedScene {
        self.scene.clone()
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    pub fn config(&self) -> &DioramaConfig {
        &self.config
    }

    pub fn loader(&self) -> &ImageBindingLoader {
        &self.loader
    }

    /// The last snapshot applied, upgraded to the current schema
    pub fn current_snapshot(&self) -> Option<&Snapshot> {
        self.current.as_ref()
    }

    pub fn capture(&self, name: &str) -> Snapshot {
        let scene = self.scene.lock();
        self.capture.capture(&scene, name)
    }

    /// Make the scene match `snapshot` and start loading its images.
    ///
    /// Must be called from within a Tokio runtime. On error the scene is
    /// untouched and the current snapshot is unchanged.
    pub fn apply(&mut self, snapshot: Snapshot) -> Result<AppliedScenario> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| DioramaError::ConfigError(format!("no async runtime for image loading: {}", e)))?;

        let reconciled = {
            let mut scene = self.scene.lock();
            self.apply.apply(&mut scene, snapshot)?
        };

        let loader = self.loader.clone();
        let bindings = reconciled.report.bindings.clone();
        let target: Arc<dyn SurfaceTarget> = self.scene.clone();
        let images = runtime.spawn(async move { loader.apply_bindings(bindings, target).await });

        self.current = Some(reconciled.snapshot);
        Ok(AppliedScenario {
            report: reconciled.report,
            images,
        })
    }

    /// Parse and apply a snapshot document
    pub fn apply_json(&mut self, json: &str) -> Result<AppliedScenario> {
        let snapshot = from_json_with_policy(json, self.config.schema_policy)?;
        self.apply(snapshot)
    }

    /// Show a skybox from the material catalog directly
    pub fn set_environment(&self, name: &str, rotation: Option<f32>) -> Result<()> {
        let mut scene = self.scene.lock();
        self.environment.apply_named(&mut scene, name, rotation)
    }

    /// Capture the scene and store it under the configured current key
    pub fn save_current_to_store(&self, name: &str) -> Result<Snapshot> {
        let snapshot = self.capture(name);
        self.store
            .save(&self.config.current_key, &to_json_pretty(&snapshot)?)?;
        tracing::info!("Saved '{}' under '{}'", name, self.config.current_key);
        Ok(snapshot)
    }

    /// Apply the snapshot stored under the current key, if there is one
    pub fn apply_from_store(&mut self) -> Result<Option<AppliedScenario>> {
        let Some(json) = self.store.load(&self.config.current_key)? else {
            tracing::info!("Nothing stored under '{}'", self.config.current_key);
            return Ok(None);
        };
        self.apply_json(&json).map(Some)
    }

    /// Apply the configured default snapshot.
    ///
    /// Without a readable default snapshot this logs a warning and does nothing.
    pub fn reset_to_default(&mut self) -> Result<Option<AppliedScenario>> {
        let Some(path) = self.config.default_snapshot.clone() else {
            tracing::warn!("No default snapshot configured; reset is disabled");
            return Ok(None);
        };
        let json = match std::fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(
                    "Default snapshot {} unavailable ({}); reset is disabled",
                    path.display(),
                    e
                );
                return Ok(None);
            }
        };
        self.apply_json(&json).map(Some)
    }

    /// Capture the scene and offer it to the sink; returns the file name used
    pub fn download(&self, name: &str) -> Result<String> {
        let snapshot = self.capture(name);
        self.sink.offer(name, &to_json_pretty(&snapshot)?)
    }

    /// Fetch a snapshot document from `url` and apply it
    pub async fn load_remote(&mut self, url: &str) -> Result<AppliedScenario> {
        tracing::info!("Loading scenario from {}", url);
        let bytes = self.fetcher.fetch_bytes(url).await?;
        let json = String::from_utf8(bytes)
            .map_err(|e| DioramaError::ParseError(format!("scenario at {} is not UTF-8: {}", url, e)))?;
        self.apply_json(&json)
    }

    /// Apply the snapshot a page url points at through its `scenarioUrl` parameter
    pub async fn load_from_page(&mut self, page_url: &str) -> Result<Option<AppliedScenario>> {
        let Some(url) = scenario_url_from_query(page_url) else {
            tracing::warn!("No scenarioUrl in {}", page_url);
            return Ok(None);
        };
        self.load_remote(&url).await.map(Some)
    }

    /// Fetch the collection at `url` and show its images on `frames`, in order.
    ///
    /// The bindings are merged into the current snapshot (a fresh capture when
    /// nothing was applied yet), replacing earlier bindings of the same frame.
    pub async fn load_collection(&mut self, url: &str, frames: &[ObjectId]) -> Result<AppliedScenario> {
        let bindings =
            fetch_collection_bindings(self.fetcher.as_ref(), url, ordered_resolver(frames)).await?;

        let mut snapshot = match &self.current {
            Some(current) => current.clone(),
            None => self.capture("collection"),
        };
        for binding in bindings {
            match snapshot
                .artworks
                .iter_mut()
                .find(|a| a.object_id == binding.object_id)
            {
                Some(existing) => existing.image_url = binding.image_url,
                None => snapshot.artworks.push(binding),
            }
        }
        self.apply(snapshot)
    }

    /// True when a fresh capture has the same content as the current snapshot
    pub fn is_current_in_sync(&self) -> bool {
        match &self.current {
            Some(current) => self.capture(&current.name).fingerprint() == current.fingerprint(),
            None => false,
        }
    }
}
