//! Bounded, cached image binding

use crate::fetch::{decode_image, ImageFetcher};
use crate::target::SurfaceTarget;
use dashmap::DashMap;
use diorama_core::{DioramaError, ObjectId, Result};
use diorama_scene::{ImageOverride, SurfaceImage};
use diorama_snapshot::ImageBindingRecord;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{OnceCell, Semaphore};
use tokio::task::JoinSet;

/// In-flight downloads allowed when nothing else is configured
pub const DEFAULT_MAX_CONCURRENT: usize = 4;

type ImageCell = Arc<OnceCell<Arc<SurfaceImage>>>;

/// A binding that could not be applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingFailure {
    pub object_id: ObjectId,
    pub url: String,
    pub reason: String,
}

/// Outcome of one loader pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingReport {
    /// Objects that received their image, in completion order
    pub applied: Vec<ObjectId>,
    /// Downloads performed by this pass
    pub fetched: usize,
    /// Bindings served from the cache without waiting
    pub cache_hits: usize,
    pub failed: Vec<BindingFailure>,
}

enum Outcome {
    Applied { object_id: ObjectId, fetched: bool },
    Failed(BindingFailure),
}

/// Fetches binding images with at most N downloads in flight and attaches
/// them as per-object overrides.
///
/// Cloning is cheap; clones share the permit pool and the url cache.
#[derive(Clone)]
pub struct ImageBindingLoader {
    fetcher: Arc<dyn ImageFetcher>,
    permits: Arc<Semaphore>,
    max_concurrent: usize,
    /// url -> decoded image; concurrent misses on one url share a single fetch
    cache: Arc<DashMap<String, ImageCell>>,
}

impl ImageBindingLoader {
    pub fn new(fetcher: Arc<dyn ImageFetcher>, max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            fetcher,
            permits: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            cache: Arc::new(DashMap::new()),
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Drop every cached image, forcing the next binding of each url to download
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Number of urls with a decoded image in the cache
    pub fn cached_count(&self) -> usize {
        self.cache.iter().filter(|entry| entry.value().initialized()).count()
    }

    fn cached(&self, url: &str) -> Option<Arc<SurfaceImage>> {
        self.cache.get(url).and_then(|cell| cell.get().cloned())
    }

    /// Apply every binding. Failures are logged and reported, never retried.
    ///
    /// Cache hits are attached before this function first yields; misses are
    /// fetched concurrently and attached as each one completes.
    pub async fn apply_bindings(
        &self,
        bindings: Vec<ImageBindingRecord>,
        target: Arc<dyn SurfaceTarget>,
    ) -> BindingReport {
        let mut report = BindingReport::default();
        let mut tasks = JoinSet::new();

        for binding in bindings {
            if let Some(image) = self.cached(&binding.image_url) {
                report.cache_hits += 1;
                match attach(target.as_ref(), &binding, image) {
                    Ok(()) => report.applied.push(binding.object_id),
                    Err(failure) => report.failed.push(failure),
                }
                continue;
            }

            let loader = self.clone();
            let target = target.clone();
            tasks.spawn(async move {
                let (image, fetched) = match loader.load(&binding.image_url).await {
                    Ok(loaded) => loaded,
                    Err(e) => return Outcome::Failed(failure(&binding, e.to_string())),
                };
                match attach(target.as_ref(), &binding, image) {
                    Ok(()) => Outcome::Applied {
                        object_id: binding.object_id,
                        fetched,
                    },
                    Err(failure) => Outcome::Failed(failure),
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Outcome::Applied { object_id, fetched }) => {
                    if fetched {
                        report.fetched += 1;
                    }
                    report.applied.push(object_id);
                }
                Ok(Outcome::Failed(failure)) => report.failed.push(failure),
                Err(e) => tracing::warn!("Image binding task failed: {}", e),
            }
        }

        tracing::info!(
            "Image bindings: {} applied ({} downloaded, {} cached), {} failed",
            report.applied.len(),
            report.fetched,
            report.cache_hits,
            report.failed.len()
        );
        report
    }

    /// Get the decoded image for a url, downloading it under a permit on a miss.
    /// Returns whether this call performed the download.
    async fn load(&self, url: &str) -> Result<(Arc<SurfaceImage>, bool)> {
        let cell: ImageCell = self.cache.entry(url.to_string()).or_default().clone();
        let fetched = AtomicBool::new(false);

        let fetcher = self.fetcher.clone();
        let permits = self.permits.clone();
        let fetched_flag = &fetched;
        let image = cell
            .get_or_try_init(move || async move {
                let _permit = permits.acquire().await.map_err(|e| DioramaError::FetchError {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;
                fetched_flag.store(true, Ordering::Relaxed);
                tracing::debug!("Downloading {}", url);

                let bytes = fetcher.fetch_bytes(url).await?;
                let image = tokio::task::spawn_blocking(move || decode_image(&bytes))
                    .await
                    .map_err(|e| DioramaError::DecodeError(e.to_string()))??;
                Ok::<_, DioramaError>(Arc::new(image))
            })
            .await?
            .clone();

        Ok((image, fetched.load(Ordering::Relaxed)))
    }
}

fn failure(binding: &ImageBindingRecord, reason: String) -> BindingFailure {
    tracing::warn!(
        "Could not bind {} to '{}': {}",
        binding.image_url,
        binding.object_id,
        reason
    );
    BindingFailure {
        object_id: binding.object_id.clone(),
        url: binding.image_url.clone(),
        reason,
    }
}

fn attach(
    target: &dyn SurfaceTarget,
    binding: &ImageBindingRecord,
    image: Arc<SurfaceImage>,
) -> std::result::Result<(), BindingFailure> {
    target
        .attach(
            binding.object_id.as_str(),
            ImageOverride {
                url: binding.image_url.clone(),
                image,
            },
        )
        .map_err(|e| failure(binding, e.to_string()))
}
