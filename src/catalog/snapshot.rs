//! Immutable catalog snapshots and the store that swaps them on reload

use crate::catalog::loader::{load_dataset, Dataset};
use crate::catalog::row::CatalogKind;
use crate::processing::classifier::Category;
use crate::processing::embeddings::Embedder;
use chrono::{DateTime, Utc};
use log::{debug, info};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Where snapshot rows come from
#[derive(Debug, Clone)]
pub enum CatalogSource {
    Files { schemes: PathBuf, jobs: PathBuf },
    InMemory { schemes: Dataset, jobs: Dataset },
}

impl CatalogSource {
    fn read(&self) -> (Dataset, Dataset) {
        match self {
            CatalogSource::Files { schemes, jobs } => (
                load_dataset(schemes, CatalogKind::Scheme),
                load_dataset(jobs, CatalogKind::Job),
            ),
            CatalogSource::InMemory { schemes, jobs } => (schemes.clone(), jobs.clone()),
        }
    }
}

/// Everything a scoring call reads. Never mutated after construction.
#[derive(Debug)]
pub struct CatalogSnapshot {
    pub version: u64,
    pub schemes: Dataset,
    pub jobs: Dataset,
    /// One vector per scheme row, indexed by `CatalogRow::index`
    pub scheme_embeddings: Vec<Vec<f32>>,
    pub embedder: String,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotStats {
    pub version: u64,
    pub schemes: usize,
    pub jobs: usize,
    pub scheme_categories: BTreeMap<Category, usize>,
    pub job_categories: BTreeMap<Category, usize>,
    pub embedder: String,
    pub embedding_dimension: usize,
    pub loaded_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    pub fn stats(&self) -> SnapshotStats {
        let histogram = |dataset: &Dataset| {
            let mut counts: BTreeMap<Category, usize> = BTreeMap::new();
            for row in &dataset.rows {
                *counts.entry(row.category).or_insert(0) += 1;
            }
            counts
        };

        SnapshotStats {
            version: self.version,
            schemes: self.schemes.len(),
            jobs: self.jobs.len(),
            scheme_categories: histogram(&self.schemes),
            job_categories: histogram(&self.jobs),
            embedder: self.embedder.clone(),
            embedding_dimension: self.scheme_embeddings.first().map(Vec::len).unwrap_or(0),
            loaded_at: self.loaded_at,
        }
    }
}

/// Holds the active snapshot and publishes replacements atomically.
///
/// Readers clone the `Arc` and keep using it even if a reload lands
/// mid-request. Row embeddings are cached by text across reloads, so a
/// reload only embeds rows whose text changed.
pub struct CatalogStore {
    source: CatalogSource,
    embedder: Arc<dyn Embedder>,
    current: RwLock<Arc<CatalogSnapshot>>,
    embedding_cache: Mutex<HashMap<String, Vec<f32>>>,
    /// Next version to publish; held for the whole rebuild so reloads run one at a time
    next_version: Mutex<u64>,
}

impl CatalogStore {
    /// Build the first snapshot synchronously
    pub fn open(source: CatalogSource, embedder: Arc<dyn Embedder>) -> Self {
        let embedding_cache = Mutex::new(HashMap::new());
        let first = Self::build(&source, embedder.as_ref(), &embedding_cache, 1);

        Self {
            source,
            embedder,
            current: RwLock::new(Arc::new(first)),
            embedding_cache,
            next_version: Mutex::new(2),
        }
    }

    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.current.read().clone()
    }

    /// Rebuild from the source and swap it in; returns the new snapshot.
    ///
    /// Overlapping reloads queue up, so a higher version always holds data
    /// read no earlier than any lower one.
    pub fn reload(&self) -> Arc<CatalogSnapshot> {
        let mut next_version = self.next_version.lock();
        let version = *next_version;
        *next_version += 1;

        let fresh = Arc::new(Self::build(
            &self.source,
            self.embedder.as_ref(),
            &self.embedding_cache,
            version,
        ));

        *self.current.write() = fresh.clone();
        fresh
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    fn build(
        source: &CatalogSource,
        embedder: &dyn Embedder,
        cache: &Mutex<HashMap<String, Vec<f32>>>,
        version: u64,
    ) -> CatalogSnapshot {
        let start_time = Instant::now();
        let (schemes, jobs) = source.read();

        let texts: Vec<String> = schemes.rows.iter().map(|r| r.semantic_text()).collect();
        let scheme_embeddings = Self::embed_cached(embedder, cache, &texts);

        info!(
            "Catalog snapshot v{} ready: {} schemes, {} jobs ({:.2?})",
            version,
            schemes.len(),
            jobs.len(),
            start_time.elapsed()
        );

        CatalogSnapshot {
            version,
            schemes,
            jobs,
            scheme_embeddings,
            embedder: embedder.name().to_string(),
            loaded_at: Utc::now(),
        }
    }

    fn embed_cached(
        embedder: &dyn Embedder,
        cache: &Mutex<HashMap<String, Vec<f32>>>,
        texts: &[String],
    ) -> Vec<Vec<f32>> {
        let mut cache = cache.lock();

        let mut uncached: Vec<String> = texts
            .iter()
            .filter(|t| !cache.contains_key(*t))
            .cloned()
            .collect();
        uncached.sort();
        uncached.dedup();

        debug!(
            "Embedding {} new row texts ({} cached)",
            uncached.len(),
            texts.len().saturating_sub(uncached.len())
        );

        if !uncached.is_empty() {
            let vectors = embedder.embed(&uncached);
            for (text, vector) in uncached.into_iter().zip(vectors) {
                cache.insert(text, vector);
            }
        }

        let embeddings: Vec<Vec<f32>> = texts
            .iter()
            .map(|t| cache.get(t).cloned().unwrap_or_default())
            .collect();

        // drop vectors for rows that no longer exist
        cache.retain(|text, _| texts.contains(text));
        embeddings
    }
}
