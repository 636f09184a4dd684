//! Index lifecycle orchestration
//!
//! The indexer owns the catalog and the single shared reader handle.
//! Rebuilds write fresh generations off to the side; publication is a
//! HEAD write plus an atomic swap of the reader handle, so queries
//! never observe a half-built index.
//!
//! # Lifecycle
//!
//! ```text
//!            builder().build()
//!                  │
//!                  ▼
//!            [NOT_OPEN] ──index()──► [NOT_OPEN]   (generation built, unpublished)
//!              │    ▲
//!   open()     │    │ close()
//!   open_and_swap() │
//!              ▼    │
//!            [OPEN] ──index()──► [OPEN]           (build concurrent with queries)
//!              │
//!              │ open_and_swap(new) ──► [OPEN]    (reader swapped, old one dropped)
//!              │
//!              └─ close() ──► [NOT_OPEN] + stale generations reclaimed
//! ```
//!
//! # Locking
//!
//! One reader-writer lock guards the reader slot. Queries take it
//! shared just long enough to clone the handle; open/swap/close take it
//! exclusive. `index` takes no lock at all: it only touches a freshly
//! named directory nobody else can see, which is what lets a
//! long-running rebuild proceed under sustained query traffic. A query
//! that captured the handle before a swap finishes against the
//! generation it captured; the swapped-out generation is released once
//! the last such query drops its clone.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::catalog;
use crate::error::{CatalogError, FindexError, Result};
use crate::filter::location_pipeline;
use crate::fts::{GenerationBuilder, GenerationReader, SearchRequest, SearchResults};
use crate::walker::{chain, walk, Flow, VisitFn};

/// Options for traversing one configured directory location
#[derive(Debug, Clone, Default)]
pub struct LocationOptions {
    /// Named filters applied to every visited entry, in order
    pub filters: Vec<String>,

    /// Gitignore-style patterns; nested lists of strings are allowed
    pub ignores: Vec<toml::Value>,
}

/// Manages file path index generations with atomic reindex swapping
#[derive(Debug)]
pub struct Indexer {
    locations: HashMap<PathBuf, LocationOptions>,
    base_path: PathBuf,
    reader: RwLock<Option<Arc<GenerationReader>>>,
}

impl Indexer {
    /// Start building an indexer for the given catalog base path
    pub fn builder(base_path: impl Into<PathBuf>) -> IndexerBuilder {
        IndexerBuilder {
            base_path: base_path.into(),
            locations: HashMap::new(),
        }
    }

    /// Build a fresh generation from every configured location
    ///
    /// The new generation is sealed and its name returned, but neither
    /// HEAD nor the shared reader is touched; pair with
    /// [`open_and_swap`](Self::open_and_swap) to publish it. Deliberately
    /// lock-free, so rebuilds run concurrently with queries and with
    /// each other. A failed build leaves its partial directory behind;
    /// the next [`close`](Self::close) reclaims it.
    pub fn index(&self) -> Result<String> {
        let name = catalog::new_generation_name();
        let generation_dir = self.base_path.join(&name);
        debug!(name, "building new index generation");

        let mut builder = GenerationBuilder::create(&generation_dir)?;
        for (root, options) in &self.locations {
            let filters = location_pipeline(root, options)?;
            let feed: VisitFn = Box::new(|path, _info, flow| {
                if !matches!(flow, Flow::Continue) {
                    return flow;
                }
                let path = path.to_string_lossy();
                match builder.index(&path, &path) {
                    Ok(()) => Flow::Continue,
                    Err(e) => Flow::Failed(e),
                }
            });

            // the feeding function goes last so only surviving entries
            // become documents
            let mut pipeline = chain(vec![filters, feed]);
            walk(root, &mut pipeline)?;
        }

        let docs = builder.doc_count();
        builder.close()?;
        info!(name, docs, "sealed new index generation");
        Ok(name)
    }

    /// Publish the named generation and swap it into the shared reader
    ///
    /// No-op when the reader is already bound to that name; in that
    /// case HEAD is left untouched, preserving its modification time.
    pub fn open_and_swap(&self, name: &str) -> Result<()> {
        let mut slot = self.reader.write();
        self.install(&mut slot, name, true)
    }

    /// Open the generation currently named by HEAD
    pub fn open(&self) -> Result<()> {
        let mut slot = self.reader.write();
        let name = catalog::read_head(&self.base_path)?;
        self.install(&mut slot, &name, false)
    }

    // Shared install path for open and open_and_swap. Caller holds the
    // exclusive lock; the previous handle is dropped before the lock is
    // released, so no new query can capture it afterwards.
    fn install(
        &self,
        slot: &mut Option<Arc<GenerationReader>>,
        name: &str,
        write_head: bool,
    ) -> Result<()> {
        if let Some(current) = slot.as_ref() {
            if current.name() == name {
                return Ok(());
            }
        }

        if write_head {
            catalog::write_head(&self.base_path, name)?;
        }

        let generation_dir = self.base_path.join(name);
        let mut reader = GenerationReader::open(&generation_dir)?;
        reader.set_name(name);

        let previous = slot.replace(Arc::new(reader));
        drop(previous);
        info!(name, "index generation opened");
        Ok(())
    }

    /// Search file paths with a ranked multi-clause query over the term
    pub fn search(&self, term: &str) -> Result<SearchResults> {
        let reader = self.shared_reader()?;
        let request = reader.term_request(term)?;
        reader.search(&request)
    }

    /// Execute an arbitrary pre-built search request
    pub fn search_with(&self, request: &SearchRequest) -> Result<SearchResults> {
        self.shared_reader()?.search(request)
    }

    /// Number of documents in the published generation
    pub fn doc_count(&self) -> Result<u64> {
        Ok(self.shared_reader()?.doc_count())
    }

    /// Name of the published generation
    pub fn index_name(&self) -> Result<String> {
        Ok(self.shared_reader()?.name().to_string())
    }

    /// When the published generation was last swapped in
    ///
    /// Derived from the HEAD file's modification time, which every
    /// publication rewrites.
    pub fn last_indexed(&self) -> Result<DateTime<Local>> {
        let _slot = self.reader.read();
        let head = catalog::head_path(&self.base_path);
        let meta = match fs::metadata(&head) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CatalogError::HeadDoesNotExist.into())
            }
            Err(e) => return Err(CatalogError::Read { path: head, source: e }.into()),
        };
        let modified = meta
            .modified()
            .map_err(|e| CatalogError::Read { path: head, source: e })?;
        Ok(modified.into())
    }

    /// Release the reader and reclaim all superseded generations
    ///
    /// Succeeds silently when nothing is open. The indexer transitions
    /// to the closed state even when reclamation fails.
    pub fn close(&self) -> Result<()> {
        let mut slot = self.reader.write();
        let Some(current) = slot.take() else {
            return Ok(());
        };
        let name = current.name().to_string();
        drop(current);
        debug!(name, "index closed, reclaiming stale generations");
        catalog::remove_generations_except(&self.base_path, &name)?;
        Ok(())
    }

    // Clone the shared handle under the read lock and release the lock
    // before any query work happens on it.
    fn shared_reader(&self) -> Result<Arc<GenerationReader>> {
        self.reader.read().clone().ok_or(FindexError::NotOpened)
    }

    /// Configured locations and their traversal options
    pub fn locations(&self) -> &HashMap<PathBuf, LocationOptions> {
        &self.locations
    }

    /// Catalog base path
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

/// Builder for [`Indexer`]
pub struct IndexerBuilder {
    base_path: PathBuf,
    locations: HashMap<PathBuf, LocationOptions>,
}

impl IndexerBuilder {
    /// Add a directory location with traversal options
    pub fn location(mut self, path: impl Into<PathBuf>, options: LocationOptions) -> Self {
        self.locations.insert(path.into(), options);
        self
    }

    pub fn build(self) -> Result<Indexer> {
        if self.base_path.as_os_str().is_empty() {
            return Err(FindexError::EmptyBasePath);
        }
        Ok(Indexer {
            locations: self.locations,
            base_path: self.base_path,
            reader: RwLock::new(None),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_rejects_empty_base_path() {
        let err = Indexer::builder("").build().unwrap_err();
        assert!(matches!(err, FindexError::EmptyBasePath));
    }

    #[test]
    fn test_builder_collects_locations() {
        let indexer = Indexer::builder("/tmp/indexes")
            .location("/home/a", LocationOptions::default())
            .location(
                "/home/b",
                LocationOptions {
                    filters: vec!["dir".to_string()],
                    ignores: Vec::new(),
                },
            )
            .build()
            .unwrap();

        assert_eq!(indexer.locations().len(), 2);
        assert_eq!(indexer.base_path(), Path::new("/tmp/indexes"));
    }
}
