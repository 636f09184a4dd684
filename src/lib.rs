//! findex - Local Filesystem Fuzzy Finder
//!
//! Indexes file paths under configured directory trees into an embedded
//! full-text index and answers fuzzy/prefix/wildcard queries against it.
//! Indexing and querying are decoupled through an on-disk catalog, so a
//! long-running rebuild never blocks searches.
//!
//! # Features
//!
//! - **Atomic reindex swapping**: A rebuild produces a fresh index
//!   generation off to the side; publication is a single HEAD write and
//!   an in-memory handle swap. Readers never see a partial index.
//!
//! - **Lock-free rebuilds**: Building takes no index lock at all, so
//!   any number of rebuilds can run under sustained query traffic.
//!
//! - **Filter pipelines**: Each location composes named filters and
//!   gitignore-style patterns into one short-circuiting decision chain.
//!
//! - **Crash tolerant**: Interrupted builds leave inert directories
//!   that the next close reclaims; the published generation is always
//!   whole.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Indexer                                  │
//! │                                                                  │
//! │  index()                       search()/doc_count()/...          │
//! │     │                                    │                       │
//! │     ▼                                    ▼ (shared lock)         │
//! │  walk roots ──► filter chain      ┌──────────────┐               │
//! │     │                             │ reader slot  │◄── swap       │
//! │     ▼                             │ Arc<Reader>  │  (exclusive)  │
//! │  GenerationBuilder                └──────┬───────┘               │
//! │     │ seal                               │                       │
//! └─────┼────────────────────────────────────┼───────────────────────┘
//!       ▼                                    ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  <base_path>/                                                    │
//! │      HEAD            ◄── published generation name               │
//! │      <uuid-1>/       ◄── sealed generation (tantivy index)       │
//! │      <uuid-2>/       ◄── being built / awaiting reclamation      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use findex::{Indexer, LocationOptions};
//!
//! # fn main() -> findex::Result<()> {
//! let indexer = Indexer::builder("/home/user/.findex/indexes")
//!     .location("/home/user/projects", LocationOptions::default())
//!     .build()?;
//!
//! let name = indexer.index()?;
//! indexer.open_and_swap(&name)?;
//!
//! for hit in indexer.search("report")?.hits {
//!     println!("{}", hit.id);
//! }
//! indexer.close()?;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod fts;
pub mod ignorer;
pub mod indexer;
pub mod progress;
pub mod walker;

pub use config::{CliArgs, Config, ConfiguredLocation};
pub use error::{CatalogError, ConfigError, FindexError, IgnoreError, Result};
pub use fts::{Hit, SearchRequest, SearchResults};
pub use indexer::{Indexer, IndexerBuilder, LocationOptions};
pub use walker::{chain, walk, EntryInfo, EntryKind, Flow, VisitFn};
