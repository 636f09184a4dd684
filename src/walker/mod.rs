//! Filesystem tree walker
//!
//! This module implements a pre-order depth-first traversal with
//! per-entry skip signaling, plus a combinator for composing visit
//! functions into a single decision pipeline.
//!
//! # Architecture
//!
//! ```text
//!                  ┌──────────────────────────┐
//!                  │          walk()          │
//!                  │  - pre-order DFS         │
//!                  │  - cleaned entry paths   │
//!                  └────────────┬─────────────┘
//!                               │ (path, info, Flow)
//!                               ▼
//!      ┌────────┐   ┌────────┐   ┌────────┐   ┌───────────┐
//!      │filter 1│──►│filter 2│──►│filter N│──►│ terminal  │
//!      └────────┘   └────────┘   └────────┘   └───────────┘
//!        chain(): SkipThis short-circuits, errors thread through
//! ```

pub mod chain;
pub mod walk;

pub use chain::chain;
pub use walk::{clean_path, walk, EntryInfo, EntryKind, Flow, VisitFn};
