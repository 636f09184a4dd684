//! Location filters
//!
//! A filter is a visit function that decides whether an entry survives
//! traversal. Locations configure an ordered list of named filters plus
//! an optional ignore pattern list; this module assembles them into a
//! single chained pipeline per root.
//!
//! Supported names:
//! - `top`: only the root and its immediate children survive
//! - `dir`: only directories survive
//! - `not_dir`: only non-directories survive (the root always passes so
//!   traversal can descend)

use std::path::{Path, PathBuf};

use crate::error::{FindexError, Result};
use crate::ignorer::IgnoreMatcher;
use crate::indexer::LocationOptions;
use crate::walker::{chain, clean_path, Flow, VisitFn};

/// Filter keeping only the root and its immediate descendants
pub const TOP: &str = "top";

/// Filter keeping only directories
pub const DIR: &str = "dir";

/// Filter keeping only non-directories
pub const NOT_DIR: &str = "not_dir";

fn top_filter<'a>(root: &Path) -> VisitFn<'a> {
    let root: PathBuf = clean_path(root);
    Box::new(move |path, _info, flow| {
        if !matches!(flow, Flow::Continue) {
            return flow;
        }
        // the root itself passes; its parent never equals the root
        if path != root && path.parent() != Some(root.as_path()) {
            return Flow::SkipThis;
        }
        flow
    })
}

fn dir_filter<'a>() -> VisitFn<'a> {
    Box::new(move |_path, info, flow| {
        if !matches!(flow, Flow::Continue) {
            return flow;
        }
        if !info.is_dir() {
            return Flow::SkipThis;
        }
        flow
    })
}

fn not_dir_filter<'a>(root: &Path) -> VisitFn<'a> {
    let root: PathBuf = clean_path(root);
    Box::new(move |path, info, flow| {
        if !matches!(flow, Flow::Continue) {
            return flow;
        }
        // let the root pass so the walk can reach the entries inside it
        if path == root {
            return flow;
        }
        if info.is_dir() {
            return Flow::SkipThis;
        }
        flow
    })
}

fn ignore_filter<'a>(ignores: &[toml::Value]) -> Result<VisitFn<'a>> {
    let matcher = IgnoreMatcher::new(ignores)?;
    Ok(Box::new(move |path, info, flow| {
        if !matches!(flow, Flow::Continue) {
            return flow;
        }
        if matcher.matches_path(path, info.is_dir()) {
            return Flow::SkipThis;
        }
        flow
    }))
}

/// Assemble the filter pipeline for one configured location
///
/// Named filters are chained in configuration order. The ignore filter,
/// when present, goes last: pattern matching is the most expensive
/// check, and chaining is associative, so the ordering is purely a
/// performance choice.
pub fn location_pipeline<'a>(root: &Path, options: &LocationOptions) -> Result<VisitFn<'a>> {
    let mut visits: Vec<VisitFn<'a>> = Vec::with_capacity(options.filters.len() + 1);
    for name in &options.filters {
        match name.as_str() {
            TOP => visits.push(top_filter(root)),
            DIR => visits.push(dir_filter()),
            NOT_DIR => visits.push(not_dir_filter(root)),
            other => return Err(FindexError::UnsupportedFilter(other.to_string())),
        }
    }
    if !options.ignores.is_empty() {
        visits.push(ignore_filter(&options.ignores)?);
    }
    Ok(chain(visits))
}
