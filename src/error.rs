//! Error types for findex
//!
//! This module defines the error hierarchy covering:
//! - Catalog errors (HEAD file, generation reclamation)
//! - Ignore pattern errors
//! - Configuration errors
//! - Traversal and search engine errors
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Sentinel conditions are dedicated variants, matchable by identity
//! - Preserve error chains for debugging

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the findex library
#[derive(Error, Debug)]
pub enum FindexError {
    /// Query or state inspection attempted before any generation was opened
    #[error("index is not opened")]
    NotOpened,

    /// Indexer construction requires a non-empty base path
    #[error("base path cannot be empty")]
    EmptyBasePath,

    /// A location configured a filter name outside the supported set
    #[error("\"{0}\" filter is not supported")]
    UnsupportedFilter(String),

    /// Catalog errors (HEAD pointer, generation directories)
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Ignore pattern errors
    #[error(transparent)]
    Ignore(#[from] IgnoreError),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tree traversal failed under the given root
    #[error("failed to traverse {root}: {source}")]
    Traversal {
        root: PathBuf,
        source: Box<FindexError>,
    },

    /// Embedded search engine errors
    #[error("search engine error: {0}")]
    Engine(#[from] tantivy::TantivyError),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors touching the on-disk catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// No generation has ever been published at this base path
    #[error("cannot open index, HEAD file does not exist")]
    HeadDoesNotExist,

    /// Failed to read a catalog file or directory
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write the HEAD file
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to remove a superseded generation
    #[error("failed to clean up {path}: {source}")]
    Reclaim {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors compiling ignore pattern lists
#[derive(Error, Debug)]
pub enum IgnoreError {
    /// An ignore list leaf was neither a string nor a list
    #[error("{type_name} type is not supported, only string or nested list of strings")]
    TypeNotSupported { type_name: String },

    /// A pattern line was rejected by the matcher
    #[error("invalid ignore pattern \"{pattern}\": {source}")]
    Pattern {
        pattern: String,
        source: ignore::Error,
    },
}

/// Configuration file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read a config file that exists
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Config file contents failed to parse
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Result type alias for FindexError
pub type Result<T> = std::result::Result<T, FindexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_does_not_exist_is_matchable() {
        let err: FindexError = CatalogError::HeadDoesNotExist.into();
        assert!(matches!(
            err,
            FindexError::Catalog(CatalogError::HeadDoesNotExist)
        ));
    }

    #[test]
    fn test_unsupported_filter_message() {
        let err = FindexError::UnsupportedFilter("bogus".to_string());
        assert_eq!(err.to_string(), "\"bogus\" filter is not supported");
    }

    #[test]
    fn test_type_not_supported_message() {
        let err = IgnoreError::TypeNotSupported {
            type_name: "integer".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "integer type is not supported, only string or nested list of strings"
        );
    }
}
