//! Configuration for findex
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - The declarative TOML config file (index base path + locations)
//! - Environment variable expansion and path absolutization
//!
//! The config file is looked up as `.findex.toml` in the working
//! directory, then `$HOME/.findex/config.toml`. A missing file is not
//! an error; defaults apply.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use clap::Parser;
use regex::{Captures, Regex};
use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::walker::clean_path;

/// Default catalog base path, relative to the expanded `$HOME`
const DEFAULT_BASE_PATH: &str = "$HOME/.findex/indexes";

/// Config file name looked up in the working directory
const LOCAL_CONFIG_FILE: &str = ".findex.toml";

/// Config file name looked up under `$HOME/.findex`
const HOME_CONFIG_FILE: &str = "config.toml";

/// Regex for `$VAR` references in configured paths
static ENV_VAR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)").expect("Invalid env var regex")
});

/// File indexer and fuzzy file finder
#[derive(Parser, Debug, Clone)]
#[command(
    name = "findex",
    version,
    about = "File indexer and fuzzy file finder",
    long_about = "Indexes file paths under the configured locations and answers fuzzy \
                  queries against the published index.\n\n\
                  With no arguments, reports index status and offers to reindex. \
                  With a search term, prints the best matching paths.",
    after_help = "EXAMPLES:\n    \
        findex                 # status, offer to (re)index\n    \
        findex report          # search for 'report'\n    \
        findex -n 10 report    # show up to 10 results"
)]
pub struct CliArgs {
    /// Search term; omit to show status and optionally reindex
    #[arg(value_name = "TERM")]
    pub term: Option<String>,

    /// Number of results to print
    #[arg(short = 'n', long = "num", default_value = "5", value_name = "NUM")]
    pub num: usize,

    /// Verbose output (show informational logs)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    index: IndexSection,

    #[serde(default)]
    locations: Vec<LocationSection>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct IndexSection {
    base_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct LocationSection {
    path: String,

    #[serde(default)]
    filters: Vec<String>,

    #[serde(default)]
    ignores: Vec<toml::Value>,
}

/// A configured directory location
#[derive(Debug, Clone)]
pub struct ConfiguredLocation {
    /// Expanded, absolute root path
    pub path: PathBuf,

    /// Named filters in application order
    pub filters: Vec<String>,

    /// Nested ignore pattern list
    pub ignores: Vec<toml::Value>,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Catalog base path
    pub base_path: PathBuf,

    /// Directory locations to index
    pub locations: Vec<ConfiguredLocation>,
}

impl Config {
    /// Load configuration from the first config file found, or defaults
    pub fn load() -> Result<Self, ConfigError> {
        match find_config_file() {
            Some(path) => {
                debug!(path = %path.display(), "loading config file");
                let content = fs::read_to_string(&path).map_err(|e| ConfigError::Read {
                    path: path.clone(),
                    source: e,
                })?;
                let file: FileConfig =
                    toml::from_str(&content).map_err(|e| ConfigError::Parse { path, source: e })?;
                Ok(Self::from_file(file))
            }
            None => Ok(Self::from_file(FileConfig::default())),
        }
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source: e,
        })?;
        Ok(Self::from_file(file))
    }

    fn from_file(file: FileConfig) -> Self {
        let base_path = file
            .index
            .base_path
            .unwrap_or_else(|| DEFAULT_BASE_PATH.to_string());
        let locations = file
            .locations
            .into_iter()
            .map(|l| ConfiguredLocation {
                path: abs_pathify(&l.path),
                filters: l.filters,
                ignores: l.ignores,
            })
            .collect();
        Self {
            base_path: abs_pathify(&base_path),
            locations,
        }
    }
}

fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    let home = dirs::home_dir()?.join(".findex").join(HOME_CONFIG_FILE);
    home.is_file().then_some(home)
}

/// Expand `$VAR` references; unset variables expand to nothing
fn expand_env(input: &str) -> String {
    ENV_VAR_REGEX
        .replace_all(input, |caps: &Captures| {
            let name = &caps[1];
            if name == "HOME" {
                return dirs::home_dir()
                    .map(|p| p.to_string_lossy().into_owned())
                    .unwrap_or_default();
            }
            env::var(name).unwrap_or_default()
        })
        .into_owned()
}

/// Expand environment references and make the path absolute
fn abs_pathify(input: &str) -> PathBuf {
    let expanded = expand_env(input);
    let path = Path::new(&expanded);
    if path.is_absolute() {
        return clean_path(path);
    }
    match env::current_dir() {
        Ok(cwd) => clean_path(&cwd.join(path)),
        Err(_) => clean_path(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_without_config() {
        let config = Config::from_toml("").unwrap();
        assert!(config.base_path.is_absolute());
        assert!(config
            .base_path
            .ends_with(Path::new(".findex").join("indexes")));
        assert!(config.locations.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_toml(
            r#"
            [index]
            base_path = "/var/lib/findex"

            [[locations]]
            path = "/home/user/projects"
            filters = ["not_dir"]
            ignores = ["target", [".git", "node_modules"]]

            [[locations]]
            path = "/etc"
            "#,
        )
        .unwrap();

        assert_eq!(config.base_path, PathBuf::from("/var/lib/findex"));
        assert_eq!(config.locations.len(), 2);

        let first = &config.locations[0];
        assert_eq!(first.path, PathBuf::from("/home/user/projects"));
        assert_eq!(first.filters, ["not_dir"]);
        assert_eq!(first.ignores.len(), 2);

        let second = &config.locations[1];
        assert!(second.filters.is_empty());
        assert!(second.ignores.is_empty());
    }

    #[test]
    fn test_malformed_config_fails() {
        let err = Config::from_toml("index = nonsense").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_expand_env() {
        env::set_var("FINDEX_TEST_DIR", "/data");
        assert_eq!(expand_env("$FINDEX_TEST_DIR/files"), "/data/files");
        assert_eq!(expand_env("no-vars-here"), "no-vars-here");
        assert_eq!(expand_env("$FINDEX_TEST_UNSET_VAR/x"), "/x");
        env::remove_var("FINDEX_TEST_DIR");
    }

    #[test]
    fn test_abs_pathify_relative_path() {
        let path = abs_pathify("some/relative/dir");
        assert!(path.is_absolute());
        assert!(path.ends_with("some/relative/dir"));
    }

    #[test]
    fn test_cli_defaults() {
        let args = CliArgs::parse_from(["findex"]);
        assert_eq!(args.num, 5);
        assert!(args.term.is_none());
        assert!(!args.verbose);

        let args = CliArgs::parse_from(["findex", "-n", "10", "report"]);
        assert_eq!(args.num, 10);
        assert_eq!(args.term.as_deref(), Some("report"));
    }

    #[test]
    fn test_cli_rejects_extra_arguments() {
        assert!(CliArgs::try_parse_from(["findex", "one", "two"]).is_err());
    }
}
