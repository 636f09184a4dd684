//! Ignore pattern matching
//!
//! Locations configure ignore patterns as a recursively nested list
//! whose leaves are strings, so short lists stay flat while shared
//! pattern groups can be spliced in as sub-lists. Leaves are collected
//! in encounter order and compiled into a single gitignore-semantics
//! matcher (wildcards, character classes, `!` negation with
//! last-match-wins).

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::error::IgnoreError;

/// Compiled gitignore-style matcher over a nested pattern list
#[derive(Debug)]
pub struct IgnoreMatcher {
    lines: Vec<String>,
    matcher: Gitignore,
}

impl IgnoreMatcher {
    /// Flatten the nested list and compile the collected pattern lines
    ///
    /// Leaves must be strings; any other value type fails with
    /// [`IgnoreError::TypeNotSupported`] naming the observed type.
    pub fn new(values: &[toml::Value]) -> Result<Self, IgnoreError> {
        let mut lines = Vec::new();
        for value in values {
            resolve_value(value, &mut lines)?;
        }

        let mut builder = GitignoreBuilder::new("/");
        for line in &lines {
            builder
                .add_line(None, line)
                .map_err(|e| IgnoreError::Pattern {
                    pattern: line.clone(),
                    source: e,
                })?;
        }
        let matcher = builder.build().map_err(|e| IgnoreError::Pattern {
            pattern: String::new(),
            source: e,
        })?;

        Ok(Self { lines, matcher })
    }

    /// Whether the path is ignored by the compiled patterns
    ///
    /// A path inside an ignored directory counts as ignored, matching
    /// how gitignore treats directory contents.
    pub fn matches_path(&self, path: &Path, is_dir: bool) -> bool {
        self.matcher
            .matched_path_or_any_parents(path, is_dir)
            .is_ignore()
    }

    /// The flattened pattern lines, in encounter order
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

fn resolve_value(value: &toml::Value, lines: &mut Vec<String>) -> Result<(), IgnoreError> {
    match value {
        toml::Value::String(s) => lines.push(s.clone()),
        toml::Value::Array(items) => {
            for item in items {
                resolve_value(item, lines)?;
            }
        }
        other => {
            return Err(IgnoreError::TypeNotSupported {
                type_name: other.type_str().to_string(),
            })
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string(s: &str) -> toml::Value {
        toml::Value::String(s.to_string())
    }

    fn list(items: Vec<toml::Value>) -> toml::Value {
        toml::Value::Array(items)
    }

    fn matcher(values: Vec<toml::Value>) -> IgnoreMatcher {
        IgnoreMatcher::new(&values).unwrap()
    }

    #[test]
    fn test_matches_in_gitignore_style() {
        let m = matcher(vec![
            string("testing"),
            string("!important"),
            string("*[Bb]ackup*"),
        ]);

        assert!(m.matches_path(Path::new("/testing"), true));
        assert!(m.matches_path(Path::new("/testing/more_files"), false));
        assert!(m.matches_path(Path::new("/abc/testing"), true));

        assert!(!m.matches_path(Path::new("/abc/important"), false));

        assert!(m.matches_path(Path::new("/HelloBackup"), false));
        assert!(m.matches_path(Path::new("/backup"), false));
        assert!(m.matches_path(Path::new("/backups"), false));
        assert!(m.matches_path(Path::new("/backup_temp"), false));
    }

    #[test]
    fn test_negation_has_last_match_precedence() {
        let m = matcher(vec![string("level*"), string("!level1")]);
        assert!(m.matches_path(Path::new("/level0"), true));
        assert!(!m.matches_path(Path::new("/level1"), true));
    }

    #[test]
    fn test_combines_nested_lists_in_order() {
        let m = matcher(vec![
            string("testing"),
            list(vec![string("!important")]),
            list(vec![string("!moreImportant")]),
        ]);

        assert_eq!(m.lines(), ["testing", "!important", "!moreImportant"]);
        assert!(!m.matches_path(Path::new("/abc/important"), false));
        assert!(!m.matches_path(Path::new("/abc/moreImportant"), false));
    }

    #[test]
    fn test_deeply_nested_lists() {
        let m = matcher(vec![
            string("testing"),
            list(vec![
                string("!moreImportant"),
                list(vec![string("!important")]),
            ]),
        ]);

        assert_eq!(m.lines(), ["testing", "!moreImportant", "!important"]);
        assert!(m.matches_path(Path::new("/testing"), true));
        assert!(!m.matches_path(Path::new("/important"), false));
    }

    #[test]
    fn test_empty_list_matches_nothing() {
        let m = matcher(vec![]);
        assert!(!m.matches_path(Path::new("/anything"), false));
    }

    #[test]
    fn test_rejects_unsupported_leaf_types() {
        let cases = [
            (toml::Value::Integer(123), "integer"),
            (toml::Value::Boolean(true), "boolean"),
            (list(vec![toml::Value::Integer(123)]), "integer"),
            (
                list(vec![string("ok"), list(vec![toml::Value::Float(1.5)])]),
                "float",
            ),
        ];

        for (value, expected_type) in cases {
            let err = IgnoreMatcher::new(&[value]).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!(
                    "{expected_type} type is not supported, only string or nested list of strings"
                )
            );
        }
    }
}
