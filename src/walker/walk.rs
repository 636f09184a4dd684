//! Pre-order depth-first filesystem traversal
//!
//! `walk` visits every entry under a root, including the root itself,
//! handing each visit to a caller-supplied function that decides whether
//! to continue, skip the entry's subtree, or abort the traversal.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{FindexError, Result};

/// Control value threaded through visit functions
///
/// A visit function receives the flow produced by its predecessor and
/// returns the flow for its successor. The walker starts every visit
/// with `Continue`.
#[derive(Debug)]
pub enum Flow {
    /// Keep going; descend into the entry if it is a directory
    Continue,

    /// Do not descend into this entry and do not report it.
    /// Traversal continues with the entry's siblings.
    SkipThis,

    /// Abort the traversal with this error
    Failed(FindexError),
}

impl Flow {
    /// Returns true for the skip signal
    pub fn is_skip(&self) -> bool {
        matches!(self, Flow::SkipThis)
    }
}

/// Kind of a visited directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Other,
}

/// Metadata for a visited entry, as seen by visit functions
#[derive(Debug, Clone)]
pub struct EntryInfo {
    name: String,
    kind: EntryKind,
}

impl EntryInfo {
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Base name of the entry
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entry kind (file, directory, symlink, other)
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Abbreviation for `kind() == EntryKind::Dir`
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    fn from_entry(entry: &walkdir::DirEntry) -> Self {
        let file_type = entry.file_type();
        let kind = if file_type.is_dir() {
            EntryKind::Dir
        } else if file_type.is_file() {
            EntryKind::File
        } else if file_type.is_symlink() {
            EntryKind::Symlink
        } else {
            EntryKind::Other
        };
        Self::new(entry.file_name().to_string_lossy(), kind)
    }
}

/// The type of function called by `walk` for each visited entry
pub type VisitFn<'a> = Box<dyn FnMut(&Path, &EntryInfo, Flow) -> Flow + 'a>;

/// Lexically clean a path: collapse redundant separators, drop `.`
/// segments and any trailing separator
pub fn clean_path(path: &Path) -> PathBuf {
    let cleaned: PathBuf = path.components().collect();
    if cleaned.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        cleaned
    }
}

/// Walk the file tree rooted at the specified directory
///
/// The visit function is called with the cleaned root path and every
/// entry below it, in lexical pre-order. A root that is not a directory
/// yields an empty traversal; a root that cannot be inspected fails.
pub fn walk<F>(root: &Path, visit: &mut F) -> Result<()>
where
    F: FnMut(&Path, &EntryInfo, Flow) -> Flow,
{
    let root = clean_path(root);

    let meta = fs::symlink_metadata(&root).map_err(|e| FindexError::Traversal {
        root: root.clone(),
        source: Box::new(e.into()),
    })?;
    if !meta.is_dir() {
        return Ok(());
    }

    let mut entries = WalkDir::new(&root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    while let Some(next) = entries.next() {
        let entry = next.map_err(|e| FindexError::Traversal {
            root: root.clone(),
            source: Box::new(FindexError::Io(e.into())),
        })?;
        let info = EntryInfo::from_entry(&entry);

        match visit(entry.path(), &info, Flow::Continue) {
            Flow::Continue => {}
            Flow::SkipThis => {
                // skip_current_dir only makes sense for directories; a
                // skipped file simply goes unreported
                if entry.file_type().is_dir() {
                    entries.skip_current_dir();
                }
            }
            Flow::Failed(e) => {
                return Err(FindexError::Traversal {
                    root,
                    source: Box::new(e),
                })
            }
        }
    }
    Ok(())
}
