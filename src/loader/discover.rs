//! Directory discovery: find source files and derive their tree keys.
//!
//! `config/database/mysql.yaml` under root `config/` is discovered with the
//! key `database.mysql`.

use crate::error::{ConfigError, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::trace;
use walkdir::{DirEntry, WalkDir};

/// A source file found under a root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Resolved path of the file
    pub path: PathBuf,
    /// Dotted key the file's bundle is nested under
    pub key: String,
}

impl DiscoveredFile {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }
}

/// Yields every source file beneath a root, each exactly once.
pub trait DirectoryWalker {
    fn walk(&self, root: &Path) -> Result<Vec<DiscoveredFile>>;
}

/// Filesystem walker that keeps files with a recognised extension.
#[derive(Debug, Clone)]
pub struct SourceWalker {
    extensions: BTreeSet<String>,
    follow_links: bool,
    include_hidden: bool,
    max_depth: Option<usize>,
}

impl SourceWalker {
    /// Create a walker accepting the given extensions (case-insensitive).
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().to_lowercase())
                .collect(),
            follow_links: false,
            include_hidden: false,
            max_depth: None,
        }
    }

    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext.to_lowercase()))
    }

    fn visible(&self, entry: &DirEntry) -> bool {
        self.include_hidden || entry.depth() == 0 || !is_hidden(entry)
    }
}

impl DirectoryWalker for SourceWalker {
    /// Files are yielded contents-first (a directory's files before the
    /// directory's own siblings that sort after it), in file-name order.
    fn walk(&self, root: &Path) -> Result<Vec<DiscoveredFile>> {
        let real_root = root
            .canonicalize()
            .map_err(|_| ConfigError::DirectoryNotFound {
                path: root.to_path_buf(),
                reason: "cannot be resolved to a real path",
            })?;

        if !real_root.is_dir() {
            return Err(ConfigError::DirectoryNotFound {
                path: real_root,
                reason: "not found",
            });
        }

        std::fs::read_dir(&real_root).map_err(|e| ConfigError::DirectoryNotReadable {
            path: real_root.clone(),
            source: Some(e),
        })?;

        let walker = WalkDir::new(&real_root)
            .follow_links(self.follow_links)
            .max_depth(self.max_depth.unwrap_or(usize::MAX))
            .contents_first(true)
            .sort_by_file_name();

        let mut files = Vec::new();
        for entry in walker.into_iter().filter_entry(|e| self.visible(e)) {
            let entry = entry.map_err(|e| walk_error(&real_root, e))?;

            if !entry.file_type().is_file() {
                continue;
            }

            if !self.accepts(entry.path()) {
                trace!(path = %entry.path().display(), "Skipping non-source file");
                continue;
            }

            let unresolved = || ConfigError::PathResolution {
                path: entry.path().to_path_buf(),
                directory: root.to_path_buf(),
            };
            let path = entry.path().canonicalize().map_err(|_| unresolved())?;
            let key = derive_key(&real_root, entry.path()).ok_or_else(unresolved)?;

            trace!(path = %path.display(), key = %key, "Discovered config source");
            files.push(DiscoveredFile { path, key });
        }

        Ok(files)
    }
}

/// Derive the dotted key for `file` relative to `root`, without extension.
pub fn derive_key(root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?.with_extension("");
    let parts = relative
        .components()
        .map(|component| component.as_os_str().to_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()?;

    if parts.is_empty() {
        return None;
    }
    Some(parts.join("."))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

fn walk_error(root: &Path, err: walkdir::Error) -> ConfigError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());
    ConfigError::DirectoryNotReadable {
        path,
        source: err.into_io_error(),
    }
}
