//! Bundle loading from source files and directories.
//!
//! Each source file evaluates to a *bundle*: a plain map that is merged into
//! a [`ConfigTree`] and then dropped.
//!
//! ## Failure policy
//! - Missing path: `FileNotFound`; unreadable path: `FileNotReadable`
//! - Parse errors and provider errors: `LoadError` with the cause kept
//! - Anything that is not a mapping or a provider: `InvalidFileFormat`
//! - Directory loads are fail-fast: one bad file aborts the whole load

mod discover;
mod sources;

pub use discover::{DiscoveredFile, DirectoryWalker, SourceWalker, derive_key};
pub use sources::{ConfigProvider, Evaluated, JsonFormat, SourceFormat, TomlFormat, YamlFormat};

use crate::error::{ConfigError, Result};
use crate::key::PathKey;
use crate::tree::ConfigTree;
use crate::value::{ConfigInput, ConfigMap, kind_of, normalize};
use serde_json::Value;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Loads bundles using the source format registered for each extension.
#[derive(Clone)]
pub struct BundleLoader {
    formats: HashMap<String, Arc<dyn SourceFormat>>,
}

impl Default for BundleLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BundleLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleLoader")
            .field("extensions", &self.extensions())
            .finish()
    }
}

impl BundleLoader {
    /// Create a loader with the built-in YAML, JSON and TOML formats.
    pub fn new() -> Self {
        Self::empty()
            .with_format("yaml", YamlFormat)
            .with_format("yml", YamlFormat)
            .with_format("json", JsonFormat)
            .with_format("toml", TomlFormat)
    }

    /// Create a loader with no formats registered.
    pub fn empty() -> Self {
        Self {
            formats: HashMap::new(),
        }
    }

    pub fn with_format(mut self, extension: &str, format: impl SourceFormat + 'static) -> Self {
        self.register(extension, format);
        self
    }

    /// Register `format` for `extension` (case-insensitive, without the dot).
    pub fn register(&mut self, extension: &str, format: impl SourceFormat + 'static) {
        self.formats
            .insert(extension.trim_start_matches('.').to_lowercase(), Arc::new(format));
    }

    /// Registered extensions, sorted.
    pub fn extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self.formats.keys().map(String::as_str).collect();
        extensions.sort_unstable();
        extensions
    }

    /// Check whether `path` has a registered extension.
    pub fn supports(&self, path: &Path) -> bool {
        self.format_for(path).is_some()
    }

    /// A walker that discovers every file this loader can evaluate.
    pub fn walker(&self) -> SourceWalker {
        SourceWalker::new(self.extensions())
    }

    fn format_for(&self, path: &Path) -> Option<&Arc<dyn SourceFormat>> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        self.formats.get(&extension)
    }

    /// Load one source file into a bundle.
    pub fn load_file(&self, path: &Path) -> Result<ConfigMap> {
        let text = read_source(path)?;

        let format = self.format_for(path).ok_or_else(|| {
            ConfigError::invalid_format(path, "no source format registered for its extension")
        })?;

        let evaluated = format
            .evaluate(path, &text)
            .map_err(|e| ConfigError::load(path, e))?;

        let bundle = match evaluated {
            Evaluated::Document(input) => bundle_from_document(path, input)?,
            Evaluated::Provider(provider) => {
                let mut tree = ConfigTree::new();
                provider
                    .provide(&mut tree)
                    .map_err(|e| ConfigError::load(path, e))?;
                tree.into_map()
            }
        };

        debug!(path = %path.display(), entries = bundle.len(), "Loaded config source");
        Ok(bundle)
    }

    /// Load one source file and nest its bundle under `key`.
    pub fn load_namespaced(&self, path: &Path, key: &str) -> Result<ConfigMap> {
        PathKey::parse(key)?;
        let bundle = self.load_file(path)?;

        let mut namespaced = ConfigMap::new();
        namespaced.insert(key.to_string(), Value::Object(bundle));
        Ok(namespaced)
    }

    /// Load every discovered file, nesting each bundle at its derived key.
    pub fn load_directory(&self, files: &[DiscoveredFile]) -> Result<ConfigMap> {
        let mut accumulated = ConfigTree::new();
        for file in files {
            let bundle = self.load_file(&file.path)?;
            accumulated.merge_value(&file.key, bundle)?;
        }

        debug!(files = files.len(), "Loaded config directory");
        Ok(accumulated.into_map())
    }

    /// Load `path` and merge it into `tree`, nested under `key` when given.
    pub fn merge_file(&self, tree: &mut ConfigTree, path: &Path, key: Option<&str>) -> Result<()> {
        let bundle = match key {
            Some(key) => self.load_namespaced(path, key)?,
            None => self.load_file(path)?,
        };
        tree.merge(bundle)
    }

    /// Discover every source under `directory` and merge them into `tree`.
    pub fn merge_directory(&self, tree: &mut ConfigTree, directory: &Path) -> Result<()> {
        self.merge_directory_with(tree, directory, &self.walker())
    }

    pub fn merge_directory_with(
        &self,
        tree: &mut ConfigTree,
        directory: &Path,
        walker: &dyn DirectoryWalker,
    ) -> Result<()> {
        let files = walker.walk(directory)?;
        let bundle = self.load_directory(&files)?;
        tree.merge(bundle)
    }
}

fn read_source(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(ConfigError::file_not_found(path));
    }

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(ConfigError::file_not_found(path)),
        Err(e) => {
            return Err(ConfigError::FileNotReadable {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    String::from_utf8(bytes).map_err(|e| ConfigError::load(path, e))
}

/// Accept a document only if it is map-shaped; `null` is an empty bundle.
fn bundle_from_document(path: &Path, input: ConfigInput) -> Result<ConfigMap> {
    let kind = input.kind();
    let value = match input {
        ConfigInput::Opaque(_) => {
            return Err(ConfigError::invalid_format(path, format!("received {}", kind)));
        }
        other => normalize("", other)?,
    };

    match value {
        Value::Null => Ok(ConfigMap::new()),
        Value::Object(map) => Ok(map),
        other => Err(ConfigError::invalid_format(
            path,
            format!("received {}", kind_of(&other)),
        )),
    }
}
