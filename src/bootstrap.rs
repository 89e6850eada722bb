//! Host integration: build a tree and merge the configuration directory.

use crate::error::Result;
use crate::loader::{BundleLoader, DirectoryWalker, SourceWalker};
use crate::settings::Settings;
use crate::tree::ConfigTree;
use std::path::PathBuf;
use tracing::{debug, info};

/// Merges a configuration directory into a tree, if there is one.
#[derive(Debug, Clone)]
pub struct ConfigExtension {
    pub directory: PathBuf,
    walker: SourceWalker,
}

impl ConfigExtension {
    /// Extension for `directory`, walking every extension `loader` supports.
    pub fn new(directory: impl Into<PathBuf>, loader: &BundleLoader) -> Self {
        Self {
            directory: directory.into(),
            walker: loader.walker(),
        }
    }

    /// Extension for the configured directory with the configured walk options.
    pub fn discover(settings: &Settings, loader: &BundleLoader) -> Self {
        let discovery = &settings.discovery;
        let walker = loader
            .walker()
            .follow_links(discovery.follow_links)
            .include_hidden(discovery.include_hidden)
            .max_depth(discovery.max_depth);

        Self {
            directory: discovery.config_dir.clone(),
            walker,
        }
    }

    /// Merge the directory into `tree`.
    ///
    /// Returns `Ok(false)` and leaves the tree untouched when the directory
    /// does not exist or holds no recognised source.
    pub fn apply(&self, loader: &BundleLoader, tree: &mut ConfigTree) -> Result<bool> {
        if !self.directory.is_dir() {
            debug!(directory = %self.directory.display(), "No config directory");
            return Ok(false);
        }

        let files = self.walker.walk(&self.directory)?;
        if files.is_empty() {
            debug!(directory = %self.directory.display(), "Config directory has no sources");
            return Ok(false);
        }

        let bundle = loader.load_directory(&files)?;
        tree.merge(bundle)?;

        info!(
            directory = %self.directory.display(),
            files = files.len(),
            "Merged config directory"
        );
        Ok(true)
    }
}

/// Build a tree populated from the configured directory.
pub fn build(settings: &Settings) -> Result<ConfigTree> {
    let loader = BundleLoader::new();
    let mut tree = ConfigTree::new();
    ConfigExtension::discover(settings, &loader).apply(&loader, &mut tree)?;
    Ok(tree)
}
