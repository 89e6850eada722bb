//! Hierarchical configuration trees.
//!
//! A [`ConfigTree`] holds nested values addressed by path keys such as
//! `database.mysql.host`. Bundles are loaded from YAML, JSON and TOML files
//! (or registered providers) with a [`BundleLoader`] and merged in.

pub mod bootstrap;
pub mod cli;
pub mod error;
pub mod format;
pub mod key;
pub mod loader;
pub mod logging;
pub mod settings;
pub mod tree;
pub mod value;

pub use error::{ConfigError, ErrorCode, Result};
pub use key::PathKey;
pub use loader::{BundleLoader, ConfigProvider, DirectoryWalker, Evaluated, SourceFormat};
pub use settings::Settings;
pub use tree::{ConfigTree, ListPolicy};
pub use value::{ConfigInput, ConfigMap, ConfigValue, EntryKey};
