//! The configuration tree.
//!
//! A [`ConfigTree`] owns one insertion-ordered root map. Every operation
//! takes a path key (`a.b.c`, `a/b/c` or `a\b\c`) and walks the tree one
//! segment at a time:
//!
//! - Reads (`get`, `has`) stop at the first missing segment or non-map node
//!   and report "not found"; a stored `null` still counts as found.
//! - Writes (`set`, `append`, `prepend`, `merge`) create missing parents and
//!   promote any non-map parent to an empty map.
//! - `unset` never creates anything and is a no-op for absent paths.

mod merge;

pub use merge::{combine, concat, into_list};

use crate::error::{ConfigError, Result};
use crate::key::PathKey;
use crate::value::{ConfigInput, ConfigMap, EntryKey, kind_of, normalize};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What `append`/`prepend` do when the existing leaf is a scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListPolicy {
    /// Wrap the scalar into a one-element list, then extend it.
    #[default]
    Coerce,
    /// Refuse with `InvalidValue` and leave the tree untouched.
    Strict,
}

#[derive(Debug, Clone, Copy)]
enum End {
    Front,
    Back,
}

/// Hierarchical configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigTree {
    root: ConfigMap,
}

impl ConfigTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tree seeded from a map; each entry is stored as by [`set`](Self::set).
    pub fn from_map(seed: ConfigMap) -> Result<Self> {
        let mut tree = Self::new();
        for (key, value) in seed {
            tree.set(&key, value)?;
        }
        Ok(tree)
    }

    /// Create a tree seeded from boundary input, which must be map-shaped.
    pub fn from_input(seed: impl Into<ConfigInput>) -> Result<Self> {
        let mut tree = Self::new();
        for (key, value) in top_level_entries(seed.into())? {
            tree.set(&key, value)?;
        }
        Ok(tree)
    }

    /// Look up the value at `key`.
    ///
    /// Returns `Ok(None)` when any segment is missing or crosses a non-map
    /// node. Only a malformed key is an error.
    pub fn get(&self, key: &str) -> Result<Option<&Value>> {
        let path = PathKey::parse(key)?;
        Ok(self.lookup(&path))
    }

    /// Return the value at `key`, or `default` when it is absent.
    ///
    /// A stored `null` is returned as `null`, not replaced by the default.
    pub fn get_or(&self, key: &str, default: Value) -> Result<Value> {
        Ok(self.get(key)?.cloned().unwrap_or(default))
    }

    /// Deserialize the value at `key` into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            None => Ok(None),
            Some(value) => T::deserialize(value)
                .map(Some)
                .map_err(|e| ConfigError::cannot_read(key, e)),
        }
    }

    /// Check whether every segment of `key` resolves to an existing entry.
    pub fn has(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Store `value` at `key`, replacing whatever was there.
    pub fn set(&mut self, key: &str, value: impl Into<ConfigInput>) -> Result<()> {
        let path = PathKey::parse(key)?;
        let value = normalize(key, value.into())?;
        let (parents, last) = path.split_last();

        with_path(&mut self.root, parents, |node| {
            node.insert(last.to_string(), value);
        });
        Ok(())
    }

    /// Remove the entry at `key`.
    ///
    /// A literal top-level entry named exactly `key` is removed first, so flat
    /// keys that contain separator characters can still be dropped.
    pub fn unset(&mut self, key: &str) -> Result<()> {
        let path = PathKey::parse(key)?;

        if self.root.shift_remove(key).is_some() {
            return Ok(());
        }

        let (parents, last) = path.split_last();
        let mut node = &mut self.root;
        for segment in parents {
            match node.get_mut(segment.as_str()) {
                Some(Value::Object(child)) => node = child,
                _ => return Ok(()),
            }
        }
        node.shift_remove(last);
        Ok(())
    }

    /// Append `value` to the list at `key`.
    pub fn append(&mut self, key: &str, value: impl Into<ConfigInput>) -> Result<()> {
        self.extend(key, value.into(), ListPolicy::Coerce, End::Back)
    }

    /// Prepend `value` to the list at `key`.
    pub fn prepend(&mut self, key: &str, value: impl Into<ConfigInput>) -> Result<()> {
        self.extend(key, value.into(), ListPolicy::Coerce, End::Front)
    }

    pub fn append_with(
        &mut self,
        key: &str,
        value: impl Into<ConfigInput>,
        policy: ListPolicy,
    ) -> Result<()> {
        self.extend(key, value.into(), policy, End::Back)
    }

    pub fn prepend_with(
        &mut self,
        key: &str,
        value: impl Into<ConfigInput>,
        policy: ListPolicy,
    ) -> Result<()> {
        self.extend(key, value.into(), policy, End::Front)
    }

    fn extend(&mut self, key: &str, value: ConfigInput, policy: ListPolicy, end: End) -> Result<()> {
        let path = PathKey::parse(key)?;
        let incoming = normalize(key, value)?;

        if policy == ListPolicy::Strict
            && let Some(existing) = self.lookup(&path)
            && is_scalar(existing)
        {
            return Err(ConfigError::not_a_list(key, kind_of(existing)));
        }

        let (parents, last) = path.split_last();
        with_path(&mut self.root, parents, |node| {
            let existing = node.get_mut(last).map(Value::take).unwrap_or(Value::Null);
            let combined = match end {
                End::Back => concat(existing, incoming),
                End::Front => concat(incoming, existing),
            };
            node.insert(last.to_string(), combined);
        });
        Ok(())
    }

    /// Merge every entry of `bundle` into the tree.
    ///
    /// Keys are path keys. All keys and values are validated before the
    /// tree is touched.
    pub fn merge(&mut self, bundle: ConfigMap) -> Result<()> {
        let prepared = bundle
            .into_iter()
            .map(|(key, value)| PathKey::parse(&key).map(|path| (path, value)))
            .collect::<Result<Vec<_>>>()?;

        for (path, value) in prepared {
            self.combine_at(&path, value);
        }
        Ok(())
    }

    /// Merge boundary input, which must be map-shaped with string keys.
    pub fn merge_input(&mut self, input: impl Into<ConfigInput>) -> Result<()> {
        let prepared = top_level_entries(input.into())?
            .into_iter()
            .map(|(key, value)| PathKey::parse(&key).map(|path| (path, value)))
            .collect::<Result<Vec<_>>>()?;

        for (path, value) in prepared {
            self.combine_at(&path, value);
        }
        Ok(())
    }

    /// Merge a single value at `key`.
    pub fn merge_value(&mut self, key: &str, value: impl Into<ConfigInput>) -> Result<()> {
        let path = PathKey::parse(key)?;
        let value = normalize(key, value.into())?;
        self.combine_at(&path, value);
        Ok(())
    }

    fn combine_at(&mut self, path: &PathKey, incoming: Value) {
        let (parents, last) = path.split_last();
        with_path(&mut self.root, parents, |node| {
            let merged = match node.get_mut(last).map(Value::take) {
                Some(existing) => combine(existing, incoming),
                None => incoming,
            };
            node.insert(last.to_string(), merged);
        });
    }

    /// Snapshot of the whole tree as a plain map.
    pub fn to_map(&self) -> ConfigMap {
        self.root.clone()
    }

    pub fn into_map(self) -> ConfigMap {
        self.root
    }

    /// Borrow the root map.
    pub fn as_map(&self) -> &ConfigMap {
        &self.root
    }

    /// Wrap the map at `key` in a new tree; an absent key wraps an empty map.
    pub fn wrap(&self, key: &str) -> Result<ConfigTree> {
        self.wrap_or(key, ConfigMap::new())
    }

    /// Wrap the map at `key` in a new tree, or `default` when it is absent.
    ///
    /// The map is adopted as-is, so `wrap(k).to_map()` equals `get(k)`.
    pub fn wrap_or(&self, key: &str, default: ConfigMap) -> Result<ConfigTree> {
        match self.get(key)? {
            Some(Value::Object(map)) => Ok(ConfigTree { root: map.clone() }),
            Some(other) => Err(ConfigError::cannot_wrap(key, kind_of(other))),
            None => Ok(ConfigTree { root: default }),
        }
    }

    /// Drop every entry.
    pub fn reset(&mut self) {
        self.root.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// Every leaf as `(dotted path, value)` in tree order.
    ///
    /// Lists and empty maps are leaves; non-empty maps are descended into.
    pub fn leaf_paths(&self) -> Vec<(String, &Value)> {
        let mut leaves = Vec::new();
        collect_leaves(&self.root, "", &mut leaves);
        leaves
    }

    fn lookup(&self, path: &PathKey) -> Option<&Value> {
        let (parents, last) = path.split_last();
        let mut node = &self.root;
        for segment in parents {
            node = node.get(segment.as_str())?.as_object()?;
        }
        node.get(last)
    }
}

/// Run `f` on the map reached by walking `parents`, creating or promoting
/// each step to a map on the way down.
fn with_path<R>(node: &mut ConfigMap, parents: &[String], f: impl FnOnce(&mut ConfigMap) -> R) -> R {
    match parents.split_first() {
        None => f(node),
        Some((segment, rest)) => {
            let mut child = match node.get_mut(segment.as_str()).map(Value::take) {
                Some(Value::Object(map)) => map,
                _ => ConfigMap::new(),
            };
            let out = with_path(&mut child, rest, f);
            node.insert(segment.clone(), Value::Object(child));
            out
        }
    }
}

/// Split map-shaped input into normalized top-level entries.
fn top_level_entries(input: ConfigInput) -> Result<Vec<(String, Value)>> {
    match input {
        ConfigInput::Entries(entries) => entries
            .into_iter()
            .map(|(key, value)| match key {
                EntryKey::Name(name) => {
                    let value = normalize(&name, value)?;
                    Ok((name, value))
                }
                EntryKey::Index(_) => Err(ConfigError::key_must_be_string("", "int")),
                EntryKey::Unsupported(kind) => Err(ConfigError::key_must_be_string("", &kind)),
            })
            .collect(),
        ConfigInput::Tree(tree) => Ok(tree.into_map().into_iter().collect()),
        ConfigInput::Value(Value::Object(map)) => Ok(map.into_iter().collect()),
        ConfigInput::Value(Value::Array(items)) if items.is_empty() => Ok(Vec::new()),
        ConfigInput::Value(Value::Array(_)) => Err(ConfigError::key_must_be_string("", "int")),
        other => Err(ConfigError::invalid_value("", &other.kind())),
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::Bool(_) | Value::Number(_) | Value::String(_))
}

fn collect_leaves<'a>(map: &'a ConfigMap, prefix: &str, out: &mut Vec<(String, &'a Value)>) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::Object(child) if !child.is_empty() => collect_leaves(child, &path, out),
            _ => out.push((path, value)),
        }
    }
}
