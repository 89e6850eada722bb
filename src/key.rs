//! Path keys: `a.b.c`, `a/b/c` and `a\b\c` all address the same node.

use crate::error::{ConfigError, Result};
use std::fmt;
use std::str::FromStr;

/// Characters that split a raw key into segments.
pub const SEPARATORS: [char; 3] = ['.', '/', '\\'];

/// A parsed, validated path key.
///
/// Always holds at least one segment, and no segment is empty or
/// whitespace-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathKey {
    raw: String,
    segments: Vec<String>,
}

impl PathKey {
    /// Parse a raw key, splitting on any of [`SEPARATORS`].
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(ConfigError::EmptyKey);
        }

        let segments: Vec<String> = raw.split(SEPARATORS).map(str::to_string).collect();

        if segments.is_empty() {
            return Err(ConfigError::invalid_key(raw, "no segments"));
        }

        if segments.iter().any(|segment| segment.trim().is_empty()) {
            return Err(ConfigError::invalid_key(raw, "segments must not be empty"));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Split into the parent segments and the final segment.
    pub fn split_last(&self) -> (&[String], &str) {
        let (last, parents) = self
            .segments
            .split_last()
            .map(|(last, parents)| (last.as_str(), parents))
            .unwrap_or(("", &[]));
        (parents, last)
    }
}

impl FromStr for PathKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
