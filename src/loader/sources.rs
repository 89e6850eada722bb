//! Source formats and providers.
//!
//! A source file is evaluated by the [`SourceFormat`] registered for its
//! extension. Evaluation yields either a document (a mapping to merge) or a
//! [`ConfigProvider`] that populates a fresh tree programmatically.

use crate::tree::ConfigTree;
use crate::value::ConfigInput;
use anyhow::{Context, Result};
use std::path::Path;

/// Populates a tree by calling `set`/`merge`/`append` on it.
pub trait ConfigProvider {
    fn provide(&self, tree: &mut ConfigTree) -> Result<()>;
}

impl<F> ConfigProvider for F
where
    F: Fn(&mut ConfigTree) -> Result<()>,
{
    fn provide(&self, tree: &mut ConfigTree) -> Result<()> {
        self(tree)
    }
}

/// Outcome of evaluating one source file.
pub enum Evaluated {
    /// A document; must be map-shaped to be accepted as a bundle.
    Document(ConfigInput),
    /// A provider invoked with an empty tree.
    Provider(Box<dyn ConfigProvider>),
}

impl std::fmt::Debug for Evaluated {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Evaluated::Document(input) => f.debug_tuple("Document").field(input).finish(),
            Evaluated::Provider(_) => f.write_str("Provider"),
        }
    }
}

/// Turns the text of a source file into an [`Evaluated`] value.
pub trait SourceFormat: Send + Sync {
    fn evaluate(&self, path: &Path, text: &str) -> Result<Evaluated>;
}

impl<F> SourceFormat for F
where
    F: Fn(&Path, &str) -> Result<Evaluated> + Send + Sync,
{
    fn evaluate(&self, path: &Path, text: &str) -> Result<Evaluated> {
        self(path, text)
    }
}

/// `.yaml` / `.yml` documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFormat;

impl SourceFormat for YamlFormat {
    fn evaluate(&self, path: &Path, text: &str) -> Result<Evaluated> {
        let value: serde_yaml::Value = serde_yaml::from_str(text)
            .with_context(|| format!("invalid YAML in {}", path.display()))?;
        Ok(Evaluated::Document(value.into()))
    }
}

/// `.json` documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl SourceFormat for JsonFormat {
    fn evaluate(&self, path: &Path, text: &str) -> Result<Evaluated> {
        if text.trim().is_empty() {
            return Ok(Evaluated::Document(ConfigInput::null()));
        }
        let value: serde_json::Value = serde_json::from_str(text)
            .with_context(|| format!("invalid JSON in {}", path.display()))?;
        Ok(Evaluated::Document(value.into()))
    }
}

/// `.toml` documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlFormat;

impl SourceFormat for TomlFormat {
    fn evaluate(&self, path: &Path, text: &str) -> Result<Evaluated> {
        let table: toml::Table = text
            .parse()
            .with_context(|| format!("invalid TOML in {}", path.display()))?;
        Ok(Evaluated::Document(toml::Value::Table(table).into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::normalize;
    use serde_json::json;

    fn document(evaluated: Evaluated) -> serde_json::Value {
        match evaluated {
            Evaluated::Document(input) => normalize("", input).unwrap(),
            Evaluated::Provider(_) => panic!("expected a document"),
        }
    }

    #[test]
    fn test_yaml_document() {
        let evaluated = YamlFormat
            .evaluate(Path::new("app.yaml"), "name: app\nports:\n  - 80\n")
            .unwrap();
        assert_eq!(document(evaluated), json!({"name": "app", "ports": [80]}));
    }

    #[test]
    fn test_empty_yaml_is_null() {
        let evaluated = YamlFormat.evaluate(Path::new("empty.yaml"), "").unwrap();
        assert_eq!(document(evaluated), serde_json::Value::Null);
    }

    #[test]
    fn test_json_syntax_error_names_file() {
        let err = JsonFormat
            .evaluate(Path::new("broken.json"), "{\"a\": ")
            .unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_toml_document() {
        let evaluated = TomlFormat
            .evaluate(Path::new("db.toml"), "driver = \"pgsql\"\n[options]\ntimeout = 5\n")
            .unwrap();
        assert_eq!(
            document(evaluated),
            json!({"driver": "pgsql", "options": {"timeout": 5}})
        );
    }

    #[test]
    fn test_closure_provider() {
        let provider = |tree: &mut ConfigTree| -> Result<()> {
            tree.set("ci.foo", "bar")?;
            tree.set("type", "ci")?;
            Ok(())
        };
        let mut tree = ConfigTree::new();
        provider.provide(&mut tree).unwrap();
        assert_eq!(tree.get("ci.foo").unwrap(), Some(&json!("bar")));
    }
}
