//! Value normalization.
//!
//! Anything written into a [`ConfigTree`] crosses the boundary as a
//! [`ConfigInput`] and is normalized into a plain [`ConfigValue`]:
//!
//! - scalars and null are stored as-is
//! - entry lists become a list when their keys are exactly `0..n`, else a map
//! - embedded trees are flattened to their root map
//! - opaque values are rejected with `InvalidValue`

use crate::error::{ConfigError, Result};
use crate::tree::ConfigTree;
use serde_json::{Number, Value};

/// A stored configuration value.
pub type ConfigValue = Value;

/// An insertion-ordered map of configuration values.
pub type ConfigMap = serde_json::Map<String, Value>;

/// Key of one element in an [`ConfigInput::Entries`] collection.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryKey {
    Index(i64),
    Name(String),
    /// A key that is neither a string nor an integer; the payload names its kind.
    Unsupported(String),
}

impl From<&str> for EntryKey {
    fn from(name: &str) -> Self {
        EntryKey::Name(name.to_string())
    }
}

impl From<String> for EntryKey {
    fn from(name: String) -> Self {
        EntryKey::Name(name)
    }
}

impl From<i64> for EntryKey {
    fn from(index: i64) -> Self {
        EntryKey::Index(index)
    }
}

impl From<i32> for EntryKey {
    fn from(index: i32) -> Self {
        EntryKey::Index(i64::from(index))
    }
}

impl From<usize> for EntryKey {
    fn from(index: usize) -> Self {
        EntryKey::Index(index as i64)
    }
}

/// A value at the mutation boundary, before normalization.
#[derive(Debug, Clone)]
pub enum ConfigInput {
    /// An already-normal value.
    Value(ConfigValue),
    /// Another tree; flattened to its root map on write.
    Tree(ConfigTree),
    /// Keyed elements that normalize to a list or a map.
    Entries(Vec<(EntryKey, ConfigInput)>),
    /// Something without tree semantics; the payload names its kind.
    Opaque(String),
}

impl ConfigInput {
    pub fn null() -> Self {
        ConfigInput::Value(Value::Null)
    }

    /// Build keyed entries from any iterator of pairs.
    pub fn entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<EntryKey>,
        V: Into<ConfigInput>,
    {
        ConfigInput::Entries(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    pub fn opaque(kind: impl Into<String>) -> Self {
        ConfigInput::Opaque(kind.into())
    }

    /// Short description of the value's kind, used in error messages.
    pub fn kind(&self) -> String {
        match self {
            ConfigInput::Value(value) => kind_of(value).to_string(),
            ConfigInput::Tree(_) => "tree".to_string(),
            ConfigInput::Entries(_) => "entries".to_string(),
            ConfigInput::Opaque(kind) => kind.clone(),
        }
    }
}

/// Short description of a stored value's kind.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

/// Normalize `input` for storage under `key`.
pub fn normalize(key: &str, input: ConfigInput) -> Result<ConfigValue> {
    match input {
        ConfigInput::Value(value) => Ok(value),
        ConfigInput::Tree(tree) => Ok(Value::Object(tree.into_map())),
        ConfigInput::Entries(entries) => normalize_entries(key, entries),
        ConfigInput::Opaque(kind) => Err(ConfigError::invalid_value(key, &kind)),
    }
}

fn normalize_entries(key: &str, entries: Vec<(EntryKey, ConfigInput)>) -> Result<ConfigValue> {
    let dense = entries
        .iter()
        .enumerate()
        .all(|(position, (entry_key, _))| matches!(entry_key, EntryKey::Index(i) if *i == position as i64));

    if dense {
        let list = entries
            .into_iter()
            .enumerate()
            .map(|(position, (_, value))| normalize(&child_key(key, &position.to_string()), value))
            .collect::<Result<Vec<_>>>()?;
        return Ok(Value::Array(list));
    }

    let mut map = ConfigMap::new();
    for (entry_key, value) in entries {
        let name = match entry_key {
            EntryKey::Index(index) => index.to_string(),
            EntryKey::Name(name) => name,
            EntryKey::Unsupported(kind) => return Err(ConfigError::key_must_be_string(key, &kind)),
        };
        let normalized = normalize(&child_key(key, &name), value)?;
        map.insert(name, normalized);
    }
    Ok(Value::Object(map))
}

fn child_key(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}

// Conversions into the boundary form

impl From<ConfigValue> for ConfigInput {
    fn from(value: ConfigValue) -> Self {
        ConfigInput::Value(value)
    }
}

impl From<ConfigMap> for ConfigInput {
    fn from(map: ConfigMap) -> Self {
        ConfigInput::Value(Value::Object(map))
    }
}

impl From<ConfigTree> for ConfigInput {
    fn from(tree: ConfigTree) -> Self {
        ConfigInput::Tree(tree)
    }
}

impl From<&ConfigTree> for ConfigInput {
    fn from(tree: &ConfigTree) -> Self {
        ConfigInput::Tree(tree.clone())
    }
}

impl From<bool> for ConfigInput {
    fn from(value: bool) -> Self {
        ConfigInput::Value(Value::Bool(value))
    }
}

macro_rules! integer_input {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ConfigInput {
                fn from(value: $ty) -> Self {
                    ConfigInput::Value(Value::from(value))
                }
            }
        )*
    };
}

integer_input!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl From<f64> for ConfigInput {
    fn from(value: f64) -> Self {
        match Number::from_f64(value) {
            Some(number) => ConfigInput::Value(Value::Number(number)),
            None => ConfigInput::opaque("non-finite float"),
        }
    }
}

impl From<f32> for ConfigInput {
    fn from(value: f32) -> Self {
        ConfigInput::from(f64::from(value))
    }
}

impl From<&str> for ConfigInput {
    fn from(value: &str) -> Self {
        ConfigInput::Value(Value::String(value.to_string()))
    }
}

impl From<String> for ConfigInput {
    fn from(value: String) -> Self {
        ConfigInput::Value(Value::String(value))
    }
}

impl<T: Into<ConfigInput>> From<Option<T>> for ConfigInput {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(ConfigInput::null, Into::into)
    }
}

impl<T: Into<ConfigInput>> From<Vec<T>> for ConfigInput {
    fn from(items: Vec<T>) -> Self {
        ConfigInput::Entries(
            items
                .into_iter()
                .enumerate()
                .map(|(index, item)| (EntryKey::Index(index as i64), item.into()))
                .collect(),
        )
    }
}

impl From<serde_yaml::Value> for ConfigInput {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value as Yaml;

        match value {
            Yaml::Null => ConfigInput::null(),
            Yaml::Bool(b) => b.into(),
            Yaml::Number(n) => {
                if let Some(i) = n.as_i64() {
                    i.into()
                } else if let Some(u) = n.as_u64() {
                    u.into()
                } else {
                    n.as_f64().map_or_else(|| ConfigInput::opaque("number"), Into::into)
                }
            }
            Yaml::String(s) => s.into(),
            Yaml::Sequence(items) => items.into(),
            Yaml::Mapping(mapping) if mapping.is_empty() => ConfigMap::new().into(),
            Yaml::Mapping(mapping) => ConfigInput::Entries(
                mapping
                    .into_iter()
                    .map(|(key, value)| (yaml_key(key), value.into()))
                    .collect(),
            ),
            Yaml::Tagged(tagged) => ConfigInput::opaque(format!("tagged value {}", tagged.tag)),
        }
    }
}

fn yaml_key(key: serde_yaml::Value) -> EntryKey {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => EntryKey::Name(s),
        Yaml::Number(n) => match n.as_i64() {
            Some(index) => EntryKey::Index(index),
            None => EntryKey::Unsupported("float".to_string()),
        },
        Yaml::Null => EntryKey::Unsupported("null".to_string()),
        Yaml::Bool(_) => EntryKey::Unsupported("bool".to_string()),
        Yaml::Sequence(_) => EntryKey::Unsupported("list".to_string()),
        Yaml::Mapping(_) => EntryKey::Unsupported("map".to_string()),
        Yaml::Tagged(tagged) => EntryKey::Unsupported(format!("tagged value {}", tagged.tag)),
    }
}

impl From<toml::Value> for ConfigInput {
    fn from(value: toml::Value) -> Self {
        use toml::Value as Toml;

        match value {
            Toml::String(s) => s.into(),
            Toml::Integer(i) => i.into(),
            Toml::Float(f) => f.into(),
            Toml::Boolean(b) => b.into(),
            Toml::Datetime(dt) => dt.to_string().into(),
            Toml::Array(items) => items.into(),
            Toml::Table(table) if table.is_empty() => ConfigMap::new().into(),
            Toml::Table(table) => ConfigInput::entries(table),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;

    #[test]
    fn test_scalars_pass_through() {
        assert_eq!(normalize("k", true.into()).unwrap(), json!(true));
        assert_eq!(normalize("k", 42.into()).unwrap(), json!(42));
        assert_eq!(normalize("k", 1.5.into()).unwrap(), json!(1.5));
        assert_eq!(normalize("k", "text".into()).unwrap(), json!("text"));
        assert_eq!(normalize("k", ConfigInput::null()).unwrap(), Value::Null);
    }

    #[test]
    fn test_dense_indices_become_list() {
        let input = ConfigInput::entries([(0, "a"), (1, "b")]);
        assert_eq!(normalize("k", input).unwrap(), json!(["a", "b"]));
    }

    #[test]
    fn test_sparse_indices_become_map() {
        let input = ConfigInput::entries([(1, "a"), (0, "b")]);
        assert_eq!(normalize("k", input).unwrap(), json!({"1": "a", "0": "b"}));
    }

    #[test]
    fn test_mixed_keys_become_map_in_order() {
        let input = ConfigInput::Entries(vec![
            (EntryKey::Index(0), "zero".into()),
            (EntryKey::Name("name".into()), "named".into()),
        ]);
        let value = normalize("k", input).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["0", "name"]);
    }

    #[test]
    fn test_nested_tree_is_flattened() {
        let mut inner = ConfigTree::new();
        inner.set("x.y", "z").unwrap();
        let input = ConfigInput::entries([("inner", ConfigInput::from(&inner))]);
        assert_eq!(normalize("k", input).unwrap(), json!({"inner": {"x": {"y": "z"}}}));
    }

    #[test]
    fn test_opaque_rejected_with_key_and_kind() {
        let input = ConfigInput::entries([("handler", ConfigInput::opaque("callable"))]);
        let err = normalize("services", input).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidValue);
        let message = err.to_string();
        assert!(message.contains("services.handler"), "{}", message);
        assert!(message.contains("callable"), "{}", message);
    }

    #[test]
    fn test_non_finite_float_rejected() {
        let err = normalize("ratio", f64::NAN.into()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidValue);
    }

    #[test]
    fn test_unsupported_key_rejected() {
        let input = ConfigInput::Entries(vec![(EntryKey::Unsupported("list".into()), "v".into())]);
        let err = normalize("root", input).unwrap_err();
        assert_eq!(err.code(), ErrorCode::KeyMustBeString);
    }

    #[test]
    fn test_yaml_conversion() {
        let yaml: serde_yaml::Value = serde_yaml::from_str(
            "name: app\nports: [80, 443]\n3: three\nempty: {}\n",
        )
        .unwrap();
        let value = normalize("", yaml.into()).unwrap();
        assert_eq!(
            value,
            json!({"name": "app", "ports": [80, 443], "3": "three", "empty": {}})
        );
    }

    #[test]
    fn test_yaml_tagged_value_is_opaque() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("handler: !callable run\n").unwrap();
        let err = normalize("", yaml.into()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidValue);
        assert!(err.to_string().contains("handler"));
    }

    #[test]
    fn test_toml_conversion() {
        let value: toml::Value = toml::from_str("[server]\nport = 8080\nhosts = [\"a\", \"b\"]\n").unwrap();
        let value = normalize("", value.into()).unwrap();
        assert_eq!(value, json!({"server": {"port": 8080, "hosts": ["a", "b"]}}));
    }
}
