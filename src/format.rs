//! Output formatting for tree snapshots and single values.

use anyhow::Result;
use serde_json::Value;

/// Output format for the `dump` and `get` commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    /// One `path = json` line per leaf.
    Flat,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "flat" => Ok(OutputFormat::Flat),
            _ => Err(format!(
                "Invalid format '{}'. Valid options: json, yaml, flat",
                s
            )),
        }
    }
}

/// Render `value` found at `prefix` (empty for the whole tree).
pub fn render(value: &Value, prefix: &str, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(value)?)),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        OutputFormat::Flat => format_flat(value, prefix),
    }
}

/// Flatten `value` into `path = json` lines.
///
/// Non-empty maps are descended into; everything else is one line. A scalar
/// at the top with no prefix is printed bare.
pub fn format_flat(value: &Value, prefix: &str) -> Result<String> {
    let mut out = String::new();
    push_flat(&mut out, value, prefix)?;
    Ok(out)
}

fn push_flat(out: &mut String, value: &Value, path: &str) -> Result<()> {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                push_flat(out, child, &child_path)?;
            }
        }
        _ if path.is_empty() => {
            out.push_str(&serde_json::to_string(value)?);
            out.push('\n');
        }
        _ => {
            out.push_str(&format!("{} = {}\n", path, serde_json::to_string(value)?));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_format() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("yml".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert_eq!("flat".parse::<OutputFormat>().unwrap(), OutputFormat::Flat);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_flat_output() {
        let value = json!({"db": {"host": "h", "ports": [1, 2]}, "empty": {}});
        let out = format_flat(&value, "").unwrap();
        assert_eq!(out, "db.host = \"h\"\ndb.ports = [1,2]\nempty = {}\n");

        let out = format_flat(&json!({"host": "h"}), "db").unwrap();
        assert_eq!(out, "db.host = \"h\"\n");
    }

    #[test]
    fn test_yaml_output() {
        let out = render(&json!({"name": "app"}), "", OutputFormat::Yaml).unwrap();
        assert_eq!(out, "name: app\n");
    }
}
