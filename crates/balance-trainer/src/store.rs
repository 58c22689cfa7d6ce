//! Flat numeric configuration store.
//!
//! Configuration files are nested YAML or JSON documents. The store flattens
//! them into `section.key` paths with `f64` values, which is all the control
//! core ever reads:
//!
//! ```yaml
//! controller:
//!   body_mass_kg: 82
//!   max_amplitude: [35, 35, 25, 25]   # controller.max_amplitude.0 ..3
//! link:
//!   read_enabled: true                # 1.0
//! ```
//!
//! Strings and nulls are rejected; the core has no textual parameters.

use std::collections::BTreeMap;
use std::path::Path;

use balance_errors::{BalanceError, ConfigError, ConfigResult, Result};
use serde_json::Value;
use tracing::debug;

/// Read-only (after load) map of dotted keys to numbers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigStore {
    values: BTreeMap<String, f64>,
}

impl ConfigStore {
    /// Empty store; every lookup falls back to its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML document.
    ///
    /// # Errors
    ///
    /// [`BalanceError::Format`] for malformed input, [`BalanceError::Config`]
    /// for values that are not numbers or booleans.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::new());
        }
        let value: Value = serde_yaml::from_str(text).map_err(|e| BalanceError::format("YAML", e))?;
        Ok(Self::from_value(&value)?)
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// [`BalanceError::Format`] for malformed input, [`BalanceError::Config`]
    /// for values that are not numbers or booleans.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(|e| BalanceError::format("JSON", e))?;
        Ok(Self::from_value(&value)?)
    }

    /// Load a `.yaml`/`.yml`/`.json` file.
    ///
    /// # Errors
    ///
    /// [`BalanceError::Io`] if the file cannot be read,
    /// [`BalanceError::UnsupportedFormat`] for other extensions, or any
    /// parse error.
    pub fn load(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let text =
            std::fs::read_to_string(path).map_err(|source| BalanceError::io(path, source))?;
        let store = match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&text)?,
            "json" => Self::from_json_str(&text)?,
            other => return Err(BalanceError::UnsupportedFormat(other.to_string())),
        };
        debug!(path = %path.display(), keys = store.len(), "Configuration loaded");
        Ok(store)
    }

    fn from_value(value: &Value) -> ConfigResult<Self> {
        let mut store = Self::new();
        match value {
            Value::Null => {}
            Value::Object(_) => flatten("", value, &mut store.values)?,
            other => {
                return Err(ConfigError::invalid_type(
                    "<root>",
                    "mapping",
                    value_kind(other),
                ));
            }
        }
        Ok(store)
    }

    /// Value at `key`, if present.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Value at `key`, or `default` if absent.
    pub fn get_or(&self, key: &str, default: f64) -> f64 {
        self.get(key).unwrap_or(default)
    }

    /// Non-negative integer at `key`, or `default` if absent.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidType`] if the value is fractional, negative or
    /// not finite.
    pub fn get_usize_or(&self, key: &str, default: usize) -> ConfigResult<usize> {
        self.get_u64_or(key, default as u64).and_then(|v| {
            usize::try_from(v).map_err(|e| ConfigError::invalid_type(key, "usize", format!("{v} ({e})")))
        })
    }

    /// Non-negative integer at `key`, or `default` if absent.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidType`] if the value is fractional, negative or
    /// not finite.
    pub fn get_u64_or(&self, key: &str, default: u64) -> ConfigResult<u64> {
        let Some(v) = self.get(key) else {
            return Ok(default);
        };
        if !v.is_finite() || v < 0.0 || v.fract() != 0.0 || v > u64::MAX as f64 {
            return Err(ConfigError::invalid_type(
                key,
                "non-negative integer",
                v.to_string(),
            ));
        }
        Ok(v as u64)
    }

    /// Boolean at `key` (any non-zero value is true), or `default`.
    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get(key).map_or(default, |v| v != 0.0)
    }

    /// Indexed sequence `prefix.0 ..= prefix.{N-1}`; missing elements keep
    /// their default.
    pub fn get_array_or<const N: usize>(&self, prefix: &str, default: [f64; N]) -> [f64; N] {
        let mut out = default;
        for (i, slot) in out.iter_mut().enumerate() {
            if let Some(v) = self.get(&format!("{prefix}.{i}")) {
                *slot = v;
            }
        }
        out
    }

    /// Set or override a value.
    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.values.insert(key.into(), value);
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no key is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

fn join_key(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

fn flatten(prefix: &str, value: &Value, out: &mut BTreeMap<String, f64>) -> ConfigResult<()> {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten(&join_key(prefix, key), child, out)?;
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                flatten(&join_key(prefix, &i.to_string()), child, out)?;
            }
        }
        Value::Number(n) => {
            let v = n
                .as_f64()
                .ok_or_else(|| ConfigError::invalid_type(prefix, "number", n.to_string()))?;
            out.insert(prefix.to_string(), v);
        }
        Value::Bool(b) => {
            out.insert(prefix.to_string(), if *b { 1.0 } else { 0.0 });
        }
        Value::String(_) | Value::Null => {
            return Err(ConfigError::invalid_type(
                prefix,
                "number or bool",
                value_kind(value),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use balance_test_helpers::must;

    #[test]
    fn test_flattens_nested_yaml() {
        let store = must(ConfigStore::from_yaml_str(
            "controller:\n  body_mass_kg: 82\n  max_amplitude: [35, 35, 25.5, 25]\nlink:\n  read_enabled: true\n",
        ));
        assert_eq!(store.get("controller.body_mass_kg"), Some(82.0));
        assert_eq!(store.get("controller.max_amplitude.2"), Some(25.5));
        assert_eq!(store.get("link.read_enabled"), Some(1.0));
        assert_eq!(store.len(), 6);
    }

    #[test]
    fn test_json_matches_yaml() {
        let yaml = must(ConfigStore::from_yaml_str("filter:\n  order: 4\n  high_pass: false\n"));
        let json = must(ConfigStore::from_json_str(
            r#"{"filter": {"order": 4, "high_pass": false}}"#,
        ));
        assert_eq!(yaml, json);
    }

    #[test]
    fn test_rejects_strings() {
        let err = ConfigStore::from_yaml_str("session:\n  name: morning\n");
        assert!(matches!(
            err,
            Err(BalanceError::Config(ConfigError::InvalidType { ref field, .. })) if field == "session.name"
        ));
    }

    #[test]
    fn test_malformed_yaml_is_a_format_error() {
        let err = ConfigStore::from_yaml_str("filter: [1, 2\n");
        assert!(matches!(err, Err(BalanceError::Format { format: "YAML", .. })));
    }

    #[test]
    fn test_rejects_null() {
        let err = ConfigStore::from_json_str(r#"{"filter": {"order": null}}"#);
        assert!(matches!(
            err,
            Err(BalanceError::Config(ConfigError::InvalidType { .. }))
        ));
    }

    #[test]
    fn test_empty_document_is_empty_store() {
        let store = must(ConfigStore::from_yaml_str(""));
        assert!(store.is_empty());
        assert_eq!(store.get_or("filter.order", 2.0), 2.0);
    }

    #[test]
    fn test_rejects_scalar_root() {
        assert!(ConfigStore::from_json_str("42").is_err());
    }

    #[test]
    fn test_integer_lookup() {
        let mut store = ConfigStore::new();
        store.insert("filter.order", 4.0);
        store.insert("controller.derivative_median_window", 2.5);
        store.insert("link.max_unread_messages", -1.0);

        assert_eq!(store.get_usize_or("filter.order", 2), Ok(4));
        assert_eq!(store.get_usize_or("filter.missing", 2), Ok(2));
        assert!(store.get_usize_or("controller.derivative_median_window", 3).is_err());
        assert!(store.get_u64_or("link.max_unread_messages", 64).is_err());
    }

    #[test]
    fn test_array_lookup_keeps_missing_defaults() {
        let mut store = ConfigStore::new();
        store.insert("controller.max_amplitude.1", 12.0);
        let arr = store.get_array_or("controller.max_amplitude", [40.0, 40.0, 30.0, 30.0]);
        assert_eq!(arr, [40.0, 12.0, 30.0, 30.0]);
    }

    #[test]
    fn test_bool_lookup() {
        let mut store = ConfigStore::new();
        store.insert("link.read_enabled", 1.0);
        assert!(store.get_bool_or("link.read_enabled", false));
        assert!(!store.get_bool_or("session.missing", false));
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let dir = must(tempfile::tempdir());
        let path = dir.path().join("trainer.toml");
        must(std::fs::write(&path, "x = 1"));
        assert!(matches!(
            ConfigStore::load(&path),
            Err(BalanceError::UnsupportedFormat(ref ext)) if ext == "toml"
        ));
    }

    #[test]
    fn test_load_yaml_file() {
        let dir = must(tempfile::tempdir());
        let path = dir.path().join("trainer.yml");
        must(std::fs::write(&path, "session:\n  duration_s: 30\n"));
        let store = must(ConfigStore::load(&path));
        assert_eq!(store.get("session.duration_s"), Some(30.0));
    }
}
