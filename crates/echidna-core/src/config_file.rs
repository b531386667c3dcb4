//! Line-oriented `key: value` Echidna configuration files.
//!
//! Booleans render lowercase, numbers as their literal decimal text, strings
//! verbatim and lists as compact JSON arrays on a single line. Values with no
//! rendering (`null`, objects) are rejected instead of being dropped.

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// A single configuration value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Number(Number),
    String(String),
    /// Elements are scalars or nested lists.
    List(Vec<Value>),
}

impl ConfigValue {
    /// Convert a JSON value, rejecting kinds with no config rendering.
    pub fn from_json(key: &str, value: &Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(ConfigValue::Bool(*b)),
            Value::Number(n) => Ok(ConfigValue::Number(n.clone())),
            Value::String(s) => Ok(ConfigValue::String(s.clone())),
            Value::Array(items) => {
                for item in items {
                    check_list_item(key, item)?;
                }
                Ok(ConfigValue::List(items.clone()))
            }
            Value::Null => bail!("Unsupported value for config key '{}': null", key),
            Value::Object(_) => bail!("Unsupported value for config key '{}': object", key),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ConfigValue::Bool(b) => Value::Bool(*b),
            ConfigValue::Number(n) => Value::Number(n.clone()),
            ConfigValue::String(s) => Value::String(s.clone()),
            ConfigValue::List(items) => Value::Array(items.clone()),
        }
    }

    /// Interpret the right-hand side of a `key: value` line.
    pub fn parse(text: &str) -> Self {
        match text {
            "true" => return ConfigValue::Bool(true),
            "false" => return ConfigValue::Bool(false),
            _ => {}
        }
        if text.starts_with('[') {
            if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(text) {
                return ConfigValue::List(items);
            }
        }
        if let Ok(Value::Number(n)) = serde_json::from_str::<Value>(text) {
            return ConfigValue::Number(n);
        }
        ConfigValue::String(text.to_string())
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(b) => write!(f, "{}", b),
            ConfigValue::Number(n) => write!(f, "{}", n),
            ConfigValue::String(s) => f.write_str(s),
            ConfigValue::List(items) => {
                let json = serde_json::to_string(items).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

fn check_list_item(key: &str, item: &Value) -> Result<()> {
    match item {
        Value::Bool(_) | Value::Number(_) | Value::String(_) => Ok(()),
        Value::Array(nested) => nested.iter().try_for_each(|v| check_list_item(key, v)),
        Value::Null | Value::Object(_) => Err(anyhow!(
            "Unsupported list element for config key '{}': {}",
            key,
            item
        )),
    }
}

/// Ordered configuration entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EchidnaConfig {
    entries: Vec<(String, ConfigValue)>,
}

impl EchidnaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object, keeping the object's key order.
    pub fn from_json_map(params: &Map<String, Value>) -> Result<Self> {
        let mut config = Self::new();
        for (key, value) in params {
            config = config.with(key.clone(), ConfigValue::from_json(key, value)?);
        }
        Ok(config)
    }

    pub fn with(mut self, key: impl Into<String>, value: ConfigValue) -> Self {
        self.entries.push((key.into(), value));
        self
    }

    pub fn entries(&self) -> &[(String, ConfigValue)] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render one `key: value` line per entry, each newline-terminated.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(&format!("{}: {}\n", key, value));
        }
        out
    }

    /// Parse text produced by [`EchidnaConfig::render`].
    ///
    /// Blank lines and `#` comments are skipped; lines without a `:` are an error.
    pub fn parse(text: &str) -> Result<Self> {
        let mut config = Self::new();
        for (idx, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let (key, value) = trimmed
                .split_once(':')
                .ok_or_else(|| anyhow!("line {}: expected 'key: value', got '{}'", idx + 1, line))?;
            config = config.with(key.trim(), ConfigValue::parse(value.trim()));
        }
        Ok(config)
    }
}

/// Fixed config written by the end-to-end setup.
pub fn end_to_end_config() -> EchidnaConfig {
    EchidnaConfig::new()
        .with("prefix", ConfigValue::String("crytic_".to_string()))
        .with("initialize", ConfigValue::String("init.json".to_string()))
        .with("allContracts", ConfigValue::Bool(true))
}

/// `filterBlacklist` / `filterFunctions` config.
pub fn filter_config(filter_list: &[String], blacklist: bool) -> EchidnaConfig {
    EchidnaConfig::new()
        .with("filterBlacklist", ConfigValue::Bool(blacklist))
        .with(
            "filterFunctions",
            ConfigValue::List(filter_list.iter().cloned().map(Value::String).collect()),
        )
}
