use anyhow::Result;
use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use echidna_core::env_utils::{env_bool_or, env_var_or};

use crate::paths::default_paths;

/// Install a stderr `tracing` subscriber; stdout belongs to the transport.
///
/// `RUST_LOG` takes precedence over `default_filter`. Calling this twice is a no-op.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub enabled: bool,
    pub path: PathBuf,
    pub rotation_mb: u64,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: env_bool_or("ECHIDNA_MCP_LOG_CALLS", true),
            path: default_paths().logs_dir(),
            rotation_mb: env_var_or("ECHIDNA_MCP_LOG_ROTATION_MB", 50),
        }
    }
}

/// Append-only JSONL record of every dispatched tool call.
#[derive(Debug)]
pub struct McpLogger {
    config: Mutex<LogConfig>,
    file: Mutex<Option<File>>,
    file_path: Mutex<Option<PathBuf>>,
}

impl McpLogger {
    pub fn new(config: LogConfig) -> Self {
        Self {
            config: Mutex::new(config),
            file: Mutex::new(None),
            file_path: Mutex::new(None),
        }
    }

    pub fn disabled() -> Self {
        Self::new(LogConfig {
            enabled: false,
            path: PathBuf::new(),
            rotation_mb: 0,
        })
    }

    pub fn config(&self) -> LogConfig {
        self.config.lock().clone()
    }

    pub fn current_file(&self) -> Option<PathBuf> {
        self.file_path.lock().clone()
    }

    pub fn log_tool_call(&self, record: &LogRecord) -> Result<()> {
        let config = self.config.lock().clone();
        if !config.enabled {
            return Ok(());
        }

        fs::create_dir_all(&config.path)?;
        self.rotate_if_needed(&config);

        let mut file_guard = self.file.lock();
        if file_guard.is_none() {
            let file_path = current_log_path(&config);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&file_path)?;
            *file_guard = Some(file);
            *self.file_path.lock() = Some(file_path);
        }

        if let Some(file) = file_guard.as_mut() {
            let line = serde_json::to_string(record)?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }

    fn rotate_if_needed(&self, config: &LogConfig) {
        let current = self.file_path.lock().clone();
        if let Some(path) = current {
            if let Ok(metadata) = fs::metadata(&path) {
                let size_mb = metadata.len() / (1024 * 1024);
                if size_mb >= config.rotation_mb {
                    *self.file.lock() = None;
                    *self.file_path.lock() = None;
                }
            }
        }
    }
}

fn current_log_path(config: &LogConfig) -> PathBuf {
    let ts = Utc::now().format("%Y%m%d-%H%M%S%.3f");
    config.path.join(format!("mcp-{}.jsonl", ts))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub ts: String,
    pub request_id: String,
    pub tool: String,
    pub input: Value,
    pub output: Value,
    pub duration_ms: u128,
    pub success: bool,
    pub error: Option<String>,
    pub reason: Option<String>,
    pub tags: Option<Vec<String>>,
}

const REDACTED: &str = "***redacted***";

fn is_sensitive_key(key: &str) -> bool {
    let key_l = key.to_lowercase();
    key_l.contains("key")
        || key_l.contains("token")
        || key_l.contains("secret")
        || key_l.contains("password")
        || key_l.ends_with("url")
}

pub fn redact_sensitive(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut new_map = serde_json::Map::new();
            for (k, v) in map {
                if is_sensitive_key(k) {
                    new_map.insert(k.clone(), Value::String(REDACTED.to_string()));
                } else {
                    new_map.insert(k.clone(), redact_sensitive(v));
                }
            }
            Value::Object(new_map)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(redact_sensitive).collect()),
        _ => value.clone(),
    }
}

/// String values stored under sensitive keys anywhere in `value`.
pub fn sensitive_values(value: &Value) -> Vec<String> {
    let mut found = Vec::new();
    collect_sensitive(value, &mut found);
    found
}

fn collect_sensitive(value: &Value, found: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                match v {
                    Value::String(s) if is_sensitive_key(k) && !s.is_empty() => {
                        found.push(s.clone())
                    }
                    _ => collect_sensitive(v, found),
                }
            }
        }
        Value::Array(arr) => arr.iter().for_each(|v| collect_sensitive(v, found)),
        _ => {}
    }
}

/// Replace every occurrence of `secrets` inside string values of `value`.
pub fn scrub_values(value: &Value, secrets: &[String]) -> Value {
    match value {
        Value::String(s) => Value::String(scrub_text(s, secrets)),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), scrub_values(v, secrets)))
                .collect(),
        ),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| scrub_values(v, secrets)).collect()),
        _ => value.clone(),
    }
}

pub fn scrub_text(text: &str, secrets: &[String]) -> String {
    secrets
        .iter()
        .fold(text.to_string(), |acc, secret| acc.replace(secret.as_str(), REDACTED))
}
