//! The `{success, result, error, ...}` envelope every tool call ends in.
//!
//! Validation problems, filesystem errors and failing external tools all come
//! back as an envelope with `success: false`. Transport-level errors are
//! reserved for malformed protocol traffic.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResponse {
    pub success: bool,

    /// Tool-specific payload; `null` on failure.
    pub result: Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// `cause_chain` from anyhow, or captured process output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<Value>,

    /// Ignored zero-valued parameters, nonzero exits and similar.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// Wall-clock time of the whole call, stamped by the dispatcher.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl ToolResponse {
    pub fn ok(result: Value) -> Self {
        Self {
            success: true,
            result,
            error: None,
            error_details: None,
            warnings: Vec::new(),
            duration_ms: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            result: Value::Null,
            error: Some(message.into()),
            error_details: None,
            warnings: Vec::new(),
            duration_ms: None,
        }
    }

    /// The outermost context becomes `error`; inner causes go to
    /// `error_details.cause_chain`.
    pub fn from_error(err: &anyhow::Error) -> Self {
        let mut response = Self::error(err.to_string());

        let chain: Vec<String> = err.chain().skip(1).map(|e| e.to_string()).collect();
        if !chain.is_empty() {
            response.error_details = Some(serde_json::json!({
                "cause_chain": chain
            }));
        }

        response
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.error_details = Some(details);
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Envelope as JSON, with empty optional fields left out.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Deserialize tool arguments, turning a mismatch into an `Invalid input`
/// envelope the handler can return as is.
///
/// ```ignore
/// let parsed: CorpusDirInput = match extract_input(input) {
///     Ok(v) => v,
///     Err(e) => return e,
/// };
/// ```
pub fn extract_input<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ToolResponse> {
    serde_json::from_value(value).map_err(|e| ToolResponse::error(format!("Invalid input: {}", e)))
}

/// Caller annotations stripped from `_meta` before dispatch and copied into
/// the call log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Used as the log record's `request_id`; a UUID is generated if absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}
