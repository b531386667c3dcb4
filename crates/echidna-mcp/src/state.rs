use chrono::Utc;
use serde_json::Value;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use echidna_core::{ToolMeta, Toolchain};

use crate::logging::{
    redact_sensitive, scrub_text, scrub_values, sensitive_values, LogConfig, LogRecord, McpLogger,
};
use crate::progress::{NoProgress, ProgressReporter};
use crate::tools::ToolName;

pub use echidna_core::ToolResponse;

/// Routes tool calls by name. Holds no per-call state.
pub struct ToolDispatcher {
    pub(crate) toolchain: Toolchain,
    logger: McpLogger,
}

impl Default for ToolDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolDispatcher {
    /// Toolchain and call log configured from the environment.
    pub fn new() -> Self {
        Self::with_parts(Toolchain::from_env(), McpLogger::new(LogConfig::default()))
    }

    pub fn with_parts(toolchain: Toolchain, logger: McpLogger) -> Self {
        Self { toolchain, logger }
    }

    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    pub fn logger(&self) -> &McpLogger {
        &self.logger
    }

    pub async fn dispatch(&self, tool: &str, input: Value) -> ToolResponse {
        self.dispatch_with_progress(tool, input, &NoProgress).await
    }

    pub async fn dispatch_with_progress(
        &self,
        tool: &str,
        input: Value,
        progress: &dyn ProgressReporter,
    ) -> ToolResponse {
        let (meta, clean_input) = extract_meta(&input);
        let request_id = meta
            .request_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let start = Instant::now();

        let result = match tool.parse::<ToolName>() {
            Ok(name) => self.dispatch_inner(name, clean_input.clone(), progress).await,
            Err(message) => ToolResponse::error(message),
        };

        let duration_ms = start.elapsed().as_millis();
        let result = result.with_duration(duration_ms as u64);
        info!(
            tool,
            %request_id,
            success = result.success,
            duration_ms = duration_ms as u64,
            "tool call finished"
        );

        let secrets = sensitive_values(&clean_input);
        let record = LogRecord {
            ts: Utc::now().to_rfc3339(),
            request_id,
            tool: tool.to_string(),
            input: redact_sensitive(&clean_input),
            output: scrub_values(&redact_sensitive(&result.to_json()), &secrets),
            duration_ms,
            success: result.success,
            error: result.error.as_deref().map(|e| scrub_text(e, &secrets)),
            reason: meta.reason.clone(),
            tags: meta.tags.clone(),
        };
        if let Err(e) = self.logger.log_tool_call(&record) {
            warn!(error = %e, "failed to write tool call log");
        }

        result
    }

    async fn dispatch_inner(
        &self,
        tool: ToolName,
        input: Value,
        progress: &dyn ProgressReporter,
    ) -> ToolResponse {
        match tool {
            ToolName::RunEchidnaTest => self.run_echidna_test(input, progress).await,
            ToolName::CreateEchidnaConfig => self.create_echidna_config(input, progress).await,
            ToolName::CreateSolidityContract => {
                self.create_solidity_contract(input, progress).await
            }
            ToolName::AnalyzeCorpus => self.analyze_corpus(input, progress).await,
            ToolName::FilterFunctions => self.filter_functions(input, progress).await,
            ToolName::SetupEndToEndTest => self.setup_end_to_end_test(input, progress).await,
            ToolName::GeneratePropertyTemplate => {
                self.generate_property_template(input, progress).await
            }
            ToolName::CreateAssertionContract => {
                self.create_assertion_contract(input, progress).await
            }
            ToolName::CreateForkTest => self.create_fork_test(input, progress).await,
            ToolName::VisualizeCoverage => self.visualize_coverage(input, progress).await,
        }
    }
}

fn extract_meta(input: &Value) -> (ToolMeta, Value) {
    let mut meta = ToolMeta::default();
    if let Value::Object(map) = input {
        if let Some(Value::Object(meta_map)) = map.get("_meta") {
            if let Some(Value::String(reason)) = meta_map.get("reason") {
                meta.reason = Some(reason.clone());
            }
            if let Some(Value::String(req)) = meta_map.get("request_id") {
                meta.request_id = Some(req.clone());
            }
            if let Some(Value::Array(tags)) = meta_map.get("tags") {
                let parsed: Vec<String> = tags
                    .iter()
                    .filter_map(|v| v.as_str().map(|s| s.to_string()))
                    .collect();
                if !parsed.is_empty() {
                    meta.tags = Some(parsed);
                }
            }
        }

        let mut cleaned = map.clone();
        cleaned.remove("_meta");
        return (meta, Value::Object(cleaned));
    }
    (meta, input.clone())
}
