//! Input structs for MCP tool handlers.
//!
//! Optional fields default to `None`; handlers apply the truthiness rule
//! (empty strings and zero numbers count as absent). The same structs
//! provide the JSON Schema advertised for each tool.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;

use echidna_core::artifacts::AssertionProperty;

use super::ToolName;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RunEchidnaTestInput {
    /// Path to the Solidity file to fuzz.
    pub contract_file: String,
    #[serde(default)]
    pub contract_name: Option<String>,
    #[serde(default)]
    pub config_file: Option<String>,
    /// One of property, assertion, optimization, overflow, exploration.
    #[serde(default)]
    pub test_mode: Option<String>,
    #[serde(default)]
    pub test_limit: Option<u64>,
    #[serde(default)]
    pub seq_len: Option<u64>,
    #[serde(default)]
    pub corpus_dir: Option<String>,
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateEchidnaConfigInput {
    /// Echidna settings written one per line in the order given.
    pub config_params: Map<String, Value>,
    pub output_file: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateSolidityContractInput {
    pub contract_code: String,
    pub output_file: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CorpusDirInput {
    pub corpus_dir: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FilterFunctionsInput {
    pub contract_file: String,
    /// Function signatures such as `Token.burn(uint256)`.
    pub filter_list: Vec<String>,
    #[serde(default = "default_blacklist")]
    pub blacklist: bool,
    #[serde(default = "default_filter_config_file")]
    pub output_config_file: String,
}

fn default_blacklist() -> bool {
    true
}

fn default_filter_config_file() -> String {
    "filter_config.yaml".to_string()
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SetupEndToEndInput {
    pub contract_file: String,
    #[serde(default)]
    pub test_file: Option<String>,
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PropertyTemplateInput {
    pub contract_name: String,
    /// One of boolean, assertion, optimization.
    #[serde(default = "default_property_type")]
    pub property_type: String,
}

fn default_property_type() -> String {
    "boolean".to_string()
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateAssertionContractInput {
    pub contract_to_test: String,
    pub properties: Vec<AssertionProperty>,
    pub output_file: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateForkTestInput {
    pub contract_code: String,
    pub output_file: String,
    /// Endpoint passed to Echidna through `ECHIDNA_RPC_URL`.
    pub rpc_url: String,
    #[serde(default)]
    pub block_number: Option<u64>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct VisualizeCoverageInput {
    pub corpus_dir: String,
    /// `text` or `image`.
    #[serde(default = "default_output_format")]
    pub output_format: String,
}

fn default_output_format() -> String {
    "text".to_string()
}

fn schema_object<T: JsonSchema>() -> Arc<Map<String, Value>> {
    let schema = schemars::schema_for!(T);
    Arc::new(schema.as_object().cloned().unwrap_or_default())
}

/// JSON Schema for the arguments of `tool`.
pub fn input_schema(tool: ToolName) -> Arc<Map<String, Value>> {
    match tool {
        ToolName::RunEchidnaTest => schema_object::<RunEchidnaTestInput>(),
        ToolName::CreateEchidnaConfig => schema_object::<CreateEchidnaConfigInput>(),
        ToolName::CreateSolidityContract => schema_object::<CreateSolidityContractInput>(),
        ToolName::AnalyzeCorpus => schema_object::<CorpusDirInput>(),
        ToolName::FilterFunctions => schema_object::<FilterFunctionsInput>(),
        ToolName::SetupEndToEndTest => schema_object::<SetupEndToEndInput>(),
        ToolName::GeneratePropertyTemplate => schema_object::<PropertyTemplateInput>(),
        ToolName::CreateAssertionContract => schema_object::<CreateAssertionContractInput>(),
        ToolName::CreateForkTest => schema_object::<CreateForkTestInput>(),
        ToolName::VisualizeCoverage => schema_object::<VisualizeCoverageInput>(),
    }
}
