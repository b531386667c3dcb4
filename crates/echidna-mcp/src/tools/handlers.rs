//! Tool handler implementations.
//!
//! Every handler returns a terminal [`ToolResponse`]; nothing here propagates
//! an error to the transport.

use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::{info, warn};

use echidna_core::artifacts::{assertion_contract_source, fork_test, Artifact};
use echidna_core::commands::{etheno_command, truffle_test_command};
use echidna_core::config_file::{end_to_end_config, filter_config};
use echidna_core::corpus::{self, OutputFormat};
use echidna_core::{
    extract_input, run_command, EchidnaConfig, EchidnaRun, PropertyKind, TestMode, ToolResponse,
};

use crate::progress::ProgressReporter;
use crate::state::ToolDispatcher;
use crate::tools::inputs::*;

const END_TO_END_CONFIG_FILE: &str = "echidna.yaml";

fn failed(action: &str, err: &anyhow::Error) -> ToolResponse {
    ToolResponse::error(format!("Error {}: {:#}", action, err))
}

impl ToolDispatcher {
    pub(crate) async fn run_echidna_test(
        &self,
        input: Value,
        progress: &dyn ProgressReporter,
    ) -> ToolResponse {
        let input: RunEchidnaTestInput = match extract_input(input) {
            Ok(v) => v,
            Err(e) => return e,
        };
        progress.report("Preparing Echidna test...", 1, 3).await;

        let test_mode = match input.test_mode.as_deref().filter(|m| !m.is_empty()) {
            Some(mode) => match mode.parse::<TestMode>() {
                Ok(mode) => Some(mode),
                Err(e) => return ToolResponse::from_error(&e),
            },
            None => None,
        };

        let run = EchidnaRun {
            contract_file: input.contract_file,
            contract_name: input.contract_name,
            config_file: input.config_file,
            test_mode,
            test_limit: input.test_limit,
            seq_len: input.seq_len,
            corpus_dir: input.corpus_dir,
            working_dir: input.working_dir,
        };
        let command = run.command(&self.toolchain);
        info!(command = %command, "running echidna");

        progress.report("Running Echidna...", 2, 3).await;
        let outcome = run_command(&command).await;
        progress.report("Echidna test completed", 3, 3).await;

        let mut warnings: Vec<String> = run
            .ignored_zero_params()
            .into_iter()
            .map(|name| format!("{} was 0 and has been ignored", name))
            .collect();
        if outcome.is_launch_failure() {
            warnings.push(format!("{} could not be started", self.toolchain.echidna));
        } else if let Some(signal) = outcome.signal {
            warnings.push(format!(
                "{} was terminated by signal {}",
                self.toolchain.echidna, signal
            ));
        } else if !outcome.succeeded() {
            warnings.push(format!(
                "{} exited with code {}",
                self.toolchain.echidna, outcome.returncode
            ));
        }

        match serde_json::to_value(&outcome) {
            Ok(result) => ToolResponse::ok(result).with_warnings(warnings),
            Err(e) => ToolResponse::from_error(&e.into()),
        }
    }

    pub(crate) async fn create_echidna_config(
        &self,
        input: Value,
        progress: &dyn ProgressReporter,
    ) -> ToolResponse {
        let input: CreateEchidnaConfigInput = match extract_input(input) {
            Ok(v) => v,
            Err(e) => return e,
        };
        progress.report("Creating Echidna config file...", 1, 2).await;

        let config = match EchidnaConfig::from_json_map(&input.config_params) {
            Ok(config) => config,
            Err(e) => return failed("creating config file", &e),
        };
        if let Err(e) = Artifact::new(&input.output_file, config.render()).write() {
            return failed("creating config file", &e);
        }

        progress.report("Config file created", 2, 2).await;
        ToolResponse::ok(json!({
            "message": format!("Config file created at {}", input.output_file),
            "file_path": input.output_file,
            "entries": config.len(),
        }))
    }

    pub(crate) async fn create_solidity_contract(
        &self,
        input: Value,
        progress: &dyn ProgressReporter,
    ) -> ToolResponse {
        let input: CreateSolidityContractInput = match extract_input(input) {
            Ok(v) => v,
            Err(e) => return e,
        };
        progress.report("Creating Solidity contract file...", 1, 2).await;

        if let Err(e) = Artifact::new(&input.output_file, input.contract_code).write() {
            return failed("creating contract file", &e);
        }

        progress.report("Contract file created", 2, 2).await;
        ToolResponse::ok(json!({
            "message": format!("Contract file created at {}", input.output_file),
            "file_path": input.output_file,
        }))
    }

    pub(crate) async fn analyze_corpus(
        &self,
        input: Value,
        progress: &dyn ProgressReporter,
    ) -> ToolResponse {
        let input: CorpusDirInput = match extract_input(input) {
            Ok(v) => v,
            Err(e) => return e,
        };
        progress.report("Analyzing corpus directory...", 1, 3).await;

        progress.report("Reading corpus files...", 2, 3).await;
        let report = match corpus::analyze_corpus(&input.corpus_dir) {
            Ok(report) => report,
            Err(e) => return ToolResponse::from_error(&e),
        };

        progress.report("Corpus analysis complete", 3, 3).await;
        match serde_json::to_value(&report) {
            Ok(result) => ToolResponse::ok(result),
            Err(e) => failed("analyzing corpus", &e.into()),
        }
    }

    pub(crate) async fn filter_functions(
        &self,
        input: Value,
        progress: &dyn ProgressReporter,
    ) -> ToolResponse {
        let input: FilterFunctionsInput = match extract_input(input) {
            Ok(v) => v,
            Err(e) => return e,
        };
        progress.report("Creating function filter config...", 1, 2).await;

        let config = filter_config(&input.filter_list, input.blacklist);
        if let Err(e) = Artifact::new(&input.output_config_file, config.render()).write() {
            return failed("creating filter config", &e);
        }

        progress.report("Filter config created", 2, 2).await;
        ToolResponse::ok(json!({
            "message": format!("Filter configuration created at {}", input.output_config_file),
            "file_path": input.output_config_file,
            "contract_file": input.contract_file,
            "config": {
                "filterBlacklist": input.blacklist,
                "filterFunctions": input.filter_list,
            },
        }))
    }

    pub(crate) async fn setup_end_to_end_test(
        &self,
        input: Value,
        progress: &dyn ProgressReporter,
    ) -> ToolResponse {
        let input: SetupEndToEndInput = match extract_input(input) {
            Ok(v) => v,
            Err(e) => return e,
        };
        progress
            .report("Setting up Etheno for end-to-end testing...", 1, 4)
            .await;

        let etheno = run_command(&etheno_command(&self.toolchain, input.working_dir.clone())).await;
        if !etheno.succeeded() {
            warn!(returncode = etheno.returncode, "etheno failed to start");
            return ToolResponse::error("Failed to start Etheno")
                .with_details(json!({ "etheno_output": etheno }));
        }

        progress.report("Running test on Ganache...", 2, 4).await;
        let truffle = truffle_test_command(
            &self.toolchain,
            input.test_file.as_deref(),
            input.working_dir.clone(),
        );
        let test_output = run_command(&truffle).await;
        let test_returncode = test_output.returncode;

        progress.report("Creating Echidna config...", 3, 4).await;
        let config_path = match &input.working_dir {
            Some(dir) => dir.join(END_TO_END_CONFIG_FILE),
            None => PathBuf::from(END_TO_END_CONFIG_FILE),
        };
        if let Err(e) = Artifact::new(&config_path, end_to_end_config().render()).write() {
            return failed("creating end-to-end config", &e)
                .with_details(json!({ "etheno_output": etheno, "test_output": test_output }));
        }

        progress.report("End-to-end setup completed", 4, 4).await;
        let mut response = ToolResponse::ok(json!({
            "message": "End-to-end testing setup completed",
            "contract_file": input.contract_file,
            "etheno_output": etheno,
            "test_output": test_output,
            "echidna_config": config_path.to_string_lossy(),
            "next_steps": [
                "Review init.json to find deployed contract addresses",
                "Create an E2E.sol file with properties to test",
                format!(
                    "Run Echidna with: {} . --contract E2E --config {}",
                    self.toolchain.echidna,
                    config_path.display()
                ),
            ],
        }));
        if test_returncode != 0 {
            response = response.with_warning(format!(
                "{} test exited with code {}",
                self.toolchain.truffle, test_returncode
            ));
        }
        response
    }

    pub(crate) async fn generate_property_template(
        &self,
        input: Value,
        progress: &dyn ProgressReporter,
    ) -> ToolResponse {
        let input: PropertyTemplateInput = match extract_input(input) {
            Ok(v) => v,
            Err(e) => return e,
        };
        progress.report("Generating property template...", 1, 2).await;

        let kind = match input.property_type.parse::<PropertyKind>() {
            Ok(kind) => kind,
            Err(e) => return ToolResponse::from_error(&e),
        };
        let template = match kind.render(&input.contract_name) {
            Ok(template) => template,
            Err(e) => return ToolResponse::error(format!("{:#}", e)),
        };

        progress.report("Template generated", 2, 2).await;
        ToolResponse::ok(json!({
            "template": template,
            "property_type": kind.as_str(),
            "usage_notes": kind.usage_notes(),
        }))
    }

    pub(crate) async fn create_assertion_contract(
        &self,
        input: Value,
        progress: &dyn ProgressReporter,
    ) -> ToolResponse {
        let input: CreateAssertionContractInput = match extract_input(input) {
            Ok(v) => v,
            Err(e) => return e,
        };
        progress.report("Creating assertion contract...", 1, 2).await;

        let code = match assertion_contract_source(&input.contract_to_test, &input.properties) {
            Ok(code) => code,
            Err(e) => return failed("creating assertion contract", &e),
        };
        if let Err(e) = Artifact::new(&input.output_file, code.clone()).write() {
            return failed("creating assertion contract", &e);
        }

        progress.report("Assertion contract created", 2, 2).await;
        ToolResponse::ok(json!({
            "message": format!("Assertion contract created at {}", input.output_file),
            "file_path": input.output_file,
            "contract_code": code,
        }))
    }

    pub(crate) async fn create_fork_test(
        &self,
        input: Value,
        progress: &dyn ProgressReporter,
    ) -> ToolResponse {
        let input: CreateForkTestInput = match extract_input(input) {
            Ok(v) => v,
            Err(e) => return e,
        };
        progress.report("Creating state fork test...", 1, 3).await;

        let fork = fork_test(
            &self.toolchain.echidna,
            &input.contract_code,
            &input.output_file,
            &input.rpc_url,
            input.block_number,
        );
        if let Err(e) = fork.contract.write() {
            return failed("creating fork test", &e);
        }
        progress.report("Writing launcher script...", 2, 3).await;
        if let Err(e) = fork.script.write() {
            return failed("creating fork test", &e);
        }

        progress.report("Fork test created", 3, 3).await;
        ToolResponse::ok(json!({
            "message": format!("Fork test created at {}", input.output_file),
            "contract_file": input.output_file,
            "script_file": fork.script.path.to_string_lossy(),
            "next_steps": fork.next_steps,
        }))
    }

    pub(crate) async fn visualize_coverage(
        &self,
        input: Value,
        progress: &dyn ProgressReporter,
    ) -> ToolResponse {
        let input: VisualizeCoverageInput = match extract_input(input) {
            Ok(v) => v,
            Err(e) => return e,
        };
        progress.report("Analyzing coverage data...", 1, 3).await;

        let format = match input.output_format.parse::<OutputFormat>() {
            Ok(format) => format,
            Err(e) => return ToolResponse::from_error(&e),
        };
        if format == OutputFormat::Image {
            progress.report("Image generation not implemented", 3, 3).await;
            return ToolResponse::error(
                "Image visualization not implemented yet. Use text format instead.",
            );
        }

        progress.report("Processing coverage data...", 2, 3).await;
        let view = match corpus::coverage_text(&input.corpus_dir) {
            Ok(view) => view,
            Err(e) => return ToolResponse::from_error(&e),
        };

        progress.report("Coverage visualization complete", 3, 3).await;
        match serde_json::to_value(&view) {
            Ok(result) => ToolResponse::ok(result),
            Err(e) => failed("visualizing coverage", &e.into()),
        }
    }
}
