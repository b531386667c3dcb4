use async_trait::async_trait;
use parking_lot::Mutex as PlMutex;
use serde_json::{json, Value};
use std::env;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use echidna_core::Toolchain;
use echidna_mcp::logging::{LogConfig, McpLogger};
use echidna_mcp::state::ToolDispatcher;
use echidna_mcp::ProgressReporter;

static TEST_LOCK: Mutex<()> = Mutex::new(());

fn dispatcher(toolchain: Toolchain) -> ToolDispatcher {
    ToolDispatcher::with_parts(toolchain, McpLogger::disabled())
}

fn echo_dispatcher() -> ToolDispatcher {
    dispatcher(Toolchain::default().with_echidna("echo"))
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[derive(Default)]
struct Recorder {
    events: PlMutex<Vec<(String, u32, u32)>>,
}

#[async_trait]
impl ProgressReporter for Recorder {
    async fn report(&self, message: &str, progress: u32, total: u32) {
        self.events
            .lock()
            .push((message.to_string(), progress, total));
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_echidna_test_passes_argv() {
    let response = echo_dispatcher()
        .dispatch(
            "run_echidna_test",
            json!({"contract_file": "A.sol", "test_limit": 1000}),
        )
        .await;
    assert!(response.success, "{:?}", response.error);
    assert_eq!(response.result["stdout"], "A.sol --test-limit 1000\n");
    assert_eq!(response.result["returncode"], 0);
    assert!(response.warnings.is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_echidna_test_drops_zero_and_empty() {
    let response = echo_dispatcher()
        .dispatch(
            "run_echidna_test",
            json!({
                "contract_file": "A.sol",
                "contract_name": "",
                "test_mode": "assertion",
                "test_limit": 0,
                "corpus_dir": "corpus",
            }),
        )
        .await;
    assert!(response.success);
    assert_eq!(
        response.result["stdout"],
        "A.sol --test-mode assertion --corpus-dir corpus\n"
    );
    assert_eq!(response.warnings, vec!["test_limit was 0 and has been ignored"]);
}

#[tokio::test]
async fn test_run_echidna_test_launch_failure() {
    let response = dispatcher(Toolchain::default().with_echidna("/nonexistent/echidna-bin"))
        .dispatch("run_echidna_test", json!({"contract_file": "A.sol"}))
        .await;
    assert!(response.success);
    assert_eq!(response.result["returncode"], -1);
    assert_eq!(response.result["stdout"], "");
    assert!(!response.result["stderr"].as_str().unwrap().is_empty());
    assert_eq!(
        response.warnings,
        vec!["/nonexistent/echidna-bin could not be started"]
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_echidna_test_killed_by_signal() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("A.sol"), "echo partial\nkill -9 $$\n").unwrap();

    let response = dispatcher(Toolchain::default().with_echidna("sh"))
        .dispatch(
            "run_echidna_test",
            json!({"contract_file": "A.sol", "working_dir": path_str(dir.path())}),
        )
        .await;
    assert!(response.success);
    assert_eq!(response.result["returncode"], -9);
    assert_eq!(response.result["signal"], 9);
    assert_eq!(response.result["stdout"], "partial\n");
    assert_eq!(response.warnings, vec!["sh was terminated by signal 9"]);
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_echidna_test_nonzero_exit_is_forwarded() {
    let response = dispatcher(Toolchain::default().with_echidna("false"))
        .dispatch("run_echidna_test", json!({"contract_file": "A.sol"}))
        .await;
    assert!(response.success);
    assert_eq!(response.result["returncode"], 1);
    assert_eq!(response.warnings, vec!["false exited with code 1"]);
}

#[tokio::test]
async fn test_run_echidna_test_rejects_unknown_mode() {
    let response = echo_dispatcher()
        .dispatch(
            "run_echidna_test",
            json!({"contract_file": "A.sol", "test_mode": "fast"}),
        )
        .await;
    assert!(!response.success);
    assert_eq!(
        response.error_message(),
        Some("Unknown test mode: fast. Available modes: property, assertion, optimization, overflow, exploration")
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_echidna_test_reports_progress() {
    let recorder = Recorder::default();
    let response = echo_dispatcher()
        .dispatch_with_progress("run_echidna_test", json!({"contract_file": "A.sol"}), &recorder)
        .await;
    assert!(response.success);
    let events = recorder.events.lock().clone();
    assert_eq!(
        events,
        vec![
            ("Preparing Echidna test...".to_string(), 1, 3),
            ("Running Echidna...".to_string(), 2, 3),
            ("Echidna test completed".to_string(), 3, 3),
        ]
    );
}

#[tokio::test]
async fn test_missing_required_field() {
    let response = echo_dispatcher()
        .dispatch("run_echidna_test", json!({"test_limit": 5}))
        .await;
    assert!(!response.success);
    assert!(response
        .error_message()
        .unwrap()
        .starts_with("Invalid input"));
}

#[tokio::test]
async fn test_create_echidna_config_writes_ordered_lines() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("echidna.yaml");
    let response = echo_dispatcher()
        .dispatch(
            "create_echidna_config",
            json!({
                "config_params": {
                    "testMode": "assertion",
                    "testLimit": 50000,
                    "coverage": true,
                    "filterFunctions": ["A.f()", "A.g(uint256)"],
                },
                "output_file": path_str(&output),
            }),
        )
        .await;
    assert!(response.success, "{:?}", response.error);
    assert_eq!(
        response.result["message"],
        format!("Config file created at {}", output.display())
    );
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "testMode: assertion\ntestLimit: 50000\ncoverage: true\nfilterFunctions: [\"A.f()\",\"A.g(uint256)\"]\n"
    );
}

#[tokio::test]
async fn test_create_echidna_config_rejects_null() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("echidna.yaml");
    let response = echo_dispatcher()
        .dispatch(
            "create_echidna_config",
            json!({
                "config_params": {"seqLen": null},
                "output_file": path_str(&output),
            }),
        )
        .await;
    assert!(!response.success);
    assert!(response.error_message().unwrap().contains("seqLen"));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_create_solidity_contract_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("Token.sol");
    fs::write(&output, "old").unwrap();
    let response = echo_dispatcher()
        .dispatch(
            "create_solidity_contract",
            json!({"contract_code": "contract Token {}", "output_file": path_str(&output)}),
        )
        .await;
    assert!(response.success);
    assert_eq!(fs::read_to_string(&output).unwrap(), "contract Token {}");
}

#[tokio::test]
async fn test_write_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("missing").join("Token.sol");
    let response = echo_dispatcher()
        .dispatch(
            "create_solidity_contract",
            json!({"contract_code": "contract Token {}", "output_file": path_str(&output)}),
        )
        .await;
    assert!(!response.success);
    assert!(response
        .error_message()
        .unwrap()
        .starts_with("Error creating contract file:"));
}

#[tokio::test]
async fn test_filter_functions_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("filter.yaml");
    let response = echo_dispatcher()
        .dispatch(
            "filter_functions",
            json!({
                "contract_file": "Token.sol",
                "filter_list": ["Token.burn(uint256)"],
                "output_config_file": path_str(&output),
            }),
        )
        .await;
    assert!(response.success);
    assert_eq!(response.result["config"]["filterBlacklist"], true);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "filterBlacklist: true\nfilterFunctions: [\"Token.burn(uint256)\"]\n"
    );
}

#[tokio::test]
async fn test_analyze_corpus_missing_dir() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let response = echo_dispatcher()
        .dispatch("analyze_corpus", json!({"corpus_dir": path_str(&missing)}))
        .await;
    assert!(!response.success);
    assert_eq!(
        response.error_message().unwrap(),
        format!("Corpus directory {} does not exist", missing.display())
    );
}

#[tokio::test]
async fn test_analyze_corpus_empty_and_populated() {
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = echo_dispatcher();

    let empty = dispatcher
        .dispatch("analyze_corpus", json!({"corpus_dir": path_str(dir.path())}))
        .await;
    assert!(empty.success);
    assert_eq!(empty.result["coverage_files"], json!([]));
    assert_eq!(empty.result["test_cases"], json!([]));
    assert_eq!(empty.result["reproducers"], json!([]));
    assert_eq!(empty.result["coverage_sample"], Value::Null);

    fs::create_dir_all(dir.path().join("coverage")).unwrap();
    fs::create_dir_all(dir.path().join("reproducers")).unwrap();
    fs::write(dir.path().join("covered.2.txt"), "b").unwrap();
    fs::write(dir.path().join("covered.1.txt"), "*| line\n").unwrap();
    fs::write(dir.path().join("coverage").join("seq1.txt"), "[]").unwrap();
    fs::write(dir.path().join("reproducers").join("bug.txt"), "[]").unwrap();

    let populated = dispatcher
        .dispatch("analyze_corpus", json!({"corpus_dir": path_str(dir.path())}))
        .await;
    assert!(populated.success);
    assert_eq!(
        populated.result["coverage_files"],
        json!(["covered.1.txt", "covered.2.txt"])
    );
    assert_eq!(populated.result["test_cases"], json!(["coverage/seq1.txt"]));
    assert_eq!(populated.result["reproducers"], json!(["reproducers/bug.txt"]));
    assert_eq!(populated.result["coverage_sample"]["sample"], "*| line\n");
    assert_eq!(populated.result["coverage_sample"]["size"], 8);
}

#[tokio::test]
async fn test_visualize_coverage_formats() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("covered.1.txt"), "*| a\n | b\n").unwrap();
    let dispatcher = echo_dispatcher();

    let text = dispatcher
        .dispatch("visualize_coverage", json!({"corpus_dir": path_str(dir.path())}))
        .await;
    assert!(text.success, "{:?}", text.error);
    assert_eq!(text.result["format"], "text");
    assert_eq!(text.result["total_lines"], 2);
    assert_eq!(text.result["covered_lines"], 1);

    let image = dispatcher
        .dispatch(
            "visualize_coverage",
            json!({"corpus_dir": path_str(dir.path()), "output_format": "image"}),
        )
        .await;
    assert!(!image.success);
    assert!(image.error_message().unwrap().contains("not implemented"));

    let svg = dispatcher
        .dispatch(
            "visualize_coverage",
            json!({"corpus_dir": path_str(dir.path()), "output_format": "svg"}),
        )
        .await;
    assert_eq!(
        svg.error_message(),
        Some("Unknown output format: svg. Supported formats: text, image")
    );
}

#[tokio::test]
async fn test_visualize_coverage_without_reports() {
    let dir = tempfile::tempdir().unwrap();
    let response = echo_dispatcher()
        .dispatch("visualize_coverage", json!({"corpus_dir": path_str(dir.path())}))
        .await;
    assert_eq!(
        response.error_message(),
        Some("No coverage files found in corpus directory")
    );
}

#[tokio::test]
async fn test_generate_property_template() {
    let dispatcher = echo_dispatcher();
    for kind in ["boolean", "assertion", "dapptest", "optimization"] {
        let response = dispatcher
            .dispatch(
                "generate_property_template",
                json!({"contract_name": "Vault", "property_type": kind}),
            )
            .await;
        assert!(response.success, "{kind}: {:?}", response.error);
        let template = response.result["template"].as_str().unwrap();
        assert!(template.contains("contract TestVault is Vault"));
        assert_eq!(response.result["property_type"], kind);
    }

    let unknown = dispatcher
        .dispatch(
            "generate_property_template",
            json!({"contract_name": "Vault", "property_type": "fuzzy"}),
        )
        .await;
    assert_eq!(
        unknown.error_message(),
        Some("Unknown property type: fuzzy. Available types: boolean, assertion, dapptest, optimization")
    );
}

#[tokio::test]
async fn test_create_assertion_contract() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("TestToken.sol");
    let dispatcher = echo_dispatcher();

    let response = dispatcher
        .dispatch(
            "create_assertion_contract",
            json!({
                "contract_to_test": "Token",
                "properties": [{"name": "check_supply", "condition": "totalSupply() <= cap"}],
                "output_file": path_str(&output),
            }),
        )
        .await;
    assert!(response.success, "{:?}", response.error);
    let written = fs::read_to_string(&output).unwrap();
    assert_eq!(response.result["contract_code"], written);
    assert!(written.contains("if (!(totalSupply() <= cap))"));

    let rejected = dispatcher
        .dispatch(
            "create_assertion_contract",
            json!({
                "contract_to_test": "Token; selfdestruct",
                "properties": [],
                "output_file": path_str(&dir.path().join("Bad.sol")),
            }),
        )
        .await;
    assert!(!rejected.success);
    assert!(rejected
        .error_message()
        .unwrap()
        .contains("Invalid contract name"));
}

#[tokio::test]
async fn test_create_fork_test_omits_zero_block() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("Fork.sol");
    let response = echo_dispatcher()
        .dispatch(
            "create_fork_test",
            json!({
                "contract_code": "contract Fork {}",
                "output_file": path_str(&output),
                "rpc_url": "https://rpc.example",
                "block_number": 0,
            }),
        )
        .await;
    assert!(response.success, "{:?}", response.error);

    let script_path = dir.path().join("Fork.sh");
    assert_eq!(response.result["script_file"], path_str(&script_path));
    let script = fs::read_to_string(&script_path).unwrap();
    assert!(script.starts_with("#!/bin/bash\n\nexport ECHIDNA_RPC_URL=https://rpc.example\n\n"));
    assert!(!script.contains("ECHIDNA_RPC_BLOCK"));
    assert_eq!(response.result["next_steps"].as_array().unwrap().len(), 3);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&script_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}

#[tokio::test]
async fn test_fork_rpc_url_kept_out_of_call_log() {
    let dir = tempfile::tempdir().unwrap();
    let rpc_url = "https://eth-mainnet.example/v2/sk-live-7f3a";
    let dispatcher = ToolDispatcher::with_parts(
        Toolchain::default(),
        McpLogger::new(LogConfig {
            enabled: true,
            path: dir.path().join("logs"),
            rotation_mb: 50,
        }),
    );
    let response = dispatcher
        .dispatch(
            "create_fork_test",
            json!({
                "contract_code": "contract Fork {}",
                "output_file": path_str(&dir.path().join("Fork.sol")),
                "rpc_url": rpc_url,
                "block_number": 17000000,
            }),
        )
        .await;
    assert!(response.success, "{:?}", response.error);
    assert!(response.to_json().to_string().contains(rpc_url));

    let log = fs::read_to_string(dispatcher.logger().current_file().unwrap()).unwrap();
    assert!(!log.contains(rpc_url), "{}", log);
    let record: Value = serde_json::from_str(log.trim()).unwrap();
    assert_eq!(record["input"]["rpc_url"], "***redacted***");
    assert_eq!(record["input"]["block_number"], 17000000);
}

#[tokio::test]
async fn test_create_echidna_config_is_byte_stable() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("echidna.yaml");
    let input = json!({
        "config_params": {
            "testLimit": 50000,
            "deployer": "0x10000",
            "filterFunctions": ["A.f()", "A.g(uint256)"],
            "coverage": true,
        },
        "output_file": path_str(&output),
    });

    let first = echo_dispatcher()
        .dispatch("create_echidna_config", input.clone())
        .await;
    assert!(first.success, "{:?}", first.error);
    let first_bytes = fs::read(&output).unwrap();

    let second = echo_dispatcher()
        .dispatch("create_echidna_config", input)
        .await;
    assert!(second.success, "{:?}", second.error);
    assert_eq!(fs::read(&output).unwrap(), first_bytes);
    assert_eq!(first.result, second.result);
}

#[cfg(unix)]
#[tokio::test]
async fn test_setup_end_to_end_etheno_failure() {
    let dir = tempfile::tempdir().unwrap();
    let response = dispatcher(Toolchain::default().with_etheno("false"))
        .dispatch(
            "setup_end_to_end_test",
            json!({"contract_file": "Token.sol", "working_dir": path_str(dir.path())}),
        )
        .await;
    assert!(!response.success);
    assert_eq!(response.error_message(), Some("Failed to start Etheno"));
    let details = response.error_details.unwrap();
    assert_eq!(details["etheno_output"]["returncode"], 1);
    assert!(!dir.path().join("echidna.yaml").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_setup_end_to_end_writes_config() {
    let dir = tempfile::tempdir().unwrap();
    let toolchain = Toolchain::default()
        .with_etheno("true")
        .with_truffle("echo");
    let response = dispatcher(toolchain)
        .dispatch(
            "setup_end_to_end_test",
            json!({
                "contract_file": "Token.sol",
                "test_file": "test/deploy.js",
                "working_dir": path_str(dir.path()),
            }),
        )
        .await;
    assert!(response.success, "{:?}", response.error);
    assert_eq!(
        response.result["test_output"]["stdout"],
        "test test/deploy.js --network develop\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("echidna.yaml")).unwrap(),
        "prefix: crytic_\ninitialize: init.json\nallContracts: true\n"
    );
    assert_eq!(response.result["next_steps"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_unknown_tool() {
    let response = echo_dispatcher().dispatch("deploy", json!({})).await;
    assert!(!response.success);
    assert_eq!(response.error_message(), Some("Unknown tool: deploy"));
}

#[tokio::test]
async fn test_call_log_written_under_home() {
    let _guard = TEST_LOCK.lock().unwrap();
    let home = tempfile::tempdir().unwrap();
    env::set_var("ECHIDNA_MCP_HOME", home.path());
    env::remove_var("ECHIDNA_MCP_LOG_CALLS");

    let dispatcher = ToolDispatcher::new();
    let response = dispatcher
        .dispatch(
            "generate_property_template",
            json!({
                "contract_name": "Vault",
                "_meta": {"reason": "smoke", "request_id": "req-42"},
            }),
        )
        .await;
    assert!(response.success);

    let log_file = dispatcher.logger().current_file().unwrap();
    assert!(log_file.starts_with(home.path().join("logs").join("mcp")));
    let line = fs::read_to_string(&log_file).unwrap();
    let record: Value = serde_json::from_str(line.trim()).unwrap();
    assert_eq!(record["tool"], "generate_property_template");
    assert_eq!(record["request_id"], "req-42");
    assert_eq!(record["reason"], "smoke");
    assert!(record["input"].get("_meta").is_none());

    env::remove_var("ECHIDNA_MCP_HOME");
}
