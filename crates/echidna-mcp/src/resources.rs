//! The documentation resource and the help prompt.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use echidna_core::env_utils::env_var;

use crate::tools::ToolName;

pub const FEATURES_URI: &str = "resource://echidna-features";
pub const FEATURES_NAME: &str = "echidna-features";
pub const FEATURES_DOC_ENV: &str = "ECHIDNA_FEATURES_DOC";

pub const HELP_PROMPT: &str = "echidna_help";
pub const HELP_QUESTION: &str = "How do I use Echidna with this MCP server?";

/// `ECHIDNA_FEATURES_DOC` when set, else the document shipped with this crate.
pub fn features_doc_path() -> PathBuf {
    env_var::<PathBuf>(FEATURES_DOC_ENV)
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| {
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("docs")
                .join("echidna-features.md")
        })
}

pub fn read_features_doc() -> Result<String> {
    let path = features_doc_path();
    fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Assistant answer for the help prompt.
pub fn help_text() -> String {
    let mut text = String::from(
        "# Echidna MCP Server\n\n\
         This MCP server provides tools for smart contract analysis using the Echidna fuzzer.\n\n\
         ## Available Tools\n\n",
    );
    for (i, tool) in ToolName::ALL.iter().enumerate() {
        text.push_str(&format!("{}. `{}` - {}\n", i + 1, tool, tool.description()));
    }
    text.push_str(
        "\n## Common Usage Patterns\n\n\
         ### Testing a Smart Contract\n\n\
         1. Write the contract and its properties, or generate a harness with \
         `generate_property_template` or `create_assertion_contract`\n\
         2. Run it with `run_echidna_test`\n\
         3. Inspect stdout and the exit code in the result\n\n\
         ### Using Corpus Data\n\n\
         1. Pass `corpus_dir` to `run_echidna_test` (or set `corpusDir` with `create_echidna_config`)\n\
         2. Run tests to collect coverage and reproducers\n\
         3. Summarize them with `analyze_corpus` and `visualize_coverage`\n\n\
         ### End-to-End Testing\n\n\
         1. Record deployment transactions with `setup_end_to_end_test`\n\
         2. Write an E2E.sol contract with properties over the deployed contracts\n\
         3. Run Echidna with the generated `echidna.yaml`\n\n\
         ### Testing with State Forking\n\n\
         1. Create the contract and launcher with `create_fork_test`\n\
         2. Run the launcher script, which exports the RPC settings\n\
         3. Review failures against the live network state\n",
    );
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_lists_every_tool() {
        let text = help_text();
        for tool in ToolName::ALL {
            assert!(text.contains(&format!("`{}`", tool)), "missing {}", tool);
        }
        assert!(text.starts_with("# Echidna MCP Server"));
    }

    #[test]
    fn test_shipped_doc_exists() {
        let default = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("docs")
            .join("echidna-features.md");
        let text = fs::read_to_string(default).unwrap();
        assert!(text.contains("Echidna"));
    }
}
