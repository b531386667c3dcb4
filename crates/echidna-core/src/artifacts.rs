//! Generated files: configs, Solidity fixtures and fork-test launchers.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::identifiers::{safe_condition, safe_identifier, shell_quote};

/// A file to be written: destination path plus full text content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub content: String,
    pub executable: bool,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            executable: false,
        }
    }

    pub fn executable(mut self) -> Self {
        self.executable = true;
        self
    }

    /// Write the content, replacing whatever is at the destination.
    pub fn write(&self) -> Result<()> {
        fs::write(&self.path, &self.content)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        if self.executable {
            set_executable(&self.path)?;
        }
        debug!(path = %self.path.display(), bytes = self.content.len(), "wrote artifact");
        Ok(())
    }
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("Failed to mark {} executable", path.display()))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// A named boolean condition turned into an assertion function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct AssertionProperty {
    /// Suffix of the generated `assert_<name>` function.
    pub name: String,
    /// Solidity boolean expression over the contract under test.
    pub condition: String,
}

/// Render a `Test<Contract>` harness that emits `AssertionFailed` for each
/// property whose condition does not hold.
pub fn assertion_contract_source(
    contract_to_test: &str,
    properties: &[AssertionProperty],
) -> Result<String> {
    let base = safe_identifier(contract_to_test).context("Invalid contract name")?;

    let mut code = format!(
        "// SPDX-License-Identifier: MIT\n\
         pragma solidity ^0.8.0;\n\
         \n\
         import \"./{base}.sol\";\n\
         \n\
         contract Test{base} is {base} {{\n\
         \x20   // Define event that Echidna will detect\n\
         \x20   event AssertionFailed(string message);\n\
         \x20   \n"
    );

    for prop in properties {
        let name = safe_identifier(&prop.name).context("Invalid property name")?;
        let condition = safe_condition(&prop.condition)?;
        code.push_str(&format!(
            "    function {name}() public {{\n\
             \x20       if (!({condition})) {{\n\
             \x20           emit AssertionFailed(\"{name} failed\");\n\
             \x20       }}\n\
             \x20   }}\n\
             \x20   \n"
        ));
    }

    code.push('}');
    Ok(code)
}

/// Contract plus launcher script for a test against forked chain state.
#[derive(Debug, Clone)]
pub struct ForkTest {
    pub contract: Artifact,
    pub script: Artifact,
    pub next_steps: Vec<String>,
}

/// Build the fork-test artifacts.
///
/// The launcher lives next to `output_file` with its extension replaced by
/// `.sh`. The block export is emitted only for a nonzero block number.
pub fn fork_test(
    echidna_bin: &str,
    contract_code: &str,
    output_file: &str,
    rpc_url: &str,
    block_number: Option<u64>,
) -> ForkTest {
    let script_path = Path::new(output_file).with_extension("sh");
    let block = block_number.filter(|b| *b != 0);

    let invocation = format!(
        "{} {} --test-mode assertion",
        shell_quote(echidna_bin),
        shell_quote(output_file)
    );

    let mut script = String::from("#!/bin/bash\n\n");
    script.push_str(&format!("export ECHIDNA_RPC_URL={}\n", shell_quote(rpc_url)));
    if let Some(block) = block {
        script.push_str(&format!("export ECHIDNA_RPC_BLOCK={}\n", block));
    }
    script.push('\n');
    script.push_str(&invocation);
    script.push('\n');

    let mut manual = format!("ECHIDNA_RPC_URL={} ", shell_quote(rpc_url));
    if let Some(block) = block {
        manual.push_str(&format!("ECHIDNA_RPC_BLOCK={} ", block));
    }
    manual.push_str(&invocation);

    let next_steps = vec![
        format!("Run the test with: sh {}", script_path.display()),
        "Or manually set environment variables:".to_string(),
        manual,
    ];

    ForkTest {
        contract: Artifact::new(output_file, contract_code),
        script: Artifact::new(script_path, script).executable(),
        next_steps,
    }
}
