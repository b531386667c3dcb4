//! Argument vectors for the external fuzzer and its end-to-end helpers.
//!
//! Optional parameters follow a truthiness rule: `None`, empty strings and
//! zero numbers never produce a flag.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::runner::CommandSpec;
use crate::toolchain::Toolchain;

/// Echidna `--test-mode` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestMode {
    Property,
    Assertion,
    Optimization,
    Overflow,
    Exploration,
}

impl TestMode {
    pub const ALL: [TestMode; 5] = [
        TestMode::Property,
        TestMode::Assertion,
        TestMode::Optimization,
        TestMode::Overflow,
        TestMode::Exploration,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TestMode::Property => "property",
            TestMode::Assertion => "assertion",
            TestMode::Optimization => "optimization",
            TestMode::Overflow => "overflow",
            TestMode::Exploration => "exploration",
        }
    }
}

impl fmt::Display for TestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TestMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = TestMode::ALL.iter().map(|m| m.as_str()).collect();
                anyhow::anyhow!(
                    "Unknown test mode: {}. Available modes: {}",
                    s,
                    names.join(", ")
                )
            })
    }
}

/// Parameters of a single fuzzing run.
#[derive(Debug, Clone, Default)]
pub struct EchidnaRun {
    pub contract_file: String,
    pub contract_name: Option<String>,
    pub config_file: Option<String>,
    pub test_mode: Option<TestMode>,
    pub test_limit: Option<u64>,
    pub seq_len: Option<u64>,
    pub corpus_dir: Option<String>,
    pub working_dir: Option<PathBuf>,
}

impl EchidnaRun {
    pub fn new(contract_file: impl Into<String>) -> Self {
        Self {
            contract_file: contract_file.into(),
            ..Default::default()
        }
    }

    /// Build `echidna <contract> [--contract ..] [--config ..] [--test-mode ..]
    /// [--test-limit ..] [--seq-len ..] [--corpus-dir ..]`.
    pub fn command(&self, toolchain: &Toolchain) -> CommandSpec {
        CommandSpec::new(&toolchain.echidna)
            .arg(&self.contract_file)
            .flag_opt("--contract", non_empty(&self.contract_name))
            .flag_opt("--config", non_empty(&self.config_file))
            .flag_opt("--test-mode", self.test_mode.map(TestMode::as_str))
            .flag_opt("--test-limit", non_zero(self.test_limit))
            .flag_opt("--seq-len", non_zero(self.seq_len))
            .flag_opt("--corpus-dir", non_empty(&self.corpus_dir))
            .current_dir(self.working_dir.clone())
    }

    /// Names of numeric parameters that were supplied as zero and dropped.
    pub fn ignored_zero_params(&self) -> Vec<&'static str> {
        let mut ignored = Vec::new();
        if self.test_limit == Some(0) {
            ignored.push("test_limit");
        }
        if self.seq_len == Some(0) {
            ignored.push("seq_len");
        }
        ignored
    }
}

/// Etheno launching a Ganache instance and recording transactions to `init.json`.
pub fn etheno_command(toolchain: &Toolchain, working_dir: Option<PathBuf>) -> CommandSpec {
    CommandSpec::new(&toolchain.etheno)
        .args([
            "--ganache",
            "--ganache-args=--miner.blockGasLimit 10000000",
            "-x",
            "init.json",
        ])
        .current_dir(working_dir)
}

/// `truffle test [test_file] --network develop`.
pub fn truffle_test_command(
    toolchain: &Toolchain,
    test_file: Option<&str>,
    working_dir: Option<PathBuf>,
) -> CommandSpec {
    CommandSpec::new(&toolchain.truffle)
        .arg("test")
        .args(test_file.filter(|f| !f.is_empty()))
        .args(["--network", "develop"])
        .current_dir(working_dir)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn non_zero(value: Option<u64>) -> Option<String> {
    value.filter(|v| *v != 0).map(|v| v.to_string())
}
