//! Building blocks for driving the Echidna smart-contract fuzzer.
//!
//! - [`runner`]: run an argument vector as a child process and capture its output
//! - [`commands`]: argument vectors for `echidna`, `etheno` and `truffle`
//! - [`config_file`]: the `key: value` configuration format
//! - [`artifacts`]: generated Solidity harnesses and fork-test launchers
//! - [`corpus`]: corpus listing and coverage previews
//! - [`templates`]: property templates
//! - [`response`]: the response envelope returned by every tool

pub mod artifacts;
pub mod commands;
pub mod config_file;
pub mod corpus;
pub mod env_utils;
pub mod identifiers;
pub mod response;
pub mod runner;
pub mod templates;
pub mod toolchain;

pub use commands::{EchidnaRun, TestMode};
pub use config_file::{ConfigValue, EchidnaConfig};
pub use response::{extract_input, ToolMeta, ToolResponse};
pub use runner::{run_command, CommandSpec, InvocationResult, LAUNCH_FAILURE_CODE};
pub use templates::PropertyKind;
pub use toolchain::Toolchain;
