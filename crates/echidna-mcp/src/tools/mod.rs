//! MCP tool implementations.
//!
//! - `registry`: the closed set of tool names
//! - `inputs`: input structs
//! - `handlers`: tool handler implementations

pub(crate) mod handlers;
pub mod inputs;
pub mod registry;

pub use registry::ToolName;
