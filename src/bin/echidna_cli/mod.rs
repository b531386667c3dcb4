//! CLI subcommand implementations for echidna-sandbox

pub mod list;
pub mod tool;
