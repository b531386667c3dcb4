//! echidna-sandbox: run the Echidna MCP tools from the command line
//!
//! Every tool the MCP server exposes can be invoked directly with a JSON
//! input; the printed output is the same response envelope the server returns.
//!
//! ## Example Usage
//!
//! ```bash
//! # List the available tools
//! echidna-sandbox tools
//!
//! # Fuzz a contract
//! echidna-sandbox tool run_echidna_test --input '{"contract_file": "Token.sol", "test_limit": 1000}'
//!
//! # Read the input from a file (or "-" for stdin)
//! echidna-sandbox tool analyze_corpus --file request.json --pretty
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

mod echidna_cli;

use echidna_cli::{list::ListCmd, tool::ToolCmd};
use echidna_mcp::logging::init_tracing;

#[derive(Parser)]
#[command(
    name = "echidna-sandbox",
    author,
    version,
    about = "Command-line access to the Echidna MCP tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Emit JSON: the tool list as a JSON array, tool responses indented
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (debug logging and progress on stderr)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Invoke a single tool with a JSON input
    Tool(ToolCmd),

    /// List the available tools
    Tools(ListCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        command,
        json,
        verbose,
    } = Cli::parse();
    init_tracing(if verbose { "debug" } else { "warn" });

    match command {
        Commands::Tool(cmd) => cmd.execute(json).await,
        Commands::Tools(cmd) => cmd.execute(json),
    }
}
