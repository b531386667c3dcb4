use echidna_mcp::logging::init_tracing;
use echidna_mcp::{serve_stdio, ToolDispatcher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("info");
    serve_stdio(ToolDispatcher::new()).await
}
