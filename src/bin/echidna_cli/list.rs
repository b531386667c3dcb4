use anyhow::Result;
use clap::Parser;
use serde_json::json;

use echidna_mcp::ToolName;

#[derive(Parser, Debug)]
pub struct ListCmd {}

impl ListCmd {
    pub fn execute(&self, json_output: bool) -> Result<()> {
        if json_output {
            let tools: Vec<_> = ToolName::ALL
                .iter()
                .map(|tool| json!({"name": tool.as_str(), "description": tool.description()}))
                .collect();
            println!("{}", serde_json::to_string_pretty(&tools)?);
            return Ok(());
        }

        let width = ToolName::ALL
            .iter()
            .map(|tool| tool.as_str().len())
            .max()
            .unwrap_or(0);
        for tool in ToolName::ALL {
            println!("{:<width$}  {}", tool.as_str(), tool.description(), width = width);
        }
        Ok(())
    }
}
