//! The closed set of tools exposed by the server.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    RunEchidnaTest,
    CreateEchidnaConfig,
    CreateSolidityContract,
    AnalyzeCorpus,
    FilterFunctions,
    SetupEndToEndTest,
    GeneratePropertyTemplate,
    CreateAssertionContract,
    CreateForkTest,
    VisualizeCoverage,
}

impl ToolName {
    pub const ALL: [ToolName; 10] = [
        ToolName::RunEchidnaTest,
        ToolName::CreateEchidnaConfig,
        ToolName::CreateSolidityContract,
        ToolName::AnalyzeCorpus,
        ToolName::FilterFunctions,
        ToolName::SetupEndToEndTest,
        ToolName::GeneratePropertyTemplate,
        ToolName::CreateAssertionContract,
        ToolName::CreateForkTest,
        ToolName::VisualizeCoverage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::RunEchidnaTest => "run_echidna_test",
            ToolName::CreateEchidnaConfig => "create_echidna_config",
            ToolName::CreateSolidityContract => "create_solidity_contract",
            ToolName::AnalyzeCorpus => "analyze_corpus",
            ToolName::FilterFunctions => "filter_functions",
            ToolName::SetupEndToEndTest => "setup_end_to_end_test",
            ToolName::GeneratePropertyTemplate => "generate_property_template",
            ToolName::CreateAssertionContract => "create_assertion_contract",
            ToolName::CreateForkTest => "create_fork_test",
            ToolName::VisualizeCoverage => "visualize_coverage",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ToolName::RunEchidnaTest => "Run Echidna on a Solidity contract file",
            ToolName::CreateEchidnaConfig => "Create an Echidna configuration file",
            ToolName::CreateSolidityContract => "Create a Solidity file with provided code",
            ToolName::AnalyzeCorpus => "Analyze an Echidna corpus directory",
            ToolName::FilterFunctions => "Create a config to filter functions for testing",
            ToolName::SetupEndToEndTest => "Set up end-to-end testing with Etheno",
            ToolName::GeneratePropertyTemplate => {
                "Generate template code for various property types"
            }
            ToolName::CreateAssertionContract => {
                "Create a contract with assertion-based properties"
            }
            ToolName::CreateForkTest => {
                "Create a test using state forking from an RPC provider"
            }
            ToolName::VisualizeCoverage => {
                "Visualize code coverage data from an Echidna corpus"
            }
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| format!("Unknown tool: {}", s))
    }
}
