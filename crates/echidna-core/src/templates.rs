//! Property templates for the four Echidna testing styles.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::identifiers::safe_identifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Boolean,
    Assertion,
    Dapptest,
    Optimization,
}

impl PropertyKind {
    pub const ALL: [PropertyKind; 4] = [
        PropertyKind::Boolean,
        PropertyKind::Assertion,
        PropertyKind::Dapptest,
        PropertyKind::Optimization,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PropertyKind::Boolean => "boolean",
            PropertyKind::Assertion => "assertion",
            PropertyKind::Dapptest => "dapptest",
            PropertyKind::Optimization => "optimization",
        }
    }

    /// Comma-separated list of every kind, in declaration order.
    pub fn available() -> String {
        let names: Vec<&str> = Self::ALL.iter().map(|k| k.as_str()).collect();
        names.join(", ")
    }

    fn body(self) -> &'static str {
        match self {
            PropertyKind::Boolean => {
                "    function echidna_property_description() public returns (bool) {\n\
                 \x20       // Property logic here\n\
                 \x20       return true; // Property holds\n\
                 \x20   }"
            }
            PropertyKind::Assertion => {
                "    function check_invariant() public {\n\
                 \x20       // Test logic here\n\
                 \x20       assert(true); // Property holds\n\
                 \x20   }"
            }
            PropertyKind::Dapptest => {
                "    function testProperty(uint256 param1) public {\n\
                 \x20       // Test logic with parameters\n\
                 \x20       // Will fail if it reverts (except with \"FOUNDRY::ASSUME\" reason)\n\
                 \x20   }"
            }
            PropertyKind::Optimization => {
                "    function echidna_opt_function() public view returns (int256) {\n\
                 \x20       // Return a value to maximize\n\
                 \x20       return 0;\n\
                 \x20   }"
            }
        }
    }

    /// Usage notes shown alongside the template.
    pub fn usage_notes(self) -> &'static str {
        match self {
            PropertyKind::Boolean => {
                "- Function name must start with 'echidna_'\n\
                 - Must return a boolean (true if property holds)\n\
                 - Side effects are reverted after execution\n\
                 - Will fail if it returns false or reverts"
            }
            PropertyKind::Assertion => {
                "- Use assert() to check conditions\n\
                 - Will fail if assert fails\n\
                 - Can also emit AssertionFailed event to indicate failure\n\
                 - Side effects are preserved"
            }
            PropertyKind::Dapptest => {
                "- Requires one or more arguments\n\
                 - Will fail if execution reverts\n\
                 - Can use \"FOUNDRY::ASSUME\" revert reason to skip invalid inputs\n\
                 - Typically used with stateless testing (--seq-len 1)"
            }
            PropertyKind::Optimization => {
                "- Function name must start with 'echidna_opt_'\n\
                 - Must return an int256 value\n\
                 - Echidna will try to maximize this value\n\
                 - Run with --test-mode optimization"
            }
        }
    }

    /// Render `contract Test<Name> is <Name> { ... }`.
    pub fn render(self, contract_name: &str) -> Result<String> {
        let name = safe_identifier(contract_name)?;
        Ok(format!(
            "contract Test{name} is {name} {{\n{}\n}}",
            self.body()
        ))
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                anyhow!(
                    "Unknown property type: {}. Available types: {}",
                    s,
                    Self::available()
                )
            })
    }
}
