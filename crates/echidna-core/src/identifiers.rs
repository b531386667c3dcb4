//! Validation for values interpolated into generated Solidity and shell text.
//!
//! ```
//! use echidna_core::identifiers::{safe_identifier, shell_quote};
//!
//! assert!(safe_identifier("Token").is_ok());
//! assert!(safe_identifier("Token\"; selfdestruct").is_err());
//! assert_eq!(shell_quote("https://rpc.example/v1"), "https://rpc.example/v1");
//! assert_eq!(shell_quote("a b"), "'a b'");
//! ```

use anyhow::{bail, Result};

/// Solidity keywords that cannot be used as contract or function names.
const RESERVED: &[&str] = &[
    "abstract", "address", "anonymous", "as", "assembly", "bool", "break", "bytes",
    "calldata", "catch", "constant", "constructor", "continue", "contract", "delete",
    "do", "else", "emit", "enum", "event", "external", "fallback", "false", "for",
    "function", "if", "immutable", "import", "indexed", "interface", "internal", "is",
    "library", "mapping", "memory", "modifier", "new", "override", "payable", "pragma",
    "private", "public", "pure", "receive", "return", "returns", "revert", "storage",
    "string", "struct", "this", "throw", "true", "try", "type", "uint", "int", "using",
    "var", "view", "virtual", "while",
];

/// Check that `name` is a usable Solidity identifier.
pub fn safe_identifier(name: &str) -> Result<&str> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        bail!("Invalid identifier '': must not be empty");
    };
    if !(first.is_ascii_alphabetic() || first == '_' || first == '$') {
        bail!(
            "Invalid identifier '{}': must start with a letter, '_' or '$'",
            name
        );
    }
    if let Some(bad) = chars.find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '$')) {
        bail!("Invalid identifier '{}': unexpected character '{}'", name, bad);
    }
    if RESERVED.contains(&name) {
        bail!("Invalid identifier '{}': reserved word", name);
    }
    Ok(name)
}

/// Check that `condition` can be embedded as `if (!(<condition>))`.
///
/// The expression itself is not parsed; it must stay on one line, contain no
/// statement or block delimiters and keep parentheses and string quotes balanced.
pub fn safe_condition(condition: &str) -> Result<&str> {
    if condition.trim().is_empty() {
        bail!("Invalid condition: must not be empty");
    }
    if condition.contains(['\n', '\r']) {
        bail!("Invalid condition '{}': must be a single line", condition);
    }
    if let Some(bad) = condition.chars().find(|c| matches!(c, ';' | '{' | '}')) {
        bail!("Invalid condition '{}': unexpected '{}'", condition, bad);
    }
    let mut depth = 0i32;
    for c in condition.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    bail!("Invalid condition '{}': unbalanced parentheses", condition);
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        bail!("Invalid condition '{}': unbalanced parentheses", condition);
    }
    if condition.matches('"').count() % 2 != 0 {
        bail!("Invalid condition '{}': unbalanced quotes", condition);
    }
    Ok(condition)
}

/// Quote `value` for a POSIX shell, leaving already-safe words untouched.
pub fn shell_quote(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
    if safe {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}
