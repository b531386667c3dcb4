//! External binaries driven by the tools.

use serde::{Deserialize, Serialize};

use crate::env_utils::env_string_or;

pub const ECHIDNA_BIN_ENV: &str = "ECHIDNA_BIN";
pub const ETHENO_BIN_ENV: &str = "ETHENO_BIN";
pub const TRUFFLE_BIN_ENV: &str = "TRUFFLE_BIN";

/// Program names (or paths) for the external fuzzer and its helpers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toolchain {
    pub echidna: String,
    pub etheno: String,
    pub truffle: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            echidna: "echidna".to_string(),
            etheno: "etheno".to_string(),
            truffle: "truffle".to_string(),
        }
    }
}

impl Toolchain {
    /// Resolve binaries from `ECHIDNA_BIN`, `ETHENO_BIN` and `TRUFFLE_BIN`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            echidna: env_string_or(ECHIDNA_BIN_ENV, &defaults.echidna),
            etheno: env_string_or(ETHENO_BIN_ENV, &defaults.etheno),
            truffle: env_string_or(TRUFFLE_BIN_ENV, &defaults.truffle),
        }
    }

    pub fn with_echidna(mut self, echidna: impl Into<String>) -> Self {
        self.echidna = echidna.into();
        self
    }

    pub fn with_etheno(mut self, etheno: impl Into<String>) -> Self {
        self.etheno = etheno.into();
        self
    }

    pub fn with_truffle(mut self, truffle: impl Into<String>) -> Self {
        self.truffle = truffle.into();
        self
    }
}
