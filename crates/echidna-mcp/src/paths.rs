use std::path::PathBuf;

pub const HOME_ENV: &str = "ECHIDNA_MCP_HOME";

#[derive(Debug, Clone)]
pub struct EchidnaPaths {
    base: PathBuf,
}

impl EchidnaPaths {
    pub fn from_base(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base_dir(&self) -> PathBuf {
        self.base.clone()
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.base.join("logs").join("mcp")
    }
}

pub fn default_paths() -> EchidnaPaths {
    let base = std::env::var(HOME_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".echidna-mcp")
        });
    EchidnaPaths::from_base(base)
}
