use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, ToolError};

/// Connection and backup settings loaded from a JSON configuration file.
///
/// The password is used as given; decrypting externally managed credentials
/// is the responsibility of whoever writes the file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub username: String,
    pub password: String,
    pub api_url: String,
    pub backup_dir: PathBuf,
    /// Skip TLS certificate verification when talking to the service.
    pub insecure_tls: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            api_url: String::new(),
            backup_dir: PathBuf::from("codelist-backup"),
            insecure_tls: false,
        }
    }
}

impl Config {
    /// Ensures every key needed to reach the service is present, naming the
    /// missing ones.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.username.is_empty() {
            missing.push("username");
        }
        if self.password.is_empty() {
            missing.push("password");
        }
        if self.api_url.is_empty() {
            missing.push("api_url");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ToolError::Config(format!(
                "missing keys: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Loads and validates the configuration file at `path`.
pub fn load(path: &Path) -> Result<Config> {
    let data = std::fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&data)
        .map_err(|err| ToolError::Config(format!("{}: {err}", path.display())))?;
    config.validate()?;
    Ok(config)
}
