use std::fs;
use std::path::{Path, PathBuf};

use keyhole_api::AuthError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HEADER_NAME: &str = "Authorization";
pub const DEFAULT_SCHEME: &str = "Bearer";
pub const DEFAULT_TOKEN_ENV: &str = "KEYHOLE_TOKEN";

const CONFIG_FILE: &str = "client.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub header_name: String,
    pub scheme: String,
    pub token_env: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            header_name: DEFAULT_HEADER_NAME.to_string(),
            scheme: DEFAULT_SCHEME.to_string(),
            token_env: DEFAULT_TOKEN_ENV.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    header_name: Option<String>,
    scheme: Option<String>,
    token_env: Option<String>,
}

pub fn validate_config(config: &ClientConfig) -> Result<(), AuthError> {
    let name = &config.header_name;
    if name.is_empty() {
        return Err(AuthError::Validation("header_name must not be empty".to_string()));
    }
    if name.chars().any(|c| c.is_whitespace() || c == ':') {
        return Err(AuthError::Validation(format!(
            "header_name {name:?} must not contain whitespace or ':'"
        )));
    }
    if config.scheme.chars().any(char::is_whitespace) {
        return Err(AuthError::Validation(format!(
            "scheme {:?} must not contain whitespace",
            config.scheme
        )));
    }
    Ok(())
}

pub fn default_config_dir() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config").join("keyhole")
    } else {
        PathBuf::from(".keyhole")
    }
}

pub fn load_config_from_dir(dir: &Path) -> Result<ClientConfig, AuthError> {
    load_config_from_file(&dir.join(CONFIG_FILE))
}

pub fn load_config_from_file(path: &Path) -> Result<ClientConfig, AuthError> {
    let content = fs::read_to_string(path)
        .map_err(|e| AuthError::Config(format!("failed to read {}: {e}", path.display())))?;
    let raw: RawConfig = toml::from_str(&content)
        .map_err(|e| AuthError::Config(format!("invalid TOML in {}: {e}", path.display())))?;

    let defaults = ClientConfig::default();
    let config = ClientConfig {
        header_name: raw.header_name.unwrap_or(defaults.header_name),
        scheme: raw.scheme.unwrap_or(defaults.scheme),
        token_env: raw.token_env.unwrap_or(defaults.token_env),
    };
    validate_config(&config)?;
    tracing::debug!(path = %path.display(), "loaded client config");
    Ok(config)
}

/// Write the sample `client.toml` into `dir` unless one already exists.
pub fn write_default_config(dir: &Path) -> Result<PathBuf, AuthError> {
    fs::create_dir_all(dir)
        .map_err(|e| AuthError::Config(format!("failed to create {}: {e}", dir.display())))?;

    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        fs::write(
            &path,
            include_str!("../../../docs/keyhole-cli/examples/client.toml.example"),
        )
        .map_err(|e| AuthError::Config(format!("failed to write {}: {e}", path.display())))?;
    }
    Ok(path)
}
