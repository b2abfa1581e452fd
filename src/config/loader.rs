// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::model::{BootstrapConfig, RawConfigFile};
use crate::errors::Result;

/// Comma-separated list of exec wrappers, set by the platform.
pub const EXEC_WRAPPER_ENV: &str = "AWS_LAMBDA_EXEC_WRAPPER";
/// Path of an optional TOML config file.
pub const CONFIG_ENV: &str = "ICEBREAK_CONFIG";
pub const MARKER_PATH_ENV: &str = "ICEBREAK_MARKER_PATH";
pub const READY_TOKEN_ENV: &str = "ICEBREAK_READY_TOKEN";
pub const READY_TIMEOUT_ENV: &str = "ICEBREAK_READY_TIMEOUT";

/// Load a configuration file from a given path.
///
/// This only performs TOML deserialization; see [`load_from_env_with`] for
/// the full pipeline.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Overlay `ICEBREAK_*` variables and the wrapper list on top of `raw`.
///
/// Empty variables count as unset. A ready token from the environment
/// replaces whatever matcher the file configured, `ready_pattern` included.
pub fn apply_env<E>(raw: &mut RawConfigFile, env: E)
where
    E: Fn(&str) -> Option<String>,
{
    let get = |key: &str| env(key).filter(|v| !v.trim().is_empty());
    let section = &mut raw.bootstrap;

    if let Some(path) = get(MARKER_PATH_ENV) {
        section.marker_path = Some(path.into());
    }
    if let Some(token) = get(READY_TOKEN_ENV) {
        section.ready_token = Some(token);
        section.ready_pattern = None;
    }
    if let Some(timeout) = get(READY_TIMEOUT_ENV) {
        section.ready_timeout = Some(timeout);
    }
    section.wrappers = get(EXEC_WRAPPER_ENV);
}

/// Build a validated config from `config_file` (if any) and the variables
/// visible through `env`.
///
/// `config_file` takes precedence over `ICEBREAK_CONFIG`. Precedence of the
/// values themselves: environment, then file, then defaults.
pub fn load_from_env_with<E>(config_file: Option<&Path>, env: E) -> Result<BootstrapConfig>
where
    E: Fn(&str) -> Option<String>,
{
    let from_env = env(CONFIG_ENV).filter(|v| !v.trim().is_empty());
    let file = config_file
        .map(Path::to_path_buf)
        .or_else(|| from_env.map(Into::into));

    let mut raw = match file {
        Some(path) => {
            debug!(path = ?path, "loading config file");
            load_from_path(&path)?
        }
        None => RawConfigFile::default(),
    };

    apply_env(&mut raw, env);
    BootstrapConfig::try_from(raw)
}

/// [`load_from_env_with`] over the process environment.
pub fn load_from_env(config_file: Option<&Path>) -> Result<BootstrapConfig> {
    load_from_env_with(config_file, |key| std::env::var(key).ok())
}
