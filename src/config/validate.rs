// src/config/validate.rs

use std::path::PathBuf;

use regex::Regex;

use crate::config::model::{BootstrapConfig, RawConfigFile};
use crate::errors::{BootstrapError, Result};
use crate::exec::readiness::parse_duration;
use crate::exec::{ReadinessPolicy, ReadyMatcher};
use crate::guard::DEFAULT_MARKER_PATH;

impl TryFrom<RawConfigFile> for BootstrapConfig {
    type Error = BootstrapError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(raw)
    }
}

/// Apply defaults and check the raw config.
pub fn validate_config(raw: RawConfigFile) -> Result<BootstrapConfig> {
    let section = raw.bootstrap;

    let marker_path = match section.marker_path {
        Some(path) if path.as_os_str().is_empty() => {
            return Err(BootstrapError::ConfigError(
                "[bootstrap].marker_path must not be empty".to_string(),
            ));
        }
        Some(path) => path,
        None => PathBuf::from(DEFAULT_MARKER_PATH),
    };

    let matcher = build_matcher(section.ready_token, section.ready_pattern)?;

    let timeout = match section.ready_timeout.as_deref() {
        None => None,
        Some(s) => {
            let dur = parse_duration(s).map_err(|e| {
                BootstrapError::ConfigError(format!("[bootstrap].ready_timeout: {e}"))
            })?;
            if dur.is_zero() {
                return Err(BootstrapError::ConfigError(
                    "[bootstrap].ready_timeout must be greater than zero".to_string(),
                ));
            }
            Some(dur)
        }
    };

    Ok(BootstrapConfig {
        wrappers: section.wrappers,
        marker_path,
        readiness: ReadinessPolicy { matcher, timeout },
        self_path: None,
    })
}

fn build_matcher(token: Option<String>, pattern: Option<String>) -> Result<ReadyMatcher> {
    if let Some(pattern) = pattern {
        let re = Regex::new(&pattern).map_err(|e| {
            BootstrapError::ConfigError(format!(
                "[bootstrap].ready_pattern '{pattern}' is not a valid regex: {e}"
            ))
        })?;
        return Ok(ReadyMatcher::Pattern(re));
    }

    match token {
        Some(token) if token.is_empty() => Err(BootstrapError::ConfigError(
            "[bootstrap].ready_token must not be empty".to_string(),
        )),
        Some(token) => Ok(ReadyMatcher::Token(token)),
        None => Ok(ReadyMatcher::default()),
    }
}
