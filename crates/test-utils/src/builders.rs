#![allow(dead_code)]

use std::path::PathBuf;

use icebreak::config::{BootstrapConfig, BootstrapSection, RawConfigFile};

/// Builder for `BootstrapConfig` to simplify test setup.
pub struct ConfigBuilder {
    raw: RawConfigFile,
    self_path: Option<PathBuf>,
}

impl ConfigBuilder {
    pub fn new(marker_path: impl Into<PathBuf>) -> Self {
        Self {
            raw: RawConfigFile {
                bootstrap: BootstrapSection {
                    marker_path: Some(marker_path.into()),
                    ..BootstrapSection::default()
                },
            },
            self_path: None,
        }
    }

    pub fn wrappers(mut self, list: &str) -> Self {
        self.raw.bootstrap.wrappers = Some(list.to_string());
        self
    }

    pub fn ready_timeout(mut self, timeout: &str) -> Self {
        self.raw.bootstrap.ready_timeout = Some(timeout.to_string());
        self
    }

    pub fn ready_token(mut self, token: &str) -> Self {
        self.raw.bootstrap.ready_token = Some(token.to_string());
        self
    }

    pub fn self_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.self_path = Some(path.into());
        self
    }

    pub fn build(self) -> BootstrapConfig {
        let mut cfg = BootstrapConfig::try_from(self.raw)
            .expect("Failed to build valid config from builder");
        cfg.self_path = self.self_path;
        cfg
    }
}
