// src/config/mod.rs

//! Configuration loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load an optional file and overlay the environment (`loader.rs`).
//! - Apply defaults and validate (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_from_env, load_from_env_with, load_from_path, EXEC_WRAPPER_ENV};
pub use model::{BootstrapConfig, BootstrapSection, RawConfigFile};
pub use validate::validate_config;
