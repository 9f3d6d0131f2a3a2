//! Shared types, error model, and configuration for Jutsudex.
//!
//! This crate is the foundation depended on by all other Jutsudex crates.
//! It provides:
//! - [`JutsudexError`] — the unified error type
//! - Domain types ([`Rank`], [`JutsuRecord`], [`ActivationInfo`], [`RawRecord`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, config_dir, config_file_path, expand_home, init_config,
    load_config, load_config_from,
};
pub use error::{JutsudexError, Result};
pub use types::{ActivationInfo, JutsuRecord, RawActivation, RawDescription, RawRecord, RawSystem, Rank};
