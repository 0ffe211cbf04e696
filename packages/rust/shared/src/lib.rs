//! Shared types, error model, and configuration for linkdex.
//!
//! This crate is the foundation depended on by all other linkdex crates.
//! It provides:
//! - [`LinkdexError`] — the unified error type
//! - Domain types ([`BookmarkNode`], [`Outcome`], [`IngestDocument`])
//! - Configuration ([`AppConfig`], [`RunConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DEFAULT_USER_AGENT, DefaultsConfig, IndexConfig, RunConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{LinkdexError, Result};
pub use types::{BookmarkNode, IngestDocument, Outcome, OutcomeStatus, content_hash, host_of};
