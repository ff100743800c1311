//! Configuration module for Sitelint
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sitelint::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitelint.toml")).unwrap();
//! println!("Submitting jobs to queue: {}", config.pool.queue);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CheckerConfig, Config, OutputConfig, PollingConfig, PoolBackend, PoolConfig, ServerConfig,
    UserAgentConfig, WorkerConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
