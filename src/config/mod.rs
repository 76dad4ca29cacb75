//! Configuration module for Ringtone Fetcher
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every key has a default, so the service also runs
//! without any file at all.
//!
//! # Example
//!
//! ```no_run
//! use ringtone_fetcher::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("fetcher.toml")).unwrap();
//! println!("Listening on {}", config.server.bind);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetchConfig, ServerConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
