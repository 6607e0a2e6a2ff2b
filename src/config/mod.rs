//! Configuration module for Offline-Manual
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use offline_manual::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("manual.toml")).unwrap();
//! println!("Mirroring manual rooted at: {}", config.wiki.root_page);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, ExportConfig, OutputConfig, UserAgentConfig, WikiConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
