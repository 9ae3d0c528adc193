//! Configuration module for Swarmfetch
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so running without a file is the same as running
//! with an empty one.
//!
//! # Example
//!
//! ```no_run
//! use swarmfetch::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("swarmfetch.toml")).unwrap();
//! println!("Engines run up to {} transfers", config.engine.max_concurrent);
//! ```

mod parser;
mod types;
pub mod validation;

// Re-export types
pub use types::{Config, CrawlConfig, EngineConfig, LoadConfig, OutputConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate, validate_for_crawl, validate_for_load};
