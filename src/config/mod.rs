//! Rule configuration loading and parsing.
//!
//! - Structures in [`schema`]
//! - File discovery and loading in [`loader`]
//!
//! # Example
//!
//! ```
//! use ignition_lint::config::parse_config;
//! use std::path::Path;
//!
//! let config = parse_config(
//!     r#"{ "PollingIntervalRule": { "kwargs": { "minimum_interval": 5000 } } }"#,
//!     Path::new("rule_config.json"),
//! )
//! .unwrap();
//! assert!(config.rules["PollingIntervalRule"].enabled);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{
    config_from_value, default_config, load_config, load_config_file, parse_config,
    DEFAULT_CONFIG_FILE,
};
pub use schema::{LintConfig, RuleConfig, SkippedRule};
