//! Error types for ignition-lint operations.
//!
//! This module defines [`LintError`], the error type used throughout the
//! crate, and a [`Result`] alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Input problems (missing view, malformed JSON) are fatal for one document only
//! - Rule configuration problems skip the offending rule
//! - Use `anyhow::Error` (via `LintError::Other`) at subprocess and temp-file boundaries

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for ignition-lint operations.
#[derive(Debug, Error)]
pub enum LintError {
    /// Rule configuration file not found.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Rule configuration file is not valid JSON.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Rule configuration has the wrong shape.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// View document not found.
    #[error("View not found: {path}")]
    DocumentNotFound { path: PathBuf },

    /// View document is not valid JSON.
    #[error("Invalid JSON in {path}: {message}")]
    InvalidDocument { path: PathBuf, message: String },

    /// A rule could not be built from its kwargs.
    #[error("Invalid file pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Invalid configuration for rule '{rule}': {message}")]
    RuleConfig { rule: String, message: String },

    /// The external script analyzer could not be run.
    #[error("Script analyzer failed: {message}")]
    AnalyzerFailed { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for ignition-lint operations.
pub type Result<T> = std::result::Result<T, LintError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_not_found_displays_path() {
        let err = LintError::ConfigNotFound {
            path: PathBuf::from("/foo/rule_config.json"),
        };
        assert!(err.to_string().contains("/foo/rule_config.json"));
    }

    #[test]
    fn config_parse_error_displays_path_and_message() {
        let err = LintError::ConfigParseError {
            path: PathBuf::from("/rule_config.json"),
            message: "expected value".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/rule_config.json"));
        assert!(msg.contains("expected value"));
    }

    #[test]
    fn invalid_document_displays_path_and_message() {
        let err = LintError::InvalidDocument {
            path: PathBuf::from("views/Main/view.json"),
            message: "trailing comma".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("views/Main/view.json"));
        assert!(msg.contains("trailing comma"));
    }

    #[test]
    fn rule_config_displays_rule_and_message() {
        let err = LintError::RuleConfig {
            rule: "NamePatternRule".into(),
            message: "unknown field `colour`".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("NamePatternRule"));
        assert!(msg.contains("colour"));
    }

    #[test]
    fn analyzer_failed_displays_message() {
        let err = LintError::AnalyzerFailed {
            message: "pylint not found".into(),
        };
        assert!(err.to_string().contains("pylint not found"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: LintError = io_err.into();
        assert!(matches!(err, LintError::Io(_)));
    }

    #[test]
    fn anyhow_error_converts_to_other() {
        let err: LintError = anyhow::anyhow!("temp file vanished").into();
        assert!(matches!(err, LintError::Other(_)));
        assert_eq!(err.to_string(), "temp file vanished");
    }
}
