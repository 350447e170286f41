//! View linting.
//!
//! This module provides view validation through a pluggable rule-based
//! system.
//!
//! # Overview
//!
//! The lint system consists of:
//!
//! - **Rules** - Individual checks over the node model ([`LintRule`] trait)
//! - **Registry** - Builds configured rules by name ([`RuleRegistry`])
//! - **Engine** - Runs rules over one view at a time ([`LintEngine`])
//! - **Diagnostics** - Issue reports located by node path ([`LintDiagnostic`])
//!
//! # Example
//!
//! ```
//! use ignition_lint::config::default_config;
//! use ignition_lint::lint::{LintEngine, RuleRegistry};
//! use ignition_lint::view::flatten;
//! use serde_json::json;
//!
//! let rules = RuleRegistry::with_builtins().build(&default_config()).rules;
//! let mut engine = LintEngine::new(rules);
//!
//! let view = json!({
//!     "custom": { "unusedProp": 1 },
//!     "root": { "meta": { "name": "root" } }
//! });
//! let results = engine.lint(&flatten(&view));
//!
//! assert!(results.has_errors());
//! assert!(results.error_texts()["UnusedCustomPropertiesRule"][0].contains("unusedProp"));
//! ```

pub mod diagnostic;
pub mod engine;
pub mod output;
pub mod registry;
pub mod rule;
pub mod rules;
pub mod schema;
pub mod stats;

pub use diagnostic::LintDiagnostic;
pub use engine::{LintEngine, LintResults};
pub use output::{FileReport, HumanFormatter, JsonFormatter, LintFormatter, OutputFormat, Summary};
pub use registry::{RuleInfo, RuleRegistry, RuleSet};
pub use rule::{LintRule, RuleId, Severity};
pub use rules::{
    BadComponentReferenceRule, NamePatternRule, PollingIntervalRule, PylintScriptRule,
    UnusedCustomPropertiesRule,
};
pub use schema::SchemaGenerator;
pub use stats::{ModelStatistics, RuleCoverage};
