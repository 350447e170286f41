//! ignition-lint - Lint Ignition Perspective views.
//!
//! Perspective views are stored as `view.json` documents. ignition-lint
//! flattens a view into path/value pairs, rebuilds a typed node model from
//! them, and runs configurable rules over the nodes.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Rule configuration loading
//! - [`error`] - Error types and result aliases
//! - [`lint`] - Rules, the rule engine, and output formatting
//! - [`model`] - Typed node model rebuilt from a flattened view
//! - [`ui`] - Terminal output
//! - [`view`] - Reading, discovering, and flattening view files
//!
//! # Example
//!
//! ```
//! use ignition_lint::model::{build_model, NodeType};
//! use ignition_lint::view::flatten;
//! use serde_json::json;
//!
//! let view = json!({
//!     "root": {
//!         "meta": { "name": "root" },
//!         "children": [{ "meta": { "name": "StartButton" }, "type": "ia.input.button" }]
//!     }
//! });
//! let model = build_model(&flatten(&view));
//!
//! assert_eq!(model.nodes_of_type(NodeType::Component).count(), 2);
//! assert!(model.owner_of("root.root.children[0].StartButton.props.text").is_some());
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod lint;
pub mod model;
pub mod ui;
pub mod view;

pub use error::{LintError, Result};
