//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. `ignition-lint <PATHS>` with no
//! subcommand runs `lint`.

pub mod dispatcher;
pub mod lint;
pub mod rules;
pub mod schema;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
