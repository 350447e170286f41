//! Schema command implementation.
//!
//! `ignition-lint schema` prints the JSON Schema of `rule_config.json`.

use crate::error::Result;
use crate::lint::SchemaGenerator;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The schema command implementation.
#[derive(Default)]
pub struct SchemaCommand;

impl SchemaCommand {
    /// Create a new schema command.
    pub fn new() -> Self {
        Self
    }
}

impl Command for SchemaCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let schema = SchemaGenerator::new().generate();
        let text = serde_json::to_string_pretty(&schema).map_err(anyhow::Error::from)?;
        ui.message(&text);
        Ok(CommandResult::success())
    }
}
