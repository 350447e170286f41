//! Rules command implementation.
//!
//! `ignition-lint rules` lists the built-in rules with their default targets.

use crate::cli::args::RulesArgs;
use crate::error::Result;
use crate::lint::{OutputFormat, RuleRegistry};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The rules command implementation.
pub struct RulesCommand {
    args: RulesArgs,
}

impl RulesCommand {
    /// Create a new rules command.
    pub fn new(args: RulesArgs) -> Self {
        Self { args }
    }
}

impl Command for RulesCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let infos = RuleRegistry::with_builtins().describe();

        match self.args.format {
            OutputFormat::Json => {
                let text = serde_json::to_string_pretty(&infos).map_err(anyhow::Error::from)?;
                ui.message(&text);
            }
            OutputFormat::Human => {
                for info in &infos {
                    let targets = if info.target_types.is_empty() {
                        "all".to_string()
                    } else {
                        info.target_types
                            .iter()
                            .map(|t| t.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    };
                    ui.message(&info.name);
                    ui.message(&format!("    {}", info.description));
                    ui.message(&format!("    targets: {}", targets));
                }
            }
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;

    #[test]
    fn lists_rules_with_targets() {
        let mut ui = MockUI::new();
        let result = RulesCommand::new(RulesArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        assert!(ui.has_message("PollingIntervalRule"));
        assert!(ui.has_message("targets: component"));
    }

    #[test]
    fn lists_rules_as_json() {
        let mut ui = MockUI::new();
        RulesCommand::new(RulesArgs {
            format: OutputFormat::Json,
        })
        .execute(&mut ui)
        .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&ui.output()).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 5);
        assert_eq!(parsed[0]["name"], "NamePatternRule");
    }
}
