//! Lint command implementation.
//!
//! The `ignition-lint lint` command runs the configured rules over every
//! view file found under the given paths.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::cli::args::LintArgs;
use crate::config::load_config;
use crate::error::Result;
use crate::lint::registry::target_names;
use crate::lint::{
    FileReport, HumanFormatter, JsonFormatter, LintEngine, LintFormatter, ModelStatistics,
    OutputFormat, RuleRegistry,
};
use crate::model::{build_model, Node, NodeType};
use crate::ui::UserInterface;
use crate::view::{discover_views, read_flat, FlatMap, DEFAULT_VIEW_PATTERN};

use super::dispatcher::{Command, CommandResult};

/// The lint command implementation.
pub struct LintCommand {
    working_dir: PathBuf,
    config: Option<PathBuf>,
    args: LintArgs,
}

impl LintCommand {
    /// Create a new lint command.
    pub fn new(working_dir: &Path, args: LintArgs) -> Self {
        Self {
            working_dir: working_dir.to_path_buf(),
            config: None,
            args,
        }
    }

    /// Use an explicit rule config file.
    pub fn with_config(mut self, config: Option<PathBuf>) -> Self {
        self.config = config;
        self
    }

    /// Inputs to search, resolved against the working directory.
    fn inputs(&self) -> Vec<PathBuf> {
        if self.args.paths.is_empty() {
            return vec![self.working_dir.clone()];
        }
        self.args
            .paths
            .iter()
            .map(|p| {
                if p.is_absolute() {
                    p.clone()
                } else {
                    self.working_dir.join(p)
                }
            })
            .collect()
    }

    fn patterns(&self) -> Vec<String> {
        if self.args.files.is_empty() {
            vec![DEFAULT_VIEW_PATTERN.to_string()]
        } else {
            self.args.files.clone()
        }
    }

    /// Path shown in output, relative to the working directory when possible.
    fn display_path(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.working_dir)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }

    /// Node types selected by `--debug-nodes`.
    fn debug_node_types(&self) -> std::result::Result<Option<BTreeSet<NodeType>>, String> {
        let Some(ref raw) = self.args.debug_nodes else {
            return Ok(None);
        };
        if raw.trim() == "all" || raw.trim().is_empty() {
            return Ok(Some(NodeType::ALL.into_iter().collect()));
        }
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<NodeType>)
            .collect::<std::result::Result<BTreeSet<_>, _>>()
            .map(Some)
    }

    fn show_statistics(&self, ui: &mut dyn UserInterface, file: &Path, stats: &ModelStatistics) {
        ui.show_header(&format!("Model statistics for {}", file.display()));
        ui.message(&format!("  Total nodes: {}", stats.total_nodes));
        ui.message("  Node types:");
        for (node_type, count) in &stats.node_types {
            ui.message(&format!("    {}: {}", node_type, count));
        }
        if !stats.components_by_type.is_empty() {
            ui.message("  Components by type:");
            for (component_type, count) in &stats.components_by_type {
                ui.message(&format!("    {}: {}", component_type, count));
            }
        }
        self.show_coverage(ui, stats);
    }

    fn show_coverage(&self, ui: &mut dyn UserInterface, stats: &ModelStatistics) {
        if stats.rule_coverage.is_empty() {
            return;
        }
        ui.message("  Rule coverage:");
        for (rule, coverage) in &stats.rule_coverage {
            let targets: BTreeSet<NodeType> = coverage.target_types.iter().copied().collect();
            let names = if targets.is_empty() {
                "all".to_string()
            } else {
                target_names(&targets).join(", ")
            };
            ui.message(&format!(
                "    {}: {} node(s) [{}]",
                rule, coverage.applicable_nodes, names
            ));
        }
    }

    fn show_nodes(&self, ui: &mut dyn UserInterface, file: &Path, nodes: &[Node]) {
        ui.show_header(&format!("Nodes in {}", file.display()));
        for node in nodes {
            match serde_json::to_string(node) {
                Ok(text) => ui.message(&text),
                Err(e) => ui.warning(&format!("Cannot serialize {}: {}", node.path(), e)),
            }
        }
    }

    /// Lint one parsed file.
    ///
    /// Requested diagnostics are printed first in human mode. In JSON mode
    /// they are attached to the report so stdout stays one document.
    fn lint_file(
        &self,
        ui: &mut dyn UserInterface,
        engine: &mut LintEngine,
        file: &Path,
        flat: &FlatMap,
        debug_types: Option<&BTreeSet<NodeType>>,
    ) -> FileReport {
        if !(self.args.stats_only || self.args.analyze_rules || debug_types.is_some()) {
            return FileReport::linted(file, engine.lint(flat));
        }

        let json = self.args.format == OutputFormat::Json;
        let model = build_model(flat);
        let stats = engine.statistics(&model);
        let results = if self.args.stats_only {
            Default::default()
        } else {
            engine.process(model.nodes(), flat)
        };
        let mut report = FileReport::linted(file, results);

        if let Some(types) = debug_types {
            let nodes: Vec<Node> = model
                .nodes()
                .iter()
                .filter(|n| types.contains(&n.node_type()))
                .cloned()
                .collect();
            if json {
                report = report.with_nodes(nodes);
            } else {
                self.show_nodes(ui, file, &nodes);
            }
        }

        if self.args.stats_only || self.args.analyze_rules {
            if json {
                report = report.with_statistics(stats);
            } else if self.args.stats_only {
                self.show_statistics(ui, file, &stats);
            } else {
                ui.show_header(&format!("Rule analysis for {}", file.display()));
                self.show_coverage(ui, &stats);
            }
        }

        report
    }

    fn format_output(&self, ui: &dyn UserInterface, reports: &[FileReport]) -> String {
        let mut output = Vec::new();
        let written = match self.args.format {
            OutputFormat::Json => JsonFormatter::new().format(reports, &mut output),
            OutputFormat::Human => HumanFormatter::new(ui.use_color()).format(reports, &mut output),
        };
        if let Err(e) = written {
            tracing::warn!("Failed to format results: {}", e);
        }
        String::from_utf8_lossy(&output).trim_end().to_string()
    }
}

impl Command for LintCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = match load_config(self.config.as_deref(), &self.working_dir) {
            Ok(config) => config,
            Err(e) => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(2));
            }
        };

        let debug_types = match self.debug_node_types() {
            Ok(types) => types,
            Err(e) => {
                ui.error(&e);
                return Ok(CommandResult::failure(2));
            }
        };

        let rule_set = RuleRegistry::with_builtins().build(&config);
        for skipped in &rule_set.skipped {
            ui.warning(&format!("Skipping rule '{}': {}", skipped.name, skipped.reason));
        }
        ui.detail(&format!("Enabled rules: {}", rule_set.names().join(", ")));
        if rule_set.rules.is_empty() {
            ui.warning("No rules enabled");
        }

        let files = match discover_views(&self.inputs(), &self.patterns()) {
            Ok(files) => files,
            Err(e) => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(2));
            }
        };
        if files.is_empty() {
            ui.warning("No view files found");
            return Ok(CommandResult::success());
        }
        ui.detail(&format!("Linting {} file(s)", files.len()));

        let mut engine = LintEngine::new(rule_set.rules);
        let mut reports = Vec::with_capacity(files.len());
        for path in &files {
            let shown = self.display_path(path);
            let report = match read_flat(path) {
                Ok(flat) => self.lint_file(ui, &mut engine, &shown, &flat, debug_types.as_ref()),
                Err(e) => {
                    tracing::debug!("Cannot lint {}: {}", path.display(), e);
                    FileReport::failed(&shown, e.to_string())
                }
            };
            reports.push(report);
        }

        if !self.args.stats_only || self.args.format == OutputFormat::Json {
            let output = self.format_output(ui, &reports);
            ui.message(&output);
        } else {
            for report in reports.iter().filter(|r| r.error.is_some()) {
                ui.error(&format!(
                    "{}: {}",
                    report.file.display(),
                    report.error.as_deref().unwrap_or_default()
                ));
            }
        }

        if reports.iter().any(FileReport::has_errors) {
            Ok(CommandResult::failure(1))
        } else {
            Ok(CommandResult::success())
        }
    }
}
