//! Rule: scripts pass static analysis.
//!
//! Every script in a view is wrapped in its function signature and written
//! into one combined source unit, so the analyzer starts once per view.
//! Reported lines are mapped back to the script they fall in.

pub mod analyzer;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::lint::rule::{LintRule, RuleId, Severity};
use crate::lint::LintDiagnostic;
use crate::model::{NodeType, ScriptNode, Visitor};
use crate::view::FlatMap;

use super::parse_kwargs;

pub use analyzer::{
    parse_output, AnalyzerMessage, AnalyzerOutput, PylintAnalyzer, ScriptAnalyzer, DEFAULT_CHECKS,
};

/// Configured rule name.
pub const RULE_NAME: &str = "PylintScriptRule";

/// Path reported for problems that belong to no single script.
pub const VIEW_PATH: &str = "<view>";

const PREAMBLE: [&str; 6] = [
    "#pylint: disable=unused-argument,missing-docstring,invalid-name,redefined-outer-name",
    "# Globals provided by the Perspective scripting environment",
    "system = None",
    "self = {}",
    "event = {}",
    "",
];

/// Settings for [`PylintScriptRule`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct PylintScriptConfig {
    /// Analyzer executable.
    pub command: String,
    /// pylint message names to enable.
    pub enabled_checks: Vec<String>,
    /// Directory that receives the combined source and raw report.
    pub debug_dir: Option<PathBuf>,
}

impl Default for PylintScriptConfig {
    fn default() -> Self {
        Self {
            command: "pylint".to_string(),
            enabled_checks: DEFAULT_CHECKS.iter().map(|c| c.to_string()).collect(),
            debug_dir: None,
        }
    }
}

/// All scripts of a view as one source unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombinedSource {
    pub text: String,
    /// `(def line, script path)`, ascending.
    starts: Vec<(usize, String)>,
}

impl CombinedSource {
    /// Combine `(path, formatted script)` pairs in order.
    pub fn build<'a>(scripts: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut lines: Vec<String> = PREAMBLE.iter().map(|l| l.to_string()).collect();
        let mut starts = Vec::new();

        for (i, (path, formatted)) in scripts.into_iter().enumerate() {
            lines.push(format!("# Script {}: {}", i + 1, path));
            starts.push((lines.len() + 1, path.to_string()));
            lines.extend(formatted.lines().map(str::to_string));
            lines.push(String::new());
        }

        let mut text = lines.join("\n");
        text.push('\n');
        Self { text, starts }
    }

    /// The script containing combined `line`, and the line relative to its `def`.
    pub fn locate(&self, line: usize) -> Option<(&str, usize)> {
        self.starts
            .iter()
            .rev()
            .find(|(start, _)| *start <= line)
            .map(|(start, path)| (path.as_str(), line - start + 1))
    }

    /// Script paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.starts.iter().map(|(_, path)| path.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }
}

/// Reports static-analysis problems in view scripts.
pub struct PylintScriptRule {
    config: PylintScriptConfig,
    analyzer: Box<dyn ScriptAnalyzer>,
    targets: BTreeSet<NodeType>,
    /// Formatted scripts by path, in visit order.
    scripts: IndexMap<String, String>,
    diagnostics: Vec<LintDiagnostic>,
}

impl PylintScriptRule {
    /// Create the rule with a pylint analyzer built from `config`.
    pub fn new(config: PylintScriptConfig) -> Self {
        let analyzer = PylintAnalyzer::new(config.command.clone(), config.enabled_checks.clone());
        Self::with_analyzer(config, Box::new(analyzer))
    }

    /// Create the rule with a specific analyzer.
    pub fn with_analyzer(config: PylintScriptConfig, analyzer: Box<dyn ScriptAnalyzer>) -> Self {
        Self {
            config,
            analyzer,
            targets: NodeType::SCRIPTS.into_iter().collect(),
            scripts: IndexMap::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Create the rule from configuration kwargs.
    pub fn from_kwargs(kwargs: &Value) -> Result<Self> {
        Ok(Self::new(parse_kwargs(RULE_NAME, kwargs)?))
    }

    fn error(&mut self, path: &str, message: String) {
        self.report(LintDiagnostic::new(self.id(), Severity::Error, path, message));
    }

    fn write_debug_file(dir: &Path, name: &str, contents: &str) {
        let written = fs::create_dir_all(dir).and_then(|_| fs::write(dir.join(name), contents));
        if let Err(e) = written {
            tracing::warn!("Could not write {} to {}: {}", name, dir.display(), e);
        }
    }
}

impl Visitor for PylintScriptRule {
    fn visit_script(&mut self, script: &dyn ScriptNode) {
        self.scripts
            .insert(script.path().to_string(), script.formatted_script());
    }
}

impl LintRule for PylintScriptRule {
    fn id(&self) -> RuleId {
        RuleId::new(RULE_NAME)
    }

    fn description(&self) -> &str {
        "Scripts must not have syntax errors, undefined variables or unused imports"
    }

    fn target_types(&self) -> &BTreeSet<NodeType> {
        &self.targets
    }

    fn diagnostics_mut(&mut self) -> &mut Vec<LintDiagnostic> {
        &mut self.diagnostics
    }

    fn reset(&mut self) {
        self.scripts.clear();
        self.diagnostics.clear();
    }

    fn post_process(&mut self, _flat: &FlatMap) {
        if self.scripts.is_empty() {
            return;
        }

        let source = CombinedSource::build(
            self.scripts
                .iter()
                .map(|(path, script)| (path.as_str(), script.as_str())),
        );
        tracing::debug!("Analyzing {} script(s) in one pass", self.scripts.len());
        if let Some(dir) = &self.config.debug_dir {
            Self::write_debug_file(dir, "combined_scripts.py", &source.text);
        }

        let output = match self.analyzer.analyze(&source.text) {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("Script analysis failed: {}", e);
                let paths: Vec<String> = source.paths().map(str::to_string).collect();
                for path in paths {
                    self.error(&path, format!("Script analysis failed: {}", e));
                }
                return;
            }
        };

        if let Some(dir) = &self.config.debug_dir {
            Self::write_debug_file(dir, "analyzer_output.txt", &output.raw);
        }

        for message in &output.messages {
            match source.locate(message.line) {
                Some((path, line)) => {
                    let text = format!("Line {}: {}", line, message.message);
                    self.error(path, text);
                }
                None => tracing::debug!(
                    "Ignoring analyzer message outside any script at line {}: {}",
                    message.line,
                    message.message
                ),
            }
        }

        if !output.unparsed.is_empty() {
            for line in &output.unparsed {
                tracing::warn!("Unparsed analyzer output: {}", line);
            }
            self.error(
                VIEW_PATH,
                format!(
                    "Could not parse {} line(s) of script analyzer output",
                    output.unparsed.len()
                ),
            );
        }
    }
}
