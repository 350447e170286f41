//! Model statistics and rule coverage.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;

use super::rule::LintRule;
use crate::model::{NodeType, ViewModel};

/// How much of a model one rule will visit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleCoverage {
    /// Declared target types; empty means all.
    pub target_types: Vec<NodeType>,
    /// Nodes in the model the rule applies to.
    pub applicable_nodes: usize,
}

/// Summary of a view model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelStatistics {
    pub total_nodes: usize,
    pub node_types: BTreeMap<NodeType, usize>,
    pub components_by_type: IndexMap<String, usize>,
    pub rule_coverage: IndexMap<String, RuleCoverage>,
}

impl ModelStatistics {
    /// Gather statistics for `model` and the coverage of `rules` over it.
    pub fn collect(model: &ViewModel, rules: &[Box<dyn LintRule>]) -> Self {
        let rule_coverage = rules
            .iter()
            .map(|rule| {
                let targets = rule.target_types();
                let coverage = RuleCoverage {
                    target_types: targets.iter().copied().collect(),
                    applicable_nodes: model
                        .nodes()
                        .iter()
                        .filter(|n| n.applies_to(targets))
                        .count(),
                };
                (rule.id().0, coverage)
            })
            .collect();

        Self {
            total_nodes: model.len(),
            node_types: model.count_by_type(),
            components_by_type: model.components_by_type(),
            rule_coverage,
        }
    }
}
