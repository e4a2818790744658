//! Plan checks
//!
//! Each check inspects one aspect of a plan and returns its findings in a
//! deterministic order (agent declaration order, then edge order). Checks
//! never stop early on a bad reference; every finding is reported.

use std::collections::{HashMap, HashSet};

use crate::errors::ValidationIssue;
use crate::flow_graph::FlowGraph;
use crate::plan::Plan;

/// Agent ids must be unique (each duplicate reported once)
pub fn check_agent_ids(plan: &Plan) -> Vec<ValidationIssue> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut issues = Vec::new();

    for agent in &plan.agents {
        let id = agent.id.as_str();
        if !seen.insert(id) && reported.insert(id) {
            issues.push(ValidationIssue::DuplicateAgentId { id: id.to_string() });
        }
    }

    issues
}

/// Both endpoints of every edge must be agents
pub fn check_edge_references(plan: &Plan, graph: &FlowGraph<'_>) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let available = || graph.ids().iter().map(|id| id.to_string()).collect::<Vec<_>>();

    for edge in &plan.edges {
        if !graph.contains(&edge.from) {
            issues.push(ValidationIssue::UnknownEdgeSource {
                from: edge.from.clone(),
                to: edge.to.clone(),
                available: available(),
            });
        }
        if !graph.contains(&edge.to) {
            issues.push(ValidationIssue::UnknownEdgeTarget {
                from: edge.from.clone(),
                to: edge.to.clone(),
                available: available(),
            });
        }
    }

    issues
}

/// Sourced inputs must name an existing agent; root inputs always pass
pub fn check_input_references(plan: &Plan, graph: &FlowGraph<'_>) -> Vec<ValidationIssue> {
    plan.agents
        .iter()
        .flat_map(|agent| {
            agent.inputs.iter().filter_map(move |input| {
                let source = input.source_agent_id.as_deref()?;
                (!graph.contains(source)).then(|| ValidationIssue::UnknownInputSource {
                    agent_id: agent.id.clone(),
                    input: input.name.clone(),
                    source_id: source.to_string(),
                })
            })
        })
        .collect()
}

/// At most one finding: the first cycle the DFS meets
pub fn check_acyclic(graph: &FlowGraph<'_>) -> Option<ValidationIssue> {
    graph.find_cycle().map(|path| ValidationIssue::CycleDetected {
        path: path.into_iter().map(str::to_string).collect(),
    })
}

/// Non-terminal agents should hand off every declared output
///
/// One warning per unconsumed output slot. Terminal agents (no outgoing
/// edges) are exempt: their outputs are the workflow's results.
pub fn check_unconsumed_outputs(plan: &Plan) -> Vec<ValidationIssue> {
    // Dangling edges still make their source non-terminal
    let mut handed_off: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in &plan.edges {
        handed_off
            .entry(edge.from.as_str())
            .or_default()
            .push(edge.data.as_str());
    }

    let mut issues = Vec::new();
    for agent in &plan.agents {
        let Some(data) = handed_off.get(agent.id.as_str()) else {
            continue;
        };
        for output in &agent.outputs {
            if !data.contains(&output.name.as_str()) {
                issues.push(ValidationIssue::UnconsumedOutput {
                    agent_id: agent.id.clone(),
                    output: output.name.clone(),
                });
            }
        }
    }

    issues
}
