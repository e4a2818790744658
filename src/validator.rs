//! Plan validator
//!
//! Runs every check in a fixed order and collects the findings:
//! 1. Agents  - duplicate ids
//! 2. Edges   - dangling `from`/`to`
//! 3. Inputs  - dangling `sourceAgentId`
//! 4. Graph   - first cycle
//! 5. Outputs - unconsumed outputs on non-terminal agents (warnings)
//!
//! Pure and idempotent: the same plan always yields the same findings in
//! the same order. The validator reports; it never edits the plan.

use tracing::debug;

use crate::errors::ValidationResult;
use crate::flow_graph::FlowGraph;
use crate::plan::Plan;
use crate::validators::{
    check_acyclic, check_agent_ids, check_edge_references, check_input_references,
    check_unconsumed_outputs,
};

pub fn validate_plan(plan: &Plan) -> ValidationResult {
    let graph = FlowGraph::from_plan(plan);
    let mut result = ValidationResult::new();

    for issue in check_agent_ids(plan) {
        result.add(issue);
    }
    for issue in check_edge_references(plan, &graph) {
        result.add(issue);
    }
    for issue in check_input_references(plan, &graph) {
        result.add(issue);
    }
    if let Some(issue) = check_acyclic(&graph) {
        result.add(issue);
    }
    for issue in check_unconsumed_outputs(plan) {
        result.add(issue);
    }

    debug!(
        agents = plan.agents.len(),
        edges = plan.edges.len(),
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "validated plan"
    );

    result
}
