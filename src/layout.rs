//! Left-to-right leveled layout
//!
//! Algorithm steps:
//! 1. Kahn's algorithm assigns levels: roots are level 0, every other agent
//!    sits one column right of its furthest predecessor
//! 2. Each level is a column at `x = level × (node_width + horizontal_gap)`
//! 3. Agents in a column keep declaration order and are stacked so the
//!    block is centered on `y = 0`
//!
//! Agents on a cycle never reach in-degree 0 and get no position. The
//! layout does not detect or repair that; validate first.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::flow_graph::FlowGraph;
use crate::plan::Plan;

/// Node box and spacing metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub node_width: f64,
    pub node_height: f64,
    pub horizontal_gap: f64,
    pub vertical_gap: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 220.0,
            node_height: 80.0,
            horizontal_gap: 80.0,
            vertical_gap: 40.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Placed agent (top-left corner of its box)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodePosition {
    pub id: String,
    /// Column index
    pub level: usize,
    /// Position within the column, top to bottom
    pub order: usize,
    pub x: f64,
    pub y: f64,
}

impl NodePosition {
    pub fn point(&self) -> Point {
        Point {
            x: self.x,
            y: self.y,
        }
    }
}

/// Edge render descriptor: the two endpoint positions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgePath {
    pub from: String,
    pub to: String,
    pub data: String,
    pub start: Point,
    pub end: Point,
}

/// Positioned view of a plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanLayout {
    /// Positioned agents in declaration order
    nodes: Vec<NodePosition>,
    /// Edges whose endpoints are both positioned, in edge order
    edges: Vec<EdgePath>,
    /// Agents that never reached in-degree 0
    unleveled: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

/// Layout with the default metrics
pub fn plan_to_positions(plan: &Plan) -> PlanLayout {
    PlanLayout::compute(plan, &LayoutConfig::default())
}

impl PlanLayout {
    pub fn compute(plan: &Plan, config: &LayoutConfig) -> Self {
        let graph = FlowGraph::from_plan(plan);
        let levels = assign_levels(&graph);

        // Group by level, preserving declaration order within each column
        let column_count = levels.iter().flatten().max().map_or(0, |&max| max + 1);
        let mut columns: Vec<Vec<usize>> = vec![Vec::new(); column_count];
        for (node, level) in levels.iter().enumerate() {
            if let Some(level) = level {
                columns[*level].push(node);
            }
        }

        let column_step = config.node_width + config.horizontal_gap;
        let row_step = config.node_height + config.vertical_gap;
        let mut placed: Vec<Option<NodePosition>> = vec![None; graph.len()];

        for (level, column) in columns.iter().enumerate() {
            let n = column.len() as f64;
            let total_height = n * config.node_height + (n - 1.0) * config.vertical_gap;
            let top = -total_height / 2.0;
            let x = level as f64 * column_step;

            for (order, &node) in column.iter().enumerate() {
                placed[node] = Some(NodePosition {
                    id: graph.ids()[node].to_string(),
                    level,
                    order,
                    x,
                    y: top + order as f64 * row_step,
                });
            }
        }

        let mut unleveled = Vec::new();
        let mut nodes = Vec::with_capacity(graph.len());
        for (node, position) in placed.into_iter().enumerate() {
            match position {
                Some(position) => nodes.push(position),
                None => unleveled.push(graph.ids()[node].to_string()),
            }
        }
        if !unleveled.is_empty() {
            warn!(agents = ?unleveled, "agents left without a level (cycle in plan?)");
        }

        let index: HashMap<String, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();

        let edges = plan
            .edges
            .iter()
            .filter_map(|edge| {
                let start = nodes[*index.get(&edge.from)?].point();
                let end = nodes[*index.get(&edge.to)?].point();
                Some(EdgePath {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                    data: edge.data.clone(),
                    start,
                    end,
                })
            })
            .collect();

        debug!(levels = column_count, nodes = nodes.len(), "computed layout");

        Self {
            nodes,
            edges,
            unleveled,
            index,
        }
    }

    pub fn get(&self, id: &str) -> Option<&NodePosition> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// `(x, y)` of an agent, if it was leveled
    pub fn position(&self, id: &str) -> Option<(f64, f64)> {
        self.get(id).map(|n| (n.x, n.y))
    }

    pub fn nodes(&self) -> &[NodePosition] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EdgePath] {
        &self.edges
    }

    pub fn unleveled(&self) -> &[String] {
        &self.unleveled
    }

    pub fn level_count(&self) -> usize {
        self.nodes.iter().map(|n| n.level + 1).max().unwrap_or(0)
    }

    /// Agent ids per column, top to bottom
    pub fn levels(&self) -> Vec<Vec<&str>> {
        let mut levels: Vec<Vec<&NodePosition>> = vec![Vec::new(); self.level_count()];
        for node in &self.nodes {
            levels[node.level].push(node);
        }
        levels
            .into_iter()
            .map(|mut column| {
                column.sort_by_key(|n| n.order);
                column.into_iter().map(|n| n.id.as_str()).collect()
            })
            .collect()
    }
}

/// Kahn's algorithm with level tracking (FIFO queue)
///
/// A successor's level is raised to `current + 1` on every visit, so it
/// ends one past its furthest predecessor; it is enqueued only when all of
/// its predecessors have been processed.
fn assign_levels(graph: &FlowGraph<'_>) -> Vec<Option<usize>> {
    let mut in_degree = graph.in_degrees();
    let mut levels: Vec<Option<usize>> = vec![None; graph.len()];
    let mut queue: VecDeque<usize> = VecDeque::new();

    for (node, degree) in in_degree.iter().enumerate() {
        if *degree == 0 {
            levels[node] = Some(0);
            queue.push_back(node);
        }
    }

    while let Some(current) = queue.pop_front() {
        let current_level = levels[current].unwrap_or(0);

        for &succ in graph.successor_indices(current) {
            let next = current_level + 1;
            levels[succ] = Some(levels[succ].map_or(next, |l| l.max(next)));

            in_degree[succ] = in_degree[succ].saturating_sub(1);
            if in_degree[succ] == 0 {
                queue.push_back(succ);
            }
        }
    }

    // Levels set on nodes that were never enqueued belong to cyclic regions
    for (node, degree) in in_degree.iter().enumerate() {
        if *degree > 0 {
            levels[node] = None;
        }
    }

    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Agent, Edge};
    use crate::types::Archetype;

    fn plan(ids: &[&str], edges: &[(&str, &str)]) -> Plan {
        let mut plan = Plan::new("t", "");
        for id in ids {
            plan = plan.with_agent(Agent::new(*id, *id, Archetype::Generator, ""));
        }
        for (from, to) in edges {
            plan = plan.with_edge(Edge::new(*from, *to, "d"));
        }
        plan
    }

    // ═══════════════════════════════════════════════════════════════
    // LEVEL ASSIGNMENT
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn linear_chain_levels() {
        let layout = plan_to_positions(&plan(&["a", "b", "c"], &[("a", "b"), ("b", "c")]));
        assert_eq!(layout.level_count(), 3);
        assert_eq!(layout.get("a").unwrap().level, 0);
        assert_eq!(layout.get("b").unwrap().level, 1);
        assert_eq!(layout.get("c").unwrap().level, 2);
        assert_eq!(layout.position("a"), Some((0.0, -40.0)));
        assert_eq!(layout.position("b"), Some((300.0, -40.0)));
        assert_eq!(layout.position("c"), Some((600.0, -40.0)));
    }

    #[test]
    fn join_takes_furthest_predecessor() {
        // a → b → c, a → c: c must sit right of b
        let layout = plan_to_positions(&plan(
            &["a", "b", "c"],
            &[("a", "c"), ("a", "b"), ("b", "c")],
        ));
        assert_eq!(layout.get("c").unwrap().level, 2);
    }

    #[test]
    fn disconnected_agents_share_level_zero() {
        let layout = plan_to_positions(&plan(&["x", "y"], &[]));
        assert_eq!(layout.levels(), vec![vec!["x", "y"]]);
    }

    #[test]
    fn empty_plan_has_no_levels() {
        let layout = plan_to_positions(&Plan::new("t", ""));
        assert_eq!(layout.level_count(), 0);
        assert!(layout.nodes().is_empty());
        assert!(layout.levels().is_empty());
    }

    // ═══════════════════════════════════════════════════════════════
    // VERTICAL STACKING
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn column_is_centered_on_zero() {
        let layout = plan_to_positions(&plan(
            &["root", "p", "q", "r"],
            &[("root", "p"), ("root", "q"), ("root", "r")],
        ));
        let ys: Vec<f64> = ["p", "q", "r"].iter().map(|id| layout.get(id).unwrap().y).collect();
        // 3 × 80 + 2 × 40 = 320 → top at -160
        assert_eq!(ys, vec![-160.0, -40.0, 80.0]);
        assert_eq!(ys[0], -(ys[2] + 80.0));
        assert_eq!(layout.levels()[1], vec!["p", "q", "r"]);
    }

    #[test]
    fn custom_metrics_are_used() {
        let config = LayoutConfig {
            node_width: 100.0,
            node_height: 10.0,
            horizontal_gap: 20.0,
            vertical_gap: 10.0,
        };
        let fan_out = plan(&["a", "b", "c"], &[("a", "b"), ("a", "c")]);
        let layout = PlanLayout::compute(&fan_out, &config);
        assert_eq!(layout.position("b"), Some((120.0, -15.0)));
        assert_eq!(layout.position("c"), Some((120.0, 5.0)));
    }

    // ═══════════════════════════════════════════════════════════════
    // EDGES AND CYCLES
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn edge_paths_reference_endpoints() {
        let layout = plan_to_positions(&plan(&["a", "b"], &[("a", "b"), ("a", "ghost")]));
        assert_eq!(layout.edges().len(), 1);
        let edge = &layout.edges()[0];
        assert_eq!(edge.start, Point { x: 0.0, y: -40.0 });
        assert_eq!(edge.end, Point { x: 300.0, y: -40.0 });
    }

    #[test]
    fn cyclic_agents_are_left_unleveled() {
        let layout = plan_to_positions(&plan(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "c"), ("c", "b"), ("c", "d")],
        ));
        assert_eq!(layout.position("a"), Some((0.0, -40.0)));
        assert_eq!(layout.unleveled(), ["b", "c", "d"]);
        assert!(layout.get("b").is_none());
        assert!(layout.edges().is_empty());
    }

    #[test]
    fn layout_config_from_partial_yaml() {
        let config: LayoutConfig = serde_yaml::from_str("node_width: 180\n").unwrap();
        assert_eq!(config.node_width, 180.0);
        assert_eq!(config.vertical_gap, 40.0);
    }
}
