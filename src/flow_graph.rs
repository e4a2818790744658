//! Flow graph view over a plan
//!
//! Borrowed index-based adjacency built once per plan. Node order is agent
//! declaration order and neighbor order is edge order, so every traversal
//! here is deterministic.
//!
//! Edges whose endpoints are not agents are left out of the graph (the
//! validator reports them separately).

use std::collections::{HashMap, VecDeque};

use crate::plan::Plan;

/// DFS visit state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    OnStack,
    Done,
}

/// Adjacency of a plan's agents
pub struct FlowGraph<'a> {
    /// Unique agent ids, first occurrence order
    ids: Vec<&'a str>,
    index: HashMap<&'a str, usize>,
    /// node -> successor nodes (one entry per edge, duplicates kept)
    successors: Vec<Vec<usize>>,
    /// node -> predecessor nodes (one entry per edge)
    predecessors: Vec<Vec<usize>>,
}

impl<'a> FlowGraph<'a> {
    pub fn from_plan(plan: &'a Plan) -> Self {
        let capacity = plan.agents.len();
        let mut ids: Vec<&'a str> = Vec::with_capacity(capacity);
        let mut index: HashMap<&'a str, usize> = HashMap::with_capacity(capacity);

        for agent in &plan.agents {
            let id = agent.id.as_str();
            if !index.contains_key(id) {
                index.insert(id, ids.len());
                ids.push(id);
            }
        }

        let mut successors = vec![Vec::new(); ids.len()];
        let mut predecessors = vec![Vec::new(); ids.len()];

        for edge in &plan.edges {
            let from = index.get(edge.from.as_str());
            let to = index.get(edge.to.as_str());
            let (Some(&from), Some(&to)) = (from, to) else {
                continue;
            };
            successors[from].push(to);
            predecessors[to].push(from);
        }

        Self {
            ids,
            index,
            successors,
            predecessors,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Node ids in declaration order
    pub fn ids(&self) -> &[&'a str] {
        &self.ids
    }

    pub(crate) fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub(crate) fn successor_indices(&self, node: usize) -> &[usize] {
        &self.successors[node]
    }

    /// Successor ids of `id` in edge order
    pub fn successors(&self, id: &str) -> Vec<&'a str> {
        self.index_of(id)
            .map(|i| self.successors[i].iter().map(|&s| self.ids[s]).collect())
            .unwrap_or_default()
    }

    /// Predecessor ids of `id` in edge order
    pub fn predecessors(&self, id: &str) -> Vec<&'a str> {
        self.index_of(id)
            .map(|i| self.predecessors[i].iter().map(|&p| self.ids[p]).collect())
            .unwrap_or_default()
    }

    /// Incoming edge count per node (index order)
    pub fn in_degrees(&self) -> Vec<usize> {
        self.predecessors.iter().map(Vec::len).collect()
    }

    /// Agents with no incoming edge
    pub fn roots(&self) -> Vec<&'a str> {
        (0..self.ids.len())
            .filter(|&i| self.predecessors[i].is_empty())
            .map(|i| self.ids[i])
            .collect()
    }

    /// Agents with no outgoing edge
    pub fn terminals(&self) -> Vec<&'a str> {
        (0..self.ids.len())
            .filter(|&i| self.successors[i].is_empty())
            .map(|i| self.ids[i])
            .collect()
    }

    /// Whether `to` is reachable from `from` (BFS)
    pub fn has_path(&self, from: &str, to: &str) -> bool {
        if from == to {
            return self.contains(from);
        }
        let (Some(start), Some(target)) = (self.index_of(from), self.index_of(to)) else {
            return false;
        };

        let mut visited = vec![false; self.ids.len()];
        let mut queue = VecDeque::from([start]);
        visited[start] = true;

        while let Some(current) = queue.pop_front() {
            for &next in &self.successors[current] {
                if next == target {
                    return true;
                }
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }

        false
    }

    /// First cycle found by DFS, as `[a, b, c, a]`
    ///
    /// Roots are tried in declaration order and neighbors in edge order;
    /// the walk stops at the first back edge. Iterative, so deep chains
    /// cannot overflow the call stack.
    pub fn find_cycle(&self) -> Option<Vec<&'a str>> {
        let mut state = vec![Visit::New; self.ids.len()];
        // (node, next successor position); doubles as the current DFS path
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for root in 0..self.ids.len() {
            if state[root] != Visit::New {
                continue;
            }
            state[root] = Visit::OnStack;
            stack.push((root, 0));

            while let Some(frame) = stack.last_mut() {
                let node = frame.0;
                let Some(&child) = self.successors[node].get(frame.1) else {
                    state[node] = Visit::Done;
                    stack.pop();
                    continue;
                };
                frame.1 += 1;

                match state[child] {
                    Visit::New => {
                        state[child] = Visit::OnStack;
                        stack.push((child, 0));
                    }
                    Visit::OnStack => {
                        let start = stack.iter().position(|&(n, _)| n == child).unwrap_or(0);
                        let mut cycle: Vec<&'a str> =
                            stack[start..].iter().map(|&(n, _)| self.ids[n]).collect();
                        cycle.push(self.ids[child]);
                        return Some(cycle);
                    }
                    Visit::Done => {}
                }
            }
        }

        None
    }
}
