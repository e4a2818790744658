//! Mermaid export
//!
//! Two renderings of a plan:
//! - `flowchart LR`: one node per agent, one labeled arrow per edge, one
//!   style directive per agent (archetype color)
//! - `sequenceDiagram`: agents as participants plus a `User` participant
//!   that starts every root agent and is notified by every terminal one
//!
//! Output is a pure function of the plan (byte-identical for equal input).
//! Every agent gets a distinct Mermaid id, and label text never contains a
//! line break, so each statement stays on one line.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use crate::flow_graph::FlowGraph;
use crate::plan::{Agent, Plan};
use crate::rules::Ruleset;

/// Summaries longer than this are cut and suffixed with `...`
pub const SUMMARY_MAX_CHARS: usize = 40;

/// Participant that starts and receives the workflow in sequence diagrams
pub const USER_PARTICIPANT: &str = "User";

/// Ids Mermaid reads as keywords or that the diagrams already use
const RESERVED_IDS: &[&str] = &["end", USER_PARTICIPANT];

const INDENT: &str = "    ";

/// Mermaid-safe node id: every char outside `[A-Za-z0-9]` becomes `_`
pub fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn is_reserved(id: &str) -> bool {
    RESERVED_IDS.iter().any(|r| r.eq_ignore_ascii_case(id))
}

/// Unique Mermaid id for every agent and edge endpoint of a plan
///
/// Ids are assigned in agent declaration order, then edge order. A sanitized
/// id that is reserved or already taken gets a `_2`, `_3`, ... suffix.
struct NodeIds<'a> {
    ids: HashMap<&'a str, String>,
}

impl<'a> NodeIds<'a> {
    fn for_plan(plan: &'a Plan) -> Self {
        let endpoints = plan
            .agents
            .iter()
            .map(|a| a.id.as_str())
            .chain(plan.edges.iter().flat_map(|e| [e.from.as_str(), e.to.as_str()]));

        let mut ids = HashMap::new();
        let mut taken = HashSet::new();
        for id in endpoints {
            if ids.contains_key(id) {
                continue;
            }
            let mut base = sanitize_id(id);
            if base.is_empty() {
                base.push_str("node");
            }
            let mut candidate = base.clone();
            let mut suffix = 1;
            while is_reserved(&candidate) || taken.contains(&candidate) {
                suffix += 1;
                candidate = format!("{}_{}", base, suffix);
            }
            taken.insert(candidate.clone());
            ids.insert(id, candidate);
        }

        Self { ids }
    }

    fn get(&self, id: &str) -> String {
        self.ids.get(id).cloned().unwrap_or_else(|| sanitize_id(id))
    }
}

/// Fold line breaks and the whitespace around them into single spaces
fn single_line(text: &str) -> String {
    text.replace('\r', "\n")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Replace characters that would end a quoted Mermaid label
pub fn escape_label(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in single_line(text).chars() {
        match c {
            '#' => out.push_str("#35;"),
            '"' => out.push_str("#quot;"),
            '[' => out.push('('),
            ']' => out.push(')'),
            '<' => out.push_str("#lt;"),
            '>' => out.push_str("#gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Sequence text ends at `;` and reads `#` as the start of an entity
pub fn escape_message(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in single_line(text).chars() {
        match c {
            '#' => out.push_str("#35;"),
            ';' => out.push_str("#59;"),
            _ => out.push(c),
        }
    }
    out
}

/// Slot names read better with spaces: `ticket_data` → `ticket data`
fn humanize(text: &str) -> String {
    text.replace('_', " ")
}

fn truncate_summary(summary: &str) -> String {
    if summary.chars().count() <= SUMMARY_MAX_CHARS {
        return summary.to_string();
    }
    let cut: String = summary.chars().take(SUMMARY_MAX_CHARS - 3).collect();
    format!("{}...", cut.trim_end())
}

fn node_label(agent: &Agent) -> String {
    let name = escape_label(&agent.name);
    if agent.summary.trim().is_empty() {
        return name;
    }
    let summary = escape_label(&humanize(&truncate_summary(agent.summary.trim())));
    format!("{}<br/>{}", name, summary)
}

/// Flowchart with the built-in archetype colors
pub fn to_flow_diagram(plan: &Plan) -> String {
    to_flow_diagram_with(plan, &Ruleset::builtin())
}

/// Flowchart using the styles of `rules`
pub fn to_flow_diagram_with(plan: &Plan, rules: &Ruleset) -> String {
    let ids = NodeIds::for_plan(plan);
    let mut out = String::from("flowchart LR\n");

    for agent in &plan.agents {
        let _ = writeln!(
            out,
            "{INDENT}{}[\"{}\"]",
            ids.get(&agent.id),
            node_label(agent)
        );
    }

    for edge in &plan.edges {
        let _ = writeln!(
            out,
            "{INDENT}{} -->|\"{}\"| {}",
            ids.get(&edge.from),
            escape_label(&humanize(&edge.data)),
            ids.get(&edge.to)
        );
    }

    for agent in &plan.agents {
        let style = rules.style(agent.archetype);
        let _ = writeln!(
            out,
            "{INDENT}style {} fill:{},stroke:{},color:#fff",
            ids.get(&agent.id),
            style.color,
            style.stroke
        );
    }

    out
}

pub fn to_sequence_diagram(plan: &Plan) -> String {
    let graph = FlowGraph::from_plan(plan);
    let ids = NodeIds::for_plan(plan);
    let mut out = String::from("sequenceDiagram\n");

    for agent in &plan.agents {
        let _ = writeln!(
            out,
            "{INDENT}participant {} as {}",
            ids.get(&agent.id),
            escape_message(&agent.name)
        );
    }
    let _ = writeln!(out, "{INDENT}participant {USER_PARTICIPANT}");

    for root in graph.roots() {
        let _ = writeln!(out, "{INDENT}{USER_PARTICIPANT}->>{}: start", ids.get(root));
    }

    for edge in &plan.edges {
        let _ = writeln!(
            out,
            "{INDENT}{}->>{}: {}",
            ids.get(&edge.from),
            ids.get(&edge.to),
            escape_message(&edge.data)
        );
    }

    for terminal in graph.terminals() {
        let _ = writeln!(
            out,
            "{INDENT}{}-->>{USER_PARTICIPANT}: complete",
            ids.get(terminal)
        );
    }

    out
}
