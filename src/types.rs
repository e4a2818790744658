//! Agent archetypes
//!
//! The closed set of roles an agent can play. Per-archetype tables (tools,
//! schema fields, colors) live in [`crate::rules::Ruleset`]; matching on this
//! enum keeps those tables exhaustive.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PlanError;

/// Role of an agent in a workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Archetype {
    Orchestrator,
    Retriever,
    Extractor,
    Classifier,
    Generator,
    ToolExecutor,
    HumanGate,
    Notifier,
}

impl Archetype {
    /// All archetypes in declaration order
    pub const ALL: [Archetype; 8] = [
        Archetype::Orchestrator,
        Archetype::Retriever,
        Archetype::Extractor,
        Archetype::Classifier,
        Archetype::Generator,
        Archetype::ToolExecutor,
        Archetype::HumanGate,
        Archetype::Notifier,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::Orchestrator => "Orchestrator",
            Archetype::Retriever => "Retriever",
            Archetype::Extractor => "Extractor",
            Archetype::Classifier => "Classifier",
            Archetype::Generator => "Generator",
            Archetype::ToolExecutor => "ToolExecutor",
            Archetype::HumanGate => "HumanGate",
            Archetype::Notifier => "Notifier",
        }
    }

    /// snake_case form used in generated agent ids (`tool_executor_3`)
    pub fn slug(&self) -> &'static str {
        match self {
            Archetype::Orchestrator => "orchestrator",
            Archetype::Retriever => "retriever",
            Archetype::Extractor => "extractor",
            Archetype::Classifier => "classifier",
            Archetype::Generator => "generator",
            Archetype::ToolExecutor => "tool_executor",
            Archetype::HumanGate => "human_gate",
            Archetype::Notifier => "notifier",
        }
    }

    /// Human label used in display names ("Tool Executor")
    pub fn label(&self) -> &'static str {
        match self {
            Archetype::ToolExecutor => "Tool Executor",
            Archetype::HumanGate => "Human Gate",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Archetype {
    type Err = PlanError;

    /// Accepts the canonical name, the slug, or the label, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Archetype::ALL
            .into_iter()
            .find(|a| {
                a.as_str().eq_ignore_ascii_case(wanted)
                    || a.slug().eq_ignore_ascii_case(wanted)
                    || a.label().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| PlanError::UnknownArchetype {
                name: s.to_string(),
            })
    }
}
