//! Plan data model
//!
//! Plain value objects: nothing here enforces referential integrity or
//! acyclicity. That is the validator's job (see [`crate::validator`]).
//! Wire names are camelCase so exported JSON matches the documented format.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Archetype;

/// Fixed plan format version
pub const PLAN_VERSION: &str = "1.0";

/// One input slot of an agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentInput {
    /// Producing agent; `None` marks a root/external input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_agent_id: Option<String>,
    pub name: String,
}

impl AgentInput {
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            source_agent_id: None,
            name: name.into(),
        }
    }

    pub fn from_agent(source: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            source_agent_id: Some(source.into()),
            name: name.into(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.source_agent_id.is_none()
    }
}

/// One output slot of an agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentOutput {
    pub name: String,
}

impl AgentOutput {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A workflow step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub archetype: Archetype,
    pub summary: String,
    #[serde(default)]
    pub inputs: Vec<AgentInput>,
    #[serde(default)]
    pub outputs: Vec<AgentOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_tools: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<String>>,
}

impl Agent {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        archetype: Archetype,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            archetype,
            summary: summary.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            suggested_tools: None,
            notes: None,
        }
    }

    pub fn with_input(mut self, input: AgentInput) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_output(mut self, name: impl Into<String>) -> Self {
        self.outputs.push(AgentOutput::new(name));
        self
    }

    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggested_tools = Some(tools.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.get_or_insert_with(Vec::new).push(note.into());
        self
    }
}

/// Directed data handoff between two agents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    /// Handoff payload name; normally one of `from`'s output slots
    pub data: String,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            data: data.into(),
        }
    }
}

/// Field list describing one handoff payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSchema {
    pub fields: Vec<String>,
}

impl DataSchema {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// A complete workflow: agents, handoff edges and data schemas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub version: String,
    pub title: String,
    pub description: String,
    pub agents: Vec<Agent>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_schemas: Option<BTreeMap<String, DataSchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<String>>,
}

impl Plan {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            version: PLAN_VERSION.to_string(),
            title: title.into(),
            description: description.into(),
            agents: Vec::new(),
            edges: Vec::new(),
            data_schemas: None,
            notes: None,
        }
    }

    pub fn with_agent(mut self, agent: Agent) -> Self {
        self.agents.push(agent);
        self
    }

    pub fn with_edge(mut self, edge: Edge) -> Self {
        self.edges.push(edge);
        self
    }

    pub fn with_schema(mut self, name: impl Into<String>, schema: DataSchema) -> Self {
        self.data_schemas
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), schema);
        self
    }

    pub fn get_agent(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn agent_ids(&self) -> impl Iterator<Item = &str> {
        self.agents.iter().map(|a| a.id.as_str())
    }

    /// File name used when the plan is downloaded: `my-title.json`
    pub fn download_file_name(&self) -> String {
        let mut slug = String::with_capacity(self.title.len());
        for c in self.title.to_lowercase().chars() {
            let c = if c.is_alphanumeric() { c } else { '-' };
            if c == '-' && (slug.is_empty() || slug.ends_with('-')) {
                continue;
            }
            slug.push(c);
        }
        let slug = slug.trim_end_matches('-');
        if slug.is_empty() {
            "plan.json".to_string()
        } else {
            format!("{}.json", slug)
        }
    }

    /// Formatted JSON document (two-space indentation)
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
