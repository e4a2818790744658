//! agentplan - natural-language workflow descriptions to agent DAG plans
//!
//! Pipeline: [`Planner`] turns text into a [`Plan`], [`validate_plan`]
//! checks it, [`PlanLayout`] positions it and [`diagram`] renders it as
//! Mermaid.

pub mod api;
pub mod config;
pub mod diagram;
pub mod error;
pub mod errors;
pub mod flow_graph;
pub mod layout;
pub mod plan;
pub mod planner;
pub mod rules;
pub mod schema;
pub mod templates;
pub mod types;
pub mod validator;
pub mod validators;

pub use api::{handle_plan_request, ApiStatus, PlanRequest, PlanResponse};
pub use config::AppConfig;
pub use diagram::{to_flow_diagram, to_sequence_diagram};
pub use error::{FixSuggestion, PlanError, Result};
pub use errors::{Severity, ValidationIssue, ValidationResult};
pub use flow_graph::FlowGraph;
pub use layout::{plan_to_positions, LayoutConfig, PlanLayout};
pub use plan::{Agent, AgentInput, AgentOutput, DataSchema, Edge, Plan};
pub use planner::{split_steps, Planner};
pub use rules::Ruleset;
pub use templates::TemplateRegistry;
pub use types::Archetype;
pub use validator::validate_plan;
