//! Error types with fix suggestions
//!
//! Only the edges of the crate can fail: reading plan documents, loading
//! rules/config, and template lookup through the request handler. The
//! planner, validator, layout engine and diagram exporter are total.

use thiserror::Error;

use crate::schema::SchemaError;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ─────────────────────────────────────────────────────────────
    // Rule table errors (PLAN-010 to PLAN-012)
    // ─────────────────────────────────────────────────────────────
    #[error("PLAN-010: Invalid rule pattern '{pattern}': {reason}")]
    InvalidRulePattern { pattern: String, reason: String },

    #[error("PLAN-011: Unknown archetype '{name}'")]
    UnknownArchetype { name: String },

    #[error("PLAN-012: Ruleset has no classification rules")]
    EmptyRuleset,

    // ─────────────────────────────────────────────────────────────
    // Template errors (PLAN-020)
    // ─────────────────────────────────────────────────────────────
    #[error("PLAN-020: Unknown template \"{key}\" (available: {})", available.join(", "))]
    TemplateNotFound { key: String, available: Vec<String> },

    // ─────────────────────────────────────────────────────────────
    // Plan document errors (PLAN-030)
    // ─────────────────────────────────────────────────────────────
    #[error("PLAN-030: Plan document failed schema validation ({} error(s))", errors.len())]
    SchemaValidationFailed { errors: Vec<SchemaError> },

    #[error("PLAN-031: Embedded plan schema is unusable: {reason}")]
    SchemaUnavailable { reason: String },

    // ─────────────────────────────────────────────────────────────
    // Config errors (PLAN-040)
    // ─────────────────────────────────────────────────────────────
    #[error("PLAN-040: Config error: {reason}")]
    Config { reason: String },

    // ─────────────────────────────────────────────────────────────
    // Request errors (PLAN-050)
    // ─────────────────────────────────────────────────────────────
    #[error("PLAN-050: Invalid request: {reason}")]
    InvalidRequest { reason: String },
}

impl FixSuggestion for PlanError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            PlanError::Io(_) => Some("Check file path and permissions"),
            PlanError::Json(_) => Some("Check JSON syntax (try parsing with jq)"),
            PlanError::YamlParse(_) => Some("Check YAML syntax: indentation and quoting"),
            PlanError::InvalidRulePattern { .. } => {
                Some("Rule patterns use Rust regex syntax; escape special characters")
            }
            PlanError::UnknownArchetype { .. } => Some(
                "Use one of: Orchestrator, Retriever, Extractor, Classifier, Generator, ToolExecutor, HumanGate, Notifier",
            ),
            PlanError::EmptyRuleset => Some("Add at least one entry under rules:"),
            PlanError::TemplateNotFound { .. } => {
                Some("Run `agentplan templates` to list the available template keys")
            }
            PlanError::SchemaValidationFailed { .. } => {
                Some("Regenerate the plan with `agentplan plan` or fix the reported fields")
            }
            PlanError::SchemaUnavailable { .. } => {
                Some("This is a build defect; please report it")
            }
            PlanError::Config { .. } => {
                Some("Check the config file passed with --config or AGENTPLAN_CONFIG")
            }
            PlanError::InvalidRequest { .. } => {
                Some("Send {\"description\": \"...\"} with at least 10 characters")
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, PlanError>;
