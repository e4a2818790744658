//! Plan document schema check
//!
//! Plans read from disk are checked against an embedded JSON Schema before
//! serde parsing, so a malformed document is rejected with every offending
//! path at once instead of failing on the first serde error.

use std::path::Path;
use std::sync::OnceLock;

use jsonschema::Validator;
use serde_json::Value;
use tracing::debug;

use crate::error::{PlanError, Result};
use crate::plan::Plan;

/// Embedded schema JSON (compiled at build time)
const SCHEMA_JSON: &str = include_str!("../schemas/agentplan-plan.schema.json");

static VALIDATOR: OnceLock<std::result::Result<Validator, String>> = OnceLock::new();

/// One schema violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    /// JSON pointer to the offending value (e.g. "/agents/0/type")
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

fn validator() -> Result<&'static Validator> {
    let compiled = VALIDATOR.get_or_init(|| {
        let schema: Value = serde_json::from_str(SCHEMA_JSON)
            .map_err(|e| format!("Failed to parse schema JSON: {}", e))?;
        Validator::new(&schema).map_err(|e| format!("Failed to compile schema: {}", e))
    });

    compiled
        .as_ref()
        .map_err(|reason| PlanError::SchemaUnavailable {
            reason: reason.clone(),
        })
}

/// Check a JSON value against the plan schema
pub fn check_plan_value(value: &Value) -> Result<()> {
    let errors: Vec<SchemaError> = validator()?
        .iter_errors(value)
        .map(|e| SchemaError {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        debug!(count = errors.len(), "plan document failed schema check");
        Err(PlanError::SchemaValidationFailed { errors })
    }
}

/// Parse a plan document: JSON syntax, then schema, then serde
pub fn load_plan_json(text: &str) -> Result<Plan> {
    let value: Value = serde_json::from_str(text)?;
    check_plan_value(&value)?;
    Ok(serde_json::from_value(value)?)
}

pub fn load_plan_file(path: &Path) -> Result<Plan> {
    let text = std::fs::read_to_string(path)?;
    load_plan_json(&text)
}
