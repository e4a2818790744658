//! Plan request handler
//!
//! Transport-free rendition of the plan endpoint: takes a request value and
//! returns status, headers and JSON body. Any HTTP layer only has to copy
//! these onto its own response.
//!
//! | Case                               | Status | Body                    |
//! |------------------------------------|--------|-------------------------|
//! | malformed JSON / missing field     | 400    | `{ errors }`            |
//! | description < 10 chars (trimmed)   | 400    | `{ errors }`            |
//! | unknown `templateId`               | 400    | `{ errors }`            |
//! | generated plan fails validation    | 500    | `{ errors, warnings }`  |
//! | otherwise                          | 200    | `{ plan, warnings }`    |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{PlanError, Result};
use crate::plan::Plan;
use crate::planner::Planner;
use crate::validator::validate_plan;

/// Shortest accepted description, counted after trimming
pub const MIN_DESCRIPTION_CHARS: usize = 10;

/// Headers permitting cross-origin calls
pub const CORS_HEADERS: &[(&str, &str)] = &[
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
}

impl PlanRequest {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            template_id: None,
        }
    }

    pub fn with_template(mut self, key: impl Into<String>) -> Self {
        self.template_id = Some(key.into());
        self
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| PlanError::InvalidRequest {
            reason: e.to_string(),
        })
    }

    /// Field checks that do not need the planner
    fn rejection(&self) -> Option<String> {
        (self.description.trim().chars().count() < MIN_DESCRIPTION_CHARS).then(|| {
            format!(
                "Description must be at least {} characters",
                MIN_DESCRIPTION_CHARS
            )
        })
    }
}

/// Success / client error / server error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u16")]
pub enum ApiStatus {
    Ok,
    ClientError,
    ServerError,
}

impl ApiStatus {
    pub fn code(self) -> u16 {
        match self {
            ApiStatus::Ok => 200,
            ApiStatus::ClientError => 400,
            ApiStatus::ServerError => 500,
        }
    }
}

impl From<ApiStatus> for u16 {
    fn from(status: ApiStatus) -> Self {
        status.code()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PlanResponseBody {
    Success {
        plan: Plan,
        warnings: Vec<String>,
    },
    Failure {
        errors: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        warnings: Option<Vec<String>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanResponse {
    pub status: ApiStatus,
    pub headers: BTreeMap<String, String>,
    pub body: PlanResponseBody,
}

impl PlanResponse {
    fn new(status: ApiStatus, body: PlanResponseBody) -> Self {
        let mut headers: BTreeMap<String, String> = CORS_HEADERS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            status,
            headers,
            body,
        }
    }

    fn client_error(message: impl Into<String>) -> Self {
        Self::new(
            ApiStatus::ClientError,
            PlanResponseBody::Failure {
                errors: vec![message.into()],
                warnings: None,
            },
        )
    }

    pub fn is_success(&self) -> bool {
        self.status == ApiStatus::Ok
    }

    pub fn plan(&self) -> Option<&Plan> {
        match &self.body {
            PlanResponseBody::Success { plan, .. } => Some(plan),
            PlanResponseBody::Failure { .. } => None,
        }
    }

    pub fn errors(&self) -> &[String] {
        match &self.body {
            PlanResponseBody::Failure { errors, .. } => errors,
            PlanResponseBody::Success { .. } => &[],
        }
    }

    pub fn body_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.body)
    }
}

/// Plan a request: template lookup or description planning, then validation
pub fn handle_plan_request(planner: &Planner, request: &PlanRequest) -> PlanResponse {
    if let Some(reason) = request.rejection() {
        return PlanResponse::client_error(reason);
    }

    let plan = match request.template_id.as_deref() {
        Some(key) => match planner.get_template(key) {
            Some(mut plan) => {
                plan.description = request.description.clone();
                plan
            }
            None => {
                warn!(template = key, "request named an unknown template");
                return PlanResponse::client_error(format!("Unknown template \"{}\"", key));
            }
        },
        None => planner.plan_from_description(&request.description),
    };

    let result = validate_plan(&plan);
    if !result.ok {
        warn!(errors = result.errors.len(), "generated plan failed validation");
        return PlanResponse::new(
            ApiStatus::ServerError,
            PlanResponseBody::Failure {
                errors: result.errors,
                warnings: Some(result.warnings),
            },
        );
    }

    info!(agents = plan.agents.len(), edges = plan.edges.len(), "plan request served");
    PlanResponse::new(
        ApiStatus::Ok,
        PlanResponseBody::Success {
            plan,
            warnings: result.warnings,
        },
    )
}

/// Same as [`handle_plan_request`], starting from the raw request body
pub fn handle_plan_request_json(planner: &Planner, body: &str) -> PlanResponse {
    match PlanRequest::from_json(body) {
        Ok(request) => handle_plan_request(planner, &request),
        Err(err) => PlanResponse::client_error(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Agent, Edge};
    use crate::rules::Ruleset;
    use crate::templates::{TemplateEntry, TemplateRegistry};
    use crate::types::Archetype;

    #[test]
    fn short_description_is_client_error() {
        let response = handle_plan_request(&Planner::default(), &PlanRequest::new("  too short  "));
        assert_eq!(response.status.code(), 400);
        assert_eq!(
            response.errors(),
            ["Description must be at least 10 characters"]
        );
    }

    #[test]
    fn unknown_template_is_client_error() {
        let request = PlanRequest::new("Anything long enough").with_template("nope");
        let response = handle_plan_request(&Planner::default(), &request);
        assert_eq!(response.status, ApiStatus::ClientError);
        assert_eq!(response.errors(), ["Unknown template \"nope\""]);
    }

    #[test]
    fn template_request_succeeds() {
        let request = PlanRequest::new("Route our inbound tickets").with_template("support-triage");
        let response = handle_plan_request(&Planner::default(), &request);
        assert!(response.is_success());
        let plan = response.plan().unwrap();
        assert_eq!(plan.agents.len(), 5);
        assert_eq!(plan.description, "Route our inbound tickets");
    }

    #[test]
    fn invalid_generated_plan_is_server_error() {
        let broken = Plan::new("Broken", "")
            .with_agent(Agent::new("a", "A", Archetype::Generator, "").with_output("x"))
            .with_edge(Edge::new("a", "ghost", "x"));
        let templates = TemplateRegistry::new().with_template(TemplateEntry::new(
            "broken",
            ("broken", "plan"),
            broken,
        ));
        let planner = Planner::new(Ruleset::builtin(), templates);

        let response = handle_plan_request(&planner, &PlanRequest::new("a broken plan please"));
        assert_eq!(response.status.code(), 500);
        let json = serde_json::to_value(&response.body).unwrap();
        assert!(json["errors"][0].as_str().unwrap().contains("ghost"));
        assert!(json["warnings"].is_array());
    }

    #[test]
    fn responses_carry_cors_headers() {
        let response = handle_plan_request(&Planner::default(), &PlanRequest::new("x"));
        assert_eq!(
            response.headers.get("Access-Control-Allow-Origin").map(String::as_str),
            Some("*")
        );
    }

    #[test]
    fn raw_body_uses_camel_case_template_id() {
        let body = r#"{"description": "Qualify the new leads", "templateId": "lead-qualification"}"#;
        let response = handle_plan_request_json(&Planner::default(), body);
        assert!(response.is_success());
        assert_eq!(response.plan().unwrap().agents[0].id, "lead_enricher");
    }

    #[test]
    fn missing_description_is_client_error() {
        let response = handle_plan_request_json(&Planner::default(), r#"{"templateId": "x"}"#);
        assert_eq!(response.status, ApiStatus::ClientError);
        assert!(response.errors()[0].starts_with("PLAN-050"));
    }

    #[test]
    fn success_body_shape() {
        let response = handle_plan_request(
            &Planner::default(),
            &PlanRequest::new("Fetch data, then extract fields, then notify team."),
        );
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], 200);
        assert_eq!(json["body"]["plan"]["agents"].as_array().unwrap().len(), 3);
        assert!(json["body"]["warnings"].as_array().unwrap().is_empty());
        assert!(json["body"].get("errors").is_none());
    }
}
