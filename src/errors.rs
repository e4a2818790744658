//! Validation finding types
//!
//! Structured findings for each plan check. The `Display` text of each
//! finding is the stable message exposed in [`ValidationResult`].

use serde::Serialize;
use thiserror::Error;

/// Which check produced a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationCheck {
    Agents,
    Edges,
    Inputs,
    Graph,
    Outputs,
}

impl std::fmt::Display for ValidationCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationCheck::Agents => write!(f, "Agents"),
            ValidationCheck::Edges => write!(f, "Edges"),
            ValidationCheck::Inputs => write!(f, "Inputs"),
            ValidationCheck::Graph => write!(f, "Graph"),
            ValidationCheck::Outputs => write!(f, "Outputs"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("Duplicate agent id \"{id}\"")]
    DuplicateAgentId { id: String },

    #[error("Edge {from} → {to} references unknown source agent \"{from}\"")]
    UnknownEdgeSource {
        from: String,
        to: String,
        available: Vec<String>,
    },

    #[error("Edge {from} → {to} references unknown target agent \"{to}\"")]
    UnknownEdgeTarget {
        from: String,
        to: String,
        available: Vec<String>,
    },

    #[error("Agent \"{agent_id}\" input \"{input}\" references unknown source agent \"{source_id}\"")]
    UnknownInputSource {
        agent_id: String,
        input: String,
        source_id: String,
    },

    #[error("Cycle detected: {}", path.join(" → "))]
    CycleDetected { path: Vec<String> },

    #[error("Agent \"{agent_id}\" output \"{output}\" is not consumed by any outgoing edge")]
    UnconsumedOutput { agent_id: String, output: String },
}

impl ValidationIssue {
    pub fn check(&self) -> ValidationCheck {
        match self {
            ValidationIssue::DuplicateAgentId { .. } => ValidationCheck::Agents,
            ValidationIssue::UnknownEdgeSource { .. } => ValidationCheck::Edges,
            ValidationIssue::UnknownEdgeTarget { .. } => ValidationCheck::Edges,
            ValidationIssue::UnknownInputSource { .. } => ValidationCheck::Inputs,
            ValidationIssue::CycleDetected { .. } => ValidationCheck::Graph,
            ValidationIssue::UnconsumedOutput { .. } => ValidationCheck::Outputs,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            ValidationIssue::UnconsumedOutput { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Hint for fixing this finding
    pub fn suggestion(&self) -> Option<String> {
        match self {
            ValidationIssue::UnknownEdgeSource { available, .. }
            | ValidationIssue::UnknownEdgeTarget { available, .. } => {
                if available.is_empty() {
                    Some("No agents available in plan".to_string())
                } else if available.len() <= 5 {
                    Some(format!("Available agents: {}", available.join(", ")))
                } else {
                    Some(format!(
                        "Available agents: {} (and {} more)",
                        available[..3].join(", "),
                        available.len() - 3
                    ))
                }
            }
            ValidationIssue::CycleDetected { .. } => {
                Some("Remove one edge of the cycle; plans must be acyclic".to_string())
            }
            ValidationIssue::UnconsumedOutput { output, .. } => Some(format!(
                "Wire \"{}\" to a downstream agent or drop the output",
                output
            )),
            _ => None,
        }
    }
}

/// Outcome of validating a plan
///
/// Serializes as `{ ok, errors, warnings }` with message strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub ok: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(skip)]
    issues: Vec<ValidationIssue>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            ok: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Routes the finding by severity; warnings never affect `ok`
    pub fn add(&mut self, issue: ValidationIssue) {
        match issue.severity() {
            Severity::Error => {
                self.errors.push(issue.to_string());
                self.ok = false;
            }
            Severity::Warning => self.warnings.push(issue.to_string()),
        }
        self.issues.push(issue);
    }

    /// All findings in the order they were added
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_display() {
        assert_eq!(format!("{}", ValidationCheck::Graph), "Graph");
        assert_eq!(format!("{}", ValidationCheck::Outputs), "Outputs");
    }

    #[test]
    fn cycle_message_joins_path() {
        let issue = ValidationIssue::CycleDetected {
            path: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(issue.to_string(), "Cycle detected: a → b → a");
        assert_eq!(issue.check(), ValidationCheck::Graph);
    }

    #[test]
    fn unconsumed_output_is_warning() {
        let issue = ValidationIssue::UnconsumedOutput {
            agent_id: "a".into(),
            output: "extra".into(),
        };
        assert_eq!(issue.severity(), Severity::Warning);
        assert_eq!(
            issue.to_string(),
            "Agent \"a\" output \"extra\" is not consumed by any outgoing edge"
        );
    }

    #[test]
    fn result_routes_by_severity() {
        let mut result = ValidationResult::new();
        assert!(result.ok);

        result.add(ValidationIssue::UnconsumedOutput {
            agent_id: "a".into(),
            output: "x".into(),
        });
        assert!(result.ok);
        assert!(result.has_warnings());

        result.add(ValidationIssue::DuplicateAgentId { id: "a".into() });
        assert!(!result.ok);
        assert_eq!(result.errors, vec!["Duplicate agent id \"a\""]);
        assert_eq!(result.issues().len(), 2);
    }

    #[test]
    fn serializes_without_issue_details() {
        let mut result = ValidationResult::new();
        result.add(ValidationIssue::DuplicateAgentId { id: "a".into() });
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["errors"][0], "Duplicate agent id \"a\"");
        assert!(json.get("issues").is_none());
    }

    #[test]
    fn edge_suggestion_lists_agents() {
        let issue = ValidationIssue::UnknownEdgeTarget {
            from: "a".into(),
            to: "ghost".into(),
            available: vec!["a".into(), "b".into()],
        };
        assert_eq!(issue.suggestion(), Some("Available agents: a, b".to_string()));
        assert!(issue.to_string().contains("\"ghost\""));
    }
}
