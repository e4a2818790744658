//! Canned workflow templates
//!
//! Each template has a key and a keyword pair. A description containing
//! both keywords (lower-cased substring match) short-circuits to that
//! template. Templates are checked in registration order and the first
//! match wins; there is no scoring.

use crate::plan::{Agent, AgentInput, DataSchema, Edge, Plan};
use crate::types::Archetype;

/// One registered template
#[derive(Debug, Clone)]
pub struct TemplateEntry {
    pub key: String,
    /// Both must appear in the lower-cased description
    pub keywords: (String, String),
    pub plan: Plan,
}

impl TemplateEntry {
    pub fn new(key: impl Into<String>, keywords: (&str, &str), plan: Plan) -> Self {
        Self {
            key: key.into(),
            keywords: (keywords.0.to_lowercase(), keywords.1.to_lowercase()),
            plan,
        }
    }

    /// `lowered` must already be lower-cased
    pub fn matches(&self, lowered: &str) -> bool {
        lowered.contains(&self.keywords.0) && lowered.contains(&self.keywords.1)
    }
}

/// Ordered template registry
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    entries: Vec<TemplateEntry>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// support-triage, then lead-qualification, then weekly-report
    pub fn builtin() -> Self {
        Self::new()
            .with_template(TemplateEntry::new(
                "support-triage",
                ("support", "triage"),
                support_triage(),
            ))
            .with_template(TemplateEntry::new(
                "lead-qualification",
                ("lead", "qualif"),
                lead_qualification(),
            ))
            .with_template(TemplateEntry::new(
                "weekly-report",
                ("weekly", "report"),
                weekly_report(),
            ))
    }

    /// Append a template (lowest priority so far)
    pub fn with_template(mut self, entry: TemplateEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Plan> {
        self.entries.iter().find(|e| e.key == key).map(|e| &e.plan)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn entries(&self) -> &[TemplateEntry] {
        &self.entries
    }

    /// First template whose keyword pair appears in `description`
    pub fn match_description(&self, description: &str) -> Option<&TemplateEntry> {
        let lowered = description.to_lowercase();
        self.entries.iter().find(|e| e.matches(&lowered))
    }
}

// ============================================================================
// BUILT-IN TEMPLATES
// ============================================================================

fn support_triage() -> Plan {
    Plan::new(
        "Customer Support Triage Workflow",
        "Triage incoming support tickets, draft replies, escalate urgent issues and notify the customer",
    )
    .with_agent(
        Agent::new(
            "ticket_intake",
            "Ticket Intake",
            Archetype::Retriever,
            "Pulls new tickets from the helpdesk queue",
        )
        .with_input(AgentInput::root("support_ticket"))
        .with_output("ticket_data")
        .with_tools(["helpdesk_api", "email_inbox"]),
    )
    .with_agent(
        Agent::new(
            "ticket_classifier",
            "Ticket Classifier",
            Archetype::Classifier,
            "Assigns a category and an urgency level to each ticket",
        )
        .with_input(AgentInput::from_agent("ticket_intake", "ticket_data"))
        .with_output("ticket_category")
        .with_output("urgency")
        .with_tools(["text_classifier", "sentiment_analyzer"]),
    )
    .with_agent(
        Agent::new(
            "response_drafter",
            "Response Drafter",
            Archetype::Generator,
            "Drafts a reply using the knowledge base for the ticket category",
        )
        .with_input(AgentInput::from_agent("ticket_classifier", "ticket_category"))
        .with_output("draft_response")
        .with_tools(["llm_completion", "knowledge_base"]),
    )
    .with_agent(
        Agent::new(
            "escalation_review",
            "Escalation Review",
            Archetype::HumanGate,
            "A support lead reviews urgent tickets before anything is sent",
        )
        .with_input(AgentInput::from_agent("ticket_classifier", "urgency"))
        .with_output("escalation_decision")
        .with_tools(["approval_queue"])
        .with_note("Only urgent tickets wait here; others pass straight through"),
    )
    .with_agent(
        Agent::new(
            "customer_notifier",
            "Customer Notifier",
            Archetype::Notifier,
            "Sends the approved reply back to the customer",
        )
        .with_input(AgentInput::from_agent("response_drafter", "draft_response"))
        .with_input(AgentInput::from_agent("escalation_review", "escalation_decision"))
        .with_output("notification_status")
        .with_tools(["email_sender", "helpdesk_api"]),
    )
    .with_edge(Edge::new("ticket_intake", "ticket_classifier", "ticket_data"))
    .with_edge(Edge::new("ticket_classifier", "response_drafter", "ticket_category"))
    .with_edge(Edge::new("ticket_classifier", "escalation_review", "urgency"))
    .with_edge(Edge::new("response_drafter", "customer_notifier", "draft_response"))
    .with_edge(Edge::new(
        "escalation_review",
        "customer_notifier",
        "escalation_decision",
    ))
    .with_schema("ticket_data", DataSchema::new(["ticket_id", "subject", "body", "customer"]))
    .with_schema("ticket_category", DataSchema::new(["category", "confidence"]))
    .with_schema("urgency", DataSchema::new(["level", "reason"]))
    .with_schema("draft_response", DataSchema::new(["content", "tone"]))
    .with_schema("escalation_decision", DataSchema::new(["decision", "reviewer"]))
    .with_schema(
        "notification_status",
        DataSchema::new(["channel", "recipients", "delivery_status"]),
    )
}

fn lead_qualification() -> Plan {
    Plan::new(
        "Lead Qualification Workflow",
        "Enrich inbound leads, score them, update the CRM and alert sales about qualified leads",
    )
    .with_agent(
        Agent::new(
            "lead_enricher",
            "Lead Enricher",
            Archetype::Retriever,
            "Looks up company and contact details for each inbound lead",
        )
        .with_input(AgentInput::root("lead_form"))
        .with_output("enriched_lead")
        .with_tools(["enrichment_api", "http_client"]),
    )
    .with_agent(
        Agent::new(
            "lead_scorer",
            "Lead Scorer",
            Archetype::Classifier,
            "Scores the lead against the ideal customer profile",
        )
        .with_input(AgentInput::from_agent("lead_enricher", "enriched_lead"))
        .with_output("lead_score")
        .with_tools(["rules_engine", "text_classifier"]),
    )
    .with_agent(
        Agent::new(
            "crm_updater",
            "CRM Updater",
            Archetype::ToolExecutor,
            "Writes the score and enrichment back to the CRM record",
        )
        .with_input(AgentInput::from_agent("lead_scorer", "lead_score"))
        .with_output("crm_record")
        .with_tools(["crm_api"]),
    )
    .with_agent(
        Agent::new(
            "sales_notifier",
            "Sales Notifier",
            Archetype::Notifier,
            "Alerts the owning sales rep when a lead qualifies",
        )
        .with_input(AgentInput::from_agent("lead_scorer", "lead_score"))
        .with_output("notification_status")
        .with_tools(["slack_webhook", "email_sender"]),
    )
    .with_edge(Edge::new("lead_enricher", "lead_scorer", "enriched_lead"))
    .with_edge(Edge::new("lead_scorer", "crm_updater", "lead_score"))
    .with_edge(Edge::new("lead_scorer", "sales_notifier", "lead_score"))
    .with_schema("enriched_lead", DataSchema::new(["email", "company", "title", "employees"]))
    .with_schema("lead_score", DataSchema::new(["score", "tier", "rationale"]))
    .with_schema("crm_record", DataSchema::new(["record_id", "status"]))
    .with_schema(
        "notification_status",
        DataSchema::new(["channel", "recipients", "delivery_status"]),
    )
}

fn weekly_report() -> Plan {
    Plan::new(
        "Weekly Report Workflow",
        "Collect the week's metrics, analyse trends, write the report, get sign-off and distribute it",
    )
    .with_agent(
        Agent::new(
            "metrics_collector",
            "Metrics Collector",
            Archetype::Retriever,
            "Queries dashboards and databases for the reporting period",
        )
        .with_input(AgentInput::root("reporting_period"))
        .with_output("weekly_metrics")
        .with_tools(["database_query", "analytics_api"]),
    )
    .with_agent(
        Agent::new(
            "trend_analyzer",
            "Trend Analyzer",
            Archetype::Extractor,
            "Extracts week-over-week changes and anomalies",
        )
        .with_input(AgentInput::from_agent("metrics_collector", "weekly_metrics"))
        .with_output("key_trends")
        .with_tools(["statistics_engine"]),
    )
    .with_agent(
        Agent::new(
            "report_writer",
            "Report Writer",
            Archetype::Generator,
            "Writes the narrative report from metrics and trends",
        )
        .with_input(AgentInput::from_agent("metrics_collector", "weekly_metrics"))
        .with_input(AgentInput::from_agent("trend_analyzer", "key_trends"))
        .with_output("report_draft")
        .with_tools(["llm_completion", "template_renderer"]),
    )
    .with_agent(
        Agent::new(
            "manager_review",
            "Manager Review",
            Archetype::HumanGate,
            "A manager approves the draft before distribution",
        )
        .with_input(AgentInput::from_agent("report_writer", "report_draft"))
        .with_output("approved_report")
        .with_tools(["approval_queue"]),
    )
    .with_agent(
        Agent::new(
            "report_distributor",
            "Report Distributor",
            Archetype::Notifier,
            "Emails the approved report to the distribution list",
        )
        .with_input(AgentInput::from_agent("manager_review", "approved_report"))
        .with_output("delivery_status")
        .with_tools(["email_sender", "slack_webhook"]),
    )
    .with_edge(Edge::new("metrics_collector", "trend_analyzer", "weekly_metrics"))
    .with_edge(Edge::new("metrics_collector", "report_writer", "weekly_metrics"))
    .with_edge(Edge::new("trend_analyzer", "report_writer", "key_trends"))
    .with_edge(Edge::new("report_writer", "manager_review", "report_draft"))
    .with_edge(Edge::new("manager_review", "report_distributor", "approved_report"))
    .with_schema("weekly_metrics", DataSchema::new(["period", "metrics", "source"]))
    .with_schema("key_trends", DataSchema::new(["trend", "delta", "significance"]))
    .with_schema("report_draft", DataSchema::new(["content", "format"]))
    .with_schema("approved_report", DataSchema::new(["content", "approved_by"]))
    .with_schema(
        "delivery_status",
        DataSchema::new(["channel", "recipients", "delivery_status"]),
    )
}
