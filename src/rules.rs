//! Classification and rendering rule tables
//!
//! A [`Ruleset`] is immutable configuration owned by the planner and the
//! diagram exporter: the ordered archetype rules (first match wins), the
//! verb→output-slot table, domain nouns, per-archetype schema fields and
//! per-archetype styles.
//!
//! The built-in tables are compiled once; alternative tables can be loaded
//! from YAML and injected, so nothing global is ever mutated.

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use crate::error::{PlanError, Result};
use crate::types::Archetype;

/// Schema fields for archetypes a ruleset does not describe
pub const FALLBACK_SCHEMA_FIELDS: &[&str] = &["data", "status"];

// ============================================================================
// BUILT-IN TABLES
// ============================================================================

/// Ordered (pattern, archetype, tools); evaluated top to bottom
const BUILTIN_RULES: &[(&str, Archetype, &[&str])] = &[
    (
        r"\b(fetch|retrieve|get|pull|load|read|search|query|look ?up|collect|gather|download|scrape|ingest|receive)\b",
        Archetype::Retriever,
        &["http_client", "database_query", "vector_search"],
    ),
    (
        r"\b(extract|parse|scan|identify|capture|ocr)\b",
        Archetype::Extractor,
        &["document_parser", "regex_extractor", "ocr_engine"],
    ),
    (
        r"\b(classify|categori[sz]e|triage|route|prioriti[sz]e|score|qualify|tag|label|detect|sort|rank|filter)\b",
        Archetype::Classifier,
        &["text_classifier", "sentiment_analyzer", "rules_engine"],
    ),
    (
        r"\b(approve|approval|review|sign[- ]?off|confirm|escalate|verify)\b",
        Archetype::HumanGate,
        &["approval_queue", "review_dashboard"],
    ),
    (
        r"\b(notify|alert|email|send|message|ping|announce|inform|remind)\b",
        Archetype::Notifier,
        &["email_sender", "slack_webhook", "sms_gateway"],
    ),
    (
        r"\b(generate|write|draft|summari[sz]e|compose|produce|translate|respond|reply|analy[sz]e)\b",
        Archetype::Generator,
        &["llm_completion", "template_renderer"],
    ),
    (
        r"\b(update|create|save|store|sync|execute|run|call|upload|insert|post|log|book|schedule|delete|archive)\b",
        Archetype::ToolExecutor,
        &["crm_api", "database_writer", "calendar_api"],
    ),
    (
        r"\b(orchestrate|coordinate|manage|delegate|plan|oversee)\b",
        Archetype::Orchestrator,
        &["task_router", "state_store"],
    ),
];

const BUILTIN_DEFAULT_TOOLS: &[&str] = &["llm_completion"];

/// Checked in order; the first noun present names the output slot
const BUILTIN_DOMAIN_NOUNS: &[&str] = &[
    "email",
    "data",
    "ticket",
    "lead",
    "report",
    "record",
    "message",
    "result",
    "response",
    "notification",
];

const BUILTIN_OUTPUT_VERBS: &[(&str, &str)] = &[
    ("fetch", "fetched_data"),
    ("retrieve", "retrieved_data"),
    ("get", "retrieved_data"),
    ("pull", "pulled_data"),
    ("load", "loaded_data"),
    ("read", "read_content"),
    ("search", "search_results"),
    ("query", "query_results"),
    ("collect", "collected_items"),
    ("gather", "gathered_items"),
    ("download", "downloaded_files"),
    ("scrape", "scraped_content"),
    ("extract", "extracted_fields"),
    ("parse", "parsed_content"),
    ("scan", "scan_results"),
    ("identify", "identified_entities"),
    ("classify", "classification"),
    ("categorize", "category"),
    ("triage", "triage_result"),
    ("route", "routing_decision"),
    ("prioritize", "priority"),
    ("score", "score"),
    ("qualify", "qualification"),
    ("tag", "tags"),
    ("detect", "detection"),
    ("filter", "filtered_items"),
    ("approve", "approval_decision"),
    ("review", "review_decision"),
    ("confirm", "confirmation"),
    ("escalate", "escalation"),
    ("verify", "verification"),
    ("notify", "notification_status"),
    ("alert", "alert_status"),
    ("send", "delivery_status"),
    ("summarize", "summary"),
    ("generate", "generated_content"),
    ("write", "written_content"),
    ("draft", "draft"),
    ("compose", "composed_message"),
    ("translate", "translation"),
    ("analyze", "analysis"),
    ("update", "update_status"),
    ("create", "created_item"),
    ("save", "saved_item"),
    ("store", "stored_item"),
    ("sync", "sync_status"),
    ("schedule", "schedule"),
    ("execute", "execution_result"),
    ("run", "run_result"),
    ("upload", "upload_status"),
    ("log", "log_entry"),
];

fn builtin_schema_fields(archetype: Archetype) -> &'static [&'static str] {
    match archetype {
        Archetype::Orchestrator => &["plan", "assignments", "status"],
        Archetype::Retriever => &["source", "records", "retrieved_at"],
        Archetype::Extractor => &["fields", "confidence", "source_ref"],
        Archetype::Classifier => &["label", "confidence", "rationale"],
        Archetype::Generator => &["content", "format", "metadata"],
        Archetype::ToolExecutor => &["tool", "result", "status"],
        Archetype::HumanGate => &["decision", "reviewer", "comments"],
        Archetype::Notifier => &["channel", "recipients", "delivery_status"],
    }
}

fn builtin_style(archetype: Archetype) -> ArchetypeStyle {
    let (color, stroke, icon) = match archetype {
        Archetype::Orchestrator => ("#6366f1", "#4338ca", "🧭"),
        Archetype::Retriever => ("#0ea5e9", "#0369a1", "🔎"),
        Archetype::Extractor => ("#14b8a6", "#0f766e", "🧩"),
        Archetype::Classifier => ("#f59e0b", "#b45309", "🏷"),
        Archetype::Generator => ("#8b5cf6", "#6d28d9", "✍"),
        Archetype::ToolExecutor => ("#64748b", "#334155", "🛠"),
        Archetype::HumanGate => ("#ef4444", "#b91c1c", "✋"),
        Archetype::Notifier => ("#22c55e", "#15803d", "📣"),
    };
    ArchetypeStyle {
        color: color.to_string(),
        stroke: stroke.to_string(),
        icon: icon.to_string(),
    }
}

static BUILTIN: Lazy<Ruleset> = Lazy::new(|| RulesetDef::builtin().compile().unwrap());

// ============================================================================
// YAML DEFINITIONS
// ============================================================================

/// One classification rule as written in YAML
#[derive(Debug, Clone, Deserialize)]
pub struct RuleDef {
    pub pattern: String,
    pub archetype: String,
    #[serde(default)]
    pub tools: Vec<String>,
}

/// Rendering style of an archetype
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArchetypeStyle {
    pub color: String,
    pub stroke: String,
    #[serde(default)]
    pub icon: String,
}

impl Default for ArchetypeStyle {
    fn default() -> Self {
        Self {
            color: "#94a3b8".to_string(),
            stroke: "#475569".to_string(),
            icon: String::new(),
        }
    }
}

/// Uncompiled ruleset (from YAML)
///
/// Archetype names are plain strings here and are checked in [`RulesetDef::compile`].
#[derive(Debug, Clone, Deserialize)]
pub struct RulesetDef {
    pub rules: Vec<RuleDef>,
    #[serde(default = "default_archetype_name")]
    pub default_archetype: String,
    #[serde(default)]
    pub default_tools: Vec<String>,
    #[serde(default)]
    pub domain_nouns: Vec<String>,
    #[serde(default)]
    pub output_verbs: HashMap<String, String>,
    #[serde(default)]
    pub schema_fields: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub styles: HashMap<String, ArchetypeStyle>,
}

fn default_archetype_name() -> String {
    Archetype::Generator.to_string()
}

impl RulesetDef {
    /// The built-in tables as an uncompiled definition
    pub fn builtin() -> Self {
        Self {
            rules: BUILTIN_RULES
                .iter()
                .map(|(pattern, archetype, tools)| RuleDef {
                    pattern: (*pattern).to_string(),
                    archetype: archetype.to_string(),
                    tools: tools.iter().map(|t| (*t).to_string()).collect(),
                })
                .collect(),
            default_archetype: default_archetype_name(),
            default_tools: BUILTIN_DEFAULT_TOOLS.iter().map(|t| (*t).to_string()).collect(),
            domain_nouns: BUILTIN_DOMAIN_NOUNS.iter().map(|n| (*n).to_string()).collect(),
            output_verbs: BUILTIN_OUTPUT_VERBS
                .iter()
                .map(|(v, o)| ((*v).to_string(), (*o).to_string()))
                .collect(),
            schema_fields: Archetype::ALL
                .into_iter()
                .map(|a| {
                    let fields = builtin_schema_fields(a).iter().map(|f| (*f).to_string());
                    (a.to_string(), fields.collect())
                })
                .collect(),
            styles: Archetype::ALL
                .into_iter()
                .map(|a| (a.to_string(), builtin_style(a)))
                .collect(),
        }
    }

    /// Compile patterns and resolve archetype names
    pub fn compile(self) -> Result<Ruleset> {
        if self.rules.is_empty() {
            return Err(PlanError::EmptyRuleset);
        }

        let mut rules = Vec::with_capacity(self.rules.len());
        for def in self.rules {
            rules.push(ArchetypeRule {
                pattern: compile_pattern(&def.pattern)?,
                archetype: def.archetype.parse()?,
                tools: def.tools,
            });
        }

        let mut domain_nouns = Vec::with_capacity(self.domain_nouns.len());
        for noun in self.domain_nouns {
            let noun = noun.to_lowercase();
            let pattern = compile_pattern(&format!(r"\b{}s?\b", regex::escape(&noun)))?;
            domain_nouns.push((noun, pattern));
        }

        let mut schema_fields = HashMap::with_capacity(self.schema_fields.len());
        for (name, fields) in self.schema_fields {
            schema_fields.insert(name.parse::<Archetype>()?, fields);
        }

        let mut styles = HashMap::with_capacity(self.styles.len());
        for (name, style) in self.styles {
            styles.insert(name.parse::<Archetype>()?, style);
        }

        Ok(Ruleset {
            rules,
            default_archetype: self.default_archetype.parse()?,
            default_tools: self.default_tools,
            domain_nouns,
            output_verbs: self
                .output_verbs
                .into_iter()
                .map(|(verb, output)| (verb.to_lowercase(), output))
                .collect(),
            schema_fields,
            styles,
        })
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| PlanError::InvalidRulePattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

// ============================================================================
// COMPILED RULESET
// ============================================================================

/// Compiled classification rule
#[derive(Debug, Clone)]
pub struct ArchetypeRule {
    pattern: Regex,
    archetype: Archetype,
    tools: Vec<String>,
}

impl ArchetypeRule {
    pub fn archetype(&self) -> Archetype {
        self.archetype
    }

    pub fn tools(&self) -> &[String] {
        &self.tools
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Result of classifying one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification<'a> {
    pub archetype: Archetype,
    pub tools: &'a [String],
}

/// Immutable rule tables, see module docs
#[derive(Debug, Clone)]
pub struct Ruleset {
    rules: Vec<ArchetypeRule>,
    default_archetype: Archetype,
    default_tools: Vec<String>,
    domain_nouns: Vec<(String, Regex)>,
    output_verbs: HashMap<String, String>,
    schema_fields: HashMap<Archetype, Vec<String>>,
    styles: HashMap<Archetype, ArchetypeStyle>,
}

impl Default for Ruleset {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Ruleset {
    /// The built-in tables
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Load a complete alternative ruleset from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let def: RulesetDef = serde_yaml::from_str(yaml)?;
        def.compile()
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    pub fn rules(&self) -> &[ArchetypeRule] {
        &self.rules
    }

    /// First matching rule wins; no match yields the default archetype
    pub fn classify(&self, text: &str) -> Classification<'_> {
        self.rules
            .iter()
            .find(|rule| rule.matches(text))
            .map(|rule| Classification {
                archetype: rule.archetype,
                tools: &rule.tools,
            })
            .unwrap_or(Classification {
                archetype: self.default_archetype,
                tools: &self.default_tools,
            })
    }

    /// Tools of the first rule for `archetype` (empty when no rule targets it)
    pub fn tools_for(&self, archetype: Archetype) -> &[String] {
        self.rules
            .iter()
            .find(|rule| rule.archetype == archetype)
            .map_or(&[], |rule| rule.tools.as_slice())
    }

    /// First configured domain noun present in `text` (as a whole word)
    pub fn domain_noun_in(&self, text: &str) -> Option<&str> {
        self.domain_nouns
            .iter()
            .find(|(_, pattern)| pattern.is_match(text))
            .map(|(noun, _)| noun.as_str())
    }

    pub fn output_for_verb(&self, verb: &str) -> Option<&str> {
        self.output_verbs
            .get(&verb.to_lowercase())
            .map(String::as_str)
    }

    pub fn schema_fields(&self, archetype: Archetype) -> Vec<String> {
        match self.schema_fields.get(&archetype) {
            Some(fields) => fields.clone(),
            None => FALLBACK_SCHEMA_FIELDS.iter().map(|f| (*f).to_string()).collect(),
        }
    }

    pub fn style(&self, archetype: Archetype) -> ArchetypeStyle {
        self.styles.get(&archetype).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_classifies_spec_chain() {
        let rules = Ruleset::builtin();
        assert_eq!(rules.classify("Fetch data").archetype, Archetype::Retriever);
        assert_eq!(rules.classify("extract fields").archetype, Archetype::Extractor);
        assert_eq!(rules.classify("notify team").archetype, Archetype::Notifier);
    }

    #[test]
    fn first_matching_rule_wins() {
        let rules = Ruleset::builtin();
        // both "fetch" (Retriever) and "email" (Notifier) match
        let c = rules.classify("fetch the email thread");
        assert_eq!(c.archetype, Archetype::Retriever);
        assert_eq!(c.tools[0], "http_client");
    }

    #[test]
    fn classification_is_word_bounded_and_case_insensitive() {
        let rules = Ruleset::builtin();
        assert_eq!(rules.classify("NOTIFY the team").archetype, Archetype::Notifier);
        // "budget" contains "get" but not as a word
        assert_eq!(rules.classify("budget things").archetype, Archetype::Generator);
    }

    #[test]
    fn unmatched_text_gets_default_archetype() {
        let rules = Ruleset::builtin();
        let c = rules.classify("ponder deeply");
        assert_eq!(c.archetype, Archetype::Generator);
        assert_eq!(c.tools, ["llm_completion".to_string()]);
    }

    #[test]
    fn domain_nouns_in_declared_order() {
        let rules = Ruleset::builtin();
        assert_eq!(rules.domain_noun_in("send the report by email"), Some("email"));
        assert_eq!(rules.domain_noun_in("update Tickets"), Some("ticket"));
        assert_eq!(rules.domain_noun_in("notify team"), None);
        // "update" must not match "data"
        assert_eq!(rules.domain_noun_in("update crm"), None);
    }

    #[test]
    fn verb_table_lookup() {
        let rules = Ruleset::builtin();
        assert_eq!(rules.output_for_verb("Extract"), Some("extracted_fields"));
        assert_eq!(rules.output_for_verb("ponder"), None);
    }

    #[test]
    fn yaml_ruleset_replaces_builtin_tables() {
        let yaml = r#"
rules:
  - pattern: '\b(invoice)\b'
    archetype: tool_executor
    tools: [billing_api]
default_archetype: Orchestrator
schema_fields:
  ToolExecutor: [invoice_id, amount]
"#;
        let rules = Ruleset::from_yaml(yaml).unwrap();
        let c = rules.classify("Invoice the customer");
        assert_eq!(c.archetype, Archetype::ToolExecutor);
        assert_eq!(c.tools, ["billing_api".to_string()]);
        assert_eq!(rules.classify("fetch data").archetype, Archetype::Orchestrator);
        assert_eq!(rules.schema_fields(Archetype::ToolExecutor), vec!["invoice_id", "amount"]);
        // archetypes without fields fall back
        assert_eq!(rules.schema_fields(Archetype::Notifier), vec!["data", "status"]);
        assert_eq!(rules.style(Archetype::Notifier), ArchetypeStyle::default());
        assert_eq!(rules.domain_noun_in("data"), None);
    }

    #[test]
    fn yaml_with_bad_pattern_is_rejected() {
        let yaml = "rules:\n  - pattern: '(unclosed'\n    archetype: Retriever\n";
        let err = Ruleset::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, PlanError::InvalidRulePattern { .. }));
    }

    #[test]
    fn yaml_with_unknown_archetype_is_rejected() {
        let yaml = "rules:\n  - pattern: 'x'\n    archetype: Wizard\n";
        let err = Ruleset::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, PlanError::UnknownArchetype { .. }));
    }

    #[test]
    fn empty_rules_are_rejected() {
        let err = Ruleset::from_yaml("rules: []\n").unwrap_err();
        assert!(matches!(err, PlanError::EmptyRuleset));
    }

    #[test]
    fn every_archetype_has_builtin_style_and_fields() {
        let rules = Ruleset::builtin();
        for archetype in Archetype::ALL {
            assert_ne!(rules.style(archetype), ArchetypeStyle::default());
            assert_ne!(rules.schema_fields(archetype), vec!["data", "status"]);
        }
    }
}
