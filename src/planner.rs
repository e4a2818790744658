//! Description → Plan
//!
//! Deterministic keyword planner:
//! 1. A description containing a template's keyword pair returns that template.
//! 2. Otherwise the text is split into steps on "then"/sentence/", and"
//!    delimiters, and every step becomes one agent chained to the previous one.
//! 3. No usable steps yields a single Orchestrator agent.
//!
//! The chain is strictly linear: free text never produces fan-out or fan-in.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument};

use crate::plan::{Agent, AgentInput, DataSchema, Edge, Plan};
use crate::rules::{Classification, Ruleset};
use crate::templates::TemplateRegistry;
use crate::types::Archetype;

/// Name of the external input fed to the first agent
pub const ROOT_INPUT: &str = "input_data";

/// Output slot of the fallback orchestrator
pub const FALLBACK_OUTPUT: &str = "result";

/// Fragments shorter than this (in chars) are dropped
const MIN_STEP_CHARS: usize = 4;

const TITLE_WORDS: usize = 5;
const TITLE_MAX_CHARS: usize = 40;
const NAME_PHRASE_WORDS: usize = 3;
const NAME_PHRASE_MAX_CHARS: usize = 32;

/// Step delimiters, applied in this order, each replaced by a comma
static STEP_DELIMITERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i),\s*and then\s+",
        r"(?i)\s+and then\s+",
        r"(?i)\s+then\s+",
        r"\.\s+",
        r"(?i),\s*and\s+",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Split a description into an ordered list of step texts
pub fn split_steps(description: &str) -> Vec<String> {
    let mut normalized = description.to_string();
    for delimiter in STEP_DELIMITERS.iter() {
        normalized = delimiter.replace_all(&normalized, ",").into_owned();
    }

    normalized
        .split(',')
        .map(|fragment| fragment.trim().trim_end_matches('.').trim_end())
        .filter(|fragment| fragment.chars().count() >= MIN_STEP_CHARS)
        .map(str::to_string)
        .collect()
}

/// Builds plans from templates or free text
#[derive(Debug, Clone)]
pub struct Planner {
    rules: Ruleset,
    templates: TemplateRegistry,
}

impl Default for Planner {
    fn default() -> Self {
        Self::new(Ruleset::builtin(), TemplateRegistry::builtin())
    }
}

impl Planner {
    pub fn new(rules: Ruleset, templates: TemplateRegistry) -> Self {
        Self { rules, templates }
    }

    pub fn rules(&self) -> &Ruleset {
        &self.rules
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Template keys in matching priority order
    pub fn template_keys(&self) -> Vec<&str> {
        self.templates.keys().collect()
    }

    /// Canned plan for `key`, or `None` if the key is unknown
    pub fn get_template(&self, key: &str) -> Option<Plan> {
        self.templates.get(key).cloned()
    }

    /// Archetype and tool list for one step (first matching rule)
    pub fn classify_step<'r>(&'r self, step: &str) -> Classification<'r> {
        self.rules.classify(step)
    }

    /// Total over strings: the worst case is the one-agent fallback plan
    #[instrument(skip(self, description), fields(len = description.len()))]
    pub fn plan_from_description(&self, description: &str) -> Plan {
        if let Some(entry) = self.templates.match_description(description) {
            info!(template = %entry.key, "description matched canned template");
            let mut plan = entry.plan.clone();
            plan.description = description.to_string();
            return plan;
        }

        let steps = split_steps(description);
        debug!(steps = steps.len(), "split description into steps");

        if steps.is_empty() {
            info!("no usable steps, using fallback orchestrator plan");
            return self.fallback_plan(description);
        }

        let mut plan = Plan::new(title_from(description), description);
        let mut previous: Option<(String, String)> = None;

        for (index, step) in steps.iter().enumerate() {
            let classification = self.classify_step(step);
            let archetype = classification.archetype;
            let id = format!("{}_{}", archetype.slug(), index + 1);
            let output = self.output_slot(step, index);
            debug!(step = %step, %archetype, %output, "classified step");

            let input = match &previous {
                None => AgentInput::root(ROOT_INPUT),
                Some((prev_id, prev_output)) => AgentInput::from_agent(prev_id, prev_output),
            };

            plan.agents.push(
                Agent::new(&id, display_name(step, archetype), archetype, capitalize(step))
                    .with_input(input)
                    .with_output(&output)
                    .with_tools(classification.tools.iter().cloned()),
            );

            if let Some((prev_id, prev_output)) = &previous {
                plan.edges.push(Edge::new(prev_id, &id, prev_output));
            }

            plan = plan.with_schema(&output, DataSchema::new(self.rules.schema_fields(archetype)));
            previous = Some((id, output));
        }

        plan
    }

    /// Output slot: domain noun, then verb table, then positional name
    fn output_slot(&self, step: &str, index: usize) -> String {
        if let Some(noun) = self.rules.domain_noun_in(step) {
            return format!("{}_output", noun);
        }
        if let Some(output) = leading_verb(step).and_then(|v| self.rules.output_for_verb(&v)) {
            return output.to_string();
        }
        format!("step_{}_output", index + 1)
    }

    fn fallback_plan(&self, description: &str) -> Plan {
        let archetype = Archetype::Orchestrator;
        let summary = if description.trim().is_empty() {
            "Coordinates the workflow end to end".to_string()
        } else {
            capitalize(description.trim())
        };

        Plan::new(title_from(description), description)
            .with_agent(
                Agent::new("orchestrator_1", "Orchestrator", archetype, summary)
                    .with_input(AgentInput::root(ROOT_INPUT))
                    .with_output(FALLBACK_OUTPUT)
                    .with_tools(self.rules.tools_for(archetype).iter().cloned())
                    .with_note("No actionable steps were found in the description"),
            )
            .with_schema(
                FALLBACK_OUTPUT,
                DataSchema::new(self.rules.schema_fields(archetype)),
            )
    }
}

// ============================================================================
// TEXT HELPERS
// ============================================================================

fn leading_verb(step: &str) -> Option<String> {
    step.split_whitespace()
        .next()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|w| !w.is_empty())
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        text.chars().take(max).collect::<String>().trim_end().to_string()
    }
}

/// "Fetch Data From (Retriever)": leading verb plus up to two words
fn display_name(step: &str, archetype: Archetype) -> String {
    let phrase = step
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .take(NAME_PHRASE_WORDS)
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");

    if phrase.is_empty() {
        return archetype.label().to_string();
    }
    format!(
        "{} ({})",
        truncate_chars(&phrase, NAME_PHRASE_MAX_CHARS),
        archetype.label()
    )
}

fn title_from(description: &str) -> String {
    let head = description
        .split_whitespace()
        .take(TITLE_WORDS)
        .collect::<Vec<_>>()
        .join(" ");
    let head = head.trim_end_matches(|c: char| c.is_ascii_punctuation());

    if head.is_empty() {
        return "Custom Workflow".to_string();
    }
    format!("{} Workflow", truncate_chars(&capitalize(head), TITLE_MAX_CHARS))
}
