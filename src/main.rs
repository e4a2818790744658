//! agentplan CLI - plan, validate, lay out and export agent workflows

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use agentplan::api::handle_plan_request_json;
use agentplan::schema::load_plan_file;
use agentplan::{
    to_flow_diagram, to_sequence_diagram, validate_plan, AppConfig, FixSuggestion, Plan,
    PlanError, PlanLayout, Severity, ValidationResult,
};

#[derive(Parser)]
#[command(name = "agentplan")]
#[command(about = "Turn workflow descriptions into agent DAG plans")]
#[command(version)]
struct Cli {
    /// Config file (YAML); defaults to $AGENTPLAN_CONFIG or ./agentplan.yaml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More logging on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a workflow from a description
    Plan {
        /// Natural-language workflow description
        description: String,

        /// Use a canned template instead of planning from text
        #[arg(short, long)]
        template: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Also save the plan JSON into this directory
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List canned template keys in match priority order
    Templates,

    /// Validate a plan JSON file (exit 1 on errors)
    Validate {
        /// Path to plan .json file
        file: PathBuf,
    },

    /// Print the positioned graph of a plan as JSON
    Layout {
        /// Path to plan .json file
        file: PathBuf,
    },

    /// Export a plan as a Mermaid diagram or a named JSON file
    Export {
        /// Path to plan .json file
        file: PathBuf,

        /// Diagram notation to print
        #[arg(long, value_enum, required_unless_present = "json_dir", conflicts_with = "json_dir")]
        diagram: Option<DiagramKind>,

        /// Write `<title>.json` into this directory
        #[arg(long)]
        json_dir: Option<PathBuf>,
    },

    /// Answer a plan request JSON (stdin when FILE is omitted)
    Request {
        /// Path to request .json file
        file: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Flow,
    Sequence,
    Layout,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DiagramKind {
    Flow,
    Sequence,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        if let Some(PlanError::SchemaValidationFailed { errors }) = e.downcast_ref::<PlanError>() {
            for error in errors {
                eprintln!("  {} {}", "•".red(), error);
            }
        }
        if let Some(suggestion) = e.downcast_ref::<PlanError>().and_then(|e| e.fix_suggestion()) {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

/// Logs go to stderr; RUST_LOG overrides the -v level
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Plan {
            description,
            template,
            format,
            out,
        } => plan_command(&config, &description, template.as_deref(), format, out.as_deref()),
        Commands::Templates => templates_command(&config),
        Commands::Validate { file } => validate_command(&file),
        Commands::Layout { file } => {
            let plan = read_plan(&file)?;
            let layout = PlanLayout::compute(&plan, &config.layout);
            println!("{}", serde_json::to_string_pretty(&layout)?);
            Ok(())
        }
        Commands::Export {
            file,
            diagram,
            json_dir,
        } => export_command(&file, diagram, json_dir.as_deref()),
        Commands::Request { file } => request_command(&config, file.as_deref()),
    }
}

fn plan_command(
    config: &AppConfig,
    description: &str,
    template: Option<&str>,
    format: OutputFormat,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    let planner = config.build_planner()?;

    let plan = match template {
        Some(key) => {
            let mut plan = planner.get_template(key).ok_or_else(|| PlanError::TemplateNotFound {
                key: key.to_string(),
                available: planner.template_keys().iter().map(|k| k.to_string()).collect(),
            })?;
            plan.description = description.to_string();
            plan
        }
        None => planner.plan_from_description(description),
    };

    let result = validate_plan(&plan);
    print_findings(&result);

    match format {
        OutputFormat::Json => println!("{}", plan.to_pretty_json()?),
        OutputFormat::Flow => print!("{}", to_flow_diagram(&plan)),
        OutputFormat::Sequence => print!("{}", to_sequence_diagram(&plan)),
        OutputFormat::Layout => {
            let layout = PlanLayout::compute(&plan, &config.layout);
            println!("{}", serde_json::to_string_pretty(&layout)?);
        }
    }

    if let Some(dir) = out {
        let path = write_plan_json(&plan, dir)?;
        eprintln!("{} Saved plan to {}", "✓".green(), path.display());
    }

    Ok(())
}

fn templates_command(config: &AppConfig) -> anyhow::Result<()> {
    let planner = config.build_planner()?;
    for entry in planner.templates().entries() {
        println!(
            "{}  {} ({} agents, keywords: {} + {})",
            entry.key.cyan().bold(),
            entry.plan.title,
            entry.plan.agents.len(),
            entry.keywords.0,
            entry.keywords.1
        );
    }
    Ok(())
}

fn validate_command(file: &Path) -> anyhow::Result<()> {
    let plan = read_plan(file)?;
    let result = validate_plan(&plan);

    for issue in result.issues() {
        let marker = match issue.severity() {
            Severity::Error => "✗".red(),
            Severity::Warning => "⚠".yellow(),
        };
        println!("  {} [{}] {}", marker, issue.check(), issue);
        if let Some(hint) = issue.suggestion() {
            println!("      {} {}", "Fix:".yellow(), hint);
        }
    }

    if !result.ok {
        bail!(
            "Plan '{}' has {} error(s)",
            plan.title,
            result.errors.len()
        );
    }

    println!("{} Plan '{}' is valid", "✓".green(), plan.title);
    println!("  Agents: {}", plan.agents.len());
    println!("  Edges: {}", plan.edges.len());
    println!("  Warnings: {}", result.warnings.len());
    Ok(())
}

fn export_command(
    file: &Path,
    diagram: Option<DiagramKind>,
    json_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let plan = read_plan(file)?;

    if let Some(kind) = diagram {
        let text = match kind {
            DiagramKind::Flow => to_flow_diagram(&plan),
            DiagramKind::Sequence => to_sequence_diagram(&plan),
        };
        print!("{}", text);
    }

    if let Some(dir) = json_dir {
        let path = write_plan_json(&plan, dir)?;
        println!("{} Saved plan to {}", "✓".green(), path.display());
    }

    Ok(())
}

fn request_command(config: &AppConfig, file: Option<&Path>) -> anyhow::Result<()> {
    let body = match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read request {}", path.display()))?,
        None => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("Failed to read request from stdin")?;
            body
        }
    };

    let planner = config.build_planner()?;
    let response = handle_plan_request_json(&planner, &body);
    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.is_success() {
        bail!("Request failed with status {}", response.status.code());
    }
    Ok(())
}

fn read_plan(path: &Path) -> anyhow::Result<Plan> {
    load_plan_file(path).with_context(|| format!("Failed to load plan {}", path.display()))
}

fn write_plan_json(plan: &Plan, dir: &Path) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    let path = dir.join(plan.download_file_name());
    fs::write(&path, plan.to_pretty_json()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

fn print_findings(result: &ValidationResult) {
    for error in &result.errors {
        eprintln!("  {} {}", "✗".red(), error);
    }
    for warning in &result.warnings {
        eprintln!("  {} {}", "⚠".yellow(), warning);
    }
}
