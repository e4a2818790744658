//! CLI configuration
//!
//! YAML file with layout metrics and an optional alternative ruleset.
//!
//! ## Resolution order (first hit wins)
//!
//! 1. `--config <path>`
//! 2. `AGENTPLAN_CONFIG` environment variable
//! 3. `./agentplan.yaml` if it exists
//! 4. Defaults
//!
//! An explicitly named file that is missing or malformed is an error; a
//! missing default file is not.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlanError, Result};
use crate::layout::LayoutConfig;
use crate::planner::Planner;
use crate::rules::Ruleset;
use crate::templates::TemplateRegistry;

pub const CONFIG_ENV: &str = "AGENTPLAN_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "agentplan.yaml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Alternative ruleset YAML (relative paths resolve against the config file)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<PathBuf>,
}

impl AppConfig {
    /// Load using the resolution order above
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match resolve_config_path(explicit, std::env::var_os(CONFIG_ENV), Path::new(".")) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| PlanError::Config {
            reason: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let mut config = Self::from_yaml(&content).map_err(|e| PlanError::Config {
            reason: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        if let (Some(rules), Some(dir)) = (&config.rules, path.parent()) {
            if rules.is_relative() {
                config.rules = Some(dir.join(rules));
            }
        }

        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Planner with the configured ruleset and the built-in templates
    pub fn build_planner(&self) -> Result<Planner> {
        let rules = match &self.rules {
            Some(path) => Ruleset::from_file(path)?,
            None => Ruleset::builtin(),
        };
        Ok(Planner::new(rules, TemplateRegistry::builtin()))
    }
}

fn resolve_config_path(
    explicit: Option<&Path>,
    env_value: Option<OsString>,
    dir: &Path,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(value) = env_value.filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(value));
    }
    let default = dir.join(DEFAULT_CONFIG_FILE);
    default.exists().then_some(default)
}
