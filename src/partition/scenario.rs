//! Scenario enumeration from a declarative job config
//!
//! The job config lists scenario files by reference. Each referenced file is
//! read and its identifier derived with the priority `spec.id` →
//! `metadata.name` → filename slug. A scenario file that cannot be read or
//! parsed is skipped; only an unreadable or malformed job config is an error.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::types::Scenario;

/// Identifier used when a filename slug comes out empty
pub const DEFAULT_SCENARIO_SLUG: &str = "scenario";

static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("Invalid regex pattern"));

/// Top-level job config document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobConfig {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub spec: JobSpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobSpec {
    #[serde(default)]
    pub scenarios: Vec<ScenarioRef>,
}

/// A scenario entry in the job config
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenarioRef {
    #[serde(default)]
    pub file: String,
}

/// The parts of a scenario file needed to identify it
#[derive(Debug, Clone, Default, Deserialize)]
struct ScenarioDocument {
    #[serde(default)]
    metadata: Metadata,
    #[serde(default)]
    spec: ScenarioSpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ScenarioSpec {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

/// Read a job config file
pub fn load_job_config(config_path: &Path) -> Result<JobConfig> {
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read job config {}", config_path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse job config {}", config_path.display()))
}

/// Resolve every scenario referenced by a job config file
///
/// File references are resolved relative to the config file's directory.
pub fn enumerate_scenarios(config_path: &Path) -> Result<Vec<Scenario>> {
    let config = load_job_config(config_path)?;
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    Ok(resolve_scenarios(&config, base_dir))
}

/// Resolve the scenario references of an already-parsed job config
pub fn resolve_scenarios(config: &JobConfig, base_dir: &Path) -> Vec<Scenario> {
    let mut scenarios = Vec::with_capacity(config.spec.scenarios.len());

    for reference in &config.spec.scenarios {
        if reference.file.trim().is_empty() {
            debug!("Skipping scenario entry without a file reference");
            continue;
        }

        match load_scenario(base_dir, &reference.file) {
            Ok(scenario) => scenarios.push(scenario),
            Err(e) => warn!("Skipping scenario {}: {:#}", reference.file, e),
        }
    }

    debug!(
        "Resolved {} of {} scenario reference(s)",
        scenarios.len(),
        config.spec.scenarios.len()
    );
    scenarios
}

/// Read one scenario file and derive its identity
pub fn load_scenario(base_dir: &Path, file: &str) -> Result<Scenario> {
    let full_path = base_dir.join(file);
    let content = fs::read_to_string(&full_path)
        .with_context(|| format!("Failed to read {}", full_path.display()))?;
    let document: ScenarioDocument = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", full_path.display()))?;

    Ok(scenario_from_document(document, file))
}

fn scenario_from_document(document: ScenarioDocument, file: &str) -> Scenario {
    let declared_name = non_empty(document.metadata.name);
    let id = non_empty(document.spec.id)
        .or_else(|| declared_name.clone())
        .unwrap_or_else(|| slug_from_filename(file));
    let name = declared_name.unwrap_or_else(|| id.clone());

    Scenario {
        id,
        name,
        path: file.to_string(),
        description: non_empty(document.spec.description),
        tags: document.spec.tags,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Pure: Derive a scenario id from a file path
///
/// All extensions are stripped, runs of non-alphanumeric characters become a
/// single hyphen and trailing hyphens are trimmed.
pub fn slug_from_filename(path: &str) -> String {
    let file_name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path);
    let stem = file_name.split('.').next().unwrap_or_default();

    let slug = NON_ALPHANUMERIC.replace_all(stem, "-");
    let slug = slug.trim_end_matches('-');

    if slug.is_empty() {
        DEFAULT_SCENARIO_SLUG.to_string()
    } else {
        slug.to_string()
    }
}
