//! Types shared by the partitioner, the work queue and the workers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named conversational test case sourced from a bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    /// Path of the scenario file as referenced by the job config
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Scenario {
    pub fn new(id: impl Into<String>, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            path: path.into(),
            description: None,
            tags: Vec::new(),
        }
    }
}

/// Reference to a backend configuration a scenario is evaluated against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    /// Stable identity used for result attribution, `namespace/name`
    pub id: String,
    pub name: String,
    pub namespace: String,
}

impl Provider {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let name = name.into();
        Self {
            id: format!("{}/{}", namespace, name),
            name,
            namespace,
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    /// Parses `namespace/name`; a bare name lands in the `default` namespace
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once('/') {
            Some((ns, name)) if !ns.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self::new(ns, name))
            }
            None if !s.is_empty() => Ok(Self::new("default", s)),
            _ => Err(format!("invalid provider reference '{}'", s)),
        }
    }
}

/// Lifecycle state of a work item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkItemStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl WorkItemStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// One scenario×provider evaluation unit, the smallest retryable task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: String,
    pub job_id: String,
    pub scenario_id: String,
    pub provider_id: String,
    /// Where the worker fetches the scenario/agent bundle from
    pub bundle_url: String,
    /// Serialized JSON merge of the base config with the scenario and provider
    pub config: Vec<u8>,
    pub status: WorkItemStatus,
    /// Number of times the item has been popped
    pub attempt: u32,
    /// Retry budget; zero means "use the queue default"
    pub max_attempts: u32,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Opaque worker output, set on ack
    pub result: Option<Vec<u8>>,
    /// Last execution error, set on nack
    pub error: Option<String>,
}

impl WorkItem {
    /// Decode the opaque config payload as JSON
    pub fn config_json(&self) -> serde_json::Result<Value> {
        serde_json::from_slice(&self.config)
    }

    pub fn has_attempts_remaining(&self) -> bool {
        self.attempt < self.max_attempts
    }
}

/// Job creation request handed over by the control loop
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartitionRequest {
    pub job_id: String,
    pub bundle_url: String,
    pub scenarios: Vec<Scenario>,
    pub providers: Vec<Provider>,
    pub max_retries: u32,
    /// Job-level base configuration merged into every work item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_config: Option<Map<String, Value>>,
    /// Glob patterns a scenario must match one of
    #[serde(default)]
    pub include: Vec<String>,
    /// Glob patterns removing scenarios that passed `include`
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_id_is_namespace_qualified() {
        let provider = Provider::new("evals", "gpt-large");
        assert_eq!(provider.id, "evals/gpt-large");
        assert_eq!(provider.name, "gpt-large");
        assert_eq!(provider.namespace, "evals");
    }

    #[test]
    fn test_provider_from_str() {
        let provider: Provider = "team-a/claude".parse().unwrap();
        assert_eq!(provider.id, "team-a/claude");

        let provider: Provider = "local".parse().unwrap();
        assert_eq!(provider.id, "default/local");

        assert!("".parse::<Provider>().is_err());
        assert!("/name".parse::<Provider>().is_err());
        assert!("a/b/c".parse::<Provider>().is_err());
    }

    #[test]
    fn test_status_terminal() {
        assert!(!WorkItemStatus::Pending.is_terminal());
        assert!(!WorkItemStatus::Processing.is_terminal());
        assert!(WorkItemStatus::Completed.is_terminal());
        assert!(WorkItemStatus::Failed.is_terminal());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&WorkItemStatus::Processing).unwrap();
        assert_eq!(json, r#""processing""#);
    }
}
