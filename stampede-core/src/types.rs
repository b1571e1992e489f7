//! Batch request and launch data model

use crate::bands::BandAssigner;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How workflows in a batch are tagged for the engine's scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchMode {
    /// Five contiguous priority tiers
    #[default]
    Priority,
    /// Weighted fairness bands
    Fairness,
}

impl LaunchMode {
    /// Lenient parse used for request bodies: trimmed, case-insensitive,
    /// and anything that is not `fairness` means priority.
    pub fn from_request(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("fairness") {
            LaunchMode::Fairness
        } else {
            LaunchMode::Priority
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LaunchMode::Priority => "priority",
            LaunchMode::Fairness => "fairness",
        }
    }
}

impl fmt::Display for LaunchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LaunchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "priority" => Ok(LaunchMode::Priority),
            "fairness" => Ok(LaunchMode::Fairness),
            _ => Err(format!("Invalid launch mode: {}", s)),
        }
    }
}

/// A named, weighted fairness band with an optional fixed workflow count
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Band {
    pub key: String,
    pub weight: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

impl Band {
    pub fn new(key: impl Into<String>, weight: u32) -> Self {
        Self {
            key: key.into(),
            weight,
            count: None,
        }
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Configured count, treating an absent count as zero
    pub fn explicit_count(&self) -> u32 {
        self.count.unwrap_or(0)
    }

    /// Check the band is usable, whatever surface it arrived through
    pub fn validate(&self) -> Result<(), String> {
        if self.key.trim().is_empty() {
            return Err("key cannot be empty".to_string());
        }
        if self.weight == 0 {
            return Err("weight must be positive".to_string());
        }
        Ok(())
    }
}

impl FromStr for Band {
    type Err = String;

    /// Parses `key:weight` or `key:weight:count`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let (key, weight, count) = match parts.as_slice() {
            [key, weight] => (*key, *weight, None),
            [key, weight, count] => (*key, *weight, Some(*count)),
            _ => return Err(format!("Invalid band '{}': expected key:weight[:count]", s)),
        };

        let weight: u32 = weight
            .trim()
            .parse()
            .map_err(|e| format!("Invalid band weight in '{}': {}", s, e))?;

        let mut band = Band::new(key.trim(), weight);
        if let Some(count) = count {
            let count: u32 = count
                .trim()
                .parse()
                .map_err(|e| format!("Invalid band count in '{}': {}", s, e))?;
            band = band.with_count(count);
        }
        band.validate()
            .map_err(|e| format!("Invalid band '{}': {}", s, e))?;
        Ok(band)
    }
}

/// Bands used when a fairness batch does not name any
pub fn default_bands() -> Vec<Band> {
    vec![
        Band::new("first-class", 15),
        Band::new("business-class", 5),
        Band::new("economy-class", 1),
    ]
}

/// Immutable input to one dispatch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub id_prefix: String,
    pub count: u64,
    pub mode: LaunchMode,
    pub bands: Vec<Band>,
    pub disable_fairness: bool,
}

impl BatchRequest {
    pub fn priority(id_prefix: impl Into<String>, count: u64) -> Self {
        Self {
            id_prefix: id_prefix.into(),
            count,
            mode: LaunchMode::Priority,
            bands: Vec::new(),
            disable_fairness: false,
        }
    }

    pub fn fairness(id_prefix: impl Into<String>, count: u64, bands: Vec<Band>) -> Self {
        Self {
            id_prefix: id_prefix.into(),
            count,
            mode: LaunchMode::Fairness,
            bands,
            disable_fairness: false,
        }
    }

    pub fn with_disable_fairness(mut self, disable: bool) -> Self {
        self.disable_fairness = disable;
        self
    }

    /// Number of workflows this request launches once explicit band counts
    /// are taken into account
    pub fn effective_count(&self) -> u64 {
        match self.mode {
            LaunchMode::Priority => self.count,
            LaunchMode::Fairness => {
                BandAssigner::new(self.bands.clone()).effective_count(self.count)
            }
        }
    }

    /// Workflow id for a 1-based ordinal
    pub fn workflow_id(&self, ordinal: u64) -> String {
        format!("{}-{}", self.id_prefix, ordinal)
    }
}

/// Tier or band a single workflow is launched with
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Assignment {
    Tier(u8),
    Band { key: String, weight: u32 },
}

impl From<&Band> for Assignment {
    fn from(band: &Band) -> Self {
        Assignment::Band {
            key: band.key.clone(),
            weight: band.weight,
        }
    }
}

/// Everything needed to submit one workflow; built and consumed per ordinal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowLaunchSpec {
    pub id: String,
    pub task_queue: String,
    pub start_delay_secs: u64,
    pub assignment: Assignment,
}
