//! `PlannerConfig`: run settings loaded from TOML.
//!
//! ```toml
//! agent = "agent"
//! time = 250
//! verbosity = "summary"
//!
//! [policy]
//! max_depth = 1000
//! max_steps = 1000000
//! deadline_ms = 5000
//!
//! [pruner]
//! depth_ceiling = 900
//! repeat_window = 10
//!
//! [[pruner.thresholds]]
//! tool = "wooden_axe"
//! resource = "wood"
//! max_demand = 9
//! ```
//!
//! Every key is optional; missing keys take the defaults shown.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use trellis_search::policy::{PlanPolicy, PolicyError, Verbosity};

use crate::pruner::{CraftingPruner, ToolThreshold};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid planner config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Policy(#[from] PolicyError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerbositySetting {
    #[default]
    Silent,
    Summary,
    Trace,
}

impl From<VerbositySetting> for Verbosity {
    fn from(setting: VerbositySetting) -> Self {
        match setting {
            VerbositySetting::Silent => Self::Silent,
            VerbositySetting::Summary => Self::Summary,
            VerbositySetting::Trace => Self::Trace,
        }
    }
}

/// Search budgets; missing keys fall back to [`PlanPolicy::default`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicySettings {
    pub max_depth: Option<usize>,
    pub max_steps: Option<u64>,
    pub deadline_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrunerSettings {
    pub depth_ceiling: usize,
    pub repeat_window: usize,
    pub thresholds: Vec<ToolThreshold>,
}

impl Default for PrunerSettings {
    fn default() -> Self {
        Self {
            depth_ceiling: CraftingPruner::DEFAULT_DEPTH_CEILING,
            repeat_window: CraftingPruner::DEFAULT_REPEAT_WINDOW,
            thresholds: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerConfig {
    /// Agent identity every task and attribute is keyed by.
    pub agent: String,
    /// Initial time budget.
    pub time: u64,
    pub verbosity: VerbositySetting,
    pub policy: PolicySettings,
    pub pruner: PrunerSettings,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            agent: "agent".to_string(),
            time: 250,
            verbosity: VerbositySetting::default(),
            policy: PolicySettings::default(),
            pruner: PrunerSettings::default(),
        }
    }
}

impl PlannerConfig {
    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, then as
    /// [`PlannerConfig::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// The validated search policy.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Policy`] if a budget is zero.
    pub fn plan_policy(&self) -> Result<PlanPolicy, ConfigError> {
        let defaults = PlanPolicy::default();
        let policy = PlanPolicy {
            max_depth: self.policy.max_depth.unwrap_or(defaults.max_depth),
            max_steps: self.policy.max_steps.unwrap_or(defaults.max_steps),
            deadline: self.policy.deadline_ms.map(Duration::from_millis),
        };
        policy.validate()?;
        Ok(policy)
    }

    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity.into()
    }
}
