//! Wait catalog and its JSON configuration
//!
//! The catalog maps `(resource type, intent)` to a validated [`WaitSpec`].
//! Built-in presets come from the service packages; a JSON file can override
//! them per entry:
//!
//! ```json
//! {
//!   "waits": {
//!     "aws_neptune_global_cluster": {
//!       "update": { "target": ["available"], "timeout_secs": 5400 }
//!     }
//!   }
//! }
//! ```

use crate::error::ConfigError;
use converge_common::defaults::{
    default_initial_delay_ms, default_jitter, default_max_delay_ms, default_multiplier,
    default_not_found_grace_secs,
};
use converge_waiter::{WaitIntent, WaitSpec, WaitTimeout};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// One wait as written in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaitSpecConfig {
    /// Statuses that end the wait successfully
    #[serde(default)]
    pub target: Vec<String>,

    /// Statuses that end the wait with a fatal error
    #[serde(default)]
    pub failure: Vec<String>,

    /// Optional; must match the key the entry is stored under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<WaitIntent>,

    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Fraction in [0, 1] each sleep may be stretched by
    #[serde(default = "default_jitter")]
    pub jitter: f64,

    /// Missing or 0 waits until cancelled
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Poll exactly once, ignoring `timeout_secs`
    #[serde(default)]
    pub poll_once: bool,

    /// How long NotFound is treated as "not visible yet"
    #[serde(default = "default_not_found_grace_secs")]
    pub not_found_grace_secs: u64,
}

impl Default for WaitSpecConfig {
    fn default() -> Self {
        Self {
            target: Vec::new(),
            failure: Vec::new(),
            intent: None,
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            multiplier: default_multiplier(),
            jitter: default_jitter(),
            timeout_secs: None,
            poll_once: false,
            not_found_grace_secs: default_not_found_grace_secs(),
        }
    }
}

impl WaitSpecConfig {
    /// Preset with the given target and failure statuses
    pub fn statuses<const T: usize, const F: usize>(target: [&str; T], failure: [&str; F]) -> Self {
        Self {
            target: target.iter().map(|s| s.to_string()).collect(),
            failure: failure.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn not_found_grace_secs(mut self, secs: u64) -> Self {
        self.not_found_grace_secs = secs;
        self
    }

    pub fn timeout(&self) -> WaitTimeout {
        if self.poll_once {
            WaitTimeout::PollOnce
        } else {
            WaitTimeout::from_secs(self.timeout_secs)
        }
    }

    /// Validate into a spec for `intent`
    pub fn to_spec(
        &self,
        resource_type: &str,
        intent: WaitIntent,
    ) -> Result<WaitSpec, ConfigError> {
        if let Some(declared) = self.intent {
            if declared != intent {
                return Err(ConfigError::IntentMismatch {
                    resource_type: resource_type.to_string(),
                    key: intent,
                    declared,
                });
            }
        }

        WaitSpec::builder(intent)
            .target(self.target.iter().cloned())
            .failure(self.failure.iter().cloned())
            .initial_delay(Duration::from_millis(self.initial_delay_ms))
            .max_delay(Duration::from_millis(self.max_delay_ms))
            .multiplier(self.multiplier)
            .jitter(self.jitter)
            .timeout(self.timeout())
            .not_found_grace(Duration::from_secs(self.not_found_grace_secs))
            .build()
            .map_err(|source| ConfigError::InvalidWait {
                resource_type: resource_type.to_string(),
                intent,
                source,
            })
    }
}

/// Waits configured for one resource type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntentWaits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<WaitSpecConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<WaitSpecConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<WaitSpecConfig>,
}

impl IntentWaits {
    pub fn get(&self, intent: WaitIntent) -> Option<&WaitSpecConfig> {
        match intent {
            WaitIntent::Create => self.create.as_ref(),
            WaitIntent::Update => self.update.as_ref(),
            WaitIntent::Delete => self.delete.as_ref(),
        }
    }

    pub fn set(&mut self, intent: WaitIntent, config: WaitSpecConfig) {
        let slot = match intent {
            WaitIntent::Create => &mut self.create,
            WaitIntent::Update => &mut self.update,
            WaitIntent::Delete => &mut self.delete,
        };
        *slot = Some(config);
    }

    /// Configured entries in create, update, delete order
    pub fn iter(&self) -> impl Iterator<Item = (WaitIntent, &WaitSpecConfig)> {
        [WaitIntent::Create, WaitIntent::Update, WaitIntent::Delete]
            .into_iter()
            .filter_map(|intent| self.get(intent).map(|config| (intent, config)))
    }
}

/// Wait catalog configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    #[serde(default)]
    pub waits: BTreeMap<String, IntentWaits>,
}

impl CatalogConfig {
    /// Load and validate configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::io(path.display().to_string(), e))?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        debug!(path = %path.display(), entries = config.waits.len(), "Loaded wait catalog config");
        Ok(config)
    }

    /// Check that every entry builds a valid spec
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.to_catalog().map(|_| ())
    }

    pub fn to_catalog(&self) -> Result<WaitCatalog, ConfigError> {
        let mut catalog = WaitCatalog::new();
        for (resource_type, waits) in &self.waits {
            for (intent, config) in waits.iter() {
                catalog.insert(resource_type.clone(), config.to_spec(resource_type, intent)?);
            }
        }
        Ok(catalog)
    }
}

/// Validated wait specs by resource type and intent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaitCatalog {
    specs: BTreeMap<(String, WaitIntent), WaitSpec>,
}

impl WaitCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `spec` under its own intent, replacing any previous entry
    pub fn insert(&mut self, resource_type: impl Into<String>, spec: WaitSpec) -> Option<WaitSpec> {
        self.specs.insert((resource_type.into(), spec.intent()), spec)
    }

    pub fn get(&self, resource_type: &str, intent: WaitIntent) -> Option<&WaitSpec> {
        self.specs.get(&(resource_type.to_string(), intent))
    }

    /// Replace entries with the configured ones; unconfigured entries stay
    pub fn apply(&mut self, config: &CatalogConfig) -> Result<(), ConfigError> {
        for ((resource_type, _), spec) in config.to_catalog()?.specs {
            debug!(%resource_type, intent = %spec.intent(), "Overriding wait preset");
            self.insert(resource_type, spec);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WaitSpec)> {
        self.specs.iter().map(|((resource_type, _), spec)| (resource_type.as_str(), spec))
    }
}
