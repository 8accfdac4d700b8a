//! Process-wide governor configuration.
//!
//! A [`GovernorConfig`] is built once at startup, validated, and then shared
//! read-only across every session as an `Arc<GovernorConfig>`. Nothing in the
//! crate mutates it after construction.
//!
//! # Examples
//!
//! Defaults match the documented thresholds (30% / 50% / 80% tiers, 50% MECW,
//! breaker trips after 3 sustained readings, 10-sample history):
//!
//! ```
//! use ctx_governor::config::GovernorConfig;
//!
//! let config = GovernorConfig::default();
//! assert_eq!(config.trip_threshold, 3);
//! assert!(config.validate().is_ok());
//! ```
//!
//! Overrides with builder methods:
//!
//! ```
//! use ctx_governor::config::GovernorConfig;
//!
//! let config = GovernorConfig::default()
//!     .with_trip_threshold(5)
//!     .with_history_window(20)
//!     .with_ack_timeout_secs(10);
//! assert_eq!(config.history_window, 20);
//! ```
//!
//! Loading from JSON validates the document against the generated schema
//! first, so misspelled keys are rejected rather than ignored:
//!
//! ```
//! use ctx_governor::config::GovernorConfig;
//!
//! let config = GovernorConfig::from_json_str(r#"{ "trip_threshold": 4 }"#).unwrap();
//! assert_eq!(config.trip_threshold, 4);
//! assert!(GovernorConfig::from_json_str(r#"{ "trip_treshold": 4 }"#).is_err());
//! ```

use crate::error::{GovernorError, Result};
use crate::profile::Profile;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ── Tier boundaries ───────────────────────────────────────────────

/// Lower bounds (inclusive) of the MODERATE, HIGH and CRITICAL tiers.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TierThresholds {
    /// Ratio at which usage becomes MODERATE. Default: 0.30.
    pub moderate: f64,
    /// Ratio at which usage becomes HIGH. Default: 0.50.
    pub high: f64,
    /// Ratio at which usage becomes CRITICAL. Default: 0.80.
    pub critical: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            moderate: 0.30,
            high: 0.50,
            critical: 0.80,
        }
    }
}

// ── Profile table ─────────────────────────────────────────────────

/// Safe-budget fraction of total capacity, one entry per [`Profile`].
///
/// A struct rather than a map so every profile always has a value and a
/// misspelled key fails validation instead of falling back silently.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileTable {
    pub code_generation: f64,
    pub code_review: f64,
    pub data_analysis: f64,
    pub documentation: f64,
    pub conversation: f64,
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self {
            code_generation: 0.40,
            code_review: 0.50,
            data_analysis: 0.35,
            documentation: 0.45,
            conversation: 0.50,
        }
    }
}

impl ProfileTable {
    /// Target ratio for a profile.
    pub fn ratio(&self, profile: Profile) -> f64 {
        match profile {
            Profile::CodeGeneration => self.code_generation,
            Profile::CodeReview => self.code_review,
            Profile::DataAnalysis => self.data_analysis,
            Profile::Documentation => self.documentation,
            Profile::Conversation => self.conversation,
        }
    }
}

// ── GovernorConfig ────────────────────────────────────────────────

/// Thresholds and limits shared by all sessions.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GovernorConfig {
    /// Pressure tier boundaries.
    pub tiers: TierThresholds,
    /// Maximum effective context window as a usage ratio. Default: 0.50.
    pub mecw_threshold: f64,
    /// Safe-budget fraction per profile.
    pub profiles: ProfileTable,
    /// Consecutive HIGH/CRITICAL readings that trip the breaker. Default: 3.
    pub trip_threshold: u32,
    /// Samples retained in each session's history ring. Default: 10.
    pub history_window: usize,
    /// Most recent deltas averaged by the trend projector. Default: 5.
    pub trend_window: usize,
    /// Seconds to wait for a checkpoint acknowledgment before logging an
    /// advisory and letting the caller proceed. Default: 30.
    pub ack_timeout_secs: u64,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            tiers: TierThresholds::default(),
            mecw_threshold: 0.50,
            profiles: ProfileTable::default(),
            trip_threshold: 3,
            history_window: 10,
            trend_window: 5,
            ack_timeout_secs: 30,
        }
    }
}

impl GovernorConfig {
    pub fn with_tiers(mut self, tiers: TierThresholds) -> Self {
        self.tiers = tiers;
        self
    }

    pub fn with_mecw_threshold(mut self, threshold: f64) -> Self {
        self.mecw_threshold = threshold;
        self
    }

    pub fn with_profiles(mut self, profiles: ProfileTable) -> Self {
        self.profiles = profiles;
        self
    }

    pub fn with_trip_threshold(mut self, threshold: u32) -> Self {
        self.trip_threshold = threshold;
        self
    }

    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    pub fn with_trend_window(mut self, window: usize) -> Self {
        self.trend_window = window;
        self
    }

    pub fn with_ack_timeout_secs(mut self, secs: u64) -> Self {
        self.ack_timeout_secs = secs;
        self
    }

    /// Acknowledgment timeout as a [`Duration`].
    pub fn ack_timeout(&self) -> Duration {
        Duration::from_secs(self.ack_timeout_secs)
    }

    /// Check internal consistency.
    ///
    /// Tier boundaries must be strictly increasing and positive, ratios must
    /// be finite and positive, and the breaker and history windows non-zero.
    pub fn validate(&self) -> Result<()> {
        let t = &self.tiers;
        let ratios = [
            ("tiers.moderate", t.moderate),
            ("tiers.high", t.high),
            ("tiers.critical", t.critical),
            ("mecw_threshold", self.mecw_threshold),
            ("profiles.code_generation", self.profiles.code_generation),
            ("profiles.code_review", self.profiles.code_review),
            ("profiles.data_analysis", self.profiles.data_analysis),
            ("profiles.documentation", self.profiles.documentation),
            ("profiles.conversation", self.profiles.conversation),
        ];
        for (name, value) in ratios {
            if !value.is_finite() || value <= 0.0 {
                return Err(GovernorError::InvalidConfig(format!(
                    "{name} must be a positive finite ratio, got {value}"
                )));
            }
        }
        if !(t.moderate < t.high && t.high < t.critical) {
            return Err(GovernorError::InvalidConfig(format!(
                "tier boundaries must be strictly increasing, got {} / {} / {}",
                t.moderate, t.high, t.critical
            )));
        }
        if self.trip_threshold == 0 {
            return Err(GovernorError::InvalidConfig(
                "trip_threshold must be at least 1".into(),
            ));
        }
        if self.history_window < 2 {
            return Err(GovernorError::InvalidConfig(format!(
                "history_window must hold at least 2 samples, got {}",
                self.history_window
            )));
        }
        if self.trend_window == 0 {
            return Err(GovernorError::InvalidConfig(
                "trend_window must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// JSON Schema for the configuration document.
    pub fn json_schema() -> serde_json::Value {
        let schema = schemars::schema_for!(GovernorConfig);
        serde_json::to_value(schema)
            .unwrap_or_else(|_| serde_json::json!({"type": "object", "properties": {}}))
    }

    /// Parse, schema-check and validate a JSON configuration document.
    ///
    /// Keys left out take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;

        let schema = Self::json_schema();
        let validator = jsonschema::validator_for(&schema)
            .map_err(|e| GovernorError::InvalidConfig(format!("schema is invalid: {e}")))?;
        let errors: Vec<String> = validator
            .iter_errors(&value)
            .map(|e| format!("  - {}: {e}", e.instance_path()))
            .collect();
        if !errors.is_empty() {
            return Err(GovernorError::InvalidConfig(format!(
                "schema validation failed:\n{}",
                errors.join("\n")
            )));
        }

        let config: GovernorConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }
}
