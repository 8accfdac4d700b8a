//! Pressure classification: usage ratio to discrete tier and degradation score.
//!
//! Quality loss is roughly linear until usage reaches the compliance
//! boundary and super-linear beyond it. [`PressureClassifier::degradation_score`]
//! models that shape; [`PressureClassifier::classify`] buckets the ratio into
//! a [`PressureTier`] that drives the governor.

use crate::config::{GovernorConfig, TierThresholds};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Slope of the degradation score between the MODERATE and HIGH boundaries.
const LINEAR_SLOPE: f64 = 0.5;
/// Coefficient of the quadratic term above the HIGH boundary.
const QUADRATIC_COEFFICIENT: f64 = 4.0;

/// Discrete usage-pressure tier.
#[derive(
    Serialize, Deserialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PressureTier {
    Low,
    Moderate,
    High,
    Critical,
}

impl PressureTier {
    /// HIGH and CRITICAL count toward the circuit breaker.
    pub fn is_sustained_pressure(self) -> bool {
        matches!(self, PressureTier::High | PressureTier::Critical)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PressureTier::Low => "LOW",
            PressureTier::Moderate => "MODERATE",
            PressureTier::High => "HIGH",
            PressureTier::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for PressureTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pure mapping from usage ratio to tier, compliance and degradation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureClassifier {
    tiers: TierThresholds,
    mecw_threshold: f64,
}

impl Default for PressureClassifier {
    fn default() -> Self {
        Self::from_config(&GovernorConfig::default())
    }
}

impl PressureClassifier {
    pub fn new(tiers: TierThresholds, mecw_threshold: f64) -> Self {
        Self {
            tiers,
            mecw_threshold,
        }
    }

    pub fn from_config(config: &GovernorConfig) -> Self {
        Self::new(config.tiers, config.mecw_threshold)
    }

    /// Bucket a usage ratio. Each tier's lower bound is inclusive.
    pub fn classify(&self, ratio: f64) -> PressureTier {
        if ratio >= self.tiers.critical {
            PressureTier::Critical
        } else if ratio >= self.tiers.high {
            PressureTier::High
        } else if ratio >= self.tiers.moderate {
            PressureTier::Moderate
        } else {
            PressureTier::Low
        }
    }

    /// Diagnostic quality-loss multiplier. Never used for branching.
    ///
    /// Flat at 1.0 below the MODERATE boundary, linear with slope 0.5 up to
    /// the HIGH boundary, then quadratic. With default thresholds:
    ///
    /// - `1.0` for `ratio < 0.30`
    /// - `1.0 + (ratio - 0.30) * 0.5` for `0.30 <= ratio < 0.50`
    /// - `1.1 + (ratio - 0.50)^2 * 4` for `ratio >= 0.50`
    pub fn degradation_score(&self, ratio: f64) -> f64 {
        let moderate = self.tiers.moderate;
        let high = self.tiers.high;
        if ratio < moderate {
            1.0
        } else if ratio < high {
            1.0 + (ratio - moderate) * LINEAR_SLOPE
        } else {
            let knee = 1.0 + (high - moderate) * LINEAR_SLOPE;
            let over = ratio - high;
            knee + over * over * QUADRATIC_COEFFICIENT
        }
    }

    /// Whether usage is within the maximum effective context window.
    pub fn compliant(&self, ratio: f64) -> bool {
        ratio <= self.mecw_threshold
    }

    pub fn mecw_threshold(&self) -> f64 {
        self.mecw_threshold
    }

    pub fn tiers(&self) -> TierThresholds {
        self.tiers
    }
}
