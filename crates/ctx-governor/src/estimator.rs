//! Estimator seam: how many units a prospective operation will consume.
//!
//! Estimation lives outside the governor. This module defines the trait the
//! caller plugs in, a character-ratio estimator for quick use, and the
//! fallback rule: an estimator failure is transient, so the profile's
//! default estimate stands in and planning continues.

use crate::profile::Profile;
use tracing::warn;

/// Default characters per token (conservative estimate for English text).
/// Most tokenizers average 3-4 chars per token; 3.5 is a middle ground.
pub const DEFAULT_CHARS_PER_TOKEN: f64 = 3.5;

/// Estimates units for an operation description. Must be side-effect free.
pub trait Estimator: Send + Sync {
    fn estimate(&self, description: &str) -> Result<u64, String>;
}

/// Estimates units as `ceil(chars / chars_per_token)`.
#[derive(Debug, Clone, Copy)]
pub struct CharRatioEstimator {
    chars_per_token: f64,
}

impl Default for CharRatioEstimator {
    fn default() -> Self {
        Self {
            chars_per_token: DEFAULT_CHARS_PER_TOKEN,
        }
    }
}

impl CharRatioEstimator {
    /// Use a calibrated ratio. `None` or a non-positive value keeps the default.
    pub fn with_calibration(calibrated_cpt: Option<f64>) -> Self {
        let chars_per_token = calibrated_cpt
            .filter(|cpt| cpt.is_finite() && *cpt > 0.0)
            .unwrap_or(DEFAULT_CHARS_PER_TOKEN);
        Self { chars_per_token }
    }

    pub fn chars_per_token(&self) -> f64 {
        self.chars_per_token
    }
}

impl Estimator for CharRatioEstimator {
    fn estimate(&self, description: &str) -> Result<u64, String> {
        let chars = description.chars().count();
        Ok((chars as f64 / self.chars_per_token).ceil() as u64)
    }
}

/// Estimate one operation, falling back to the profile default on failure.
pub fn estimate_or_default(estimator: &dyn Estimator, description: &str, profile: Profile) -> u64 {
    match estimator.estimate(description) {
        Ok(units) => units,
        Err(e) => {
            let fallback = profile.default_estimate();
            warn!("estimator failed ({e}); assuming {fallback} units for {profile} operation");
            fallback
        }
    }
}

/// Estimate a batch in order.
pub fn estimate_batch(
    estimator: &dyn Estimator,
    descriptions: &[&str],
    profile: Profile,
) -> Vec<u64> {
    descriptions
        .iter()
        .map(|d| estimate_or_default(estimator, d, profile))
        .collect()
}
