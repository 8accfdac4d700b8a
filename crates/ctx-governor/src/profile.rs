//! Task profiles: the closed set of work types a session can run.
//!
//! The profile selects the safe-budget fraction (see
//! [`ProfileTable`](crate::config::ProfileTable)) and the fallback estimate
//! used when an [`Estimator`](crate::estimator::Estimator) fails.

use crate::error::GovernorError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of work a session performs.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Profile {
    CodeGeneration,
    CodeReview,
    DataAnalysis,
    Documentation,
    Conversation,
}

impl Profile {
    /// Every profile, in declaration order.
    pub const ALL: [Profile; 5] = [
        Profile::CodeGeneration,
        Profile::CodeReview,
        Profile::DataAnalysis,
        Profile::Documentation,
        Profile::Conversation,
    ];

    /// Canonical kebab-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Profile::CodeGeneration => "code-generation",
            Profile::CodeReview => "code-review",
            Profile::DataAnalysis => "data-analysis",
            Profile::Documentation => "documentation",
            Profile::Conversation => "conversation",
        }
    }

    /// Units assumed for one operation when the estimator is unavailable.
    pub fn default_estimate(self) -> u64 {
        match self {
            Profile::CodeGeneration => 8_000,
            Profile::CodeReview => 6_000,
            Profile::DataAnalysis => 10_000,
            Profile::Documentation => 5_000,
            Profile::Conversation => 2_000,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = GovernorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Profile::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| GovernorError::UnknownProfile {
                name: s.to_string(),
                expected: Profile::ALL
                    .iter()
                    .map(|p| p.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}
