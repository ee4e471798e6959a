//! Risk tiers derived from a predicted no-show probability.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Probabilities strictly above this are [`RiskTier::High`].
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;

/// Probabilities strictly above this (and not high) are [`RiskTier::Medium`].
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.4;

/// Ordinal no-show risk tier.
///
/// Ordering follows severity, so `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// All tiers, lowest first.
    pub const ALL: [RiskTier; 3] = [RiskTier::Low, RiskTier::Medium, RiskTier::High];

    /// Map a probability to its tier.
    ///
    /// Both thresholds are exclusive on the upper side: exactly `0.7` is
    /// `Medium` and exactly `0.4` is `Low`.
    ///
    /// # Examples
    ///
    /// ```
    /// use noshow_model::RiskTier;
    ///
    /// assert_eq!(RiskTier::from_probability(0.71), RiskTier::High);
    /// assert_eq!(RiskTier::from_probability(0.7), RiskTier::Medium);
    /// assert_eq!(RiskTier::from_probability(0.4), RiskTier::Low);
    /// ```
    pub fn from_probability(probability: f64) -> Self {
        if probability > HIGH_RISK_THRESHOLD {
            RiskTier::High
        } else if probability > MEDIUM_RISK_THRESHOLD {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-function form of [`RiskTier::from_probability`].
pub fn risk_tier(probability: f64) -> RiskTier {
    RiskTier::from_probability(probability)
}
