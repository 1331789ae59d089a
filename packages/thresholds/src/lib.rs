#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Fraud-rate severity thresholds and the rate classifier.
//!
//! Every renderer colours fraud-rate figures by [`SeverityTier`]. The tier
//! boundaries live in a [`ThresholdConfig`] held by a shared
//! [`ThresholdRegistry`]; admin settings overwrite it at runtime and every
//! later read sees the new value (last write wins).
//!
//! Renderers never read the registry directly. Callers take one
//! [`ThresholdRegistry::snapshot`] per render and pass the copied
//! [`ThresholdConfig`] down, so a single artifact always uses one
//! consistent set of boundaries.

pub mod registry;

pub use registry::{ThresholdRegistry, get_thresholds, global, set_thresholds};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Default lower boundary (percent).
pub const DEFAULT_LOW: f64 = 5.0;

/// Default upper boundary (percent).
pub const DEFAULT_MEDIUM: f64 = 10.0;

/// Errors that can occur while loading threshold settings.
#[derive(Debug, Error)]
pub enum ThresholdError {
    /// The settings document is not valid TOML or has the wrong shape.
    #[error("Invalid threshold settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// A boundary is NaN or infinite.
    #[error("Threshold '{name}' must be a finite number, got {value}")]
    NonFinite {
        /// Which boundary was invalid.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
}

/// Two-tier severity boundaries, in percent.
///
/// No ordering is enforced between `low` and `medium`: with `low >= medium`
/// the classifier still runs, the medium tier just becomes unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Rates strictly below this are [`SeverityTier::Low`].
    pub low: f64,
    /// Rates strictly below this (and not low) are [`SeverityTier::Medium`].
    pub medium: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            low: DEFAULT_LOW,
            medium: DEFAULT_MEDIUM,
        }
    }
}

impl ThresholdConfig {
    /// Classifies a fraud rate (percent) against these boundaries.
    #[must_use]
    pub fn classify(&self, rate: f64) -> SeverityTier {
        classify(rate, self)
    }

    /// Whether the medium tier can ever be returned.
    #[must_use]
    pub fn is_well_ordered(&self) -> bool {
        self.low < self.medium
    }

    /// Parses the `[thresholds]` table of an admin settings document.
    ///
    /// A missing table yields the defaults. A misordered pair is accepted
    /// (and logged) because it only degrades colouring.
    ///
    /// # Errors
    ///
    /// Returns [`ThresholdError`] if the document is not valid TOML or a
    /// boundary is not finite.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ThresholdError> {
        #[derive(Deserialize)]
        struct Document {
            #[serde(default)]
            thresholds: Option<ThresholdConfig>,
        }

        let document: Document = toml::de::from_str(toml_str)?;
        let config = document.thresholds.unwrap_or_default();
        config.validate()?;

        if !config.is_well_ordered() {
            log::warn!(
                "Threshold settings are misordered (low={} >= medium={}); the medium tier is unreachable",
                config.low,
                config.medium
            );
        }

        Ok(config)
    }

    /// Rejects non-finite boundaries.
    ///
    /// # Errors
    ///
    /// Returns [`ThresholdError::NonFinite`] naming the first bad boundary.
    pub const fn validate(&self) -> Result<(), ThresholdError> {
        if !self.low.is_finite() {
            return Err(ThresholdError::NonFinite {
                name: "low",
                value: self.low,
            });
        }
        if !self.medium.is_finite() {
            return Err(ThresholdError::NonFinite {
                name: "medium",
                value: self.medium,
            });
        }
        Ok(())
    }
}

/// Severity tier of a fraud rate.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SeverityTier {
    /// Below the low boundary.
    Low,
    /// Between the two boundaries.
    Medium,
    /// At or above the medium boundary.
    High,
}

impl SeverityTier {
    /// Canonical RGB triple shared by every renderer.
    #[must_use]
    pub const fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Low => (34, 197, 94),
            Self::Medium => (245, 158, 11),
            Self::High => (239, 68, 68),
        }
    }

    /// The [`Self::rgb`] triple as a CSS hex colour.
    #[must_use]
    pub fn hex(self) -> String {
        let (r, g, b) = self.rgb();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Human-readable (French) label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Faible",
            Self::Medium => "Modéré",
            Self::High => "Élevé",
        }
    }
}

/// Maps a fraud rate (percent) to a [`SeverityTier`].
///
/// `Low` if `rate < low`, `Medium` if `rate < medium`, else `High`.
#[must_use]
pub fn classify(rate: f64, thresholds: &ThresholdConfig) -> SeverityTier {
    if rate < thresholds.low {
        SeverityTier::Low
    } else if rate < thresholds.medium {
        SeverityTier::Medium
    } else {
        SeverityTier::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_boundaries() {
        let cfg = ThresholdConfig::default();
        assert_eq!(classify(4.999, &cfg), SeverityTier::Low);
        assert_eq!(classify(5.0, &cfg), SeverityTier::Medium);
        assert_eq!(classify(9.999, &cfg), SeverityTier::Medium);
        assert_eq!(classify(10.0, &cfg), SeverityTier::High);
        assert_eq!(classify(0.0, &cfg), SeverityTier::Low);
    }

    #[test]
    fn misordered_thresholds_never_yield_medium() {
        let cfg = ThresholdConfig {
            low: 12.0,
            medium: 8.0,
        };
        assert!(!cfg.is_well_ordered());
        for tenth in 0..300 {
            let rate = f64::from(tenth) / 10.0;
            assert_ne!(cfg.classify(rate), SeverityTier::Medium, "rate {rate}");
        }
        assert_eq!(cfg.classify(11.0), SeverityTier::Low);
        assert_eq!(cfg.classify(12.0), SeverityTier::High);
    }

    #[test]
    fn tier_hex_matches_rgb() {
        assert_eq!(SeverityTier::Low.hex(), "#22c55e");
        assert_eq!(SeverityTier::Medium.hex(), "#f59e0b");
        assert_eq!(SeverityTier::High.hex(), "#ef4444");
    }

    #[test]
    fn parses_thresholds_table() {
        let cfg = ThresholdConfig::from_toml_str("[thresholds]\nlow = 3.5\nmedium = 7\n").unwrap();
        assert!((cfg.low - 3.5).abs() < f64::EPSILON);
        assert!((cfg.medium - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_table_yields_defaults() {
        let cfg = ThresholdConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, ThresholdConfig::default());
    }

    #[test]
    fn misordered_settings_are_accepted() {
        let cfg = ThresholdConfig::from_toml_str("[thresholds]\nlow = 10\nmedium = 5\n").unwrap();
        assert!(!cfg.is_well_ordered());
    }

    #[test]
    fn non_finite_settings_are_rejected() {
        let err = ThresholdConfig::from_toml_str("[thresholds]\nlow = nan\nmedium = 5\n").unwrap_err();
        assert!(matches!(err, ThresholdError::NonFinite { name: "low", .. }));
    }
}
