// Units and threshold bands
use serde::{Deserialize, Serialize};

pub const MMOL_CONVERSION_FACTOR: f64 = 18.0;
pub const LOW_CRITICAL_MULTIPLIER: f64 = 0.85;
pub const HIGH_CRITICAL_MULTIPLIER: f64 = 1.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GlucoseUnit {
    /// mg/dL
    #[default]
    Milligrams,
    /// mmol/L
    Millimolar,
}

impl GlucoseUnit {
    /// Converts a raw mg/dL value into this unit.
    pub fn convert(&self, sgv: f64) -> f64 {
        match self {
            Self::Milligrams => sgv,
            Self::Millimolar => sgv / MMOL_CONVERSION_FACTOR,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Milligrams => "mg/dL",
            Self::Millimolar => "mmol/L",
        }
    }
}

/// Warning thresholds, always in mg/dL.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub low: f64,
    pub high: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low: 70.0,
            high: 180.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningBand {
    None,
    LowWarning,
    LowCritical,
    HighWarning,
    HighCritical,
}

impl WarningBand {
    /// First match wins; a non-positive value never warns.
    pub fn classify(sgv: f64, thresholds: &Thresholds) -> Self {
        if sgv <= 0.0 {
            Self::None
        } else if sgv < thresholds.low * LOW_CRITICAL_MULTIPLIER {
            Self::LowCritical
        } else if sgv < thresholds.low {
            Self::LowWarning
        } else if sgv > thresholds.high * HIGH_CRITICAL_MULTIPLIER {
            Self::HighCritical
        } else if sgv > thresholds.high {
            Self::HighWarning
        } else {
            Self::None
        }
    }

    pub fn is_low(&self) -> bool {
        matches!(self, Self::LowWarning | Self::LowCritical)
    }

    pub fn is_high(&self) -> bool {
        matches!(self, Self::HighWarning | Self::HighCritical)
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, Self::LowCritical | Self::HighCritical)
    }
}
