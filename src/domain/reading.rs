// Glucose reading domain model
use chrono::{DateTime, Local};
use serde::Serialize;

/// Latest entry reported by the Nightscout server.
///
/// `sgv == 0` is the "no data" sentinel: a real sensor never reports zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub sgv: f64,
    pub direction: String,
    pub timestamp: i64,
}

impl Reading {
    pub fn new(sgv: f64, direction: String, timestamp: i64) -> Self {
        Self {
            sgv,
            direction,
            timestamp,
        }
    }

    pub fn no_data() -> Self {
        Self::new(0.0, String::new(), 0)
    }

    pub fn has_data(&self) -> bool {
        self.sgv > 0.0
    }

    /// Local time the entry was recorded, if there is one.
    pub fn recorded_at(&self) -> Option<DateTime<Local>> {
        if !self.has_data() || self.timestamp <= 0 {
            return None;
        }
        DateTime::from_timestamp_millis(self.timestamp).map(|utc| utc.with_timezone(&Local))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Flat,
    SingleUp,
    DoubleUp,
    SingleDown,
    DoubleDown,
    FortyFiveUp,
    FortyFiveDown,
    Unknown,
}

impl TrendDirection {
    /// Case-sensitive; anything Nightscout sends outside the known set
    /// ("NONE", "NOT COMPUTABLE", "") is `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Flat" => Self::Flat,
            "SingleUp" => Self::SingleUp,
            "DoubleUp" => Self::DoubleUp,
            "SingleDown" => Self::SingleDown,
            "DoubleDown" => Self::DoubleDown,
            "FortyFiveUp" => Self::FortyFiveUp,
            "FortyFiveDown" => Self::FortyFiveDown,
            _ => Self::Unknown,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Flat => "→",
            Self::SingleUp => "↑",
            Self::DoubleUp => "↑↑",
            Self::SingleDown => "↓",
            Self::DoubleDown => "↓↓",
            Self::FortyFiveUp => "↗",
            Self::FortyFiveDown => "↘",
            Self::Unknown => "??",
        }
    }
}

pub fn trend_icon(direction: &str) -> &'static str {
    TrendDirection::parse(direction).icon()
}
