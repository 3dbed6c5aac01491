// Presenter - Turns a reading into what the status bar shows
use crate::domain::glucose::WarningBand;
use crate::domain::reading::{Reading, trend_icon};
use crate::infrastructure::config::{DisplaySettings, NoDataDisplay};
use serde::Serialize;

pub const NO_DATA_PLACEHOLDER: &str = "---";
pub const DISPLAY_PRECISION: usize = 1;

/// Theme colour token for the widget background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BackgroundColor {
    #[serde(rename = "statusBarItem.warningBackground")]
    Warning,
    #[serde(rename = "statusBarItem.errorBackground")]
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusView {
    pub text: String,
    pub visible: bool,
    pub band: WarningBand,
    pub background: Option<BackgroundColor>,
    /// Popup to raise for this reading, already gated by the message flags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<&'static str>,
    pub show_date: bool,
    pub tooltip: Option<String>,
}

impl StatusView {
    /// What the widget shows before the first cycle completes.
    pub fn initial() -> Self {
        Self::no_data(&DisplaySettings::default())
    }

    fn no_data(display: &DisplaySettings) -> Self {
        Self {
            text: NO_DATA_PLACEHOLDER.to_string(),
            visible: display.no_data == NoDataDisplay::Placeholder,
            band: WarningBand::None,
            background: None,
            warning: None,
            show_date: false,
            tooltip: None,
        }
    }
}

pub fn render(reading: &Reading, display: &DisplaySettings) -> StatusView {
    if !reading.has_data() {
        return StatusView::no_data(display);
    }

    let value = display.unit.convert(reading.sgv);
    let text = format!(
        "{:.prec$} {} {}",
        value,
        display.unit.label(),
        trend_icon(&reading.direction),
        prec = DISPLAY_PRECISION
    );

    let band = WarningBand::classify(reading.sgv, &display.thresholds);
    let tooltip = reading
        .recorded_at()
        .map(|at| format!("Last entry: {}", at.format("%Y-%m-%d %H:%M:%S")));

    StatusView {
        text,
        visible: true,
        band,
        background: background_for(band, display),
        warning: warning_for(band, display),
        show_date: tooltip.is_some(),
        tooltip,
    }
}

fn background_for(band: WarningBand, display: &DisplaySettings) -> Option<BackgroundColor> {
    let enabled = (band.is_low() && display.low_warning_background)
        || (band.is_high() && display.high_warning_background);
    if !enabled {
        return None;
    }
    if band.is_critical() {
        Some(BackgroundColor::Error)
    } else {
        Some(BackgroundColor::Warning)
    }
}

fn warning_for(band: WarningBand, display: &DisplaySettings) -> Option<&'static str> {
    match band {
        WarningBand::LowCritical if display.low_warning_message => Some("Critically low blood glucose!"),
        WarningBand::LowWarning if display.low_warning_message => Some("Low blood glucose!"),
        WarningBand::HighCritical if display.high_warning_message => Some("Critically high blood glucose!"),
        WarningBand::HighWarning if display.high_warning_message => Some("High blood glucose!"),
        _ => None,
    }
}
