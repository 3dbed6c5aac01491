use crate::domain::glucose::{GlucoseUnit, Thresholds};
use anyhow::{Context, ensure};
use config::builder::DefaultState;
use config::{ConfigBuilder, File};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/nightscout";
pub const CONFIG_PATH_ENV: &str = "NIGHTSCOUT_STATUS_CONFIG";
pub const TOKEN_ENV: &str = "NIGHTSCOUT_TOKEN";
/// One day; anything longer is a typo, and huge values overflow `Duration`.
pub const MAX_UPDATE_INTERVAL_MINUTES: f64 = 24.0 * 60.0;

/// Fully validated configuration snapshot. Replaced wholesale on reload.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub connection: ConnectionSettings,
    pub display: DisplaySettings,
    pub update_interval: Duration,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionSettings {
    pub host: String,
    pub token: String,
    pub token_parameter: TokenParameter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    pub unit: GlucoseUnit,
    pub thresholds: Thresholds,
    pub low_warning_message: bool,
    pub high_warning_message: bool,
    pub low_warning_background: bool,
    pub high_warning_background: bool,
    pub no_data: NoDataDisplay,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            unit: GlucoseUnit::default(),
            thresholds: Thresholds::default(),
            low_warning_message: true,
            high_warning_message: true,
            low_warning_background: true,
            high_warning_background: true,
            no_data: NoDataDisplay::default(),
        }
    }
}

/// Query parameter carrying the access token. Older Nightscout setups use `secret`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenParameter {
    #[default]
    Token,
    Secret,
}

impl TokenParameter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Secret => "secret",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoDataDisplay {
    /// Show "---"
    #[default]
    Placeholder,
    Hide,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerSettings {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    "127.0.0.1:7878".to_string()
}

// config may hand keys over lowercased, hence the aliases
#[derive(Debug, Deserialize)]
struct RawSettings {
    #[serde(rename = "glucoseUnits", alias = "glucoseunits", default)]
    glucose_units: GlucoseUnit,
    #[serde(rename = "nightscoutHost", alias = "nightscouthost", default)]
    nightscout_host: String,
    #[serde(default)]
    token: String,
    #[serde(rename = "tokenParameter", alias = "tokenparameter", default)]
    token_parameter: TokenParameter,
    #[serde(rename = "noDataDisplay", alias = "nodatadisplay", default)]
    no_data_display: NoDataDisplay,
    #[serde(rename = "low-glucose-warning-message", default)]
    low_warning_message: Toggle,
    #[serde(rename = "high-glucose-warning-message", default)]
    high_warning_message: Toggle,
    #[serde(rename = "low-glucose-warning-background-color", default)]
    low_warning_background: Toggle,
    #[serde(rename = "high-glucose-warning-background-color", default)]
    high_warning_background: Toggle,
    #[serde(rename = "low-glucose-warning", default = "default_low")]
    low_glucose_warning: ThresholdValue,
    #[serde(rename = "high-glucose-warning", default = "default_high")]
    high_glucose_warning: ThresholdValue,
    #[serde(rename = "updateInterval", alias = "updateinterval", default = "default_interval")]
    update_interval: f64,
    #[serde(default)]
    server: ServerSettings,
}

#[derive(Debug, Deserialize)]
struct Toggle {
    #[serde(default = "enabled")]
    enabled: bool,
}

impl Default for Toggle {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn enabled() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct ThresholdValue {
    value: f64,
}

fn default_low() -> ThresholdValue {
    ThresholdValue {
        value: Thresholds::default().low,
    }
}

fn default_high() -> ThresholdValue {
    ThresholdValue {
        value: Thresholds::default().high,
    }
}

fn default_interval() -> f64 {
    10.0
}

impl TryFrom<RawSettings> for Settings {
    type Error = anyhow::Error;

    fn try_from(raw: RawSettings) -> anyhow::Result<Self> {
        ensure!(
            raw.update_interval.is_finite() && raw.update_interval > 0.0,
            "updateInterval must be a positive number of minutes, got {}",
            raw.update_interval
        );
        ensure!(
            raw.update_interval <= MAX_UPDATE_INTERVAL_MINUTES,
            "updateInterval must be at most {} minutes, got {}",
            MAX_UPDATE_INTERVAL_MINUTES,
            raw.update_interval
        );

        let thresholds = Thresholds {
            low: raw.low_glucose_warning.value,
            high: raw.high_glucose_warning.value,
        };
        ensure!(
            thresholds.low < thresholds.high,
            "low-glucose-warning.value ({}) must be below high-glucose-warning.value ({})",
            thresholds.low,
            thresholds.high
        );

        Ok(Settings {
            connection: ConnectionSettings {
                host: raw.nightscout_host.trim().to_string(),
                token: raw.token.trim().to_string(),
                token_parameter: raw.token_parameter,
            },
            display: DisplaySettings {
                unit: raw.glucose_units,
                thresholds,
                low_warning_message: raw.low_warning_message.enabled,
                high_warning_message: raw.high_warning_message.enabled,
                low_warning_background: raw.low_warning_background.enabled,
                high_warning_background: raw.high_warning_background.enabled,
                no_data: raw.no_data_display,
            },
            update_interval: Duration::from_secs_f64(raw.update_interval * 60.0),
            server: raw.server,
        })
    }
}

/// Loads settings from the config file (optional) with the token env override applied.
pub fn load_settings() -> anyhow::Result<Settings> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    tracing::debug!("Loading configuration from {}", path);

    let builder = config::Config::builder()
        .add_source(File::with_name(&path).required(false))
        .set_override_option("token", std::env::var(TOKEN_ENV).ok())?;

    build_settings(builder).with_context(|| format!("Invalid configuration in {}", path))
}

pub fn build_settings(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Settings> {
    let raw: RawSettings = builder.build()?.try_deserialize()?;
    Settings::try_from(raw)
}
