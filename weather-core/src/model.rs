use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latitude/longitude exactly as they arrived on the inbound path.
///
/// No numeric parsing or range check is done; the values are forwarded to
/// the provider verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Coordinates {
    pub latitude: String,
    pub longitude: String,
}

impl Coordinates {
    pub fn new(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeatherEntry {
    pub id: serde_json::Number,
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MainMetrics {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: f64,
    pub humidity: f64,
}

/// Body of the provider's current weather endpoint, reduced to the fields we
/// rely on.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentConditions {
    pub weather: Vec<WeatherEntry>,
    pub main: MainMetrics,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AlertEntry {
    pub sender_name: String,
    pub event: String,
    /// Unix seconds. Any JSON number is accepted.
    pub start: f64,
    /// Unix seconds. Any JSON number is accepted.
    pub end: f64,
    pub description: String,
}

impl AlertEntry {
    /// Start and end of the alert in UTC, if both timestamps are representable.
    pub fn active_window(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((unix_to_utc(self.start)?, unix_to_utc(self.end)?))
    }
}

fn unix_to_utc(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let millis = (secs * 1000.0).round();
    if millis.abs() >= i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TemperatureLabel {
    Hot,
    Cold,
    Moderate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertSummary {
    pub sender: String,
    pub event: String,
    pub description: String,
}

impl From<AlertEntry> for AlertSummary {
    fn from(alert: AlertEntry) -> Self {
        Self {
            sender: alert.sender_name,
            event: alert.event,
            description: alert.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub conditions: Vec<String>,
    pub temperature: TemperatureLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alerts: Option<Vec<AlertSummary>>,
}

/// What the `/weather` endpoint answers with.
///
/// Serialized untagged: either `{"error": "..."}` or the report's fields at
/// the top level.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AggregatedResponse {
    Error { error: String },
    Report(WeatherReport),
}
