use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tamar::config::TamarConfig;
use tamar::data::observation::{RawChannelReading, RawObservation};

/// Builds a reading the way the weather service serializes it.
pub fn reading(name: &str, value: f64) -> RawChannelReading {
    RawChannelReading {
        name: name.to_string(),
        value: json!(value),
        status: 1,
        valid: None,
    }
}

/// Generates a regular synthetic series starting at `start` (RFC 3339, UTC)
/// with one observation every `step_minutes`, carrying constant channel
/// values.
pub fn synthetic_series(
    start: &str,
    count: usize,
    step_minutes: i64,
    temperature: f64,
    humidity: f64,
    radiation: f64,
) -> Vec<RawObservation> {
    let start: DateTime<Utc> = start.parse().unwrap();
    (0..count)
        .map(|i| RawObservation {
            datetime: start + Duration::minutes(step_minutes * i as i64),
            channels: vec![
                reading("TD", temperature),
                reading("RH", humidity),
                reading("Grad", radiation),
            ],
        })
        .collect()
}

pub fn default_config() -> TamarConfig {
    TamarConfig::default()
}
