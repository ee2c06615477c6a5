use std::{fmt, fs::File, io::BufReader, path::Path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::TamarError;

/// Status code the weather service uses for a usable reading.
/// The API marks status=1 as valid and status=2 as invalid.
pub const VALID_STATUS: i64 = 1;

/// Canonical sensor channels the pipeline understands.
///
/// The upstream vocabulary is inconsistent (several temperature and radiation
/// spellings, sometimes with trailing whitespace), so every external name is
/// resolved through [`Channel::from_alias`] before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Temperature,
    Humidity,
    Radiation,
}

impl Channel {
    /// Resolves an external channel name onto a canonical channel.
    ///
    /// Returns `None` for unrecognized names; unknown aliases are ignored by
    /// the normalizer rather than treated as errors.
    pub fn from_alias(name: &str) -> Option<Self> {
        match name.trim() {
            "TD" | "Td" | "TDmax" | "TDmin" | "TG" => Some(Channel::Temperature),
            "RH" => Some(Channel::Humidity),
            "Grad" | "Rad" | "DiffR" | "NIP" => Some(Channel::Radiation),
            _ => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Temperature => write!(f, "Temperature (°C)"),
            Channel::Humidity => write!(f, "Relative humidity (%)"),
            Channel::Radiation => write!(f, "Radiation (W/m2)"),
        }
    }
}

/// One sensor reading inside a raw observation, as delivered by the weather
/// service. The schema is untrusted and evolving: unknown fields are ignored
/// and every field we rely on is optional or defaulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawChannelReading {
    #[serde(default)]
    pub name: String,
    /// Numeric or textual; coerced with [`RawChannelReading::numeric_value`].
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub status: i64,
    /// Optional per-reading override; absent means valid.
    #[serde(default)]
    pub valid: Option<bool>,
}

impl RawChannelReading {
    /// Whether this reading may enter the pipeline at all.
    pub fn is_usable(&self) -> bool {
        self.status == VALID_STATUS && self.valid.unwrap_or(true)
    }

    /// Coerces the wire value to a float.
    ///
    /// Coercion failure is a per-reading anomaly: it logs a warning and
    /// yields `None` for this reading only, never failing the batch.
    pub fn numeric_value(&self) -> Option<f64> {
        match &self.value {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => match s.trim().parse::<f64>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(channel = %self.name, value = %s, "Value failed numeric coercion; treating as missing");
                    None
                }
            },
            _ => {
                warn!(channel = %self.name, "Non-numeric value; treating as missing");
                None
            }
        }
    }
}

/// One observation event: a timestamp and the channel readings taken at it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawObservation {
    /// UTC-tagged timestamp from the service.
    pub datetime: DateTime<Utc>,
    #[serde(default)]
    pub channels: Vec<RawChannelReading>,
}

/// Loads a JSON array of raw observations from disk.
pub fn load_observations<P: AsRef<Path>>(path: P) -> Result<Vec<RawObservation>, TamarError> {
    let file = File::open(path.as_ref())?;
    let observations: Vec<RawObservation> = serde_json::from_reader(BufReader::new(file))?;
    info!(
        path = %path.as_ref().display(),
        count = observations.len(),
        "Loaded raw observations"
    );
    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_alias_resolution() {
        assert_eq!(Channel::from_alias("TD"), Some(Channel::Temperature));
        assert_eq!(Channel::from_alias("TDmax"), Some(Channel::Temperature));
        assert_eq!(Channel::from_alias("RH"), Some(Channel::Humidity));
        // Trailing whitespace shows up in the live feed
        assert_eq!(Channel::from_alias("RH "), Some(Channel::Humidity));
        assert_eq!(Channel::from_alias("Grad "), Some(Channel::Radiation));
        assert_eq!(Channel::from_alias("NIP"), Some(Channel::Radiation));
        assert_eq!(Channel::from_alias("WS"), None);
        assert_eq!(Channel::from_alias(""), None);
    }

    #[test]
    fn test_canonical_display_names() {
        assert_eq!(Channel::Temperature.to_string(), "Temperature (°C)");
        assert_eq!(Channel::Humidity.to_string(), "Relative humidity (%)");
        assert_eq!(Channel::Radiation.to_string(), "Radiation (W/m2)");
    }

    #[test]
    fn test_usability_rules() {
        let mut reading = RawChannelReading {
            name: "TD".to_string(),
            value: json!(21.5),
            status: VALID_STATUS,
            valid: None,
        };
        assert!(reading.is_usable());

        reading.valid = Some(true);
        assert!(reading.is_usable());

        reading.valid = Some(false);
        assert!(!reading.is_usable());

        reading.valid = None;
        reading.status = 2;
        assert!(!reading.is_usable());
    }

    #[test]
    fn test_numeric_coercion() {
        let make = |value: serde_json::Value| RawChannelReading {
            name: "TD".to_string(),
            value,
            status: VALID_STATUS,
            valid: None,
        };
        assert_eq!(make(json!(21.5)).numeric_value(), Some(21.5));
        assert_eq!(make(json!("21.5")).numeric_value(), Some(21.5));
        assert_eq!(make(json!(" 21.5 ")).numeric_value(), Some(21.5));
        assert_eq!(make(json!("not-a-number")).numeric_value(), None);
        assert_eq!(make(serde_json::Value::Null).numeric_value(), None);
        assert_eq!(make(json!({"v": 1})).numeric_value(), None);
    }

    #[test]
    fn test_observation_tolerates_unknown_fields() {
        let payload = json!({
            "datetime": "2024-03-01T10:00:00Z",
            "stationId": 28,
            "channels": [
                {"name": "TD", "value": 25.0, "status": 1, "id": 7, "alias": null}
            ]
        });
        let obs: RawObservation = serde_json::from_value(payload).unwrap();
        assert_eq!(obs.channels.len(), 1);
        assert_eq!(obs.channels[0].name, "TD");
    }

    #[test]
    fn test_observation_missing_channels_defaults_empty() {
        let payload = json!({"datetime": "2024-03-01T10:00:00Z"});
        let obs: RawObservation = serde_json::from_value(payload).unwrap();
        assert!(obs.channels.is_empty());
    }

    #[test]
    fn test_load_observations_from_file() {
        use std::io::Write as _;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let payload = json!([
            {
                "datetime": "2024-03-01T10:00:00Z",
                "channels": [{"name": "TD", "value": 25.0, "status": 1}]
            }
        ]);
        file.write_all(payload.to_string().as_bytes()).unwrap();

        let observations = load_observations(file.path()).unwrap();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].channels[0].name, "TD");
    }

    #[test]
    fn test_load_observations_malformed_json() {
        use std::io::Write as _;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let result = load_observations(file.path());
        assert!(matches!(result, Err(TamarError::SerdeJsonError(_))));
    }

    #[test]
    fn test_load_observations_missing_file() {
        let result = load_observations("/nonexistent/observations.json");
        assert!(matches!(result, Err(TamarError::IoError(_))));
    }
}
