use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::observation::Channel;
use crate::features::{evaporation::PhysicalConstants, heat};

/// One cleaned per-timestamp row after channel mapping and duplicate merging.
///
/// Channels are `Option<f64>` so a missing reading stays distinguishable from
/// zero. Timestamps are naive local time; period boundaries are local
/// calendar dates, so all arithmetic happens after timezone stripping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub timestamp: NaiveDateTime,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub radiation: Option<f64>,
}

impl WeatherRecord {
    pub fn new(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            temperature: None,
            humidity: None,
            radiation: None,
        }
    }

    pub fn channel(&self, channel: Channel) -> Option<f64> {
        match channel {
            Channel::Temperature => self.temperature,
            Channel::Humidity => self.humidity,
            Channel::Radiation => self.radiation,
        }
    }

    pub fn channel_mut(&mut self, channel: Channel) -> &mut Option<f64> {
        match channel {
            Channel::Temperature => &mut self.temperature,
            Channel::Humidity => &mut self.humidity,
            Channel::Radiation => &mut self.radiation,
        }
    }
}

/// A [`WeatherRecord`] augmented with the two per-interval derived quantities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedRecord {
    pub record: WeatherRecord,
    /// Degree-time above threshold for this sampling interval (hours·°C).
    /// Zero when temperature is missing or at/below threshold, never missing.
    pub heat_units: f64,
    /// Penman-Monteith estimate for this sampling interval (mm).
    /// Missing whenever any required input is missing.
    pub evaporation: Option<f64>,
}

impl DerivedRecord {
    /// Computes the derived quantities for one normalized record.
    pub fn derive(
        record: WeatherRecord,
        constants: &PhysicalConstants,
        heat_threshold: f64,
        interval_minutes: f64,
    ) -> Self {
        let heat_units = heat::heat_units(record.temperature, heat_threshold, interval_minutes);
        let evaporation = constants.evaporation(
            record.radiation,
            record.temperature,
            record.humidity,
            interval_minutes,
        );
        Self {
            record,
            heat_units,
            evaporation,
        }
    }
}

/// Derives heat units and evaporation for an entire normalized series.
///
/// Purely per-row: a corrupt or incomplete row yields zero heat units and a
/// missing evaporation for that row and cannot abort the batch.
pub fn derive_series(
    records: Vec<WeatherRecord>,
    constants: &PhysicalConstants,
    heat_threshold: f64,
    interval_minutes: f64,
) -> Vec<DerivedRecord> {
    records
        .into_iter()
        .map(|r| DerivedRecord::derive(r, constants, heat_threshold, interval_minutes))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_derive_full_record() {
        let mut record = WeatherRecord::new(ts(10, 0));
        record.temperature = Some(25.0);
        record.humidity = Some(50.0);
        record.radiation = Some(500.0);

        let derived = DerivedRecord::derive(record, &PhysicalConstants::default(), 18.0, 10.0);
        assert_relative_eq!(derived.heat_units, 7.0 * (10.0 / 60.0), epsilon = 1e-12);
        assert!(derived.evaporation.unwrap() > 0.0);
    }

    #[test]
    fn test_derive_missing_inputs() {
        let mut record = WeatherRecord::new(ts(10, 0));
        record.temperature = Some(25.0);
        // Humidity and radiation missing: evaporation missing, heat units intact
        let derived = DerivedRecord::derive(record, &PhysicalConstants::default(), 18.0, 10.0);
        assert!(derived.evaporation.is_none());
        assert!(derived.heat_units > 0.0);

        let empty = WeatherRecord::new(ts(10, 10));
        let derived = DerivedRecord::derive(empty, &PhysicalConstants::default(), 18.0, 10.0);
        assert_eq!(derived.heat_units, 0.0);
        assert!(derived.evaporation.is_none());
    }

    #[test]
    fn test_channel_accessors() {
        let mut record = WeatherRecord::new(ts(0, 0));
        *record.channel_mut(Channel::Humidity) = Some(40.0);
        assert_eq!(record.channel(Channel::Humidity), Some(40.0));
        assert_eq!(record.channel(Channel::Temperature), None);
    }

    #[test]
    fn test_derive_series_length() {
        let records = vec![WeatherRecord::new(ts(0, 0)), WeatherRecord::new(ts(0, 10))];
        let derived = derive_series(records, &PhysicalConstants::default(), 18.0, 10.0);
        assert_eq!(derived.len(), 2);
    }
}
