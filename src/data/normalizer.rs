use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use chrono_tz::Tz;
use tracing::{debug, instrument};

use super::{
    observation::{Channel, RawObservation},
    record::WeatherRecord,
};
use crate::error::TamarError;

/// Running mean of the non-missing values seen for one channel at one
/// timestamp. Duplicate transmissions from the service are merged this way.
#[derive(Debug, Default, Clone, Copy)]
struct ChannelMean {
    sum: f64,
    count: u32,
}

impl ChannelMean {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / f64::from(self.count))
    }
}

/// Converts raw service observations into an ordered, deduplicated series of
/// [`WeatherRecord`]s.
///
/// - Channel names are resolved through the canonical alias table; unknown
///   names are ignored.
/// - Only readings with the valid status code (and no explicit `valid: false`
///   override) are accepted; the rest are dropped silently.
/// - Timestamps are converted from UTC to `timezone` and stripped to naive
///   local time, because period boundaries are local calendar dates.
/// - Observations sharing a normalized timestamp merge channel-by-channel by
///   arithmetic mean of the non-missing values.
/// - Post-merge, negative humidity or radiation is scrubbed to missing
///   (miscalibrated sensors); temperature is not clamped.
///
/// # Errors
///
/// Returns [`TamarError::EmptyInput`] when `observations` is empty. Per-reading
/// anomalies never fail the batch.
#[instrument(level = "debug", skip(observations), fields(count = observations.len()))]
pub fn normalize(
    observations: &[RawObservation],
    timezone: Tz,
) -> Result<Vec<WeatherRecord>, TamarError> {
    if observations.is_empty() {
        return Err(TamarError::EmptyInput);
    }

    // BTreeMap keeps the output sorted ascending by timestamp.
    let mut merged: BTreeMap<NaiveDateTime, [ChannelMean; 3]> = BTreeMap::new();

    for observation in observations {
        let local = observation
            .datetime
            .with_timezone(&timezone)
            .naive_local();
        let entry = merged.entry(local).or_default();

        for reading in &observation.channels {
            if !reading.is_usable() {
                continue;
            }
            let Some(channel) = Channel::from_alias(&reading.name) else {
                continue;
            };
            if let Some(value) = reading.numeric_value() {
                entry[channel_slot(channel)].push(value);
            }
        }
    }

    let records = merged
        .into_iter()
        .map(|(timestamp, means)| {
            let mut record = WeatherRecord::new(timestamp);
            record.temperature = means[channel_slot(Channel::Temperature)].mean();
            record.humidity = scrub_negative(means[channel_slot(Channel::Humidity)].mean());
            record.radiation = scrub_negative(means[channel_slot(Channel::Radiation)].mean());
            record
        })
        .collect::<Vec<_>>();

    debug!(
        records = records.len(),
        "Normalized observation batch into per-timestamp records"
    );
    Ok(records)
}

fn channel_slot(channel: Channel) -> usize {
    match channel {
        Channel::Temperature => 0,
        Channel::Humidity => 1,
        Channel::Radiation => 2,
    }
}

/// Sensor-error guard: values below zero become missing.
fn scrub_negative(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v >= 0.0)
}
