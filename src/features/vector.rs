use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::periods::Period;
use crate::{
    data::record::DerivedRecord,
    error::TamarError,
    util::math_utils::{mean, round2},
};

/// Prefixes of the three per-period summary statistics.
pub const FEATURE_PREFIXES: [&str; 3] = ["T", "H", "E"];

/// A mapping from `{prefix}_{period}` keys to a value or an explicit no-data
/// sentinel, in period-table order.
///
/// Insertion order is preserved so repeated runs over the same inputs iterate
/// identically; the sentinel (`None`) is deliberately distinct from 0.0.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    entries: Vec<(String, Option<f64>)>,
}

impl FeatureVector {
    fn push(&mut self, key: String, value: Option<f64>) {
        self.entries.push((key, value));
    }

    pub fn get(&self, key: &str) -> Option<Option<f64>> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<f64>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reduces a derived series to per-period summary statistics.
///
/// For each period, the records whose local calendar date falls within
/// `[start, end]` (inclusive) contribute:
/// - `T_<period>`: summed heat units,
/// - `H_<period>`: mean of the non-missing humidity values,
/// - `E_<period>`: summed evaporation, missing rows contributing 0,
///
/// each rounded to two decimals. A period with no overlapping records emits
/// explicit no-data sentinels for all three keys; this component never
/// substitutes defaults (that policy belongs to input assembly).
///
/// # Errors
///
/// [`TamarError::NoFeaturesProduced`] when every period came back empty,
/// which almost always means the wrong date range was requested upstream.
#[instrument(level = "debug", skip(records, periods), fields(records = records.len(), periods = periods.len()))]
pub fn aggregate(
    records: &[DerivedRecord],
    periods: &[Period],
) -> Result<FeatureVector, TamarError> {
    let mut features = FeatureVector::default();
    let mut any_data = false;

    for period in periods {
        let window: Vec<&DerivedRecord> = records
            .iter()
            .filter(|r| period.contains(r.record.timestamp.date()))
            .collect();

        if window.is_empty() {
            debug!(period = %period.name, "No observations in period");
            for prefix in FEATURE_PREFIXES {
                features.push(format!("{}_{}", prefix, period.name), None);
            }
            continue;
        }
        any_data = true;

        let heat_sum: f64 = window.iter().map(|r| r.heat_units).sum();
        let humidity: Vec<f64> = window.iter().filter_map(|r| r.record.humidity).collect();
        let evaporation_sum: f64 = window.iter().filter_map(|r| r.evaporation).sum();

        features.push(format!("T_{}", period.name), Some(round2(heat_sum)));
        features.push(format!("H_{}", period.name), mean(&humidity).map(round2));
        features.push(format!("E_{}", period.name), Some(round2(evaporation_sum)));
    }

    if !any_data {
        return Err(TamarError::NoFeaturesProduced);
    }
    Ok(features)
}
