use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::schema::ModelSchema;
use crate::{error::TamarError, features::vector::FeatureVector};

/// Documented fallbacks for orchard parameters the farmer did not supply.
pub const DEFAULT_BUNCHES: u32 = 8;
pub const DEFAULT_SPADICES_PER_BUNCH: u32 = 25;
pub const DEFAULT_FRUITS_PER_SPADIX: u32 = 120;
pub const DEFAULT_TREE_AGE: i32 = 8;

/// Tree age as entered by the farmer: directly in years, or via the planting
/// year with the age derived from the target year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeAge {
    Years(i32),
    PlantingYear(i32),
}

impl TreeAge {
    /// Resolves to an age in years, validated to the plausible 1..=99 range.
    pub fn resolve(&self, target_year: i32) -> Result<i32, TamarError> {
        let age = match self {
            TreeAge::Years(age) => *age,
            TreeAge::PlantingYear(planted) => target_year - planted,
        };
        if !(1..=99).contains(&age) {
            return Err(TamarError::InvalidTreeAge(age));
        }
        Ok(age)
    }
}

/// Farmer-supplied orchard-management parameters.
///
/// Every count is optional at the API surface; absent values fall back to the
/// documented defaults at assembly time. The three fruit counts are the
/// thinning protocol per generation (upper/center/lower section of the crown).
#[derive(Debug, Clone, Default, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(into, strip_option), default)]
pub struct OrchardParams {
    pub tree_age: Option<TreeAge>,
    pub bunches: Option<u32>,
    pub spadices_per_bunch: Option<u32>,
    pub fruits_upper: Option<u32>,
    pub fruits_center: Option<u32>,
    pub fruits_lower: Option<u32>,
}

/// The flat record handed to the regression model: orchard parameters plus
/// the per-period weather features, keyed exactly as at training time.
/// Immutable once assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInputRecord {
    entries: Vec<(String, f64)>,
}

impl ModelInputRecord {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Values in schema key order, for handing to a matrix-based model.
    ///
    /// # Errors
    ///
    /// `FeatureSchemaMismatch` if any schema key is absent from the record.
    pub fn to_row(&self, schema: &ModelSchema) -> Result<Vec<f64>, TamarError> {
        schema
            .keys()
            .iter()
            .map(|key| {
                self.get(key)
                    .ok_or_else(|| TamarError::FeatureSchemaMismatch {
                        missing: vec![key.clone()],
                        unexpected: Vec::new(),
                    })
            })
            .collect()
    }
}

/// Combines orchard parameters and a feature vector into a model-ready
/// record.
///
/// Default substitution happens here and only here:
/// - absent orchard counts take the documented defaults;
/// - no-data weather sentinels become 0.0 for the summed T/E features and
///   `default_humidity` for the mean H features (an empty sum is zero, while
///   0% humidity would sit far outside the training distribution).
///
/// The derived quantities follow the training contract: the average fruit
/// count across the three generations, and total fruits per tree =
/// bunches × spadices per bunch × average fruits per spadix.
///
/// # Errors
///
/// `InvalidTreeAge` for an implausible age, `FeatureSchemaMismatch` when the
/// assembled key set differs from the model schema.
pub fn assemble(
    params: &OrchardParams,
    features: &FeatureVector,
    target_year: i32,
    schema: &ModelSchema,
    default_humidity: f64,
) -> Result<ModelInputRecord, TamarError> {
    let age = params
        .tree_age
        .unwrap_or(TreeAge::Years(DEFAULT_TREE_AGE))
        .resolve(target_year)?;
    let bunches = params.bunches.unwrap_or(DEFAULT_BUNCHES);
    let spadices = params
        .spadices_per_bunch
        .unwrap_or(DEFAULT_SPADICES_PER_BUNCH);
    let fruits_upper = params.fruits_upper.unwrap_or(DEFAULT_FRUITS_PER_SPADIX);
    let fruits_center = params.fruits_center.unwrap_or(DEFAULT_FRUITS_PER_SPADIX);
    let fruits_lower = params.fruits_lower.unwrap_or(DEFAULT_FRUITS_PER_SPADIX);

    let fruits_avg = f64::from(fruits_upper + fruits_center + fruits_lower) / 3.0;
    let fruits_tree = f64::from(bunches) * f64::from(spadices) * fruits_avg;

    let mut entries: Vec<(String, f64)> = vec![
        ("Age".to_string(), f64::from(age)),
        ("Bunches".to_string(), f64::from(bunches)),
        ("Spadices_Bunch".to_string(), f64::from(spadices)),
        ("Fruits_Spadix_Upper".to_string(), f64::from(fruits_upper)),
        ("Fruits_Spadix_Center".to_string(), f64::from(fruits_center)),
        ("Fruits_Spadix_Lower".to_string(), f64::from(fruits_lower)),
        ("Fruits_Tree".to_string(), fruits_tree),
    ];

    for (key, value) in features.iter() {
        let value = match value {
            Some(v) => v,
            None if key.starts_with("H_") => default_humidity,
            None => 0.0,
        };
        entries.push((key.to_string(), value));
    }

    schema.validate(entries.iter().map(|(k, _)| k.as_str()))?;
    debug!(keys = entries.len(), "Assembled model input record");
    Ok(ModelInputRecord { entries })
}
