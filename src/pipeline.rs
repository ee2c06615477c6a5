use tracing::{info, instrument};

use crate::{
    config::TamarConfig,
    data::{normalizer::normalize, observation::RawObservation, record::derive_series},
    error::TamarError,
    features::vector::{aggregate, FeatureVector},
    model::{
        input::{assemble, ModelInputRecord, OrchardParams},
        predictor::YieldModel,
    },
};

/// Runs the core pipeline: normalize → derive → aggregate.
///
/// Pure function of its inputs; no I/O, no shared state, O(observations)
/// work. Callers may run any number of invocations in parallel as long as
/// each gets its own input slice.
#[instrument(level = "info", skip(observations, config), fields(observations = observations.len(), year))]
pub fn extract_features(
    observations: &[RawObservation],
    year: i32,
    config: &TamarConfig,
) -> Result<FeatureVector, TamarError> {
    let tz = config.tz()?;
    let records = normalize(observations, tz)?;
    let derived = derive_series(
        records,
        &config.constants,
        config.heat_threshold,
        config.interval_minutes,
    );
    let periods = config.periods.resolve(year)?;
    let features = aggregate(&derived, &periods)?;
    info!(features = features.len(), "Extracted feature vector");
    Ok(features)
}

/// Full path from raw observations and orchard parameters to a model-ready
/// record.
pub fn assemble_input(
    observations: &[RawObservation],
    params: &OrchardParams,
    year: i32,
    config: &TamarConfig,
) -> Result<ModelInputRecord, TamarError> {
    let features = extract_features(observations, year, config)?;
    assemble(
        params,
        &features,
        year,
        &config.model_schema(),
        config.default_humidity,
    )
}

/// Convenience wrapper handing an assembled record to a yield model.
pub fn predict_yield<M: YieldModel + ?Sized>(
    model: &M,
    observations: &[RawObservation],
    params: &OrchardParams,
    year: i32,
    config: &TamarConfig,
) -> Result<f64, TamarError> {
    let input = assemble_input(observations, params, year, config)?;
    model.predict(&input)
}
