use linfa::{prelude::AsTargets as _, traits::Predict as _};
use linfa_pls::PlsRegression;
use ndarray::Array2;
use tracing::{debug, error};

use super::{input::ModelInputRecord, schema::ModelSchema};
use crate::error::TamarError;

/// Seam to the trained regression model.
///
/// The model itself is an opaque artifact produced by the external training
/// subsystem; this crate only maps an assembled record onto it. Assumed
/// deterministic.
pub trait YieldModel {
    /// Predicted yield per tree, in kilograms.
    fn predict(&self, input: &ModelInputRecord) -> Result<f64, TamarError>;
}

/// Adapter feeding assembled records to a trained PLS regression.
pub struct PlsYieldModel {
    pls: PlsRegression<f64>,
    schema: ModelSchema,
}

impl PlsYieldModel {
    pub fn new(pls: PlsRegression<f64>, schema: ModelSchema) -> Self {
        Self { pls, schema }
    }

    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }
}

impl YieldModel for PlsYieldModel {
    fn predict(&self, input: &ModelInputRecord) -> Result<f64, TamarError> {
        let row = input.to_row(&self.schema)?;

        // The substitution policy upstream should have eliminated these, but
        // a NaN reaching the model would silently corrupt the prediction.
        if row.iter().any(|v| !v.is_finite()) {
            error!("Non-finite value in model input row");
            return Err(TamarError::PredictionError(
                "Invalid data (NaN/Inf) in model input".to_string(),
            ));
        }

        let features = Array2::from_shape_vec((1, row.len()), row)?;
        let y_hat = self.pls.predict(&features).as_targets().to_owned();
        let value = y_hat
            .iter()
            .next()
            .copied()
            .ok_or_else(|| TamarError::PredictionError("Model returned no output".to_string()))?;

        debug!(prediction = value, "PLS model prediction");
        Ok(value)
    }
}
