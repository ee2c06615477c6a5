#[derive(Debug, thiserror::Error)]
pub enum TamarError {
    #[error("No observations supplied; cannot derive features from an empty batch.")]
    EmptyInput,
    #[error("No phenological period overlapped the supplied observations. Check the requested date range against the target year.")]
    NoFeaturesProduced,
    #[error("Assembled input does not match the model schema. Missing: {missing:?}, unexpected: {unexpected:?}.")]
    FeatureSchemaMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
    #[error("Invalid period rule '{name}': {reason}")]
    InvalidPeriodRule { name: String, reason: String },
    #[error("Tree age {0} is outside the plausible range (1-99).")]
    InvalidTreeAge(i32),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serde YAML Error: {0}")]
    SerdeYamlError(#[from] serde_yaml::Error),
    #[error("Serde JSON Error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
    #[error("Failed to build orchard parameters: {0}")]
    OrchardParamsError(String),
    #[error("Shape Error: {0}")]
    ShapeError(#[from] ndarray::ShapeError),
    #[error("Prediction failed: {0}")]
    PredictionError(String),
}
