/// Arithmetic mean of a slice, or `None` when the slice is empty.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Rounds to two decimal places, matching the precision the regression model
/// was trained against.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
