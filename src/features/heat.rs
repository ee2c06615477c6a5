/// Accumulated degree-time above `threshold` for one sampling interval,
/// in hours·°C.
///
/// Missing temperature contributes 0 rather than poisoning the period sum.
/// This is deliberately asymmetric with the evaporation estimate, which
/// propagates missing inputs.
pub fn heat_units(temperature: Option<f64>, threshold: f64, interval_minutes: f64) -> f64 {
    match temperature {
        Some(t) => (t - threshold).max(0.0) * (interval_minutes / 60.0),
        None => 0.0,
    }
}
