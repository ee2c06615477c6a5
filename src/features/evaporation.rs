use serde::{Deserialize, Serialize};

/// Physical constants for the Penman-Monteith energy-balance approximation.
///
/// Injected into the estimator rather than living as module-level state, so
/// tests (and any future unit substitution) can swap values without globals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalConstants {
    /// Air density ρ (kg/m³).
    pub air_density: f64,
    /// Specific heat capacity of air Cp (J/(kg·°C)).
    pub specific_heat: f64,
    /// Latent heat of vaporization λ (J/kg).
    pub latent_heat: f64,
    /// Psychrometric constant γ (kPa/°C).
    pub psychrometric: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            air_density: 1.2,
            specific_heat: 1013.0,
            latent_heat: 2.45e6,
            psychrometric: 0.065,
        }
    }
}

impl PhysicalConstants {
    /// Saturation vapor pressure es(T) in kPa (Tetens form).
    pub fn saturation_vapor_pressure(&self, temperature: f64) -> f64 {
        0.6108 * ((17.27 * temperature) / (temperature + 237.3)).exp()
    }

    /// Actual vapor pressure ea in kPa from relative humidity and temperature.
    pub fn actual_vapor_pressure(&self, humidity: f64, temperature: f64) -> f64 {
        (humidity / 100.0) * self.saturation_vapor_pressure(temperature)
    }

    /// Slope of the saturation vapor pressure curve Δ(T) in kPa/°C.
    pub fn delta_slope(&self, temperature: f64) -> Option<f64> {
        let denominator = (temperature + 237.3).powi(2);
        if denominator == 0.0 {
            return None;
        }
        Some(4098.0 * self.saturation_vapor_pressure(temperature) / denominator)
    }

    /// Penman-Monteith evaporation estimate for one sampling interval, in mm.
    ///
    /// Soil heat flux is neglected (G = 0) and the result is clamped at 0:
    /// this model does not produce negative evaporation.
    ///
    /// Total function: returns `None` instead of erroring when any input is
    /// missing, when radiation or humidity is negative, or when the
    /// denominator degenerates to zero. It is evaluated once per timestamp
    /// inside a large aggregation and one bad row must not abort the batch.
    pub fn evaporation(
        &self,
        radiation: Option<f64>,
        temperature: Option<f64>,
        humidity: Option<f64>,
        interval_minutes: f64,
    ) -> Option<f64> {
        let (radiation, temperature, humidity) = (radiation?, temperature?, humidity?);
        if radiation < 0.0 || humidity < 0.0 {
            return None;
        }
        if !(radiation.is_finite() && temperature.is_finite() && humidity.is_finite()) {
            return None;
        }

        // W/m² to MJ/m² over the sampling interval
        let radiation_mj = (radiation / 1e6) * interval_minutes * 60.0;

        let es = self.saturation_vapor_pressure(temperature);
        let ea = self.actual_vapor_pressure(humidity, temperature);
        let delta = self.delta_slope(temperature)?;

        let denominator = delta + self.psychrometric;
        if denominator == 0.0 {
            return None;
        }

        let numerator =
            delta * radiation_mj + self.air_density * self.specific_heat * (es - ea) / self.latent_heat;
        Some((numerator / denominator).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_saturation_vapor_pressure_reference() {
        let constants = PhysicalConstants::default();
        // es(25°C) ≈ 3.168 kPa
        assert_relative_eq!(
            constants.saturation_vapor_pressure(25.0),
            3.168,
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_reference_scenario_matches_formula() {
        let constants = PhysicalConstants::default();
        let result = constants
            .evaporation(Some(500.0), Some(25.0), Some(50.0), 10.0)
            .unwrap();

        // Recompute the expected value from the published formula
        let es = 0.6108 * f64::exp(17.27 * 25.0 / (25.0 + 237.3));
        let ea = 0.5 * es;
        let delta = 4098.0 * es / (25.0 + 237.3_f64).powi(2);
        let r_mj = (500.0 / 1e6) * 600.0;
        let expected = (delta * r_mj + 1.2 * 1013.0 * (es - ea) / 2.45e6) / (delta + 0.065);

        assert_relative_eq!(result, expected, epsilon = 1e-6);
        // Sanity against the hand-computed magnitude (~0.226 mm/10min)
        assert!((result - 0.226).abs() < 5e-3);
    }

    #[test]
    fn test_missing_inputs_propagate() {
        let constants = PhysicalConstants::default();
        assert!(constants
            .evaporation(None, Some(25.0), Some(50.0), 10.0)
            .is_none());
        assert!(constants
            .evaporation(Some(500.0), None, Some(50.0), 10.0)
            .is_none());
        assert!(constants
            .evaporation(Some(500.0), Some(25.0), None, 10.0)
            .is_none());
    }

    #[test]
    fn test_negative_inputs_are_missing() {
        let constants = PhysicalConstants::default();
        assert!(constants
            .evaporation(Some(-1.0), Some(25.0), Some(50.0), 10.0)
            .is_none());
        assert!(constants
            .evaporation(Some(500.0), Some(25.0), Some(-1.0), 10.0)
            .is_none());
    }

    #[test]
    fn test_never_negative() {
        let constants = PhysicalConstants::default();
        // Supersaturated humidity drives es - ea negative; zero radiation
        // leaves nothing to offset it, so the clamp engages.
        let result = constants
            .evaporation(Some(0.0), Some(5.0), Some(150.0), 10.0)
            .unwrap();
        assert!(result >= 0.0);

        for t in [-10.0, 0.0, 15.0, 30.0, 45.0] {
            for h in [0.0, 25.0, 50.0, 100.0] {
                for r in [0.0, 100.0, 900.0] {
                    let v = constants.evaporation(Some(r), Some(t), Some(h), 10.0);
                    assert!(v.unwrap() >= 0.0, "negative result at t={t} h={h} r={r}");
                }
            }
        }
    }

    #[test]
    fn test_non_finite_inputs_are_missing() {
        let constants = PhysicalConstants::default();
        assert!(constants
            .evaporation(Some(f64::NAN), Some(25.0), Some(50.0), 10.0)
            .is_none());
        assert!(constants
            .evaporation(Some(500.0), Some(f64::INFINITY), Some(50.0), 10.0)
            .is_none());
    }

    #[test]
    fn test_constants_injectable() {
        let constants = PhysicalConstants {
            psychrometric: 0.13,
            ..Default::default()
        };
        let default = PhysicalConstants::default();
        let a = constants.evaporation(Some(500.0), Some(25.0), Some(50.0), 10.0);
        let b = default.evaporation(Some(500.0), Some(25.0), Some(50.0), 10.0);
        assert!(a.unwrap() < b.unwrap());
    }
}
