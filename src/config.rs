use std::{
    fs::File,
    io::{BufReader, Write as _},
    path::Path,
};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_yaml::from_reader;
use tracing::{debug, info, instrument};

use crate::{
    error::TamarError,
    features::{evaporation::PhysicalConstants, periods::PeriodTable},
    model::schema::ModelSchema,
};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TamarConfig {
    /// Local reference timezone for period boundaries.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Station sampling interval the derived quantities are scaled by.
    #[serde(rename = "interval-minutes", default = "default_interval")]
    pub interval_minutes: f64,
    /// Base temperature for heat-unit accumulation (°C).
    #[serde(rename = "heat-threshold", default = "default_heat_threshold")]
    pub heat_threshold: f64,
    /// Substituted for no-data humidity features at input assembly.
    #[serde(rename = "default-humidity", default = "default_humidity")]
    pub default_humidity: f64,
    /// Penman-Monteith constants; overridable for testing.
    #[serde(default)]
    pub constants: PhysicalConstants,
    /// The phenological period table. Must match the table the deployed
    /// model was trained with.
    #[serde(default = "PeriodTable::canonical")]
    pub periods: PeriodTable,
}

fn default_timezone() -> String {
    "Asia/Jerusalem".to_string()
}

fn default_interval() -> f64 {
    10.0
}

fn default_heat_threshold() -> f64 {
    18.0
}

fn default_humidity() -> f64 {
    50.0
}

const DEFAULT_DATA: &str = r#"
timezone: "Asia/Jerusalem"
interval-minutes: 10
heat-threshold: 18
default-humidity: 50
periods:
  - name: "Inf_differentiation"
    start: { month: 11, day: 1, year-offset: -1 }
    end: { month: 2, day: 10 }
  - name: "Flowering"
    start: { month: 2, day: 11 }
    end: { month: 3, day: 31 }
  - name: "Thinning"
    start: { month: 4, day: 1 }
    end: { month: 5, day: 15 }
"#;

impl Default for TamarConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            interval_minutes: default_interval(),
            heat_threshold: default_heat_threshold(),
            default_humidity: default_humidity(),
            constants: PhysicalConstants::default(),
            periods: PeriodTable::canonical(),
        }
    }
}

impl TamarConfig {
    /// Reads the configuration from a YAML file.
    ///
    /// If the file does not exist, it creates a default configuration file.
    ///
    /// # Arguments
    ///
    /// * `filename` - Optional path to the configuration file.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `TamarConfig` on success or an `Error` on failure.
    #[instrument(level = "info", skip(filename))]
    pub fn read_config<P: AsRef<Path>>(filename: Option<P>) -> Result<Self, TamarError> {
        let path = filename
            .map(|p| p.as_ref().to_path_buf())
            .unwrap_or_else(|| Path::new("config.yml").to_path_buf());

        info!(path = %path.display(), "Reading configuration");

        if !path.exists() {
            info!(
                "Config file does not exist. Creating default config at {}",
                path.display()
            );
            let mut file = File::create(&path)?;
            file.write_all(DEFAULT_DATA.as_bytes())?;
            debug!("Default configuration file created");
            return Ok(TamarConfig::default());
        }

        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        let config: Self = from_reader(reader)?;
        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parses the configured timezone name.
    pub fn tz(&self) -> Result<Tz, TamarError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| TamarError::UnknownTimezone(self.timezone.clone()))
    }

    /// The model input schema implied by the period table.
    pub fn model_schema(&self) -> ModelSchema {
        ModelSchema::for_period_table(&self.periods)
    }

    fn validate(&self) -> Result<(), TamarError> {
        if !(self.interval_minutes.is_finite() && self.interval_minutes > 0.0) {
            return Err(TamarError::ConfigError(format!(
                "interval-minutes must be positive, got {}",
                self.interval_minutes
            )));
        }
        if !self.heat_threshold.is_finite() {
            return Err(TamarError::ConfigError(
                "heat-threshold must be finite".to_string(),
            ));
        }
        if self.periods.is_empty() {
            return Err(TamarError::ConfigError(
                "periods cannot be empty".to_string(),
            ));
        }
        self.tz()?;
        Ok(())
    }
}
