//! # Settings Module
//!
//! Solver configuration, serializable to JSON so that task files can carry it:
//! ```json
//! {
//!   "max_iterations": 1000,
//!   "tolerance": 1e-9,
//!   "floor": "Zero",
//!   "coefficient_range": "ByTemperature",
//!   "gibbs_convention": "AsTabulated",
//!   "log_level": "info"
//! }
//! ```
//! Missing fields take their default values.
use crate::Numerics::SQP::SQPOptions;
use crate::Thermodynamics::DBhandlers::thermo_api::CoefficientRange;
use crate::Thermodynamics::thermo_properties::GibbsConvention;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Lower bound imposed on every mole amount.
/// `Zero` lets a species vanish exactly; `Floor(m)` keeps at least `m` mol of every
/// species, so no species can be reported as fully consumed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum FloorPolicy {
    #[default]
    Zero,
    Floor(f64),
}

impl FloorPolicy {
    pub fn value(&self) -> f64 {
        match self {
            FloorPolicy::Zero => 0.0,
            FloorPolicy::Floor(m) => *m,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub max_iterations: usize,
    pub tolerance: f64,
    pub floor: FloorPolicy,
    pub coefficient_range: CoefficientRange,
    pub gibbs_convention: GibbsConvention,
    pub log_level: String,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-9,
            floor: FloorPolicy::Zero,
            coefficient_range: CoefficientRange::ByTemperature,
            gibbs_convention: GibbsConvention::AsTabulated,
            log_level: "info".to_string(),
        }
    }
}

impl SolverSettings {
    pub fn from_json_str(text: &str) -> Result<Self, SettingsError> {
        let settings: SolverSettings = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_iterations == 0 {
            return Err(SettingsError::Invalid(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(SettingsError::Invalid(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        let floor = self.floor.value();
        if !(floor.is_finite() && floor >= 0.0) {
            return Err(SettingsError::Invalid(format!(
                "floor must be non-negative, got {}",
                floor
            )));
        }
        Ok(())
    }

    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }

    pub fn sqp_options(&self) -> SQPOptions {
        SQPOptions {
            max_iterations: self.max_iterations,
            ftol: self.tolerance,
            ..SQPOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = SolverSettings::default();
        assert_eq!(settings.max_iterations, 1000);
        assert_eq!(settings.floor, FloorPolicy::Zero);
        assert_eq!(settings.floor.value(), 0.0);
        assert_eq!(settings.level_filter(), LevelFilter::Info);
    }

    #[test]
    fn test_partial_json() {
        let settings =
            SolverSettings::from_json_str(r#"{"floor": {"Floor": 0.01}, "log_level": "debug"}"#)
                .unwrap();
        assert_eq!(settings.floor, FloorPolicy::Floor(0.01));
        assert_eq!(settings.max_iterations, 1000);
        assert_eq!(settings.level_filter(), LevelFilter::Debug);
        assert_eq!(settings.coefficient_range, CoefficientRange::ByTemperature);
    }

    #[test]
    fn test_json_roundtrip_of_policies() {
        let settings = SolverSettings {
            coefficient_range: CoefficientRange::FirstBlock,
            gibbs_convention: GibbsConvention::Standard,
            ..SolverSettings::default()
        };
        let text = serde_json::to_string(&settings).unwrap();
        assert!(text.contains("FirstBlock"));
        assert_eq!(SolverSettings::from_json_str(&text).unwrap(), settings);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            SolverSettings::from_json_str(r#"{"max_iterations": 0}"#),
            Err(SettingsError::Invalid(_))
        ));
        assert!(matches!(
            SolverSettings::from_json_str(r#"{"floor": {"Floor": -1.0}}"#),
            Err(SettingsError::Invalid(_))
        ));
        assert!(matches!(
            SolverSettings::from_json_str(r#"{"tolerance": "small"}"#),
            Err(SettingsError::Serde(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, r#"{{"max_iterations": 50}}"#).unwrap();
        let settings = SolverSettings::from_file(temp_file.path()).unwrap();
        assert_eq!(settings.max_iterations, 50);
        assert_eq!(settings.sqp_options().max_iterations, 50);
    }
}
