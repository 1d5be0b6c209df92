//! Lookup seam between the thermodynamic data and the equilibrium core:
//! a species formula goes in, the seven NASA polynomial coefficients valid at the
//! requested temperature come out.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// number of coefficients of one NASA-7 temperature block
pub const NASA7_LEN: usize = 7;

#[derive(Debug, Error)]
pub enum ThermoError {
    #[error("{formula} is not available in the thermodynamic library")]
    SpeciesNotFound { formula: String },
    #[error("incomplete NASA record for {formula}: expected {expected} coefficients, found {found}")]
    DataIntegrity {
        formula: String,
        expected: usize,
        found: usize,
    },
    #[error("No coefficients found for {formula} at temperature {temperature} K. Valid range: {range}")]
    NoCoefficientsFound {
        formula: String,
        temperature: f64,
        range: String,
    },
    #[error("temperature must be positive and finite, got {0} K")]
    InvalidTemperature(f64),
    #[error("failed to read thermo file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("thermo file parse error at line {line}: {msg}")]
    Parse { line: usize, msg: String },
}

/// Which of the two NASA-7 temperature blocks is used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoefficientRange {
    /// low block for T_low <= T <= T_common, high block for T_common < T <= T_high
    #[default]
    ByTemperature,
    /// always the first seven numbers of the record (the high-temperature block)
    FirstBlock,
}

/// formula -> coefficients lookup used by the thermodynamic property evaluator
pub trait ThermoCoefficients {
    /// seven coefficients for `formula` at temperature `t`, block chosen by `selection`
    fn coefficients(
        &self,
        formula: &str,
        t: f64,
        selection: CoefficientRange,
    ) -> Result<[f64; NASA7_LEN], ThermoError>;
}

/// first seven numbers of a coefficient vector, shorter vectors are a data error
pub fn first_block(formula: &str, poly: &[f64]) -> Result<[f64; NASA7_LEN], ThermoError> {
    if poly.len() < NASA7_LEN {
        return Err(ThermoError::DataIntegrity {
            formula: formula.to_string(),
            expected: NASA7_LEN,
            found: poly.len(),
        });
    }
    let mut block = [0.0; NASA7_LEN];
    block.copy_from_slice(&poly[..NASA7_LEN]);
    Ok(block)
}

/// A plain table: one coefficient vector per formula, valid at any temperature.
/// There is only one block, so every selection returns it.
impl ThermoCoefficients for HashMap<String, Vec<f64>> {
    fn coefficients(
        &self,
        formula: &str,
        _t: f64,
        _selection: CoefficientRange,
    ) -> Result<[f64; NASA7_LEN], ThermoError> {
        let poly = self
            .get(formula)
            .ok_or_else(|| ThermoError::SpeciesNotFound {
                formula: formula.to_string(),
            })?;
        first_block(formula, poly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lookup() {
        let mut table: HashMap<String, Vec<f64>> = HashMap::new();
        table.insert("H2".to_string(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let poly = table
            .coefficients("H2", 500.0, CoefficientRange::ByTemperature)
            .unwrap();
        assert_eq!(poly, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let first = table
            .coefficients("H2", 500.0, CoefficientRange::FirstBlock)
            .unwrap();
        assert_eq!(first, poly);
    }

    #[test]
    fn test_missing_species() {
        let table: HashMap<String, Vec<f64>> = HashMap::new();
        let res = table.coefficients("CH4", 500.0, CoefficientRange::default());
        assert!(matches!(res, Err(ThermoError::SpeciesNotFound { formula }) if formula == "CH4"));
    }

    #[test]
    fn test_short_vector_is_integrity_error() {
        let mut table: HashMap<String, Vec<f64>> = HashMap::new();
        table.insert("OH".to_string(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let res = table.coefficients("OH", 500.0, CoefficientRange::default());
        assert!(matches!(
            res,
            Err(ThermoError::DataIntegrity {
                expected: 7,
                found: 6,
                ..
            })
        ));
    }
}
