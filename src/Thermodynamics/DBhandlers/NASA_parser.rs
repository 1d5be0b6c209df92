//! # NASA_parser
//! Reader for NASA-7 polynomial libraries in the CHEMKIN-II layout used by
//! GRI-Mech 3.0 (`thermo30.dat`):
//! ```text
//! THERMO ALL
//!    300.000  1000.000  5000.000
//! ! comments
//! H2O               L 8/89H   2O   1   00   00G   200.000  3500.000  1000.000    1
//!  3.03399249E+00 2.17691804E-03-1.64072518E-07-9.70419870E-11 1.68200992E-14    2
//! -3.00042971E+04 4.96677010E+00 4.19864056E+00-2.03643410E-03 6.52040211E-06    3
//! -5.48797062E-09 1.77197817E-12-3.02937267E+04-8.49032208E-01                   4
//! END
//! ```
//! Card 1 carries the name and T_low, T_high, T_common; cards 2-4 carry 14 coefficients,
//! the high-temperature block first.
use super::NASAdata::NASAdata;
use super::thermo_api::{CoefficientRange, NASA7_LEN, ThermoCoefficients, ThermoError};
use crate::Thermodynamics::thermo_properties::{GibbsConvention, SpeciesProperties};
use log::{debug, info, warn};
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// GRI-Mech 3.0 subset shipped with the crate
pub const BUNDLED_THERMO: &str = include_str!("../../../data/thermo30.dat");

static COEFFICIENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-?[0-9]\.[0-9]+E[-+][0-9]{2}").expect("coefficient regex is valid")
});

/// parsed library, one record per species name
#[derive(Debug, Clone)]
pub struct NasaLibrary {
    pub records: HashMap<String, NASAdata>,
}

struct PendingRecord {
    name: String,
    t_range: (f64, f64, f64),
    coeffs: Vec<f64>,
}

impl PendingRecord {
    fn finish(self) -> Result<NASAdata, ThermoError> {
        NASAdata::from_record(&self.name, self.t_range, self.coeffs)
    }
}

/// "T_low T_high T_common" are the three tokens right before the card number
fn header_temperatures(tokens: &[&str]) -> Option<(f64, f64, f64)> {
    if tokens.len() < 5 {
        return None;
    }
    let n = tokens.len();
    let t_low = tokens[n - 4].parse::<f64>().ok()?;
    let t_high = tokens[n - 3].parse::<f64>().ok()?;
    let t_common = tokens[n - 2].parse::<f64>().ok()?;
    Some((t_low, t_high, t_common))
}

/// global line "T_low T_common T_high" following THERMO
fn global_temperatures(line: &str) -> Option<(f64, f64, f64)> {
    let values: Vec<f64> = line
        .split_whitespace()
        .map(|t| t.parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;
    match values.as_slice() {
        [t_low, t_common, t_high] => Some((*t_low, *t_high, *t_common)),
        _ => None,
    }
}

impl NasaLibrary {
    pub fn parse(text: &str) -> Result<Self, ThermoError> {
        let mut records = HashMap::new();
        let mut default_range = (300.0, 5000.0, 1000.0);
        let mut pending: Option<PendingRecord> = None;
        let mut after_thermo_header = false;

        for (line_no, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('!') {
                continue;
            }
            if trimmed.to_uppercase().starts_with("THERMO") {
                after_thermo_header = true;
                continue;
            }
            if after_thermo_header {
                after_thermo_header = false;
                if let Some(range) = global_temperatures(trimmed) {
                    default_range = range;
                    continue;
                }
            }
            if trimmed.eq_ignore_ascii_case("END") {
                break;
            }
            let tokens: Vec<&str> = trimmed.split_whitespace().collect();
            match tokens.last().copied() {
                Some("1") => {
                    if let Some(record) = pending.take() {
                        let data = record.finish()?;
                        records.insert(data.name.clone(), data);
                    }
                    let t_range = header_temperatures(&tokens).unwrap_or_else(|| {
                        warn!(
                            "line {}: no temperature range for {}, using {:?}",
                            line_no + 1,
                            tokens[0],
                            default_range
                        );
                        default_range
                    });
                    pending = Some(PendingRecord {
                        name: tokens[0].to_string(),
                        t_range,
                        coeffs: Vec::with_capacity(2 * NASA7_LEN),
                    });
                }
                Some("2") | Some("3") | Some("4") => {
                    let record = pending.as_mut().ok_or_else(|| ThermoError::Parse {
                        line: line_no + 1,
                        msg: "coefficient card before any species header".to_string(),
                    })?;
                    for m in COEFFICIENT.find_iter(line) {
                        let value = m.as_str().parse::<f64>().map_err(|e| ThermoError::Parse {
                            line: line_no + 1,
                            msg: e.to_string(),
                        })?;
                        record.coeffs.push(value);
                    }
                }
                _ => debug!("line {}: skipped '{}'", line_no + 1, trimmed),
            }
        }
        if let Some(record) = pending.take() {
            let data = record.finish()?;
            records.insert(data.name.clone(), data);
        }
        info!("parsed {} species from NASA-7 library", records.len());
        Ok(Self { records })
    }

    pub fn from_file(path: &Path) -> Result<Self, ThermoError> {
        let text = fs::read_to_string(path).map_err(|source| ThermoError::Io {
            path: path.display().to_string(),
            source,
        })?;
        info!("reading thermo library '{}'", path.display());
        Self::parse(&text)
    }
    /// GRI-Mech 3.0 subset compiled into the crate
    pub fn bundled() -> Result<Self, ThermoError> {
        Self::parse(BUNDLED_THERMO)
    }

    /// exact name first, then the upper-case spelling ("Ar" is stored as "AR")
    pub fn get(&self, formula: &str) -> Option<&NASAdata> {
        self.records
            .get(formula)
            .or_else(|| self.records.get(&formula.to_uppercase()))
    }

    pub fn species_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.records.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
    /// Cp, dH, dS and dG of one species
    pub fn properties(
        &self,
        formula: &str,
        t: f64,
        selection: CoefficientRange,
        convention: GibbsConvention,
    ) -> Result<SpeciesProperties, ThermoError> {
        self.lookup(formula)?
            .calculate_Cp_dH_dS(t, selection, convention)
    }

    fn lookup(&self, formula: &str) -> Result<&NASAdata, ThermoError> {
        self.get(formula).ok_or_else(|| ThermoError::SpeciesNotFound {
            formula: formula.to_string(),
        })
    }
}

impl ThermoCoefficients for NasaLibrary {
    fn coefficients(
        &self,
        formula: &str,
        t: f64,
        selection: CoefficientRange,
    ) -> Result<[f64; NASA7_LEN], ThermoError> {
        self.lookup(formula)?.extract_coefficients(t, selection)
    }
}
