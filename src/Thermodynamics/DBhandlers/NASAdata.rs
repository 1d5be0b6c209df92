use super::thermo_api::{CoefficientRange, NASA7_LEN, ThermoError};
use crate::Thermodynamics::thermo_properties::{
    Cp, GibbsConvention, SpeciesProperties, dG_from_poly, dh, ds,
};

/// number of coefficients in a two-block NASA-7 record
pub const NASA7_RECORD_LEN: usize = 2 * NASA7_LEN;

/// One species of a NASA-7 (CHEMKIN-II) thermodynamic library
#[derive(Debug, Clone)]
pub struct NASAdata {
    /// species name as written in the library
    pub name: String,
    /// T_low, T_high, T_common, K
    pub t_range: (f64, f64, f64),
    /// data parsed from library: high-temperature block followed by low-temperature block
    pub input: Vec<f64>,
}

impl NASAdata {
    /// record as read from the thermo file; anything shorter than two blocks is rejected
    pub fn from_record(
        name: &str,
        t_range: (f64, f64, f64),
        input: Vec<f64>,
    ) -> Result<Self, ThermoError> {
        if input.len() < NASA7_RECORD_LEN {
            return Err(ThermoError::DataIntegrity {
                formula: name.to_string(),
                expected: NASA7_RECORD_LEN,
                found: input.len(),
            });
        }
        Ok(Self {
            name: name.to_string(),
            t_range,
            input,
        })
    }

    fn block(&self, index: usize) -> [f64; NASA7_LEN] {
        let mut block = [0.0; NASA7_LEN];
        block.copy_from_slice(&self.input[index * NASA7_LEN..(index + 1) * NASA7_LEN]);
        block
    }

    /// get the 7 constants of NASA7 format for conctrete temperature
    pub fn extract_coefficients(
        &self,
        t: f64,
        selection: CoefficientRange,
    ) -> Result<[f64; NASA7_LEN], ThermoError> {
        match selection {
            CoefficientRange::FirstBlock => Ok(self.block(0)),
            CoefficientRange::ByTemperature => {
                let (t_low, t_high, t_common) = self.t_range;
                if t_low <= t && t <= t_common {
                    Ok(self.block(1))
                } else if t_common < t && t <= t_high {
                    Ok(self.block(0))
                } else {
                    Err(ThermoError::NoCoefficientsFound {
                        formula: self.name.clone(),
                        temperature: t,
                        range: format!("{} - {} - {}", t_low, t_common, t_high),
                    })
                }
            }
        }
    }
    /// calculate heat capacity, enthalpy, entropy and Gibbs free energy at given temperature
    #[allow(non_snake_case)]
    pub fn calculate_Cp_dH_dS(
        &self,
        t: f64,
        selection: CoefficientRange,
        convention: GibbsConvention,
    ) -> Result<SpeciesProperties, ThermoError> {
        let coeffs = self.extract_coefficients(t, selection)?;
        Ok(SpeciesProperties {
            formula: self.name.clone(),
            Cp: Cp(t, &coeffs)?,
            dh: dh(t, &coeffs)?,
            ds: ds(t, &coeffs)?,
            dG: dG_from_poly(t, &coeffs, convention)?,
        })
    }
}
