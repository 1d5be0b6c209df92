//! Enthalpy, entropy, heat capacity and Gibbs free energy of one species from its
//! NASA-7 polynomial block. All functions are pure in (T, coefficients).
use super::DBhandlers::thermo_api::{CoefficientRange, NASA7_LEN, ThermoCoefficients, ThermoError};
use serde::{Deserialize, Serialize};

/// molar gas constant, J/(mol·K)
pub const R: f64 = 8.31446261815324;

/// How enthalpy and entropy are combined into the Gibbs free energy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GibbsConvention {
    /// G = H + T·S
    #[default]
    AsTabulated,
    /// G = H − T·S
    Standard,
}

fn check_temperature(t: f64) -> Result<(), ThermoError> {
    if t.is_finite() && t > 0.0 {
        Ok(())
    } else {
        Err(ThermoError::InvalidTemperature(t))
    }
}

/// Cp = R(a + bT + cT^2 + dT^3 + eT^4), J/(mol·K)
#[allow(non_snake_case)]
pub fn Cp(t: f64, poly: &[f64; NASA7_LEN]) -> Result<f64, ThermoError> {
    check_temperature(t)?;
    let [a, b, c, d, e, _, _] = *poly;
    Ok(R * (a + b * t + c * t.powi(2) + d * t.powi(3) + e * t.powi(4)))
}

/// H = RT(a + bT/2 + cT^2/3 + dT^3/4 + eT^4/5 + f/T), J/mol
pub fn dh(t: f64, poly: &[f64; NASA7_LEN]) -> Result<f64, ThermoError> {
    check_temperature(t)?;
    let [a, b, c, d, e, f, _] = *poly;
    Ok(R * t
        * (a + b * t / 2.0
            + c * t.powi(2) / 3.0
            + d * t.powi(3) / 4.0
            + e * t.powi(4) / 5.0
            + f / t))
}

/// S = R(a lnT + bT + cT^2/2 + dT^3/3 + eT^4/4 + g), J/(mol·K)
pub fn ds(t: f64, poly: &[f64; NASA7_LEN]) -> Result<f64, ThermoError> {
    check_temperature(t)?;
    let [a, b, c, d, e, _, g] = *poly;
    Ok(R * (a * t.ln()
        + b * t
        + c * t.powi(2) / 2.0
        + d * t.powi(3) / 3.0
        + e * t.powi(4) / 4.0
        + g))
}

/// Gibbs free energy from one coefficient block
#[allow(non_snake_case)]
pub fn dG_from_poly(
    t: f64,
    poly: &[f64; NASA7_LEN],
    convention: GibbsConvention,
) -> Result<f64, ThermoError> {
    let h = dh(t, poly)?;
    let s = ds(t, poly)?;
    Ok(match convention {
        GibbsConvention::AsTabulated => h + t * s,
        GibbsConvention::Standard => h - t * s,
    })
}

/// Gibbs free energy of the species `formula` looked up in `library`
#[allow(non_snake_case)]
pub fn dG(
    t: f64,
    formula: &str,
    library: &dyn ThermoCoefficients,
    selection: CoefficientRange,
    convention: GibbsConvention,
) -> Result<f64, ThermoError> {
    check_temperature(t)?;
    let poly = library.coefficients(formula, t, selection)?;
    dG_from_poly(t, &poly, convention)
}

/// all properties of one species at one temperature, used for reports
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesProperties {
    pub formula: String,
    pub Cp: f64,
    pub dh: f64,
    pub ds: f64,
    pub dG: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    // H2O, GRI-Mech 3.0, 200-1000 K block
    const H2O_LOW: [f64; 7] = [
        4.19864056E+00,
        -2.03643410E-03,
        6.52040211E-06,
        -5.48797062E-09,
        1.77197817E-12,
        -3.02937267E+04,
        -8.49032208E-01,
    ];

    #[test]
    fn test_zero_coefficients() {
        let zeros = [0.0; 7];
        for t in [1.0, 298.15, 500.0, 3000.0] {
            assert_eq!(dh(t, &zeros).unwrap(), 0.0);
            assert_eq!(ds(t, &zeros).unwrap(), 0.0);
            assert_eq!(Cp(t, &zeros).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_water_at_standard_conditions() {
        // enthalpy of formation of water vapour, about -241.8 kJ/mol
        let h = dh(298.15, &H2O_LOW).unwrap();
        assert_relative_eq!(h, -241_826.0, max_relative = 1e-3);
        // standard entropy, about 188.8 J/(mol K)
        let s = ds(298.15, &H2O_LOW).unwrap();
        assert_relative_eq!(s, 188.83, max_relative = 1e-3);
        let cp = Cp(298.15, &H2O_LOW).unwrap();
        assert_relative_eq!(cp, 33.58, max_relative = 1e-2);
    }

    #[test]
    fn test_constant_cp_ideal_gas() {
        // monatomic gas: a = 2.5, everything else zero
        let poly = [2.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let t = 400.0;
        assert_relative_eq!(dh(t, &poly).unwrap(), 2.5 * R * t, epsilon = 1e-9);
        assert_relative_eq!(ds(t, &poly).unwrap(), 2.5 * R * t.ln(), epsilon = 1e-9);
        assert_relative_eq!(Cp(t, &poly).unwrap(), 2.5 * R, epsilon = 1e-12);
    }

    #[test]
    fn test_gibbs_conventions() {
        let t = 500.0;
        let h = dh(t, &H2O_LOW).unwrap();
        let s = ds(t, &H2O_LOW).unwrap();
        let tabulated = dG_from_poly(t, &H2O_LOW, GibbsConvention::AsTabulated).unwrap();
        let standard = dG_from_poly(t, &H2O_LOW, GibbsConvention::Standard).unwrap();
        assert_relative_eq!(tabulated, h + t * s, epsilon = 1e-9);
        assert_relative_eq!(standard, h - t * s, epsilon = 1e-9);
    }

    #[test]
    fn test_non_positive_temperature() {
        assert!(matches!(dh(0.0, &H2O_LOW), Err(ThermoError::InvalidTemperature(_))));
        assert!(matches!(ds(-10.0, &H2O_LOW), Err(ThermoError::InvalidTemperature(_))));
        assert!(matches!(
            Cp(f64::NAN, &H2O_LOW),
            Err(ThermoError::InvalidTemperature(_))
        ));
    }

    #[test]
    fn test_dG_lookup_is_deterministic() {
        let mut table: HashMap<String, Vec<f64>> = HashMap::new();
        table.insert("H2O".to_string(), H2O_LOW.to_vec());
        let first = dG(500.0, "H2O", &table, CoefficientRange::ByTemperature, GibbsConvention::AsTabulated).unwrap();
        let second = dG(500.0, "H2O", &table, CoefficientRange::ByTemperature, GibbsConvention::AsTabulated).unwrap();
        assert_eq!(first.to_bits(), second.to_bits());
        let missing = dG(500.0, "H2O2", &table, CoefficientRange::ByTemperature, GibbsConvention::AsTabulated);
        assert!(matches!(missing, Err(ThermoError::SpeciesNotFound { .. })));
    }
}
