//! Gibbs free energy of the whole mixture as a function of the mole amounts:
//! ```text
//! g_i  = x_i (G_i(T)/RT + ln(1 + P) + ln(1 + x_i/N))
//! G(T) = RT Σ g_i
//! ```
//! `N` is the number of species in the pool. The pressure and mole-fraction terms use
//! ln(1 + v), which keeps the functional finite and smooth as x_i -> 0 or P -> 0.
use crate::Numerics::SQP::Objective;
use crate::Thermodynamics::DBhandlers::thermo_api::{
    CoefficientRange, ThermoCoefficients, ThermoError,
};
use crate::Thermodynamics::thermo_properties::{GibbsConvention, R, dG};
use nalgebra::DVector;
use std::convert::Infallible;

/// contribution of one species
pub fn gibbs_i(x_i: f64, dg_over_rt: f64, p: f64, n: f64) -> f64 {
    x_i * (dg_over_rt + p.ln_1p() + (x_i / n).ln_1p())
}

/// System Gibbs free energy for the trial amounts `x` (one per formula).
/// Every formula is looked up on each call; a missing species aborts the evaluation.
pub fn gibbs_system(
    t: f64,
    p: f64,
    formulas: &[String],
    x: &[f64],
    library: &dyn ThermoCoefficients,
    selection: CoefficientRange,
    convention: GibbsConvention,
) -> Result<f64, ThermoError> {
    let n = formulas.len() as f64;
    let rt = R * t;
    let mut sum = 0.0;
    for (formula, x_i) in formulas.iter().zip(x.iter()) {
        let g = dG(t, formula, library, selection, convention)?;
        sum += gibbs_i(*x_i, g / rt, p, n);
    }
    Ok(rt * sum)
}

/// The functional at fixed (T, P) with the standard potentials G_i(T)/RT resolved once.
#[allow(non_snake_case)]
#[derive(Debug, Clone)]
pub struct GibbsSystem {
    pub T: f64,
    pub P: f64,
    /// number of species
    pub N: f64,
    pub formulas: Vec<String>,
    /// G_i(T)/RT
    pub dg_over_rt: Vec<f64>,
}

impl GibbsSystem {
    #[allow(non_snake_case)]
    pub fn new(
        T: f64,
        P: f64,
        formulas: Vec<String>,
        library: &dyn ThermoCoefficients,
        selection: CoefficientRange,
        convention: GibbsConvention,
    ) -> Result<Self, ThermoError> {
        let rt = R * T;
        let dg_over_rt = formulas
            .iter()
            .map(|f| dG(T, f, library, selection, convention).map(|g| g / rt))
            .collect::<Result<Vec<f64>, ThermoError>>()?;
        Ok(Self {
            T,
            P,
            N: formulas.len() as f64,
            formulas,
            dg_over_rt,
        })
    }

    pub fn evaluate(&self, x: &[f64]) -> f64 {
        let sum: f64 = x
            .iter()
            .zip(self.dg_over_rt.iter())
            .map(|(x_i, g)| gibbs_i(*x_i, *g, self.P, self.N))
            .sum();
        R * self.T * sum
    }
    /// ∂G/∂x_i = RT (G_i/RT + ln(1 + P) + ln(1 + x_i/N) + x_i/(N + x_i))
    pub fn gradient(&self, x: &[f64]) -> Vec<f64> {
        let rt = R * self.T;
        x.iter()
            .zip(self.dg_over_rt.iter())
            .map(|(x_i, g)| {
                rt * (g + self.P.ln_1p() + (x_i / self.N).ln_1p() + x_i / (self.N + x_i))
            })
            .collect()
    }
}

impl Objective for GibbsSystem {
    type Error = Infallible;
    fn value(&mut self, x: &DVector<f64>) -> Result<f64, Infallible> {
        Ok(self.evaluate(x.as_slice()))
    }

    fn gradient(&mut self, x: &DVector<f64>) -> Result<DVector<f64>, Infallible> {
        Ok(DVector::from_vec(GibbsSystem::gradient(self, x.as_slice())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    fn table() -> HashMap<String, Vec<f64>> {
        let mut table = HashMap::new();
        table.insert("A".to_string(), vec![2.5, 0.0, 0.0, 0.0, 0.0, -1000.0, 4.0]);
        table.insert("B".to_string(), vec![3.5, 1e-3, 0.0, 0.0, 0.0, 500.0, 2.0]);
        table
    }

    #[test]
    fn test_cached_matches_lookup() {
        let formulas = vec!["A".to_string(), "B".to_string()];
        let lib = table();
        let system =
            GibbsSystem::new(800.0, 1e5, formulas.clone(), &lib, CoefficientRange::default(), GibbsConvention::AsTabulated)
                .unwrap();
        let x = [0.3, 1.7];
        let direct =
            gibbs_system(800.0, 1e5, &formulas, &x, &lib, CoefficientRange::default(), GibbsConvention::AsTabulated).unwrap();
        assert_relative_eq!(system.evaluate(&x), direct, max_relative = 1e-12);
    }

    #[test]
    fn test_zero_amounts_give_zero() {
        let formulas = vec!["A".to_string(), "B".to_string()];
        let system =
            GibbsSystem::new(500.0, 0.0, formulas, &table(), CoefficientRange::default(), GibbsConvention::Standard).unwrap();
        assert_eq!(system.evaluate(&[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_log1p_terms() {
        // zero potentials: G = RT Σ x (ln(1+P) + ln(1 + x/N))
        let mut lib: HashMap<String, Vec<f64>> = HashMap::new();
        lib.insert("X".to_string(), vec![0.0; 7]);
        let system = GibbsSystem::new(
            300.0,
            1.0,
            vec!["X".to_string()],
            &lib,
            CoefficientRange::default(),
            GibbsConvention::AsTabulated,
        )
        .unwrap();
        let expected = R * 300.0 * 2.0 * (2.0_f64.ln() + 3.0_f64.ln());
        assert_relative_eq!(system.evaluate(&[2.0]), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_analytic_gradient() {
        let formulas = vec!["A".to_string(), "B".to_string()];
        let system =
            GibbsSystem::new(600.0, 2e5, formulas, &table(), CoefficientRange::default(), GibbsConvention::AsTabulated)
                .unwrap();
        let x = [0.4, 1.1];
        let grad = system.gradient(&x);
        for i in 0..2 {
            let h = 1e-6;
            let mut xp = x;
            let mut xm = x;
            xp[i] += h;
            xm[i] -= h;
            let fd = (system.evaluate(&xp) - system.evaluate(&xm)) / (2.0 * h);
            assert_relative_eq!(grad[i], fd, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_missing_species_aborts() {
        let formulas = vec!["A".to_string(), "Q".to_string()];
        let res = GibbsSystem::new(500.0, 1e5, formulas.clone(), &table(), CoefficientRange::default(), GibbsConvention::AsTabulated);
        assert!(matches!(res, Err(ThermoError::SpeciesNotFound { formula }) if formula == "Q"));
        let res = gibbs_system(500.0, 1e5, &formulas, &[1.0, 1.0], &table(), CoefficientRange::default(), GibbsConvention::AsTabulated);
        assert!(matches!(res, Err(ThermoError::SpeciesNotFound { .. })));
    }
}
