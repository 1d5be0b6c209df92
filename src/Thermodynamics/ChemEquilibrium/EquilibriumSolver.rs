//! # EquilibriumSolver
//! Chemical equilibrium of a closed ideal-gas mixture at fixed T and P as a constrained
//! minimization of the system Gibbs free energy:
//! ```text
//! min_x  G(x; T, P)
//! s.t.   Σ_i a_ij x_i − b_j = 0     for every element j   (mass balance)
//!        x_i − floor      >= 0     for every species i
//! ```
//! where a_ij is the count of element j in species i and b_j the initial element total.
//! The converged amounts are written back into the species and split into reactants
//! (negative amounts) and products.
use super::GibbsSystem::{GibbsSystem, gibbs_system};
use super::classifier::classify;
use crate::Numerics::SQP::{SQPStatus, minimize};
use crate::Numerics::constraints::{
    Constraint, ConstraintFunction, LinearEquality, LowerBound,
};
use crate::Substances::pool::Pool;
use crate::Substances::species::Species;
use crate::Thermodynamics::DBhandlers::thermo_api::{ThermoCoefficients, ThermoError};
use crate::settings::SolverSettings;
use log::{info, warn};
use nalgebra::DVector;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EquilibriumError {
    #[error(transparent)]
    Thermo(#[from] ThermoError),
    #[error("ill-posed equilibrium task: {0}")]
    IllPosed(String),
}

/// outcome of one solve; returned also when the minimizer did not converge
#[derive(Debug, Clone)]
pub struct EquilibriumResult {
    /// consumed species, amounts as positive magnitudes
    pub reactants: Vec<Species>,
    pub products: Vec<Species>,
    /// signed amounts in pool order, before classification
    pub composition: Vec<Species>,
    pub status: SQPStatus,
    pub converged: bool,
    /// minimizer diagnostic
    pub message: String,
    pub iterations: usize,
    pub evaluations: usize,
    /// system Gibbs free energy at the returned composition, J
    pub gibbs_energy: f64,
    pub max_violation: f64,
    /// element totals of the initial mixture
    pub initial_totals: BTreeMap<String, f64>,
}

impl EquilibriumResult {
    /// element totals of the returned composition
    pub fn element_totals(&self) -> BTreeMap<String, f64> {
        let mut totals = BTreeMap::new();
        for name in self.initial_totals.keys() {
            let total: f64 = self
                .composition
                .iter()
                .map(|s| s.get_element_count(name, true))
                .sum();
            totals.insert(name.clone(), total);
        }
        totals
    }
    /// signed amount of `formula` in the returned composition
    pub fn amount_of(&self, formula: &str) -> Option<f64> {
        self.composition
            .iter()
            .find(|s| s.get_string() == formula)
            .map(|s| s.mol)
    }
    /// net reaction, e.g. `1.0000 CH4 + 2.0000 O2 -> 1.0000 CO2 + 2.0000 H2O`
    pub fn reaction_string(&self) -> String {
        fn side(list: &[Species]) -> String {
            let terms: Vec<String> = list
                .iter()
                .filter(|s| s.mol.abs() > 1e-10)
                .map(|s| format!("{:.4} {}", s.mol, s.get_string()))
                .collect();
            if terms.is_empty() {
                "(none)".to_string()
            } else {
                terms.join(" + ")
            }
        }
        format!("{} -> {}", side(&self.reactants), side(&self.products))
    }
}

impl fmt::Display for EquilibriumResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "status: {} ({})", self.status, self.message)?;
        writeln!(
            f,
            "iterations: {}, evaluations: {}, G = {:.6e} J, max violation = {:.3e}",
            self.iterations, self.evaluations, self.gibbs_energy, self.max_violation
        )?;
        write!(f, "{}", self.reaction_string())
    }
}

/// Amounts within `tol` of the floor are put exactly on it, so species the minimizer
/// drove to their bound are not classified by the sign of roundoff.
fn snap_to_floor(x: &mut DVector<f64>, floor: f64, tol: f64) {
    for x_i in x.iter_mut() {
        if (*x_i - floor).abs() <= tol {
            *x_i = floor;
        }
    }
}

/// Equilibrium problem over one pool. The solver owns its copy of the species, the
/// `mol` fields of that copy receive the final amounts.
#[allow(non_snake_case)]
pub struct EquilibriumSolver<'a> {
    pub T: f64,
    pub P: f64,
    pub species: Vec<Species>,
    /// element names, ordered
    pub elements: Vec<String>,
    /// initial element totals b_j, aligned with `elements`
    pub b0: Vec<f64>,
    pub settings: SolverSettings,
    library: &'a dyn ThermoCoefficients,
}

impl<'a> EquilibriumSolver<'a> {
    #[allow(non_snake_case)]
    pub fn new(
        pool: &Pool,
        T: f64,
        P: f64,
        library: &'a dyn ThermoCoefficients,
        settings: SolverSettings,
    ) -> Result<Self, EquilibriumError> {
        settings
            .validate()
            .map_err(|e| EquilibriumError::IllPosed(e.to_string()))?;
        let species = pool.species().to_vec();
        let elements: Vec<String> = pool.elements().iter().cloned().collect();
        let b0 = Self::initial_bj(&species, &elements);
        let solver = Self {
            T,
            P,
            species,
            elements,
            b0,
            settings,
            library,
        };
        solver.check_task()?;
        Ok(solver)
    }

    fn initial_bj(species: &[Species], elements: &[String]) -> Vec<f64> {
        elements
            .iter()
            .map(|elm| species.iter().map(|s| s.get_element_count(elm, true)).sum())
            .collect()
    }

    fn check_task(&self) -> Result<(), EquilibriumError> {
        if self.species.is_empty() {
            return Err(EquilibriumError::IllPosed(
                "pool contains no species".to_string(),
            ));
        }
        if !(self.T.is_finite() && self.T > 0.0) {
            return Err(ThermoError::InvalidTemperature(self.T).into());
        }
        if !(self.P.is_finite() && self.P >= 0.0) {
            return Err(EquilibriumError::IllPosed(format!(
                "pressure must be non-negative, got {}",
                self.P
            )));
        }
        if let Some(s) = self.species.iter().find(|s| !s.mol.is_finite()) {
            return Err(EquilibriumError::IllPosed(format!(
                "initial amount of {} is not finite",
                s.get_string()
            )));
        }
        let floor = self.settings.floor.value();
        for (elm, b) in self.elements.iter().zip(self.b0.iter()) {
            let column_sum: f64 = self
                .species
                .iter()
                .map(|s| s.get_element_count(elm, false))
                .sum();
            if column_sum <= 0.0 {
                return Err(EquilibriumError::IllPosed(format!(
                    "element {} has zero count in every species",
                    elm
                )));
            }
            let min_reachable = floor * column_sum;
            if *b < min_reachable - 1e-12 * (1.0 + b.abs()) {
                return Err(EquilibriumError::IllPosed(format!(
                    "element {} has initial total {} but a floor of {} mol per species needs at least {}",
                    elm, b, floor, min_reachable
                )));
            }
        }
        Ok(())
    }
    /// b_j by element name
    pub fn element_targets(&self) -> BTreeMap<String, f64> {
        self.elements
            .iter()
            .cloned()
            .zip(self.b0.iter().copied())
            .collect()
    }
    /// x_i >= floor for every species, then one mass balance per element
    pub fn constraints(&self) -> Vec<Constraint> {
        let floor = self.settings.floor.value();
        let bounds = (0..self.species.len())
            .map(|index| Constraint::Inequality(LowerBound { index, floor }));
        let balances = self.elements.iter().zip(self.b0.iter()).map(|(elm, b)| {
            Constraint::Equality(LinearEquality {
                label: elm.clone(),
                coefficients: self
                    .species
                    .iter()
                    .map(|s| s.get_element_count(elm, false))
                    .collect(),
                target: *b,
            })
        });
        bounds.chain(balances).collect()
    }

    pub fn initial_guess(&self) -> DVector<f64> {
        DVector::from_iterator(self.species.len(), self.species.iter().map(|s| s.mol))
    }

    fn formulas(&self) -> Vec<String> {
        self.species.iter().map(|s| s.get_string()).collect()
    }
    /// objective with G_i/RT taken from the coefficient block the settings select
    pub fn build_system(&self) -> Result<GibbsSystem, ThermoError> {
        GibbsSystem::new(
            self.T,
            self.P,
            self.formulas(),
            self.library,
            self.settings.coefficient_range,
            self.settings.gibbs_convention,
        )
    }

    pub fn solve(&mut self) -> Result<EquilibriumResult, EquilibriumError> {
        let mut system = self.build_system()?;
        let constraints = self.constraints();
        info!("****** CONSTRAINTS ******");
        info!("Number of constraints: {}", constraints.len());
        info!(
            "xi >= {}: {}",
            self.settings.floor.value(),
            self.species.len()
        );
        info!("mass balance: {}", self.elements.len());

        let x0 = self.initial_guess();
        let options = self.settings.sqp_options();
        let result = match minimize(&mut system, x0, &constraints, &options) {
            Ok(result) => result,
            Err(never) => match never {},
        };
        let mut x = result.x.clone();
        snap_to_floor(&mut x, self.settings.floor.value(), options.feasibility_tol);
        let max_violation = constraints
            .iter()
            .map(|c| c.violation(&x))
            .fold(0.0, f64::max);
        let gibbs_energy = gibbs_system(
            self.T,
            self.P,
            &self.formulas(),
            x.as_slice(),
            self.library,
            self.settings.coefficient_range,
            self.settings.gibbs_convention,
        )?;
        for (s, x_i) in self.species.iter_mut().zip(x.iter()) {
            s.set_mol(*x_i);
        }
        if result.success {
            info!(
                "equilibrium found in {} iterations, G = {:.6e} J",
                result.nit, gibbs_energy
            );
        } else {
            warn!(
                "equilibrium not converged after {} iterations: {}",
                result.nit, result.message
            );
        }
        let (reactants, products) = classify(&self.species);
        Ok(EquilibriumResult {
            reactants,
            products,
            composition: self.species.clone(),
            status: result.status,
            converged: result.success,
            message: result.message,
            iterations: result.nit,
            evaluations: result.nfev,
            gibbs_energy,
            max_violation,
            initial_totals: self.element_targets(),
        })
    }
}
