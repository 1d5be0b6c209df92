use crate::Substances::SubstanceError;
use crate::Substances::pool::Pool;
use crate::Thermodynamics::ChemEquilibrium::EquilibriumSolver::{
    EquilibriumError, EquilibriumResult, EquilibriumSolver,
};
use crate::Thermodynamics::DBhandlers::NASA_parser::NasaLibrary;
use crate::Thermodynamics::DBhandlers::thermo_api::ThermoCoefficients;
use crate::Utils::load_from_file::TaskError;
use crate::settings::SolverSettings;

pub const EXAMPLE_T: f64 = 500.0;
pub const EXAMPLE_P: f64 = 100000.0;

/// pool_1: hydrogen-methane combustion, pool_2: water formation, pool_3: methane combustion
pub fn builtin_pools() -> Result<Vec<(String, Pool)>, SubstanceError> {
    let pool_1 = Pool::from_formulas(&[
        ("O2", 1.0),
        ("H2", 1.0),
        ("OH", 0.0),
        ("H2O", 0.0),
        ("H2O2", 0.0),
        ("CH4", 1.0),
        ("CO", 0.0),
        ("CO2", 0.0),
    ])?;
    let pool_2 = Pool::from_formulas(&[("O2", 1.0), ("H2", 1.0), ("H2O", 0.0)])?;
    let pool_3 = Pool::from_formulas(&[("O2", 1.0), ("H2O", 0.0), ("CH4", 1.0), ("CO2", 0.0)])?;
    Ok(vec![
        ("pool_1".to_string(), pool_1),
        ("pool_2".to_string(), pool_2),
        ("pool_3".to_string(), pool_3),
    ])
}

pub fn solve_and_print(
    name: &str,
    pool: &Pool,
    t: f64,
    p: f64,
    library: &dyn ThermoCoefficients,
    settings: &SolverSettings,
) -> Result<EquilibriumResult, EquilibriumError> {
    println!("\x1b[34m\n========== {} at {} K, {} Pa ==========\x1b[0m", name, t, p);
    println!("{}", pool);
    let mut solver = EquilibriumSolver::new(pool, t, p, library, settings.clone())?;
    let result = solver.solve()?;
    result.pretty_print();
    Ok(result)
}

pub fn run_builtin_pools(
    settings: &SolverSettings,
) -> Result<Vec<(String, EquilibriumResult)>, TaskError> {
    let library = NasaLibrary::bundled()?;
    let pools = builtin_pools().map_err(|source| TaskError::Substance {
        pool: "built-in".to_string(),
        source,
    })?;
    let mut results = Vec::with_capacity(pools.len());
    for (name, pool) in pools {
        let result = solve_and_print(&name, &pool, EXAMPLE_T, EXAMPLE_P, &library, settings)?;
        results.push((name, result));
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_builtin_pools() {
        let pools = builtin_pools().unwrap();
        let sizes: Vec<usize> = pools.iter().map(|(_, p)| p.len()).collect();
        assert_eq!(sizes, vec![8, 3, 4]);
        assert_eq!(pools[1].1.to_string(), "O2 | H2 | 0H2O");
    }

    #[test]
    fn test_run_builtin_pools() {
        let results = run_builtin_pools(&SolverSettings::default()).unwrap();
        assert_eq!(results.len(), 3);
        for (name, result) in &results {
            let totals = result.element_totals();
            for (elm, b0) in &result.initial_totals {
                assert_relative_eq!(totals[elm], *b0, epsilon = 1e-6);
            }
            assert!(!name.is_empty());
        }
    }
}
