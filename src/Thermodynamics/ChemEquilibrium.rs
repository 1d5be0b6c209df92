/// Gibbs free energy of an ideal-gas mixture as the minimization objective
pub mod GibbsSystem;
/// equilibrium composition of a species pool
/// # Examples
/// ```
/// use gibbs_min::Substances::pool::Pool;
/// use gibbs_min::Thermodynamics::ChemEquilibrium::EquilibriumSolver::EquilibriumSolver;
/// use gibbs_min::Thermodynamics::DBhandlers::NASA_parser::NasaLibrary;
/// use gibbs_min::settings::SolverSettings;
/// let library = NasaLibrary::bundled().unwrap();
/// let pool = Pool::from_formulas(&[("O2", 1.0), ("H2", 1.0), ("OH", 0.0), ("H2O", 0.0)]).unwrap();
/// let mut solver = EquilibriumSolver::new(&pool, 500.0, 1e5, &library, SolverSettings::default()).unwrap();
/// let result = solver.solve().unwrap();
/// let totals = result.element_totals();
/// assert!((totals["H"] - 2.0).abs() < 1e-6);
/// assert!((totals["O"] - 2.0).abs() < 1e-6);
/// println!("{}", result.reaction_string());
/// ```
pub mod EquilibriumSolver;
/// tables for results and species properties
pub mod EquilibriumOutput;
/// split of a solved composition into reactants and products
pub mod classifier;
