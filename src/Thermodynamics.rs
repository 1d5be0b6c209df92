/// chemical equilibrium by Gibbs free energy minimization
pub mod ChemEquilibrium;
#[allow(non_snake_case)]
/// parsers and containers for NASA-7 thermodynamic data
pub mod DBhandlers;
/// Cp, dH, dS and dG from NASA-7 coefficients
pub mod thermo_properties;
