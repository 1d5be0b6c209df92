//! # gibbs_min
//! Equilibrium composition of ideal-gas mixtures by minimizing the system Gibbs free
//! energy subject to element conservation. Thermodynamic data come from NASA-7
//! polynomial files; the minimizer is a sequential quadratic programming method.
#[allow(non_snake_case)]
pub mod Numerics;
#[allow(non_snake_case)]
pub mod Substances;
#[allow(non_snake_case)]
pub mod Thermodynamics;
#[allow(non_snake_case)]
pub mod Utils;
pub mod cli;
pub mod settings;
