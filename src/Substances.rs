//! # Substances
//! Value types the equilibrium problem is stated in: chemical elements with their
//! atomic counts, species built from them (each carrying a current mole amount) and
//! pools of candidate species.
/// chemical element with its atomic count inside one species
pub mod element;
/// chemical formula strings ("CH4", "H2O2") into elements
pub mod formula;
/// immutable candidate set of species for one equilibrium solve
pub mod pool;
/// species: ordered elements plus the current working mole amount
pub mod species;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SubstanceError {
    #[error("species must contain at least one element")]
    EmptySpecies,
    #[error("element {0} appears more than once in one species")]
    DuplicateElement(String),
    #[error("invalid atomic count {count} for element {element}")]
    InvalidCount { element: String, count: f64 },
    #[error("cannot parse formula '{formula}': {reason}")]
    InvalidFormula { formula: String, reason: String },
}
