use super::SubstanceError;
use super::species::Species;
use std::collections::BTreeSet;
use std::fmt;

/// Snapshot of candidate species for one equilibrium solve.
/// The species are copied in, so solving a pool never touches the caller's instances;
/// the element set is the basis of the mass-balance constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct Pool {
    species: Vec<Species>,
    elements: BTreeSet<String>,
}

impl Pool {
    pub fn new(species: &[Species]) -> Self {
        let elements = Self::get_unique_elements(species);
        Self {
            species: species.to_vec(),
            elements,
        }
    }
    /// pool from (formula, mol) pairs
    /// # Example
    /// ```
    /// use gibbs_min::Substances::pool::Pool;
    /// let pool = Pool::from_formulas(&[("O2", 1.0), ("H2", 1.0), ("H2O", 0.0)]).unwrap();
    /// assert_eq!(pool.len(), 3);
    /// assert_eq!(pool.elements().len(), 2);
    /// ```
    pub fn from_formulas(list: &[(&str, f64)]) -> Result<Self, SubstanceError> {
        let species = list
            .iter()
            .map(|(formula, mol)| Species::from_formula(formula, *mol))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(&species))
    }

    fn get_unique_elements(species: &[Species]) -> BTreeSet<String> {
        species
            .iter()
            .flat_map(|s| s.element_names())
            .map(|name| name.to_string())
            .collect()
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn elements(&self) -> &BTreeSet<String> {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.species.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", parts.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Substances::element::Element;

    #[test]
    fn test_elements_are_union() {
        let pool = Pool::from_formulas(&[("CH4", 1.0), ("O2", 1.0), ("CO2", 0.0)]).unwrap();
        let names: Vec<&str> = pool.elements().iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["C", "H", "O"]);
    }

    #[test]
    fn test_pool_is_a_copy() {
        let mut h2 = Species::new(vec![Element::new("H", 2.0)]).unwrap();
        let pool = Pool::new(std::slice::from_ref(&h2));
        h2.set_mol(5.0);
        assert_eq!(pool.species()[0].mol, 1.0);
    }

    #[test]
    fn test_display() {
        let pool = Pool::from_formulas(&[("O2", 1.0), ("H2", 1.0), ("OH", 0.0)]).unwrap();
        assert_eq!(pool.to_string(), "O2 | H2 | 0OH");
    }
}
