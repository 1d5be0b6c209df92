use super::SubstanceError;
use super::element::Element;
use super::formula::parse_formula;
use std::collections::HashMap;
use std::fmt;

/// Chemical species: an ordered sequence of elements and the current working mole amount.
///
/// `mol` starts as the initial amount put into the mixture; the equilibrium solver
/// overwrites it with the converged amount and the classifier flips the sign of
/// consumed species.
#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    elements: Vec<Element>,
    /// current working amount, mol
    pub mol: f64,
    name_map: HashMap<String, usize>,
}

impl Species {
    /// species with the default amount of 1 mol
    /// # Example
    /// ```
    /// use gibbs_min::Substances::element::Element;
    /// use gibbs_min::Substances::species::Species;
    /// let ch4 = Species::new(vec![Element::single("C"), Element::new("H", 4.0)]).unwrap();
    /// assert_eq!(ch4.get_string(), "CH4");
    /// assert_eq!(ch4.get_element_count("H", false), 4.0);
    /// ```
    pub fn new(elements: Vec<Element>) -> Result<Self, SubstanceError> {
        Self::with_mol(elements, 1.0)
    }

    pub fn with_mol(elements: Vec<Element>, mol: f64) -> Result<Self, SubstanceError> {
        if elements.is_empty() {
            return Err(SubstanceError::EmptySpecies);
        }
        let mut name_map = HashMap::with_capacity(elements.len());
        for (index, element) in elements.iter().enumerate() {
            if !element.count().is_finite() || element.count() < 0.0 {
                return Err(SubstanceError::InvalidCount {
                    element: element.name().to_string(),
                    count: element.count(),
                });
            }
            if name_map.insert(element.name().to_string(), index).is_some() {
                return Err(SubstanceError::DuplicateElement(element.name().to_string()));
            }
        }
        Ok(Self {
            elements,
            mol,
            name_map,
        })
    }
    /// parses a formula such as "H2O2" and attaches the amount
    pub fn from_formula(formula: &str, mol: f64) -> Result<Self, SubstanceError> {
        let elements = parse_formula(formula)?;
        Self::with_mol(elements, mol)
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element_names(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|e| e.name())
    }

    /// formula without the amount; this is the key into the thermodynamic table
    pub fn get_string(&self) -> String {
        self.elements.iter().map(|e| e.to_string()).collect()
    }

    /// Stoichiometric count of `name` in this species, 0 if absent.
    /// With `use_mol` the count is scaled by the current amount.
    pub fn get_element_count(&self, name: &str, use_mol: bool) -> f64 {
        match self.name_map.get(name) {
            Some(&index) => {
                let count = self.elements[index].count();
                if use_mol { count * self.mol } else { count }
            }
            None => 0.0,
        }
    }

    pub fn set_mol(&mut self, mol: f64) {
        self.mol = mol;
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mol != 1.0 {
            write!(f, "{}", self.mol)?;
        }
        write!(f, "{}", self.get_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_count() {
        let h2o = Species::with_mol(vec![Element::new("H", 2.0), Element::single("O")], 3.0)
            .unwrap();
        assert_eq!(h2o.get_element_count("H", false), 2.0);
        assert_eq!(h2o.get_element_count("H", true), 6.0);
        assert_eq!(h2o.get_element_count("O", true), 3.0);
        assert_eq!(h2o.get_element_count("C", true), 0.0);
    }

    #[test]
    fn test_display_and_formula() {
        let oh = Species::with_mol(vec![Element::single("O"), Element::single("H")], 0.0).unwrap();
        assert_eq!(oh.get_string(), "OH");
        assert_eq!(oh.to_string(), "0OH");
        let o2 = Species::new(vec![Element::new("O", 2.0)]).unwrap();
        assert_eq!(o2.to_string(), "O2");
    }

    #[test]
    fn test_duplicate_element_rejected() {
        let res = Species::new(vec![Element::single("H"), Element::single("H")]);
        assert_eq!(res, Err(SubstanceError::DuplicateElement("H".to_string())));
    }

    #[test]
    fn test_negative_count_rejected() {
        let res = Species::new(vec![Element::new("H", -1.0)]);
        assert!(matches!(res, Err(SubstanceError::InvalidCount { .. })));
        assert_eq!(Species::new(vec![]), Err(SubstanceError::EmptySpecies));
    }

    #[test]
    fn test_from_formula() {
        let co2 = Species::from_formula("CO2", 0.0).unwrap();
        assert_eq!(co2.get_string(), "CO2");
        assert_eq!(co2.get_element_count("O", false), 2.0);
        assert_eq!(co2.mol, 0.0);
    }
}
