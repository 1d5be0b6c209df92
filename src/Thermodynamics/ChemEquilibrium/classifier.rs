use crate::Substances::species::Species;

/// Splits converged species into reactants and products.
/// Negative amounts are consumed species: they become reactants with the amount
/// replaced by its magnitude. Everything else (zero included) is a product.
pub fn classify(species: &[Species]) -> (Vec<Species>, Vec<Species>) {
    let mut reactants = Vec::new();
    let mut products = Vec::new();
    for s in species {
        let mut s = s.clone();
        if s.mol < 0.0 {
            s.mol = s.mol.abs();
            reactants.push(s);
        } else {
            products.push(s);
        }
    }
    (reactants, products)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_law() {
        let species = vec![
            Species::from_formula("O2", -0.5).unwrap(),
            Species::from_formula("H2", -1.0).unwrap(),
            Species::from_formula("OH", 0.0).unwrap(),
            Species::from_formula("H2O", 1.0).unwrap(),
        ];
        let (reactants, products) = classify(&species);
        assert_eq!(reactants.len(), 2);
        assert_eq!(products.len(), 2);
        for r in &reactants {
            let before = species
                .iter()
                .find(|s| s.get_string() == r.get_string())
                .unwrap();
            assert!(before.mol < 0.0);
            assert_eq!(r.mol, before.mol.abs());
        }
        for p in &products {
            let before = species
                .iter()
                .find(|s| s.get_string() == p.get_string())
                .unwrap();
            assert!(before.mol >= 0.0);
            assert_eq!(p.mol, before.mol);
        }
        // order within each list follows the pool
        assert_eq!(reactants[0].get_string(), "O2");
        assert_eq!(products[0].get_string(), "OH");
    }

    #[test]
    fn test_input_is_untouched() {
        let species = vec![Species::from_formula("CH4", -2.0).unwrap()];
        let (reactants, _) = classify(&species);
        assert_eq!(reactants[0].mol, 2.0);
        assert_eq!(species[0].mol, -2.0);
    }
}
