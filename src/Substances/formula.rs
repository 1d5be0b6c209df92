use super::SubstanceError;
use super::element::Element;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static FORMULA_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Z][a-z]?)(\d+(?:\.\d+)?)?").expect("formula token regex is valid")
});

/// Splits a flat formula ("CH4", "H2O2", "C0.5H") into elements, keeping their order.
/// Brackets and charges are not supported; a symbol may appear only once.
pub fn parse_formula(formula: &str) -> Result<Vec<Element>, SubstanceError> {
    let formula = formula.trim();
    let invalid = |reason: &str| SubstanceError::InvalidFormula {
        formula: formula.to_string(),
        reason: reason.to_string(),
    };
    if formula.is_empty() {
        return Err(SubstanceError::EmptySpecies);
    }
    let mut elements = Vec::new();
    let mut seen = HashSet::new();
    let mut covered = 0;
    for cap in FORMULA_TOKEN.captures_iter(formula) {
        let whole = cap.get(0).ok_or_else(|| invalid("empty match"))?;
        if whole.start() != covered {
            return Err(invalid(&format!(
                "unexpected character at position {}",
                covered
            )));
        }
        covered = whole.end();
        let name = &cap[1];
        let count = match cap.get(2) {
            Some(m) => m
                .as_str()
                .parse::<f64>()
                .map_err(|e| invalid(&e.to_string()))?,
            None => 1.0,
        };
        if !seen.insert(name.to_string()) {
            return Err(SubstanceError::DuplicateElement(name.to_string()));
        }
        elements.push(Element::new(name, count));
    }
    if covered != formula.len() {
        return Err(invalid(&format!(
            "unexpected character at position {}",
            covered
        )));
    }
    Ok(elements)
}
