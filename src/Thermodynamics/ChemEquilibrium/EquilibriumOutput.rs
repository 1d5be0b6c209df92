use super::EquilibriumSolver::EquilibriumResult;
use crate::Substances::species::Species;
use crate::Thermodynamics::DBhandlers::NASA_parser::NasaLibrary;
use crate::Thermodynamics::DBhandlers::thermo_api::{CoefficientRange, ThermoError};
use crate::Thermodynamics::thermo_properties::GibbsConvention;
use prettytable::{Table, row};

////////////////////////INPUT/OUTPUT////////////////////////////////////////////////////////

fn species_table(list: &[Species]) -> Table {
    let mut table = Table::new();
    table.add_row(row!["substance", "mol"]);
    for s in list {
        table.add_row(row![s.get_string(), format!("{:.6e}", s.mol)]);
    }
    table
}

impl EquilibriumResult {
    /// reactants, products and the element balance as tables
    pub fn to_tables(&self) -> Vec<Table> {
        let mut balance = Table::new();
        balance.add_row(row!["element", "initial", "final", "difference"]);
        let totals = self.element_totals();
        for (elm, b0) in &self.initial_totals {
            let b = totals.get(elm).copied().unwrap_or(0.0);
            balance.add_row(row![
                elm,
                format!("{:.6e}", b0),
                format!("{:.6e}", b),
                format!("{:.3e}", b - b0)
            ]);
        }
        vec![
            species_table(&self.reactants),
            species_table(&self.products),
            balance,
        ]
    }

    pub fn pretty_print(&self) {
        let tables = self.to_tables();
        println!("__________status: {}__________", self.status);
        println!("{}", self.message);
        println!(
            "iterations: {}, G = {:.6e} J",
            self.iterations, self.gibbs_energy
        );
        println!("__________reactants__________");
        tables[0].printstd();
        println!("__________products__________");
        tables[1].printstd();
        println!("__________element balance__________");
        tables[2].printstd();
        println!("{}", self.reaction_string());
        println!("_____________________________________________________________");
    }
}

/// Cp, dH, dS and dG of every formula at `t`
pub fn properties_table(
    t: f64,
    formulas: &[&str],
    library: &NasaLibrary,
    selection: CoefficientRange,
    convention: GibbsConvention,
) -> Result<Table, ThermoError> {
    let mut table = Table::new();
    table.add_row(row!["substance", "Cp", "dH", "dS", "dG"]);
    for formula in formulas {
        let props = library.properties(formula, t, selection, convention)?;
        table.add_row(row![
            props.formula,
            format!("{:.4}", props.Cp),
            format!("{:.4}", props.dh),
            format!("{:.4}", props.ds),
            format!("{:.4}", props.dG)
        ]);
    }
    Ok(table)
}

pub fn pretty_print_properties(
    t: f64,
    formulas: &[&str],
    library: &NasaLibrary,
    selection: CoefficientRange,
    convention: GibbsConvention,
) -> Result<(), ThermoError> {
    println!("__________subs properties at {} K__________", t);
    properties_table(t, formulas, library, selection, convention)?.printstd();
    println!("_____________________________________________________________");
    Ok(())
}
