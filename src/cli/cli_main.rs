use super::cli_examples::{EXAMPLE_T, run_builtin_pools, solve_and_print};
use crate::Thermodynamics::ChemEquilibrium::EquilibriumOutput::pretty_print_properties;
use crate::Thermodynamics::ChemEquilibrium::EquilibriumSolver::EquilibriumResult;
use crate::Thermodynamics::DBhandlers::NASA_parser::NasaLibrary;
use crate::Utils::load_from_file::{LoadData, TaskError};
use crate::settings::{SettingsError, SolverSettings};
use std::io::{self, Write};
use std::path::Path;

pub fn run_interactive_menu() {
    loop {
        show_main_menu();
        let choice = get_user_input();

        match choice.trim() {
            "1" => {
                print!("\x1b[36mSettings file (empty for defaults): \x1b[0m");
                flush();
                let file = get_user_input();
                let res = read_settings(file.trim())
                    .map_err(TaskError::from)
                    .and_then(|settings| run_builtin_pools(&settings));
                if let Err(e) = res {
                    println!("\x1b[31m{}\x1b[0m", e);
                }
            }
            "2" => {
                print!("\x1b[36mTask file: \x1b[0m");
                flush();
                let file = get_user_input();
                if let Err(e) = run_task_file(file.trim()) {
                    println!("\x1b[31m{}\x1b[0m", e);
                }
            }
            "3" => properties_menu(),
            "0" => {
                println!("Goodbye!");
                break;
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }
}
/* colors
Blue (\x1b[34m) - header text

Yellow (\x1b[33m) - menu options

Cyan (\x1b[36m) - prompts

Red (\x1b[31m) - errors

Reset (\x1b[0m) - back to normal color
*/
fn show_main_menu() {
    println!("\x1b[34m\n Chemical equilibrium by Gibbs free energy minimization \n\x1b[0m");
    println!("\x1b[33m1. Built-in pools (T = 500 K, P = 100000 Pa)\x1b[0m");
    println!("\x1b[33m2. Run task file\x1b[0m");
    println!("\x1b[33m3. Species properties\x1b[0m");
    println!("\x1b[33m0. Exit\x1b[0m");
    print!("\x1b[36mEnter your choice: \x1b[0m");
    flush();
}

fn flush() {
    let _ = io::stdout().flush();
}
/// one line from stdin; end of input reads as "0" so the menu exits
fn get_user_input() -> String {
    let mut input = String::new();
    match io::stdin().read_line(&mut input) {
        Ok(0) | Err(_) => "0".to_string(),
        Ok(_) => input,
    }
}

/// settings from a JSON file, defaults for an empty name
pub fn read_settings(file_name: &str) -> Result<SolverSettings, SettingsError> {
    if file_name.is_empty() {
        Ok(SolverSettings::default())
    } else {
        let settings = SolverSettings::from_file(Path::new(file_name))?;
        log::set_max_level(settings.level_filter());
        Ok(settings)
    }
}

fn properties_menu() {
    let library = match NasaLibrary::bundled() {
        Ok(library) => library,
        Err(e) => {
            println!("\x1b[31m{}\x1b[0m", e);
            return;
        }
    };
    print!("\x1b[36mFormulas (space separated, empty for all): \x1b[0m");
    flush();
    let input = get_user_input();
    let mut formulas: Vec<&str> = input.split_whitespace().collect();
    if formulas.is_empty() {
        formulas = library.species_names();
    }
    print!("\x1b[36mTemperature, K [{}]: \x1b[0m", EXAMPLE_T);
    flush();
    let t = get_user_input();
    let t = match t.trim() {
        "" => EXAMPLE_T,
        s => match s.parse::<f64>() {
            Ok(t) => t,
            Err(e) => {
                println!("\x1b[31minvalid temperature '{}': {}\x1b[0m", s, e);
                return;
            }
        },
    };
    let settings = SolverSettings::default();
    let res = pretty_print_properties(
        t,
        &formulas,
        &library,
        settings.coefficient_range,
        settings.gibbs_convention,
    );
    if let Err(e) = res {
        println!("\x1b[31m{}\x1b[0m", e);
    }
}

/// Solves every pool of a task file and prints the results.
pub fn run_task_file(file_name: &str) -> Result<Vec<(String, EquilibriumResult)>, TaskError> {
    let loader = LoadData::new(file_name.to_string());
    let task = loader.load_task()?;
    log::set_max_level(task.settings.level_filter());
    let library = task.library(loader.base_dir())?;
    let mut results = Vec::new();
    for (name, pool) in task.pools()? {
        let result = solve_and_print(
            &name,
            &pool,
            task.temperature,
            task.pressure,
            &library,
            &task.settings,
        )?;
        results.push((name, result));
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Thermodynamics::ChemEquilibrium::EquilibriumSolver::EquilibriumError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_run_task_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"temperature": 500.0, "pressure": 100000.0,
               "pools": [{{"name": "water", "species": [
                   {{"formula": "O2"}}, {{"formula": "H2"}}, {{"formula": "H2O", "mol": 0.0}}]}}]}}"#
        )
        .unwrap();
        let results = run_task_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "water");
        assert!(results[0].1.amount_of("H2O").unwrap() > 0.5);
    }

    #[test]
    fn test_run_task_file_ill_posed() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"temperature": -5.0, "pressure": 100000.0,
               "pools": [{{"name": "cold", "species": [{{"formula": "O2"}}]}}]}}"#
        )
        .unwrap();
        let res = run_task_file(file.path().to_str().unwrap());
        assert!(matches!(
            res,
            Err(TaskError::Equilibrium(EquilibriumError::Thermo(_)))
        ));
    }

    #[test]
    fn test_read_settings() {
        assert_eq!(read_settings("").unwrap(), SolverSettings::default());
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"coefficient_range": "FirstBlock", "log_level": "info"}}"#).unwrap();
        let settings = read_settings(file.path().to_str().unwrap()).unwrap();
        assert_eq!(
            settings.coefficient_range,
            crate::Thermodynamics::DBhandlers::thermo_api::CoefficientRange::FirstBlock
        );
        assert!(matches!(
            read_settings("no_such_settings.json"),
            Err(SettingsError::Io { .. })
        ));
    }
}
