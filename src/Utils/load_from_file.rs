//! Equilibrium task files. A task is one JSON document:
//! ```json
//! {
//!   "thermo_file": "data/thermo30.dat",
//!   "temperature": 500.0,
//!   "pressure": 100000.0,
//!   "settings": { "max_iterations": 500 },
//!   "pools": [
//!     { "name": "water", "species": [ {"formula": "O2", "mol": 1.0}, {"formula": "H2"}, {"formula": "H2O", "mol": 0.0} ] }
//!   ]
//! }
//! ```
//! `thermo_file` and `settings` are optional, a missing `mol` means 1 mol.
use crate::Substances::SubstanceError;
use crate::Substances::pool::Pool;
use crate::Substances::species::Species;
use crate::Thermodynamics::ChemEquilibrium::EquilibriumSolver::EquilibriumError;
use crate::Thermodynamics::DBhandlers::NASA_parser::NasaLibrary;
use crate::Thermodynamics::DBhandlers::thermo_api::ThermoError;
use crate::settings::{SettingsError, SolverSettings};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("file '{0}' does not exist")]
    NotFound(String),
    #[error("failed to open file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("error parsing task at line {line}, column {column}: {msg}")]
    Parse {
        line: usize,
        column: usize,
        msg: String,
    },
    #[error("task contains no pools")]
    NoPools,
    #[error("pool '{pool}': {source}")]
    Substance {
        pool: String,
        #[source]
        source: SubstanceError,
    },
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Thermo(#[from] ThermoError),
    #[error(transparent)]
    Equilibrium(#[from] EquilibriumError),
}

fn default_mol() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesInput {
    pub formula: String,
    #[serde(default = "default_mol")]
    pub mol: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolInput {
    pub name: String,
    pub species: Vec<SpeciesInput>,
}

impl PoolInput {
    pub fn to_pool(&self) -> Result<Pool, TaskError> {
        let species = self
            .species
            .iter()
            .map(|s| Species::from_formula(&s.formula, s.mol))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| TaskError::Substance {
                pool: self.name.clone(),
                source,
            })?;
        Ok(Pool::new(&species))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumTask {
    #[serde(default)]
    pub thermo_file: Option<String>,
    pub temperature: f64,
    pub pressure: f64,
    #[serde(default)]
    pub settings: SolverSettings,
    pub pools: Vec<PoolInput>,
}

impl EquilibriumTask {
    /// every pool of the task, in file order
    pub fn pools(&self) -> Result<Vec<(String, Pool)>, TaskError> {
        self.pools
            .iter()
            .map(|p| Ok((p.name.clone(), p.to_pool()?)))
            .collect()
    }
    /// The thermo file named in the task (relative paths resolved against `base_dir`),
    /// or the bundled library when the task names none.
    pub fn library(&self, base_dir: Option<&Path>) -> Result<NasaLibrary, TaskError> {
        match &self.thermo_file {
            Some(file) => {
                let mut path = PathBuf::from(file);
                if path.is_relative() {
                    if let Some(dir) = base_dir {
                        path = dir.join(path);
                    }
                }
                Ok(NasaLibrary::from_file(&path)?)
            }
            None => Ok(NasaLibrary::bundled()?),
        }
    }
}

pub struct LoadData {
    pub file_name: String,
}

impl LoadData {
    pub fn new(file_name: String) -> Self {
        LoadData { file_name }
    }
    pub fn load_task(&self) -> Result<EquilibriumTask, TaskError> {
        load_task_from_file(&self.file_name)
    }
    /// directory of the task file, base for relative thermo file paths
    pub fn base_dir(&self) -> Option<&Path> {
        Path::new(&self.file_name).parent()
    }
}

/// Parses a task document. Parse errors are logged together with the offending line.
pub fn parse_task(text: &str) -> Result<EquilibriumTask, TaskError> {
    let task: EquilibriumTask = match serde_json::from_str(text) {
        Ok(task) => task,
        Err(e) => {
            let error_line = e.line();
            let error_column = e.column();
            error!(
                "Error parsing task at line {}, column {}: {}",
                error_line, error_column, e
            );
            if let Some(problem_line) = text.lines().nth(error_line.saturating_sub(1)) {
                error!("Problematic line: {}", problem_line);
                if error_column >= 1 && error_column <= problem_line.len() {
                    let pointer = " ".repeat(error_column - 1) + "^";
                    error!("                  {}", pointer);
                }
            }
            return Err(TaskError::Parse {
                line: error_line,
                column: error_column,
                msg: e.to_string(),
            });
        }
    };
    task.settings.validate()?;
    if task.pools.is_empty() {
        return Err(TaskError::NoPools);
    }
    Ok(task)
}

pub fn load_task_from_file(file_name: &str) -> Result<EquilibriumTask, TaskError> {
    let path = Path::new(file_name);
    if !path.exists() {
        return Err(TaskError::NotFound(file_name.to_string()));
    }
    let text = fs::read_to_string(path).map_err(|source| TaskError::Io {
        path: file_name.to_string(),
        source,
    })?;
    let task = parse_task(&text)?;
    info!(
        "loaded task '{}': {} pool(s) at T = {} K, P = {} Pa",
        file_name,
        task.pools.len(),
        task.temperature,
        task.pressure
    );
    Ok(task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::FloorPolicy;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TASK: &str = r#"{
  "temperature": 500.0,
  "pressure": 100000.0,
  "settings": { "max_iterations": 200, "floor": { "Floor": 0.001 } },
  "pools": [
    { "name": "water", "species": [
        { "formula": "O2" },
        { "formula": "H2", "mol": 2.0 },
        { "formula": "H2O", "mol": 0.0 } ] }
  ]
}"#;

    #[test]
    fn test_load_task() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", TASK).unwrap();
        let loader = LoadData::new(file.path().to_str().unwrap().to_string());
        let task = loader.load_task().unwrap();
        assert_eq!(task.temperature, 500.0);
        assert_eq!(task.settings.max_iterations, 200);
        assert_eq!(task.settings.floor, FloorPolicy::Floor(0.001));
        // untouched settings keep their defaults
        assert_eq!(task.settings.tolerance, 1e-9);
        let pools = task.pools().unwrap();
        assert_eq!(pools.len(), 1);
        let (name, pool) = &pools[0];
        assert_eq!(name, "water");
        assert_eq!(pool.species()[0].mol, 1.0);
        assert_eq!(pool.species()[1].mol, 2.0);
        assert_eq!(pool.species()[2].get_string(), "H2O");
        let library = task.library(loader.base_dir()).unwrap();
        assert!(library.get("H2O").is_some());
    }

    #[test]
    fn test_missing_file() {
        let res = load_task_from_file("no_such_task_file.json");
        assert!(matches!(res, Err(TaskError::NotFound(_))));
    }

    #[test]
    fn test_parse_error_position() {
        let broken = "{\n  \"temperature\": 500.0,\n  \"pressure\": ,\n  \"pools\": []\n}";
        match parse_task(broken) {
            Err(TaskError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_task_without_pools() {
        let res = parse_task(r#"{"temperature": 500.0, "pressure": 1e5, "pools": []}"#);
        assert!(matches!(res, Err(TaskError::NoPools)));
    }

    #[test]
    fn test_invalid_settings() {
        let res = parse_task(
            r#"{"temperature": 500.0, "pressure": 1e5, "settings": {"max_iterations": 0},
               "pools": [{"name": "a", "species": [{"formula": "O2"}]}]}"#,
        );
        assert!(matches!(res, Err(TaskError::Settings(_))));
    }

    #[test]
    fn test_bad_formula_names_the_pool() {
        let task = parse_task(
            r#"{"temperature": 500.0, "pressure": 1e5,
               "pools": [{"name": "broken", "species": [{"formula": "HOH"}]}]}"#,
        )
        .unwrap();
        match task.pools() {
            Err(TaskError::Substance { pool, .. }) => assert_eq!(pool, "broken"),
            other => panic!("expected substance error, got {:?}", other),
        }
    }

    #[test]
    fn test_thermo_file_is_used() {
        let mut thermo = NamedTempFile::new().unwrap();
        write!(thermo, "{}", crate::Thermodynamics::DBhandlers::NASA_parser::BUNDLED_THERMO)
            .unwrap();
        let text = format!(
            r#"{{"thermo_file": "{}", "temperature": 500.0, "pressure": 1e5,
                "pools": [{{"name": "a", "species": [{{"formula": "O2"}}]}}]}}"#,
            thermo.path().display()
        );
        let task = parse_task(&text).unwrap();
        let library = task.library(None).unwrap();
        assert!(library.get("CH4").is_some());

        let missing = parse_task(
            r#"{"thermo_file": "/no/such/thermo.dat", "temperature": 500.0, "pressure": 1e5,
               "pools": [{"name": "a", "species": [{"formula": "O2"}]}]}"#,
        )
        .unwrap();
        assert!(matches!(
            missing.library(None),
            Err(TaskError::Thermo(ThermoError::Io { .. }))
        ));
    }
}
