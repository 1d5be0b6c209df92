use gibbs_min::Utils::logger::init_logger;
use gibbs_min::cli::cli_main::{run_interactive_menu, run_task_file};
use gibbs_min::settings::SolverSettings;
use log::LevelFilter;
use std::env;
use std::process::ExitCode;

pub fn main() -> ExitCode {
    // the logger accepts everything, the task's settings narrow it down later
    if let Err(e) = init_logger(LevelFilter::Trace) {
        eprintln!("logging disabled: {}", e);
    }
    log::set_max_level(SolverSettings::default().level_filter());

    let args: Vec<String> = env::args().collect();
    match args.get(1) {
        Some(task_file) => match run_task_file(task_file) {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        },
        None => {
            run_interactive_menu();
            ExitCode::SUCCESS
        }
    }
}
