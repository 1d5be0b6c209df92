/// built-in pools and the shared solve-and-print routine
pub mod cli_examples;
/// interactive menu and task-file runs
pub mod cli_main;
