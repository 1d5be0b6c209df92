use log::{LevelFilter, SetLoggerError};
use simplelog::{ColorChoice, Config, SimpleLogger, TermLogger, TerminalMode};

/// Terminal logger at `level`, plain stdout logger when the terminal logger cannot be
/// installed. Fails when a logger is already set.
pub fn init_logger(level: LevelFilter) -> Result<(), SetLoggerError> {
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .or_else(|_| SimpleLogger::init(level, Config::default()))
}
