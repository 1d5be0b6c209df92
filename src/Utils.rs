/// JSON task files: temperature, pressure, settings and named pools
pub mod load_from_file;
/// simplelog initialization for the binary
pub mod logger;
