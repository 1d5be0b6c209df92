pub mod NASAdata;

pub mod NASA_parser;
pub mod thermo_api;
