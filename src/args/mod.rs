mod cli;
mod parsers;


pub use cli::{DEFAULT_WORKERS, LoadArgs, MAX_WORKERS};
pub use parsers::{normalize_target, parse_duration_arg};
