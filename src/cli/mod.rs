//! CLI module - argument parsing and the convert subcommand

mod args;
mod convert;

pub use args::{Cli, Commands};
pub use convert::run_convert;
