//! Command-line front end for the vehicle stock.

pub mod args;
pub mod commands;
pub mod render;

pub use args::{Cli, LogFormatArg};
pub use commands::{resolve_config, run};
