// NOTE: evalmetrics layering
//
// types   -> schema of telemetry blocks and the report
// engine  -> pure pipeline: extract -> aggregate -> derive
// runtime -> file I/O, configuration, archiving
// cli     -> argument parsing, logging setup, terminal output
//
// Only this crate touches the process environment; everything below receives
// an explicit Config.

mod args;
mod commands;
mod handlers;
pub mod logging;
pub mod types;
mod views;

pub use args::{Cli, Commands};
pub use commands::run;
