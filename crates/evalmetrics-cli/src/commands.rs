use super::args::{Cli, Commands};
use super::handlers;
use crate::logging::init_logging;
use anyhow::Result;
use evalmetrics_runtime::Config;

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.log_level);

    let config = load_config(&cli)?;

    match cli.command {
        None => handlers::report::handle(&config.report),

        Some(Commands::Report { input, output }) => {
            let mut report = config.report;
            if let Some(input) = input {
                report.input = input;
            }
            if let Some(output) = output {
                report.output = output;
            }
            handlers::report::handle(&report)
        }

        Some(Commands::Archive { folder, output }) => {
            let mut archive = config.archive;
            if let Some(folder) = folder {
                archive.folder = folder;
            }
            if let Some(output) = output {
                archive.output = output;
            }
            handlers::archive::handle(&archive)
        }

        Some(Commands::Download { folder }) => {
            let folder = folder.unwrap_or(config.archive.folder);
            handlers::download::handle(&folder)
        }
    }
}

/// Config file (if any), then environment overrides. Flags are applied per command.
fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::default(),
    };

    Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
}
