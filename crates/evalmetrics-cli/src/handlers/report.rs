use crate::views::report;
use anyhow::Result;
use evalmetrics_runtime::{Error, ReportConfig, generate_report};

pub fn handle(config: &ReportConfig) -> Result<()> {
    match generate_report(config) {
        Ok(outcome) => {
            report::print_summary(&outcome);
            Ok(())
        }
        Err(err @ Error::MissingInput(_)) => {
            report::print_missing_input_hint();
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}
