use crate::views::archive;
use anyhow::Result;
use evalmetrics_runtime::{ArchiveConfig, build_archive};

pub fn handle(config: &ArchiveConfig) -> Result<()> {
    tracing::info!(folder = %config.folder.display(), "Zipping draft data");
    let outcome = build_archive(config)?;
    archive::print_created(&outcome);
    Ok(())
}
