use anyhow::Result;
use evalmetrics_runtime::download_draft_data;
use std::path::Path;

pub fn handle(folder: &Path) -> Result<()> {
    let response = download_draft_data(folder);
    if !response.is_success() {
        tracing::warn!(status = response.status_code, "Download request failed");
    }

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
