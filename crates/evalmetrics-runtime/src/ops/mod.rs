mod archive;
mod report;

pub use archive::{
    ATTACHMENT_NAME, ArchiveOutcome, DownloadResponse, build_archive, download_draft_data,
    download_draft_data_in, zip_folder,
};
pub use report::{ReportOutcome, generate_report, write_report};
