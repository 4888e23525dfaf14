pub mod config;
pub mod error;
pub mod ops;

pub use config::{ArchiveConfig, Config, ReportConfig};
pub use error::{Error, Result};
pub use ops::{
    ArchiveOutcome, DownloadResponse, ReportOutcome, build_archive, download_draft_data,
    generate_report, write_report, zip_folder,
};
