use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::{ArchiveConfig, Error, Result};

/// File name offered to the browser by the download endpoint.
pub const ATTACHMENT_NAME: &str = "eval_draft_data.zip";

/// Zip every regular file under `folder` into `writer`.
///
/// Entry names are relative to the folder's parent, so they all start with the
/// folder's own name. Returns the number of files stored.
pub fn zip_folder<W: Write + Seek>(folder: &Path, writer: W) -> Result<usize> {
    if !folder.is_dir() {
        return Err(Error::FolderNotFound(folder.to_path_buf()));
    }

    let base = folder.parent().unwrap_or(folder);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = zip::ZipWriter::new(writer);
    let mut files = 0;

    for entry in WalkDir::new(folder).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(base).unwrap_or(entry.path());
        zip.start_file(entry_name(relative), options)?;
        let mut source = File::open(entry.path())?;
        std::io::copy(&mut source, &mut zip)?;
        files += 1;
    }

    zip.finish()?;
    tracing::debug!(folder = %folder.display(), files, "Archived folder");
    Ok(files)
}

/// Forward-slash archive path made of the normal components of `relative`.
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// What an offline archive build produced.
#[derive(Debug, Clone)]
pub struct ArchiveOutcome {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub files: usize,
}

impl ArchiveOutcome {
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0 / 1024.0
    }
}

/// Zip the configured folder to the configured output, replacing any previous
/// archive.
///
/// The archive is assembled in a temporary file next to the output and moved
/// into place only once complete.
pub fn build_archive(config: &ArchiveConfig) -> Result<ArchiveOutcome> {
    if !config.folder.is_dir() {
        return Err(Error::FolderNotFound(config.folder.clone()));
    }

    let parent = match config.output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;

    if config.output.exists() {
        std::fs::remove_file(&config.output)?;
    }

    let mut staging = tempfile::Builder::new()
        .prefix(".draft_data_")
        .suffix(".zip")
        .tempfile_in(&parent)?;
    let files = zip_folder(&config.folder, staging.as_file_mut())?;
    staging
        .persist(&config.output)
        .map_err(|err| Error::Io(err.error))?;

    let size_bytes = std::fs::metadata(&config.output)?.len();
    tracing::info!(path = %config.output.display(), size_bytes, files, "Created archive");

    Ok(ArchiveOutcome {
        path: config.output.clone(),
        size_bytes,
        files,
    })
}

/// Response of the draft-data download endpoint, in the serverless function
/// shape (`statusCode`, `headers`, `body`, `isBase64Encoded`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl DownloadResponse {
    fn zip(body: String) -> Self {
        let headers = BTreeMap::from([
            ("Content-Type".to_string(), "application/zip".to_string()),
            (
                "Content-Disposition".to_string(),
                format!("attachment; filename=\"{}\"", ATTACHMENT_NAME),
            ),
        ]);

        Self {
            status_code: 200,
            headers,
            body,
            is_base64_encoded: true,
        }
    }

    fn error(status_code: u16, message: String) -> Self {
        let headers = BTreeMap::from([(
            "Content-Type".to_string(),
            "application/json".to_string(),
        )]);

        Self {
            status_code,
            headers,
            body: serde_json::json!({ "error": message }).to_string(),
            is_base64_encoded: false,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

/// Serve the draft-data folder as a base64 zip attachment.
///
/// Never fails: a missing folder is a 404 response and any archiving failure a
/// 500 response.
pub fn download_draft_data(folder: &Path) -> DownloadResponse {
    download_draft_data_in(folder, &std::env::temp_dir())
}

/// Same as [`download_draft_data`], staging the archive under `temp_dir`.
pub fn download_draft_data_in(folder: &Path, temp_dir: &Path) -> DownloadResponse {
    if !folder.exists() {
        return DownloadResponse::error(
            404,
            format!("Draft data folder not found: {}", folder.display()),
        );
    }

    match archive_to_base64(folder, temp_dir) {
        Ok(body) => DownloadResponse::zip(body),
        Err(err) => {
            tracing::error!(folder = %folder.display(), "Error creating zip: {}", err);
            DownloadResponse::error(500, format!("Failed to create zip: {}", err))
        }
    }
}

/// Archive into a uniquely named temp file and return its base64 encoding.
/// The temp file is removed when this returns, whatever the outcome.
fn archive_to_base64(folder: &Path, temp_dir: &Path) -> Result<String> {
    let mut staging = tempfile::Builder::new()
        .prefix("draft_data_")
        .suffix(".zip")
        .tempfile_in(temp_dir)?;

    zip_folder(folder, staging.as_file_mut())?;
    let bytes = std::fs::read(staging.path())?;

    Ok(STANDARD.encode(bytes))
}
