pub mod archive;
pub mod download;
pub mod report;
