//! Saving a response body to a file

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};

use crate::error::ExportError;

use super::classify::ContentClassification;

/// Content type used when the response did not declare one
pub const DEFAULT_EXPORT_CONTENT_TYPE: &str = "text/plain";

/// A single export attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub data: String,
    pub content_type: String,
    pub suggested_file_name: String,
}

impl ExportRequest {
    pub fn new(
        data: impl Into<String>,
        content_type: Option<&str>,
        classification: ContentClassification,
    ) -> Self {
        let content_type = content_type
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or(DEFAULT_EXPORT_CONTENT_TYPE)
            .to_string();

        Self {
            data: data.into(),
            content_type,
            suggested_file_name: suggested_file_name(classification),
        }
    }
}

/// `response-<timestamp>.<ext>`, with a timestamp that is safe in file names
pub fn suggested_file_name(classification: ContentClassification) -> String {
    let stamp = Utc::now()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace(':', "-");
    format!("response-{}.{}", stamp, classification.file_extension())
}

/// Whether a handler took care of the export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Claimed(Option<PathBuf>),
    Declined,
}

/// Host-provided export implementation
pub trait ExportHandler {
    fn export(&self, request: &ExportRequest) -> ExportOutcome;
}

/// Handler that never claims, leaving the download fallback to the viewer
#[derive(Debug, Default)]
pub struct DeclineExport;

impl ExportHandler for DeclineExport {
    fn export(&self, _request: &ExportRequest) -> ExportOutcome {
        ExportOutcome::Declined
    }
}

/// Handler that writes straight into a configured directory
#[derive(Debug)]
pub struct DirectoryExporter {
    dir: PathBuf,
}

impl DirectoryExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ExportHandler for DirectoryExporter {
    fn export(&self, request: &ExportRequest) -> ExportOutcome {
        let path = self.dir.join(&request.suggested_file_name);
        let result = fs::create_dir_all(&self.dir).and_then(|_| fs::write(&path, &request.data));

        match result {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Response exported");
                ExportOutcome::Claimed(Some(path))
            }
            Err(e) => {
                // Let the viewer fall back to its own download link
                tracing::warn!(path = %path.display(), "Export failed: {}", e);
                ExportOutcome::Declined
            }
        }
    }
}

/// Temporary file holding an export the host declined.
///
/// The file lives until the link is revoked: replacing the link, dismissing
/// the save dialog or dropping the viewer all remove it.
#[derive(Debug)]
pub struct DownloadLink {
    path: PathBuf,
    file_name: String,
    content_type: String,
}

impl DownloadLink {
    /// Write the request into `dir` under a unique name
    pub fn create(dir: &Path, request: &ExportRequest) -> Result<Self, ExportError> {
        let blob_name = format!("{}-{}", uuid::Uuid::new_v4(), request.suggested_file_name);
        let path = dir.join(blob_name);

        fs::create_dir_all(dir).map_err(|source| ExportError::WriteError {
            path: dir.to_path_buf(),
            source,
        })?;
        fs::write(&path, &request.data).map_err(|source| ExportError::WriteError {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "Download link created");
        Ok(Self {
            path,
            file_name: request.suggested_file_name.clone(),
            content_type: request.content_type.clone(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Copy the file into `dest_dir` under its suggested name
    pub fn save_to(&self, dest_dir: &Path) -> Result<PathBuf, ExportError> {
        let dest = dest_dir.join(&self.file_name);
        fs::create_dir_all(dest_dir)
            .and_then(|_| fs::copy(&self.path, &dest))
            .map_err(|source| ExportError::WriteError {
                path: dest.clone(),
                source,
            })?;

        tracing::info!(path = %dest.display(), "Download saved");
        Ok(dest)
    }
}

impl Drop for DownloadLink {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::debug!(path = %self.path.display(), "Failed to revoke download link: {}", e);
        } else {
            tracing::debug!(path = %self.path.display(), "Download link revoked");
        }
    }
}

/// Directory for download links
pub fn default_download_dir() -> PathBuf {
    directories::ProjectDirs::from("io", "respview", "respview")
        .map(|dirs| dirs.cache_dir().join("downloads"))
        .unwrap_or_else(|| std::env::temp_dir().join("respview-downloads"))
}

/// Where "save download" copies files to
pub fn user_download_dir() -> Result<PathBuf, ExportError> {
    directories::UserDirs::new()
        .and_then(|dirs| {
            dirs.download_dir()
                .map(Path::to_path_buf)
                .or_else(|| Some(dirs.home_dir().to_path_buf()))
        })
        .ok_or(ExportError::NoDestination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_request_defaults_content_type() {
        let request = ExportRequest::new("hi", None, ContentClassification::Parsed);
        assert_eq!(request.content_type, "text/plain");
        assert!(request.suggested_file_name.starts_with("response-"));
        assert!(request.suggested_file_name.ends_with(".txt"));
        assert!(!request.suggested_file_name.contains(':'));
    }

    #[test]
    fn test_extension_follows_classification() {
        assert!(suggested_file_name(ContentClassification::Json).ends_with(".json"));
        assert!(suggested_file_name(ContentClassification::Xml).ends_with(".xml"));
        assert!(suggested_file_name(ContentClassification::None).ends_with(".txt"));
    }

    #[test]
    fn test_directory_exporter_claims() {
        let dir = tempdir().unwrap();
        let exporter = DirectoryExporter::new(dir.path());
        let request = ExportRequest::new("{}", Some("application/json"), ContentClassification::Json);

        match exporter.export(&request) {
            ExportOutcome::Claimed(Some(path)) => {
                assert_eq!(std::fs::read_to_string(path).unwrap(), "{}");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_download_link_is_revoked_on_drop() {
        let dir = tempdir().unwrap();
        let request = ExportRequest::new("body", Some("text/plain"), ContentClassification::Parsed);

        let link = DownloadLink::create(dir.path(), &request).unwrap();
        let path = link.path().to_path_buf();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "body");
        assert_eq!(link.file_name(), request.suggested_file_name);

        drop(link);
        assert!(!path.exists());
    }

    #[test]
    fn test_download_link_save_to() {
        let blobs = tempdir().unwrap();
        let dest = tempdir().unwrap();
        let request = ExportRequest::new("<a/>", Some("application/xml"), ContentClassification::Xml);

        let link = DownloadLink::create(blobs.path(), &request).unwrap();
        let saved = link.save_to(dest.path()).unwrap();

        assert_eq!(saved.file_name().unwrap().to_str().unwrap(), link.file_name());
        drop(link);
        // The saved copy outlives the link
        assert_eq!(std::fs::read_to_string(saved).unwrap(), "<a/>");
    }
}
