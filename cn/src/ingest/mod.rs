//! Supporting document ingestion
//!
//! Narrow collaborator contracts for pulling text out of uploaded
//! files. Failures are real errors, never sentinel strings embedded in
//! the extracted content.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Extraction failures
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unsupported file type: .{extension}")]
    Unsupported { extension: String },
}

/// Pulls text out of an uploaded document
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String, ExtractError>;
}

/// Pulls text out of an uploaded audio recording
pub trait Transcriber: Send + Sync {
    fn transcribe(&self, path: &Path) -> Result<String, ExtractError>;
}

/// Extractor for plain-text document formats
#[derive(Debug, Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md", "text"];

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        debug!(?path, "PlainTextExtractor::extract: called");
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();

        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            debug!(%extension, "PlainTextExtractor::extract: unsupported extension");
            return Err(ExtractError::Unsupported { extension });
        }

        std::fs::read_to_string(path).map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brief.txt");
        std::fs::write(&path, "Project brief contents").unwrap();

        let extractor = PlainTextExtractor::new();
        assert_eq!(extractor.extract(&path).unwrap(), "Project brief contents");
    }

    #[test]
    fn test_extract_unsupported_extension() {
        let extractor = PlainTextExtractor::new();
        let result = extractor.extract(Path::new("upload.pdf"));
        assert!(matches!(
            result,
            Err(ExtractError::Unsupported { extension }) if extension == "pdf"
        ));
    }

    #[test]
    fn test_extract_missing_file_is_io_error() {
        let extractor = PlainTextExtractor::new();
        let result = extractor.extract(Path::new("/nonexistent/brief.txt"));
        assert!(matches!(result, Err(ExtractError::Io { .. })));
    }
}
