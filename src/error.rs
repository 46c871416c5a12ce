//! Error types for epub-onenote operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while converting an EPUB into note pages.
#[derive(Error, Debug)]
pub enum Error {
    /// The uploaded archive is unreadable or structurally invalid
    /// (not a zip, no container descriptor, wrong mimetype).
    #[error("Invalid archive: {0}")]
    Archive(String),

    /// Malformed or structurally unusable XML/HTML.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A page, stylesheet or image referenced by the book is missing on disk.
    #[error("Asset not found: {}", .0.display())]
    AssetNotFound(PathBuf),

    /// The note service answered with a non-success status.
    #[error("Upload failed with status {status}: {body}")]
    Upload { status: u16, body: String },

    /// Missing or contradictory settings.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether repeating the failed operation might succeed.
    ///
    /// Network failures, throttling and server errors are transient; broken
    /// or missing book content is not.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Http(_) | Error::Io(_) => true,
            Error::Upload { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        let throttled = Error::Upload {
            status: 429,
            body: String::new(),
        };
        let unavailable = Error::Upload {
            status: 503,
            body: String::new(),
        };
        let forbidden = Error::Upload {
            status: 403,
            body: "denied".to_string(),
        };

        assert!(throttled.is_transient());
        assert!(unavailable.is_transient());
        assert!(!forbidden.is_transient());
        assert!(!Error::AssetNotFound(PathBuf::from("a.png")).is_transient());
        assert_eq!(
            forbidden.to_string(),
            "Upload failed with status 403: denied"
        );
    }
}
