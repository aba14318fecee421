use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fatal errors that stop a scan before any file is processed.
#[derive(Error, Debug)]
pub enum ScanError {
    // Validation
    #[error("no directory to scan was given")]
    MissingRoot,

    #[error("the directory '{}' does not exist or is not a directory", .0.display())]
    InvalidDirectory(PathBuf),

    #[error("no active names to search for")]
    NoActiveNames,

    #[error("invalid thread count: {0}")]
    InvalidThreadCount(usize),

    #[error("invalid name pattern: {0}")]
    InvalidPattern(String),

    // Runtime
    #[error("worker pool failure: {0}")]
    ThreadPool(String),

    #[error("IO error at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// The path this error occurred at, if applicable.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::InvalidDirectory(p) | Self::Io { path: p, .. } => Some(p),
            _ => None,
        }
    }
}

/// A single document could not be turned into text.
///
/// Never fatal to a scan: the coordinator logs it and counts the file as
/// having no matches.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("cannot open {}: {detail}", path.display())]
    Open { path: PathBuf, detail: String },

    #[error("cannot extract text from {}: {detail}", path.display())]
    Extraction { path: PathBuf, detail: String },

    #[error("PDF parser panicked on {}: {detail}", path.display())]
    Panicked { path: PathBuf, detail: String },
}

impl ExtractError {
    pub fn path(&self) -> &Path {
        match self {
            Self::Open { path, .. }
            | Self::Extraction { path, .. }
            | Self::Panicked { path, .. } => path,
        }
    }

    /// The underlying cause, without the path prefix.
    pub fn detail(&self) -> &str {
        match self {
            Self::Open { detail, .. }
            | Self::Extraction { detail, .. }
            | Self::Panicked { detail, .. } => detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_directory_message_names_the_path() {
        let err = ScanError::InvalidDirectory(PathBuf::from("/no/such/dir"));
        assert!(err.to_string().contains("/no/such/dir"));
        assert_eq!(err.path(), Some(Path::new("/no/such/dir")));
        assert!(ScanError::NoActiveNames.path().is_none());
    }

    #[test]
    fn missing_root_message_does_not_show_an_empty_path() {
        let msg = ScanError::MissingRoot.to_string();
        assert_eq!(msg, "no directory to scan was given");
        assert!(!msg.contains("''"));
        assert!(ScanError::MissingRoot.path().is_none());
    }

    #[test]
    fn extract_error_exposes_path_and_detail() {
        let err = ExtractError::Extraction {
            path: PathBuf::from("a.pdf"),
            detail: "bad xref".into(),
        };
        assert_eq!(err.path(), Path::new("a.pdf"));
        assert_eq!(err.detail(), "bad xref");
        assert!(err.to_string().contains("a.pdf"));
    }
}
