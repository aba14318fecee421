use std::path::Path;

use crate::error::ExtractError;

/// Turns a document on disk into text.
///
/// Implement this to plug in a different PDF engine, or an in-memory fake in
/// tests. The default is [`PdfExtractor`](crate::PdfExtractor).
///
/// # Thread Safety
///
/// `Send + Sync` are required: one extractor is shared by every worker and
/// called concurrently on different files.
///
/// # Error Handling
///
/// Return `Err(ExtractError)` for anything that prevents reading the file
/// (corrupt, encrypted, unsupported). The coordinator logs it and moves on;
/// one bad file never aborts a scan. Implementations should not panic, but a
/// panic in a worker is contained to that file's result all the same.
///
/// # Example
///
/// ```rust
/// use std::path::Path;
/// use pdfscan::{ExtractError, TextExtractor};
///
/// struct PlainText;
///
/// impl TextExtractor for PlainText {
///     fn extract_text(&self, path: &Path) -> Result<String, ExtractError> {
///         std::fs::read_to_string(path).map_err(|e| ExtractError::Open {
///             path: path.to_path_buf(),
///             detail: e.to_string(),
///         })
///     }
/// }
/// ```
pub trait TextExtractor: Send + Sync {
    /// Extract the full text of the document at `path`.
    fn extract_text(&self, path: &Path) -> Result<String, ExtractError>;
}
