use std::path::Path;

use crate::error::ExtractError;
use crate::traits::TextExtractor;

/// [`TextExtractor`] backed by the pure-Rust `pdf-extract` crate.
///
/// Only digital-native PDFs yield text; scanned image-only documents come
/// back empty (no OCR). `pdf-extract` panics on some malformed inputs; the
/// worker pool contains those and reports them as
/// [`ExtractError::Panicked`].
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PdfExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ExtractError> {
        let bytes = std::fs::read(path).map_err(|e| ExtractError::Open {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

        pdf_extract::extract_text_from_mem(&bytes).map_err(|e| ExtractError::Extraction {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_open_error() {
        let err = PdfExtractor::new()
            .extract_text(Path::new("/nonexistent/file.pdf"))
            .unwrap_err();
        assert!(matches!(err, ExtractError::Open { .. }));
        assert_eq!(err.path(), Path::new("/nonexistent/file.pdf"));
    }
}
