//! # pdfscan
//!
//! Find which PDF documents under a directory mention which people.
//!
//! pdfscan walks a directory tree, extracts the text of every `.pdf` on a
//! pool of worker threads, normalizes it (NFKC, collapsed whitespace) and
//! searches it for a list of names as whole words, case-insensitively. The
//! result is a [`ScanReport`] listing each matching file with the names it
//! contains.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! let report = pdfscan::scan()
//!     .root("/srv/archive")
//!     .names(["Zaid Ahmed", "Omar"])
//!     .run()
//!     .unwrap();
//!
//! for m in &report.matches {
//!     println!("{}: {:?}", m.path.display(), m.names);
//! }
//! ```
//!
//! # Matching Without a Scan
//!
//! The normalizer and matcher work on plain strings:
//!
//! ```rust
//! let found = pdfscan::find_matches("Signed: JOHN\n\tSMITH", &["John Smith", "Ann"]).unwrap();
//! assert_eq!(found, vec!["John Smith"]);
//! ```
//!
//! # Custom Extractors
//!
//! Implement [`TextExtractor`] to read something other than PDFs, or to feed
//! canned text in tests:
//!
//! ```rust
//! use std::path::Path;
//! use pdfscan::{ExtractError, TextExtractor};
//!
//! struct Fixed(&'static str);
//!
//! impl TextExtractor for Fixed {
//!     fn extract_text(&self, _path: &Path) -> Result<String, ExtractError> {
//!         Ok(self.0.to_string())
//!     }
//! }
//! ```

#![forbid(unsafe_code)]

pub mod engine;

mod builder;
mod error;
mod extract;
mod matcher;
mod normalize;
mod results;
mod traits;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::{active_names, ScanBuilder, ScanEvent};
pub use engine::{enumerate_pdfs, is_worker_thread, walk_pdfs, CancelFlag, WORKER_THREAD_PREFIX};
pub use error::{ExtractError, ScanError};
pub use extract::PdfExtractor;
pub use matcher::{find_matches, NameMatcher};
pub use normalize::{normalize, normalize_name};
pub use results::{MatchResult, ScanReport, ScanStats, ScanStatus};
pub use traits::TextExtractor;

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`ScanBuilder`] to configure and run a scan.
///
/// # Example
///
/// ```rust
/// use pdfscan::ScanError;
///
/// // Every name is blank, so nothing is enumerated.
/// let err = pdfscan::scan()
///     .root(".")
///     .names(["", "   "])
///     .run()
///     .unwrap_err();
///
/// assert!(matches!(err, ScanError::NoActiveNames));
/// ```
pub fn scan() -> ScanBuilder {
    ScanBuilder::default()
}
