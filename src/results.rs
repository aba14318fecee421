use std::path::PathBuf;
use std::time::Duration;

/// One document that mentions at least one target name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Path of the matching document.
    pub path: PathBuf,

    /// Names found in it, in configured order. Never empty.
    pub names: Vec<String>,
}

/// How a scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    /// Every discovered file was processed.
    Completed,

    /// The directory holds no PDF files. Not an error.
    NoFilesFound,

    /// Cancelled mid-scan; `matches` holds whatever completed first.
    Interrupted,
}

/// The output of a scan.
///
/// `matches` is in completion order, which varies from run to run because
/// workers finish asynchronously.
#[derive(Debug)]
pub struct ScanReport {
    pub status: ScanStatus,

    /// Documents with at least one match. Files without matches, and files
    /// that failed to extract, are not represented.
    pub matches: Vec<MatchResult>,

    /// Scan performance statistics.
    pub stats: ScanStats,
}

impl ScanReport {
    pub(crate) fn no_files(names: usize, duration: Duration) -> Self {
        Self {
            status: ScanStatus::NoFilesFound,
            matches: Vec::new(),
            stats: ScanStats::compute(0, 0, 0, names, duration),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn was_interrupted(&self) -> bool {
        self.status == ScanStatus::Interrupted
    }
}

/// Performance statistics for a scan.
#[derive(Debug, Clone)]
pub struct ScanStats {
    /// PDF files discovered under the root.
    pub files: usize,

    /// Files whose outcome is known (matched, unmatched or failed). Less than
    /// `files` only when the scan was interrupted.
    pub processed: usize,

    /// Files whose text could not be extracted.
    pub failures: usize,

    /// Active names searched for.
    pub names: usize,

    /// Wall-clock time from validation to report.
    pub duration: Duration,

    /// Processed files per second. Convenience field; equals
    /// `processed / duration.as_secs_f64()`, clamped to 0 on zero-duration
    /// runs.
    pub files_per_sec: usize,
}

impl ScanStats {
    pub(crate) fn compute(
        files: usize,
        processed: usize,
        failures: usize,
        names: usize,
        duration: Duration,
    ) -> Self {
        let fps = if duration.as_secs_f64() > 0.0 {
            (processed as f64 / duration.as_secs_f64()) as usize
        } else {
            0
        };
        Self {
            files,
            processed,
            failures,
            names,
            duration,
            files_per_sec: fps,
        }
    }
}
