use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::RecvTimeoutError;
use tracing::{debug, info, warn};

use crate::engine::{default_threads, spawn_pool, walk_pdfs, CancelFlag, FileOutcome, PoolOptions};
use crate::error::{ExtractError, ScanError};
use crate::extract::PdfExtractor;
use crate::matcher::NameMatcher;
use crate::results::{MatchResult, ScanReport, ScanStats, ScanStatus};
use crate::traits::TextExtractor;

/// How often the coordinator wakes to check for cancellation while waiting.
const CANCEL_POLL: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Progress notifications delivered on the coordinator thread while a scan
/// runs. See [`ScanBuilder::run_with`].
#[derive(Debug)]
pub enum ScanEvent<'a> {
    /// Enumeration finished and workers are about to start.
    Started { files: usize, names: usize },

    /// A document mentions at least one name.
    Matched(&'a MatchResult),

    /// A document could not be read. It counts as having no matches.
    ExtractionFailed { path: &'a Path, error: &'a ExtractError },

    /// One more file is done. Fires exactly once per file, whatever its
    /// outcome.
    Progress { done: usize, total: usize },
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanPhase {
    Idle,
    Validating,
    Enumerating,
    Scanning,
    Reporting,
    Done,
}

impl ScanPhase {
    fn advance(&mut self, next: ScanPhase) {
        debug!(from = ?*self, to = ?next, "scan phase");
        *self = next;
    }
}

// ---------------------------------------------------------------------------
// ScanBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring and executing a scan.
///
/// Created via [`pdfscan::scan()`](crate::scan). Configure with chained
/// builder methods, then call [`run()`](ScanBuilder::run) or
/// [`run_with()`](ScanBuilder::run_with).
///
/// # Example
///
/// ```rust,ignore
/// let report = pdfscan::scan()
///     .root("/srv/archive")
///     .names(["Zaid Ahmed", "Omar"])
///     .threads(8)
///     .run()?;
/// ```
pub struct ScanBuilder {
    root:      Option<PathBuf>,
    names:     Vec<String>,
    extractor: Option<Arc<dyn TextExtractor>>,
    threads:   usize,
    cancel:    CancelFlag,
}

impl Default for ScanBuilder {
    fn default() -> Self {
        Self {
            root:      None,
            names:     Vec::new(),
            extractor: None,
            threads:   default_threads(),
            cancel:    CancelFlag::new(),
        }
    }
}

impl ScanBuilder {
    // ── Input ─────────────────────────────────────────────────────────────

    /// Directory to scan recursively.
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Replace the target names.
    ///
    /// Names are trimmed and blanks dropped when the scan starts; reported
    /// matches use the trimmed form.
    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Add one target name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    // ── Collaborators ─────────────────────────────────────────────────────

    /// Use a custom text extractor instead of [`PdfExtractor`].
    pub fn extractor(mut self, e: impl TextExtractor + 'static) -> Self {
        self.extractor = Some(Arc::new(e));
        self
    }

    /// Share a cancellation flag with the caller, e.g. a Ctrl+C handler.
    pub fn cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = flag;
        self
    }

    // ── Options ───────────────────────────────────────────────────────────

    /// Number of worker threads.
    ///
    /// Defaults to the number of logical CPU cores. Never more workers than
    /// files are started.
    pub fn threads(mut self, n: usize) -> Self {
        self.threads = n;
        self
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Execute the scan and return its report.
    pub fn run(self) -> Result<ScanReport, ScanError> {
        self.run_with(|_| {})
    }

    /// Execute the scan, calling `observer` for each [`ScanEvent`].
    ///
    /// Blocks until every file is processed or the cancel flag is raised.
    /// `observer` runs on the calling thread, one event at a time.
    ///
    /// # Errors
    ///
    /// [`ScanError::NoActiveNames`] if every name is blank (checked first;
    /// nothing is enumerated or extracted), [`ScanError::MissingRoot`] if no
    /// root was set, [`ScanError::InvalidDirectory`] for a root that is not a
    /// directory, [`ScanError::InvalidThreadCount`] for zero
    /// threads. A directory without PDFs is not an error: the report has
    /// [`ScanStatus::NoFilesFound`]. Per-file extraction failures never
    /// surface here.
    pub fn run_with<F>(self, mut observer: F) -> Result<ScanReport, ScanError>
    where
        F: FnMut(ScanEvent<'_>),
    {
        let start = Instant::now();
        let mut phase = ScanPhase::Idle;

        // ── Validate ──────────────────────────────────────────────────────
        phase.advance(ScanPhase::Validating);

        let active = active_names(&self.names);
        if active.is_empty() {
            phase.advance(ScanPhase::Done);
            return Err(ScanError::NoActiveNames);
        }

        let root = match self.root {
            Some(root) if root.is_dir() => root,
            Some(root) => {
                phase.advance(ScanPhase::Done);
                return Err(ScanError::InvalidDirectory(root));
            }
            None => {
                phase.advance(ScanPhase::Done);
                return Err(ScanError::MissingRoot);
            }
        };

        if self.threads == 0 {
            phase.advance(ScanPhase::Done);
            return Err(ScanError::InvalidThreadCount(0));
        }

        let matcher = Arc::new(NameMatcher::new(&active)?);

        // ── Enumerate ─────────────────────────────────────────────────────
        phase.advance(ScanPhase::Enumerating);

        let files = walk_pdfs(&root, self.threads)?;
        let total = files.len();
        if total == 0 {
            info!(root = %root.display(), "no PDF files found");
            phase.advance(ScanPhase::Done);
            return Ok(ScanReport::no_files(matcher.len(), start.elapsed()));
        }

        // ── Scan ──────────────────────────────────────────────────────────
        phase.advance(ScanPhase::Scanning);
        info!(files = total, names = matcher.len(), threads = self.threads, "starting scan");
        observer(ScanEvent::Started {
            files: total,
            names: matcher.len(),
        });

        let extractor: Arc<dyn TextExtractor> = match self.extractor {
            Some(e) => e,
            None => Arc::new(PdfExtractor::new()),
        };

        let completions = spawn_pool(
            files,
            PoolOptions {
                threads: self.threads,
                extractor,
                matcher: Arc::clone(&matcher),
                cancel: self.cancel.clone(),
            },
        )?;

        let mut agg = Aggregator::new(total);

        loop {
            match completions.recv_timeout(CANCEL_POLL) {
                Ok(outcome) => agg.absorb(outcome, &mut observer),
                Err(RecvTimeoutError::Timeout) => {
                    if self.cancel.is_cancelled() {
                        // Keep what is already queued; do not wait on
                        // files still inside the parser.
                        for outcome in completions.try_iter() {
                            agg.absorb(outcome, &mut observer);
                        }
                        break;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        // ── Report ────────────────────────────────────────────────────────
        phase.advance(ScanPhase::Reporting);

        let status = if agg.done < total && self.cancel.is_cancelled() {
            warn!(done = agg.done, total, "scan interrupted");
            ScanStatus::Interrupted
        } else {
            ScanStatus::Completed
        };

        let report = ScanReport {
            status,
            stats: ScanStats::compute(total, agg.done, agg.failures, matcher.len(), start.elapsed()),
            matches: agg.matches,
        };

        phase.advance(ScanPhase::Done);
        Ok(report)
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Single-writer sink for worker completions.
struct Aggregator {
    total:    usize,
    done:     usize,
    failures: usize,
    matches:  Vec<MatchResult>,
}

impl Aggregator {
    fn new(total: usize) -> Self {
        Self {
            total,
            done: 0,
            failures: 0,
            matches: Vec::new(),
        }
    }

    fn absorb<F>(&mut self, outcome: FileOutcome, observer: &mut F)
    where
        F: FnMut(ScanEvent<'_>),
    {
        match outcome.result {
            Err(err) => {
                warn!(path = %err.path().display(), cause = err.detail(), "text extraction failed");
                self.failures += 1;
                observer(ScanEvent::ExtractionFailed {
                    path: &outcome.path,
                    error: &err,
                });
            }
            Ok(names) if names.is_empty() => {}
            Ok(names) => {
                let result = MatchResult {
                    path: outcome.path,
                    names,
                };
                info!(path = %result.path.display(), names = ?result.names, "match");
                observer(ScanEvent::Matched(&result));
                self.matches.push(result);
            }
        }

        self.done += 1;
        observer(ScanEvent::Progress {
            done: self.done,
            total: self.total,
        });
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Trim every configured name and drop the blanks.
pub fn active_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    names
        .iter()
        .map(|n| n.as_ref().trim())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect()
}
