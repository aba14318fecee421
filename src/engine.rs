use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use ignore::{DirEntry, WalkBuilder, WalkState};
use tracing::{debug, trace, warn};

use crate::error::{ExtractError, ScanError};
use crate::matcher::NameMatcher;
use crate::normalize::normalize;
use crate::traits::TextExtractor;

/// Name prefix of worker threads. A panic hook can use it to tell contained
/// extractor panics apart from real crashes.
pub const WORKER_THREAD_PREFIX: &str = "pdfscan-worker-";

/// Whether a thread with this name is a pool worker.
pub fn is_worker_thread(name: Option<&str>) -> bool {
    name.map(|n| n.starts_with(WORKER_THREAD_PREFIX))
        .unwrap_or(false)
}

/// Get the logical CPU count, with a safe fallback.
pub(crate) fn default_threads() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

// ---------------------------------------------------------------------------
// CancelFlag
// ---------------------------------------------------------------------------

/// Cooperative cancellation shared between the caller, the coordinator and
/// the workers.
///
/// Raising it stops workers from taking new files; the coordinator then
/// returns whatever has completed. Cloning shares the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// enumerate_pdfs()
// ---------------------------------------------------------------------------

/// Recursively collect every file under `root` whose extension is `pdf`,
/// ignoring case.
///
/// Hidden files and ignore files are not honoured: every entry is visited.
/// Directory symlinks are not descended; symlinked files are kept. Unreadable
/// subdirectories are logged and skipped. The result is sorted.
///
/// Walks on one thread per logical CPU; see [`walk_pdfs`] to choose.
///
/// # Errors
///
/// [`ScanError::InvalidDirectory`] if `root` is missing or not a directory.
pub fn enumerate_pdfs(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    walk_pdfs(root, default_threads())
}

/// [`enumerate_pdfs`] with an explicit walker thread count.
pub fn walk_pdfs(root: &Path, threads: usize) -> Result<Vec<PathBuf>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::InvalidDirectory(root.to_path_buf()));
    }
    if threads == 0 {
        return Err(ScanError::InvalidThreadCount(0));
    }

    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .ignore(false)
        .parents(false)
        .hidden(false)
        .follow_links(false)
        .same_file_system(false)
        .threads(threads);

    let walker = builder.build_parallel();

    let found = Arc::new(Mutex::new(Vec::<PathBuf>::new()));

    walker.run(|| {
        let found = Arc::clone(&found);

        Box::new(move |res: Result<DirEntry, ignore::Error>| -> WalkState {
            let entry = match res {
                Ok(e) => e,
                Err(e) => {
                    let err = map_ignore_error(e);
                    warn!(path = ?err.path(), error = %err, "skipping unreadable entry");
                    return WalkState::Continue;
                }
            };

            let ft = match entry.file_type() {
                Some(ft) => ft,
                None => return WalkState::Continue,
            };

            if ft.is_dir() || !has_pdf_extension(entry.path()) {
                return WalkState::Continue;
            }

            if ft.is_file() || entry.path().is_file() {
                if let Ok(mut f) = found.lock() {
                    f.push(entry.into_path());
                }
            }

            WalkState::Continue
        })
    });

    let mut files = Arc::try_unwrap(found)
        .unwrap_or_default()
        .into_inner()
        .unwrap_or_default();
    files.sort();

    debug!(root = %root.display(), count = files.len(), "enumerated PDF files");
    Ok(files)
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

fn map_ignore_error(e: ignore::Error) -> ScanError {
    match e {
        ignore::Error::WithPath { path, err } => match *err {
            ignore::Error::Io(io_err) => ScanError::Io { path, source: io_err },
            other => ScanError::Io {
                path,
                source: std::io::Error::other(other.to_string()),
            },
        },
        ignore::Error::WithDepth { err, .. } => map_ignore_error(*err),
        ignore::Error::Loop { child, .. } => ScanError::Io {
            path: child,
            source: std::io::Error::other("symlink loop"),
        },
        ignore::Error::Io(io_err) => ScanError::Io {
            path: PathBuf::new(),
            source: io_err,
        },
        other => ScanError::Io {
            path: PathBuf::new(),
            source: std::io::Error::other(other.to_string()),
        },
    }
}

// ---------------------------------------------------------------------------
// Worker pool
// ---------------------------------------------------------------------------

/// What happened to one file. Sent from a worker to the coordinator.
pub(crate) struct FileOutcome {
    pub path: PathBuf,
    /// Names found (possibly none), or why the text could not be read.
    pub result: Result<Vec<String>, ExtractError>,
}

/// Internal options passed from the builder to the pool.
pub(crate) struct PoolOptions {
    pub threads: usize,
    pub extractor: Arc<dyn TextExtractor>,
    pub matcher: Arc<NameMatcher>,
    pub cancel: CancelFlag,
}

/// Queue `files` and start `opts.threads` workers on them.
///
/// Returns the completion channel; it disconnects once every worker has
/// exited, which happens when the queue is drained or the flag is raised.
/// Workers are detached, so an interrupted caller never waits on a file that
/// is stuck inside the PDF parser.
pub(crate) fn spawn_pool(
    files: Vec<PathBuf>,
    opts: PoolOptions,
) -> Result<Receiver<FileOutcome>, ScanError> {
    let workers = opts.threads.min(files.len()).max(1);

    let (job_tx, job_rx) = crossbeam_channel::unbounded::<PathBuf>();
    for path in files {
        job_tx
            .send(path)
            .map_err(|e| ScanError::ThreadPool(format!("job queue closed: {e}")))?;
    }
    drop(job_tx);

    let (done_tx, done_rx) = crossbeam_channel::unbounded::<FileOutcome>();

    for id in 0..workers {
        let jobs = job_rx.clone();
        let done = done_tx.clone();
        let extractor = Arc::clone(&opts.extractor);
        let matcher = Arc::clone(&opts.matcher);
        let cancel = opts.cancel.clone();

        thread::Builder::new()
            .name(format!("{WORKER_THREAD_PREFIX}{id}"))
            .spawn(move || worker_loop(jobs, done, extractor.as_ref(), &matcher, &cancel))
            .map_err(|e| ScanError::ThreadPool(e.to_string()))?;
    }

    debug!(workers, "worker pool started");
    Ok(done_rx)
}

fn worker_loop(
    jobs: Receiver<PathBuf>,
    done: Sender<FileOutcome>,
    extractor: &dyn TextExtractor,
    matcher: &NameMatcher,
    cancel: &CancelFlag,
) {
    for path in jobs.iter() {
        if cancel.is_cancelled() {
            break;
        }
        let result = process_file(&path, extractor, matcher);
        // Receiver gone means the coordinator stopped listening.
        if done.send(FileOutcome { path, result }).is_err() {
            break;
        }
    }
}

/// Extract, normalize and match a single document.
pub(crate) fn process_file(
    path: &Path,
    extractor: &dyn TextExtractor,
    matcher: &NameMatcher,
) -> Result<Vec<String>, ExtractError> {
    let text = panic::catch_unwind(AssertUnwindSafe(|| extractor.extract_text(path)))
        .unwrap_or_else(|payload| {
            Err(ExtractError::Panicked {
                path: path.to_path_buf(),
                detail: panic_message(payload.as_ref()),
            })
        })?;

    let text = normalize(&text);
    trace!(path = %path.display(), chars = text.len(), "extracted");
    Ok(matcher.find(&text))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"%PDF-1.4").unwrap();
    }

    #[test]
    fn finds_pdfs_recursively_any_case() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("a.pdf"));
        touch(&root.join("B.PDF"));
        touch(&root.join("nested/deeper/c.Pdf"));
        touch(&root.join(".hidden/d.pdf"));
        touch(&root.join("notes.txt"));
        touch(&root.join("pdf"));
        touch(&root.join("archive.pdf.zip"));
        fs::create_dir_all(root.join("folder.pdf")).unwrap();

        let files = enumerate_pdfs(root).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(names, vec![".hidden/d.pdf", "B.PDF", "a.pdf", "nested/deeper/c.Pdf"]);
    }

    #[test]
    fn rejects_missing_or_non_directory_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("x.pdf");
        touch(&file);

        assert!(matches!(
            enumerate_pdfs(&dir.path().join("missing")),
            Err(ScanError::InvalidDirectory(_))
        ));
        assert!(matches!(enumerate_pdfs(&file), Err(ScanError::InvalidDirectory(_))));
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(enumerate_pdfs(dir.path()).unwrap().is_empty());
    }

    struct Panicky;

    impl TextExtractor for Panicky {
        fn extract_text(&self, _path: &Path) -> Result<String, ExtractError> {
            panic!("parser exploded")
        }
    }

    #[test]
    fn extractor_panic_becomes_an_error() {
        let matcher = NameMatcher::new(&["Omar"]).unwrap();
        let err = process_file(Path::new("x.pdf"), &Panicky, &matcher).unwrap_err();
        match err {
            ExtractError::Panicked { detail, .. } => assert_eq!(detail, "parser exploded"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn walker_thread_count_does_not_change_the_result() {
        let dir = tempfile::tempdir().unwrap();
        for rel in ["a.pdf", "x/b.PDF", "x/y/c.pdf", "x/y/z/d.Pdf", "x/e.txt"] {
            touch(&dir.path().join(rel));
        }

        let single = walk_pdfs(dir.path(), 1).unwrap();
        assert_eq!(single.len(), 4);
        assert_eq!(walk_pdfs(dir.path(), 8).unwrap(), single);
        assert!(matches!(
            walk_pdfs(dir.path(), 0),
            Err(ScanError::InvalidThreadCount(0))
        ));
    }

    #[test]
    fn malformed_pdf_is_reported_once_as_a_file_error() {
        use crate::extract::PdfExtractor;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"%PDF-1.7 this is not a pdf at all").unwrap();

        let matcher = NameMatcher::new(&["Omar"]).unwrap();
        let err = process_file(&path, &PdfExtractor::new(), &matcher).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::Extraction { .. } | ExtractError::Panicked { .. }
        ));
        assert_eq!(err.path(), path);
    }

    #[test]
    fn worker_threads_are_recognisable_by_name() {
        assert!(is_worker_thread(Some("pdfscan-worker-3")));
        assert!(!is_worker_thread(Some("main")));
        assert!(!is_worker_thread(None));
    }

    #[test]
    fn panic_payloads_are_readable() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }

    #[test]
    fn cancel_flag_is_shared_between_clones() {
        let flag = CancelFlag::new();
        let other = flag.clone();
        assert!(!other.is_cancelled());
        flag.cancel();
        assert!(other.is_cancelled());
    }
}
