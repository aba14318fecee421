use std::io::{self, Write};

use owo_colors::OwoColorize;
use pdfscan::{ExtractError, MatchResult, ScanReport};

const RULE_WIDTH: usize = 70;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Destination for the lines printed while a scan runs.
///
/// The scan observer cannot return errors, so the first failed write is kept
/// here and later lines are skipped.
pub struct LiveOutput<W> {
    w: W,
    error: Option<io::Error>,
}

impl<W: Write> LiveOutput<W> {
    pub fn new(w: W) -> Self {
        Self { w, error: None }
    }

    /// Run one printer. Returns `false` if this or an earlier write failed.
    pub fn emit<F>(&mut self, print: F) -> bool
    where
        F: FnOnce(&mut dyn Write) -> io::Result<()>,
    {
        if self.error.is_some() {
            return false;
        }
        match print(&mut self.w) {
            Ok(()) => true,
            Err(e) => {
                self.error = Some(e);
                false
            }
        }
    }

    /// The writer back, or the first write error.
    pub fn finish(self) -> io::Result<W> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.w),
        }
    }
}

/// Print the line announcing how much work is queued.
pub fn print_banner(
    w: &mut dyn Write,
    files: usize,
    names: usize,
    color: ColorMode,
) -> std::io::Result<()> {
    let msg = format!("Starting scan of {files} PDF file(s) for {names} name(s)...");
    writeln!(w)?;
    if color.enabled() {
        writeln!(w, "{}", msg.bold())?;
    } else {
        writeln!(w, "{msg}")?;
    }
    writeln!(w)
}

/// Print a live match as soon as a worker reports it.
pub fn print_match(w: &mut dyn Write, m: &MatchResult, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {}", "Found in:".cyan().bold(), m.path.display())?;
        for name in &m.names {
            writeln!(w, "   {} {}", "\u{2714}".green(), name)?;
        }
    } else {
        writeln!(w, "Found in: {}", m.path.display())?;
        for name in &m.names {
            writeln!(w, "   \u{2714} {name}")?;
        }
    }
    Ok(())
}

/// Print a per-file extraction failure. The scan carries on.
pub fn print_failure(w: &mut dyn Write, err: &ExtractError, color: ColorMode) -> std::io::Result<()> {
    let msg = format!(
        "Error extracting text from {}: {}",
        err.path().display(),
        err.detail()
    );
    if color.enabled() {
        writeln!(w, "{}", msg.yellow())
    } else {
        writeln!(w, "{msg}")
    }
}

/// Print the message for a directory without any PDF files.
pub fn print_no_files(w: &mut dyn Write, color: ColorMode) -> std::io::Result<()> {
    let msg = "No PDF files found in the specified directory.";
    if color.enabled() {
        writeln!(w, "{}", msg.yellow())
    } else {
        writeln!(w, "{msg}")
    }
}

/// Print the final summary: every matching file with its names, or an
/// explicit "no matches" line.
pub fn print_report(w: &mut dyn Write, report: &ScanReport, color: ColorMode) -> std::io::Result<()> {
    if report.was_interrupted() {
        writeln!(w)?;
        if color.enabled() {
            writeln!(w, "{}", "Process interrupted by user.".yellow())?;
        } else {
            writeln!(w, "Process interrupted by user.")?;
        }
    }

    writeln!(w)?;
    writeln!(w, "{}", "=".repeat(RULE_WIDTH))?;

    if report.is_empty() {
        if color.enabled() {
            writeln!(w, "{}", "No matches found for any of the names.".red())?;
        } else {
            writeln!(w, "No matches found for any of the names.")?;
        }
    } else {
        let heading = format!("Summary Report ({} files with matches):", report.matches.len());
        if color.enabled() {
            writeln!(w, "{}", heading.bold())?;
        } else {
            writeln!(w, "{heading}")?;
        }
        writeln!(w)?;

        for m in &report.matches {
            writeln!(w, "File: {}", m.path.display())?;
            writeln!(w, "   Matching names:")?;
            for name in &m.names {
                writeln!(w, "   - {name}")?;
            }
            writeln!(w)?;
        }
    }

    let stats = &report.stats;
    let line = format!(
        "Scanned {}/{} file(s) in {:.2}s ({} failed to extract)",
        stats.processed,
        stats.files,
        stats.duration.as_secs_f64(),
        stats.failures
    );
    if color.enabled() {
        writeln!(w, "{}", line.dimmed())
    } else {
        writeln!(w, "{line}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfscan::{ScanStats, ScanStatus};
    use std::path::PathBuf;
    use std::time::Duration;

    /// Fails every write, like stdout piped into a reader that has exited.
    #[derive(Debug)]
    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn report(status: ScanStatus, matches: Vec<MatchResult>) -> ScanReport {
        ScanReport {
            status,
            matches,
            stats: ScanStats {
                files: 2,
                processed: 2,
                failures: 0,
                names: 2,
                duration: Duration::from_millis(250),
                files_per_sec: 8,
            },
        }
    }

    fn render(r: &ScanReport) -> String {
        let mut buf = Vec::new();
        print_report(&mut buf, r, ColorMode(false)).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn report_lists_files_and_names() {
        let out = render(&report(
            ScanStatus::Completed,
            vec![MatchResult {
                path: PathBuf::from("a.pdf"),
                names: vec!["Zaid Ahmed".into()],
            }],
        ));
        assert!(out.contains("Summary Report (1 files with matches):"));
        assert!(out.contains("File: a.pdf"));
        assert!(out.contains("   - Zaid Ahmed"));
        assert!(!out.contains("No matches"));
    }

    #[test]
    fn empty_report_says_so() {
        let out = render(&report(ScanStatus::Completed, vec![]));
        assert!(out.contains("No matches found for any of the names."));
        assert!(!out.contains("interrupted"));
    }

    #[test]
    fn interrupted_report_is_flagged() {
        let out = render(&report(ScanStatus::Interrupted, vec![]));
        assert!(out.contains("Process interrupted by user."));
    }

    #[test]
    fn live_match_lines() {
        let mut buf = Vec::new();
        let m = MatchResult {
            path: PathBuf::from("dir/b.pdf"),
            names: vec!["Omar".into(), "Layla".into()],
        };
        print_match(&mut buf, &m, ColorMode(false)).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert_eq!(out, "Found in: dir/b.pdf\n   \u{2714} Omar\n   \u{2714} Layla\n");
    }

    #[test]
    fn live_output_keeps_the_first_write_error() {
        let m = MatchResult {
            path: PathBuf::from("a.pdf"),
            names: vec!["Omar".into()],
        };
        let mut live = LiveOutput::new(ClosedPipe);

        assert!(!live.emit(|w| print_match(w, &m, ColorMode(false))));

        let mut called = false;
        assert!(!live.emit(|w| {
            called = true;
            print_no_files(w, ColorMode(false))
        }));
        assert!(!called, "nothing is printed after a failed write");

        let err = live.finish().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn live_output_passes_lines_through() {
        let mut live = LiveOutput::new(Vec::new());
        assert!(live.emit(|w| print_banner(w, 3, 2, ColorMode(false))));
        let out = String::from_utf8(live.finish().unwrap()).unwrap();
        assert_eq!(out, "\nStarting scan of 3 PDF file(s) for 2 name(s)...\n\n");
    }
}
