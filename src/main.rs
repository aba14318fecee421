use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use pdfscan::{is_worker_thread, CancelFlag, ScanError, ScanEvent, ScanStatus};

mod output;

use output::{ColorMode, LiveOutput};

/// Names searched for when none are given with `--name` or `--names-file`.
const DEFAULT_NAMES: &[&str] = &["name1", "name2"];

/// Search PDF files for predefined names and show matches
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Target directory path
    directory: PathBuf,

    /// Name to search for (repeatable); replaces the built-in list
    #[arg(short = 'n', long = "name", value_name = "NAME")]
    names: Vec<String>,

    /// File with one name per line; added to any --name values
    #[arg(long, value_name = "PATH")]
    names_file: Option<PathBuf>,

    /// Worker threads (default: number of logical CPUs)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Increase log verbosity (-v warn, -vv info, -vvv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    install_panic_hook();

    let color = ColorMode(!cli.no_color);
    let names = resolve_names(&cli.names, cli.names_file.as_deref())?;

    let cancel = CancelFlag::new();
    let stop = cancel.clone();
    let flag = cancel.clone();
    ctrlc::set_handler(move || {
        // Second Ctrl+C: stop waiting for the partial report.
        if flag.is_cancelled() {
            std::process::exit(130);
        }
        flag.cancel();
    })
    .context("failed to install Ctrl+C handler")?;

    let mut builder = pdfscan::scan()
        .root(&cli.directory)
        .names(names)
        .cancel_flag(cancel);
    if let Some(n) = cli.threads {
        builder = builder.threads(n);
    }

    let bar = if cli.no_progress {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(0)
    };
    bar.set_style(
        ProgressStyle::with_template(
            "Processing {percent:>3}% [{bar:40.cyan/dim}] {pos}/{len} | Elapsed: {elapsed_precise} | Remaining: {eta_precise}",
        )
        .context("invalid progress template")?
        .progress_chars("=> "),
    );

    let mut live = LiveOutput::new(std::io::stdout());
    let result = builder.run_with(|event| {
        let written = match event {
            ScanEvent::Started { files, names } => {
                bar.set_length(files as u64);
                bar.suspend(|| live.emit(|w| output::print_banner(w, files, names, color)))
            }
            ScanEvent::Matched(m) => {
                bar.suspend(|| live.emit(|w| output::print_match(w, m, color)))
            }
            ScanEvent::ExtractionFailed { error, .. } => {
                bar.suspend(|| live.emit(|w| output::print_failure(w, error, color)))
            }
            ScanEvent::Progress { done, .. } => {
                bar.set_position(done as u64);
                true
            }
        };
        // Nobody is reading stdout any more.
        if !written {
            stop.cancel();
        }
    });
    bar.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(ScanError::NoActiveNames) => {
            anyhow::bail!("no active names found; pass --name or --names-file, or fill in DEFAULT_NAMES")
        }
        Err(e) => return Err(e.into()),
    };
    live.finish().context("failed to write to stdout")?;

    let mut stdout = std::io::stdout().lock();
    if report.status == ScanStatus::NoFilesFound {
        output::print_no_files(&mut stdout, color)?;
    }
    output::print_report(&mut stdout, &report, color)?;
    stdout.flush()?;

    Ok(())
}

/// `--name` values plus the lines of `--names-file`; the built-in list when
/// neither is given.
fn resolve_names(cli_names: &[String], names_file: Option<&Path>) -> anyhow::Result<Vec<String>> {
    let mut names = cli_names.to_vec();

    if let Some(path) = names_file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read names file {}", path.display()))?;
        names.extend(content.lines().map(str::to_string));
    }

    if names.is_empty() && names_file.is_none() {
        names = DEFAULT_NAMES.iter().map(|s| s.to_string()).collect();
    }
    Ok(names)
}

/// Worker panics are caught and reported as failed files; keep the default
/// hook from printing them over the progress bar.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if is_worker_thread(std::thread::current().name()) {
            tracing::debug!(%info, "contained worker panic");
        } else {
            default_hook(info);
        }
    }));
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "pdfscan=error",
        1 => "pdfscan=warn",
        2 => "pdfscan=info",
        _ => "pdfscan=debug",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_requires_exactly_one_directory() {
        assert!(Cli::try_parse_from(["pdfscan"]).is_err());
        assert!(Cli::try_parse_from(["pdfscan", "a", "b"]).is_err());

        let cli = Cli::try_parse_from(["pdfscan", "docs", "-n", "Omar", "--name", "Layla", "-vv"])
            .unwrap();
        assert_eq!(cli.directory, PathBuf::from("docs"));
        assert_eq!(cli.names, vec!["Omar", "Layla"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn falls_back_to_default_names() {
        assert_eq!(resolve_names(&[], None).unwrap(), DEFAULT_NAMES);
        assert_eq!(resolve_names(&["Omar".into()], None).unwrap(), vec!["Omar"]);
    }

    #[test]
    fn names_file_lines_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.txt");
        std::fs::write(&path, "Zaid Ahmed\n\n  Layla \n").unwrap();

        let names = resolve_names(&["Omar".into()], Some(&path)).unwrap();
        assert_eq!(names, vec!["Omar", "Zaid Ahmed", "", "  Layla "]);
    }

    #[test]
    fn worker_panics_are_still_caught_under_the_quiet_hook() {
        install_panic_hook();

        let worker = std::thread::Builder::new()
            .name(format!("{}0", pdfscan::WORKER_THREAD_PREFIX))
            .spawn(|| std::panic::catch_unwind(|| panic!("bad xref")).is_err())
            .unwrap();
        assert!(worker.join().unwrap());

        let other = std::thread::spawn(|| panic!("not a worker"));
        assert!(other.join().is_err());
    }

    #[test]
    fn missing_names_file_is_an_error() {
        assert!(resolve_names(&[], Some(Path::new("/no/such/names.txt"))).is_err());
    }
}
