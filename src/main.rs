use std::fs::File;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Once;

use anyhow::Context;
use clap::Parser;
use latin1sniff::classify_reader;
use latin1sniff::Verdict;
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Minimum width of the file name column when several files are named.
const LABEL_WIDTH: usize = 10;

/// Tell whether files are ASCII, UTF-8, Latin-1 or something else
#[derive(Parser, Debug)]
#[command(name = "latin1sniff", version, about)]
struct Cli {
    /// Files to classify; standard input when none are given
    files: Vec<PathBuf>,

    /// Print the WHATWG encoding name instead of the short label
    #[arg(short, long)]
    encoding: bool,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

static INIT: Once = Once::new();

fn init_tracing(verbose: bool) {
    INIT.call_once(|| {
        let default_level = if verbose { "debug" } else { "warn" };
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

        let fmt_layer = fmt::layer()
            .with_writer(io::stderr)
            .with_target(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
    });
}

/// Why an input produced no verdict.
enum Failure {
    Open(io::Error),
    Read(io::Error),
}

fn classify_path(path: &Path) -> Result<Verdict, Failure> {
    let file = File::open(path).map_err(Failure::Open)?;
    let verdict = classify_reader(io::BufReader::new(file)).map_err(Failure::Read)?;
    debug!(path = %path.display(), %verdict, "classified");
    Ok(verdict)
}

#[cfg(feature = "multithreading")]
fn classify_all(files: &[PathBuf]) -> Vec<Result<Verdict, Failure>> {
    use rayon::prelude::*;
    files.par_iter().map(|path| classify_path(path)).collect()
}

#[cfg(not(feature = "multithreading"))]
fn classify_all(files: &[PathBuf]) -> Vec<Result<Verdict, Failure>> {
    files.iter().map(|path| classify_path(path)).collect()
}

fn label(verdict: Verdict, encoding: bool) -> &'static str {
    if encoding {
        verdict.encoding().map_or(verdict.as_str(), |e| e.name())
    } else {
        verdict.as_str()
    }
}

fn run(cli: &Cli) -> anyhow::Result<bool> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.files.is_empty() {
        debug!("reading standard input");
        let verdict = classify_reader(io::stdin().lock()).context("reading standard input")?;
        writeln!(out, "{}", label(verdict, cli.encoding))?;
        return Ok(true);
    }

    let print_name = cli.files.len() > 1;
    let mut all_ok = true;
    for (path, result) in cli.files.iter().zip(classify_all(&cli.files)) {
        match result {
            Ok(verdict) => {
                if print_name {
                    let name = path.display().to_string();
                    write!(out, "{:<width$}: ", name, width = LABEL_WIDTH)?;
                }
                writeln!(out, "{}", label(verdict, cli.encoding))?;
            }
            Err(Failure::Open(err)) => {
                // Keep stdout and stderr in argument order.
                out.flush()?;
                eprintln!("{}: Cannot open ({})", path.display(), err);
                all_ok = false;
            }
            Err(Failure::Read(err)) => {
                out.flush()?;
                eprintln!("{}: Cannot read ({})", path.display(), err);
                all_ok = false;
            }
        }
    }
    out.flush().context("writing results")?;
    Ok(all_ok)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("latin1sniff: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
