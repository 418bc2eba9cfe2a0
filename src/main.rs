//! herfish - find the repositories owning a list of paths read from stdin

mod aggregate;
mod config;
mod detect;
mod error;
mod git;
mod logging;
mod output;

use clap::Parser;
use config::{Config, LogFormat, NO_CAP};
use error::{Error, Result};
use git::GitProvider;
use std::io::{self, BufRead, IsTerminal, Write};
use std::process::ExitCode;
use tracing::{debug, error};

#[derive(Parser)]
#[command(name = "herfish")]
#[command(about = "Print the repository root of every path read from stdin")]
struct Cli {
    /// Sentinel entry that marks a repository root (default: ".git")
    #[arg(short, long)]
    sentinel: Option<String>,

    /// Show commit count and clean/dirty status for each repository
    #[arg(short, long)]
    count_commits: bool,

    /// Only keep repositories with at most this many commits (-1 = no limit)
    #[arg(
        short = 'm',
        long,
        default_value_t = NO_CAP,
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i64).range(NO_CAP..)
    )]
    commit_count_max: i64,

    /// Increase log verbosity, repeatable
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::new(
        cli.sentinel,
        cli.count_commits,
        cli.commit_count_max,
        cli.verbose,
        cli.log_format,
    );

    if let Err(e) = logging::init(&config) {
        eprintln!("herfish: {e}");
        return ExitCode::FAILURE;
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "run failed");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<()> {
    if io::stdin().is_terminal() {
        eprintln!("Waiting for stdin...");
    }
    run_with(config, io::stdin().lock(), &mut io::stdout().lock())
}

/// Read paths, sort them, resolve, aggregate and render to `out`
fn run_with<R: BufRead, W: Write>(config: &Config, input: R, out: &mut W) -> Result<()> {
    let mut paths = read_paths(input)?;
    paths.sort();
    debug!(?paths, "paths");

    let dirs = detect::resolve(&paths, &config.sentinel)?;
    let records = aggregate::aggregate(dirs, config, &GitProvider)?;

    output::render(&records, out);
    Ok(())
}

/// One path per line, blank lines skipped
fn read_paths<R: BufRead>(input: R) -> Result<Vec<String>> {
    let mut paths = Vec::new();
    for line in input.lines() {
        let line = line.map_err(Error::Stdin)?;
        if !line.trim().is_empty() {
            paths.push(line);
        }
    }
    Ok(paths)
}
