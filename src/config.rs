//! Run configuration, built once from the CLI and passed down by reference

use clap::ValueEnum;

/// Default marker that terminates the upward search
pub const DEFAULT_SENTINEL: &str = ".git";

/// `--commit-count-max` value meaning "no cap"
pub const NO_CAP: i64 = -1;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Immutable settings for one invocation
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the marker entry looked up in each ancestor
    pub sentinel: String,
    /// Collect commit count and working tree status per directory
    pub count_commits: bool,
    /// Drop directories with more commits than this
    pub commit_count_max: Option<u64>,
    /// Number of `-v` flags
    pub verbosity: u8,
    pub log_format: LogFormat,
}

impl Config {
    /// Build config from raw CLI values. A cap other than [`NO_CAP`] implies counting.
    #[must_use]
    pub fn new(
        sentinel: Option<String>,
        count_commits: bool,
        commit_count_max: i64,
        verbosity: u8,
        log_format: LogFormat,
    ) -> Self {
        let commit_count_max = u64::try_from(commit_count_max).ok();
        Self {
            sentinel: sentinel.unwrap_or_else(|| DEFAULT_SENTINEL.to_string()),
            count_commits: count_commits || commit_count_max.is_some(),
            commit_count_max,
            verbosity,
            log_format,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None, false, NO_CAP, 0, LogFormat::Text)
    }
}
