//! Metadata aggregation over resolved directories

use crate::config::Config;
use crate::git::{CleanStatus, MetadataProvider, Probe, ProviderError, probe};
use std::path::PathBuf;
use tracing::{debug, error};

/// One output line's worth of data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub dir: PathBuf,
    pub has_metadata: bool,
    /// Meaningful only if `has_metadata`
    pub commit_count: u64,
    pub status: CleanStatus,
}

impl Record {
    fn bare(dir: PathBuf) -> Self {
        Self {
            dir,
            has_metadata: false,
            commit_count: 0,
            status: CleanStatus::Unknown,
        }
    }
}

/// Build one record per directory, in input order, then apply the commit cap.
///
/// With counting enabled, directories the provider does not recognize (or
/// that have no history) are logged and dropped.
///
/// # Errors
/// Fails on the first provider error that is not a per-directory skip.
pub fn aggregate<M: MetadataProvider>(
    dirs: Vec<PathBuf>,
    config: &Config,
    provider: &M,
) -> Result<Vec<Record>, ProviderError> {
    let mut records = Vec::with_capacity(dirs.len());

    for dir in dirs {
        if !config.count_commits {
            records.push(Record::bare(dir));
            continue;
        }

        debug!(dir = %dir.display(), "counting commits");
        match probe(provider, &dir)? {
            Probe::Found(meta) => {
                debug!(dir = %dir.display(), count = meta.commit_count, status = %meta.status, "counted commits");
                records.push(Record {
                    dir,
                    has_metadata: true,
                    commit_count: meta.commit_count,
                    status: meta.status,
                });
            }
            Probe::NotARepository => error!(dir = %dir.display(), "not a repository"),
            Probe::NoHistory => error!(dir = %dir.display(), "no log found"),
        }
    }

    Ok(apply_cap(records, config.commit_count_max))
}

/// Drop records with more commits than `max`. Records without metadata always pass.
#[must_use]
pub fn apply_cap(records: Vec<Record>, max: Option<u64>) -> Vec<Record> {
    let Some(max) = max else {
        return records;
    };

    records
        .into_iter()
        .filter(|r| !r.has_metadata || r.commit_count <= max)
        .collect()
}
