//! Git repository metadata: commit count and working tree status

use git2::{ErrorCode, Repository, StatusOptions, SubmoduleIgnore, SubmoduleStatus};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Working tree state relative to HEAD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanStatus {
    Clean,
    Dirty,
    /// Metadata not collected
    Unknown,
}

impl CleanStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Dirty => "dirty",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CleanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata collected for one working copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepoMetadata {
    pub commit_count: u64,
    pub status: CleanStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("not a repository: {}", dir.display())]
    NotARepository { dir: PathBuf },

    #[error("no log available: {}", dir.display())]
    LogUnavailable { dir: PathBuf },

    #[error("status unavailable for {}: {source}", dir.display())]
    StatusUnavailable {
        dir: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("git error in {}: {source}", dir.display())]
    Git {
        dir: PathBuf,
        #[source]
        source: git2::Error,
    },
}

/// Source of version-control metadata for a resolved directory
pub trait MetadataProvider {
    /// Open working copy, dropped once the directory has been probed
    type Handle;

    /// # Errors
    /// [`ProviderError::NotARepository`] if `dir` is not a working copy root.
    fn open_working_copy(&self, dir: &Path) -> Result<Self::Handle, ProviderError>;

    /// Number of commits reachable from HEAD.
    ///
    /// # Errors
    /// [`ProviderError::LogUnavailable`] when there is no history to walk.
    fn revision_count(&self, handle: &Self::Handle) -> Result<u64, ProviderError>;

    /// Clean iff no tracked file is added, modified, deleted or staged. Untracked files are ignored.
    ///
    /// # Errors
    /// [`ProviderError::StatusUnavailable`] if status cannot be computed.
    fn working_tree_status(&self, handle: &Self::Handle) -> Result<CleanStatus, ProviderError>;
}

/// Outcome of probing one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    Found(RepoMetadata),
    /// Marker present but the provider does not recognize a working copy
    NotARepository,
    /// Working copy without any reachable history (unborn HEAD)
    NoHistory,
}

/// Collect metadata for `dir`, sorting provider errors into skips and fatal errors.
///
/// # Errors
/// Any provider error other than "not a repository" or "no log".
pub fn probe<M: MetadataProvider>(provider: &M, dir: &Path) -> Result<Probe, ProviderError> {
    let handle = match provider.open_working_copy(dir) {
        Ok(handle) => handle,
        Err(ProviderError::NotARepository { .. }) => return Ok(Probe::NotARepository),
        Err(e) => return Err(e),
    };

    let commit_count = match provider.revision_count(&handle) {
        Ok(count) => count,
        Err(ProviderError::LogUnavailable { .. }) => return Ok(Probe::NoHistory),
        Err(e) => return Err(e),
    };

    let status = provider.working_tree_status(&handle)?;

    Ok(Probe::Found(RepoMetadata {
        commit_count,
        status,
    }))
}

/// libgit2-backed provider
#[derive(Debug, Default, Clone, Copy)]
pub struct GitProvider;

/// Open repository together with the directory it was opened from
pub struct GitHandle {
    repo: Repository,
    dir: PathBuf,
}

impl MetadataProvider for GitProvider {
    type Handle = GitHandle;

    fn open_working_copy(&self, dir: &Path) -> Result<GitHandle, ProviderError> {
        match Repository::open(dir) {
            Ok(repo) => Ok(GitHandle {
                repo,
                dir: dir.to_path_buf(),
            }),
            Err(e) if e.code() == ErrorCode::NotFound => {
                debug!(dir = %dir.display(), error = %e, "not a git repository");
                Err(ProviderError::NotARepository {
                    dir: dir.to_path_buf(),
                })
            }
            Err(source) => Err(ProviderError::Git {
                dir: dir.to_path_buf(),
                source,
            }),
        }
    }

    fn revision_count(&self, handle: &GitHandle) -> Result<u64, ProviderError> {
        let git_err = |source| ProviderError::Git {
            dir: handle.dir.clone(),
            source,
        };
        let no_log = || {
            debug!(dir = %handle.dir.display(), "failed to query git log");
            ProviderError::LogUnavailable {
                dir: handle.dir.clone(),
            }
        };

        // Unborn branch or missing HEAD: nothing to count
        let head = match handle.repo.head() {
            Ok(head) => head,
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Err(no_log());
            }
            Err(e) => return Err(git_err(e)),
        };
        let Some(oid) = head.target() else {
            return Err(no_log());
        };

        let mut revwalk = handle.repo.revwalk().map_err(git_err)?;
        revwalk.push(oid).map_err(git_err)?;

        let mut count = 0;
        for oid in revwalk {
            oid.map_err(git_err)?;
            count += 1;
        }
        Ok(count)
    }

    fn working_tree_status(&self, handle: &GitHandle) -> Result<CleanStatus, ProviderError> {
        let status_err = |source| ProviderError::StatusUnavailable {
            dir: handle.dir.clone(),
            source,
        };

        let mut opts = StatusOptions::new();
        opts.include_untracked(false).include_ignored(false);

        let statuses = handle.repo.statuses(Some(&mut opts)).map_err(status_err)?;

        for entry in statuses.iter() {
            let Some(path) = entry.path() else {
                return Ok(CleanStatus::Dirty);
            };
            // Submodules report untracked content as modified; ask again ignoring it
            if handle.repo.find_submodule(path).is_ok() {
                let sub = handle
                    .repo
                    .submodule_status(path, SubmoduleIgnore::Untracked)
                    .map_err(status_err)?;
                if !sub.intersects(SUBMODULE_DIRTY) {
                    continue;
                }
            }
            return Ok(CleanStatus::Dirty);
        }

        Ok(CleanStatus::Clean)
    }
}

/// Submodule states that count as a change to tracked content
const SUBMODULE_DIRTY: SubmoduleStatus = SubmoduleStatus::INDEX_ADDED
    .union(SubmoduleStatus::INDEX_DELETED)
    .union(SubmoduleStatus::INDEX_MODIFIED)
    .union(SubmoduleStatus::WD_ADDED)
    .union(SubmoduleStatus::WD_DELETED)
    .union(SubmoduleStatus::WD_MODIFIED)
    .union(SubmoduleStatus::WD_INDEX_MODIFIED)
    .union(SubmoduleStatus::WD_WD_MODIFIED);
