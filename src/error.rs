//! Error types

use crate::git::ProviderError;
use std::io;
use std::path::PathBuf;

/// Fatal errors that abort a run
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("read stdin: {0}")]
    Stdin(#[source] io::Error),

    #[error("make {} absolute: {source}", path.display())]
    Absolute {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("logger setup: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, Error>;
