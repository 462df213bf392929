use std::{io, path::PathBuf};
use thiserror::Error;

/// Per-item resolution failures. All of these are recoverable at the scope
/// of one service or one input file; the caller logs them and substitutes
/// sentinel or empty values instead of aborting the run.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("image reference {0:?} has more than one `:` separator")]
    MalformedReference(String),

    #[error("remote build context {0:?} is not supported")]
    UnsupportedSource(String),

    #[error("could not read build file {path:?}")]
    IoFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no services defined in {0:?}")]
    NoServicesDefined(PathBuf),

    #[error("input file {0:?} does not exist")]
    MissingInputFile(PathBuf),
}
