use std::io;
use thiserror::Error;

/// Error kinds surfaced by the hashing pipeline and file-storage model.
///
/// These map directly onto the policy table of the hashing design: bad
/// configuration is rejected before any thread starts, I/O failures during
/// reading/hashing propagate up through `wait()`, and calling the driver API
/// out of order (e.g. `wait()` twice) is a programmer error, not a data error.
#[derive(Debug, Error)]
pub enum TorrentError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("invalid state: {0}")]
    InvalidState(String),
}

pub type Result<T> = std::result::Result<T, TorrentError>;
