//! Conversion run error types

use std::path::PathBuf;

use keyvert_keystore::KeystoreError;
use thiserror::Error;

/// Fatal errors that abort the run before any pair is processed
#[derive(Debug, Error)]
pub enum RunError {
    /// Source directory is missing or unreadable
    #[error("invalid source directory {path}: {source}")]
    InvalidSourceDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Password directory is missing or unreadable
    #[error("invalid password directory {path}: {source}")]
    InvalidPasswordDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Destination could not be created or is not writable
    #[error("invalid destination directory {path}: {source}")]
    InvalidDestinationDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The output KDF settings would fail for every pair
    #[error("invalid output KDF parameters: {0}")]
    InvalidOutputParams(#[from] KeystoreError),
}

/// Per-pair failures; one pair failing does not stop the others
#[derive(Debug, Error)]
pub enum PairError {
    #[error("missing keystore file {0}")]
    MissingKeystoreFile(PathBuf),

    #[error("missing password file {0}")]
    MissingPasswordFile(PathBuf),

    #[error("read failed for {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("write failed for {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Keystore(#[from] KeystoreError),
}
