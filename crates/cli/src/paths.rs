//! Run-level path validation
//!
//! The source and password directories must exist and be readable before any
//! pair is processed. The destination is created with parents, then probed
//! for writability by creating and removing a uniquely named file.

use std::fs;
use std::path::Path;

use uuid::Uuid;

use crate::error::RunError;

pub fn check_source_dir(path: &Path) -> Result<(), RunError> {
    check_readable_dir(path).map_err(|source| RunError::InvalidSourceDirectory {
        path: path.to_path_buf(),
        source,
    })
}

pub fn check_password_dir(path: &Path) -> Result<(), RunError> {
    check_readable_dir(path).map_err(|source| RunError::InvalidPasswordDirectory {
        path: path.to_path_buf(),
        source,
    })
}

/// Create the destination directory (with parents) and verify it is writable.
pub fn prepare_dest_dir(path: &Path) -> Result<(), RunError> {
    probe_writable(path).map_err(|source| RunError::InvalidDestinationDirectory {
        path: path.to_path_buf(),
        source,
    })
}

/// `read_dir` covers existence, directory-ness, and read permission at once.
fn check_readable_dir(path: &Path) -> std::io::Result<()> {
    fs::read_dir(path).map(|_| ())
}

fn probe_writable(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path)?;

    let probe = path.join(format!(".keyvert-probe-{}", Uuid::new_v4()));
    fs::write(&probe, b"")?;
    fs::remove_file(&probe)
}
