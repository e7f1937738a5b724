//! Batch conversion run
//!
//! Validates the run-level directories, discovers pairs under the selected
//! naming mode, and pushes each pair through the conversion pipeline. Each
//! pair is a transaction: on failure nothing is written for it, the error is
//! reported with the pair's identifier, and the remaining pairs still run.

use std::fs;
use std::path::PathBuf;

use keyvert_keystore::{convert_keystore, RecryptOptions};
use tracing::{error, info, warn};
use zeroize::Zeroizing;

use crate::error::{PairError, RunError};
use crate::naming::{KeystorePair, NamingMode};
use crate::paths;

/// Settings for one conversion run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub src: PathBuf,
    pub dest: PathBuf,
    pub password_dir: PathBuf,
    pub mode: NamingMode,
    pub options: RecryptOptions,
}

/// Outcome of a run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub converted: usize,
    pub failed: Vec<(String, PairError)>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Run a batch conversion.
///
/// Directory-level problems abort before any pair is touched; pair-level
/// problems are collected in the summary.
pub fn execute(config: &RunConfig) -> Result<RunSummary, RunError> {
    paths::check_source_dir(&config.src)?;
    paths::check_password_dir(&config.password_dir)?;
    paths::prepare_dest_dir(&config.dest)?;

    // Output settings that can never derive a key fail every pair the same
    // way; reject them before reading anything.
    config.options.fresh_params().validate()?;

    let pairs = config
        .mode
        .discover(&config.src, &config.password_dir)
        .map_err(|source| RunError::InvalidSourceDirectory {
            path: config.src.clone(),
            source,
        })?;

    if pairs.is_empty() {
        warn!(src = %config.src.display(), "no keystores found in source directory");
    }

    let mut summary = RunSummary::default();
    for pair in pairs {
        match convert_pair(&pair, config) {
            Ok(()) => {
                info!(pk = %pair.pk, "converted keystore");
                summary.converted += 1;
            }
            Err(err) => {
                error!(pk = %pair.pk, %err, "failed to convert keystore");
                summary.failed.push((pair.pk, err));
            }
        }
    }

    Ok(summary)
}

fn convert_pair(pair: &KeystorePair, config: &RunConfig) -> Result<(), PairError> {
    if !pair.keystore_path.is_file() {
        return Err(PairError::MissingKeystoreFile(pair.keystore_path.clone()));
    }
    if !pair.password_path.is_file() {
        return Err(PairError::MissingPasswordFile(pair.password_path.clone()));
    }

    let keystore_bytes = fs::read(&pair.keystore_path).map_err(|source| PairError::ReadFailed {
        path: pair.keystore_path.clone(),
        source,
    })?;
    let password_bytes = Zeroizing::new(fs::read(&pair.password_path).map_err(|source| {
        PairError::ReadFailed {
            path: pair.password_path.clone(),
            source,
        }
    })?);

    // The full output document is built in memory, so a failing pair leaves
    // no partial file behind.
    let output = convert_keystore(&keystore_bytes, &password_bytes, &config.options)?;

    let out_path = config.mode.output_path(&config.dest, &pair.pk);
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent).map_err(|source| PairError::WriteFailed {
            path: out_path.clone(),
            source,
        })?;
    }
    fs::write(&out_path, &output).map_err(|source| PairError::WriteFailed {
        path: out_path.clone(),
        source,
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&out_path, fs::Permissions::from_mode(0o600)).map_err(|source| {
            PairError::WriteFailed {
                path: out_path.clone(),
                source,
            }
        })?;
    }

    Ok(())
}
