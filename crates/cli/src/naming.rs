//! On-disk naming conventions
//!
//! Two layouts from the staking ecosystem are supported:
//!
//! - `WEB3SIGNER`: keystore `<src>/<pk>.json`, password `<passwords>/<pk>.txt`
//! - `NIMBUS`: keystore `<src>/<pk>/keystore.json`, password `<passwords>/<pk>`
//!
//! `pk` is the file stem (web3signer) or subdirectory name (nimbus), carried
//! verbatim as an opaque identifier.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::ValueEnum;

/// Keystore filename inside each nimbus validator subdirectory.
const NIMBUS_KEYSTORE_FILE: &str = "keystore.json";

/// Layout of keystores and password files on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum NamingMode {
    /// One `<pk>.json` keystore per pair, passwords in `<pk>.txt`
    #[default]
    #[value(name = "WEB3SIGNER")]
    Web3signer,

    /// One `<pk>/keystore.json` subdirectory per pair, passwords in `<pk>`
    #[value(name = "NIMBUS")]
    Nimbus,
}

/// One discovered conversion input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeystorePair {
    /// Opaque identifier taken from the file stem or subdirectory name
    pub pk: String,
    pub keystore_path: PathBuf,
    pub password_path: PathBuf,
}

impl NamingMode {
    /// Enumerate `(pk, keystore, password)` triples in the source directory.
    ///
    /// Entries that do not match the convention are skipped. Paths are not
    /// checked for existence here; a missing file surfaces when its pair is
    /// processed.
    pub fn discover(&self, src: &Path, password_dir: &Path) -> io::Result<Vec<KeystorePair>> {
        let mut pairs = Vec::new();

        for entry in fs::read_dir(src)? {
            let path = entry?.path();
            match self {
                NamingMode::Web3signer => {
                    if !path.is_file() || !path.extension().is_some_and(|ext| ext == "json") {
                        continue;
                    }
                    let Some(pk) = path.file_stem().and_then(|stem| stem.to_str()) else {
                        continue;
                    };
                    pairs.push(KeystorePair {
                        pk: pk.to_string(),
                        password_path: password_dir.join(format!("{pk}.txt")),
                        keystore_path: path,
                    });
                }
                NamingMode::Nimbus => {
                    if !path.is_dir() {
                        continue;
                    }
                    let Some(pk) = path.file_name().and_then(|name| name.to_str()) else {
                        continue;
                    };
                    pairs.push(KeystorePair {
                        pk: pk.to_string(),
                        password_path: password_dir.join(pk),
                        keystore_path: path.join(NIMBUS_KEYSTORE_FILE),
                    });
                }
            }
        }

        // Iteration order is filesystem-dependent; sort for stable logs
        pairs.sort_by(|a, b| a.pk.cmp(&b.pk));
        Ok(pairs)
    }

    /// Destination path for a converted keystore
    pub fn output_path(&self, dest: &Path, pk: &str) -> PathBuf {
        match self {
            NamingMode::Web3signer => dest.join(format!("{pk}.json")),
            NamingMode::Nimbus => dest.join(pk).join(NIMBUS_KEYSTORE_FILE),
        }
    }
}
