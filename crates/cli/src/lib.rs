//! Batch converter for EIP-2335 validator keystores
//!
//! Reads a directory of encrypted keystores and their password files,
//! verifies each password, and writes re-encrypted copies under fresh salts,
//! IVs, and UUIDs. Supports the web3signer and nimbus on-disk layouts.

pub mod error;
pub mod naming;
pub mod paths;
pub mod run;

pub use error::{PairError, RunError};
pub use naming::{KeystorePair, NamingMode};
pub use run::{execute, RunConfig, RunSummary};
