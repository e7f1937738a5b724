//! EIP-2335 keystore engine
//!
//! This crate implements the BLS12-381 keystore format (version 4) used by
//! Ethereum validators:
//!
//! - Password preprocessing (NFKD normalization + control-code removal)
//! - scrypt and PBKDF2-HMAC-SHA256 key derivation
//! - SHA-256 password checksum verification
//! - AES-128-CTR secret wrapping
//! - JSON envelope parsing and serialization
//! - A decrypt-then-re-encrypt conversion pipeline
//!
//! # Security Properties
//!
//! - Passwords, derived keys, and decrypted secrets live in zeroizing
//!   buffers and are wiped when dropped, on success and on error paths
//! - Checksum comparison is constant-time
//! - Secret material never appears in `Debug` output or error messages

pub mod checksum;
pub mod cipher;
pub mod convert;
pub mod envelope;
pub mod error;
pub mod hex;
pub mod kdf;
pub mod password;
pub mod secure;

pub use convert::{convert_keystore, KdfFunction, RecryptOptions};
pub use envelope::{
    CipherModule, ChecksumModule, CryptoModule, KdfModule, Keystore, KeystoreBuilder,
    KEYSTORE_VERSION, SECRET_LENGTH,
};
pub use error::{KeystoreError, KeystoreResult};
pub use kdf::KdfParams;
pub use password::preprocess;
pub use secure::SecretBytes;
