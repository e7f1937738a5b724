//! Keystore error types

use thiserror::Error;

/// Errors that can occur while parsing, decrypting, or re-encrypting keystores
#[derive(Debug, Error)]
pub enum KeystoreError {
    /// Document is not valid JSON or lacks the envelope fields
    #[error("malformed keystore JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    /// `version` is anything other than 4
    #[error("unsupported keystore version: {0}")]
    UnsupportedVersion(u64),

    /// `crypto.kdf.function` is not `scrypt` or `pbkdf2`
    #[error("unsupported KDF function: {0:?}")]
    UnsupportedKdf(String),

    /// `crypto.cipher.function` is not `aes-128-ctr`
    #[error("unsupported cipher function: {0:?}")]
    UnsupportedCipher(String),

    /// `crypto.checksum.function` is not `sha256`
    #[error("unsupported checksum function: {0:?}")]
    UnsupportedChecksum(String),

    /// A required key is absent from `crypto.kdf.params`
    #[error("missing KDF parameter `{0}`")]
    MissingKdfParam(&'static str),

    /// A required key is absent from `crypto.cipher.params`
    #[error("missing cipher parameter `{0}`")]
    MissingCipherParam(&'static str),

    /// A hex field has odd length or non-hex characters
    #[error("invalid hex encoding: {0}")]
    InvalidHex(String),

    /// KDF parameters are outside the ranges the format allows
    #[error("invalid KDF parameters: {0}")]
    InvalidKdfParams(String),

    /// `dklen` is below the 32 bytes the key split requires
    #[error("derived key too short: {0} bytes, need at least 32")]
    DerivedKeyTooShort(usize),

    /// Stored checksum does not decode to 32 bytes
    #[error("invalid checksum length: {0} bytes, expected 32")]
    InvalidChecksumLength(usize),

    /// IV or ciphertext has the wrong length
    #[error("invalid cipher parameters: {0}")]
    InvalidCipherParams(String),

    /// Checksum verification failed, meaning the password is wrong
    #[error("invalid password: checksum verification failed")]
    InvalidPassword,

    /// Password file is not valid UTF-8
    #[error("password is not valid UTF-8: {0}")]
    BadPasswordEncoding(#[from] core::str::Utf8Error),

    /// Key derivation failed
    #[error("key derivation failed: {0}")]
    KdfError(String),
}

/// Result type for keystore operations
pub type KeystoreResult<T> = Result<T, KeystoreError>;
