//! Key derivation
//!
//! Dispatches over the two KDFs the keystore format allows: scrypt and
//! PBKDF2-HMAC-SHA256. The derived key is split downstream into an AES key
//! (first 16 bytes) and a checksum key (next 16 bytes), so `dklen` must be
//! at least 32.

use hmac::Hmac;
use rand::RngCore;
use sha2::Sha256;

use crate::error::{KeystoreError, KeystoreResult};
use crate::secure::{secret_bytes, SecretBytes};

/// Minimum derived key length required by the AES/checksum key split.
pub const MIN_DERIVED_KEY_LENGTH: u32 = 32;

/// Salt length drawn for re-encryption.
pub const SALT_LENGTH: usize = 32;

/// The only PRF the format allows for PBKDF2.
pub const PBKDF2_PRF: &str = "hmac-sha256";

/// Iteration count / cost matching the EIP-2335 reference vectors.
const STANDARD_COST: u32 = 1 << 18; // 262_144

/// KDF parameters, shape-selected by the envelope's `kdf.function` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KdfParams {
    Pbkdf2 {
        dklen: u32,
        c: u32,
        salt: Vec<u8>,
    },
    Scrypt {
        dklen: u32,
        n: u64,
        r: u32,
        p: u32,
        salt: Vec<u8>,
    },
}

impl KdfParams {
    /// Standard-strength PBKDF2 parameters with a fresh random salt.
    pub fn standard_pbkdf2() -> Self {
        KdfParams::Pbkdf2 {
            dklen: MIN_DERIVED_KEY_LENGTH,
            c: STANDARD_COST,
            salt: generate_salt(),
        }
    }

    /// The `function` tag this variant serializes under.
    pub fn function(&self) -> &'static str {
        match self {
            KdfParams::Pbkdf2 { .. } => "pbkdf2",
            KdfParams::Scrypt { .. } => "scrypt",
        }
    }

    pub fn dklen(&self) -> u32 {
        match self {
            KdfParams::Pbkdf2 { dklen, .. } | KdfParams::Scrypt { dklen, .. } => *dklen,
        }
    }

    pub fn salt(&self) -> &[u8] {
        match self {
            KdfParams::Pbkdf2 { salt, .. } | KdfParams::Scrypt { salt, .. } => salt,
        }
    }

    /// Check the ranges the format requires before any derivation work.
    pub fn validate(&self) -> KeystoreResult<()> {
        if self.dklen() < MIN_DERIVED_KEY_LENGTH {
            return Err(KeystoreError::DerivedKeyTooShort(self.dklen() as usize));
        }

        match self {
            KdfParams::Pbkdf2 { c, .. } => {
                if *c == 0 {
                    return Err(KeystoreError::InvalidKdfParams(
                        "iteration count must be positive".to_string(),
                    ));
                }
            }
            KdfParams::Scrypt { n, r, p, .. } => {
                if *n < 2 || !n.is_power_of_two() {
                    return Err(KeystoreError::InvalidKdfParams(
                        "n must be a power of 2 and at least 2".to_string(),
                    ));
                }
                if *r == 0 {
                    return Err(KeystoreError::InvalidKdfParams(
                        "r must be positive".to_string(),
                    ));
                }
                if *p == 0 {
                    return Err(KeystoreError::InvalidKdfParams(
                        "p must be positive".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Derive `dklen` bytes from an already-preprocessed password.
    pub fn derive(&self, password: &[u8]) -> KeystoreResult<SecretBytes> {
        self.validate()?;

        let mut output = vec![0u8; self.dklen() as usize];
        match self {
            KdfParams::Pbkdf2 { c, salt, .. } => {
                pbkdf2::pbkdf2::<Hmac<Sha256>>(password, salt, *c, &mut output)
                    .map_err(|e| KeystoreError::KdfError(e.to_string()))?;
            }
            KdfParams::Scrypt { n, r, p, salt, .. } => {
                // validate() guarantees a power of two, so ilog2 is exact
                let log_n = n.ilog2() as u8;
                let params = scrypt::Params::new(log_n, *r, *p, output.len())
                    .map_err(|e| KeystoreError::InvalidKdfParams(e.to_string()))?;
                scrypt::scrypt(password, salt, &params, &mut output)
                    .map_err(|e| KeystoreError::KdfError(e.to_string()))?;
            }
        }

        Ok(secret_bytes(output))
    }
}

/// Generate a random salt for re-encryption.
pub fn generate_salt() -> Vec<u8> {
    let mut salt = vec![0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}
