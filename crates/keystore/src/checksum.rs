//! SHA-256 password checksum
//!
//! The checksum is computed over `DK[16..32] || ciphertext`. Its only purpose
//! in the format is password verification: a mismatch means a wrong password,
//! not a corrupt keystore.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::{KeystoreError, KeystoreResult};

/// Compute SHA-256 over the checksum half of the derived key and the
/// ciphertext.
pub fn compute_checksum(derived_key: &[u8], ciphertext: &[u8]) -> KeystoreResult<[u8; 32]> {
    if derived_key.len() < 32 {
        return Err(KeystoreError::DerivedKeyTooShort(derived_key.len()));
    }

    let mut hasher = Sha256::new();
    hasher.update(&derived_key[16..32]);
    hasher.update(ciphertext);

    Ok(hasher.finalize().into())
}

/// Verify the stored checksum against a freshly computed one.
///
/// The comparison is constant-time; mismatch reports the bad-password error.
pub fn verify_checksum(
    derived_key: &[u8],
    ciphertext: &[u8],
    expected: &[u8],
) -> KeystoreResult<()> {
    let computed = compute_checksum(derived_key, ciphertext)?;

    // ct_eq on slices yields false for mismatched lengths as well
    if bool::from(computed.as_slice().ct_eq(expected)) {
        Ok(())
    } else {
        Err(KeystoreError::InvalidPassword)
    }
}
