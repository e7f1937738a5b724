//! Decrypt-then-re-encrypt conversion
//!
//! One call converts a single (keystore, password) pair: parse and validate
//! the envelope, preprocess the password, verify it against the checksum,
//! unwrap the secret, and seal it again under a fresh salt, IV, and UUID.
//! `pubkey`, `path`, and `description` carry over unchanged.
//!
//! The preprocessed password, the decrypted secret, and both derived keys
//! live in zeroizing buffers scoped to this call, so they are wiped whether
//! the conversion succeeds or fails.

use secrecy::ExposeSecret;

use crate::envelope::{Keystore, KeystoreBuilder};
use crate::error::KeystoreResult;
use crate::kdf::{generate_salt, KdfParams, MIN_DERIVED_KEY_LENGTH};
use crate::password;

/// KDF family selected for the re-encrypted output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KdfFunction {
    #[default]
    Pbkdf2,
    Scrypt,
}

/// Output KDF settings for a conversion run.
#[derive(Debug, Clone, Copy)]
pub struct RecryptOptions {
    pub kdf: KdfFunction,
    pub pbkdf2_count: u32,
    pub scrypt_n: u64,
    pub scrypt_r: u32,
    pub scrypt_p: u32,
}

impl RecryptOptions {
    /// Draw a fresh salt and materialize KDF parameters for one output.
    pub fn fresh_params(&self) -> KdfParams {
        let salt = generate_salt();
        match self.kdf {
            KdfFunction::Pbkdf2 => KdfParams::Pbkdf2 {
                dklen: MIN_DERIVED_KEY_LENGTH,
                c: self.pbkdf2_count,
                salt,
            },
            KdfFunction::Scrypt => KdfParams::Scrypt {
                dklen: MIN_DERIVED_KEY_LENGTH,
                n: self.scrypt_n,
                r: self.scrypt_r,
                p: self.scrypt_p,
                salt,
            },
        }
    }
}

/// Convert one keystore document.
///
/// Decrypts `keystore_json` with the password-file bytes and returns the
/// serialized re-encrypted envelope. Nothing is written anywhere; the caller
/// owns file placement.
pub fn convert_keystore(
    keystore_json: &[u8],
    password_file: &[u8],
    options: &RecryptOptions,
) -> KeystoreResult<Vec<u8>> {
    let keystore = Keystore::from_json(keystore_json)?;
    let password = password::preprocess(password_file)?;

    let secret = keystore.decrypt(password.as_bytes())?;

    let mut builder = KeystoreBuilder::new(secret.expose_secret(), password.as_bytes())
        .params(options.fresh_params())
        .pubkey(&keystore.pubkey)
        .path(&keystore.path);
    if let Some(description) = &keystore.description {
        builder = builder.description(description);
    }

    builder.build()?.to_json()
}
