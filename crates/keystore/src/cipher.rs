//! AES-128-CTR secret wrapping
//!
//! The cipher key is the first 16 bytes of the derived key; the counter is
//! initialized from the 16-byte IV with big-endian increment. CTR mode is its
//! own inverse, so the same keystream application encrypts and decrypts.

use aes::Aes128;
use cipher::{KeyIvInit, StreamCipher};
use ctr::Ctr128BE;
use rand::RngCore;

use crate::error::{KeystoreError, KeystoreResult};
use crate::secure::{secret_bytes, SecretBytes};

/// IV (initialization vector) length for AES-128-CTR
pub const IV_LENGTH: usize = 16;

/// AES-128 key length
pub const AES_KEY_LENGTH: usize = 16;

type Aes128Ctr = Ctr128BE<Aes128>;

/// Apply the AES-128-CTR keystream to `data` in place.
fn apply_keystream(derived_key: &[u8], iv: &[u8], data: &mut [u8]) -> KeystoreResult<()> {
    if derived_key.len() < AES_KEY_LENGTH {
        return Err(KeystoreError::InvalidCipherParams(format!(
            "cipher key must be at least {} bytes, got {}",
            AES_KEY_LENGTH,
            derived_key.len()
        )));
    }

    if iv.len() != IV_LENGTH {
        return Err(KeystoreError::InvalidCipherParams(format!(
            "IV must be {} bytes, got {}",
            IV_LENGTH,
            iv.len()
        )));
    }

    let key: [u8; AES_KEY_LENGTH] = derived_key[..AES_KEY_LENGTH]
        .try_into()
        .map_err(|_| KeystoreError::InvalidCipherParams("key conversion failed".to_string()))?;
    let iv: [u8; IV_LENGTH] = iv
        .try_into()
        .map_err(|_| KeystoreError::InvalidCipherParams("IV conversion failed".to_string()))?;

    let mut cipher = Aes128Ctr::new(&key.into(), &iv.into());
    cipher.apply_keystream(data);

    Ok(())
}

/// Encrypt a secret using the first 16 bytes of `derived_key`.
pub fn encrypt_secret(secret: &[u8], derived_key: &[u8], iv: &[u8]) -> KeystoreResult<Vec<u8>> {
    let mut ciphertext = secret.to_vec();
    apply_keystream(derived_key, iv, &mut ciphertext)?;
    Ok(ciphertext)
}

/// Decrypt a ciphertext using the first 16 bytes of `derived_key`.
pub fn decrypt_secret(
    ciphertext: &[u8],
    derived_key: &[u8],
    iv: &[u8],
) -> KeystoreResult<SecretBytes> {
    let mut plaintext = ciphertext.to_vec();
    apply_keystream(derived_key, iv, &mut plaintext)?;
    Ok(secret_bytes(plaintext))
}

/// Generate a random IV
pub fn generate_iv() -> [u8; IV_LENGTH] {
    let mut iv = [0u8; IV_LENGTH];
    rand::thread_rng().fill_bytes(&mut iv);
    iv
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let secret = b"my-secret-key-material-32-bytes!";
        let key = vec![0xAA; 32];
        let iv = vec![0xBB; 16];

        let ciphertext = encrypt_secret(secret, &key, &iv).unwrap();

        // CTR mode preserves length and changes content
        assert_eq!(ciphertext.len(), secret.len());
        assert_ne!(&ciphertext, secret);

        let decrypted = decrypt_secret(&ciphertext, &key, &iv).unwrap();
        assert_eq!(decrypted.expose_secret().as_slice(), secret);
    }

    #[test]
    fn test_different_iv_different_ciphertext() {
        let secret = b"same-plaintext";
        let key = vec![0xAA; 32];

        let ciphertext1 = encrypt_secret(secret, &key, &[0x11; 16]).unwrap();
        let ciphertext2 = encrypt_secret(secret, &key, &[0x22; 16]).unwrap();
        assert_ne!(ciphertext1, ciphertext2);
    }

    #[test]
    fn test_only_first_half_of_derived_key_is_used() {
        let secret = b"plaintext";
        let mut key1 = vec![0xAA; 32];
        let mut key2 = vec![0xAA; 32];
        key1[16..].copy_from_slice(&[0x11; 16]);
        key2[16..].copy_from_slice(&[0x22; 16]);

        let ciphertext1 = encrypt_secret(secret, &key1, &[0xBB; 16]).unwrap();
        let ciphertext2 = encrypt_secret(secret, &key2, &[0xBB; 16]).unwrap();
        assert_eq!(ciphertext1, ciphertext2);
    }

    #[test]
    fn test_short_key_is_rejected() {
        let result = encrypt_secret(b"test", &[0xAA; 8], &[0xBB; 16]);
        assert!(matches!(
            result,
            Err(KeystoreError::InvalidCipherParams(_))
        ));
    }

    #[test]
    fn test_wrong_iv_length_is_rejected() {
        let result = encrypt_secret(b"test", &[0xAA; 32], &[0xBB; 8]);
        assert!(matches!(
            result,
            Err(KeystoreError::InvalidCipherParams(_))
        ));
    }

    #[test]
    fn test_generate_iv() {
        let iv1 = generate_iv();
        let iv2 = generate_iv();
        assert_ne!(iv1, iv2);
    }
}
