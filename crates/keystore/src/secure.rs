//! Secure buffers for secret material
//!
//! Derived keys and decrypted secrets are held in `SecretBox` buffers that
//! zeroize on drop and redact their `Debug` output. The inner bytes are only
//! reachable through `expose_secret()`.

use secrecy::SecretBox;

/// A heap-allocated secret byte buffer, zeroized on drop.
pub type SecretBytes = SecretBox<Vec<u8>>;

/// Wrap a byte vector in a zeroizing container without copying it.
pub fn secret_bytes(bytes: Vec<u8>) -> SecretBytes {
    SecretBox::new(Box::new(bytes))
}
