//! EIP-2335 envelope codec
//!
//! Parses and serializes the version-4 JSON document. `crypto.kdf.params` is
//! shape-polymorphic on `crypto.kdf.function`, so parsing happens in two
//! stages: serde reads the raw envelope with `params` left as a JSON value,
//! then the projection below reads the function tag and interprets `params`
//! as the matching schema. That keeps unsupported functions, missing
//! parameters, and malformed JSON as distinct failures.
//!
//! Serialization canonicalizes every binary field to lower-case hex and
//! round-trips field-for-field through the parser.

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::checksum::{compute_checksum, verify_checksum};
use crate::cipher::{decrypt_secret, encrypt_secret, generate_iv, IV_LENGTH};
use crate::error::{KeystoreError, KeystoreResult};
use crate::hex;
use crate::kdf::{KdfParams, PBKDF2_PRF};
use crate::secure::SecretBytes;

/// Schema version this codec understands.
pub const KEYSTORE_VERSION: u32 = 4;

/// Wrapped secret length: the BLS12-381 secret scalar is 32 bytes.
pub const SECRET_LENGTH: usize = 32;

/// Parsed EIP-2335 keystore envelope.
///
/// All binary fields are held decoded; hex round-trips are confined to the
/// codec. `pubkey` and `path` are opaque identifiers carried verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Keystore {
    pub crypto: CryptoModule,
    pub description: Option<String>,
    pub pubkey: String,
    pub path: String,
    pub uuid: String,
    pub version: u32,
}

/// Combined crypto parameters
#[derive(Debug, Clone, PartialEq)]
pub struct CryptoModule {
    pub kdf: KdfModule,
    pub checksum: ChecksumModule,
    pub cipher: CipherModule,
}

/// `crypto.kdf`: the function tag is implied by the params variant.
#[derive(Debug, Clone, PartialEq)]
pub struct KdfModule {
    pub params: KdfParams,
    /// Empty in practice; carried through verbatim.
    pub message: Vec<u8>,
}

/// `crypto.checksum`: SHA-256 digest over the checksum key and ciphertext.
#[derive(Debug, Clone, PartialEq)]
pub struct ChecksumModule {
    pub message: [u8; 32],
}

/// `crypto.cipher`: AES-128-CTR IV and ciphertext.
#[derive(Debug, Clone, PartialEq)]
pub struct CipherModule {
    pub iv: [u8; IV_LENGTH],
    pub message: Vec<u8>,
}

impl Keystore {
    /// Parse and validate an envelope from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> KeystoreResult<Self> {
        let raw: RawKeystore = serde_json::from_slice(bytes)?;
        raw.try_into()
    }

    /// Serialize to pretty-printed JSON with a trailing newline.
    pub fn to_json(&self) -> KeystoreResult<Vec<u8>> {
        let mut out = serde_json::to_vec_pretty(&RawKeystore::from(self))?;
        out.push(b'\n');
        Ok(out)
    }

    /// Decrypt the wrapped secret with an already-preprocessed password.
    ///
    /// The checksum is verified before the ciphertext is touched; a mismatch
    /// reports the bad-password error and reveals nothing.
    pub fn decrypt(&self, password: &[u8]) -> KeystoreResult<SecretBytes> {
        let derived_key = self.crypto.kdf.params.derive(password)?;
        let dk = derived_key.expose_secret();

        verify_checksum(dk, &self.crypto.cipher.message, &self.crypto.checksum.message)?;

        decrypt_secret(&self.crypto.cipher.message, dk, &self.crypto.cipher.iv)
    }
}

/// Builder that seals a secret into a fresh envelope
///
/// Draws a fresh IV and UUID; the salt arrives inside the caller-supplied
/// `KdfParams` (or from [`KdfParams::standard_pbkdf2`] when none are given).
pub struct KeystoreBuilder<'a> {
    secret: &'a [u8],
    password: &'a [u8],
    params: Option<KdfParams>,
    pubkey: String,
    path: String,
    description: Option<String>,
}

impl<'a> KeystoreBuilder<'a> {
    /// Start building from a raw secret and a preprocessed password.
    pub fn new(secret: &'a [u8], password: &'a [u8]) -> Self {
        Self {
            secret,
            password,
            params: None,
            pubkey: String::new(),
            path: String::new(),
            description: None,
        }
    }

    /// Set the KDF parameters (including the salt) for the new envelope.
    pub fn params(mut self, params: KdfParams) -> Self {
        self.params = Some(params);
        self
    }

    /// Set the public key identifier (hex encoded, carried verbatim).
    pub fn pubkey(mut self, pubkey: &str) -> Self {
        self.pubkey = pubkey.to_string();
        self
    }

    /// Set the derivation path (carried verbatim, may be empty).
    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// Set an optional description
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Derive, encrypt, and checksum into a complete envelope.
    pub fn build(self) -> KeystoreResult<Keystore> {
        if self.secret.len() != SECRET_LENGTH {
            return Err(KeystoreError::InvalidCipherParams(format!(
                "secret must be {} bytes, got {}",
                SECRET_LENGTH,
                self.secret.len()
            )));
        }

        let params = self.params.unwrap_or_else(KdfParams::standard_pbkdf2);
        let derived_key = params.derive(self.password)?;
        let dk = derived_key.expose_secret();

        let iv = generate_iv();
        let ciphertext = encrypt_secret(self.secret, dk, &iv)?;
        let checksum = compute_checksum(dk, &ciphertext)?;

        Ok(Keystore {
            crypto: CryptoModule {
                kdf: KdfModule {
                    params,
                    message: Vec::new(),
                },
                checksum: ChecksumModule { message: checksum },
                cipher: CipherModule {
                    iv,
                    message: ciphertext,
                },
            },
            description: self.description,
            pubkey: self.pubkey,
            path: self.path,
            uuid: Uuid::new_v4().to_string(),
            version: KEYSTORE_VERSION,
        })
    }
}

// ---------------------------------------------------------------------------
// Raw (wire) representation
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
struct RawKeystore {
    crypto: RawCrypto,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    pubkey: String,
    #[serde(default)]
    path: String,
    uuid: String,
    version: u64,
}

#[derive(Serialize, Deserialize)]
struct RawCrypto {
    kdf: RawModule,
    checksum: RawModule,
    cipher: RawModule,
}

#[derive(Serialize, Deserialize)]
struct RawModule {
    function: String,
    params: Value,
    message: String,
}

impl TryFrom<RawKeystore> for Keystore {
    type Error = KeystoreError;

    fn try_from(raw: RawKeystore) -> KeystoreResult<Self> {
        if raw.version != u64::from(KEYSTORE_VERSION) {
            return Err(KeystoreError::UnsupportedVersion(raw.version));
        }

        let kdf = parse_kdf(&raw.crypto.kdf)?;
        let checksum = parse_checksum(&raw.crypto.checksum)?;
        let cipher = parse_cipher(&raw.crypto.cipher)?;

        kdf.params.validate()?;

        Ok(Keystore {
            crypto: CryptoModule {
                kdf,
                checksum,
                cipher,
            },
            description: raw.description,
            pubkey: raw.pubkey,
            path: raw.path,
            uuid: raw.uuid,
            version: KEYSTORE_VERSION,
        })
    }
}

fn parse_kdf(raw: &RawModule) -> KeystoreResult<KdfModule> {
    let params = match raw.function.as_str() {
        "pbkdf2" => {
            let prf = kdf_param_str(&raw.params, "prf")?;
            if prf != PBKDF2_PRF {
                return Err(KeystoreError::InvalidKdfParams(format!(
                    "unsupported PRF: {prf:?}"
                )));
            }
            KdfParams::Pbkdf2 {
                dklen: kdf_param_u32(&raw.params, "dklen")?,
                c: kdf_param_u32(&raw.params, "c")?,
                salt: hex::decode(kdf_param_str(&raw.params, "salt")?)?,
            }
        }
        "scrypt" => KdfParams::Scrypt {
            dklen: kdf_param_u32(&raw.params, "dklen")?,
            n: kdf_param_u64(&raw.params, "n")?,
            r: kdf_param_u32(&raw.params, "r")?,
            p: kdf_param_u32(&raw.params, "p")?,
            salt: hex::decode(kdf_param_str(&raw.params, "salt")?)?,
        },
        other => return Err(KeystoreError::UnsupportedKdf(other.to_string())),
    };

    Ok(KdfModule {
        params,
        message: hex::decode(&raw.message)?,
    })
}

fn parse_checksum(raw: &RawModule) -> KeystoreResult<ChecksumModule> {
    if raw.function != "sha256" {
        return Err(KeystoreError::UnsupportedChecksum(raw.function.clone()));
    }

    let bytes = hex::decode(&raw.message)?;
    let message: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| KeystoreError::InvalidChecksumLength(bytes.len()))?;

    Ok(ChecksumModule { message })
}

fn parse_cipher(raw: &RawModule) -> KeystoreResult<CipherModule> {
    if raw.function != "aes-128-ctr" {
        return Err(KeystoreError::UnsupportedCipher(raw.function.clone()));
    }

    let iv_hex = raw
        .params
        .get("iv")
        .ok_or(KeystoreError::MissingCipherParam("iv"))?
        .as_str()
        .ok_or_else(|| KeystoreError::InvalidCipherParams("`iv` must be a string".to_string()))?;
    let iv_bytes = hex::decode(iv_hex)?;
    let iv: [u8; IV_LENGTH] = iv_bytes.as_slice().try_into().map_err(|_| {
        KeystoreError::InvalidCipherParams(format!(
            "IV must be {} bytes, got {}",
            IV_LENGTH,
            iv_bytes.len()
        ))
    })?;

    let message = hex::decode(&raw.message)?;
    if message.len() != SECRET_LENGTH {
        return Err(KeystoreError::InvalidCipherParams(format!(
            "ciphertext must be {} bytes, got {}",
            SECRET_LENGTH,
            message.len()
        )));
    }

    Ok(CipherModule { iv, message })
}

fn kdf_param<'v>(params: &'v Value, key: &'static str) -> KeystoreResult<&'v Value> {
    params.get(key).ok_or(KeystoreError::MissingKdfParam(key))
}

fn kdf_param_str<'v>(params: &'v Value, key: &'static str) -> KeystoreResult<&'v str> {
    kdf_param(params, key)?
        .as_str()
        .ok_or_else(|| KeystoreError::InvalidKdfParams(format!("`{key}` must be a string")))
}

fn kdf_param_u64(params: &Value, key: &'static str) -> KeystoreResult<u64> {
    kdf_param(params, key)?
        .as_u64()
        .ok_or_else(|| KeystoreError::InvalidKdfParams(format!("`{key}` must be an integer")))
}

fn kdf_param_u32(params: &Value, key: &'static str) -> KeystoreResult<u32> {
    let value = kdf_param_u64(params, key)?;
    u32::try_from(value)
        .map_err(|_| KeystoreError::InvalidKdfParams(format!("`{key}` is out of range")))
}

impl From<&Keystore> for RawKeystore {
    fn from(keystore: &Keystore) -> Self {
        let kdf_params = match &keystore.crypto.kdf.params {
            KdfParams::Pbkdf2 { dklen, c, salt } => json!({
                "dklen": dklen,
                "c": c,
                "prf": PBKDF2_PRF,
                "salt": hex::encode(salt),
            }),
            KdfParams::Scrypt {
                dklen,
                n,
                r,
                p,
                salt,
            } => json!({
                "dklen": dklen,
                "n": n,
                "p": p,
                "r": r,
                "salt": hex::encode(salt),
            }),
        };

        RawKeystore {
            crypto: RawCrypto {
                kdf: RawModule {
                    function: keystore.crypto.kdf.params.function().to_string(),
                    params: kdf_params,
                    message: hex::encode(&keystore.crypto.kdf.message),
                },
                checksum: RawModule {
                    function: "sha256".to_string(),
                    params: json!({}),
                    message: hex::encode(keystore.crypto.checksum.message),
                },
                cipher: RawModule {
                    function: "aes-128-ctr".to_string(),
                    params: json!({ "iv": hex::encode(keystore.crypto.cipher.iv) }),
                    message: hex::encode(&keystore.crypto.cipher.message),
                },
            },
            description: keystore.description.clone(),
            pubkey: keystore.pubkey.clone(),
            path: keystore.path.clone(),
            uuid: keystore.uuid.clone(),
            version: u64::from(keystore.version),
        }
    }
}
