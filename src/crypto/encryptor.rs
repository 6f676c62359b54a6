//! String encryptors: the capability the vault uses to seal application
//! names and passwords before they reach the datastore.
//!
//! A `PassphraseEncryptor` emits self-describing tokens:
//!
//! ```text
//! base64( salt[16] | nonce[12] | ciphertext + tag[16] )
//! ```
//!
//! The base64 alphabet is the standard one without padding, so tokens
//! never contain `=`, `:` or whitespace and can be stored as-is on a
//! `key=value` line.

use std::collections::HashMap;
use std::fmt;

use base64::engine::general_purpose::STANDARD_NO_PAD as BASE64;
use base64::Engine;
use parking_lot::Mutex;
use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

use super::encryption::{open, seal, NONCE_LEN, TAG_LEN};
use super::kdf::{derive_key, generate_salt, Argon2Params, DerivedKey, SALT_LEN};
use crate::errors::{PassHeroError, Result};

/// Encrypts and decrypts individual strings under one passphrase.
///
/// Implementations are immutable once built: switching passphrase means
/// building a new encryptor.
pub trait Encryptor: Send + Sync {
    /// Encrypt `plaintext` into an opaque printable token.
    fn encrypt(&self, plaintext: &str) -> Result<String>;

    /// Decrypt a token produced by `encrypt` on an encryptor with the same
    /// passphrase.  Fails with `DecryptionFailed` under any other passphrase.
    fn decrypt(&self, token: &str) -> Result<String>;
}

/// Argon2id + AES-256-GCM password-based encryptor.
pub struct PassphraseEncryptor {
    passphrase: Zeroizing<Vec<u8>>,
    params: Argon2Params,
    /// Salt for everything this instance encrypts.
    salt: [u8; SALT_LEN],
    key: DerivedKey,
    /// Keys re-derived for tokens written under other salts.
    foreign_keys: Mutex<HashMap<[u8; SALT_LEN], DerivedKey>>,
}

impl PassphraseEncryptor {
    /// Build an encryptor for `passphrase`, deriving its write key up front.
    pub fn new(passphrase: &str, params: Argon2Params) -> Result<Self> {
        let passphrase = Zeroizing::new(passphrase.as_bytes().to_vec());
        let salt = generate_salt();
        let key = derive_key(&passphrase, &salt, &params)?;
        debug!("derived encryption key");

        Ok(Self {
            passphrase,
            params,
            salt,
            key,
            foreign_keys: Mutex::new(HashMap::new()),
        })
    }

    fn open_with_salt(&self, salt: [u8; SALT_LEN], sealed: &[u8]) -> Result<Vec<u8>> {
        if salt == self.salt {
            return open(&self.key[..], sealed);
        }

        let mut keys = self.foreign_keys.lock();
        if !keys.contains_key(&salt) {
            let key = derive_key(&self.passphrase, &salt, &self.params)?;
            keys.insert(salt, key);
        }
        match keys.get(&salt) {
            Some(key) => open(&key[..], sealed),
            None => Err(PassHeroError::DecryptionFailed),
        }
    }
}

impl Encryptor for PassphraseEncryptor {
    fn encrypt(&self, plaintext: &str) -> Result<String> {
        let sealed = seal(&self.key[..], plaintext.as_bytes())?;

        let mut token = Vec::with_capacity(SALT_LEN + sealed.len());
        token.extend_from_slice(&self.salt);
        token.extend_from_slice(&sealed);
        Ok(BASE64.encode(token))
    }

    fn decrypt(&self, token: &str) -> Result<String> {
        let raw = BASE64
            .decode(token.trim())
            .map_err(|_| PassHeroError::DecryptionFailed)?;
        if raw.len() < SALT_LEN + NONCE_LEN + TAG_LEN {
            return Err(PassHeroError::DecryptionFailed);
        }

        let (salt_bytes, sealed) = raw.split_at(SALT_LEN);
        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(salt_bytes);

        let plaintext = self.open_with_salt(salt, sealed)?;
        String::from_utf8(plaintext).map_err(|e| {
            let mut bad_bytes = e.into_bytes();
            bad_bytes.zeroize();
            PassHeroError::DecryptionFailed
        })
    }
}

impl fmt::Debug for PassphraseEncryptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassphraseEncryptor")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
