//! `VaultManager`: the in-memory vault and everything that reads or
//! changes it.
//!
//! All reads are served from a plaintext cache guarded by a readers-writer
//! lock.  Every change enqueues a persistence job; the job re-encrypts the
//! whole vault under the current master key and overwrites the datastore
//! on a background thread, so callers never wait for disk I/O.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};
use zeroize::Zeroize;

use super::format::{self, EncryptedEntries};
use super::persistence::PersistenceWorker;
use crate::crypto::{Argon2Params, Encryptor, PassphraseEncryptor};
use crate::datastore::Datastore;
use crate::errors::{PassHeroError, Result};
use crate::generator::PasswordGenerator;

/// Builds the encryptor for a new master passphrase.
pub type KeyFactory = Box<dyn Fn(&str) -> Result<Arc<dyn Encryptor>> + Send + Sync>;

/// Knobs for opening a vault.
#[derive(Debug, Clone, Copy, Default)]
pub struct VaultOptions {
    /// Generator used for new and changed passwords.
    pub generator: PasswordGenerator,
    /// Cost parameters for the master passphrase KDF.
    pub argon2: Argon2Params,
}

/// Everything behind the vault lock.
///
/// The master key lives next to the secrets so that re-keying and
/// snapshotting for persistence are serialized by the same lock: one
/// persisted file is always encrypted under exactly one key.
pub(crate) struct VaultState {
    pub(crate) secrets: HashMap<String, String>,
    pub(crate) key: Arc<dyn Encryptor>,
}

impl Drop for VaultState {
    fn drop(&mut self) {
        wipe(&mut self.secrets);
    }
}

/// Manages one password per application, backed by an encrypted datastore.
///
/// Changes are durable only once the background writer has run.  A crash
/// between a change and the next completed write loses that change; call
/// [`flush`](Self::flush) or [`shutdown`](Self::shutdown) when it matters.
pub struct VaultManager {
    state: Arc<RwLock<VaultState>>,
    generator: PasswordGenerator,
    key_factory: KeyFactory,
    worker: PersistenceWorker,
}

impl VaultManager {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Open the vault stored in `datastore` with `master_passphrase`.
    ///
    /// An empty datastore yields an empty vault and the passphrase becomes
    /// the master passphrase for everything saved later.  Otherwise every
    /// stored entry must decrypt, or opening fails with
    /// `InvalidMasterPassphrase` and nothing is kept.
    pub fn open<D>(datastore: D, master_passphrase: &str, options: VaultOptions) -> Result<Self>
    where
        D: Datastore + 'static,
    {
        let params = options.argon2;
        params.validate()?;

        let key_factory: KeyFactory = Box::new(move |passphrase: &str| {
            let encryptor = PassphraseEncryptor::new(passphrase, params)?;
            Ok(Arc::new(encryptor) as Arc<dyn Encryptor>)
        });
        let key = key_factory(master_passphrase)?;

        Self::with_encryptor(Arc::new(datastore), key, key_factory, options.generator)
    }

    /// Open with a caller-supplied master key.
    ///
    /// `key_factory` is used by [`change_master_key`](Self::change_master_key)
    /// to build replacement keys.
    pub fn with_encryptor(
        datastore: Arc<dyn Datastore>,
        key: Arc<dyn Encryptor>,
        key_factory: KeyFactory,
        generator: PasswordGenerator,
    ) -> Result<Self> {
        let stored = format::read_entries(datastore.open_reader()?)?;
        let secrets = decrypt_all(key.as_ref(), stored)?;
        info!(
            applications = secrets.len(),
            store = %datastore.describe(),
            "vault loaded"
        );

        let state = Arc::new(RwLock::new(VaultState { secrets, key }));
        let worker = PersistenceWorker::spawn(Arc::clone(&state), datastore)?;

        Ok(Self {
            state,
            generator,
            key_factory,
            worker,
        })
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Names of all applications with a stored password, in no particular
    /// order.
    pub fn list_applications(&self) -> Vec<String> {
        self.state.read().secrets.keys().cloned().collect()
    }

    /// Returns `true` if `name` has a stored password.
    pub fn has_secret(&self, name: &str) -> bool {
        self.state.read().secrets.contains_key(name)
    }

    /// Plaintext password for `name`, if any.  Never touches the datastore.
    pub fn get_plaintext(&self, name: &str) -> Option<String> {
        self.state.read().secrets.get(name).cloned()
    }

    /// Number of stored applications.
    pub fn len(&self) -> usize {
        self.state.read().secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ------------------------------------------------------------------
    // Changes
    // ------------------------------------------------------------------

    /// Store a freshly generated password for `name`, replacing any
    /// existing one without complaint.  Use [`has_secret`](Self::has_secret)
    /// first to tell a new application from an overwrite.
    pub fn generate_secret(&self, name: &str) {
        let password = self.generator.generate();
        {
            let mut state = self.state.write();
            if let Some(mut previous) = state.secrets.insert(name.to_string(), password) {
                previous.zeroize();
            }
        }
        debug!("password generated");
        self.worker.enqueue();
    }

    /// Replace the password of an existing application with a new one that
    /// is guaranteed to differ from the old.
    pub fn change_secret(&self, name: &str) -> Result<()> {
        {
            let mut state = self.state.write();
            let current = state
                .secrets
                .get_mut(name)
                .ok_or_else(|| PassHeroError::NoSuchApplication(name.to_string()))?;

            let mut fresh = self.generator.generate();
            while fresh == *current {
                fresh.zeroize();
                fresh = self.generator.generate();
            }

            let mut previous = std::mem::replace(current, fresh);
            previous.zeroize();
        }
        debug!("password changed");
        self.worker.enqueue();
        Ok(())
    }

    /// Remove the password for `name`.  Returns whether anything was
    /// removed; only an actual removal schedules a write.
    pub fn delete_secret(&self, name: &str) -> bool {
        let removed = self.state.write().secrets.remove(name);
        match removed {
            Some(mut secret) => {
                secret.zeroize();
                debug!("password deleted");
                self.worker.enqueue();
                true
            }
            None => false,
        }
    }

    /// Switch to a new master passphrase.  The next write re-encrypts the
    /// whole vault under it.
    ///
    /// Key derivation runs before taking the lock; the swap itself holds
    /// the write lock so no persistence snapshot straddles two keys.
    pub fn change_master_key(&self, new_passphrase: &str) -> Result<()> {
        let key = (self.key_factory)(new_passphrase)?;
        self.state.write().key = key;
        info!("master key changed; re-encrypting vault");
        self.worker.enqueue();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Persistence control
    // ------------------------------------------------------------------

    /// Wait until every change made so far has been written.
    ///
    /// Returns `PersistenceFailed` if the most recent write failed.  The
    /// in-memory vault is unaffected either way.
    pub fn flush(&self) -> Result<()> {
        self.worker.flush()
    }

    /// Write out pending changes and stop the background writer.
    pub fn shutdown(mut self) -> Result<()> {
        self.worker.shutdown()
    }
}

/// Decrypt every stored pair.  Any failure discards what was decrypted so
/// far and reports the passphrase as wrong.
fn decrypt_all(key: &dyn Encryptor, stored: EncryptedEntries) -> Result<HashMap<String, String>> {
    let mut secrets = HashMap::with_capacity(stored.len());

    for (encrypted_name, encrypted_secret) in &stored {
        let decrypted = key
            .decrypt(encrypted_name)
            .and_then(|name| Ok((name, key.decrypt(encrypted_secret)?)));

        match decrypted {
            Ok((name, secret)) => {
                secrets.insert(name, secret);
            }
            Err(e) => {
                wipe(&mut secrets);
                return Err(match e {
                    PassHeroError::DecryptionFailed => PassHeroError::InvalidMasterPassphrase,
                    other => other,
                });
            }
        }
    }

    Ok(secrets)
}

fn wipe(secrets: &mut HashMap<String, String>) {
    for (mut name, mut secret) in secrets.drain() {
        name.zeroize();
        secret.zeroize();
    }
}
