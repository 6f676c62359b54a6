//! Background persistence.
//!
//! A single worker thread owns every write to the datastore.  Vault
//! mutations enqueue a `Persist` job and return immediately; the worker
//! snapshots the vault under a read lock, encrypts every entry with the
//! key active at that moment, and overwrites the datastore.
//!
//! Jobs run strictly one after another.  A burst of queued `Persist`
//! jobs is collapsed into one run, since each run writes the latest state.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::format::{self, EncryptedEntries};
use super::manager::VaultState;
use crate::datastore::Datastore;
use crate::errors::{PassHeroError, Result};

enum Job {
    Persist,
    /// Acknowledged once every job queued before it has run.
    Flush(Sender<()>),
    Shutdown,
}

/// Handle to the persistence worker thread.
pub(crate) struct PersistenceWorker {
    sender: Sender<Job>,
    handle: Option<JoinHandle<()>>,
    /// Error message of the most recent run, `None` if it succeeded.
    last_failure: Arc<Mutex<Option<String>>>,
}

impl PersistenceWorker {
    pub(crate) fn spawn(
        state: Arc<RwLock<VaultState>>,
        datastore: Arc<dyn Datastore>,
    ) -> Result<Self> {
        let (sender, receiver) = unbounded();
        let last_failure = Arc::new(Mutex::new(None));

        let worker_failure = Arc::clone(&last_failure);
        let handle = thread::Builder::new()
            .name("passhero-persist".into())
            .spawn(move || worker_loop(&receiver, &state, datastore.as_ref(), &worker_failure))?;

        Ok(Self {
            sender,
            handle: Some(handle),
            last_failure,
        })
    }

    /// Queue a write of the current vault state.
    pub(crate) fn enqueue(&self) {
        if self.sender.send(Job::Persist).is_err() {
            warn!("persistence worker is gone; change kept in memory only");
        }
    }

    /// Block until everything queued so far has been written.
    pub(crate) fn flush(&self) -> Result<()> {
        let (ack_tx, ack_rx) = bounded(1);
        self.sender
            .send(Job::Flush(ack_tx))
            .map_err(|_| PassHeroError::PersistenceFailed("persistence worker stopped".into()))?;
        ack_rx
            .recv()
            .map_err(|_| PassHeroError::PersistenceFailed("persistence worker stopped".into()))?;
        self.last_result()
    }

    /// Drain the queue, stop the worker and wait for it to exit.
    pub(crate) fn shutdown(&mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            return self.last_result();
        };

        // Shutdown is queued behind any pending jobs, so they run first.
        let _ = self.sender.send(Job::Shutdown);
        if handle.join().is_err() {
            return Err(PassHeroError::PersistenceFailed(
                "persistence worker panicked".into(),
            ));
        }
        debug!("persistence worker stopped");
        self.last_result()
    }

    fn last_result(&self) -> Result<()> {
        match self.last_failure.lock().clone() {
            Some(reason) => Err(PassHeroError::PersistenceFailed(reason)),
            None => Ok(()),
        }
    }
}

impl Drop for PersistenceWorker {
    fn drop(&mut self) {
        if self.handle.is_none() {
            return;
        }
        if let Err(e) = self.shutdown() {
            warn!(error = %e, "vault may not be fully persisted");
        }
    }
}

fn worker_loop(
    receiver: &Receiver<Job>,
    state: &RwLock<VaultState>,
    datastore: &dyn Datastore,
    last_failure: &Mutex<Option<String>>,
) {
    let mut next = receiver.recv().ok();

    while let Some(job) = next.take() {
        match job {
            Job::Persist => {
                // Fold directly following Persist jobs into this run, but
                // stop at anything else so ordering is preserved.
                let mut coalesced = 0usize;
                loop {
                    match receiver.try_recv() {
                        Ok(Job::Persist) => coalesced += 1,
                        Ok(other) => {
                            next = Some(other);
                            break;
                        }
                        Err(_) => break,
                    }
                }
                if coalesced > 0 {
                    debug!(coalesced, "collapsed queued persistence jobs");
                }

                match persist_snapshot(state, datastore) {
                    Ok(count) => {
                        info!(entries = count, store = %datastore.describe(), "encrypted vault saved");
                        *last_failure.lock() = None;
                    }
                    Err(e) => {
                        warn!(error = %e, store = %datastore.describe(), "failed to save vault; keeping in-memory state");
                        *last_failure.lock() = Some(e.to_string());
                    }
                }
            }
            Job::Flush(ack) => {
                let _ = ack.send(());
            }
            Job::Shutdown => return,
        }

        if next.is_none() {
            next = receiver.recv().ok();
        }
    }
}

/// Encrypt the current vault under one key snapshot and overwrite the
/// datastore with it.  Returns the number of entries written.
pub(crate) fn persist_snapshot(
    state: &RwLock<VaultState>,
    datastore: &dyn Datastore,
) -> Result<usize> {
    let entries = {
        let guard = state.read();
        let key = Arc::clone(&guard.key);

        let mut entries = EncryptedEntries::new();
        for (name, secret) in &guard.secrets {
            entries.insert(key.encrypt(name)?, key.encrypt(secret)?);
        }
        entries
    };

    let mut writer = datastore.open_writer()?;
    format::write_entries(&mut *writer, &entries)?;
    writer.commit()?;

    Ok(entries.len())
}
