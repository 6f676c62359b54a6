//! In-memory datastore.
//!
//! Clones share the same buffer, so a test can hand one clone to a
//! `VaultManager` and inspect what it persisted through another.

use std::io::{self, Cursor, Read, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{Datastore, DatastoreWriter};
use crate::errors::{PassHeroError, Result};

#[derive(Debug, Default)]
struct Shared {
    bytes: Mutex<Vec<u8>>,
    commits: AtomicUsize,
    unavailable: AtomicBool,
}

/// Datastore holding the vault bytes in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatastore {
    shared: Arc<Shared>,
}

impl MemoryDatastore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with `bytes`.
    pub fn with_contents(bytes: impl Into<Vec<u8>>) -> Self {
        let store = Self::default();
        *store.shared.bytes.lock() = bytes.into();
        store
    }

    /// Snapshot of the stored bytes.
    pub fn contents(&self) -> Vec<u8> {
        self.shared.bytes.lock().clone()
    }

    /// Number of successful commits so far.
    pub fn commit_count(&self) -> usize {
        self.shared.commits.load(Ordering::SeqCst)
    }

    /// Make every subsequent open fail, as if the backing file vanished.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.shared.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.shared.unavailable.load(Ordering::SeqCst) {
            return Err(PassHeroError::unavailable(
                PathBuf::from("<memory>"),
                "store marked unavailable",
            ));
        }
        Ok(())
    }
}

impl Datastore for MemoryDatastore {
    fn open_reader(&self) -> Result<Box<dyn Read + Send>> {
        self.check_available()?;
        Ok(Box::new(Cursor::new(self.contents())))
    }

    fn open_writer(&self) -> Result<Box<dyn DatastoreWriter>> {
        self.check_available()?;
        Ok(Box::new(MemoryWriter {
            buf: Vec::new(),
            shared: Arc::clone(&self.shared),
        }))
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}

struct MemoryWriter {
    buf: Vec<u8>,
    shared: Arc<Shared>,
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl DatastoreWriter for MemoryWriter {
    fn commit(self: Box<Self>) -> Result<()> {
        let MemoryWriter { buf, shared } = *self;
        *shared.bytes.lock() = buf;
        shared.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_content() {
        let store = MemoryDatastore::new();
        let other = store.clone();

        let mut w = store.open_writer().unwrap();
        w.write_all(b"k=v\n").unwrap();
        w.commit().unwrap();

        assert_eq!(other.contents(), b"k=v\n");
        assert_eq!(other.commit_count(), 1);
    }

    #[test]
    fn uncommitted_writes_are_discarded() {
        let store = MemoryDatastore::with_contents("old=1\n");
        {
            let mut w = store.open_writer().unwrap();
            w.write_all(b"new=2\n").unwrap();
        }
        assert_eq!(store.contents(), b"old=1\n");
        assert_eq!(store.commit_count(), 0);
    }

    #[test]
    fn unavailable_store_fails_to_open() {
        let store = MemoryDatastore::new();
        store.set_unavailable(true);
        assert!(store.open_reader().is_err());
        assert!(store.open_writer().is_err());
        store.set_unavailable(false);
        assert!(store.open_reader().is_ok());
    }
}
