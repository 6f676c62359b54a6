//! Byte-level storage for the encrypted vault.
//!
//! A datastore only moves bytes.  It knows nothing about the entry format
//! or encryption; `vault::format` and the `Encryptor` handle those.
//!
//! - `FileDatastore`: a single regular file, replaced atomically on commit
//! - `MemoryDatastore`: an in-process buffer for tests and embedding

pub mod file;
pub mod memory;

use std::io::{Read, Write};

use crate::errors::Result;

pub use file::FileDatastore;
pub use memory::MemoryDatastore;

/// Supplies fresh readers and writers over the stored vault bytes.
pub trait Datastore: Send + Sync {
    /// Open a reader positioned at the start of the stored content.
    fn open_reader(&self) -> Result<Box<dyn Read + Send>>;

    /// Open a writer whose bytes replace the stored content once committed.
    fn open_writer(&self) -> Result<Box<dyn DatastoreWriter>>;

    /// Short human-readable location, used in log lines.
    fn describe(&self) -> String;
}

/// A pending full overwrite of a datastore.
///
/// Dropping the writer without calling `commit` discards everything
/// written and leaves the previous content in place.
pub trait DatastoreWriter: Write + Send {
    /// Make the written bytes the datastore's complete content.
    fn commit(self: Box<Self>) -> Result<()>;
}
