//! Flat-file datastore.
//!
//! Writes go to a hidden temp file next to the target (`.<name>.tmp`)
//! which is fsynced and renamed over the target on commit.  The rename
//! keeps readers from ever seeing a half-written vault.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Datastore, DatastoreWriter};
use crate::errors::{PassHeroError, Result};

/// Datastore backed by one existing regular file.
#[derive(Debug, Clone)]
pub struct FileDatastore {
    path: PathBuf,
}

impl FileDatastore {
    /// Wrap an existing file.
    ///
    /// Fails with `DatastoreUnavailable` unless `path` exists, is a regular
    /// file, and can be opened for both reading and writing.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let metadata =
            fs::metadata(&path).map_err(|e| PassHeroError::unavailable(&path, e))?;
        if !metadata.is_file() {
            return Err(PassHeroError::unavailable(&path, "not a regular file"));
        }

        // Opening read+write without truncation checks both permissions.
        OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| PassHeroError::unavailable(&path, e))?;

        Ok(Self { path })
    }

    /// Create an empty vault file (and any missing parent directories),
    /// then wrap it.
    ///
    /// Fails with `VaultAlreadyExists` if something is already at `path`.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.exists() {
            return Err(PassHeroError::VaultAlreadyExists(path));
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        owner_only_options().create_new(true).open(&path)?;
        debug!(path = %path.display(), "created empty vault file");

        Self::new(path)
    }

    fn staging_path(&self) -> PathBuf {
        let parent = self.path.parent().unwrap_or(Path::new("."));
        parent.join(format!(
            ".{}.tmp",
            self.path.file_name().unwrap_or_default().to_string_lossy()
        ))
    }
}

impl Datastore for FileDatastore {
    fn open_reader(&self) -> Result<Box<dyn Read + Send>> {
        let file = File::open(&self.path).map_err(|e| PassHeroError::unavailable(&self.path, e))?;
        Ok(Box::new(io::BufReader::new(file)))
    }

    fn open_writer(&self) -> Result<Box<dyn DatastoreWriter>> {
        let staging = self.staging_path();
        let file = owner_only_options()
            .truncate(true)
            .create(true)
            .open(&staging)
            .map_err(|e| PassHeroError::unavailable(&staging, e))?;

        Ok(Box::new(StagedFileWriter {
            out: Some(BufWriter::new(file)),
            staging,
            target: self.path.clone(),
        }))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Options for a new file readable and writable by the owner only.
fn owner_only_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
}

/// Writer that stages into a sibling temp file until committed.
struct StagedFileWriter {
    out: Option<BufWriter<File>>,
    staging: PathBuf,
    target: PathBuf,
}

impl StagedFileWriter {
    fn out(&mut self) -> io::Result<&mut BufWriter<File>> {
        self.out
            .as_mut()
            .ok_or_else(|| io::Error::other("writer already committed"))
    }
}

impl Write for StagedFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out()?.flush()
    }
}

impl DatastoreWriter for StagedFileWriter {
    fn commit(mut self: Box<Self>) -> Result<()> {
        let out = self
            .out
            .take()
            .ok_or_else(|| PassHeroError::PersistenceFailed("writer already committed".into()))?;

        if let Err(e) = publish(out, &self.staging, &self.target) {
            let _ = fs::remove_file(&self.staging);
            return Err(e.into());
        }
        Ok(())
    }
}

/// Flush and fsync the staged file, then move it over `target`.
fn publish(out: BufWriter<File>, staging: &Path, target: &Path) -> io::Result<()> {
    let file = out.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    drop(file);
    fs::rename(staging, target)
}

impl Drop for StagedFileWriter {
    fn drop(&mut self) {
        // Uncommitted: throw the staged bytes away.
        if self.out.take().is_some() {
            let _ = fs::remove_file(&self.staging);
        }
    }
}
