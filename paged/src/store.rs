//! Backing stores: the medium that holds every element outside the window.
//!
//! The window logic in [`PagedVec`](crate::PagedVec) only talks to the
//! [`BackingStore`] trait. [`FileStore`] is the real out-of-core medium,
//! [`MemStore`] keeps the bytes in memory for fast tests.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::Scratch;

/// Byte-addressed random-access storage.
pub trait BackingStore: Sized {
    /// Read into `buf` from `offset`. Returns the number of bytes read, which
    /// is short only when the store ends first.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Write all of `buf` at `offset`, growing the store if needed.
    fn write_at(&mut self, offset: u64, buf: &[u8]) -> io::Result<()>;

    /// Like [`read_at`](BackingStore::read_at) but through an independent
    /// read-only handle, leaving this store's own handle untouched.
    fn peek_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Cut or extend the store to exactly `len` bytes.
    fn truncate(&mut self, len: u64) -> io::Result<()>;

    /// Current size in bytes.
    fn byte_len(&self) -> io::Result<u64>;

    /// A new, empty store of the same kind and placement.
    fn sibling(&self) -> io::Result<Self>;

    /// A new store holding a full copy of this one's bytes.
    fn duplicate(&self) -> io::Result<Self>;
}

/// Read until `buf` is full or the reader is exhausted.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

// ============================================================================
// File store
// ============================================================================

/// A uniquely named scratch file, deleted when its owner is dropped.
///
/// Moving a `FileStore` moves the delete obligation with it; a copy made by
/// [`duplicate`](BackingStore::duplicate) is a separate file.
pub struct FileStore {
    path: PathBuf,
    file: File,
    scratch: Scratch,
}

impl FileStore {
    /// Create an empty file at the next path `scratch` hands out.
    ///
    /// Fails with `AlreadyExists` rather than reuse a live name.
    pub fn create(scratch: &Scratch) -> io::Result<Self> {
        let path = scratch.next_path();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)?;
        debug!(path = %path.display(), "created backing file");
        Ok(Self {
            path,
            file,
            scratch: scratch.clone(),
        })
    }

    /// Create in the process-wide [`Scratch::shared`] location.
    pub fn scratch() -> io::Result<Self> {
        Self::create(Scratch::shared())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BackingStore for FileStore {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.file.seek(SeekFrom::Start(offset))?;
        read_full(&mut self.file, buf)
    }

    fn write_at(&mut self, offset: u64, buf: &[u8]) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(buf)
    }

    fn peek_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let mut reader = File::open(&self.path)?;
        reader.seek(SeekFrom::Start(offset))?;
        read_full(&mut reader, buf)
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.file.set_len(len)
    }

    fn byte_len(&self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn sibling(&self) -> io::Result<Self> {
        Self::create(&self.scratch)
    }

    fn duplicate(&self) -> io::Result<Self> {
        let mut copy = Self::create(&self.scratch)?;
        let mut source = File::open(&self.path)?;
        let copied = io::copy(&mut source, &mut copy.file)?;
        debug!(
            from = %self.path.display(),
            to = %copy.path.display(),
            bytes = copied,
            "duplicated backing file"
        );
        Ok(copy)
    }
}

impl Drop for FileStore {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed backing file"),
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove backing file"),
        }
    }
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore").field("path", &self.path).finish()
    }
}

// ============================================================================
// Memory store
// ============================================================================

/// Bytes held in memory. Same contract as [`FileStore`], no I/O.
#[derive(Clone, Debug, Default)]
pub struct MemStore {
    bytes: Vec<u8>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn copy_out(&self, offset: u64, buf: &mut [u8]) -> usize {
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(self.bytes.len());
        let n = buf.len().min(self.bytes.len() - start);
        buf[..n].copy_from_slice(&self.bytes[start..start + n]);
        n
    }
}

fn offset_to_usize(offset: u64) -> io::Result<usize> {
    usize::try_from(offset).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, "offset exceeds address space")
    })
}

impl BackingStore for MemStore {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.copy_out(offset, buf))
    }

    fn write_at(&mut self, offset: u64, buf: &[u8]) -> io::Result<()> {
        let start = offset_to_usize(offset)?;
        let end = start + buf.len();
        if self.bytes.len() < end {
            self.bytes.resize(end, 0);
        }
        self.bytes[start..end].copy_from_slice(buf);
        Ok(())
    }

    fn peek_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.copy_out(offset, buf))
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.bytes.resize(offset_to_usize(len)?, 0);
        Ok(())
    }

    fn byte_len(&self) -> io::Result<u64> {
        Ok(self.bytes.len() as u64)
    }

    fn sibling(&self) -> io::Result<Self> {
        Ok(Self::new())
    }

    fn duplicate(&self) -> io::Result<Self> {
        Ok(self.clone())
    }
}
