//! Growable sequence of fixed-size elements kept in a backing store, with a
//! single in-memory window batching reads and writes.
//!
//! Two access paths with different window behavior:
//!
//! - Mutable access ([`at`](PagedVec::at), [`slot_mut`](PagedVec::slot_mut),
//!   [`fetch`](PagedVec::fetch), [`emplace`](PagedVec::emplace)) moves the
//!   window: the whole window is written back, then up to `W` elements around
//!   the requested index are loaded.
//! - Read-only access ([`get`](PagedVec::get), [`read_into`](PagedVec::read_into),
//!   [`iter`](PagedVec::iter)) never moves the window. Elements outside it are
//!   read straight from the store through an independent handle.

use std::fmt;
use std::io;
use std::ops::Range;

use tracing::trace;

use crate::element::{decode_all, encode_all, Element};
use crate::error::{PagedError, Result};
use crate::iter::Iter;
use crate::store::{BackingStore, FileStore};
use crate::config::Scratch;

/// Window capacity used when none is given.
pub const DEFAULT_WINDOW: usize = 100;

#[inline]
fn byte_offset<T: Element>(idx: usize) -> u64 {
    idx as u64 * T::SIZE as u64
}

/// A disk-backed vector. See the [module docs](self) for the access paths.
///
/// Invariant: `window_len == min(W, len - window_start)` whenever
/// `window_start <= len`, and `0` otherwise. So an index below `len` is
/// cached exactly when it lies in `[window_start, window_start + W)`.
pub struct PagedVec<T: Element, S: BackingStore = FileStore, const W: usize = { DEFAULT_WINDOW }> {
    store: S,
    window: Box<[T]>,
    window_start: usize,
    window_len: usize,
    len: usize,
}

impl<T: Element> PagedVec<T> {
    /// Empty sequence in a fresh file under the default scratch location.
    pub fn new() -> Result<Self> {
        Ok(Self::new_in(FileStore::scratch()?))
    }
}

impl<T: Element, const W: usize> PagedVec<T, FileStore, W> {
    /// Empty sequence in a fresh file under `scratch`.
    pub fn new_in_scratch(scratch: &Scratch) -> Result<Self> {
        Ok(Self::new_in(FileStore::create(scratch)?))
    }
}

impl<T: Element, S: BackingStore, const W: usize> PagedVec<T, S, W> {
    const NONZERO_WINDOW: () = assert!(W > 0, "window capacity must be non-zero");

    /// Empty sequence over `store`. Any bytes already in the store are
    /// treated as unused space.
    pub fn new_in(store: S) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NONZERO_WINDOW;
        Self {
            store,
            window: vec![T::default(); W].into_boxed_slice(),
            window_start: 0,
            window_len: 0,
            len: 0,
        }
    }

    /// Sequence holding `items`, in order.
    pub fn from_iter_in<I>(store: S, items: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let mut vec = Self::new_in(store);
        for item in items {
            vec.emplace(item)?;
        }
        Ok(vec)
    }

    /// Empty sequence in a new store next to this one's.
    pub fn sibling(&self) -> Result<Self> {
        Ok(Self::new_in(self.store.sibling()?))
    }

    /// Deep copy: the window is copied and the store's bytes are duplicated
    /// into a new store. Linear in the store size.
    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            store: self.store.duplicate()?,
            window: self.window.clone(),
            window_start: self.window_start,
            window_len: self.window_len,
            len: self.len,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn window_capacity() -> usize {
        W
    }

    /// Indices currently cached in memory.
    #[inline]
    pub fn window(&self) -> Range<usize> {
        self.window_start..self.window_start + self.window_len
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[inline]
    fn in_window(&self, idx: usize) -> bool {
        idx >= self.window_start && idx < self.window_start + self.window_len
    }

    // ========================================================================
    // Window management
    // ========================================================================

    /// Write the whole window back to the store. There is no dirty tracking.
    pub fn flush(&mut self) -> Result<()> {
        if self.window_len == 0 {
            return Ok(());
        }
        let mut bytes = Vec::new();
        encode_all(&self.window[..self.window_len], &mut bytes);
        self.store
            .write_at(byte_offset::<T>(self.window_start), &bytes)?;
        trace!(
            window_start = self.window_start,
            window_len = self.window_len,
            "flushed window"
        );
        Ok(())
    }

    /// Flush, then load the window so that it covers `idx`.
    ///
    /// An index less than one window below the current start gets a window
    /// ending at `idx`, so descending scans reload once per `W` elements
    /// just like ascending ones.
    fn reload_for(&mut self, idx: usize) -> Result<()> {
        self.flush()?;
        self.load_from(self.aligned_start(idx))?;
        trace!(
            requested = idx,
            window_start = self.window_start,
            window_len = self.window_len,
            "reloaded window"
        );
        Ok(())
    }

    fn aligned_start(&self, idx: usize) -> usize {
        if idx < self.window_start && self.window_start - idx < W {
            (idx + 1).saturating_sub(W)
        } else {
            idx
        }
    }

    /// Load up to `W` elements starting at `start` (fewer near the end).
    fn load_from(&mut self, start: usize) -> Result<()> {
        let count = W.min(self.len.saturating_sub(start));
        if count > 0 {
            let mut bytes = vec![0u8; count * T::SIZE];
            let read = self.store.read_at(byte_offset::<T>(start), &mut bytes)?;
            if read < bytes.len() {
                return Err(short_read(start + read / T::SIZE));
            }
            decode_all(&bytes, &mut self.window[..count]);
        }
        self.window_start = start;
        self.window_len = count;
        Ok(())
    }

    fn window_slot(&mut self, idx: usize) -> Result<&mut T> {
        if !self.in_window(idx) {
            self.reload_for(idx)?;
        }
        Ok(&mut self.window[idx - self.window_start])
    }

    // ========================================================================
    // Mutable access path
    // ========================================================================

    /// Bounds-checked mutable access. Moves the window if `idx` is outside it.
    pub fn at(&mut self, idx: usize) -> Result<&mut T> {
        if idx >= self.len {
            return Err(PagedError::IndexOutOfRange {
                index: idx,
                len: self.len,
            });
        }
        self.window_slot(idx)
    }

    /// Mutable access without an error for bad indices.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= len()`. Growth goes through [`emplace`](Self::emplace).
    pub fn slot_mut(&mut self, idx: usize) -> Result<&mut T> {
        assert!(
            idx < self.len,
            "slot_mut index {idx} out of range for length {}",
            self.len
        );
        self.window_slot(idx)
    }

    /// Copy of element `idx` through the mutable path.
    pub fn fetch(&mut self, idx: usize) -> Result<T> {
        self.at(idx).map(|v| *v)
    }

    /// Overwrite element `idx` through the mutable path.
    pub fn set(&mut self, idx: usize, value: T) -> Result<()> {
        *self.at(idx)? = value;
        Ok(())
    }

    /// Append one element.
    pub fn emplace(&mut self, value: T) -> Result<()> {
        let idx = self.len;
        if idx < self.window_start || idx >= self.window_start + W {
            self.flush()?;
            self.load_from(self.aligned_start(idx))?;
            trace!(
                requested = idx,
                window_start = self.window_start,
                window_len = self.window_len,
                "reloaded window for append"
            );
        }
        let offset = idx - self.window_start;
        self.window[offset] = value;
        self.window_len = offset + 1;
        self.len += 1;
        Ok(())
    }

    /// Drop the last element. No-op when empty; never touches the store.
    pub fn pop_back(&mut self) {
        if self.len == 0 {
            return;
        }
        self.truncate(self.len - 1);
    }

    /// Shorten to `len` elements (no-op if already shorter). No I/O.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        self.len = len;
        self.window_len = self.window_len.min(len.saturating_sub(self.window_start));
    }

    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Release store space past the logical end.
    pub fn shrink_to_fit(&mut self) -> Result<()> {
        self.store.truncate(byte_offset::<T>(self.len))?;
        Ok(())
    }

    /// Copy `items` in starting at `at`, overwriting existing elements and
    /// appending once the end is reached.
    pub fn insert_from<I>(&mut self, at: usize, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        if at > self.len {
            return Err(PagedError::IndexOutOfRange {
                index: at,
                len: self.len,
            });
        }
        let mut pos = at;
        for item in items {
            if pos == self.len {
                self.emplace(item)?;
            } else {
                *self.window_slot(pos)? = item;
            }
            pos += 1;
        }
        Ok(())
    }

    /// [`insert_from`](Self::insert_from) with a range of another sequence,
    /// read through its read-only path.
    pub fn insert_range<S2, const W2: usize>(
        &mut self,
        at: usize,
        source: &PagedVec<T, S2, W2>,
        range: Range<usize>,
    ) -> Result<()>
    where
        S2: BackingStore,
    {
        if range.end > source.len() {
            return Err(PagedError::IndexOutOfRange {
                index: range.end,
                len: source.len(),
            });
        }
        if at > self.len {
            return Err(PagedError::IndexOutOfRange {
                index: at,
                len: self.len,
            });
        }
        let mut chunk = vec![T::default(); W2.max(1)];
        let mut pos = at;
        let mut next = range.start;
        while next < range.end {
            let want = chunk.len().min(range.end - next);
            let got = source.read_into(next, &mut chunk[..want])?;
            self.insert_from(pos, chunk[..got].iter().copied())?;
            pos += got;
            next += got;
        }
        Ok(())
    }

    /// Visit every element in ascending order through the mutable path.
    pub fn update_each<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(usize, &mut T),
    {
        for idx in 0..self.len {
            f(idx, self.window_slot(idx)?);
        }
        Ok(())
    }

    // ========================================================================
    // Read-only access path
    // ========================================================================

    /// Read element `idx` without moving the window.
    pub fn get(&self, idx: usize) -> Result<T> {
        if idx >= self.len {
            return Err(PagedError::IndexOutOfRange {
                index: idx,
                len: self.len,
            });
        }
        if self.in_window(idx) {
            return Ok(self.window[idx - self.window_start]);
        }
        let mut bytes = vec![0u8; T::SIZE];
        let read = self.store.peek_at(byte_offset::<T>(idx), &mut bytes)?;
        if read < T::SIZE {
            return Err(short_read(idx));
        }
        Ok(T::decode(&bytes))
    }

    /// Last element, if any, through the read-only path.
    pub fn last(&self) -> Result<Option<T>> {
        match self.len {
            0 => Ok(None),
            n => self.get(n - 1).map(Some),
        }
    }

    /// Fill `out` with elements from `start` onward without moving the
    /// window. Returns how many were written (short at the end).
    pub fn read_into(&self, start: usize, out: &mut [T]) -> Result<usize> {
        if start > self.len {
            return Err(PagedError::IndexOutOfRange {
                index: start,
                len: self.len,
            });
        }
        let count = out.len().min(self.len - start);
        if count == 0 {
            return Ok(0);
        }
        let mut bytes = vec![0u8; count * T::SIZE];
        let read = self.store.peek_at(byte_offset::<T>(start), &mut bytes)?;
        let decoded = decode_all(&bytes[..read - read % T::SIZE], &mut out[..count]);

        // The window is newer than the store wherever they overlap.
        let overlap_start = start.max(self.window_start);
        let overlap_end = (start + count).min(self.window_start + self.window_len);
        for idx in overlap_start..overlap_end {
            out[idx - start] = self.window[idx - self.window_start];
        }

        // Anything the store could not supply must have come from the window.
        for idx in start + decoded..start + count {
            if !self.in_window(idx) {
                return Err(short_read(idx));
            }
        }
        Ok(count)
    }

    /// Ascending read-only iterator; reverse it with `.rev()`.
    pub fn iter(&self) -> Iter<'_, T, S, W> {
        Iter::new(self)
    }

    /// Every element, in order, through the read-only path.
    pub fn to_vec(&self) -> Result<Vec<T>> {
        let mut out = vec![T::default(); self.len];
        self.read_into(0, &mut out)?;
        Ok(out)
    }
}

fn short_read(idx: usize) -> PagedError {
    PagedError::Storage(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("backing store ends before element {idx}"),
    ))
}

impl<T, S, const W: usize> fmt::Debug for PagedVec<T, S, W>
where
    T: Element + fmt::Debug,
    S: BackingStore,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagedVec")
            .field("len", &self.len)
            .field("window", &self.window())
            .field("cached", &&self.window[..self.window_len])
            .finish()
    }
}
