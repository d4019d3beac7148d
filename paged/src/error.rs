use std::io;

use thiserror::Error;

/// Errors from a [`PagedVec`](crate::PagedVec) and its backing store.
#[derive(Debug, Error)]
pub enum PagedError {
    /// Bounds-checked access past the logical end of the sequence.
    #[error("index {index} is out of range for a sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    /// The backing store failed to open, read, write, copy or truncate.
    #[error("backing store I/O failed: {0}")]
    Storage(#[from] io::Error),
}

impl PagedError {
    /// Whether this is an [`IndexOutOfRange`](PagedError::IndexOutOfRange).
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, PagedError::IndexOutOfRange { .. })
    }
}

pub type Result<T, E = PagedError> = std::result::Result<T, E>;
