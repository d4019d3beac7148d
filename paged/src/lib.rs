//! Disk-backed growable sequences.
//!
//! A [`PagedVec`] keeps its elements in a [`BackingStore`] (normally a
//! uniquely named scratch file) and caches one contiguous window of at most
//! `W` elements in memory. It is single-threaded and synchronous: every
//! store access blocks the caller.
//!
//! ```
//! use paged::{MemStore, PagedVec};
//!
//! let mut v: PagedVec<u32, MemStore, 2> = PagedVec::new_in(MemStore::new());
//! for x in 1..=5 {
//!     v.emplace(x).unwrap();
//! }
//! assert_eq!(v.fetch(0).unwrap(), 1);
//! assert_eq!(v.get(4).unwrap(), 5);
//! ```

pub mod config;
pub mod element;
pub mod error;
pub mod iter;
pub mod names;
pub mod sequence;
pub mod store;

pub use config::{Scratch, ScratchConfig};
pub use element::Element;
pub use error::{PagedError, Result};
pub use iter::Iter;
pub use names::{NameSource, RandomNames, SequentialNames};
pub use sequence::{PagedVec, DEFAULT_WINDOW};
pub use store::{BackingStore, FileStore, MemStore};
