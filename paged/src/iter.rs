use std::iter::FusedIterator;

use crate::element::Element;
use crate::error::Result;
use crate::sequence::PagedVec;
use crate::store::BackingStore;

/// Read-only cursor over a [`PagedVec`].
///
/// Holds only the container reference and two indices. Every step goes
/// back through [`PagedVec::get`], so the container's window never moves.
pub struct Iter<'a, T: Element, S: BackingStore, const W: usize> {
    vec: &'a PagedVec<T, S, W>,
    front: usize,
    back: usize,
}

impl<'a, T: Element, S: BackingStore, const W: usize> Iter<'a, T, S, W> {
    pub(crate) fn new(vec: &'a PagedVec<T, S, W>) -> Self {
        Self {
            vec,
            front: 0,
            back: vec.len(),
        }
    }

    /// Index the next call to `next` will read.
    pub fn position(&self) -> usize {
        self.front
    }
}

impl<T: Element, S: BackingStore, const W: usize> Iterator for Iter<'_, T, S, W> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let item = self.vec.get(self.front);
        self.front += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.front = self.front.saturating_add(n).min(self.back);
        self.next()
    }
}

impl<T: Element, S: BackingStore, const W: usize> DoubleEndedIterator for Iter<'_, T, S, W> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.vec.get(self.back))
    }
}

impl<T: Element, S: BackingStore, const W: usize> ExactSizeIterator for Iter<'_, T, S, W> {}

impl<T: Element, S: BackingStore, const W: usize> FusedIterator for Iter<'_, T, S, W> {}

impl<'a, T: Element, S: BackingStore, const W: usize> IntoIterator for &'a PagedVec<T, S, W> {
    type Item = Result<T>;
    type IntoIter = Iter<'a, T, S, W>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
