//! Module implement positions and iterators over [TreeMap].
//!
//! All types in this module walk the tree using parent links and the
//! sentinel, no auxiliary stack is maintained.

use std::iter::FusedIterator;

use crate::{node::NIL, tmap::TreeMap, Error, Result};

/// Cursor is a detached position in a [TreeMap], either on an entry or
/// at the end position just past the largest key.
///
/// Cursor does not borrow the map, every operation takes the map as
/// argument and validates the cursor against it. A cursor remains valid
/// across inserts and across removal of other keys, once its own entry
/// is removed, or the map is cleared, operations fail with
/// [Error::InvalidIterator].
///
/// Removing a key whose node has two children moves its in-order
/// successor's entry into that node, cursors on the successor are
/// invalidated in the process.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Cursor {
    index: usize,
    generation: u64,
}

impl Cursor {
    pub(crate) fn new(index: usize, generation: u64) -> Cursor {
        Cursor { index, generation }
    }

    #[inline]
    pub(crate) fn to_index(&self) -> usize {
        self.index
    }

    #[inline]
    pub(crate) fn to_generation(&self) -> u64 {
        self.generation
    }

    /// Return whether this cursor is the end position.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.index == NIL
    }

    /// Return the entry at this position.
    pub fn get<'a, K, V>(&self, tmap: &'a TreeMap<K, V>) -> Result<(&'a K, &'a V)> {
        let index = tmap.resolve(self)?;
        Ok(tmap.entry_ref(index))
    }

    /// Return the entry at this position, value is mutable in place.
    pub fn get_mut<'a, K, V>(&self, tmap: &'a mut TreeMap<K, V>) -> Result<(&'a K, &'a mut V)> {
        let index = tmap.resolve(self)?;
        Ok(tmap.entry_mut(index))
    }

    /// Move to the next entry in key order, or to the end position when
    /// this is the last entry. Fail if already at the end position.
    pub fn move_next<K, V>(&mut self, tmap: &TreeMap<K, V>) -> Result<()> {
        if self.is_end() {
            return err_at!(InvalidIterator, msg: "move_next() past end");
        }
        let index = tmap.resolve(self)?;
        *self = tmap.cursor_at(tmap.successor(index));
        Ok(())
    }

    /// Move to the previous entry in key order. From the end position
    /// this moves to the last entry. Fail when there is no previous
    /// entry.
    pub fn move_prev<K, V>(&mut self, tmap: &TreeMap<K, V>) -> Result<()> {
        let index = if self.is_end() {
            match tmap.last_index() {
                NIL => return err_at!(InvalidIterator, msg: "move_prev() on empty map"),
                last => last,
            }
        } else {
            match tmap.predecessor(tmap.resolve(self)?) {
                NIL => return err_at!(InvalidIterator, msg: "move_prev() before first"),
                prev => prev,
            }
        };
        *self = tmap.cursor_at(index);
        Ok(())
    }
}

/// Double ended iterator over entries of [TreeMap], refer
/// [TreeMap::iter].
pub struct Iter<'a, K, V> {
    tmap: &'a TreeMap<K, V>,
    front: usize,
    back: usize,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(tmap: &'a TreeMap<K, V>) -> Iter<'a, K, V> {
        Iter {
            tmap,
            front: tmap.first_index(),
            back: tmap.last_index(),
            remaining: tmap.len(),
        }
    }
}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Iter { ..*self }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.front;
        self.front = self.tmap.successor(index);
        self.remaining -= 1;
        Some(self.tmap.entry_ref(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.back;
        self.back = self.tmap.predecessor(index);
        self.remaining -= 1;
        Some(self.tmap.entry_ref(index))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

impl<'a, K, V> FusedIterator for Iter<'a, K, V> {}

/// Iterator over keys of [TreeMap], refer [TreeMap::keys].
pub struct Keys<'a, K, V> {
    iter: Iter<'a, K, V>,
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(crate) fn new(iter: Iter<'a, K, V>) -> Keys<'a, K, V> {
        Keys { iter }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.iter.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for Keys<'a, K, V> {
    fn next_back(&mut self) -> Option<&'a K> {
        self.iter.next_back().map(|(key, _)| key)
    }
}

impl<'a, K, V> ExactSizeIterator for Keys<'a, K, V> {}

/// Iterator over values of [TreeMap], in key order, refer
/// [TreeMap::values].
pub struct Values<'a, K, V> {
    iter: Iter<'a, K, V>,
}

impl<'a, K, V> Values<'a, K, V> {
    pub(crate) fn new(iter: Iter<'a, K, V>) -> Values<'a, K, V> {
        Values { iter }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.iter.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for Values<'a, K, V> {
    fn next_back(&mut self) -> Option<&'a V> {
        self.iter.next_back().map(|(_, value)| value)
    }
}

impl<'a, K, V> ExactSizeIterator for Values<'a, K, V> {}

/// Owning iterator over entries of [TreeMap], in key order.
///
/// Entries are moved out of their slots while the links are left in
/// place, so the walk can go on through parent links.
pub struct IntoIter<K, V> {
    tmap: TreeMap<K, V>,
    front: usize,
    back: usize,
    remaining: usize,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(tmap: TreeMap<K, V>) -> IntoIter<K, V> {
        let (front, back, remaining) = (tmap.first_index(), tmap.last_index(), tmap.len());
        IntoIter {
            tmap,
            front,
            back,
            remaining,
        }
    }

    fn take(&mut self, index: usize) -> (K, V) {
        match self.tmap.take_entry(index) {
            Some(entry) => entry,
            None => panic!("IntoIter: empty slot {} ? Call the programmer", index),
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.front;
        self.front = self.tmap.successor(index);
        self.remaining -= 1;
        Some(self.take(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.back;
        self.back = self.tmap.predecessor(index);
        self.remaining -= 1;
        Some(self.take(index))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

#[cfg(test)]
#[path = "cursor_test.rs"]
mod cursor_test;
