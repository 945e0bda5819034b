//! Module provide ordered-map implemented by [TreeMap] type.
//!
//! TreeMap is implemented using classic [red-black][wiki-rb] tree, with
//! parent links and a sentinel node.
//!
//! - Each entry in TreeMap instance correspond to a {Key, Value} pair.
//! - Parametrised over `key-type` and `value-type`.
//! - CRUD operations, via set(), insert_or_assign(), get(), remove() api.
//! - Full table scan, to iterate over all entries.
//! - Reverse iteration.
//! - No Durability guarantee.
//! - Not thread safe.
//!
//! CRUD operations on [TreeMap] instance:
//! ```
//! use rbmap::TreeMap;
//!
//! let mut index: TreeMap<String,String> = TreeMap::new();
//!
//! index.set("key1".to_string(), "value1".to_string());
//! index.set("key2".to_string(), "value2".to_string());
//! *index.insert_or_assign("key2".to_string(), "value3".to_string()) += "!";
//!
//! let n = index.len();
//! assert_eq!(n, 2);
//!
//! assert_eq!(index.get("key1").unwrap(), "value1");
//! assert_eq!(index.get("key2").unwrap(), "value3!");
//!
//! let old_value = index.remove("key1").unwrap();
//! assert_eq!(old_value, "value1".to_string());
//! ```
//!
//! Full table scan, forward and reverse:
//! ```
//! use rbmap::TreeMap;
//!
//! let mut index: TreeMap<String,String> = TreeMap::new();
//! index.set("key1".to_string(), "value1".to_string());
//! index.set("key2".to_string(), "value2".to_string());
//!
//! for (i, (key, value)) in index.iter().enumerate() {
//!     let refkey = format!("key{}", i+1);
//!     let refval = format!("value{}", i+1);
//!     assert_eq!(&refkey, key);
//!     assert_eq!(&refval, value);
//! }
//!
//! let keys: Vec<&String> = index.keys().rev().collect();
//! assert_eq!(keys, vec!["key2", "key1"]);
//! ```
//!
//! [wiki-rb]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree

use log::{debug, trace};

use std::{
    borrow::Borrow,
    cmp::{Ord, Ordering},
    fmt,
    iter::FromIterator,
    mem,
};

use crate::{
    cursor::{Cursor, IntoIter, Iter, Keys, Values},
    node::{Side, Slab, NIL},
    Error, Result,
};

/// TreeMap manage a single instance of in-memory ordered-map using
/// [red-black][rb] tree.
///
/// Nodes are held in an arena and linked by index. The sentinel, slot
/// zero of the arena, is the child of every leaf and the parent of the
/// root. Its parent link caches the right-most node, so that stepping
/// back from [TreeMap::end] is O(1).
///
/// [rb]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree
#[derive(Clone)]
pub struct TreeMap<K, V> {
    slab: Slab<K, V>,
    root: usize,
    n_count: usize, // number of entries in the tree.
}

impl<K, V> Default for TreeMap<K, V> {
    fn default() -> TreeMap<K, V> {
        TreeMap::new()
    }
}

impl<K, V> TreeMap<K, V> {
    /// Create an empty instance of TreeMap.
    pub fn new() -> TreeMap<K, V> {
        TreeMap {
            slab: Slab::new(),
            root: NIL,
            n_count: Default::default(),
        }
    }
}

/// Maintenance API.
impl<K, V> TreeMap<K, V> {
    /// Return number of entries in this instance.
    #[inline]
    pub fn len(&self) -> usize {
        self.n_count
    }

    /// Check whether this index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_count == 0
    }

    /// Remove all entries. Cursors obtained before this call are
    /// invalidated.
    pub fn clear(&mut self) {
        debug!("clear {} entries", self.n_count);
        self.slab.clear();
        self.root = NIL;
        self.n_count = 0;
    }

    /// Number of black nodes on any path from root down to the sentinel,
    /// sentinel excluded.
    pub fn black_height(&self) -> usize {
        let (mut node, mut n_blacks) = (self.root, 0);
        while node != NIL {
            if self.slab[node].is_black() {
                n_blacks += 1;
            }
            node = self.slab[node].left;
        }
        n_blacks
    }

    /// Validate red-black tree with following rules:
    ///
    /// * Sentinel and root are black, root's parent is the sentinel.
    /// * From root to any leaf, no consecutive reds allowed in its path.
    /// * Number of blacks should be same under left child and right child.
    /// * Child's parent link points back to its parent.
    /// * Make sure keys are in strictly increasing order.
    /// * Entry count and cached maximum are up to date.
    pub fn validate(&self) -> Result<()>
    where
        K: Ord + fmt::Debug,
    {
        let sentinel = &self.slab[NIL];
        if !sentinel.is_black() || sentinel.is_live() {
            return err_at!(Fatal, msg: "sentinel must be black and hold no entry");
        }
        if sentinel.left != NIL || sentinel.right != NIL {
            return err_at!(Fatal, msg: "sentinel has children {} {}", sentinel.left, sentinel.right);
        }
        if self.root != NIL {
            if self.slab[self.root].parent != NIL {
                return err_at!(Fatal, msg: "root's parent {}", self.slab[self.root].parent);
            }
            if !self.slab[self.root].is_black() {
                return err_at!(Fatal, msg: "red root");
            }
        }

        let (_, n_count) = self.validate_tree(self.root, NIL, false, 0)?;
        if n_count != self.n_count {
            return err_at!(Fatal, msg: "n_count {} != {}", self.n_count, n_count);
        }

        let max = match self.root {
            NIL => NIL,
            root => self.maximum(root),
        };
        if self.slab[NIL].parent != max {
            return err_at!(Fatal, msg: "cached max {} != {}", self.slab[NIL].parent, max);
        }

        let mut prev: Option<&K> = None;
        for (key, _) in self.iter() {
            match prev {
                Some(prev) if prev.ge(key) => {
                    return err_at!(Fatal, msg: "sort prev:{:?} key:{:?}", prev, key);
                }
                _ => (),
            }
            prev = Some(key);
        }

        Ok(())
    }

    // return (black-height, number-of-nodes) for sub-tree under `node`.
    fn validate_tree(
        &self,
        node: usize,
        parent: usize,
        fromred: bool,
        depth: usize,
    ) -> Result<(usize, usize)> {
        if node == NIL {
            return Ok((0, 0));
        }
        if depth > self.slab.capacity() {
            return err_at!(Fatal, msg: "cycle detected at node {}", node);
        }

        let n = &self.slab[node];
        if !n.is_live() {
            return err_at!(Fatal, msg: "dead slot {} reachable from root", node);
        }
        if n.parent != parent {
            return err_at!(Fatal, msg: "node {} parent {} != {}", node, n.parent, parent);
        }

        let red = !n.is_black();
        if fromred && red {
            return err_at!(Fatal, msg: "consecutive reds at node {}", node);
        }

        let (lblacks, lcount) = self.validate_tree(n.left, node, red, depth + 1)?;
        let (rblacks, rcount) = self.validate_tree(n.right, node, red, depth + 1)?;
        if lblacks != rblacks {
            return err_at!(Fatal, msg: "unbalanced blacks {} {}", lblacks, rblacks);
        }

        let n_blacks = if red { lblacks } else { lblacks + 1 };
        Ok((n_blacks, lcount + rcount + 1))
    }
}

/// Write API.
impl<K, V> TreeMap<K, V> {
    /// Set value for key. If there is an existing entry for key,
    /// overwrite the old value with new value and return the old value.
    pub fn set(&mut self, key: K, value: V) -> Option<V>
    where
        K: Ord,
    {
        let (_, old_value) = self.do_set(key, value);
        old_value
    }

    /// Set value for key and return a mutable reference to the value now
    /// held by the map. Never fails.
    pub fn insert_or_assign(&mut self, key: K, value: V) -> &mut V
    where
        K: Ord,
    {
        let (index, _) = self.do_set(key, value);
        self.entry_mut(index).1
    }

    /// Return a mutable reference to the value for key, inserting
    /// `V::default()` if key is not present.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        K: Ord,
        V: Default,
    {
        let index = match self.lookup(&key) {
            NIL => self.do_set(key, V::default()).0,
            index => index,
        };
        self.entry_mut(index).1
    }

    /// Remove key from this instance and return its value. Return
    /// [Error::KeyNotFound] if key is not present, the map is left
    /// untouched.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.lookup(key) {
            NIL => err_at!(KeyNotFound, msg: "remove() missing key, n_count:{}", self.n_count),
            index => Ok(self.do_remove(index).1),
        }
    }

    /// Remove the entry at cursor position and return it. Fail with
    /// [Error::InvalidIterator] for end position or a stale cursor.
    pub fn remove_at(&mut self, cursor: Cursor) -> Result<(K, V)> {
        let index = self.resolve(&cursor)?;
        Ok(self.do_remove(index))
    }
}

/// Read API.
impl<K, V> TreeMap<K, V> {
    /// Get the value for key. Return [Error::EmptyContainer] if there are
    /// no entries, and [Error::KeyNotFound] if key is not present.
    pub fn get<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if self.n_count == 0 {
            return err_at!(EmptyContainer, msg: "get() on empty map");
        }
        match self.lookup(key) {
            NIL => err_at!(KeyNotFound, msg: "get() missing key, n_count:{}", self.n_count),
            index => Ok(self.entry_ref(index).1),
        }
    }

    /// Mutable variant of [TreeMap::get].
    pub fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if self.n_count == 0 {
            return err_at!(EmptyContainer, msg: "get_mut() on empty map");
        }
        match self.lookup(key) {
            NIL => err_at!(KeyNotFound, msg: "get_mut() missing key, n_count:{}", self.n_count),
            index => Ok(self.entry_mut(index).1),
        }
    }

    /// Check whether key is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.lookup(key) != NIL
    }

    /// Return cursor at key, or the end cursor if key is not present.
    pub fn find<Q>(&self, key: &Q) -> Cursor
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.cursor_at(self.lookup(key))
    }

    /// Cursor at the smallest key, same as [TreeMap::end] when empty.
    pub fn begin(&self) -> Cursor {
        self.cursor_at(self.first_index())
    }

    /// Cursor just past the largest key, that is the sentinel.
    pub fn end(&self) -> Cursor {
        self.cursor_at(NIL)
    }

    /// Return the entry with smallest key.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        match self.first_index() {
            NIL => None,
            index => Some(self.entry_ref(index)),
        }
    }

    /// Return the entry with largest key, O(1).
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        match self.last_index() {
            NIL => None,
            index => Some(self.entry_ref(index)),
        }
    }

    /// Return an iterator over all entries in this instance, in key
    /// order. Iterate in reverse using `iter().rev()`.
    pub fn iter(&self) -> Iter<K, V> {
        Iter::new(self)
    }

    /// Return an iterator over all keys, in order.
    pub fn keys(&self) -> Keys<K, V> {
        Keys::new(self.iter())
    }

    /// Return an iterator over all values, in key order.
    pub fn values(&self) -> Values<K, V> {
        Values::new(self.iter())
    }
}

// Navigation and slot access, shared with cursor module.
impl<K, V> TreeMap<K, V> {
    pub(crate) fn cursor_at(&self, index: usize) -> Cursor {
        Cursor::new(index, self.slab[index].generation)
    }

    // check that cursor refers to a live entry.
    pub(crate) fn resolve(&self, cursor: &Cursor) -> Result<usize> {
        let index = cursor.to_index();
        if index == NIL {
            return err_at!(InvalidIterator, msg: "end position has no entry");
        }
        match self.slab.get(index) {
            Some(node) if node.is_live() && node.generation == cursor.to_generation() => {
                Ok(index)
            }
            Some(_) => err_at!(InvalidIterator, msg: "stale cursor at slot {}", index),
            None => err_at!(InvalidIterator, msg: "cursor slot {} out of bounds", index),
        }
    }

    pub(crate) fn entry_ref(&self, index: usize) -> (&K, &V) {
        match &self.slab[index].entry {
            Some((key, value)) => (key, value),
            None => panic!("entry_ref(): empty slot {} ? Call the programmer", index),
        }
    }

    pub(crate) fn entry_mut(&mut self, index: usize) -> (&K, &mut V) {
        match &mut self.slab[index].entry {
            Some((key, value)) => (&*key, value),
            None => panic!("entry_mut(): empty slot {} ? Call the programmer", index),
        }
    }

    pub(crate) fn take_entry(&mut self, index: usize) -> Option<(K, V)> {
        self.slab.take_entry(index)
    }

    pub(crate) fn first_index(&self) -> usize {
        match self.root {
            NIL => NIL,
            root => self.minimum(root),
        }
    }

    #[cfg(test)]
    pub(crate) fn to_root(&self) -> usize {
        self.root
    }

    #[inline]
    pub(crate) fn last_index(&self) -> usize {
        self.slab[NIL].parent
    }

    // in-order successor, NIL after the last node.
    pub(crate) fn successor(&self, mut node: usize) -> usize {
        let right = self.slab[node].right;
        if right != NIL {
            return self.minimum(right);
        }
        let mut parent = self.slab[node].parent;
        while parent != NIL && node == self.slab[parent].right {
            node = parent;
            parent = self.slab[parent].parent;
        }
        parent
    }

    // in-order predecessor, NIL before the first node.
    pub(crate) fn predecessor(&self, mut node: usize) -> usize {
        let left = self.slab[node].left;
        if left != NIL {
            return self.maximum(left);
        }
        let mut parent = self.slab[node].parent;
        while parent != NIL && node == self.slab[parent].left {
            node = parent;
            parent = self.slab[parent].parent;
        }
        parent
    }

    fn minimum(&self, mut node: usize) -> usize {
        while self.slab[node].left != NIL {
            node = self.slab[node].left;
        }
        node
    }

    fn maximum(&self, mut node: usize) -> usize {
        while self.slab[node].right != NIL {
            node = self.slab[node].right;
        }
        node
    }

    fn lookup<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut node = self.root;
        while node != NIL {
            let nkey: &Q = self.entry_ref(node).0.borrow();
            node = match nkey.cmp(key) {
                Ordering::Less => self.slab[node].right,
                Ordering::Greater => self.slab[node].left,
                Ordering::Equal => return node,
            };
        }
        NIL
    }

    // which side of its parent is `node` hanging from, node must not be
    // the root.
    #[inline]
    fn side_of(&self, node: usize) -> Side {
        let parent = self.slab[node].parent;
        if self.slab[parent].left == node {
            Side::Left
        } else {
            Side::Right
        }
    }

    fn refresh_max(&mut self) {
        let max = match self.root {
            NIL => NIL,
            root => self.maximum(root),
        };
        self.slab[NIL].parent = max;
    }
}

// Tree surgery.
impl<K, V> TreeMap<K, V> {
    fn do_set(&mut self, key: K, value: V) -> (usize, Option<V>)
    where
        K: Ord,
    {
        let (mut parent, mut node, mut side) = (NIL, self.root, Side::Left);
        while node != NIL {
            parent = node;
            side = match self.entry_ref(node).0.cmp(&key) {
                Ordering::Greater => Side::Left,
                Ordering::Less => Side::Right,
                Ordering::Equal => {
                    let old_value = mem::replace(self.entry_mut(node).1, value);
                    return (node, Some(old_value));
                }
            };
            node = self.slab[node].child(side);
        }

        let z = self.slab.alloc(key, value);
        self.slab[z].parent = parent;
        match parent {
            NIL => self.root = z,
            parent => self.slab[parent].set_child(side, z),
        }
        self.insert_fixup(z);
        self.refresh_max();
        self.n_count += 1;

        (z, None)
    }

    fn insert_fixup(&mut self, mut z: usize) {
        while !self.slab[self.slab[z].parent].is_black() {
            // parent is red, hence not the root, grand-parent is real.
            let parent = self.slab[z].parent;
            let grand = self.slab[parent].parent;
            let side = self.side_of(parent);
            let uncle = self.slab[grand].child(side.opposite());

            if !self.slab[uncle].is_black() {
                self.slab[parent].set_black();
                self.slab[uncle].set_black();
                self.slab[grand].set_red();
                z = grand;
            } else {
                if z == self.slab[parent].child(side.opposite()) {
                    z = parent;
                    self.rotate(z, side);
                }
                let parent = self.slab[z].parent;
                let grand = self.slab[parent].parent;
                self.slab[parent].set_black();
                self.slab[grand].set_red();
                self.rotate(grand, side.opposite());
            }
        }
        let root = self.root;
        self.slab[root].set_black();
    }

    // copy-and-splice, the slot physically released is always the one
    // with at most one child.
    fn do_remove(&mut self, z: usize) -> (K, V) {
        let (zleft, zright) = (self.slab[z].left, self.slab[z].right);
        let y = if zleft == NIL || zright == NIL {
            z
        } else {
            self.minimum(zright)
        };
        let y_black = self.slab[y].is_black();

        let x = match self.slab[y].left {
            NIL => self.slab[y].right,
            left => left,
        };
        self.transplant(y, x);

        let entry = if y != z {
            self.slab.move_entry(y, z)
        } else {
            None
        };

        if y_black {
            self.delete_fixup(x);
        }

        trace!("remove slot:{} spliced:{} n_count:{}", z, y, self.n_count);

        let entry = match (entry, self.slab.free(y)) {
            (Some(entry), None) | (None, Some(entry)) => entry,
            _ => panic!("do_remove(): fatal logic, call the programmer"),
        };
        self.n_count -= 1;
        self.refresh_max();

        entry
    }

    // replace sub-tree at `u` with sub-tree at `v`, `v` may be the
    // sentinel in which case its parent link is borrowed for fixup.
    fn transplant(&mut self, u: usize, v: usize) {
        let parent = self.slab[u].parent;
        match parent {
            NIL => self.root = v,
            parent => {
                let side = self.side_of(u);
                self.slab[parent].set_child(side, v);
            }
        }
        self.slab[v].parent = parent;
    }

    fn delete_fixup(&mut self, mut x: usize) {
        while x != self.root && self.slab[x].is_black() {
            let parent = self.slab[x].parent;
            // x can be the sentinel, its sibling is always real.
            let side = if self.slab[parent].left == x {
                Side::Left
            } else {
                Side::Right
            };
            let far = side.opposite();

            let mut w = self.slab[parent].child(far);
            if !self.slab[w].is_black() {
                self.slab[w].set_black();
                self.slab[parent].set_red();
                self.rotate(parent, side);
                w = self.slab[parent].child(far);
            }

            let (wnear, wfar) = (self.slab[w].child(side), self.slab[w].child(far));
            if self.slab[wnear].is_black() && self.slab[wfar].is_black() {
                self.slab[w].set_red();
                x = parent;
            } else {
                if self.slab[wfar].is_black() {
                    self.slab[wnear].set_black();
                    self.slab[w].set_red();
                    self.rotate(w, far);
                    w = self.slab[parent].child(far);
                }
                let black = self.slab[parent].is_black();
                self.slab[w].black = black;
                self.slab[parent].set_black();
                let wfar = self.slab[w].child(far);
                self.slab[wfar].set_black();
                self.rotate(parent, side);
                x = self.root;
            }
        }
        self.slab[x].set_black();
    }

    //  rotate(node, Side::Left)
    //
    //              (i)                       (i)
    //               |                         |
    //              node                       y
    //              /  \                      / \
    //             /    \                    /   \
    //            /      \                  /     \
    //          left      y             node      yr
    //                   / \            /  \
    //                 yl   yr       left   yl
    //
    // Side::Right is the mirror image. No-op if the rising child is the
    // sentinel.
    fn rotate(&mut self, node: usize, side: Side) {
        let rise = side.opposite();
        let y = self.slab[node].child(rise);
        if y == NIL {
            return;
        }

        let inner = self.slab[y].child(side);
        self.slab[node].set_child(rise, inner);
        if inner != NIL {
            self.slab[inner].parent = node;
        }

        let parent = self.slab[node].parent;
        self.slab[y].parent = parent;
        match parent {
            NIL => self.root = y,
            parent => {
                let pside = self.side_of(node);
                self.slab[parent].set_child(pside, y);
            }
        }

        self.slab[y].set_child(side, node);
        self.slab[node].parent = y;
    }
}

impl<K, V> PartialEq for TreeMap<K, V>
where
    K: PartialEq,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K, V> Eq for TreeMap<K, V>
where
    K: Eq,
    V: Eq,
{
}

impl<K, V> fmt::Debug for TreeMap<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Extend<(K, V)> for TreeMap<K, V>
where
    K: Ord,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        iter.into_iter().for_each(|(key, value)| {
            self.set(key, value);
        });
    }
}

impl<K, V> FromIterator<(K, V)> for TreeMap<K, V>
where
    K: Ord,
{
    fn from_iter<I>(iter: I) -> TreeMap<K, V>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut index = TreeMap::new();
        index.extend(iter);
        index
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for TreeMap<K, V>
where
    K: Ord,
{
    fn from(items: [(K, V); N]) -> TreeMap<K, V> {
        IntoIterator::into_iter(items).collect()
    }
}

impl<'a, K, V> IntoIterator for &'a TreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K, V> IntoIterator for TreeMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter::new(self)
    }
}

#[cfg(test)]
#[path = "tmap_test.rs"]
mod tmap_test;
