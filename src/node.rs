//! Arena storage for tree nodes.
//!
//! Nodes refer to each other by slot index. Slot [NIL] is the sentinel,
//! it is black, never holds an entry, and lives as long as the arena.

use std::mem;

/// Index of the sentinel node.
pub const NIL: usize = 0;

/// Direction of a child link, used to fold mirrored tree surgery into
/// a single routine.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

// Node corresponds to a single entry in TreeMap instance.
#[derive(Clone)]
pub struct Node<K, V> {
    pub entry: Option<(K, V)>, // None for sentinel and free slots.
    pub black: bool,           // store: black or red
    pub parent: usize,
    pub left: usize,
    pub right: usize,
    pub generation: u64, // bumped when the entry in this slot dies.
}

impl<K, V> Node<K, V> {
    fn new_sentinel() -> Node<K, V> {
        Node {
            entry: None,
            black: true,
            parent: NIL,
            left: NIL,
            right: NIL,
            generation: 0,
        }
    }

    #[inline]
    pub fn child(&self, side: Side) -> usize {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub fn set_child(&mut self, side: Side, child: usize) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    #[inline]
    pub fn set_red(&mut self) {
        self.black = false
    }

    #[inline]
    pub fn set_black(&mut self) {
        self.black = true
    }

    #[inline]
    pub fn is_black(&self) -> bool {
        self.black
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.entry.is_some()
    }
}

/// Slab of nodes, slot [NIL] reserved for the sentinel. Freed slots are
/// recycled, their generation is bumped on every free so that stale
/// cursors can be detected.
#[derive(Clone)]
pub struct Slab<K, V> {
    nodes: Vec<Node<K, V>>,
    free: Vec<usize>,
}

impl<K, V> Slab<K, V> {
    pub fn new() -> Slab<K, V> {
        Slab {
            nodes: vec![Node::new_sentinel()],
            free: Vec::default(),
        }
    }

    /// Allocate a red node for `{key, value}`, with all links pointing to
    /// the sentinel.
    pub fn alloc(&mut self, key: K, value: V) -> usize {
        match self.free.pop() {
            Some(index) => {
                let node = &mut self.nodes[index];
                node.entry = Some((key, value));
                node.black = false;
                node.parent = NIL;
                node.left = NIL;
                node.right = NIL;
                index
            }
            None => {
                self.nodes.push(Node {
                    entry: Some((key, value)),
                    black: false,
                    parent: NIL,
                    left: NIL,
                    right: NIL,
                    generation: 0,
                });
                self.nodes.len() - 1
            }
        }
    }

    /// Release slot `index` back to the slab and return its entry.
    pub fn free(&mut self, index: usize) -> Option<(K, V)> {
        if index == NIL {
            panic!("free(): releasing the sentinel ? Call the programmer");
        }
        let node = &mut self.nodes[index];
        let entry = node.entry.take();
        node.generation = node.generation.wrapping_add(1);
        node.parent = NIL;
        node.left = NIL;
        node.right = NIL;
        self.free.push(index);
        entry
    }

    /// Move the entry held by `from` into `to`, return the entry that was
    /// displaced from `to`. The generation of `to` is bumped, its content
    /// now belongs to a different key.
    pub fn move_entry(&mut self, from: usize, to: usize) -> Option<(K, V)> {
        let entry = self.nodes[from].entry.take();
        let node = &mut self.nodes[to];
        node.generation = node.generation.wrapping_add(1);
        mem::replace(&mut node.entry, entry)
    }

    /// Drop every entry and recycle every slot, sentinel excluded.
    pub fn clear(&mut self) {
        self.free.clear();
        for (index, node) in self.nodes.iter_mut().enumerate().skip(1) {
            if node.entry.take().is_some() {
                node.generation = node.generation.wrapping_add(1);
            }
            node.black = false;
            node.parent = NIL;
            node.left = NIL;
            node.right = NIL;
            self.free.push(index);
        }
        self.nodes[NIL].parent = NIL;
    }

    /// Number of slots, sentinel and free slots included.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Return the node at `index`, None if out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Node<K, V>> {
        self.nodes.get(index)
    }

    /// Take the entry out of slot `index`, links are left untouched.
    pub fn take_entry(&mut self, index: usize) -> Option<(K, V)> {
        self.nodes[index].entry.take()
    }
}

impl<K, V> std::ops::Index<usize> for Slab<K, V> {
    type Output = Node<K, V>;

    #[inline]
    fn index(&self, index: usize) -> &Node<K, V> {
        &self.nodes[index]
    }
}

impl<K, V> std::ops::IndexMut<usize> for Slab<K, V> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Node<K, V> {
        &mut self.nodes[index]
    }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
