//! Package implement an ephemeral Ordered Map using classic
//! [red-black][wiki-rb] tree.
//!
//! [TreeMap] keeps its nodes in an arena and addresses them by index.
//! Slot zero of the arena is the *sentinel*, a black node without key that
//! terminates every leaf and acts as the parent of the root. Iteration
//! walks the tree through parent links, hence no auxiliary stack is
//! required to move forward or backward.
//!
//! - Each entry in TreeMap instance correspond to a {Key, Value} pair.
//! - Parametrised over `key-type` and `value-type`.
//! - CRUD operations, via set(), insert_or_assign(), get(), remove() api.
//! - Full table scan, forward and reverse.
//! - Detached [Cursor] positions, that are validated on every use.
//! - Uses ownership model and borrow semantics to ensure safety.
//! - No Durability guarantee.
//! - Not thread safe.
//!
//! Constructing a new [TreeMap] instance and CRUD operations:
//!
//! ```
//! use rbmap::TreeMap;
//!
//! let mut index: TreeMap<String,String> = TreeMap::new();
//! assert_eq!(index.len(), 0);
//! assert_eq!(index.is_empty(), true);
//!
//! index.set("key1".to_string(), "value1".to_string());
//! index.set("key2".to_string(), "value2".to_string());
//!
//! let n = index.len();
//! assert_eq!(n, 2);
//!
//! let value = index.get("key1").unwrap();
//! assert_eq!(value, "value1");
//! let value = index.get("key2").unwrap();
//! assert_eq!(value, "value2");
//!
//! let old_value = index.remove("key1").unwrap();
//! assert_eq!(old_value, "value1".to_string());
//! assert!(index.remove("key1").is_err());
//! ```
//!
//! Walking the map with a cursor:
//!
//! ```
//! use rbmap::TreeMap;
//!
//! let index: TreeMap<u32, u32> = vec![(2, 20), (1, 10), (3, 30)].into_iter().collect();
//!
//! let mut cur = index.begin();
//! let mut keys = vec![];
//! while !cur.is_end() {
//!     let (key, _) = cur.get(&index).unwrap();
//!     keys.push(*key);
//!     cur.move_next(&index).unwrap();
//! }
//! assert_eq!(keys, vec![1, 2, 3]);
//!
//! let mut cur = index.end();
//! cur.move_prev(&index).unwrap();
//! assert_eq!(cur.get(&index).unwrap(), (&3, &30));
//! ```
//!
//! [wiki-rb]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree

use std::{error, fmt, result};

// Short form to compose Error values.
//
// Here are few possible ways:
//
// ```ignore
// use crate::Error;
// err_at!(KeyNotFound, msg: format!("missing key"));
// ```
//
// ```ignore
// use crate::Error;
// err_at!(Fatal, some_result());
// ```
//
// ```ignore
// use crate::Error;
// err_at!(Fatal, some_result(), format!("validate failed"));
// ```
//
macro_rules! err_at {
    ($v:ident, msg: $($arg:expr),+) => {{
        let prefix = format!("{}:{}", file!(), line!());
        Err(Error::$v(prefix, format!($($arg),+)))
    }};
    ($v:ident, $e:expr) => {{
        match $e {
            Ok(val) => Ok(val),
            Err(err) => {
                let prefix = format!("{}:{}", file!(), line!());
                Err(Error::$v(prefix, format!("{}", err)))
            }
        }
    }};
    ($v:ident, $e:expr, $($arg:expr),+) => {{
        match $e {
            Ok(val) => Ok(val),
            Err(err) => {
                let prefix = format!("{}:{}", file!(), line!());
                let msg = format!($($arg),+);
                Err(Error::$v(prefix, format!("{} {}", err, msg)))
            }
        }
    }};
}

mod cursor;
mod node;
mod tmap;

pub use cursor::{Cursor, IntoIter, Iter, Keys, Values};
pub use tmap::TreeMap;

/// Error variants that are returned by this package's API.
///
/// Each variant carries a prefix, typically identifying the
/// error location.
pub enum Error {
    /// Tree structure is broken, returned by [TreeMap::validate].
    Fatal(String, String),
    /// Strict lookup or removal of a key that is not in the map.
    KeyNotFound(String, String),
    /// Cursor is at the end position, moved past a boundary, or stale.
    InvalidIterator(String, String),
    /// Strict lookup on a map with no entries.
    EmptyContainer(String, String),
}

impl Error {
    /// Return true for [Error::KeyNotFound].
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, Error::KeyNotFound(_, _))
    }

    /// Return true for [Error::InvalidIterator].
    pub fn is_invalid_iterator(&self) -> bool {
        matches!(self, Error::InvalidIterator(_, _))
    }

    /// Return true for [Error::EmptyContainer].
    pub fn is_empty_container(&self) -> bool {
        matches!(self, Error::EmptyContainer(_, _))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        use Error::*;

        match self {
            Fatal(p, msg) => write!(f, "{} Fatal: {}", p, msg),
            KeyNotFound(p, msg) => write!(f, "{} KeyNotFound: {}", p, msg),
            InvalidIterator(p, msg) => write!(f, "{} InvalidIterator: {}", p, msg),
            EmptyContainer(p, msg) => write!(f, "{} EmptyContainer: {}", p, msg),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        write!(f, "{}", self)
    }
}

impl error::Error for Error {}

/// Type alias for Result return type, used by this package.
pub type Result<T> = result::Result<T, Error>;
