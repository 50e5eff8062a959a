//! # art-index
//!
//! An in-memory ordered index mapping fixed-width keys to `u64` tuple
//! identifiers, implemented as an Adaptive Radix Tree (ART).
//!
//! Based on "The Adaptive Radix Tree: ARTful Indexing for Main-Memory
//! Databases" (ICDE 2013, Leis et al.)
//!
//! ## Design
//!
//! - **Adaptive nodes**: inner nodes morph between four layouts sized for
//!   4, 16, 48 and 256 children, so every node pays for the fanout it has.
//! - **Path compression**: one-way chains fold into a per-node prefix with
//!   a nine-byte inline budget; longer prefixes are reconstructed lazily
//!   from a descendant leaf.
//! - **Lazy leaf expansion**: a leaf is just the tuple identifier. The
//!   embedder supplies a [`KeyLoader`] that maps identifiers back to their
//!   keys whenever a full comparison is needed.
//!
//! ## Example
//!
//! ```rust
//! use art_index::{ArtTree, U64KeyLoader};
//!
//! let mut tree: ArtTree<U64KeyLoader, 8> = ArtTree::new(U64KeyLoader);
//! tree.insert(&42u64.to_be_bytes(), 42);
//! tree.insert(&7u64.to_be_bytes(), 7);
//!
//! assert_eq!(tree.lookup(&42u64.to_be_bytes()), Some(42));
//! assert_eq!(tree.minimum(), Some(7));
//! tree.erase(&42u64.to_be_bytes());
//! assert_eq!(tree.lookup(&42u64.to_be_bytes()), None);
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod art;

#[cfg(test)]
mod proptests;

pub use art::{ArtStats, ArtTree, FnKeyLoader, KeyLoader, U64KeyLoader, MAX_PREFIX_LEN};

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

/// A shared-access wrapper around [`ArtTree`].
///
/// The tree itself performs no internal locking; concurrent callers are
/// expected to put a lock around it. This type is that lock, packaged: a
/// reader-writer lock over the tree plus a lock-free length counter so size
/// queries never contend with writers.
pub struct ArtIndex<L, const K: usize> {
    inner: RwLock<ArtTree<L, K>>,
    len: AtomicUsize,
}

impl<L: KeyLoader<K>, const K: usize> ArtIndex<L, K> {
    /// Create an empty index using `loader` to reconstruct leaf keys.
    pub fn new(loader: L) -> Self {
        Self {
            inner: RwLock::new(ArtTree::new(loader)),
            len: AtomicUsize::new(0),
        }
    }

    /// Insert `key -> tid`, returning the previous id for the key if any.
    pub fn insert(&self, key: &[u8; K], tid: u64) -> Option<u64> {
        let old = self.inner.write().insert(key, tid);
        if old.is_none() {
            self.len.fetch_add(1, Ordering::Relaxed);
        }
        old
    }

    /// Look up `key`.
    pub fn lookup(&self, key: &[u8; K]) -> Option<u64> {
        self.inner.read().lookup(key)
    }

    /// Remove `key`, returning its id if it was present.
    pub fn erase(&self, key: &[u8; K]) -> Option<u64> {
        let removed = self.inner.write().erase(key);
        if removed.is_some() {
            self.len.fetch_sub(1, Ordering::Relaxed);
        }
        removed
    }

    /// Tuple id of the smallest stored key.
    pub fn minimum(&self) -> Option<u64> {
        self.inner.read().minimum()
    }

    /// Tuple id of the largest stored key.
    pub fn maximum(&self) -> Option<u64> {
        self.inner.read().maximum()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count live nodes per layout.
    pub fn stats(&self) -> ArtStats {
        self.inner.read().stats()
    }
}

impl<L: KeyLoader<K> + Default, const K: usize> Default for ArtIndex<L, K> {
    fn default() -> Self {
        Self::new(L::default())
    }
}
