//! Adaptive Radix Tree over fixed-width keys.
//!
//! Based on "The Adaptive Radix Tree: ARTful Indexing for Main-Memory
//! Databases" by Leis et al., 2013.
//!
//! Key features:
//! - Adaptive node sizes (4, 16, 48, 256 children)
//! - Path compression with a nine-byte inline prefix budget
//! - Lazy leaf expansion: leaves store only a tuple identifier, keys are
//!   reconstructed through the embedder's [`KeyLoader`]
//! - An optimistic lookup that skips overlong prefixes and verifies the
//!   key once at the leaf

mod debug;
mod node;

pub use node::MAX_PREFIX_LEN;

pub(crate) use node::{Node, NodeType};

/// Reconstructs the key stored for a tuple identifier.
///
/// The tree keeps no key bytes in its leaves; whenever a full key is needed
/// (overlong-prefix comparison, final lookup verification) it is rebuilt
/// through this hook. Implementations must be pure and deterministic, and
/// must return the key the identifier was inserted under.
pub trait KeyLoader<const K: usize> {
    /// Return the key for tuple id `tid`.
    fn load_key(&self, tid: u64) -> [u8; K];
}

/// Loader for indexes keyed directly by 64-bit integers: the identifier is
/// the key, encoded big-endian so bytewise order matches integer order.
#[derive(Debug, Clone, Copy, Default)]
pub struct U64KeyLoader;

impl KeyLoader<8> for U64KeyLoader {
    fn load_key(&self, tid: u64) -> [u8; 8] {
        tid.to_be_bytes()
    }
}

/// Adapter turning any `Fn(u64) -> [u8; K]` into a [`KeyLoader`].
#[derive(Debug, Clone, Copy)]
pub struct FnKeyLoader<F>(pub F);

impl<F, const K: usize> KeyLoader<K> for FnKeyLoader<F>
where
    F: Fn(u64) -> [u8; K],
{
    fn load_key(&self, tid: u64) -> [u8; K] {
        (self.0)(tid)
    }
}

/// Counts of live nodes per layout, gathered by walking the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArtStats {
    /// Number of `Node4` inner nodes.
    pub node4: usize,
    /// Number of `Node16` inner nodes.
    pub node16: usize,
    /// Number of `Node48` inner nodes.
    pub node48: usize,
    /// Number of `Node256` inner nodes.
    pub node256: usize,
    /// Number of leaves; equals the number of stored keys.
    pub leaves: usize,
}

/// An adaptive radix tree mapping fixed-width `K`-byte keys to `u64` tuple
/// identifiers.
///
/// Keys are compared bytewise; encode them so that bytewise lexicographic
/// order is the order you want (big-endian for unsigned integers). All
/// operations are synchronous and the tree performs no internal locking;
/// wrap it in a lock ([`crate::ArtIndex`] does) for shared access.
pub struct ArtTree<L, const K: usize> {
    root: Option<Box<Node>>,
    loader: L,
    len: usize,
}

impl<L: KeyLoader<K>, const K: usize> ArtTree<L, K> {
    /// Create an empty tree using `loader` to reconstruct leaf keys.
    pub fn new(loader: L) -> Self {
        Self {
            root: None,
            loader,
            len: 0,
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert `key -> tid`. Returns the previously stored identifier when
    /// the key was already present; the loader must map the new identifier
    /// to the same key in that case.
    pub fn insert(&mut self, key: &[u8; K], tid: u64) -> Option<u64> {
        let Some(root) = self.root.as_mut() else {
            self.root = Some(Box::new(Node::Leaf(tid)));
            self.len = 1;
            return None;
        };
        let old = Self::insert_rec(&self.loader, root, key, 0, tid);
        if old.is_none() {
            self.len += 1;
        }
        old
    }

    fn insert_rec(
        loader: &L,
        node: &mut Box<Node>,
        key: &[u8; K],
        mut depth: usize,
        tid: u64,
    ) -> Option<u64> {
        if let Node::Leaf(existing) = **node {
            let existing_key = loader.load_key(existing);
            if existing_key == *key {
                **node = Node::Leaf(tid);
                return Some(existing);
            }
            // Two distinct keys collide on this slot: branch them under a
            // Node4 holding the span they still share.
            let common = existing_key[depth..]
                .iter()
                .zip(key[depth..].iter())
                .take_while(|(a, b)| a == b)
                .count();
            let mut branch = Node::new_node4();
            branch.prefix_mut().set(common, &key[depth..]);
            let existing_leaf = std::mem::replace(node, Box::new(branch));
            node.add_child(existing_key[depth + common], existing_leaf);
            node.add_child(key[depth + common], Box::new(Node::Leaf(tid)));
            return None;
        }

        let prefix_len = node.prefix().len();
        if prefix_len > 0 {
            let mismatch = Self::prefix_mismatch(loader, node, key, depth);
            if mismatch < prefix_len {
                // The key diverges inside the compressed path: split it,
                // keeping the matched span on a fresh Node4 above this node.
                let mut branch = Node::new_node4();
                branch.prefix_mut().set(mismatch, node.prefix().inline());
                let edge = if prefix_len <= MAX_PREFIX_LEN {
                    let edge = node.prefix().byte(mismatch);
                    node.prefix_mut().strip_front(mismatch + 1);
                    edge
                } else {
                    // The divergence point is past the inline bytes; pull
                    // the true prefix back out of a descendant leaf.
                    let min_tid = node
                        .min_leaf()
                        .expect("inner node always holds a leaf");
                    let min_key = loader.load_key(min_tid);
                    node.prefix_mut()
                        .set(prefix_len - (mismatch + 1), &min_key[depth + mismatch + 1..]);
                    min_key[depth + mismatch]
                };
                let demoted = std::mem::replace(node, Box::new(branch));
                node.add_child(edge, demoted);
                node.add_child(key[depth + mismatch], Box::new(Node::Leaf(tid)));
                return None;
            }
            depth += prefix_len;
        }

        match node.find_child_mut(key[depth]) {
            Some(child) => Self::insert_rec(loader, child, key, depth + 1, tid),
            None => {
                node.add_child_grow(key[depth], Box::new(Node::Leaf(tid)));
                None
            }
        }
    }

    /// Remove `key`, returning its identifier if it was present.
    pub fn erase(&mut self, key: &[u8; K]) -> Option<u64> {
        let Some(root) = self.root.as_mut() else {
            return None;
        };
        let removed = match **root {
            Node::Leaf(tid) => {
                if Self::leaf_matches(&self.loader, tid, key, 0) {
                    self.root = None;
                    Some(tid)
                } else {
                    None
                }
            }
            _ => Self::erase_rec(&self.loader, root, key, 0),
        };
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    fn erase_rec(loader: &L, node: &mut Box<Node>, key: &[u8; K], mut depth: usize) -> Option<u64> {
        let prefix_len = node.prefix().len();
        if prefix_len > 0 {
            if Self::prefix_mismatch(loader, node, key, depth) != prefix_len {
                return None;
            }
            depth += prefix_len;
        }
        let byte = key[depth];
        let leaf_child = match node.find_child(byte) {
            None => return None,
            Some(Node::Leaf(tid)) => Some(*tid),
            Some(_) => None,
        };
        match leaf_child {
            Some(tid) => {
                if !Self::leaf_matches(loader, tid, key, depth) {
                    return None;
                }
                node.remove_child(byte);
                Some(tid)
            }
            None => {
                let child = node.find_child_mut(byte)?;
                Self::erase_rec(loader, child, key, depth + 1)
            }
        }
    }

    /// Look up `key`, optimistic variant: inline prefixes are compared
    /// during the descent, overlong ones are skipped, and a single full-key
    /// comparison at the leaf settles the result.
    pub fn lookup(&self, key: &[u8; K]) -> Option<u64> {
        let mut node = self.root.as_deref()?;
        let mut depth = 0;
        let mut skipped_prefix = false;
        loop {
            if let Node::Leaf(tid) = *node {
                if !skipped_prefix && depth == K {
                    return Some(tid);
                }
                let leaf_key = self.loader.load_key(tid);
                let from = if skipped_prefix { 0 } else { depth };
                return if leaf_key[from..] == key[from..] {
                    Some(tid)
                } else {
                    None
                };
            }
            let prefix = node.prefix();
            let prefix_len = prefix.len();
            if prefix_len > 0 {
                if prefix_len <= MAX_PREFIX_LEN {
                    if prefix.inline() != &key[depth..depth + prefix_len] {
                        return None;
                    }
                } else {
                    skipped_prefix = true;
                }
                depth += prefix_len;
            }
            node = node.find_child(key[depth])?;
            depth += 1;
        }
    }

    /// Look up `key`, pessimistic variant: every prefix is verified in
    /// full, reconstructing overlong ones from a descendant leaf. Kept as
    /// the reference oracle for the optimistic path.
    pub fn lookup_pessimistic(&self, key: &[u8; K]) -> Option<u64> {
        let mut node = self.root.as_deref()?;
        let mut depth = 0;
        loop {
            if let Node::Leaf(tid) = *node {
                return if Self::leaf_matches(&self.loader, tid, key, depth) {
                    Some(tid)
                } else {
                    None
                };
            }
            let prefix_len = node.prefix().len();
            if Self::prefix_mismatch(&self.loader, node, key, depth) != prefix_len {
                return None;
            }
            depth += prefix_len;
            node = node.find_child(key[depth])?;
            depth += 1;
        }
    }

    /// Tuple id of the lexicographically smallest stored key.
    pub fn minimum(&self) -> Option<u64> {
        self.root.as_deref()?.min_leaf()
    }

    /// Tuple id of the lexicographically largest stored key.
    pub fn maximum(&self) -> Option<u64> {
        self.root.as_deref()?.max_leaf()
    }

    /// Count live nodes per layout.
    pub fn stats(&self) -> ArtStats {
        let mut stats = ArtStats::default();
        if let Some(root) = self.root.as_deref() {
            Self::collect_stats(root, &mut stats);
        }
        stats
    }

    fn collect_stats(node: &Node, stats: &mut ArtStats) {
        match node.node_type() {
            NodeType::Leaf => {
                stats.leaves += 1;
                return;
            }
            NodeType::Node4 => stats.node4 += 1,
            NodeType::Node16 => stats.node16 += 1,
            NodeType::Node48 => stats.node48 += 1,
            NodeType::Node256 => stats.node256 += 1,
        }
        for (_, child) in node.children_with_bytes() {
            Self::collect_stats(child, stats);
        }
    }

    /// Position of the first byte where `key` (from `depth`) and the node's
    /// compressed path disagree, or the full prefix length if they match.
    /// Bytes past the inline budget are recovered from the smallest leaf
    /// under the node.
    fn prefix_mismatch(loader: &L, node: &Node, key: &[u8; K], depth: usize) -> usize {
        let prefix = node.prefix();
        let len = prefix.len();
        for (pos, &b) in prefix.inline().iter().enumerate() {
            if key[depth + pos] != b {
                return pos;
            }
        }
        if len > MAX_PREFIX_LEN {
            let min_tid = node.min_leaf().expect("inner node always holds a leaf");
            let min_key = loader.load_key(min_tid);
            for pos in MAX_PREFIX_LEN..len {
                if key[depth + pos] != min_key[depth + pos] {
                    return pos;
                }
            }
        }
        len
    }

    fn leaf_matches(loader: &L, tid: u64, key: &[u8; K], depth: usize) -> bool {
        if depth == K {
            return true;
        }
        let leaf_key = loader.load_key(tid);
        leaf_key[depth..] == key[depth..]
    }
}

impl<L: KeyLoader<K> + Default, const K: usize> Default for ArtTree<L, K> {
    fn default() -> Self {
        Self::new(L::default())
    }
}
