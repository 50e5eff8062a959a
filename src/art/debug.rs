//! Debugging helpers: structure dump and invariant verification.

use std::fmt;

use super::node::{Node, NODE16_CAP, NODE4_CAP, NODE48_EMPTY};
use super::{ArtTree, KeyLoader};

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Node::Leaf(tid) => return write!(f, "Leaf({tid:#x})"),
            Node::Node4 { .. } => "Node4",
            Node::Node16 { .. } => "Node16",
            Node::Node48 { .. } => "Node48",
            Node::Node256 { .. } => "Node256",
        };
        f.debug_struct(name)
            .field("count", &self.count())
            .field("prefix_len", &self.prefix().len())
            .field("prefix", &self.prefix().inline())
            .finish()
    }
}

impl<L: KeyLoader<K>, const K: usize> ArtTree<L, K> {
    /// Dump the tree structure to stderr.
    pub fn debug_print(&self) {
        match self.root.as_deref() {
            None => eprintln!("(empty tree)"),
            Some(root) => Self::print_node(root, 0, None),
        }
    }

    fn print_node(node: &Node, indent: usize, edge: Option<u8>) {
        let pad = "  ".repeat(indent);
        match edge {
            Some(b) => eprintln!("{pad}[{b:02x}] {node:?}"),
            None => eprintln!("{pad}{node:?}"),
        }
        for (b, child) in node.children_with_bytes() {
            Self::print_node(child, indent + 1, Some(b));
        }
    }

    /// Walk the tree checking structural invariants; returns a description
    /// of every violation found. An empty result means the tree is sound.
    pub fn verify_integrity(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if let Some(root) = self.root.as_deref() {
            self.verify_node(root, 0, &mut issues);
        }
        issues
    }

    fn verify_node(&self, node: &Node, depth: usize, issues: &mut Vec<String>) {
        if node.is_leaf() {
            return;
        }

        let count = node.count();
        if count < 2 {
            issues.push(format!(
                "inner node at depth {depth} has only {count} children"
            ));
        }

        match node {
            Node::Leaf(_) => {}
            Node::Node4 { keys, children, .. } => {
                if children.len() > NODE4_CAP {
                    issues.push(format!("Node4 holds {} children", children.len()));
                }
                Self::check_sorted(&keys[..children.len()], "Node4", depth, issues);
            }
            Node::Node16 { keys, children, .. } => {
                if children.len() > NODE16_CAP {
                    issues.push(format!("Node16 holds {} children", children.len()));
                }
                if children.len() < NODE4_CAP {
                    issues.push(format!(
                        "Node16 at depth {depth} holds {} children, below the shrink point",
                        children.len()
                    ));
                }
                Self::check_sorted(&keys[..children.len()], "Node16", depth, issues);
            }
            Node::Node48 {
                count,
                child_index,
                children,
                ..
            } => {
                let mapped: Vec<usize> = (0..256)
                    .filter(|&b| child_index[b] != NODE48_EMPTY)
                    .collect();
                if mapped.len() != *count as usize {
                    issues.push(format!(
                        "Node48 count {} disagrees with {} mapped bytes",
                        count,
                        mapped.len()
                    ));
                }
                for b in &mapped {
                    let idx = child_index[*b] as usize;
                    if idx >= children.len() || children[idx].is_none() {
                        issues.push(format!("Node48 maps byte {b:#04x} to an empty slot"));
                    }
                }
                let occupied = children.iter().filter(|c| c.is_some()).count();
                if occupied != *count as usize {
                    issues.push(format!(
                        "Node48 holds {} occupied slots for count {}",
                        occupied, count
                    ));
                }
            }
            Node::Node256 {
                count, children, ..
            } => {
                let occupied = children.iter().filter(|c| c.is_some()).count();
                if occupied != *count as usize {
                    issues.push(format!(
                        "Node256 count {} disagrees with {} occupied slots",
                        count, occupied
                    ));
                }
            }
        }

        let prefix = node.prefix();
        if depth + prefix.len() >= K {
            issues.push(format!(
                "prefix of {} bytes at depth {depth} overruns the key width",
                prefix.len()
            ));
            return;
        }
        match node.min_leaf() {
            None => {
                issues.push(format!("inner node at depth {depth} has no descendant leaf"));
                return;
            }
            Some(min_tid) => {
                let min_key = self.loader.load_key(min_tid);
                for (i, &b) in prefix.inline().iter().enumerate() {
                    if min_key[depth + i] != b {
                        issues.push(format!(
                            "inline prefix byte {i} at depth {depth} disagrees with the \
                             smallest descendant key"
                        ));
                    }
                }
            }
        }

        for (edge, child) in node.children_with_bytes() {
            if let Some(child_min) = child.min_leaf() {
                let child_key = self.loader.load_key(child_min);
                if child_key[depth + prefix.len()] != edge {
                    issues.push(format!(
                        "edge byte {edge:#04x} at depth {depth} disagrees with its subtree"
                    ));
                }
            }
            self.verify_node(child, depth + prefix.len() + 1, issues);
        }
    }

    fn check_sorted(keys: &[u8], layout: &str, depth: usize, issues: &mut Vec<String>) {
        if !keys.windows(2).all(|w| w[0] < w[1]) {
            issues.push(format!(
                "{layout} keys at depth {depth} are not strictly ascending: {keys:?}"
            ));
        }
    }
}
