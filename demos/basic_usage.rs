//! Basic usage of the tree with 64-bit integer keys.

use art_index::{ArtTree, U64KeyLoader};

fn main() {
    let mut tree: ArtTree<U64KeyLoader, 8> = ArtTree::new(U64KeyLoader);

    for k in [5u64, 1, 9, 1 << 40, u64::MAX] {
        tree.insert(&k.to_be_bytes(), k);
    }

    println!("len = {}", tree.len());
    println!("min = {:?}", tree.minimum());
    println!("max = {:?}", tree.maximum());
    println!("lookup 9 -> {:?}", tree.lookup(&9u64.to_be_bytes()));

    tree.erase(&9u64.to_be_bytes());
    println!("lookup 9 after erase -> {:?}", tree.lookup(&9u64.to_be_bytes()));

    println!("node layout counts: {:?}", tree.stats());
}
