use std::{fmt, str::FromStr};

use bincode::{Decode, Encode};

use crate::{
    hash::{combine, Hash, MerkleHasher},
    parallel::combine_level,
};

/// How the sorted leaves are arranged into internal nodes.
///
/// Both layouts produce `n - 1` internal nodes with exactly two children
/// each and never duplicate a leaf. They differ in which nodes get paired
/// when a level has an odd count, so they produce different roots for
/// most leaf counts that are not powers of two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Encode, Decode)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum TreeLayout {
    /// Complete binary tree stored in heap order. Node `k` has children
    /// `2k + 1` and `2k + 2`, and sorted leaf `i` lives at node
    /// `2n - 2 - i`. Roots and proofs match the Solidity
    /// `MerkleProof`-compatible StandardMerkleTree convention.
    #[default]
    Heap,
    /// Levels built bottom-up from adjacent pairs, promoting an unpaired
    /// trailing node to the next level unchanged.
    Levels,
}

impl fmt::Display for TreeLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeLayout::Heap => f.write_str("heap"),
            TreeLayout::Levels => f.write_str("levels"),
        }
    }
}

impl FromStr for TreeLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "heap" => Ok(TreeLayout::Heap),
            "levels" => Ok(TreeLayout::Levels),
            other => Err(format!("unknown tree layout `{other}`")),
        }
    }
}

/// Sizes of every level from the leaves up to the root.
pub(crate) fn level_sizes(leaf_count: usize) -> Vec<usize> {
    let mut sizes = vec![leaf_count];
    let mut len = leaf_count;
    while len > 1 {
        len = len.div_ceil(2);
        sizes.push(len);
    }
    sizes
}

/// Node storage for a built tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Nodes {
    Heap(Vec<Hash>),
    /// `levels[0]` holds the sorted leaves, the last level holds the root.
    Levels(Vec<Vec<Hash>>),
}

impl Nodes {
    /// Arrange already-sorted leaf digests under `layout`.
    pub fn assemble<H: MerkleHasher>(layout: TreeLayout, leaves: Vec<Hash>, parallel: bool) -> Self {
        match layout {
            TreeLayout::Heap => {
                let n = leaves.len();
                if n == 0 {
                    return Nodes::Heap(Vec::new());
                }
                let len = 2 * n - 1;
                let mut tree = vec![[0u8; 32]; len];
                for (i, leaf) in leaves.into_iter().enumerate() {
                    tree[len - 1 - i] = leaf;
                }
                // children are always filled before their parent
                for k in (0..n - 1).rev() {
                    tree[k] = combine::<H>(&tree[2 * k + 1], &tree[2 * k + 2]);
                }
                Nodes::Heap(tree)
            }
            TreeLayout::Levels => {
                let mut levels = vec![leaves];
                while let Some(top) = levels.last().filter(|level| level.len() > 1) {
                    let next = combine_level::<H>(top, parallel);
                    levels.push(next);
                }
                Nodes::Levels(levels)
            }
        }
    }

    /// Rebuild node storage from its flattened form.
    pub fn from_flat(layout: TreeLayout, flat: Vec<Hash>, leaf_count: usize) -> Result<Self, String> {
        if leaf_count == 0 {
            return Err("tree has no leaves".to_string());
        }
        match layout {
            TreeLayout::Heap => {
                let expected = 2 * leaf_count - 1;
                if flat.len() != expected {
                    return Err(format!(
                        "{} leaves need {} nodes, got {}",
                        leaf_count,
                        expected,
                        flat.len()
                    ));
                }
                Ok(Nodes::Heap(flat))
            }
            TreeLayout::Levels => {
                let sizes = level_sizes(leaf_count);
                let expected: usize = sizes.iter().sum();
                if flat.len() != expected {
                    return Err(format!(
                        "{} leaves need {} nodes, got {}",
                        leaf_count,
                        expected,
                        flat.len()
                    ));
                }
                let mut rest = flat.as_slice();
                let mut levels = Vec::with_capacity(sizes.len());
                for size in sizes {
                    let (level, tail) = rest.split_at(size);
                    levels.push(level.to_vec());
                    rest = tail;
                }
                Ok(Nodes::Levels(levels))
            }
        }
    }

    pub fn layout(&self) -> TreeLayout {
        match self {
            Nodes::Heap(_) => TreeLayout::Heap,
            Nodes::Levels(_) => TreeLayout::Levels,
        }
    }

    pub fn root(&self) -> Option<Hash> {
        match self {
            Nodes::Heap(tree) => tree.first().copied(),
            Nodes::Levels(levels) => levels.last().and_then(|top| top.first()).copied(),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            Nodes::Heap(tree) => tree.len().div_ceil(2),
            Nodes::Levels(levels) => levels.first().map_or(0, Vec::len),
        }
    }

    /// Total nodes in the flattened form.
    pub fn len(&self) -> usize {
        match self {
            Nodes::Heap(tree) => tree.len(),
            Nodes::Levels(levels) => levels.iter().map(Vec::len).sum(),
        }
    }

    /// Index in the flattened node array of the leaf at sorted `position`.
    pub fn tree_index(&self, position: usize) -> usize {
        match self {
            Nodes::Heap(tree) => tree.len() - 1 - position,
            Nodes::Levels(_) => position,
        }
    }

    /// Inverse of [`tree_index`](Self::tree_index); `None` for internal nodes
    /// and out-of-range indices.
    pub fn position_of_tree_index(&self, tree_index: usize) -> Option<usize> {
        let n = self.leaf_count();
        match self {
            Nodes::Heap(tree) => (tree_index + 1 >= n && tree_index < tree.len())
                .then(|| tree.len() - 1 - tree_index),
            Nodes::Levels(_) => (tree_index < n).then_some(tree_index),
        }
    }

    pub fn leaf(&self, position: usize) -> Option<Hash> {
        if position >= self.leaf_count() {
            return None;
        }
        match self {
            Nodes::Heap(tree) => tree.get(self.tree_index(position)).copied(),
            Nodes::Levels(levels) => levels.first().and_then(|l| l.get(position)).copied(),
        }
    }

    /// Sibling path from the leaf at sorted `position` up to, but excluding,
    /// the root.
    pub fn siblings(&self, position: usize) -> Vec<Hash> {
        let mut path = Vec::new();
        match self {
            Nodes::Heap(tree) => {
                let mut j = self.tree_index(position);
                while j > 0 {
                    let sibling = if j % 2 == 1 { j + 1 } else { j - 1 };
                    if let Some(hash) = tree.get(sibling) {
                        path.push(*hash);
                    }
                    j = (j - 1) / 2;
                }
            }
            Nodes::Levels(levels) => {
                let mut pos = position;
                for level in levels.iter().take(levels.len().saturating_sub(1)) {
                    // a promoted node has no sibling at this level
                    if let Some(hash) = level.get(pos ^ 1) {
                        path.push(*hash);
                    }
                    pos /= 2;
                }
            }
        }
        path
    }

    pub fn flatten(&self) -> Vec<Hash> {
        match self {
            Nodes::Heap(tree) => tree.clone(),
            Nodes::Levels(levels) => levels.concat(),
        }
    }

    /// Re-derive every internal node from its children.
    pub fn check<H: MerkleHasher>(&self) -> Result<(), String> {
        match self {
            Nodes::Heap(tree) => {
                let internal = self.leaf_count().saturating_sub(1);
                for k in 0..internal {
                    let expected = combine::<H>(&tree[2 * k + 1], &tree[2 * k + 2]);
                    if tree[k] != expected {
                        return Err(format!("node {k} does not match its children"));
                    }
                }
            }
            Nodes::Levels(levels) => {
                for (depth, pair) in levels.windows(2).enumerate() {
                    if combine_level::<H>(&pair[0], false) != pair[1] {
                        return Err(format!("level {} does not match level {depth}", depth + 1));
                    }
                }
                if levels.last().is_some_and(|top| top.len() != 1) {
                    return Err("top level must hold exactly the root".to_string());
                }
            }
        }
        Ok(())
    }
}
