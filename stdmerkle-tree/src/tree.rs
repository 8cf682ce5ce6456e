use std::marker::PhantomData;

use stdmerkle_abi::{LeafSchema, LeafValue};
use tracing::{debug, info};

use crate::{
    error::Result,
    hash::{hash_leaf, to_hex, Hash, Keccak256, MerkleHasher},
    layout::{Nodes, TreeLayout},
    parallel::map_range,
    proof::Proof,
    verify::verify_leaf_hash,
    MerkleTreeError,
};

/// Build-time settings for a [`StandardMerkleTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeOptions {
    /// Odd-node policy. Recorded in dumps, so proofs are always re-derived
    /// under the policy the tree was built with.
    pub layout: TreeLayout,
    /// Leaf count from which leaf hashing and level combination run on the
    /// rayon pool. Only consulted with the `parallel` feature.
    pub parallel_threshold: usize,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            layout: TreeLayout::Heap,
            parallel_threshold: 1024,
        }
    }
}

impl TreeOptions {
    /// Default options with the given layout.
    pub fn with_layout(layout: TreeLayout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }
}

/// A leaf as supplied by the caller, plus where it ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LeafEntry {
    pub values: Vec<LeafValue>,
    pub hash: Hash,
    /// Index among the sorted leaf digests.
    pub position: usize,
}

/// A Merkle tree over ABI-encoded, double-hashed leaves.
///
/// Leaf digests are sorted before assembly, so the root depends only on the
/// set of leaves and not on the order they were supplied in. Leaves keep
/// the index they had in the input; [`proof`](Self::proof) and friends take
/// that index.
///
/// Once built the tree is immutable.
#[derive(Debug, Clone)]
pub struct StandardMerkleTree<H: MerkleHasher = Keccak256> {
    schema: LeafSchema,
    nodes: Nodes,
    root: Hash,
    /// By input index.
    pub(crate) entries: Vec<LeafEntry>,
    /// Sorted position -> input index.
    pub(crate) order: Vec<usize>,
    _hasher: PhantomData<H>,
}

impl StandardMerkleTree<Keccak256> {
    /// Build a Keccak-256 tree with default options.
    pub fn of(schema: LeafSchema, tuples: Vec<Vec<LeafValue>>) -> Result<Self> {
        Self::build(schema, tuples, TreeOptions::default())
    }

    /// Build a Keccak-256 tree.
    pub fn of_with_options(
        schema: LeafSchema,
        tuples: Vec<Vec<LeafValue>>,
        options: TreeOptions,
    ) -> Result<Self> {
        Self::build(schema, tuples, options)
    }
}

impl<H: MerkleHasher> StandardMerkleTree<H> {
    /// Build a tree from leaf tuples.
    ///
    /// Fails on an empty input, on the first tuple (by input index) that does
    /// not encode, and on two tuples with the same digest.
    pub fn build(
        schema: LeafSchema,
        tuples: Vec<Vec<LeafValue>>,
        options: TreeOptions,
    ) -> Result<Self> {
        let n = tuples.len();
        if n == 0 {
            return Err(MerkleTreeError::EmptyTree);
        }
        let parallel = cfg!(feature = "parallel") && n >= options.parallel_threshold;
        debug!(
            leaves = n,
            hasher = H::NAME,
            layout = %options.layout,
            parallel,
            "hashing leaves"
        );

        let hashes = map_range(n, parallel, |i| hash_leaf::<H>(&schema, &tuples[i]))
            .into_iter()
            .enumerate()
            .map(|(leaf, hash)| {
                hash.map_err(|source| MerkleTreeError::LeafEncoding {
                    leaf: Some(leaf),
                    source,
                })
            })
            .collect::<Result<Vec<Hash>>>()?;

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_unstable_by(|&a, &b| hashes[a].cmp(&hashes[b]).then(a.cmp(&b)));
        if let Some(pair) = order
            .windows(2)
            .find(|pair| hashes[pair[0]] == hashes[pair[1]])
        {
            return Err(MerkleTreeError::DuplicateLeaf {
                first: pair[0],
                second: pair[1],
            });
        }
        debug!(leaves = n, "sorted leaf digests");

        let sorted = order.iter().map(|&i| hashes[i]).collect();
        let nodes = Nodes::assemble::<H>(options.layout, sorted, parallel);
        let root = nodes.root().ok_or(MerkleTreeError::EmptyTree)?;

        let mut positions = vec![0; n];
        for (position, &leaf) in order.iter().enumerate() {
            positions[leaf] = position;
        }
        let entries = tuples
            .into_iter()
            .zip(hashes)
            .zip(positions)
            .map(|((values, hash), position)| LeafEntry {
                values,
                hash,
                position,
            })
            .collect();

        info!(
            leaves = n,
            nodes = nodes.len(),
            layout = %options.layout,
            root = %to_hex(&root),
            "built merkle tree"
        );
        Ok(Self {
            schema,
            nodes,
            root,
            entries,
            order,
            _hasher: PhantomData,
        })
    }

    /// Assemble a tree from parts already checked by the caller.
    pub(crate) fn from_parts(
        schema: LeafSchema,
        nodes: Nodes,
        entries: Vec<LeafEntry>,
    ) -> Result<Self> {
        let root = nodes.root().ok_or(MerkleTreeError::EmptyTree)?;
        let mut order = vec![0; entries.len()];
        for (leaf, entry) in entries.iter().enumerate() {
            order[entry.position] = leaf;
        }
        Ok(Self {
            schema,
            nodes,
            root,
            entries,
            order,
            _hasher: PhantomData,
        })
    }

    /// The root digest.
    pub fn root(&self) -> Hash {
        self.root
    }

    /// The root as `0x`-prefixed hex.
    pub fn root_hex(&self) -> String {
        to_hex(&self.root)
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.entries.len()
    }

    /// Odd-node policy the tree was built with.
    pub fn layout(&self) -> TreeLayout {
        self.nodes.layout()
    }

    /// Leaf schema shared by every tuple.
    pub fn schema(&self) -> &LeafSchema {
        &self.schema
    }

    pub(crate) fn nodes(&self) -> &Nodes {
        &self.nodes
    }

    fn entry(&self, index: usize) -> Result<&LeafEntry> {
        self.entries
            .get(index)
            .ok_or(MerkleTreeError::IndexOutOfRange {
                index,
                leaf_count: self.entries.len(),
            })
    }

    /// Digest of the leaf at input `index`.
    pub fn leaf_hash(&self, index: usize) -> Result<Hash> {
        Ok(self.entry(index)?.hash)
    }

    /// Tuple of the leaf at input `index`.
    pub fn value(&self, index: usize) -> Result<&[LeafValue]> {
        Ok(&self.entry(index)?.values)
    }

    /// Every leaf tuple with its input index, in input order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &[LeafValue])> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (index, entry.values.as_slice()))
    }

    /// Input index of the leaf holding `values`, if there is one.
    pub fn leaf_lookup(&self, values: &[LeafValue]) -> Option<usize> {
        let hash = hash_leaf::<H>(&self.schema, values).ok()?;
        let position = self
            .order
            .binary_search_by(|&leaf| self.entries[leaf].hash.cmp(&hash))
            .ok()?;
        self.order.get(position).copied()
    }

    /// Sibling path for the leaf at input `index`.
    pub fn proof(&self, index: usize) -> Result<Proof> {
        let entry = self.entry(index)?;
        Ok(Proof::new(self.nodes.siblings(entry.position)))
    }

    /// Check `proof` for the leaf at input `index` against this tree's root.
    pub fn verify(&self, index: usize, proof: &Proof) -> Result<bool> {
        let entry = self.entry(index)?;
        Ok(verify_leaf_hash::<H>(&entry.hash, proof, &self.root))
    }

    /// Re-derive every leaf digest and internal node.
    pub fn validate(&self) -> Result<()> {
        if self.nodes.leaf_count() != self.entries.len() {
            return Err(MerkleTreeError::CorruptedTree(format!(
                "{} leaf nodes for {} values",
                self.nodes.leaf_count(),
                self.entries.len()
            )));
        }
        for (index, entry) in self.entries.iter().enumerate() {
            let hash = hash_leaf::<H>(&self.schema, &entry.values).map_err(|source| {
                MerkleTreeError::LeafEncoding {
                    leaf: Some(index),
                    source,
                }
            })?;
            if hash != entry.hash || self.nodes.leaf(entry.position) != Some(hash) {
                return Err(MerkleTreeError::CorruptedTree(format!(
                    "leaf {index} does not match its stored digest"
                )));
            }
        }
        self.nodes.check::<H>().map_err(MerkleTreeError::CorruptedTree)?;
        if self.nodes.root() != Some(self.root) {
            return Err(MerkleTreeError::CorruptedTree(
                "root does not match the node array".to_string(),
            ));
        }
        Ok(())
    }
}
