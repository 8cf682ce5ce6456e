//! Serialized form of a built tree: the flattened node array, the leaf
//! values with their node index, and the leaf schema.
//!
//! Loading a dump re-derives every digest from the stored values, so a
//! dump that was edited or truncated is rejected rather than yielding
//! proofs for a different root.

use bincode::{Decode, Encode};
use stdmerkle_abi::LeafSchema;
use tracing::{debug, warn};

use crate::{
    error::Result,
    hash::{hash_leaf, parse_hash, to_hex, Keccak256, MerkleHasher},
    layout::{Nodes, TreeLayout},
    tree::{LeafEntry, StandardMerkleTree},
    MerkleTreeError,
};

/// Format tag written into every dump.
pub const DUMP_FORMAT: &str = "standard-v1";

/// A tree in transportable form.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct TreeDump {
    /// Always [`DUMP_FORMAT`].
    pub format: String,
    /// [`MerkleHasher::NAME`] of the hasher the tree was built with.
    pub hasher: String,
    /// Odd-node policy.
    pub layout: TreeLayout,
    /// Canonical type tags of the leaf schema.
    pub leaf_encoding: Vec<String>,
    /// Flattened node array as `0x` hex.
    pub tree: Vec<String>,
    /// Leaves in input order.
    pub values: Vec<DumpValue>,
}

/// One leaf of a [`TreeDump`].
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct DumpValue {
    /// Field values in textual form.
    pub value: Vec<String>,
    /// Index of the leaf in [`TreeDump::tree`].
    pub tree_index: usize,
}

impl TreeDump {
    /// Encode to bytes using bincode.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_no_limit();
        bincode::encode_to_vec(self, config)
            .map_err(|e| MerkleTreeError::InvalidDump(format!("encode error: {}", e)))
    }

    /// Decode from bytes using bincode.
    pub fn decode_from_slice(bytes: &[u8]) -> Result<Self> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_limit::<{ 100 * 1024 * 1024 }>(); // 100MB limit
        let (dump, read): (Self, usize) = bincode::decode_from_slice(bytes, config)
            .map_err(|e| MerkleTreeError::InvalidDump(format!("decode error: {}", e)))?;
        if read != bytes.len() {
            return Err(MerkleTreeError::InvalidDump(format!(
                "{} trailing bytes after dump",
                bytes.len() - read
            )));
        }
        Ok(dump)
    }
}

fn invalid(message: String) -> MerkleTreeError {
    warn!(%message, "rejecting tree dump");
    MerkleTreeError::InvalidDump(message)
}

impl StandardMerkleTree<Keccak256> {
    /// Rebuild a Keccak-256 tree from a dump.
    pub fn load(dump: &TreeDump) -> Result<Self> {
        Self::from_dump(dump)
    }
}

impl<H: MerkleHasher> StandardMerkleTree<H> {
    /// Snapshot the tree.
    pub fn dump(&self) -> TreeDump {
        let nodes = self.nodes();
        TreeDump {
            format: DUMP_FORMAT.to_string(),
            hasher: H::NAME.to_string(),
            layout: nodes.layout(),
            leaf_encoding: self.schema().type_names(),
            tree: nodes.flatten().iter().map(to_hex).collect(),
            values: self
                .entries
                .iter()
                .map(|entry| DumpValue {
                    value: entry.values.iter().map(ToString::to_string).collect(),
                    tree_index: nodes.tree_index(entry.position),
                })
                .collect(),
        }
    }

    /// Rebuild a tree from a dump, checking it end to end.
    pub fn from_dump(dump: &TreeDump) -> Result<Self> {
        if dump.format != DUMP_FORMAT {
            return Err(invalid(format!("unknown format `{}`", dump.format)));
        }
        if dump.hasher != H::NAME {
            return Err(invalid(format!(
                "dump was built with {}, expected {}",
                dump.hasher,
                H::NAME
            )));
        }
        let schema = LeafSchema::parse(&dump.leaf_encoding)
            .map_err(|e| invalid(format!("leaf encoding: {}", e)))?;
        let flat = dump
            .tree
            .iter()
            .map(|node| parse_hash(node))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| invalid(e.to_string()))?;
        let nodes = Nodes::from_flat(dump.layout, flat, dump.values.len()).map_err(invalid)?;

        let mut seen = vec![false; dump.values.len()];
        let mut entries = Vec::with_capacity(dump.values.len());
        for (leaf, dumped) in dump.values.iter().enumerate() {
            let values = schema
                .parse_row(&dumped.value)
                .map_err(|e| invalid(format!("value {}: {}", leaf, e)))?;
            let position = nodes
                .position_of_tree_index(dumped.tree_index)
                .ok_or_else(|| {
                    invalid(format!(
                        "value {} points at node {}, which is not a leaf",
                        leaf, dumped.tree_index
                    ))
                })?;
            if std::mem::replace(&mut seen[position], true) {
                return Err(invalid(format!(
                    "node {} is claimed by more than one value",
                    dumped.tree_index
                )));
            }
            let hash = hash_leaf::<H>(&schema, &values)
                .map_err(|e| invalid(format!("value {}: {}", leaf, e)))?;
            if nodes.leaf(position) != Some(hash) {
                return Err(invalid(format!(
                    "value {} does not hash to node {}",
                    leaf, dumped.tree_index
                )));
            }
            entries.push(LeafEntry {
                values,
                hash,
                position,
            });
        }
        nodes.check::<H>().map_err(invalid)?;
        // sorted order is what makes the root input-order independent
        let in_order = (1..nodes.leaf_count())
            .all(|p| nodes.leaf(p - 1) < nodes.leaf(p));
        if !in_order {
            return Err(invalid("leaf nodes are not strictly sorted".to_string()));
        }

        debug!(leaves = entries.len(), layout = %dump.layout, "loaded tree dump");
        Self::from_parts(schema, nodes, entries)
    }
}
