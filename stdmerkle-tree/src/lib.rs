//! Sorted-pair Merkle tree over ABI-encoded leaves.
//!
//! Every leaf is a typed tuple, encoded with
//! [`encode_leaf`](stdmerkle_abi::encode_leaf) and hashed twice:
//!
//! `leaf = H(H(abi.encode(tuple)))`
//!
//! Leaf digests are sorted and assembled into a binary tree whose internal
//! nodes combine their children in byte order:
//!
//! `node = H(min(left, right) || max(left, right))`
//!
//! With Keccak-256 (the default hasher) and the [`TreeLayout::Heap`] layout
//! the roots and proofs are the ones an on-chain `MerkleProof.verify` call
//! accepts. Proofs are plain sibling lists; [`verify`] checks one without
//! access to the tree.
//!
//! # Features
//!
//! - `serde` derives `Serialize`/`Deserialize` for [`Proof`], [`TreeDump`]
//!   and [`TreeLayout`].
//! - `parallel` hashes leaves and combines levels on the rayon pool once the
//!   leaf count reaches [`TreeOptions::parallel_threshold`].

#![warn(missing_docs)]

mod dump;
mod error;
pub(crate) mod hash;
pub(crate) mod layout;
pub(crate) mod parallel;
pub(crate) mod proof;
mod render;
pub(crate) mod tree;
mod verify;

#[cfg(test)]
pub(crate) mod test_utils;
#[cfg(test)]
mod tests;

pub use dump::{DumpValue, TreeDump, DUMP_FORMAT};
pub use error::{MerkleTreeError, Result};
pub use hash::{
    combine, double_hash, hash_leaf, parse_hash, to_hex, Blake3, Hash, Keccak256, MerkleHasher,
    HASH_LEN,
};
pub use layout::TreeLayout;
pub use proof::{Proof, MAX_PROOF_DEPTH};
pub use stdmerkle_abi::{AbiType, Address, EncodingError, LeafSchema, LeafValue, I256, U256};
pub use tree::{StandardMerkleTree, TreeOptions};
pub use verify::{process_proof, verify, verify_leaf_hash, verify_with};
