//! Inclusion proofs.
//!
//! A `Proof` is the ordered list of sibling digests met on the way from a
//! leaf to the root. It carries no direction flags: every step applies the
//! sorted-pair [`combine`](crate::combine), so the verifier only needs the
//! leaf digest, the siblings and the expected root.

use bincode::{Decode, Encode};

use crate::{
    hash::{parse_hash, to_hex, Hash},
    MerkleTreeError,
};


/// Deepest path any tree addressable by `usize` can produce.
pub const MAX_PROOF_DEPTH: usize = 64;

/// Sibling path for one leaf, leaf side first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Encode, Decode)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<String>", into = "Vec<String>")
)]
pub struct Proof {
    siblings: Vec<Hash>,
}

impl Proof {
    /// Wrap a sibling path.
    pub fn new(siblings: Vec<Hash>) -> Self {
        Self { siblings }
    }

    /// Sibling digests, leaf side first.
    pub fn siblings(&self) -> &[Hash] {
        &self.siblings
    }

    /// Number of siblings.
    pub fn len(&self) -> usize {
        self.siblings.len()
    }

    /// True for the proof of a single-leaf tree.
    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }

    /// Unwrap into the sibling list.
    pub fn into_siblings(self) -> Vec<Hash> {
        self.siblings
    }

    /// `0x`-prefixed lowercase hex, one string per sibling, in order.
    pub fn to_hex_strings(&self) -> Vec<String> {
        self.siblings.iter().map(to_hex).collect()
    }

    /// Inverse of [`to_hex_strings`](Self::to_hex_strings).
    pub fn from_hex_strings<I, S>(strings: I) -> Result<Self, MerkleTreeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let siblings = strings
            .into_iter()
            .map(|s| parse_hash(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { siblings })
    }

    /// Encode to bytes using bincode.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>, MerkleTreeError> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_no_limit();
        bincode::encode_to_vec(self, config)
            .map_err(|e| MerkleTreeError::ProofFormat(format!("encode error: {}", e)))
    }

    /// Decode from bytes using bincode.
    ///
    /// Rejects paths deeper than [`MAX_PROOF_DEPTH`] and trailing bytes.
    pub fn decode_from_slice(bytes: &[u8]) -> Result<Self, MerkleTreeError> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_limit::<{ 100 * 1024 * 1024 }>(); // 100MB limit
        let (proof, read): (Self, usize) = bincode::decode_from_slice(bytes, config)
            .map_err(|e| MerkleTreeError::ProofFormat(format!("decode error: {}", e)))?;
        if read != bytes.len() {
            return Err(MerkleTreeError::ProofFormat(format!(
                "{} trailing bytes after proof",
                bytes.len() - read
            )));
        }
        if proof.siblings.len() > MAX_PROOF_DEPTH {
            return Err(MerkleTreeError::ProofFormat(format!(
                "proof has {} siblings (max {})",
                proof.siblings.len(),
                MAX_PROOF_DEPTH
            )));
        }
        Ok(proof)
    }
}

impl From<Vec<Hash>> for Proof {
    fn from(siblings: Vec<Hash>) -> Self {
        Self::new(siblings)
    }
}

impl TryFrom<Vec<String>> for Proof {
    type Error = MerkleTreeError;

    fn try_from(strings: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_hex_strings(strings)
    }
}

impl From<Proof> for Vec<String> {
    fn from(proof: Proof) -> Self {
        proof.to_hex_strings()
    }
}

impl AsRef<[Hash]> for Proof {
    fn as_ref(&self) -> &[Hash] {
        &self.siblings
    }
}
