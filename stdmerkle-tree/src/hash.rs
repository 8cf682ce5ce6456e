use std::fmt::Debug;

use stdmerkle_abi::{encode_leaf, EncodingError, LeafSchema, LeafValue};
use tiny_keccak::{Hasher, Keccak};

use crate::MerkleTreeError;

/// Length of every digest in the tree.
pub const HASH_LEN: usize = 32;

/// A leaf digest or internal node.
pub type Hash = [u8; HASH_LEN];

/// The hash primitive behind leaf digests and node combination.
///
/// Implementations carry no state; the tree is generic over the type only.
pub trait MerkleHasher: Debug + Clone + Copy + Default + Send + Sync + 'static {
    /// Stable name recorded in tree dumps.
    const NAME: &'static str;

    /// Hash arbitrary bytes.
    fn digest(bytes: &[u8]) -> Hash;

    /// Hash the concatenation `a ++ b`.
    fn digest_pair(a: &Hash, b: &Hash) -> Hash {
        let mut buf = [0u8; 2 * HASH_LEN];
        buf[..HASH_LEN].copy_from_slice(a);
        buf[HASH_LEN..].copy_from_slice(b);
        Self::digest(&buf)
    }
}

/// Keccak-256 as used by the EVM. The default, since it is what on-chain
/// verifiers recompute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Keccak256;

impl MerkleHasher for Keccak256 {
    const NAME: &'static str = "keccak256";

    fn digest(bytes: &[u8]) -> Hash {
        let mut hasher = Keccak::v256();
        hasher.update(bytes);
        let mut out = [0u8; HASH_LEN];
        hasher.finalize(&mut out);
        out
    }

    fn digest_pair(a: &Hash, b: &Hash) -> Hash {
        let mut hasher = Keccak::v256();
        hasher.update(a);
        hasher.update(b);
        let mut out = [0u8; HASH_LEN];
        hasher.finalize(&mut out);
        out
    }
}

/// Blake3, for trees that are only ever verified off-chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blake3;

impl MerkleHasher for Blake3 {
    const NAME: &'static str = "blake3";

    fn digest(bytes: &[u8]) -> Hash {
        *blake3::hash(bytes).as_bytes()
    }

    fn digest_pair(a: &Hash, b: &Hash) -> Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(a);
        hasher.update(b);
        *hasher.finalize().as_bytes()
    }
}

/// Combine two nodes in byte order: `H(min(a, b) ++ max(a, b))`.
///
/// Because the pair is sorted first, a verifier never needs to know which
/// side a sibling sits on.
pub fn combine<H: MerkleHasher>(a: &Hash, b: &Hash) -> Hash {
    if a <= b {
        H::digest_pair(a, b)
    } else {
        H::digest_pair(b, a)
    }
}

/// `H(H(bytes))`. The second pass separates leaves from internal nodes: a
/// 64-byte node pre-image can never be presented as a leaf.
pub fn double_hash<H: MerkleHasher>(bytes: &[u8]) -> Hash {
    H::digest(&H::digest(bytes))
}

/// Digest of one leaf tuple under `schema`.
pub fn hash_leaf<H: MerkleHasher>(
    schema: &LeafSchema,
    values: &[LeafValue],
) -> Result<Hash, EncodingError> {
    Ok(double_hash::<H>(&encode_leaf(schema, values)?))
}

/// Lowercase `0x`-prefixed hex.
pub fn to_hex(hash: &Hash) -> String {
    format!("0x{}", hex::encode(hash))
}

/// Parse a 32-byte digest from hex, with or without the `0x` prefix.
pub fn parse_hash(text: &str) -> Result<Hash, MerkleTreeError> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    let bytes = hex::decode(digits)
        .map_err(|e| MerkleTreeError::ProofFormat(format!("invalid hex `{}`: {}", text, e)))?;
    hash_from_slice(&bytes).map_err(MerkleTreeError::ProofFormat)
}

pub(crate) fn hash_from_slice(bytes: &[u8]) -> Result<Hash, String> {
    bytes
        .try_into()
        .map_err(|_| format!("expected {} bytes, got {}", HASH_LEN, bytes.len()))
}
