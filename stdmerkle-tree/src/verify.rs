//! Stateless proof verification.
//!
//! Nothing here touches a built tree: a verifier holding only the leaf
//! schema, the tuple, the sibling list and a trusted root recomputes the
//! path with the same sorted-pair rule the builder used.

use stdmerkle_abi::{LeafSchema, LeafValue};

use crate::{
    hash::{combine, hash_from_slice, hash_leaf, Hash, Keccak256, MerkleHasher},
    proof::Proof,
    MerkleTreeError,
};

/// Fold `siblings` into `leaf`, returning the implied root.
pub fn process_proof<H: MerkleHasher>(leaf: &Hash, siblings: &[Hash]) -> Hash {
    siblings
        .iter()
        .fold(*leaf, |node, sibling| combine::<H>(&node, sibling))
}

/// Whether `proof` leads from `leaf` to `root`.
pub fn verify_leaf_hash<H: MerkleHasher>(leaf: &Hash, proof: &Proof, root: &Hash) -> bool {
    process_proof::<H>(leaf, proof.siblings()) == *root
}

/// Verify a Keccak-256 proof for `values` against `root`.
///
/// Returns `Ok(false)` on any mismatch. Errors are reserved for inputs
/// that cannot be checked at all: a root or sibling that is not 32 bytes,
/// or a tuple that does not encode under `schema`.
pub fn verify<P: AsRef<[u8]>>(
    schema: &LeafSchema,
    values: &[LeafValue],
    proof: &[P],
    root: &[u8],
) -> Result<bool, MerkleTreeError> {
    verify_with::<Keccak256, P>(schema, values, proof, root)
}

/// [`verify`] for an arbitrary hasher.
pub fn verify_with<H: MerkleHasher, P: AsRef<[u8]>>(
    schema: &LeafSchema,
    values: &[LeafValue],
    proof: &[P],
    root: &[u8],
) -> Result<bool, MerkleTreeError> {
    let root = hash_from_slice(root)
        .map_err(|e| MerkleTreeError::ProofFormat(format!("root: {}", e)))?;
    let siblings = proof
        .iter()
        .enumerate()
        .map(|(i, sibling)| {
            hash_from_slice(sibling.as_ref())
                .map_err(|e| MerkleTreeError::ProofFormat(format!("sibling {}: {}", i, e)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let leaf = hash_leaf::<H>(schema, values)?;
    Ok(process_proof::<H>(&leaf, &siblings) == root)
}

impl Proof {
    /// Verify this proof for `values` against `root`.
    pub fn verify<H: MerkleHasher>(
        &self,
        schema: &LeafSchema,
        values: &[LeafValue],
        root: &Hash,
    ) -> Result<bool, MerkleTreeError> {
        let leaf = hash_leaf::<H>(schema, values)?;
        Ok(verify_leaf_hash::<H>(&leaf, self, root))
    }
}
