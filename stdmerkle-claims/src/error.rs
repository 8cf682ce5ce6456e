use stdmerkle_abi::EncodingError;
use stdmerkle_tree::MerkleTreeError;
use thiserror::Error;

/// Errors from building or checking a claim set.
#[derive(Debug, Error)]
pub enum ClaimsError {
    /// Tree construction or proof failure.
    #[error(transparent)]
    Tree(#[from] MerkleTreeError),
    /// Manifest leaf encoding or claim fields that do not encode.
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    /// Address is not 20 bytes of hex.
    #[error("invalid user address `{0}`")]
    InvalidAddress(String),
    /// Two users share an address, ignoring case.
    #[error("users {first} and {second} share the address {address}")]
    DuplicateClaimKey {
        /// Lowercased shared address.
        address: String,
        /// Earlier user index.
        first: usize,
        /// Later user index.
        second: usize,
    },
    /// No claim is stored under the address.
    #[error("no claim for address {0}")]
    UnknownClaim(String),
}

/// Result alias for claim operations.
pub type Result<T> = std::result::Result<T, ClaimsError>;
