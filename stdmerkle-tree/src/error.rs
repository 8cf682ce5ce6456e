use stdmerkle_abi::EncodingError;
use thiserror::Error;

/// Errors from building, proving, verifying or loading a tree.
#[derive(Debug, Error)]
pub enum MerkleTreeError {
    /// A tuple does not encode under the schema.
    #[error("{}{source}", leaf_prefix(.leaf))]
    LeafEncoding {
        /// Input index of the tuple, when the failure belongs to one.
        leaf: Option<usize>,
        /// Field-level cause.
        source: EncodingError,
    },
    /// No tuples were given.
    #[error("cannot build a tree with no leaves")]
    EmptyTree,
    /// Two input tuples hash to the same leaf.
    #[error("leaves {first} and {second} have the same digest")]
    DuplicateLeaf {
        /// Earlier input index.
        first: usize,
        /// Later input index.
        second: usize,
    },
    /// Proof requested for a leaf the tree does not hold.
    #[error("leaf index {index} is out of range (leaf count {leaf_count})")]
    IndexOutOfRange {
        /// Requested input index.
        index: usize,
        /// Leaves in the tree.
        leaf_count: usize,
    },
    /// Proof, root or digest bytes that cannot be read.
    #[error("malformed proof: {0}")]
    ProofFormat(String),
    /// Dump rejected on load.
    #[error("invalid tree dump: {0}")]
    InvalidDump(String),
    /// A node does not match its children.
    #[error("corrupted tree: {0}")]
    CorruptedTree(String),
}

fn leaf_prefix(leaf: &Option<usize>) -> String {
    leaf.map(|i| format!("leaf {i}: ")).unwrap_or_default()
}

impl From<EncodingError> for MerkleTreeError {
    fn from(source: EncodingError) -> Self {
        MerkleTreeError::LeafEncoding { leaf: None, source }
    }
}

/// Result alias for tree operations.
pub type Result<T> = std::result::Result<T, MerkleTreeError>;
