use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use stdmerkle_tree::TreeLayout;

/// Version written into new manifests.
pub const MANIFEST_VERSION: &str = "1.0.0";

pub(crate) const DESCRIPTION: &str = "Merkle tree for user data verification";

/// Public metadata of a claim set: what a verifier needs besides the claim
/// itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Manifest format version.
    pub version: String,
    /// Build time as unix milliseconds, a JSON number. Consumers that
    /// expect an ISO-8601 string must convert it.
    pub timestamp: u64,
    /// `0x` hex root.
    pub root_hash: String,
    /// Copied from the input export.
    pub date_generated: u64,
    /// Number of claims.
    pub total_users: usize,
    /// Solidity types of each leaf field.
    pub leaf_encoding: Vec<String>,
    /// Odd-node policy the tree was built with.
    pub layout: TreeLayout,
    /// Free text.
    pub description: String,
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}
