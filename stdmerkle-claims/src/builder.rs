use std::collections::BTreeMap;

use stdmerkle_tree::{StandardMerkleTree, TreeDump, TreeOptions};
use tracing::{debug, info};

use crate::{
    claim::{verify_claim, ClaimRecord},
    manifest::{now_millis, DESCRIPTION, MANIFEST_VERSION},
    user::{user_leaf_schema, UsersDataInput},
    ClaimsError, Manifest, Result,
};

/// Turns a user export into a tree, one claim per user and a manifest.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimsBuilder {
    options: TreeOptions,
}

impl ClaimsBuilder {
    /// Builder using the given tree options.
    pub fn new(options: TreeOptions) -> Self {
        Self { options }
    }

    /// Build the claim set.
    ///
    /// Every address must be valid and distinct: claims are keyed by the
    /// lowercased address.
    pub fn build(&self, input: &UsersDataInput) -> Result<ClaimsBundle> {
        let mut keys: BTreeMap<String, usize> = BTreeMap::new();
        let mut tuples = Vec::with_capacity(input.users_data.len());
        for (index, user) in input.users_data.iter().enumerate() {
            let key = user.claim_key()?;
            if let Some(&first) = keys.get(&key) {
                return Err(ClaimsError::DuplicateClaimKey {
                    address: key,
                    first,
                    second: index,
                });
            }
            keys.insert(key, index);
            tuples.push(user.leaf_values()?);
        }
        debug!(users = tuples.len(), "collected user leaves");

        let tree = StandardMerkleTree::of_with_options(user_leaf_schema(), tuples, self.options)?;

        let mut claims = BTreeMap::new();
        for (key, index) in keys {
            let proof = tree.proof(index)?;
            claims.insert(key, ClaimRecord::new(&input.users_data[index], proof));
        }

        let manifest = Manifest {
            version: MANIFEST_VERSION.to_string(),
            timestamp: now_millis(),
            root_hash: tree.root_hex(),
            date_generated: input.date_generated,
            total_users: claims.len(),
            leaf_encoding: tree.schema().type_names(),
            layout: tree.layout(),
            description: DESCRIPTION.to_string(),
        };
        info!(
            users = manifest.total_users,
            root = %manifest.root_hash,
            layout = %manifest.layout,
            "built claim set"
        );
        Ok(ClaimsBundle {
            tree,
            claims,
            manifest,
        })
    }
}

/// A built claim set.
#[derive(Debug, Clone)]
pub struct ClaimsBundle {
    tree: StandardMerkleTree,
    claims: BTreeMap<String, ClaimRecord>,
    manifest: Manifest,
}

impl ClaimsBundle {
    /// The underlying tree.
    pub fn tree(&self) -> &StandardMerkleTree {
        &self.tree
    }

    /// Claims keyed by lowercase `0x` address.
    pub fn claims(&self) -> &BTreeMap<String, ClaimRecord> {
        &self.claims
    }

    /// Published metadata.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Snapshot of the tree for later proof re-derivation.
    pub fn dump(&self) -> TreeDump {
        self.tree.dump()
    }

    /// Claim for `address`, in any letter case.
    pub fn claim(&self, address: &str) -> Option<&ClaimRecord> {
        self.claims.get(&address.to_ascii_lowercase())
    }

    /// Verify the stored claim for `address` against the manifest.
    pub fn verify(&self, address: &str) -> Result<bool> {
        let claim = self
            .claim(address)
            .ok_or_else(|| ClaimsError::UnknownClaim(address.to_string()))?;
        verify_claim(&self.manifest, claim)
    }
}
