use serde::{Deserialize, Serialize};
use stdmerkle_tree::{parse_hash, Keccak256, LeafSchema, Proof};

use crate::{Manifest, Result, UserData};

/// A user's fields together with the proof of their leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRecord {
    /// Backend user identifier.
    pub user_id: String,
    /// Contact email.
    pub email: String,
    /// Address as exported.
    pub user_address: String,
    /// Reputation score.
    pub reputation: i64,
    /// Points before the current period.
    pub pre_points: u64,
    /// Points earned in the current period.
    pub points: u64,
    /// Running total of points.
    pub cummulative_points: u64,
    /// Sibling path as `0x` hex strings.
    pub proof: Proof,
}

impl ClaimRecord {
    pub(crate) fn new(user: &UserData, proof: Proof) -> Self {
        Self {
            user_id: user.user_id.clone(),
            email: user.email.clone(),
            user_address: user.user_address.clone(),
            reputation: user.reputation,
            pre_points: user.pre_points,
            points: user.points,
            cummulative_points: user.cummulative_points,
            proof,
        }
    }

    /// The user row this claim was cut from.
    pub fn user(&self) -> UserData {
        UserData {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            user_address: self.user_address.clone(),
            reputation: self.reputation,
            pre_points: self.pre_points,
            points: self.points,
            cummulative_points: self.cummulative_points,
        }
    }
}

/// Check a claim against a published manifest.
///
/// The leaf is rebuilt from the claim's fields under the manifest's leaf
/// encoding; a mismatch anywhere yields `Ok(false)`.
pub fn verify_claim(manifest: &Manifest, claim: &ClaimRecord) -> Result<bool> {
    let schema = LeafSchema::parse(&manifest.leaf_encoding)?;
    let root = parse_hash(&manifest.root_hash)?;
    let values = claim.user().leaf_values()?;
    Ok(claim.proof.verify::<Keccak256>(&schema, &values, &root)?)
}
