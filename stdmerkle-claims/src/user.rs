use serde::{Deserialize, Serialize};
use stdmerkle_abi::{AbiType, LeafSchema, LeafValue};

use crate::{ClaimsError, Result};

/// Solidity types of a user leaf, in field order.
pub const USER_LEAF_ENCODING: [&str; 7] = [
    "string", "string", "address", "int256", "uint256", "uint256", "uint256",
];

/// Parsed form of [`USER_LEAF_ENCODING`].
pub fn user_leaf_schema() -> LeafSchema {
    LeafSchema::new(vec![
        AbiType::String,
        AbiType::String,
        AbiType::Address,
        AbiType::Int(256),
        AbiType::Uint(256),
        AbiType::Uint(256),
        AbiType::Uint(256),
    ])
}

/// One user row as exported by the points system.
///
/// Field names are PascalCase on the wire; camelCase spellings are accepted
/// too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserData {
    /// Backend user identifier.
    #[serde(alias = "userId")]
    pub user_id: String,
    /// Contact email.
    #[serde(alias = "email")]
    pub email: String,
    /// Wallet address, `0x` hex in any case.
    #[serde(alias = "userAddress")]
    pub user_address: String,
    /// Reputation score, may be negative.
    #[serde(alias = "reputation")]
    pub reputation: i64,
    /// Points before the current period.
    #[serde(alias = "prePoints")]
    pub pre_points: u64,
    /// Points earned in the current period.
    #[serde(alias = "points")]
    pub points: u64,
    /// Running total of points.
    #[serde(alias = "cummulativePoints", alias = "CumulativePoints")]
    pub cummulative_points: u64,
}

/// A full export: generation time plus every user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsersDataInput {
    /// Export time as written by the points system.
    pub date_generated: u64,
    /// One row per user.
    pub users_data: Vec<UserData>,
}

impl UserData {
    /// Lowercase `0x` address, the key of this user's claim.
    pub fn claim_key(&self) -> Result<String> {
        Ok(self.address()?.to_string())
    }

    fn address(&self) -> Result<LeafValue> {
        LeafValue::parse(AbiType::Address, &self.user_address)
            .map_err(|_| ClaimsError::InvalidAddress(self.user_address.clone()))
    }

    /// The leaf tuple, in [`USER_LEAF_ENCODING`] order.
    pub fn leaf_values(&self) -> Result<Vec<LeafValue>> {
        Ok(vec![
            LeafValue::from(self.user_id.as_str()),
            LeafValue::from(self.email.as_str()),
            self.address()?,
            LeafValue::from(self.reputation),
            LeafValue::from(self.pre_points),
            LeafValue::from(self.points),
            LeafValue::from(self.cummulative_points),
        ])
    }
}
