//! Claim sets for user point exports.
//!
//! A [`UsersDataInput`] export becomes a Keccak-256
//! [`StandardMerkleTree`](stdmerkle_tree::StandardMerkleTree) over
//! [`USER_LEAF_ENCODING`] tuples, one [`ClaimRecord`] per user holding the
//! user's fields and proof, and a [`Manifest`] with the root. A holder of a
//! claim and the manifest can check it with [`verify_claim`] alone.
//!
//! Persisting the records and publishing the manifest are left to the
//! caller.

#![warn(missing_docs)]

mod builder;
mod claim;
mod error;
mod manifest;
mod user;


pub use builder::{ClaimsBuilder, ClaimsBundle};
pub use claim::{verify_claim, ClaimRecord};
pub use error::{ClaimsError, Result};
pub use manifest::{Manifest, MANIFEST_VERSION};
pub use user::{user_leaf_schema, UserData, UsersDataInput, USER_LEAF_ENCODING};
