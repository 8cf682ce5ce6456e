//! Canonical leaf encoding for sorted-pair Merkle trees.
//!
//! A leaf is a typed tuple whose shape is declared once per tree by a
//! [`LeafSchema`]. Tuples are encoded exactly like Solidity's `abi.encode`,
//! so a contract receiving the same fields as calldata rebuilds the same
//! bytes and therefore the same leaf digest.
//!
//! Integers are canonicalized to 256-bit words (sign-extended for `intN`,
//! zero-extended for `uintN`) after checking the declared width, addresses
//! are left-padded, and `bytesN` values are right-padded. `string` and
//! `bytes` fields are dynamic: their head word is an offset into a tail of
//! length-prefixed, zero-padded data.

#![warn(missing_docs)]

mod encode;
mod error;
mod schema;
mod types;
mod value;


pub use alloy_primitives::{Address, I256, U256};
pub use encode::{encode_leaf, WORD_SIZE};
pub use error::{EncodingError, EncodingErrorKind};
pub use schema::LeafSchema;
pub use types::AbiType;
pub use value::LeafValue;
