//! Shared fixtures for the tree and proof tests.

use stdmerkle_abi::{Address, LeafSchema, LeafValue, U256};

use crate::{parse_hash, Hash};

pub(crate) fn hash(hex: &str) -> Hash {
    parse_hash(hex).expect("fixture hash should parse")
}

pub(crate) fn address_amount_schema() -> LeafSchema {
    LeafSchema::parse(["address", "uint256"]).expect("schema should parse")
}

/// `(0xiiii…ii, i * 100)` for `i` in `1..=count`.
pub(crate) fn address_amount_leaves(count: u8) -> Vec<Vec<LeafValue>> {
    (1..=count)
        .map(|i| {
            vec![
                LeafValue::Address(Address::repeat_byte(i)),
                LeafValue::from(u64::from(i) * 100),
            ]
        })
        .collect()
}

/// `count` distinct `(address, amount)` leaves for sizes beyond `u8`.
pub(crate) fn numbered_leaves(count: usize) -> Vec<Vec<LeafValue>> {
    (0..count)
        .map(|i| {
            let mut raw = [0u8; 20];
            raw[12..].copy_from_slice(&(i as u64).to_be_bytes());
            vec![
                LeafValue::Address(Address::from(raw)),
                LeafValue::Uint(U256::from(i as u64) * U256::from(1_000_000_007u64)),
            ]
        })
        .collect()
}

pub(crate) fn user_schema() -> LeafSchema {
    LeafSchema::parse([
        "string", "string", "address", "int256", "uint256", "uint256", "uint256",
    ])
    .expect("schema should parse")
}

pub(crate) fn user(
    id: &str,
    email: &str,
    byte: u8,
    reputation: i64,
    pre_points: u64,
    points: u64,
    cumulative: u64,
) -> Vec<LeafValue> {
    vec![
        LeafValue::from(id),
        LeafValue::from(email),
        LeafValue::Address(Address::repeat_byte(byte)),
        LeafValue::from(reputation),
        LeafValue::from(pre_points),
        LeafValue::from(points),
        LeafValue::from(cumulative),
    ]
}

pub(crate) fn three_users() -> Vec<Vec<LeafValue>> {
    vec![
        user("u1", "a@x.com", 0xaa, 100, 50, 150, 200),
        user("u2", "b@x.com", 0xbb, 200, 75, 225, 300),
        user("u3", "c@x.com", 0xcc, -5, 0, 0, 0),
    ]
}

/// `ceil(log2 n)`, with `n = 1` giving 0.
pub(crate) fn max_proof_len(n: usize) -> usize {
    n.next_power_of_two().trailing_zeros() as usize
}
