use std::{fmt, str::FromStr};

use crate::EncodingErrorKind;

/// A Solidity type tag that a leaf field may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbiType {
    /// 20-byte account address, left-padded to a word.
    Address,
    /// Boolean, encoded as the word 0 or 1.
    Bool,
    /// UTF-8 string (dynamic).
    String,
    /// Arbitrary byte string (dynamic).
    Bytes,
    /// `bytesN` with `1 <= N <= 32`, right-padded to a word.
    FixedBytes(usize),
    /// `intN` with the given bit width.
    Int(usize),
    /// `uintN` with the given bit width.
    Uint(usize),
}

impl AbiType {
    /// Whether values of this type are stored in the tail of the encoding.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, AbiType::String | AbiType::Bytes)
    }
}

impl FromStr for AbiType {
    type Err = EncodingErrorKind;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let unsupported = || EncodingErrorKind::UnsupportedType(tag.to_string());
        match tag {
            "address" => return Ok(AbiType::Address),
            "bool" => return Ok(AbiType::Bool),
            "string" => return Ok(AbiType::String),
            "bytes" => return Ok(AbiType::Bytes),
            "int" => return Ok(AbiType::Int(256)),
            "uint" => return Ok(AbiType::Uint(256)),
            _ => {}
        }
        if let Some(bits) = tag.strip_prefix("uint") {
            return integer_width(bits).map(AbiType::Uint).ok_or_else(unsupported);
        }
        if let Some(bits) = tag.strip_prefix("int") {
            return integer_width(bits).map(AbiType::Int).ok_or_else(unsupported);
        }
        if let Some(len) = tag.strip_prefix("bytes") {
            return decimal(len)
                .filter(|n| (1..=32).contains(n))
                .map(AbiType::FixedBytes)
                .ok_or_else(unsupported);
        }
        Err(unsupported())
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Address => f.write_str("address"),
            AbiType::Bool => f.write_str("bool"),
            AbiType::String => f.write_str("string"),
            AbiType::Bytes => f.write_str("bytes"),
            AbiType::FixedBytes(len) => write!(f, "bytes{len}"),
            AbiType::Int(bits) => write!(f, "int{bits}"),
            AbiType::Uint(bits) => write!(f, "uint{bits}"),
        }
    }
}

/// Bit widths are multiples of 8 in `8..=256`.
fn integer_width(digits: &str) -> Option<usize> {
    decimal(digits).filter(|bits| bits % 8 == 0 && (8..=256).contains(bits))
}

/// Plain decimal without sign or leading zeros.
fn decimal(digits: &str) -> Option<usize> {
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    digits.parse().ok()
}
