use std::{fmt, str::FromStr};

use alloy_primitives::{Address, I256, U256};

use crate::{AbiType, EncodingErrorKind};

/// One field of a leaf tuple.
///
/// Values are not bound to a width until they are encoded against a
/// schema, so `LeafValue::Uint(300)` is a valid value that fails only when
/// placed in a `uint8` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LeafValue {
    /// An account address.
    Address(Address),
    /// A boolean.
    Bool(bool),
    /// A UTF-8 string.
    String(String),
    /// Raw bytes, for both `bytes` and `bytesN` fields.
    Bytes(Vec<u8>),
    /// A signed integer.
    Int(I256),
    /// An unsigned integer.
    Uint(U256),
}

impl LeafValue {
    /// Short name of the value's variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            LeafValue::Address(_) => "address",
            LeafValue::Bool(_) => "bool",
            LeafValue::String(_) => "string",
            LeafValue::Bytes(_) => "bytes",
            LeafValue::Int(_) => "int",
            LeafValue::Uint(_) => "uint",
        }
    }

    /// Read a value of type `ty` from its textual form.
    ///
    /// Addresses and byte strings are hex with an optional `0x` prefix,
    /// booleans are `true`/`false` or `1`/`0`, signed integers are decimal with an optional sign and
    /// unsigned integers are decimal or `0x` hex.
    pub fn parse(ty: AbiType, text: &str) -> Result<Self, EncodingErrorKind> {
        let unparsable = || EncodingErrorKind::Unparsable {
            ty,
            text: text.to_string(),
        };
        let trimmed = text.trim();
        match ty {
            AbiType::String => Ok(LeafValue::String(text.to_string())),
            AbiType::Bool => match trimmed {
                "true" | "1" => Ok(LeafValue::Bool(true)),
                "false" | "0" => Ok(LeafValue::Bool(false)),
                _ => Err(unparsable()),
            },
            AbiType::Address => {
                let bytes = decode_hex(trimmed).ok_or_else(unparsable)?;
                let raw: [u8; 20] =
                    bytes
                        .as_slice()
                        .try_into()
                        .map_err(|_| EncodingErrorKind::ByteLength {
                            ty,
                            expected: 20,
                            actual: bytes.len(),
                        })?;
                Ok(LeafValue::Address(Address::from(raw)))
            }
            AbiType::Bytes | AbiType::FixedBytes(_) => decode_hex(trimmed)
                .map(LeafValue::Bytes)
                .ok_or_else(unparsable),
            AbiType::Int(_) => {
                let unsigned = trimmed
                    .strip_prefix(['+', '-'])
                    .unwrap_or(trimmed);
                if !has_digits(unsigned, 10) {
                    return Err(unparsable());
                }
                I256::from_dec_str(trimmed)
                    .map(LeafValue::Int)
                    .map_err(|_| unparsable())
            }
            AbiType::Uint(_) => {
                let hex_digits = trimmed
                    .strip_prefix("0x")
                    .or_else(|| trimmed.strip_prefix("0X"));
                let digits_ok = match hex_digits {
                    Some(digits) => has_digits(digits, 16),
                    None => has_digits(trimmed, 10),
                };
                if !digits_ok {
                    return Err(unparsable());
                }
                U256::from_str(trimmed)
                    .map(LeafValue::Uint)
                    .map_err(|_| unparsable())
            }
        }
    }
}

/// Rejects the empty string and `_` separators, both of which the integer
/// parsers would otherwise accept.
fn has_digits(digits: &str, radix: u32) -> bool {
    !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix))
}

fn decode_hex(text: &str) -> Option<Vec<u8>> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    hex::decode(digits).ok()
}

/// Lowercase `0x` hex for addresses and bytes, decimal for integers.
impl fmt::Display for LeafValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafValue::Address(address) => write!(f, "0x{}", hex::encode(address.as_slice())),
            LeafValue::Bool(b) => write!(f, "{b}"),
            LeafValue::String(s) => f.write_str(s),
            LeafValue::Bytes(bytes) => write!(f, "0x{}", hex::encode(bytes)),
            LeafValue::Int(v) => write!(f, "{v}"),
            LeafValue::Uint(v) => write!(f, "{v}"),
        }
    }
}

/// Two's complement sign extension of a primitive into 256 bits.
fn signed_from_i128(v: i128) -> I256 {
    if v >= 0 {
        I256::from_raw(U256::from(v as u128))
    } else {
        I256::from_raw(!U256::from((-(v + 1)) as u128))
    }
}

macro_rules! from_unsigned {
    ($($t:ty),*) => {
        $(
            impl From<$t> for LeafValue {
                fn from(v: $t) -> Self {
                    LeafValue::Uint(U256::from(v as u128))
                }
            }
        )*
    };
}

macro_rules! from_signed {
    ($($t:ty),*) => {
        $(
            impl From<$t> for LeafValue {
                fn from(v: $t) -> Self {
                    LeafValue::Int(signed_from_i128(v as i128))
                }
            }
        )*
    };
}

from_unsigned!(u8, u16, u32, u64, u128, usize);
from_signed!(i8, i16, i32, i64, i128, isize);

impl From<U256> for LeafValue {
    fn from(v: U256) -> Self {
        LeafValue::Uint(v)
    }
}

impl From<I256> for LeafValue {
    fn from(v: I256) -> Self {
        LeafValue::Int(v)
    }
}

impl From<Address> for LeafValue {
    fn from(v: Address) -> Self {
        LeafValue::Address(v)
    }
}

impl From<bool> for LeafValue {
    fn from(v: bool) -> Self {
        LeafValue::Bool(v)
    }
}

impl From<&str> for LeafValue {
    fn from(v: &str) -> Self {
        LeafValue::String(v.to_string())
    }
}

impl From<String> for LeafValue {
    fn from(v: String) -> Self {
        LeafValue::String(v)
    }
}

impl From<Vec<u8>> for LeafValue {
    fn from(v: Vec<u8>) -> Self {
        LeafValue::Bytes(v)
    }
}

impl From<&[u8]> for LeafValue {
    fn from(v: &[u8]) -> Self {
        LeafValue::Bytes(v.to_vec())
    }
}
