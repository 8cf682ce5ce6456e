use alloy_primitives::{I256, U256};

use crate::{AbiType, EncodingError, EncodingErrorKind, LeafSchema, LeafValue};

/// Every head slot and every tail chunk is a multiple of this many bytes.
pub const WORD_SIZE: usize = 32;

type Word = [u8; WORD_SIZE];

/// Encode a tuple the way Solidity's `abi.encode` does.
///
/// Static fields occupy one head word each. A dynamic field's head word is
/// the byte offset, from the start of the encoding, of its tail entry; the
/// entry is the length word followed by the data right-padded to a word
/// boundary.
pub fn encode_leaf(schema: &LeafSchema, values: &[LeafValue]) -> Result<Vec<u8>, EncodingError> {
    schema.check_arity(values.len())?;

    let head_len = WORD_SIZE * schema.len();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for (field, (ty, value)) in schema.fields().iter().zip(values).enumerate() {
        let fail = |kind: EncodingErrorKind| EncodingError::new(field, kind);
        if ty.is_dynamic() {
            let data = dynamic_data(*ty, value).map_err(fail)?;
            head.extend_from_slice(&usize_word(head_len + tail.len()));
            tail.extend_from_slice(&usize_word(data.len()));
            tail.extend_from_slice(data);
            let padding = (WORD_SIZE - data.len() % WORD_SIZE) % WORD_SIZE;
            tail.resize(tail.len() + padding, 0);
        } else {
            head.extend_from_slice(&static_word(*ty, value).map_err(fail)?);
        }
    }

    head.extend_from_slice(&tail);
    Ok(head)
}

fn usize_word(n: usize) -> Word {
    U256::from(n as u64).to_be_bytes::<WORD_SIZE>()
}

fn mismatch(ty: AbiType, value: &LeafValue) -> EncodingErrorKind {
    EncodingErrorKind::TypeMismatch {
        ty,
        found: value.kind(),
    }
}

fn overflow(ty: AbiType, value: &LeafValue) -> EncodingErrorKind {
    EncodingErrorKind::Overflow {
        ty,
        value: value.to_string(),
    }
}

fn dynamic_data(ty: AbiType, value: &LeafValue) -> Result<&[u8], EncodingErrorKind> {
    match (ty, value) {
        (AbiType::String, LeafValue::String(s)) => Ok(s.as_bytes()),
        (AbiType::Bytes, LeafValue::Bytes(b)) => Ok(b),
        _ => Err(mismatch(ty, value)),
    }
}

fn static_word(ty: AbiType, value: &LeafValue) -> Result<Word, EncodingErrorKind> {
    let mut word = [0u8; WORD_SIZE];
    match (ty, value) {
        (AbiType::Address, LeafValue::Address(address)) => {
            word[WORD_SIZE - 20..].copy_from_slice(address.as_slice());
        }
        (AbiType::Bool, LeafValue::Bool(b)) => {
            word[WORD_SIZE - 1] = u8::from(*b);
        }
        (AbiType::FixedBytes(len), LeafValue::Bytes(bytes)) => {
            if bytes.len() != len {
                return Err(EncodingErrorKind::ByteLength {
                    ty,
                    expected: len,
                    actual: bytes.len(),
                });
            }
            word[..len].copy_from_slice(bytes);
        }
        (AbiType::Uint(bits), LeafValue::Uint(v)) => {
            if v.bit_len() > bits {
                return Err(overflow(ty, value));
            }
            word = v.to_be_bytes::<WORD_SIZE>();
        }
        (AbiType::Uint(bits), LeafValue::Int(v)) => {
            if v.is_negative() || v.into_raw().bit_len() > bits {
                return Err(overflow(ty, value));
            }
            word = v.into_raw().to_be_bytes::<WORD_SIZE>();
        }
        (AbiType::Int(bits), LeafValue::Int(v)) => {
            if !fits_signed(*v, bits) {
                return Err(overflow(ty, value));
            }
            word = v.into_raw().to_be_bytes::<WORD_SIZE>();
        }
        (AbiType::Int(bits), LeafValue::Uint(v)) => {
            // the sign bit must stay clear
            if v.bit_len() >= bits {
                return Err(overflow(ty, value));
            }
            word = v.to_be_bytes::<WORD_SIZE>();
        }
        _ => return Err(mismatch(ty, value)),
    }
    Ok(word)
}

/// `intN` holds `-2^(N-1) ..= 2^(N-1) - 1`.
fn fits_signed(v: I256, bits: usize) -> bool {
    let raw = v.into_raw();
    let magnitude_bits = if v.is_negative() {
        (!raw).bit_len()
    } else {
        raw.bit_len()
    };
    magnitude_bits < bits
}
