use thiserror::Error;

use crate::AbiType;

/// A tuple that cannot be encoded under its schema.
///
/// `field` is the zero-based index of the offending field. For arity
/// mismatches it is the first index present on only one side.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("leaf field {field}: {kind}")]
pub struct EncodingError {
    /// Index of the field that failed.
    pub field: usize,
    /// What went wrong with it.
    pub kind: EncodingErrorKind,
}

impl EncodingError {
    pub(crate) fn new(field: usize, kind: EncodingErrorKind) -> Self {
        Self { field, kind }
    }
}

/// The reason a field could not be encoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingErrorKind {
    /// The tuple and the schema disagree on the number of fields.
    #[error("schema declares {expected} fields but the tuple has {actual}")]
    ArityMismatch {
        /// Fields in the schema.
        expected: usize,
        /// Values in the tuple.
        actual: usize,
    },
    /// The type tag is not one the encoder understands.
    #[error("unsupported type tag `{0}`")]
    UnsupportedType(String),
    /// The value's variant cannot represent the declared type.
    #[error("{ty} field cannot hold a {found} value")]
    TypeMismatch {
        /// Declared type.
        ty: AbiType,
        /// Variant of the supplied value.
        found: &'static str,
    },
    /// An integer outside the declared width.
    #[error("value {value} does not fit in {ty}")]
    Overflow {
        /// Declared type.
        ty: AbiType,
        /// The value, in decimal.
        value: String,
    },
    /// Wrong length for an address or `bytesN` value.
    #[error("{ty} expects {expected} bytes, got {actual}")]
    ByteLength {
        /// Declared type.
        ty: AbiType,
        /// Required length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },
    /// Text that does not read as the declared type.
    #[error("cannot read `{text}` as {ty}")]
    Unparsable {
        /// Declared type.
        ty: AbiType,
        /// The offending text.
        text: String,
    },
}
