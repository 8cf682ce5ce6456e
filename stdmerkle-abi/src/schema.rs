use std::{fmt, str::FromStr};

use crate::{AbiType, EncodingError, EncodingErrorKind, LeafValue};

/// The ordered field types of every leaf in one tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LeafSchema {
    fields: Vec<AbiType>,
}

impl LeafSchema {
    /// Create a schema from already-parsed types.
    pub fn new(fields: Vec<AbiType>) -> Self {
        Self { fields }
    }

    /// Parse a schema from Solidity type tags such as `["string",
    /// "uint256"]`.
    ///
    /// Fails on the first tag that is not supported, reporting its index.
    pub fn parse<I, S>(tags: I) -> Result<Self, EncodingError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields = tags
            .into_iter()
            .enumerate()
            .map(|(field, tag)| {
                tag.as_ref()
                    .trim()
                    .parse::<AbiType>()
                    .map_err(|kind| EncodingError::new(field, kind))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { fields })
    }

    /// Field types in declaration order.
    pub fn fields(&self) -> &[AbiType] {
        &self.fields
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Canonical type tags, e.g. for a manifest or a tree dump.
    pub fn type_names(&self) -> Vec<String> {
        self.fields.iter().map(ToString::to_string).collect()
    }

    /// Check that a tuple has exactly one value per declared field.
    pub fn check_arity(&self, actual: usize) -> Result<(), EncodingError> {
        let expected = self.fields.len();
        if expected != actual {
            return Err(EncodingError::new(
                expected.min(actual),
                EncodingErrorKind::ArityMismatch { expected, actual },
            ));
        }
        Ok(())
    }

    /// Coerce one row of text fields (as read from CSV or JSON) into typed
    /// values.
    ///
    /// Widths are not checked here; [`encode_leaf`](crate::encode_leaf)
    /// does that.
    pub fn parse_row<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<LeafValue>, EncodingError> {
        self.check_arity(texts.len())?;
        self.fields
            .iter()
            .zip(texts)
            .enumerate()
            .map(|(field, (ty, text))| {
                LeafValue::parse(*ty, text.as_ref()).map_err(|kind| EncodingError::new(field, kind))
            })
            .collect()
    }
}

impl From<Vec<AbiType>> for LeafSchema {
    fn from(fields: Vec<AbiType>) -> Self {
        Self::new(fields)
    }
}

/// Tuple notation: `(string,address,uint256)`.
impl fmt::Display for LeafSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, ty) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{ty}")?;
        }
        f.write_str(")")
    }
}

/// Accepts the tuple notation produced by `Display`, with or without the
/// parentheses.
impl FromStr for LeafSchema {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s.trim();
        let inner = inner
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(inner);
        if inner.trim().is_empty() {
            return Ok(Self::new(Vec::new()));
        }
        Self::parse(inner.split(','))
    }
}
