//! Serialized representations of terms
//!
//! The interner keys its dictionary on the serialized form of a term, so the
//! encoding must be deterministic: the same term always produces the same text.

use crate::core::Term;
use crate::error::Result;

/// Encode a term into the string form that is interned and stored.
pub fn encode_term(term: &Term) -> Result<String> {
    Ok(serde_json::to_string(term)?)
}

/// Decode a term from its stored string form.
pub fn decode_term(encoded: &str) -> Result<Term> {
    Ok(serde_json::from_str(encoded)?)
}
