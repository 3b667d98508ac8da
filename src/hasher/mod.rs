//! Source object hasher (verb module)
//!
//! Canonical text and URL-safe digest of a source specification.
//!
//! The canonical text is written with a fixed attribute order, so two
//! specifications that differ only in JSON key order or in the order of
//! `and`/`or` children produce the same token.

mod canonical;

pub use canonical::{canonical_object, canonical_source};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use crate::source::{SourceSpec, SpecError};

/// Number of digest bytes kept in a token
const TOKEN_BYTES: usize = 16;

/// Hash canonical text into a 22 character URL-safe token
pub fn hash_text(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    URL_SAFE_NO_PAD.encode(&digest[..TOKEN_BYTES])
}

/// Token of a source path
pub fn source_hash(spec: &SourceSpec) -> String {
    hash_text(&canonical_source(spec))
}

/// Token of a source object (`source` plus the attributes that change what
/// the source denotes)
pub fn source_object_hash(object: &Map<String, Value>) -> Result<String, SpecError> {
    Ok(hash_text(&canonical_object(object)?))
}
