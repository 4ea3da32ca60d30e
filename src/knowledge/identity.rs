//! Content-addressed identity.
//!
//! An entry's id is the SHA-256 of its exact text bytes, so identical text
//! always maps to the same id and any byte difference (whitespace, case)
//! produces a new one.

use sha2::{Digest, Sha256};

use super::{KnowledgeStore, Result};
use crate::index::Filter;

/// Lowercase hex SHA-256 of `text`. 64 characters.
pub fn derive_id(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

impl KnowledgeStore {
    /// Point lookup by primary key against committed index rows.
    pub fn exists(&self, id: &str) -> Result<bool> {
        let rows = self.index.query(&Filter::Id(id.to_string()), 1, 0)?;
        Ok(!rows.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digest() {
        assert_eq!(
            derive_id("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn no_normalization_is_applied() {
        let base = derive_id("Rust is fast");
        assert_ne!(base, derive_id("Rust is fast "));
        assert_ne!(base, derive_id("rust is fast"));
        assert_eq!(base, derive_id("Rust is fast"));
        assert_eq!(base.len(), 64);
    }
}
