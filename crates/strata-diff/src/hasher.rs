use strata_types::ContentHash;

use crate::error::{DiffError, DiffResult};

/// Domain-separated BLAKE3 hasher over canonical JSON.
///
/// Each hasher carries a domain tag that is prepended to every hash
/// computation, so a property tree and a truncated leaf value with
/// identical bytes never collide.
///
/// Canonicalization relies on the property-tree representation: the top
/// level is a `BTreeMap` and nested objects use `serde_json`'s default
/// ordered map, so serializing the same logical tree always yields the
/// same bytes.
pub struct TreeHasher {
    domain: &'static str,
}

impl TreeHasher {
    /// Hasher for whole property trees (content hashes).
    pub const PROPERTIES: Self = Self {
        domain: "strata-properties-v1",
    };
    /// Hasher for single truncated leaf values.
    pub const VALUE: Self = Self {
        domain: "strata-value-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> ContentHash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        ContentHash::from_hash(*hasher.finalize().as_bytes())
    }

    /// Hash a serializable value as canonical JSON with domain separation.
    pub fn hash_json<T: serde::Serialize>(&self, value: &T) -> DiffResult<ContentHash> {
        let data =
            serde_json::to_vec(value).map_err(|e| DiffError::Serialization(e.to_string()))?;
        Ok(self.hash(&data))
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hash_is_deterministic() {
        let a = TreeHasher::PROPERTIES.hash(b"same bytes");
        let b = TreeHasher::PROPERTIES.hash(b"same bytes");
        assert_eq!(a, b);
    }

    #[test]
    fn different_domains_produce_different_hashes() {
        let data = b"same content";
        assert_ne!(
            TreeHasher::PROPERTIES.hash(data),
            TreeHasher::VALUE.hash(data)
        );
    }

    #[test]
    fn hash_json_is_key_order_independent() {
        // BTreeMap-backed maps serialize in sorted key order regardless of
        // insertion order.
        let a = json!({"b": 2, "a": 1});
        let b = json!({"a": 1, "b": 2});
        assert_eq!(
            TreeHasher::PROPERTIES.hash_json(&a).unwrap(),
            TreeHasher::PROPERTIES.hash_json(&b).unwrap()
        );
    }
}
