//! Request-addressed cache key generation.

use sha2::{Digest, Sha256};

/// Compute the storage key for a request descriptor.
pub fn compute_cache_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_stability() {
        let hash1 = compute_cache_key("GET", "https://example.test/");
        let hash2 = compute_cache_key("GET", "https://example.test/");
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_different_method() {
        let get = compute_cache_key("GET", "https://example.test/api/data");
        let post = compute_cache_key("POST", "https://example.test/api/data");
        assert_ne!(get, post);
    }

    #[test]
    fn test_hash_separator_prevents_collisions() {
        let a = compute_cache_key("GETh", "ttps://x");
        let b = compute_cache_key("GET", "https://x");
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_format() {
        let hash = compute_cache_key("GET", "https://example.test/");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
