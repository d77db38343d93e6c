use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// A stable key over `(method, prompt, binary_fingerprint)`. Identical
/// prompts (byte-equal) always yield the same key, per spec.md §4.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey(u64);

impl CacheKey {
    pub fn new(method: &str, prompt: &str, binary_fingerprint: Option<&[u8]>) -> Self {
        let mut hasher = DefaultHasher::new();
        method.hash(&mut hasher);
        prompt.hash(&mut hasher);
        if let Some(bytes) = binary_fingerprint {
            bytes.hash(&mut hasher);
        }
        CacheKey(hasher.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_inputs_yield_identical_keys() {
        let a = CacheKey::new("text", "hello", None);
        let b = CacheKey::new("text", "hello", None);
        assert_eq!(a, b);
    }

    #[test]
    fn different_prompts_yield_different_keys() {
        let a = CacheKey::new("text", "hello", None);
        let b = CacheKey::new("text", "goodbye", None);
        assert_ne!(a, b);
    }

    #[test]
    fn binary_fingerprint_participates_in_the_key() {
        let a = CacheKey::new("image", "describe", Some(b"abc"));
        let b = CacheKey::new("image", "describe", Some(b"xyz"));
        assert_ne!(a, b);
    }
}
