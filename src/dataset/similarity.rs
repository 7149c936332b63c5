//! Exact duplicate detection by content hash

use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// SHA-256 digest of a patch buffer
pub type PatchDigest = [u8; 32];

/// Remembers the digest of every patch seen so far
///
/// The first occurrence of a buffer is the keeper, so results are only
/// deterministic when patches arrive in canonical enumeration order.
#[derive(Debug, Clone, Default)]
pub struct SimilarityFilter {
    seen: HashSet<PatchDigest>,
}

impl SimilarityFilter {
    /// Create an empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Digest of raw buffer bytes
    pub fn digest(buffer: &[u8]) -> PatchDigest {
        Sha256::digest(buffer).into()
    }

    /// Whether an identical buffer was seen before; registers it otherwise
    pub fn is_duplicate(&mut self, buffer: &[u8]) -> bool {
        !self.seen.insert(Self::digest(buffer))
    }

    /// Number of distinct buffers seen
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether no buffer was seen yet
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
