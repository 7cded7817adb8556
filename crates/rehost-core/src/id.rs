//! Identifier generation
//!
//! Filenames produced by the rehoster and the random naming policy of the
//! upload adapter both come from an [`IdGenerator`], so tests can swap in a
//! deterministic sequence.

use rand::Rng;

use crate::constants::{ID_ALPHABET, ID_LENGTH};

/// Source of collision-resistant identifiers.
pub trait IdGenerator: Send + Sync {
    fn new_id(&self) -> String;
}

/// 21-character identifiers over the URL-safe alphabet, the same shape the
/// database uses for primary keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct NanoIdGenerator;

impl IdGenerator for NanoIdGenerator {
    fn new_id(&self) -> String {
        let mut rng = rand::rng();
        (0..ID_LENGTH)
            .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_alphabet_is_url_safe() {
        assert_eq!(ID_ALPHABET.len(), 64);
        assert!(ID_ALPHABET
            .iter()
            .all(|c| c.is_ascii_alphanumeric() || *c == b'_' || *c == b'-'));
    }

    #[test]
    fn test_nanoid_shape() {
        let id = NanoIdGenerator.new_id();
        assert_eq!(id.len(), ID_LENGTH);
        assert!(id.bytes().all(|c| ID_ALPHABET.contains(&c)));
    }

    #[test]
    fn test_nanoid_does_not_repeat() {
        let ids: HashSet<String> = (0..1000).map(|_| NanoIdGenerator.new_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
