//! Report tag generation.
//!
//! Tags are 4 characters drawn uniformly from `0-9A-Z` (36^4 ≈ 1.68M
//! combinations). No collision check is performed against existing tags;
//! uniqueness is probable, not guaranteed, and callers must treat it that
//! way. Tags are displayed and searched case-insensitively as uppercase.

use rand::Rng;

const TAG_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const TAG_LEN: usize = 4;

/// Generate a new report tag. Never fails, holds no state.
pub fn generate_tag() -> String {
    let mut rng = rand::rng();
    (0..TAG_LEN)
        .map(|_| TAG_ALPHABET[rng.random_range(0..TAG_ALPHABET.len())] as char)
        .collect()
}

/// Normalize a caller-supplied tag for comparison (uppercase).
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_uppercase()
}
