//! Prompt fingerprints, so logs can tell which prompt revision was in use.

use sha2::{Digest, Sha256};
use std::fmt::Write;

/// Hex SHA-256 digest of a prompt.
pub fn hash_prompt(prompt: &str) -> String {
    Sha256::digest(prompt.as_bytes())
        .iter()
        .fold(String::with_capacity(64), |mut hex, byte| {
            let _ = write!(hex, "{:02x}", byte);
            hex
        })
}
