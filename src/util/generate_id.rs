use sha2::{Digest, Sha256};

const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Stable id for a suggested recipe, derived from its title.
///
/// Titles are compared case- and whitespace-insensitively so that the same
/// suggestion returned twice lands on the same id.
pub fn recipe_id(title: &str) -> String {
    let key = title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let hash = hasher.finalize();

    // First 96 bits of the digest, low 16 base62 digits.
    let mut num = [0u8; 16];
    num[4..].copy_from_slice(&hash[..12]);
    let mut value = u128::from_be_bytes(num);

    let mut id = String::with_capacity(16);
    for _ in 0..16 {
        id.push(ALPHABET[(value % 62) as usize] as char);
        value /= 62;
    }
    id
}
