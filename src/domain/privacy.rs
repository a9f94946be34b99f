use sha2::{Digest, Sha256};

/// Masks a destination for logging: first 3 and last 4 characters kept,
/// middle elided. Anything too short to mask safely collapses entirely.
/// Phone numbers are PII; no log line may carry one in the clear.
pub fn mask_destination(destination: &str) -> String {
    let chars: Vec<char> = destination.chars().collect();
    if chars.len() > 6 {
        let head: String = chars[..3].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}***{tail}")
    } else {
        "***".to_string()
    }
}

/// Derives the rate-limit key material for a destination: SHA-256, truncated
/// to a 16-hex-char prefix. Raw numbers never become map keys.
pub fn hash_destination(destination: &str) -> String {
    let digest = Sha256::digest(destination.as_bytes());
    hex::encode(digest)[..16].to_string()
}
