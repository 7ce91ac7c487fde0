use sha2::{Digest, Sha256};

/// Builds a gravatar URL from an email address.
///
/// The address is normalized (trimmed, lowercased) before hashing so the
/// same mailbox always maps to the same avatar.
pub fn gravatar_url(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());
    let hash: String = digest.iter().map(|b| format!("{:02x}", b)).collect();

    format!("https://secure.gravatar.com/avatar/{}?s=84&d=retro", hash)
}
