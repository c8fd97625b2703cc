//! Content fingerprints for change detection.

use blake3::Hasher as Blake3Hasher;

use crate::types::Fingerprint;

/// Computes content fingerprints.
///
/// BLAKE3 is used for speed; the fingerprint only detects changes and is
/// never relied upon for authentication.
pub struct ContentHasher;

impl ContentHasher {
    /// Fingerprint an in-memory byte buffer.
    ///
    /// Depends only on the bytes, never on the path they were read from.
    pub fn fingerprint(data: &[u8]) -> Fingerprint {
        let mut hasher = Blake3Hasher::new();
        hasher.update(data);
        Fingerprint::new(hasher.finalize().to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = ContentHasher::fingerprint(b"some image bytes");
        let b = ContentHasher::fingerprint(b"some image bytes");
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let a = ContentHasher::fingerprint(b"some image bytes");
        let b = ContentHasher::fingerprint(b"some image bytez");
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_of_empty_input() {
        let fp = ContentHasher::fingerprint(b"");
        assert_eq!(
            fp.as_str(),
            "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
        );
    }

    #[test]
    fn test_fingerprint_is_lowercase_hex() {
        let fp = ContentHasher::fingerprint(&[0u8, 1, 2, 3, 255]);
        assert_eq!(fp.as_str().len(), 64);
        assert!(fp
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }
}
