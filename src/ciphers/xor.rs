//! Repeating-key XOR

/// XOR `data` with `key` repeated to its length.
///
/// An empty key yields an empty result rather than passing data through.
pub fn repeating_xor(data: &[u8], key: &[u8]) -> Vec<u8> {
    if key.is_empty() {
        return Vec::new();
    }
    data.iter()
        .zip(key.iter().cycle())
        .map(|(&d, &k)| d ^ k)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_involution() {
        let plain = b"Hello, World!";
        let enc = repeating_xor(plain, b"KEY");
        assert_ne!(enc.as_slice(), plain.as_slice());
        assert_eq!(repeating_xor(&enc, b"KEY"), plain);
    }

    #[test]
    fn test_single_byte_key() {
        let enc = repeating_xor(b"ABCDEFGH", b"X");
        assert_eq!(repeating_xor(&enc, b"X"), b"ABCDEFGH");
    }

    #[test]
    fn test_empty_key_is_empty() {
        assert!(repeating_xor(b"test", b"").is_empty());
    }

    #[test]
    fn test_key_longer_than_data() {
        let enc = repeating_xor(b"HI", b"VERYLONGKEY");
        assert_eq!(enc.len(), 2);
        assert_eq!(repeating_xor(&enc, b"VERYLONGKEY"), b"HI");
    }

    #[test]
    fn test_known_bytes() {
        assert_eq!(
            repeating_xor(b"attack at dawn", b"KEY"),
            b"*1-*&2k$-k!8<+".to_vec()
        );
    }
}
