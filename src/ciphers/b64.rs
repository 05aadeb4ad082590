//! Base64 probe (`b64` stage)
//!
//! Decoding is non-validating: characters outside the Base64 alphabet are
//! skipped, `=` before the third character of a quad is ignored, and the
//! first complete padded quad ends the input. Non-zero trailing bits are
//! accepted. Non-ASCII text and a dangling partial quad are rejected.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;

use super::CipherError;

const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

#[inline]
fn is_b64_data(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/')
}

/// Canonical padded form of `text`, cut after the first padded quad.
fn canonicalize(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut quad_pos = 0usize;
    let mut pads = 0usize;
    for b in text.bytes() {
        if b == b'=' {
            if quad_pos >= 2 {
                pads += 1;
                if quad_pos + pads >= 4 {
                    out.resize(out.len() + 4 - quad_pos, b'=');
                    break;
                }
            }
        } else if is_b64_data(b) {
            out.push(b);
            quad_pos = (quad_pos + 1) % 4;
        }
    }
    out
}

/// Decode `text` as standard Base64.
pub fn base64_probe(text: &str) -> Result<Vec<u8>, CipherError> {
    if !text.is_ascii() {
        return Err(CipherError::MalformedBase64);
    }
    LENIENT
        .decode(canonicalize(text))
        .map_err(|_| CipherError::MalformedBase64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid() {
        assert_eq!(base64_probe("SGVsbG8gd29ybGQ=").unwrap(), b"Hello world");
        assert_eq!(base64_probe("U2VjcmV0").unwrap(), b"Secret");
    }

    #[test]
    fn test_missing_padding_fails() {
        assert_eq!(
            base64_probe("SGVsbG8gd29ybGQ"),
            Err(CipherError::MalformedBase64)
        );
    }

    #[test]
    fn test_accepts_non_zero_trailing_bits() {
        assert_eq!(base64_probe("QR==").unwrap(), b"A");
    }

    #[test]
    fn test_stops_at_first_padded_quad() {
        assert_eq!(base64_probe("SGVsbG8=QQ==").unwrap(), b"Hello");
        assert_eq!(base64_probe("QQ==garbage").unwrap(), b"A");
    }

    #[test]
    fn test_early_padding_is_skipped() {
        assert_eq!(base64_probe("=U2Vj=cmV0").unwrap(), b"Secret");
    }

    #[test]
    fn test_non_ascii_fails() {
        assert_eq!(base64_probe("U2Vj\u{e9}cmV0"), Err(CipherError::MalformedBase64));
    }

    #[test]
    fn test_dangling_character_fails() {
        assert_eq!(base64_probe("U2VjcmV0Q"), Err(CipherError::MalformedBase64));
    }

    #[test]
    fn test_ignores_whitespace() {
        assert_eq!(base64_probe("U2Vj\ncmV0 ").unwrap(), b"Secret");
    }

    #[test]
    fn test_empty_input_decodes_empty() {
        assert_eq!(base64_probe("").unwrap(), Vec::<u8>::new());
    }
}
