//! Classical cipher stages
//!
//! Pure transforms used by the search pipeline. Every parametric cipher
//! exposes its decryption direction (the one the brute-force path uses) and
//! the matching encryption so round trips can be checked.

pub mod b64;
pub mod bifid;
pub mod caesar;
pub mod columnar;
pub mod railfence;
pub mod reverse;
pub mod xor;

use std::fmt;

pub use b64::base64_probe;
pub use bifid::{bifid_decrypt, bifid_encrypt, BifidAlphabet, KeyedSquare};
pub use caesar::{caesar_decrypt, caesar_encrypt, caesar_shift};
pub use columnar::{
    columnar_decrypt, columnar_encrypt, double_columnar_decrypt, double_columnar_encrypt,
};
pub use railfence::{railfence_decrypt, railfence_encrypt};
pub use reverse::reverse_text;
pub use xor::repeating_xor;

/// Failures raised by the cipher library itself.
///
/// Inside a search these are per-attempt outcomes, not run failures; the
/// executor folds them into "no result".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    /// Bifid alphabet length is not a perfect square.
    NonSquareAlphabet(usize),
    /// Bifid alphabet contains a non-ASCII character.
    NonAsciiAlphabet(char),
    /// Bifid alphabet lists the same character twice.
    DuplicateAlphabetChar(char),
    /// Fractionation period must be at least 1.
    InvalidPeriod,
    /// Input was not valid standard Base64.
    MalformedBase64,
}

impl fmt::Display for CipherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CipherError::NonSquareAlphabet(len) => {
                write!(f, "alphabet length must be a perfect square, got {len}")
            }
            CipherError::NonAsciiAlphabet(ch) => {
                write!(f, "alphabet must be ASCII, found {ch:?}")
            }
            CipherError::DuplicateAlphabetChar(ch) => {
                write!(f, "alphabet lists {ch:?} more than once")
            }
            CipherError::InvalidPeriod => write!(f, "period must be > 0"),
            CipherError::MalformedBase64 => write!(f, "input is not valid Base64"),
        }
    }
}

impl std::error::Error for CipherError {}
