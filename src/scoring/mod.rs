//! Plaintext scoring
//!
//! A candidate's final payload is scored in two tiers:
//!
//! - **Below 1.0**: the payload has at least one non-printable byte and the
//!   score is its printable ratio. English scoring is skipped.
//! - **1.0 to 2.0**: fully printable; the score is `1 + english_score`.
//!
//! The English score blends a letter-frequency fit (weight 0.7), a
//! recognized-word ratio (weight 0.3) and a bonus for natural word spacing,
//! capped at 1.0.

pub mod frequency;
pub mod words;

pub use frequency::{chi_squared, chi_squared_score, ENGLISH_FREQ};
pub use words::CommonWords;

const CHI_WEIGHT: f64 = 0.7;
const WORD_WEIGHT: f64 = 0.3;

/// True for printable ASCII (0x20..=0x7E) plus tab, LF and CR.
#[inline]
pub fn is_printable(b: u8) -> bool {
    (0x20..0x7f).contains(&b) || matches!(b, b'\t' | b'\n' | b'\r')
}

/// Fraction of printable bytes; empty input scores 0.
pub fn printable_ratio(bytes: &[u8]) -> f64 {
    if bytes.is_empty() {
        return 0.0;
    }
    let printable = bytes.iter().filter(|&&b| is_printable(b)).count();
    printable as f64 / bytes.len() as f64
}

/// Fraction of alphabetic tokens (uppercased) found in `common`.
///
/// Tokens are maximal runs of alphabetic characters. No tokens scores 0.
pub fn word_score(text: &str, common: &CommonWords) -> f64 {
    let mut total = 0usize;
    let mut recognized = 0usize;
    for token in text.split(|c: char| !c.is_alphabetic()).filter(|t| !t.is_empty()) {
        total += 1;
        if common.contains(&token.to_uppercase()) {
            recognized += 1;
        }
    }
    if total == 0 {
        0.0
    } else {
        recognized as f64 / total as f64
    }
}

/// Bonus for a space ratio close to running English text.
fn space_bonus(text: &str) -> f64 {
    let len = text.chars().count();
    if len == 0 {
        return 0.0;
    }
    let ratio = text.chars().filter(|&c| c == ' ').count() as f64 / len as f64;
    if (0.10..=0.25).contains(&ratio) {
        0.2
    } else if (0.05..0.10).contains(&ratio) || (ratio > 0.25 && ratio <= 0.35) {
        0.1
    } else {
        0.0
    }
}

/// English-likeness in `[0, 1]`.
///
/// The word term is dropped when `common` is `None` or empty.
pub fn english_score(text: &str, common: Option<&CommonWords>) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let chi = chi_squared_score(text);
    let words = match common {
        Some(set) if !set.is_empty() => word_score(text, set),
        _ => 0.0,
    };
    (chi * CHI_WEIGHT + words * WORD_WEIGHT + space_bonus(text)).min(1.0)
}

/// Final score of a payload in `[0, 2]`.
///
/// A result `>= 1.0` always means fully printable.
pub fn combined_score(bytes: &[u8], common: Option<&CommonWords>) -> f64 {
    let ratio = printable_ratio(bytes);
    if ratio < 1.0 {
        return ratio;
    }
    let text = String::from_utf8_lossy(bytes);
    1.0 + english_score(&text, common)
}
