//! English single-letter frequency fit

/// Relative English letter frequencies, most common first.
pub const ENGLISH_FREQ: [(u8, f64); 26] = [
    (b'E', 0.1270),
    (b'T', 0.0906),
    (b'A', 0.0817),
    (b'O', 0.0751),
    (b'I', 0.0697),
    (b'N', 0.0675),
    (b'S', 0.0633),
    (b'H', 0.0609),
    (b'R', 0.0599),
    (b'D', 0.0425),
    (b'L', 0.0403),
    (b'C', 0.0278),
    (b'U', 0.0276),
    (b'M', 0.0241),
    (b'W', 0.0236),
    (b'F', 0.0223),
    (b'G', 0.0202),
    (b'Y', 0.0197),
    (b'P', 0.0193),
    (b'B', 0.0149),
    (b'V', 0.0098),
    (b'K', 0.0077),
    (b'J', 0.0015),
    (b'X', 0.0015),
    (b'Q', 0.0010),
    (b'Z', 0.0007),
];

/// Chi-squared value at which the normalized score reaches 0.
const CHI_SQUARED_CEILING: f64 = 500.0;

/// Raw chi-squared statistic of the letter counts in `text` against
/// [`ENGLISH_FREQ`]. `None` when the text has no ASCII letters.
pub fn chi_squared(text: &str) -> Option<f64> {
    let mut counts = [0usize; 26];
    let mut total = 0usize;
    for ch in text.chars() {
        if ch.is_ascii_alphabetic() {
            counts[(ch.to_ascii_uppercase() as u8 - b'A') as usize] += 1;
            total += 1;
        }
    }
    if total == 0 {
        return None;
    }

    let total = total as f64;
    let stat = ENGLISH_FREQ
        .iter()
        .map(|&(letter, freq)| {
            let expected = freq * total;
            let observed = counts[(letter - b'A') as usize] as f64;
            (observed - expected).powi(2) / expected
        })
        .sum();
    Some(stat)
}

/// Letter-frequency fit normalized to `[0, 1]` (1 is most English-like):
/// `max(0, 1 - chi2 / 500)`, or 0 for text without letters.
pub fn chi_squared_score(text: &str) -> f64 {
    match chi_squared(text) {
        Some(stat) => (1.0 - stat / CHI_SQUARED_CEILING).max(0.0),
        None => 0.0,
    }
}
