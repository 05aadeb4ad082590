//! Caesar shift
//!
//! Rotates ASCII letters within their own case; everything else passes
//! through untouched.

/// Shift every ASCII letter forward by `shift` positions (negative shifts
/// rotate backwards).
pub fn caesar_shift(text: &str, shift: i32) -> String {
    let shift = shift.rem_euclid(26) as u8;
    text.chars().map(|ch| shift_char(ch, shift)).collect()
}

/// Undo an encryption made with `key`.
pub fn caesar_decrypt(text: &str, key: u8) -> String {
    caesar_shift(text, -i32::from(key))
}

/// Encrypt with `key` (the inverse of [`caesar_decrypt`]).
pub fn caesar_encrypt(text: &str, key: u8) -> String {
    caesar_shift(text, i32::from(key))
}

#[inline]
fn shift_char(ch: char, shift: u8) -> char {
    match ch {
        'A'..='Z' => (b'A' + (ch as u8 - b'A' + shift) % 26) as char,
        'a'..='z' => (b'a' + (ch as u8 - b'a' + shift) % 26) as char,
        _ => ch,
    }
}
