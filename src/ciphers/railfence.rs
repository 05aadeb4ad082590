//! Rail fence transposition
//!
//! The zig-zag rail assignment is computed once per call and used in both
//! directions: encryption concatenates the rails, decryption refills them.

/// Rail index of every position for a zig-zag over `len` characters.
fn rail_pattern(len: usize, num_rails: usize) -> Vec<usize> {
    let mut pattern = Vec::with_capacity(len);
    let mut rail = 0usize;
    let mut descending = true;
    for _ in 0..len {
        pattern.push(rail);
        if descending {
            rail += 1;
            if rail == num_rails - 1 {
                descending = false;
            }
        } else {
            rail -= 1;
            if rail == 0 {
                descending = true;
            }
        }
    }
    pattern
}

/// Decrypt a rail fence ciphertext.
///
/// `num_rails <= 1` and empty input are the identity.
pub fn railfence_decrypt(cipher: &str, num_rails: usize) -> String {
    if num_rails <= 1 || cipher.is_empty() {
        return cipher.to_string();
    }
    let chars: Vec<char> = cipher.chars().collect();
    let pattern = rail_pattern(chars.len(), num_rails);

    let mut out = vec!['\0'; chars.len()];
    let mut src = chars.iter();
    for rail in 0..num_rails {
        for (pos, _) in pattern.iter().enumerate().filter(|(_, &r)| r == rail) {
            if let Some(&ch) = src.next() {
                out[pos] = ch;
            }
        }
    }
    out.into_iter().collect()
}

/// Encrypt with `num_rails` rails (inverse of [`railfence_decrypt`]).
pub fn railfence_encrypt(plain: &str, num_rails: usize) -> String {
    if num_rails <= 1 || plain.is_empty() {
        return plain.to_string();
    }
    let chars: Vec<char> = plain.chars().collect();
    let pattern = rail_pattern(chars.len(), num_rails);

    let mut rails: Vec<String> = vec![String::new(); num_rails];
    for (&ch, &rail) in chars.iter().zip(&pattern) {
        rails[rail].push(ch);
    }
    rails.concat()
}
