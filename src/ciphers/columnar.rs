//! Columnar and double columnar transposition
//!
//! The key's column order comes from a stable sort of `(char, index)` pairs,
//! so repeated letters are ranked left to right. Incomplete grids are
//! handled the irregular way: the trailing `rows * k - len` columns (by
//! column index, not by rank) are one cell shorter.

/// Rank of each key column: `order[col] = rank`.
fn key_order(key: &[char]) -> Vec<usize> {
    let mut pairs: Vec<(char, usize)> = key.iter().copied().zip(0..).collect();
    pairs.sort();
    let mut order = vec![0; key.len()];
    for (rank, &(_, col)) in pairs.iter().enumerate() {
        order[col] = rank;
    }
    order
}

/// Inverse of [`key_order`]: `rank_to_col[rank] = col`.
fn rank_to_col(order: &[usize]) -> Vec<usize> {
    let mut out = vec![0; order.len()];
    for (col, &rank) in order.iter().enumerate() {
        out[rank] = col;
    }
    out
}

/// Decrypt a single columnar transposition.
///
/// Keys of length 0 or 1 leave the text unchanged.
pub fn columnar_decrypt(cipher: &str, key: &str) -> String {
    let key: Vec<char> = key.chars().collect();
    let k = key.len();
    if k <= 1 {
        return cipher.to_string();
    }
    let chars: Vec<char> = cipher.chars().collect();
    let n = chars.len();
    if n == 0 {
        return String::new();
    }
    let rows = n.div_ceil(k);
    let shaded = rows * k - n;

    let mut col_lens = vec![rows; k];
    for len in col_lens.iter_mut().skip(k - shaded) {
        *len -= 1;
    }

    let by_rank = rank_to_col(&key_order(&key));
    let mut columns: Vec<&[char]> = vec![&[] as &[char]; k];
    let mut idx = 0;
    for &col in &by_rank {
        let len = col_lens[col];
        columns[col] = &chars[idx..idx + len];
        idx += len;
    }

    let mut out = String::with_capacity(cipher.len());
    for r in 0..rows {
        for column in &columns {
            if let Some(&ch) = column.get(r) {
                out.push(ch);
            }
        }
    }
    out
}

/// Encrypt with a single columnar transposition (inverse of
/// [`columnar_decrypt`]).
pub fn columnar_encrypt(plain: &str, key: &str) -> String {
    let key: Vec<char> = key.chars().collect();
    let k = key.len();
    if k <= 1 {
        return plain.to_string();
    }
    let mut columns: Vec<String> = vec![String::new(); k];
    for (i, ch) in plain.chars().enumerate() {
        columns[i % k].push(ch);
    }
    let by_rank = rank_to_col(&key_order(&key));
    by_rank.iter().map(|&col| columns[col].as_str()).collect()
}

/// Decrypt a double transposition made by encrypting with `key1` first and
/// then `key2`.
pub fn double_columnar_decrypt(cipher: &str, key1: &str, key2: &str) -> String {
    columnar_decrypt(&columnar_decrypt(cipher, key2), key1)
}

/// Encrypt with `key1` then `key2`.
pub fn double_columnar_encrypt(plain: &str, key1: &str, key2: &str) -> String {
    columnar_encrypt(&columnar_encrypt(plain, key1), key2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_order_is_stable_for_repeats() {
        let key: Vec<char> = "ATTACK".chars().collect();
        // A(0) A(3) C(4) K(5) T(1) T(2)
        assert_eq!(key_order(&key), vec![0, 4, 5, 1, 2, 3]);
    }

    #[test]
    fn test_decrypt_with_space() {
        assert_eq!(columnar_decrypt("ld ollerWHo", "ZOMBIES"), "Hello World");
    }

    #[test]
    fn test_decrypt_no_space() {
        assert_eq!(columnar_decrypt("LWOLDELOHR", "ZOMBIES"), "HELLOWORLD");
    }

    #[test]
    fn test_decrypt_punctuation() {
        assert_eq!(
            columnar_decrypt("s . e,siath eicTsr", "ZOMBIES"),
            "This, is a secret."
        );
    }

    #[test]
    fn test_single_char_key_is_identity() {
        assert_eq!(columnar_decrypt("CHECKTHISOUT", "A"), "CHECKTHISOUT");
        assert_eq!(columnar_encrypt("CHECKTHISOUT", ""), "CHECKTHISOUT");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(columnar_decrypt("", "KEY"), "");
        assert_eq!(columnar_encrypt("", "KEY"), "");
    }

    #[test]
    fn test_encrypt_known_vector() {
        assert_eq!(columnar_encrypt("Hello World", "ZOMBIES"), "ld ollerWHo");
    }

    #[test]
    fn test_key_longer_than_text() {
        let enc = columnar_encrypt("HI", "LONGERKEY");
        assert_eq!(columnar_decrypt(&enc, "LONGERKEY"), "HI");
    }

    #[test]
    fn test_double_decrypt_vectors() {
        assert_eq!(
            double_columnar_decrypt("lroHdwlle o", "ZOMBIE", "ATTACK"),
            "Hello world"
        );
        assert_eq!(
            double_columnar_decrypt("LEOOLLDRWH", "ZOMBIE", "ATTACK"),
            "HELLOWORLD"
        );
        assert_eq!(
            double_columnar_decrypt(" shhoWwlo?aed usk ", "ZOMBIE", "ATTACK"),
            "Who should we ask?"
        );
    }

    #[test]
    fn test_double_same_key() {
        assert_eq!(
            double_columnar_decrypt("oHldw olelr", "ZOMBIE", "ZOMBIE"),
            "Hello world"
        );
    }

    #[test]
    fn test_double_encrypt_known_vector() {
        assert_eq!(
            double_columnar_encrypt("Hello world", "ZOMBIE", "ATTACK"),
            "lroHdwlle o"
        );
    }
}
