//! Property tests for the space enumeration, the cipher inverses and the
//! scorer.

use proptest::prelude::*;

use rapid_decipher::ciphers::bifid::{BASE64_ALPHABET, STANDARD_ALPHABET};
use rapid_decipher::ciphers::{
    bifid_decrypt, bifid_encrypt, caesar_shift, columnar_decrypt, columnar_encrypt,
    double_columnar_decrypt, double_columnar_encrypt, railfence_decrypt, railfence_encrypt,
    repeating_xor, BifidAlphabet,
};
use rapid_decipher::scoring::{combined_score, is_printable};
use rapid_decipher::space::{mixed_radix_rank, mixed_radix_unrank, total_combinations};

const PROPTEST_CASES: u32 = 256;

fn text_from(alphabet: &'static str, max_len: usize) -> impl Strategy<Value = String> {
    let chars: Vec<char> = alphabet.chars().collect();
    prop::collection::vec(prop::sample::select(chars), 0..max_len)
        .prop_map(|v| v.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(PROPTEST_CASES))]

    #[test]
    fn unrank_then_rank_is_identity(
        bases in prop::collection::vec(1usize..40, 0..5),
        seed in any::<u64>(),
    ) {
        let total = total_combinations(&bases).unwrap();
        let x = seed as u128 % total;
        let digits = mixed_radix_unrank(x, &bases);
        prop_assert!(digits.iter().zip(&bases).all(|(d, b)| d < b));
        prop_assert_eq!(mixed_radix_rank(&digits, &bases), x);
    }

    #[test]
    fn caesar_shifts_cancel(text in "[ -~]{0,64}", shift in 0i32..26) {
        prop_assert_eq!(caesar_shift(&caesar_shift(&text, shift), 26 - shift), text);
    }

    #[test]
    fn columnar_round_trip(text in "[ -~]{0,80}", key in "[A-Z]{0,9}") {
        prop_assert_eq!(columnar_decrypt(&columnar_encrypt(&text, &key), &key), text);
    }

    #[test]
    fn double_columnar_round_trip(
        text in "[ -~]{0,80}",
        k1 in "[A-Z]{1,7}",
        k2 in "[A-Z]{1,7}",
    ) {
        let cipher = double_columnar_encrypt(&text, &k1, &k2);
        prop_assert_eq!(double_columnar_decrypt(&cipher, &k1, &k2), text);
    }

    #[test]
    fn railfence_round_trip(text in "[ -~]{0,80}", rails in 2usize..31) {
        prop_assert_eq!(railfence_decrypt(&railfence_encrypt(&text, rails), rails), text);
    }

    #[test]
    fn railfence_with_one_rail_is_identity(text in "[ -~]{0,40}", rails in 0usize..2) {
        prop_assert_eq!(railfence_decrypt(&text, rails), text.clone());
        prop_assert_eq!(railfence_encrypt(&text, rails), text);
    }

    #[test]
    fn bifid_standard_round_trip(
        text in text_from(STANDARD_ALPHABET, 60),
        key in "[A-Z]{0,10}",
        period in 1usize..12,
    ) {
        let alphabet = BifidAlphabet::Standard;
        let cipher = bifid_encrypt(&text, &key, period, &alphabet).unwrap();
        prop_assert_eq!(bifid_decrypt(&cipher, &key, period, &alphabet).unwrap(), text);
    }

    #[test]
    fn bifid_base64_round_trip(
        text in text_from(BASE64_ALPHABET, 60),
        key in "[A-Za-z0-9]{0,10}",
        period in 1usize..12,
    ) {
        let alphabet = BifidAlphabet::Base64;
        let cipher = bifid_encrypt(&text, &key, period, &alphabet).unwrap();
        prop_assert_eq!(bifid_decrypt(&cipher, &key, period, &alphabet).unwrap(), text);
    }

    #[test]
    fn xor_is_an_involution(
        data in prop::collection::vec(any::<u8>(), 0..64),
        key in prop::collection::vec(any::<u8>(), 1..8),
    ) {
        prop_assert_eq!(repeating_xor(&repeating_xor(&data, &key), &key), data);
    }

    #[test]
    fn xor_with_empty_key_is_empty(data in prop::collection::vec(any::<u8>(), 0..64)) {
        prop_assert!(repeating_xor(&data, &[]).is_empty());
    }

    #[test]
    fn score_stays_in_range(data in prop::collection::vec(any::<u8>(), 0..64)) {
        let score = combined_score(&data, None);
        prop_assert!((0.0..=2.0).contains(&score));
    }

    #[test]
    fn non_printable_payload_scores_its_ratio(
        data in prop::collection::vec(any::<u8>(), 1..64),
        bad in 0u8..0x09,
    ) {
        let mut data = data;
        data.push(bad);
        let printable = data.iter().filter(|&&b| is_printable(b)).count();
        let expected = printable as f64 / data.len() as f64;
        let score = combined_score(&data, None);
        prop_assert!(score < 1.0);
        prop_assert_eq!(score, expected);
    }
}
