//! # rapid-decipher
//!
//! Brute-force search over pipelines of classical ciphers.
//!
//! A pipeline such as `caesar>bifid>xor` defines a parameter space: one axis
//! per parametric stage (26 Caesar shifts, 29 rail counts, one entry per key
//! or ordered key pair). Every tuple in that space is addressed by a linear
//! index, decrypted through the stages and scored for English-likeness.
//! Tuples scoring at or above the threshold are reported as hits.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use rapid_decipher::{search, KeyDictionary, CommonWords, SearchSpec};
//!
//! let spec = SearchSpec::new("caesar").with_threshold(1.8);
//! let result = search(&spec, "DL HAAHJR HA KHDU", KeyDictionary::default(), CommonWords::english())?;
//! for hit in rapid_decipher::report::top_hits(&result.hits, 5) {
//!     println!("{}", rapid_decipher::report::format_hit(hit));
//! }
//! ```
//!
//! ## Layout
//!
//! - [`ciphers`]: the stage transforms (decrypt and encrypt directions)
//! - [`scoring`]: printable ratio, letter-frequency fit, word recognition
//! - [`space`]: mixed-radix unranking and task chunking
//! - [`pipeline`]: spec, validation, executor, runner, observers
//! - [`report`]: console and JSON rendering

pub mod ciphers;
pub mod dictionary;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod space;

pub use dictionary::KeyDictionary;
pub use pipeline::{
    ExecutionResult, Hit, InvalidSpec, NoopObserver, SearchContext, SearchObserver, SearchRunner,
    SearchSpec, StageKind,
};
pub use scoring::CommonWords;

/// Build a [`SearchContext`] from `spec` and run it to completion.
pub fn search(
    spec: &SearchSpec,
    ciphertext: &str,
    keys: KeyDictionary,
    common_words: CommonWords,
) -> Result<ExecutionResult, InvalidSpec> {
    let ctx = SearchContext::build(spec, ciphertext, keys, common_words)?;
    Ok(SearchRunner::new(&ctx).run(&mut NoopObserver))
}
