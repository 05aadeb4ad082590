//! Bifid fractionation cipher
//!
//! A keyed Polybius square is built from the alphabet: unique uppercased key
//! characters first (those the alphabet contains), then the rest of the
//! alphabet in order. Characters outside the square are never fractionated;
//! they keep their absolute positions in the output.
//!
//! Encryption of one block of `m` characters writes all row coordinates,
//! then all column coordinates, and reads the stream back in pairs.
//! Decryption interleaves `(row, col)` per character and splits the stream
//! in half: first half rows, second half columns.

use serde::{Deserialize, Serialize};

use super::CipherError;

/// 5x5 alphabet with I/J merged (J is absent).
pub const STANDARD_ALPHABET: &str = "ABCDEFGHIKLMNOPQRSTUVWXYZ";

/// 8x8 alphabet built from the Base64 character set.
pub const BASE64_ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const ABSENT: u8 = u8::MAX;

/// Alphabet used to build the Polybius square.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BifidAlphabet {
    /// 25 characters, I and J unified (5x5).
    #[default]
    Standard,
    /// Base64 characters (8x8).
    Base64,
    /// Caller-supplied alphabet; must be ASCII, duplicate-free and of
    /// perfect-square length.
    Custom(String),
}

impl BifidAlphabet {
    /// The alphabet's characters in square order.
    pub fn chars(&self) -> &str {
        match self {
            Self::Standard => STANDARD_ALPHABET,
            Self::Base64 => BASE64_ALPHABET,
            Self::Custom(s) => s,
        }
    }

    /// Returns the user-facing name used in JSON and logs.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Standard => "standard",
            Self::Base64 => "base64",
            Self::Custom(_) => "custom",
        }
    }

    /// Side length of the square, checking every alphabet constraint.
    pub fn side(&self) -> Result<usize, CipherError> {
        let chars = self.chars();
        let mut seen = [false; 128];
        for ch in chars.chars() {
            if !ch.is_ascii() {
                return Err(CipherError::NonAsciiAlphabet(ch));
            }
            if std::mem::replace(&mut seen[ch as usize], true) {
                return Err(CipherError::DuplicateAlphabetChar(ch));
            }
        }
        let len = chars.len();
        let side = (len as f64).sqrt().round() as usize;
        if side == 0 || side * side != len {
            return Err(CipherError::NonSquareAlphabet(len));
        }
        Ok(side)
    }

    /// Drop every character the square cannot represent.
    pub fn normalize(&self, text: &str) -> String {
        let allowed = self.chars();
        text.chars().filter(|&ch| allowed.contains(ch)).collect()
    }
}

impl std::str::FromStr for BifidAlphabet {
    type Err = CipherError;

    /// Accepts `standard`, `base64`, or any other string as a custom
    /// alphabet (validated).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let alphabet = match value {
            "standard" => Self::Standard,
            "base64" => Self::Base64,
            other => Self::Custom(other.to_string()),
        };
        alphabet.side()?;
        Ok(alphabet)
    }
}

/// A keyed Polybius square with O(1) character lookup.
#[derive(Debug, Clone)]
pub struct KeyedSquare {
    cells: Vec<u8>,
    lookup: [u8; 128],
    side: usize,
}

impl KeyedSquare {
    /// Build the square for `key` over `alphabet`.
    pub fn new(alphabet: &BifidAlphabet, key: &str) -> Result<Self, CipherError> {
        let side = alphabet.side()?;
        let base = alphabet.chars().as_bytes();

        let mut in_alphabet = [false; 128];
        for &b in base {
            in_alphabet[b as usize] = true;
        }

        let mut cells = Vec::with_capacity(base.len());
        let mut lookup = [ABSENT; 128];
        let keyed = key
            .chars()
            .flat_map(char::to_uppercase)
            .filter(|ch| ch.is_ascii() && in_alphabet[*ch as usize])
            .map(|ch| ch as u8);
        for b in keyed.chain(base.iter().copied()) {
            if lookup[b as usize] == ABSENT {
                lookup[b as usize] = cells.len() as u8;
                cells.push(b);
            }
        }

        Ok(Self {
            cells,
            lookup,
            side,
        })
    }

    /// Square contents in cell order.
    pub fn as_str(&self) -> &str {
        // Cells are ASCII by construction.
        std::str::from_utf8(&self.cells).unwrap_or_default()
    }

    pub fn side(&self) -> usize {
        self.side
    }

    #[inline]
    fn index_of(&self, ch: char) -> Option<usize> {
        if !ch.is_ascii() {
            return None;
        }
        match self.lookup[ch as usize] {
            ABSENT => None,
            idx => Some(idx as usize),
        }
    }

    #[inline]
    fn cell(&self, row: usize, col: usize) -> char {
        self.cells[row * self.side + col] as char
    }

    /// Decrypt `text` with fractionation period `period`.
    pub fn decrypt(&self, text: &str, period: usize) -> Result<String, CipherError> {
        self.transform(text, period, |square, block, out| {
            let m = block.len();
            let mut coords = Vec::with_capacity(2 * m);
            for &idx in block {
                coords.push(idx / square.side);
                coords.push(idx % square.side);
            }
            let (rows, cols) = coords.split_at(m);
            out.extend(rows.iter().zip(cols).map(|(&r, &c)| square.cell(r, c)));
        })
    }

    /// Encrypt `text` with fractionation period `period`.
    pub fn encrypt(&self, text: &str, period: usize) -> Result<String, CipherError> {
        self.transform(text, period, |square, block, out| {
            let mut coords = Vec::with_capacity(2 * block.len());
            coords.extend(block.iter().map(|&idx| idx / square.side));
            coords.extend(block.iter().map(|&idx| idx % square.side));
            out.extend(coords.chunks_exact(2).map(|rc| square.cell(rc[0], rc[1])));
        })
    }

    /// Split out the in-square characters, run `block_fn` per period block,
    /// then weave the untouched characters back at their positions.
    fn transform<F>(&self, text: &str, period: usize, mut block_fn: F) -> Result<String, CipherError>
    where
        F: FnMut(&Self, &[usize], &mut Vec<char>),
    {
        if period == 0 {
            return Err(CipherError::InvalidPeriod);
        }
        let indices: Vec<usize> = text.chars().filter_map(|ch| self.index_of(ch)).collect();

        let mut converted = Vec::with_capacity(indices.len());
        for block in indices.chunks(period) {
            block_fn(self, block, &mut converted);
        }

        let mut converted = converted.into_iter();
        let out = text
            .chars()
            .map(|ch| match self.index_of(ch) {
                Some(_) => converted.next().unwrap_or(ch),
                None => ch,
            })
            .collect();
        Ok(out)
    }
}

/// Decrypt `text` under `key`, building the square on the fly.
pub fn bifid_decrypt(
    text: &str,
    key: &str,
    period: usize,
    alphabet: &BifidAlphabet,
) -> Result<String, CipherError> {
    if period == 0 {
        return Err(CipherError::InvalidPeriod);
    }
    KeyedSquare::new(alphabet, key)?.decrypt(text, period)
}

/// Encrypt `text` under `key` (inverse of [`bifid_decrypt`]).
pub fn bifid_encrypt(
    text: &str,
    key: &str,
    period: usize,
    alphabet: &BifidAlphabet,
) -> Result<String, CipherError> {
    if period == 0 {
        return Err(CipherError::InvalidPeriod);
    }
    KeyedSquare::new(alphabet, key)?.encrypt(text, period)
}
