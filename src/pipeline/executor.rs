//! Stage executor: one pipeline walk per parameter tuple.
//!
//! The payload starts as the ciphertext text and is threaded through every
//! stage. A stage that cannot accept the current representation, or whose
//! transform fails (malformed Base64, for example), ends the walk with
//! [`Outcome::NoResult`]. That is the expected fate of most tuples and is
//! never logged or surfaced as an error.
//!
//! Stages producing bytes (XOR, Base64) go through [`Payload::promote`], so a
//! fully printable result becomes text again and text-only stages can follow.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::context::SearchContext;
use super::spec::{StageKind, RAILFENCE_MIN_RAILS};
use crate::ciphers::{
    base64_probe, caesar_shift, columnar_decrypt, double_columnar_decrypt, railfence_decrypt,
    repeating_xor, reverse_text,
};
use crate::scoring::{combined_score, is_printable};
use crate::space::{unrank_into, SpaceIndex, WorkerTask};

// ─── Payload ────────────────────────────────────────────────────────────────

/// The value flowing between stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Bytes(Vec<u8>),
}

impl Payload {
    /// Reinterpret stage output: non-empty, fully printable ASCII becomes
    /// [`Payload::Text`], anything else stays [`Payload::Bytes`].
    pub fn promote(bytes: Vec<u8>) -> Self {
        if bytes.is_empty() || !bytes.iter().all(|&b| is_printable(b)) {
            return Self::Bytes(bytes);
        }
        match String::from_utf8(bytes) {
            Ok(text) => Self::Text(text),
            Err(err) => Self::Bytes(err.into_bytes()),
        }
    }

    /// The payload's bytes (UTF-8 for text).
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Bytes(bytes) => bytes,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Bytes(_) => None,
        }
    }
}

// ─── Metadata ───────────────────────────────────────────────────────────────

/// A parameter chosen for one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(usize),
    Key(String),
    Flag(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Key(key) => write!(f, "{key:?}"),
            Self::Flag(flag) => write!(f, "{flag}"),
        }
    }
}

/// Ordered `name -> parameter` mapping describing a hit.
///
/// Names are unique; recording a name twice (a stage repeated in the
/// pipeline) keeps its first position and the latest value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HitMetadata {
    entries: Vec<(&'static str, ParamValue)>,
}

impl HitMetadata {
    pub fn insert(&mut self, name: &'static str, value: ParamValue) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ParamValue)> {
        self.entries.iter().map(|(n, v)| (*n, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for HitMetadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl fmt::Display for HitMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        f.write_str("}")
    }
}

// ─── Outcomes ───────────────────────────────────────────────────────────────

/// Result of one pipeline walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Every stage ran; the final payload has this combined score.
    Scored(f64),
    /// A stage rejected the payload. Keep searching.
    NoResult,
}

/// A tuple whose score cleared the threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    /// Linear index of the tuple in the parameter space.
    pub index: SpaceIndex,
    pub score: f64,
    pub metadata: HitMetadata,
}

/// What one worker task produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkResult {
    pub task: WorkerTask,
    pub attempts: SpaceIndex,
    pub hits: Vec<Hit>,
}

// ─── Executor ───────────────────────────────────────────────────────────────

/// Runs the pipeline of a [`SearchContext`] over parameter tuples.
///
/// Holds a scratch buffer for unranking, so keep one executor per thread.
pub struct StageExecutor<'a> {
    ctx: &'a SearchContext,
    digits: Vec<usize>,
}

impl<'a> StageExecutor<'a> {
    pub fn new(ctx: &'a SearchContext) -> Self {
        Self {
            ctx,
            digits: vec![0; ctx.bases().len()],
        }
    }

    /// Run every stage for `params`, returning the final payload.
    pub fn decrypt(&self, params: &[usize]) -> Option<Payload> {
        let mut params = params.iter().copied();
        let mut payload = Payload::Text(self.ctx.ciphertext().to_string());
        for &stage in self.ctx.stages() {
            payload = self.apply(stage, payload, &mut params)?;
        }
        Some(payload)
    }

    /// Run and score `params`.
    pub fn evaluate(&self, params: &[usize]) -> Outcome {
        match self.decrypt(params) {
            Some(payload) => Outcome::Scored(combined_score(
                payload.as_bytes(),
                Some(self.ctx.common_words()),
            )),
            None => Outcome::NoResult,
        }
    }

    /// Decrypt the tuple at linear `index`.
    pub fn decrypt_index(&mut self, index: SpaceIndex) -> Option<Payload> {
        unrank_into(index, self.ctx.bases(), &mut self.digits);
        self.decrypt(&self.digits)
    }

    /// Evaluate the tuple at linear `index`, returning a hit if it scores at
    /// or above the threshold.
    pub fn attempt(&mut self, index: SpaceIndex) -> Option<Hit> {
        unrank_into(index, self.ctx.bases(), &mut self.digits);
        match self.evaluate(&self.digits) {
            Outcome::Scored(score) if score >= self.ctx.threshold() => Some(Hit {
                index,
                score,
                metadata: self.metadata_for(&self.digits),
            }),
            _ => None,
        }
    }

    /// Evaluate every index of `task`. Each index counts as one attempt.
    pub fn run_task(&mut self, task: WorkerTask) -> ChunkResult {
        let hits = (task.start..task.end)
            .filter_map(|index| self.attempt(index))
            .collect();
        ChunkResult {
            task,
            attempts: task.len(),
            hits,
        }
    }

    /// Describe `params` as stage parameters.
    pub fn metadata_for(&self, params: &[usize]) -> HitMetadata {
        let keys = self.ctx.keys();
        let key = |i: usize| ParamValue::Key(keys.get(i).unwrap_or_default().to_string());
        let mut meta = HitMetadata::default();
        let mut params = params.iter().copied();
        for &stage in self.ctx.stages() {
            if stage == StageKind::Reverse {
                meta.insert("reverse_applied", ParamValue::Flag(true));
                continue;
            }
            if !stage.is_parametric() {
                continue;
            }
            let Some(p) = params.next() else { break };
            match stage {
                StageKind::Caesar => meta.insert("caesar_shift", ParamValue::Int(p)),
                StageKind::Railfence => {
                    meta.insert("railfence_rails", ParamValue::Int(p + RAILFENCE_MIN_RAILS))
                }
                StageKind::Bifid => meta.insert("bifid_key", key(p)),
                StageKind::Columnar => meta.insert("columnar_key", key(p)),
                StageKind::DoubleColumnar => {
                    let (i, j) = self.split_pair(p);
                    meta.insert("double_columnar_key1", key(i));
                    meta.insert("double_columnar_key2", key(j));
                }
                StageKind::Xor => meta.insert("xor_key", key(p)),
                StageKind::B64 | StageKind::Reverse => {}
            }
        }
        meta
    }

    /// Ordered key pair `(i, j)` addressed by `i * n + j`.
    #[inline]
    fn split_pair(&self, pair: usize) -> (usize, usize) {
        let n = self.ctx.keys().len().max(1);
        (pair / n, pair % n)
    }

    fn apply(
        &self,
        stage: StageKind,
        payload: Payload,
        params: &mut impl Iterator<Item = usize>,
    ) -> Option<Payload> {
        let keys = self.ctx.keys();
        let text = match (stage, payload) {
            (StageKind::Xor, payload) => {
                let key = keys.get(params.next()?)?;
                let out = repeating_xor(payload.as_bytes(), key.as_bytes());
                return Some(Payload::promote(out));
            }
            (_, Payload::Bytes(_)) => return None,
            (_, Payload::Text(text)) => text,
        };

        let out = match stage {
            StageKind::B64 => return base64_probe(&text).ok().map(Payload::promote),
            StageKind::Caesar => caesar_shift(&text, params.next()? as i32),
            StageKind::Railfence => railfence_decrypt(&text, params.next()? + RAILFENCE_MIN_RAILS),
            StageKind::Bifid => {
                let square = self.ctx.square(params.next()?)?;
                let period = self.ctx.bifid_period_for(text.chars().count());
                square.decrypt(&text, period).ok()?
            }
            StageKind::Columnar => columnar_decrypt(&text, keys.get(params.next()?)?),
            StageKind::DoubleColumnar => {
                let (i, j) = self.split_pair(params.next()?);
                double_columnar_decrypt(&text, keys.get(i)?, keys.get(j)?)
            }
            StageKind::Reverse => reverse_text(&text),
            StageKind::Xor => return None,
        };
        Some(Payload::Text(out))
    }
}
