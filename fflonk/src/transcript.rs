//! A labeled Fiat-Shamir transcript.
//!
//! The challenge labels are fixed when the transcript is created. Values are
//! bound to a label before its challenge is computed, and challenge `i` is
//! `H(label_i || challenge_{i-1} || bindings_i)` where the previous challenge
//! is omitted for the first label.
use ark_std::{fmt, marker::PhantomData, string::String, vec::Vec};
use digest::Digest;

/// Misuse of a [`Transcript`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum TranscriptError {
    /// The label was not declared when the transcript was created.
    UnknownChallenge(String),
    /// A value was bound to a label whose challenge is already computed.
    ChallengeAlreadyComputed(String),
    /// The challenge declared before this one has not been computed yet.
    PreviousChallengeNotComputed(String),
}

impl fmt::Display for TranscriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptError::UnknownChallenge(l) => write!(f, "challenge {} not recorded", l),
            TranscriptError::ChallengeAlreadyComputed(l) => {
                write!(f, "challenge {} already computed, cannot be bound", l)
            }
            TranscriptError::PreviousChallengeNotComputed(l) => {
                write!(f, "previous challenge of {} not computed", l)
            }
        }
    }
}

impl ark_std::error::Error for TranscriptError {}

#[derive(Debug, Clone)]
struct Challenge {
    label: &'static str,
    bindings: Vec<u8>,
    value: Option<Vec<u8>>,
}

/// A Fiat-Shamir transcript over the hash function `D`.
#[derive(Debug, Clone)]
pub struct Transcript<D> {
    challenges: Vec<Challenge>,
    hash: PhantomData<D>,
}

impl<D: Digest> Transcript<D> {
    /// Create a transcript that computes the challenges in the order given by `labels`.
    pub fn new(labels: &[&'static str]) -> Self {
        let challenges = labels
            .iter()
            .map(|&label| Challenge {
                label,
                bindings: Vec::new(),
                value: None,
            })
            .collect();
        Self {
            challenges,
            hash: PhantomData,
        }
    }

    fn position(&self, label: &str) -> Result<usize, TranscriptError> {
        self.challenges
            .iter()
            .position(|c| c.label == label)
            .ok_or_else(|| TranscriptError::UnknownChallenge(label.into()))
    }

    /// Append `bytes` to the values bound to the challenge `label`.
    pub fn bind(&mut self, label: &str, bytes: &[u8]) -> Result<(), TranscriptError> {
        let pos = self.position(label)?;
        let challenge = &mut self.challenges[pos];
        if challenge.value.is_some() {
            return Err(TranscriptError::ChallengeAlreadyComputed(label.into()));
        }
        challenge.bindings.extend_from_slice(bytes);
        Ok(())
    }

    /// Compute the challenge `label`, or return it unchanged if it was already computed.
    pub fn compute_challenge(&mut self, label: &str) -> Result<Vec<u8>, TranscriptError> {
        let pos = self.position(label)?;
        if let Some(value) = &self.challenges[pos].value {
            return Ok(value.clone());
        }

        let mut hasher = D::new();
        hasher.update(label.as_bytes());
        if pos > 0 {
            let previous = self.challenges[pos - 1]
                .value
                .as_ref()
                .ok_or_else(|| TranscriptError::PreviousChallengeNotComputed(label.into()))?;
            hasher.update(previous);
        }
        hasher.update(&self.challenges[pos].bindings);

        let value = hasher.finalize().to_vec();
        self.challenges[pos].value = Some(value.clone());
        Ok(value)
    }
}
