use crate::poly_commit::errors::PolyComSchemeError;
use crate::transcript::TranscriptError;
use ark_serialize::SerializationError;
use ark_std::{error, fmt, string::String};

pub(crate) type Result<T, E = PlonkError> = core::result::Result<T, E>;

#[derive(Debug, Clone, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum PlonkError {
    /// Polynomial commitment error.
    PolyCom(PolyComSchemeError),
    /// Fiat-Shamir transcript misuse.
    Transcript(TranscriptError),
    /// A pluggable hash function failed.
    Hash(String),
    /// Error with message
    Message(String),
    /// Group not found.
    GroupNotFound(usize),
    /// The number of public inputs differs from the verifying key.
    InvalidWitnessLength,
    /// The claimed values or custom-gate commitments do not match the verifying key.
    ClaimedValuesLayout,
    /// The verifying key is internally inconsistent.
    VerifyingKeyLayout,
    /// The gate, permutation and boundary identity does not hold at the evaluation point.
    AlgebraicRelation,
    /// The batched opening proof does not verify.
    OpeningVerification,
    /// Division by zero.
    DivisionByZero,
    /// Could not serialize an element.
    Serialization,
    /// The witness does not satisfy the constraint system.
    ProofErrorInvalidWitness,
    /// Polynomial commitment error.
    CommitmentError,
    /// Error occurred when setup.
    SetupError,
    /// Function params error.
    FuncParamsError,
}

impl PlonkError {
    /// Return true when the error means the proof is invalid for the key and public inputs,
    /// as opposed to a malformed input or a misconfigured verifier.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            PlonkError::AlgebraicRelation
                | PlonkError::OpeningVerification
                | PlonkError::DivisionByZero
        )
    }
}

impl fmt::Display for PlonkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use PlonkError::*;
        match self {
            PolyCom(e) => write!(f, "Polynomial commitment: {}", e),
            Transcript(e) => write!(f, "Transcript: {}", e),
            Hash(e) => write!(f, "Hash function: {}", e),
            Message(e) => f.write_str(e),
            GroupNotFound(n) => write!(f, "Group of size {} not found.", n),
            InvalidWitnessLength => f.write_str("Witness length is invalid."),
            ClaimedValuesLayout => f.write_str("Claimed values do not match the verifying key."),
            VerifyingKeyLayout => f.write_str("Verifying key is inconsistent."),
            AlgebraicRelation => f.write_str("Algebraic relation does not hold."),
            OpeningVerification => f.write_str("Opening proof verification failed."),
            DivisionByZero => f.write_str("Division by zero."),
            Serialization => f.write_str("Serialization error."),
            ProofErrorInvalidWitness => f.write_str("Proof error invalid witness."),
            CommitmentError => f.write_str("Commitment error."),
            SetupError => f.write_str("Setup error."),
            FuncParamsError => f.write_str("Function params error."),
        }
    }
}

impl error::Error for PlonkError {}

impl From<PolyComSchemeError> for PlonkError {
    fn from(e: PolyComSchemeError) -> PlonkError {
        PlonkError::PolyCom(e)
    }
}

impl From<TranscriptError> for PlonkError {
    fn from(e: TranscriptError) -> PlonkError {
        PlonkError::Transcript(e)
    }
}

impl From<SerializationError> for PlonkError {
    fn from(_: SerializationError) -> PlonkError {
        PlonkError::Serialization
    }
}
