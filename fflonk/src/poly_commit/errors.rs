use crate::transcript::TranscriptError;
use ark_serialize::SerializationError;
use ark_std::{error, fmt};

/// Polynomial commitment scheme errors.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum PolyComSchemeError {
    /// It is not possible to compute the proof as F(x) != y.
    PCSProveEvalError,
    /// The opening proof does not verify against the digests and claimed values.
    PCSVerifyEvalError,
    /// The degree of the polynomial is higher than the maximum degree allowed.
    DegreeError,
    /// The numbers of digests, points and claimed values do not line up.
    InvalidOpeningInput,
    /// Interpolation over a set with repeated points.
    DivisionByZero,
    /// Could not serialize an element bound to the transcript.
    SerializationError,
    /// Fiat-Shamir transcript misuse.
    Transcript(TranscriptError),
}

impl fmt::Display for PolyComSchemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolyComSchemeError::PCSProveEvalError => {
                write!(f, "It is not possible to compute the proof as F(x) != y.")
            }
            PolyComSchemeError::PCSVerifyEvalError => {
                write!(f, "The opening proof does not verify.")
            }
            PolyComSchemeError::DegreeError => write!(
                f,
                "The degree of the polynomial is higher than the maximum degree allowed."
            ),
            PolyComSchemeError::InvalidOpeningInput => {
                write!(f, "Digests, points and claimed values do not match.")
            }
            PolyComSchemeError::DivisionByZero => write!(f, "Division by zero."),
            PolyComSchemeError::SerializationError => write!(f, "Could not serialize object."),
            PolyComSchemeError::Transcript(e) => write!(f, "Transcript: {}", e),
        }
    }
}

impl error::Error for PolyComSchemeError {}

impl From<TranscriptError> for PolyComSchemeError {
    fn from(e: TranscriptError) -> PolyComSchemeError {
        PolyComSchemeError::Transcript(e)
    }
}

impl From<SerializationError> for PolyComSchemeError {
    fn from(_: SerializationError) -> PolyComSchemeError {
        PolyComSchemeError::SerializationError
    }
}
