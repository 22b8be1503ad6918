//! Status codes returned by every math operation

/// Failure codes of the math core. Success is `Ok(..)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpidError {
    /// Invalid, mismatched or out-of-range input
    BadArg,
    /// Allocation of a working buffer failed
    MemAlloc,
    /// Unclassified internal arithmetic failure
    Math,
    /// Big number subtraction would produce a negative result
    Underflow,
    /// Inversion of zero
    DivByZero,
    /// The requested digest is not available
    HashAlgorithmNotSupported,
    /// No square root exists for the value
    MathQuadraticNonResidue,
    /// Rejection sampling exhausted its attempt budget
    RandMaxIter,
    /// The operation is not implemented
    NotImpl,
    /// A parameter set could not be decoded
    Config(String),
}

impl From<serde_json::Error> for EpidError {
    fn from(err: serde_json::Error) -> Self {
        EpidError::Config(err.to_string())
    }
}

impl std::fmt::Display for EpidError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EpidError::BadArg => write!(f, "bad argument"),
            EpidError::MemAlloc => write!(f, "memory allocation failed"),
            EpidError::Math => write!(f, "math error"),
            EpidError::Underflow => write!(f, "big number underflow"),
            EpidError::DivByZero => write!(f, "division by zero"),
            EpidError::HashAlgorithmNotSupported => write!(f, "hash algorithm not supported"),
            EpidError::MathQuadraticNonResidue => write!(f, "value is a quadratic non-residue"),
            EpidError::RandMaxIter => write!(f, "random generation exceeded its attempt limit"),
            EpidError::NotImpl => write!(f, "not implemented"),
            EpidError::Config(s) => write!(f, "configuration error: {}", s),
        }
    }
}

impl std::error::Error for EpidError {}

/// Result alias used across the crate
pub type EpidResult<T> = Result<T, EpidError>;
