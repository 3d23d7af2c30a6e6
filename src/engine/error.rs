use crate::core::kinds::{AlgKind, PropKind};
use crate::core::memory::MemoryDescError;
use std::fmt;
use thiserror::Error;

/// Which argument check rejected a descriptor request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    MissingDataDesc,
    /// A descriptor outside the memory descriptor limits; `which` is
    /// `"data"` or `"diff_data"`.
    InvalidMemoryDesc {
        which: &'static str,
        error: MemoryDescError,
    },
    UnsupportedPropKind(PropKind),
    UnsupportedAlgKind(AlgKind),
    MissingDiffDataDesc,
    UnexpectedDiffDataDesc(PropKind),
    RankMismatch { diff: usize, data: usize },
    DimMismatch { axis: usize, diff: usize, data: usize },
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::MissingDataDesc => write!(f, "data descriptor is missing or empty"),
            InvalidReason::InvalidMemoryDesc { which, error } => {
                write!(f, "{} descriptor is invalid: {}", which, error)
            }
            InvalidReason::UnsupportedPropKind(p) => write!(f, "unsupported prop kind {}", p),
            InvalidReason::UnsupportedAlgKind(a) => write!(f, "unsupported alg kind {}", a),
            InvalidReason::MissingDiffDataDesc => {
                write!(f, "non-empty diff data descriptor is required for backward_data")
            }
            InvalidReason::UnexpectedDiffDataDesc(p) => {
                write!(f, "diff data descriptor given for {}", p)
            }
            InvalidReason::RankMismatch { diff, data } => {
                write!(f, "diff data rank {} does not match data rank {}", diff, data)
            }
            InvalidReason::DimMismatch { axis, diff, data } => write!(
                f,
                "diff data extent {} does not match data extent {} at axis {}",
                diff, data, axis
            ),
        }
    }
}

/// Error del builder de descriptores. Hay un solo tipo de fallo; la razón
/// sólo sirve para diagnóstico.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EltwiseError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(InvalidReason),
}

impl EltwiseError {
    pub fn reason(&self) -> &InvalidReason {
        match self {
            EltwiseError::InvalidArguments(reason) => reason,
        }
    }
}
