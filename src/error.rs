//! Error types for clumping index operations.
//!
//! Numeric degeneracy (zero cover, zero width-to-height ratio) is not an
//! error here: it propagates as inf/NaN in the output. Only structural
//! problems with the input arrays are reported.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClumpingError {
    #[error("operands could not be broadcast together with shapes {lhs:?} {rhs:?}")]
    Broadcast { lhs: Vec<usize>, rhs: Vec<usize> },
}

pub type Result<T> = std::result::Result<T, ClumpingError>;
