use paged::PagedError;
use thiserror::Error;

/// Why a string could not be read as an integer.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseBigNumError {
    #[error("cannot parse integer from empty string")]
    Empty,
    #[error("invalid digit {found:?} at position {position}")]
    InvalidDigit { position: usize, found: char },
    #[error("value does not fit in {bits} bits")]
    Overflow { bits: usize },
}

/// Errors from [`BigNum`](crate::BigNum) operations.
///
/// Arithmetic itself never fails: division by zero and fixed-width overflow
/// follow documented policies instead. What can fail is the limb storage.
#[derive(Debug, Error)]
pub enum BigNumError {
    #[error(transparent)]
    Storage(#[from] PagedError),
    #[error(transparent)]
    Parse(#[from] ParseBigNumError),
}

impl From<std::io::Error> for BigNumError {
    fn from(e: std::io::Error) -> Self {
        BigNumError::Storage(PagedError::Storage(e))
    }
}

pub type Result<T, E = BigNumError> = std::result::Result<T, E>;
