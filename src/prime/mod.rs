use thiserror::Error;

use crate::random::EntropyError;

/// Prime search
pub mod gen;

/// Probabilistic primality checks
pub mod ver;

#[derive(Debug, Error)]
pub enum PrimeError {
    #[error(transparent)]
    Entropy(#[from] EntropyError),

    #[error("cannot search for a prime of {bits} bits")]
    TooSmall { bits: u64 },

    #[error("prime search timed out")]
    TimedOut,

    #[error("prime search was cancelled")]
    Cancelled,
}
