//! Error types for the connection pool

use std::time::Duration;

use thiserror::Error;

/// Failures a caller of the pool can observe.
///
/// `E` is the connection's own error type, so a failed dial comes back
/// exactly as the factory produced it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError<E> {
    #[error("Get on closed pool")]
    Closed,

    #[error("Failed to dial a new connection: {0}")]
    Dial(#[source] E),

    #[error("Timed out after {0:?} waiting for a connection")]
    Timeout(Duration),

    #[error("Operation was cancelled")]
    Cancelled,
}

impl<E> PoolError<E> {
    /// Whether this error means the pool has been closed
    pub fn is_closed(&self) -> bool {
        matches!(self, PoolError::Closed)
    }
}

pub type PoolResult<T, E> = Result<T, PoolError<E>>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_dial_error_keeps_source() {
        let err: PoolError<io::Error> =
            PoolError::Dial(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));

        assert_eq!(err.to_string(), "Failed to dial a new connection: refused");
        assert!(err.source().is_some());
        assert!(!err.is_closed());
    }

    #[test]
    fn test_closed_message() {
        let err: PoolError<io::Error> = PoolError::Closed;
        assert!(err.is_closed());
        assert_eq!(err.to_string(), "Get on closed pool");
    }
}
