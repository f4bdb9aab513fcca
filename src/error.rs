//! Error types for the IRC client engine.
//!
//! Unrecoverable conditions detected during the synchronous `connect()`
//! handshake surface as [`ClientError`]; everything observed during
//! steady-state polling is converted into dispatched events instead.

use std::time::Duration;

use thiserror::Error;

/// Convenience type alias for Results using [`ClientError`].
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Top-level client errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The server did not complete registration within the allowed time.
    #[error("connection timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// Every candidate nickname derived from the base was rejected.
    ///
    /// The digit-suffix search runs `1` through `9`; once a candidate
    /// ending in `9` collides there is nothing left to try.
    #[error("nickname search space exhausted: {0}")]
    NickExhausted(String),

    /// An operation required an open connection.
    #[error("not connected")]
    NotConnected,
}

/// Errors encountered when parsing received lines.
///
/// The line grammar is deliberately forgiving; anything with a command
/// word parses. Only degenerate input is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Message was empty (or whitespace only).
    #[error("empty message")]
    EmptyMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::NickExhausted("nick9".to_string());
        assert_eq!(format!("{}", err), "nickname search space exhausted: nick9");

        let err = ClientError::ConnectTimeout(Duration::from_secs(10));
        assert!(format!("{}", err).contains("timed out"));
    }

    #[test]
    fn test_error_conversion() {
        let io_err =
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let client_err: ClientError = io_err.into();

        match client_err {
            ClientError::Io(_) => {}
            _ => panic!("Expected Io variant"),
        }
    }
}
