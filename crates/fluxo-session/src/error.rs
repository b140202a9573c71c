//! Error types for the session layer.

use std::path::PathBuf;

/// Errors that can occur while persisting the session token.
///
/// The session manager itself never returns these: a storage failure is
/// logged and the in-memory session carries on. They surface only when a
/// [`TokenStore`](crate::TokenStore) is used directly.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Reading, writing or deleting the token file failed.
    #[error("token storage error at {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The token file exists but isn't the JSON we wrote.
    #[error("token file {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The token couldn't be encoded as JSON. Nothing was written.
    #[error("could not encode token file {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    fn json_error() -> serde_json::Error {
        serde_json::from_str::<u8>("x").unwrap_err()
    }

    #[test]
    fn test_encode_error_names_file_and_keeps_source() {
        let err = SessionError::Encode {
            path: PathBuf::from("/tmp/fluxo/session.json"),
            source: json_error(),
        };

        let message = err.to_string();
        assert!(message.starts_with("could not encode token file /tmp/fluxo/session.json: "));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_corrupt_and_encode_are_distinct() {
        let path = PathBuf::from("session.json");
        let corrupt = SessionError::Corrupt {
            path: path.clone(),
            source: json_error(),
        };
        let encode = SessionError::Encode {
            path,
            source: json_error(),
        };

        assert!(corrupt.to_string().contains("is corrupt"));
        assert!(!encode.to_string().contains("is corrupt"));
    }
}
