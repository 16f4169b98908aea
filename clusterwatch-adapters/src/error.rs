//! Error types for adapters.

use thiserror::Error;

/// Errors that can occur when talking to a cluster.
///
/// Errors are `Clone` so they can travel inside monitor events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// Could not reach the cluster or a member.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The server rejected or failed a command.
    #[error("Command failed: {0}")]
    Command(String),

    /// Failed to parse a server response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// Feature not supported by this cluster (e.g. not a replica set).
    #[error("Feature not supported: {0}")]
    Unsupported(String),
}

#[cfg(feature = "mongodb")]
impl From<mongodb::error::Error> for AdapterError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;

        match err.kind.as_ref() {
            ErrorKind::ServerSelection { .. } => AdapterError::Connection(err.to_string()),
            ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::TimedOut => AdapterError::Timeout,
            ErrorKind::Io(_) | ErrorKind::DnsResolve { .. } => {
                AdapterError::Connection(err.to_string())
            }
            ErrorKind::Authentication { .. } => AdapterError::Auth(err.to_string()),
            ErrorKind::InvalidArgument { .. } => AdapterError::Connection(err.to_string()),
            ErrorKind::Command(command) => {
                // NoReplicationEnabled: the server is a standalone, not a replica set
                if command.code == 76 {
                    AdapterError::Unsupported(command.message.clone())
                } else {
                    AdapterError::Command(command.message.clone())
                }
            }
            ErrorKind::InvalidResponse { .. } | ErrorKind::BsonDeserialization(_) => {
                AdapterError::Parse(err.to_string())
            }
            _ => AdapterError::Command(err.to_string()),
        }
    }
}
