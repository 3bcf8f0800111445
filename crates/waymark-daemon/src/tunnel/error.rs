//! Tunnel supervision error types.

/// Errors that can fail a single provider attempt.
///
/// None of these are fatal to the daemon; they only advance the provider
/// cascade.
#[derive(Debug, thiserror::Error)]
pub enum TunnelError {
    #[error("Spawn error: {0}")]
    Spawn(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Query API error: {0}")]
    QueryApi(String),
}
