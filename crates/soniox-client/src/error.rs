pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or unusable client configuration; raised at construction
    /// time, never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The server response violates an invariant this client depends on
    /// (wrong result shape for the separation flag, unexpected status
    /// record count, empty result stream).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Underlying channel failure, surfaced as-is. The client does not
    /// retry on its own.
    #[error("transport error: {0}")]
    Transport(String),

    /// The caller asked to stop, or a partner task's failure triggered
    /// the stop. Distinct from real failures.
    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::Transport(error.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Error::Transport(error.to_string())
    }
}
