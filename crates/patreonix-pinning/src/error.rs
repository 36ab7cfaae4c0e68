use thiserror::Error;

pub type PinningResult<T> = Result<T, PinningError>;

#[derive(Debug, Error)]
pub enum PinningError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The service answered with a non-success status.
    #[error("pinning service returned {status}: {body}")]
    Http { status: u16, body: String },

    /// Connection, TLS or timeout failure.
    #[error("pinning transport error: {0}")]
    Transport(String),

    #[error("unexpected pinning response: {0}")]
    Decode(String),
}

impl PinningError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Http { .. } => "PINNING_HTTP_ERROR",
            Self::Transport(_) => "PINNING_TRANSPORT_ERROR",
            Self::Decode(_) => "PINNING_DECODE_ERROR",
        }
    }
}

impl From<reqwest::Error> for PinningError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PinningError::Decode(err.to_string())
        } else {
            PinningError::Transport(err.to_string())
        }
    }
}
