use thiserror::Error;

/// Unified error type for runtime, engine and registry operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LLMError {
    #[error("network error: {0}")]
    Network(String),

    #[error("api error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown model: {0}")]
    UnknownModel(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("config error: {0}")]
    Config(String),
}

impl LLMError {
    /// True when the remote runtime could not be reached at all
    pub fn is_unreachable(&self) -> bool {
        matches!(self, LLMError::Network(_))
    }
}

impl From<reqwest::Error> for LLMError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            LLMError::Decode(e.to_string())
        } else {
            LLMError::Network(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, LLMError>;
