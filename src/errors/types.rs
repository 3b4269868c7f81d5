use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No response from device: {0}")]
    NoResponse(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Ambiguous response: {0}")]
    Ambiguous(String),

    #[error("Collaborator fault: {0}")]
    Collaborator(String),

    #[error("Precondition failure: {0}")]
    Precondition(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
