use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReelbatchError {
    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Malformed processed-set file {path}: {reason}")]
    MalformedState { path: String, reason: String },

    #[error("{tool} failed: {diagnostic}")]
    ExternalTool { tool: String, diagnostic: String },

    #[error("Invalid URL: {0:?}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Coarse failure classification recorded in run reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingInput,
    MalformedState,
    ExternalToolFailure,
    UnexpectedFailure,
}

impl ReelbatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReelbatchError::MissingInput(_) | ReelbatchError::InvalidUrl(_) => ErrorKind::MissingInput,
            ReelbatchError::MalformedState { .. } => ErrorKind::MalformedState,
            ReelbatchError::ExternalTool { .. } => ErrorKind::ExternalToolFailure,
            ReelbatchError::Config(_)
            | ReelbatchError::Io(_)
            | ReelbatchError::Json(_)
            | ReelbatchError::Toml(_)
            | ReelbatchError::Unexpected(_) => ErrorKind::UnexpectedFailure,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReelbatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(ReelbatchError::MissingInput("x".into()).kind(), ErrorKind::MissingInput);
        assert_eq!(ReelbatchError::InvalidUrl("".into()).kind(), ErrorKind::MissingInput);
        assert_eq!(
            ReelbatchError::ExternalTool { tool: "ffmpeg".into(), diagnostic: "boom".into() }.kind(),
            ErrorKind::ExternalToolFailure
        );
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(ReelbatchError::from(io).kind(), ErrorKind::UnexpectedFailure);
    }
}
