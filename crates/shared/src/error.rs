use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Filesystem,
    Network,
    Api,
    MalformedResponse,
    UnexpectedContentType,
}

impl ErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Validation => "Invalid input",
            ErrorKind::Filesystem => "File error",
            ErrorKind::Network => "Network error",
            ErrorKind::Api => "API error",
            ErrorKind::MalformedResponse => "Malformed response",
            ErrorKind::UnexpectedContentType => "Unexpected content type",
        }
    }
}

#[derive(Debug, Error)]
pub enum VectorizeError {
    #[error("invalid value: {0}")]
    Validation(String),
    #[error("{message}")]
    Filesystem {
        message: String,
        path: Option<PathBuf>,
    },
    #[error("request failed: {0}")]
    Network(String),
    #[error("error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("response is not a valid SVG; it was saved to {}", dump_path.display())]
    MalformedResponse {
        content_type: String,
        dump_path: PathBuf,
    },
    #[error("unexpected content type '{content_type}'; the response was saved to {}", dump_path.display())]
    UnexpectedContentType {
        content_type: String,
        dump_path: PathBuf,
    },
}

impl VectorizeError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn filesystem(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Filesystem {
            message: message.into(),
            path,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Filesystem { .. } => ErrorKind::Filesystem,
            Self::Network(_) => ErrorKind::Network,
            Self::Api { .. } => ErrorKind::Api,
            Self::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            Self::UnexpectedContentType { .. } => ErrorKind::UnexpectedContentType,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_message_carries_status_and_body() {
        let err = VectorizeError::Api {
            status: 402,
            body: "insufficient credits".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Api);
        assert_eq!(err.to_string(), "error 402: insufficient credits");
    }

    #[test]
    fn dump_errors_name_the_dump_file() {
        let err = VectorizeError::UnexpectedContentType {
            content_type: "text/html".to_string(),
            dump_path: PathBuf::from("out/error_response.txt"),
        };
        let text = err.to_string();
        assert!(text.contains("text/html"), "{text}");
        assert!(text.contains("error_response.txt"), "{text}");
    }
}
