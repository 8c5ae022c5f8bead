use reqwest::StatusCode;
use thiserror::Error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("http {status} from {url}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("server error: {0}")]
    Server(String),
    #[error("invalid json from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("could not find postcode {0}")]
    PostcodeNotFound(String),
    #[error("http client unavailable: {0}")]
    Client(String),
}

impl ApiError {
    /// Short message suitable for an inline error line or an alert body.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport { .. } => "Could not reach the server".to_string(),
            ApiError::Status { status, .. } => format!("Server responded with {status}"),
            ApiError::Server(msg) => msg.clone(),
            ApiError::Decode { .. } => "Server sent an unreadable response".to_string(),
            ApiError::MissingFields(fields) => format!("Please fill in: {}", fields.join(", ")),
            ApiError::PostcodeNotFound(_) => "Could not find that postcode".to_string(),
            ApiError::Client(msg) => msg.clone(),
        }
    }
}
