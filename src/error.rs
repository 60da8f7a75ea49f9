use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

pub const MISSING_TARGET_MESSAGE: &str = "Missing owner or repo query parameters.";
const FETCH_FAILED_MESSAGE: &str = "Failed to fetch file from GitHub.";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("GitHub App is not configured: {0}")]
    Config(String),

    #[error("failed to sign GitHub App token: {0}")]
    Auth(String),

    #[error("GitHub App is not installed on {target}")]
    NotInstalled { target: String },

    #[error("could not build GitHub API request: {0}")]
    Request(String),

    #[error("GitHub API request failed with status {status}: {message}")]
    Upstream { status: StatusCode, message: String },

    #[error("failed to decode file content: {0}")]
    Decode(String),

    #[error("file content is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl FetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Config(_) => "configuration",
            FetchError::Auth(_) => "authentication",
            FetchError::NotInstalled { .. } => "not_installed",
            FetchError::Request(_) => "request",
            FetchError::Upstream { .. } => "upstream",
            FetchError::Decode(_) => "decode",
            FetchError::Parse(_) => "parse",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            FetchError::Upstream { status, .. } => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<octocrab::Error> for FetchError {
    fn from(e: octocrab::Error) -> Self {
        match e {
            octocrab::Error::GitHub { source, .. } => {
                let status = StatusCode::from_u16(source.status_code.as_u16())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                FetchError::Upstream {
                    status,
                    message: source.message.clone(),
                }
            }
            local @ (octocrab::Error::Uri { .. }
            | octocrab::Error::UriParse { .. }
            | octocrab::Error::InvalidHeaderValue { .. }) => {
                FetchError::Request(local.to_string())
            }
            other => FetchError::Upstream {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: other.to_string(),
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Missing owner or repo query parameters.")]
    MissingTarget,

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::MissingTarget => {
                error!("rejected request: {}", MISSING_TARGET_MESSAGE);
                (
                    StatusCode::BAD_REQUEST,
                    json!({ "error": MISSING_TARGET_MESSAGE }),
                )
            }
            ApiError::Fetch(e) => {
                error!(kind = e.kind(), status = %e.status_code(), "fetch failed: {}", e);
                (
                    e.status_code(),
                    json!({
                        "message": FETCH_FAILED_MESSAGE,
                        "error": e.kind(),
                        "details": e.to_string(),
                    }),
                )
            }
        };

        (
            status,
            [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
            Json(body),
        )
            .into_response()
    }
}
