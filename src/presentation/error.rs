// Mapping of service failures to HTTP responses
use crate::application::issue_tracker::TrackerError;
use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("upstream issue tracker error: {0}")]
    Upstream(TrackerError),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
        }
    }
}

impl From<TrackerError> for ApiError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
            other => ApiError::Upstream(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_errors_map_to_status() {
        let not_found = ApiError::from(TrackerError::NotFound("board 3".to_string()));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.body().error, "board 3 not found");

        let upstream = ApiError::from(TrackerError::Status {
            status: 500,
            url: "https://gitlab.example.com/api/v4/groups".to_string(),
        });
        assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);
    }
}
