//! API errors and their HTTP mapping.

use axum::Json;
use axum::response::{IntoResponse, Response};
use flowscope_debug::DebugError;
use http::{HeaderValue, StatusCode, header};
use serde_json::json;

/// Errors a request can fail with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// No credentials, or credentials nobody issued.
    #[error("authentication required")]
    Unauthorized,

    /// Valid credentials lacking a permission.
    #[error("missing permission {0}")]
    Forbidden(&'static str),

    /// The addressed resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The resource already exists.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

impl From<DebugError> for ApiError {
    fn from(err: DebugError) -> Self {
        match err {
            DebugError::UnknownNode(_) | DebugError::InvalidId(_) => Self::NotFound(err.to_string()),
            DebugError::DuplicateNode(_) => Self::Conflict(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = (status, Json(json!({ "error": self.to_string() }))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowscope_core::IdError;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(DebugError::UnknownNode("n1".into()), StatusCode::NOT_FOUND)]
    #[case(DebugError::InvalidId(IdError::Empty), StatusCode::NOT_FOUND)]
    fn debug_errors_map_to_status(#[case] err: DebugError, #[case] status: StatusCode) {
        assert_eq!(ApiError::from(err).status(), status);
    }

    #[test]
    fn unauthorized_asks_for_bearer() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }
}
