use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use ipintel_core::IntelError;

/// Plain-text API error.
#[derive(Debug)]
pub enum ApiError {
    BadRequest { message: String },
    MethodNotAllowed,
    Internal { message: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            Self::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method not allowed".to_string(),
            ),
            Self::Internal { message } => {
                tracing::error!(%message, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, [(header::CONTENT_TYPE, "text/plain")], message).into_response()
    }
}

impl From<IntelError> for ApiError {
    fn from(err: IntelError) -> Self {
        if !err.is_client_error() {
            return Self::Internal {
                message: err.to_string(),
            };
        }

        match &err {
            IntelError::MalformedInvalidationRequest(detail) => {
                tracing::debug!(%detail, "rejected invalidation body");
                Self::BadRequest {
                    message: "Invalid request body".to_string(),
                }
            }
            _ => Self::BadRequest {
                message: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_text(resp: Response) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn malformed_body_maps_to_400() {
        let err: ApiError = IntelError::MalformedInvalidationRequest("EOF".into()).into();
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(resp).await, "Invalid request body");
    }

    #[tokio::test]
    async fn missing_target_maps_to_400() {
        let err: ApiError = IntelError::MissingTargetIp.into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn cache_failure_maps_to_500_without_detail() {
        let err: ApiError = IntelError::Cache("backend at 10.0.0.5 refused".into()).into();
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(resp).await, "Internal server error");
    }

    #[tokio::test]
    async fn method_not_allowed() {
        let resp = ApiError::MethodNotAllowed.into_response();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain"
        );
    }
}
