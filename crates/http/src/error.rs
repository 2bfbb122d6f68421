//! Error handling for the HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    /// A handler's single store operation failed. Clients only ever see
    /// `context`; `source` stays in the server log.
    #[error("{context}: {source}")]
    Operation {
        context: &'static str,
        #[source]
        source: BoxError,
    },
}

impl AppError {
    /// Wrap a failure with the generic message reported to the client
    pub fn operation(context: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Operation {
            context,
            source: source.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let status = self.status();

        let AppError::Operation { context, source } = self;
        tracing::error!(
            error_id = %error_id,
            status_code = %status.as_u16(),
            error = %source,
            "{}",
            context
        );

        (status, Json(json!({ "error": context }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_operation_error_hides_source() {
        let error = AppError::operation(
            "Failed to retrieve books",
            anyhow::anyhow!("server selection timeout"),
        );
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body, json!({ "error": "Failed to retrieve books" }));
    }

    #[test]
    fn test_operation_display_includes_source() {
        let error = AppError::operation("Deleting book failed", anyhow::anyhow!("boom"));
        assert_eq!(error.to_string(), "Deleting book failed: boom");
    }
}
