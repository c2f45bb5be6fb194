//! HTTP error handling
//!
//! Every failure leaves the server as the same JSON envelope:
//!
//! ```json
//! {"error": {"message": "Node not found: X", "status": 404, "code": "NOT_FOUND",
//!            "path": "/api/nodes/X", "method": "GET"}}
//! ```
//!
//! `HttpError` renders the envelope without `path`/`method` and stashes a
//! copy of itself in the response extensions; the [`error_envelope`]
//! middleware re-renders it with the request line filled in. Bare error
//! responses produced by axum itself (body rejections, 405s) are wrapped
//! into the same envelope, with malformed bodies reported as 400.

use axum::{
    body::to_bytes,
    extract::Request,
    http::{Method, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use wayfinder_core::services::ServiceError;

/// Message returned for internal failures; details only go to the log
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Largest framework error body read back when wrapping it
const REJECTION_BODY_LIMIT: usize = 16 * 1024;

/// HTTP error with a machine-readable code
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpError {
    /// User-facing error message
    pub message: String,
    /// Machine-readable error code
    pub code: String,
    /// Optional detail, e.g. the CSV line that failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Serialize)]
struct Envelope<'a> {
    error: EnvelopeBody<'a>,
}

#[derive(Serialize)]
struct EnvelopeBody<'a> {
    message: &'a str,
    status: u16,
    code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<&'a str>,
}

impl HttpError {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(
        message: impl Into<String>,
        code: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: Some(details.into()),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(message, "NOT_FOUND")
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message, "INVALID_INPUT")
    }

    pub fn internal() -> Self {
        Self::new(INTERNAL_ERROR_MESSAGE, "INTERNAL_ERROR")
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "INVALID_INPUT" | "VALIDATION_ERROR" | "CSV_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            "METHOD_NOT_ALLOWED" => StatusCode::METHOD_NOT_ALLOWED,
            "PAYLOAD_TOO_LARGE" => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn envelope(&self, method: Option<&Method>, path: Option<&str>) -> Response {
        let status = self.status();
        let body = Envelope {
            error: EnvelopeBody {
                message: &self.message,
                status: status.as_u16(),
                code: &self.code,
                details: self.details.as_deref(),
                path,
                method: method.map(Method::as_str),
            },
        };
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = self.envelope(None, None);
        response.extensions_mut().insert(self);
        response
    }
}

impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound { .. } => HttpError::not_found(err.to_string()),
            ServiceError::Validation(_) => HttpError::new(err.to_string(), "VALIDATION_ERROR"),
            ServiceError::Conflict(_) => HttpError::new(err.to_string(), "CONFLICT"),
            ServiceError::Csv(ref csv_err) => match csv_err.line() {
                Some(line) => {
                    HttpError::with_details(err.to_string(), "CSV_ERROR", format!("line {}", line))
                }
                None => HttpError::new(err.to_string(), "CSV_ERROR"),
            },
            ServiceError::Store(source) => {
                tracing::error!(error = ?source, "Storage failure");
                HttpError::internal()
            }
        }
    }
}

impl HttpError {
    /// Wrap a plain-text error response produced by an axum extractor or router
    async fn from_framework_response(response: Response) -> Self {
        let status = response.status();
        let message = match to_bytes(response.into_body(), REJECTION_BODY_LIMIT).await {
            Ok(bytes) if !bytes.is_empty() => String::from_utf8_lossy(&bytes).into_owned(),
            _ => status.canonical_reason().unwrap_or("Request failed").to_string(),
        };

        match status {
            StatusCode::NOT_FOUND => HttpError::not_found(message),
            StatusCode::METHOD_NOT_ALLOWED => HttpError::new(message, "METHOD_NOT_ALLOWED"),
            StatusCode::PAYLOAD_TOO_LARGE => HttpError::new(message, "PAYLOAD_TOO_LARGE"),
            s if s.is_client_error() => HttpError::bad_request(message),
            _ => {
                tracing::error!(%status, %message, "Unhandled server error response");
                HttpError::internal()
            }
        }
    }
}

/// Catch-all for unmatched routes
pub async fn not_found(method: Method, uri: Uri) -> HttpError {
    HttpError::not_found(format!("Not Found: {} {}", method, uri.path()))
}

/// Middleware that adds the request path and method to error bodies
pub async fn error_envelope(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;
    let status = response.status();
    let stashed = response.extensions_mut().remove::<HttpError>();
    let error = match stashed {
        Some(error) => error,
        None if status.is_client_error() || status.is_server_error() => {
            HttpError::from_framework_response(response).await
        }
        None => return response,
    };

    if error.status().is_server_error() {
        tracing::error!(%method, %path, code = %error.code, "Request failed");
    } else {
        tracing::warn!(%method, %path, code = %error.code, message = %error.message, "Request rejected");
    }

    error.envelope(Some(&method), Some(&path))
}
