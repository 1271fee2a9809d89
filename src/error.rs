// HTTP API error types and the JSON error envelope
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

/// HTTP API error with appropriate status codes and client-friendly messages.
///
/// Every non-2xx response renders as:
/// `{"error": "<message>", "code": "<MACHINE_CODE>", "statusCode": <n>}`
/// with an extra `fields` map on validation failures.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // 400 Bad Request
    #[error("{0}")]
    BadRequest(String),
    #[error("{message}")]
    ValidationError {
        message: String,
        fields: HashMap<String, Vec<String>>,
    },

    // 401 Unauthorized
    #[error("{message}")]
    Unauthorized {
        message: String,
        code: &'static str,
    },

    // 403 Forbidden
    #[error("{0}")]
    Forbidden(String),

    // 404 Not Found
    #[error("{0}")]
    NotFound(String),

    // 409 Conflict
    #[error("{message}")]
    Conflict {
        message: String,
        code: &'static str,
    },

    // 413 Payload Too Large
    #[error("{0}")]
    PayloadTooLarge(String),

    // 415 Unsupported Media Type
    #[error("{0}")]
    UnsupportedMediaType(String),

    // 422 Unprocessable Entity (well-formed input, business rule rejected)
    #[error("{message}")]
    Unprocessable {
        message: String,
        code: &'static str,
    },

    // 500 Internal Server Error
    #[error("{0}")]
    Internal(String),

    // 502 Bad Gateway (remote media backend failures)
    #[error("{0}")]
    BadGateway(String),

    // 503 Service Unavailable
    #[error("{0}")]
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::Unauthorized { .. } => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict { .. } => 409,
            ApiError::PayloadTooLarge(_) => 413,
            ApiError::UnsupportedMediaType(_) => 415,
            ApiError::Unprocessable { .. } => 422,
            ApiError::Internal(_) => 500,
            ApiError::BadGateway(_) => 502,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Machine-readable code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized { code, .. } => code,
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict { code, .. } => code,
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::UnsupportedMediaType(_) => "UNSUPPORTED_MEDIA_TYPE",
            ApiError::Unprocessable { code, .. } => code,
            ApiError::Internal(_) => "INTERNAL_ERROR",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Wire-format JSON body. `statusCode` is spelled camelCase on purpose;
    /// it is the one legacy key clients already depend on.
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "error": self.to_string(),
            "code": self.error_code(),
            "statusCode": self.status_code(),
        });

        if let ApiError::ValidationError { fields, .. } = self {
            if !fields.is_empty() {
                body["fields"] = json!(fields);
            }
        }

        body
    }
}

// Constructor helpers, grouped by status
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation(message: impl Into<String>, fields: HashMap<String, Vec<String>>) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            fields,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized {
            message: message.into(),
            code: "UNAUTHORIZED",
        }
    }

    pub fn invalid_credentials() -> Self {
        ApiError::Unauthorized {
            message: "Invalid email or password".to_string(),
            code: "INVALID_CREDENTIALS",
        }
    }

    pub fn token_expired() -> Self {
        ApiError::Unauthorized {
            message: "Token has expired".to_string(),
            code: "TOKEN_EXPIRED",
        }
    }

    pub fn token_invalid() -> Self {
        ApiError::Unauthorized {
            message: "Token is invalid".to_string(),
            code: "TOKEN_INVALID",
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict {
            message: message.into(),
            code: "CONFLICT",
        }
    }

    pub fn conflict_code(code: &'static str, message: impl Into<String>) -> Self {
        ApiError::Conflict {
            message: message.into(),
            code,
        }
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        ApiError::PayloadTooLarge(message.into())
    }

    pub fn unsupported_media_type(message: impl Into<String>) -> Self {
        ApiError::UnsupportedMediaType(message.into())
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        ApiError::Unprocessable {
            message: message.into(),
            code: "UNPROCESSABLE",
        }
    }

    pub fn unprocessable_code(code: &'static str, message: impl Into<String>) -> Self {
        ApiError::Unprocessable {
            message: message.into(),
            code,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Conversions from lower-level errors.
// Real causes are logged; clients get generic messages.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::not_found("Resource not found"),
            other => {
                tracing::error!("database error: {}", other);
                ApiError::internal("An error occurred while processing your request")
            }
        }
    }
}

impl From<crate::database::manager::DatabaseError> for ApiError {
    fn from(err: crate::database::manager::DatabaseError) -> Self {
        tracing::error!("database unavailable: {}", err);
        ApiError::service_unavailable("Database is unavailable")
    }
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => ApiError::token_expired(),
            _ => ApiError::token_invalid(),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: HashMap<String, Vec<String>> = HashMap::new();
        for (field, violations) in errors.field_errors() {
            let messages = violations
                .iter()
                .map(|v| {
                    v.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("failed constraint: {}", v.code))
                })
                .collect();
            fields.insert(field.to_string(), messages);
        }
        ApiError::validation("Request validation failed", fields)
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        ApiError::bad_request(format!("Malformed multipart request: {}", err))
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("io error: {}", err);
        ApiError::internal("An error occurred while processing your request")
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("upstream request failed: {}", err);
        ApiError::bad_gateway("Upstream media service request failed")
    }
}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let err = ApiError::not_found("Product not found");
        let body = err.to_json();
        assert_eq!(body["error"], "Product not found");
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["statusCode"], 404);
        assert!(body.get("fields").is_none());
    }

    #[test]
    fn test_validation_envelope_includes_fields() {
        let mut fields = HashMap::new();
        fields.insert("price".to_string(), vec!["must be positive".to_string()]);
        let err = ApiError::validation("Request validation failed", fields);
        let body = err.to_json();
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["fields"]["price"][0], "must be positive");
    }

    #[test]
    fn test_conflict_codes() {
        let err = ApiError::conflict_code("SKU_TAKEN", "SKU already in use");
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "SKU_TAKEN");
    }

    #[test]
    fn test_sqlx_row_not_found_maps_to_404() {
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_status_code_coverage() {
        assert_eq!(ApiError::bad_request("x").status_code(), 400);
        assert_eq!(ApiError::token_expired().status_code(), 401);
        assert_eq!(ApiError::token_expired().error_code(), "TOKEN_EXPIRED");
        assert_eq!(ApiError::forbidden("x").status_code(), 403);
        assert_eq!(ApiError::payload_too_large("x").status_code(), 413);
        assert_eq!(ApiError::unsupported_media_type("x").status_code(), 415);
        assert_eq!(
            ApiError::unprocessable_code("INSUFFICIENT_STOCK", "x").status_code(),
            422
        );
        assert_eq!(ApiError::service_unavailable("x").status_code(), 503);
    }
}
