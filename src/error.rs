use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derive_more::Display;
use serde_json::json;

/// Crate-wide error taxonomy. Every variant maps to one HTTP status and a
/// `{"error": message}` JSON body; `Conflict` additionally attaches the
/// conflicting record.
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(fmt = "{}", _0)]
    NotFound(String),

    /// The employee already has an open time record; `record` carries its
    /// serialized form so the caller can show what is blocking the check-in.
    #[display(fmt = "{}", message)]
    Conflict {
        message: String,
        record: serde_json::Value,
    },

    #[display(fmt = "Internal server error")]
    Database(sqlx::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!(error = %e, "Database query failed");
        ApiError::Database(e)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            // Conflicts surface as 400, matching the observable behavior the
            // frontend was written against.
            ApiError::Validation(_) | ApiError::Conflict { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Conflict { message, record } => json!({
                "error": message,
                "record": record,
            }),
            other => json!({ "error": other.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            ApiError::validation("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::not_found("missing").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict {
                message: "open record".into(),
                record: serde_json::Value::Null,
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn database_errors_hide_details() {
        let e = ApiError::Database(sqlx::Error::RowNotFound);
        assert_eq!(e.to_string(), "Internal server error");
    }

    #[test]
    fn messages_pass_through() {
        assert_eq!(
            ApiError::validation("Email already exists").to_string(),
            "Email already exists"
        );
    }
}
