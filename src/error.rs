use opentelemetry_semantic_conventions::{attribute::OTEL_STATUS_CODE, trace::ERROR_TYPE};
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use thiserror::Error;
use tracing::{Span, error, warn};

use crate::validation::{ErrorResponse, FieldError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid fields: {}", .0.iter().map(|e| e.field.as_str()).collect::<Vec<_>>().join(", "))]
    InvalidFields(Vec<FieldError>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Report error: {0}")]
    Report(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn log_and_record(&self, ctx: &str) {
        let current_span = Span::current();
        let is_valid_span = !current_span.is_none();

        let message = self.to_string();
        let error_kind = match self {
            AppError::Database(err) => {
                error!(error = %message, context = %ctx, db_error = %err, "Database error");
                "database_error"
            }
            AppError::Authentication(msg) => {
                warn!(message = %msg, context = %ctx, "Authentication error");
                "authentication_error"
            }
            AppError::NotFound(msg) => {
                warn!(message = %msg, context = %ctx, "Not found error");
                "not_found_error"
            }
            AppError::Validation(msg) => {
                warn!(message = %msg, context = %ctx, "Validation error");
                "validation_error"
            }
            AppError::InvalidFields(fields) => {
                warn!(fields = ?fields, context = %ctx, "Field validation failed");
                "validation_error"
            }
            AppError::Conflict(msg) => {
                warn!(message = %msg, context = %ctx, "Conflict error");
                "conflict_error"
            }
            AppError::Report(msg) => {
                error!(message = %msg, context = %ctx, "Report rendering error");
                "report_error"
            }
            AppError::Internal(msg) => {
                error!(message = %msg, context = %ctx, "Internal server error");
                "internal_error"
            }
        };

        if is_valid_span {
            current_span.record("error", tracing::field::display(true));
            current_span.record(ERROR_TYPE, tracing::field::display(error_kind));
            current_span.record("error.message", tracing::field::display(&message));

            if self.status_code().code >= 500 {
                current_span.record(OTEL_STATUS_CODE, tracing::field::display("ERROR"));
            }
        }
    }

    pub fn status_code(&self) -> Status {
        match self {
            AppError::Database(_) => Status::InternalServerError,
            AppError::Authentication(_) => Status::Unauthorized,
            AppError::NotFound(_) => Status::NotFound,
            AppError::Validation(_) => Status::BadRequest,
            AppError::InvalidFields(_) => Status::BadRequest,
            // Duplicate usernames are reported as a plain bad request
            AppError::Conflict(_) => Status::BadRequest,
            AppError::Report(_) => Status::InternalServerError,
            AppError::Internal(_) => Status::InternalServerError,
        }
    }

    /// Body sent to the client. Server-side failures never leak their cause.
    pub fn to_response(&self) -> ErrorResponse {
        match self {
            AppError::Database(_) | AppError::Report(_) | AppError::Internal(_) => {
                ErrorResponse::new("Internal server error")
            }
            AppError::Authentication(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::Conflict(msg) => ErrorResponse::new(msg),
            AppError::InvalidFields(fields) => ErrorResponse::with_fields(fields.clone()),
        }
    }
}

impl<'r> rocket::response::Responder<'r, 'static> for AppError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'static> {
        self.log_and_record(&format!("Request to {} {}", req.method(), req.uri()));
        Custom(self.status_code(), Json(self.to_response())).respond_to(req)
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> Self {
        AppError::Internal(format!("Cryptography error: {}", error))
    }
}

impl From<csv::Error> for AppError {
    fn from(error: csv::Error) -> Self {
        AppError::Report(format!("CSV error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        AppError::Internal(format!("Serialization error: {}", error))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::InvalidFields(FieldError::from_validation_errors(&errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_hide_their_cause() {
        let err = AppError::Internal("disk on fire".to_string());
        assert_eq!(err.status_code(), Status::InternalServerError);
        assert_eq!(err.to_response().message, "Internal server error");
    }

    #[test]
    fn conflict_maps_to_bad_request() {
        let err = AppError::Conflict("Username already exists".to_string());
        assert_eq!(err.status_code(), Status::BadRequest);
        assert_eq!(err.to_response().message, "Username already exists");
    }

    #[test]
    fn invalid_fields_carry_every_message() {
        let err = AppError::InvalidFields(vec![
            FieldError::new("city", "City is required"),
            FieldError::new("state", "State code must be exactly 2 characters"),
        ]);

        let body = err.to_response();
        assert_eq!(err.status_code(), Status::BadRequest);
        assert_eq!(body.errors.len(), 2);
        assert_eq!(body.errors[0].field, "city");
    }
}
