//! HTTP error mapping.
//!
//! Every failure leaves the API as `{"message": ...}` with an optional
//! `"error"` detail string. Conflicts (duplicate email, listing already
//! claimed) are reported as 400, not 409.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::domain::DomainError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub detail: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self.detail {
            Some(detail) => json!({ "message": self.message, "error": detail }),
            None => json!({ "message": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation { .. } => {
                Self::bad_request("All fields are required").with_detail(err.to_string())
            }
            DomainError::EmailTaken => Self::bad_request("User already exists"),
            DomainError::InvalidCredentials => Self::bad_request("Invalid credentials"),
            DomainError::UserNotFound => Self::new(StatusCode::NOT_FOUND, "User not found"),
            DomainError::ListingNotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, "Listing not found")
            }
            DomainError::ReservationNotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, "Reservation not found")
            }
            DomainError::ListingNotAvailable { .. } => Self::bad_request("Listing not available"),
            DomainError::AlreadyPickedUp { .. } => {
                Self::bad_request("Reservation already picked up")
            }
            DomainError::OtpInvalid => Self::bad_request("Invalid OTP"),
            DomainError::OtpExpired => Self::bad_request("OTP has expired"),
            DomainError::Forbidden => Self::new(StatusCode::FORBIDDEN, "Access denied"),
            DomainError::MailDelivery(source) => {
                tracing::error!(error = %source, "mail delivery failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
                    .with_detail(source.to_string())
            }
            DomainError::Storage(source) => {
                tracing::error!(error = %source, "storage failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
                    .with_detail(source.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use uuid::Uuid;

    use super::ApiError;
    use crate::domain::DomainError;

    #[test]
    fn conflicts_map_to_bad_request() {
        let err = ApiError::from(DomainError::EmailTaken);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "User already exists");

        let err = ApiError::from(DomainError::ListingNotAvailable { id: Uuid::new_v4() });
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Listing not available");
    }

    #[test]
    fn missing_entities_map_to_not_found() {
        let err = ApiError::from(DomainError::ReservationNotFound { id: Uuid::new_v4() });
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn storage_failures_hide_internals_in_the_message() {
        let err = ApiError::from(DomainError::Storage(anyhow::anyhow!("connection refused")));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Something went wrong");
        assert_eq!(err.detail.as_deref(), Some("connection refused"));
    }
}
