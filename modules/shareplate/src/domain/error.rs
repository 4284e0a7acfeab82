//! Domain errors for SharePlate operations.

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors. The REST layer owns the mapping to HTTP statuses.
#[derive(Error, Debug)]
pub enum DomainError {
    /// A required field is missing or malformed.
    #[error("validation error: {field}: {message}")]
    Validation { field: String, message: String },

    /// Registration with an email that is already taken.
    #[error("user already exists")]
    EmailTaken,

    /// Login with an unknown email or a wrong password. Deliberately one
    /// variant: callers must not be able to tell the two apart.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// Listing not found.
    #[error("listing not found: {id}")]
    ListingNotFound { id: Uuid },

    /// Reservation not found.
    #[error("reservation not found: {id}")]
    ReservationNotFound { id: Uuid },

    /// Reserve attempted on a listing that is missing or not `available`.
    #[error("listing not available: {id}")]
    ListingNotAvailable { id: Uuid },

    /// Pickup confirmation on a reservation that is already picked up.
    #[error("reservation already picked up: {id}")]
    AlreadyPickedUp { id: Uuid },

    /// OTP validation with an unknown email/code pair.
    #[error("invalid OTP")]
    OtpInvalid,

    /// OTP validation after the code's expiry time.
    #[error("OTP has expired")]
    OtpExpired,

    /// Caller lacks the role or ownership the operation requires.
    #[error("access denied")]
    Forbidden,

    /// The mail collaborator failed. Never retried.
    #[error("mail delivery failed: {0}")]
    MailDelivery(#[source] anyhow::Error),

    /// Storage failure. Surfaced as a generic server fault.
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl DomainError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}
