//! Domain model for the SharePlate marketplace.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use thiserror::Error;
use uuid::Uuid;

/// Raised when a stored enum discriminant does not match any known value.
#[derive(Debug, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownEnumValue {
    kind: &'static str,
    value: String,
}

/// Account role. `Individual` covers both private persons and NGOs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Restaurant,
    Individual,
    Admin,
}

impl UserRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Restaurant => "restaurant",
            Self::Individual => "individual",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UnknownEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "restaurant" => Ok(Self::Restaurant),
            "individual" => Ok(Self::Individual),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownEnumValue {
                kind: "user role",
                value: other.to_owned(),
            }),
        }
    }
}

/// Listing lifecycle. Transitions are owned by the reservation coordinator;
/// the listing store only ever creates listings in `Available`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Available,
    Reserved,
    Completed,
}

impl ListingStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Reserved => "reserved",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingStatus {
    type Err = UnknownEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "reserved" => Ok(Self::Reserved),
            "completed" => Ok(Self::Completed),
            other => Err(UnknownEnumValue {
                kind: "listing status",
                value: other.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Reserved,
    Completed,
}

impl ReservationStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reserved => "reserved",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for ReservationStatus {
    type Err = UnknownEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reserved" => Ok(Self::Reserved),
            "completed" => Ok(Self::Completed),
            other => Err(UnknownEnumValue {
                kind: "reservation status",
                value: other.to_owned(),
            }),
        }
    }
}

/// Pickup progress. Monotonic: once `PickedUp`, a reservation never goes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PickupStatus {
    Pending,
    PickedUp,
}

impl PickupStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PickedUp => "picked_up",
        }
    }
}

impl FromStr for PickupStatus {
    type Err = UnknownEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "picked_up" => Ok(Self::PickedUp),
            other => Err(UnknownEnumValue {
                kind: "pickup status",
                value: other.to_owned(),
            }),
        }
    }
}

/// A registered account. `password_hash` never leaves the domain layer.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Registration input. The password is still in the clear here; the user
/// directory hashes it before anything is stored.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub name: String,
    pub phone: String,
    pub address: String,
}

/// Pickup location: a street address plus `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub address: String,
    pub coordinates: [f64; 2],
}

/// A surplus-food offer owned by a restaurant.
///
/// Invariant: `reserved_by.is_some()` iff `status` is `Reserved` or
/// `Completed`.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub food_type: String,
    pub quantity: String,
    pub expiry_time: DateTime<Utc>,
    pub location: Location,
    pub photo: String,
    pub status: ListingStatus,
    pub reserved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewListing {
    pub food_type: String,
    pub quantity: String,
    pub expiry_time: DateTime<Utc>,
    pub location: Location,
    pub photo: String,
}

/// Partial update of a listing. Status and `reserved_by` are deliberately
/// absent: those transitions belong to the reservation coordinator.
#[derive(Debug, Clone, Default)]
pub struct ListingPatch {
    pub food_type: Option<String>,
    pub quantity: Option<String>,
    pub expiry_time: Option<DateTime<Utc>>,
    pub location: Option<Location>,
    pub photo: Option<String>,
}

/// A consumer's claim on a listing. At most one per listing at a time;
/// cancelled reservations are deleted, not flagged.
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub user_id: Uuid,
    pub status: ReservationStatus,
    pub pickup_status: PickupStatus,
    pub created_at: DateTime<Utc>,
}

/// One-time password issued for password reset. Consumed on validation.
#[derive(Debug, Clone, PartialEq)]
pub struct OtpRecord {
    pub id: Uuid,
    pub email: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Read-only projection of a reservation joined with its listing and the
/// reserving user. Either side may be `None`: listings can be swept or
/// deleted independently of their reservation bookkeeping.
#[derive(Debug, Clone)]
pub struct ReservationView {
    pub reservation: Reservation,
    pub listing: Option<Listing>,
    pub user: Option<User>,
}

/// Platform-wide counters for the stats endpoint.
#[derive(Debug, Clone, Copy)]
pub struct PlatformStats {
    pub total_users: u64,
    pub total_listings: u64,
    pub total_reservations: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_round_trip_through_strings() {
        for role in [UserRole::Restaurant, UserRole::Individual, UserRole::Admin] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
        assert!("driver".parse::<UserRole>().is_err());
    }

    #[test]
    fn pickup_status_uses_snake_case_discriminant() {
        assert_eq!(PickupStatus::PickedUp.as_str(), "picked_up");
        assert_eq!(
            "picked_up".parse::<PickupStatus>().unwrap(),
            PickupStatus::PickedUp
        );
    }
}
