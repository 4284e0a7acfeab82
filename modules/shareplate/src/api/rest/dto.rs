//! REST data transfer objects.
//!
//! Wire format is camelCase JSON; conversions to and from the domain model
//! live next to each DTO.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::model::{
    Listing, ListingPatch, ListingStatus, Location, NewListing, NewUser, PickupStatus,
    PlatformStats, Reservation, ReservationStatus, ReservationView, User, UserRole,
};

// -------------------------------------------------------------------------
// Auth
// -------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub user_type: UserRole,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

impl From<RegisterRequest> for NewUser {
    fn from(req: RegisterRequest) -> Self {
        Self {
            email: req.email,
            password: req.password,
            role: req.user_type,
            name: req.name,
            phone: req.phone,
            address: req.address,
        }
    }
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub user_type: UserRole,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            user_type: u.role,
            name: u.name,
            phone: u.phone,
            address: u.address,
            is_active: u.is_active,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserDto,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub user: UserDto,
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateOtpRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub otp: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub new_password: String,
}

// -------------------------------------------------------------------------
// Listings
// -------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LocationDto {
    #[serde(default)]
    pub address: String,
    /// `[longitude, latitude]`
    #[serde(default)]
    #[schema(value_type = Vec<f64>, min_items = 2, max_items = 2)]
    pub coordinates: [f64; 2],
}

impl From<LocationDto> for Location {
    fn from(dto: LocationDto) -> Self {
        Self {
            address: dto.address,
            coordinates: dto.coordinates,
        }
    }
}

impl From<Location> for LocationDto {
    fn from(loc: Location) -> Self {
        Self {
            address: loc.address,
            coordinates: loc.coordinates,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    #[serde(default)]
    pub food_type: String,
    #[serde(default)]
    pub quantity: String,
    pub expiry_time: DateTime<Utc>,
    pub location: LocationDto,
    #[serde(default)]
    pub photo: String,
}

impl From<CreateListingRequest> for NewListing {
    fn from(req: CreateListingRequest) -> Self {
        Self {
            food_type: req.food_type,
            quantity: req.quantity,
            expiry_time: req.expiry_time,
            location: req.location.into(),
            photo: req.photo,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListingRequest {
    pub food_type: Option<String>,
    pub quantity: Option<String>,
    pub expiry_time: Option<DateTime<Utc>>,
    pub location: Option<LocationDto>,
    pub photo: Option<String>,
}

impl From<UpdateListingRequest> for ListingPatch {
    fn from(req: UpdateListingRequest) -> Self {
        Self {
            food_type: req.food_type,
            quantity: req.quantity,
            expiry_time: req.expiry_time,
            location: req.location.map(Location::from),
            photo: req.photo,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingDto {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub food_type: String,
    pub quantity: String,
    pub expiry_time: DateTime<Utc>,
    pub location: LocationDto,
    pub photo: String,
    pub status: ListingStatus,
    pub reserved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<Listing> for ListingDto {
    fn from(l: Listing) -> Self {
        Self {
            id: l.id,
            restaurant_id: l.restaurant_id,
            food_type: l.food_type,
            quantity: l.quantity,
            expiry_time: l.expiry_time,
            location: l.location.into(),
            photo: l.photo,
            status: l.status,
            reserved_by: l.reserved_by,
            created_at: l.created_at,
        }
    }
}

// -------------------------------------------------------------------------
// Reservations
// -------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReserveRequest {
    pub listing_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReserveResponse {
    pub message: String,
    pub reservation_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationViewDto {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub user_id: Uuid,
    pub status: ReservationStatus,
    pub pickup_status: PickupStatus,
    pub created_at: DateTime<Utc>,
    /// `None` when the listing was deleted after the reservation was made.
    pub listing: Option<ListingDto>,
    pub user: Option<UserDto>,
}

impl From<ReservationView> for ReservationViewDto {
    fn from(view: ReservationView) -> Self {
        let Reservation {
            id,
            listing_id,
            user_id,
            status,
            pickup_status,
            created_at,
        } = view.reservation;
        Self {
            id,
            listing_id,
            user_id,
            status,
            pickup_status,
            created_at,
            listing: view.listing.map(ListingDto::from),
            user: view.user.map(UserDto::from),
        }
    }
}

/// Comma-separated listing ids, e.g. `?listingIds=a,b,c`.
#[derive(Debug, Deserialize)]
pub struct ByListingsQuery {
    #[serde(rename = "listingIds", default)]
    pub listing_ids: String,
}

// -------------------------------------------------------------------------
// Stats and uploads
// -------------------------------------------------------------------------

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsDto {
    pub total_users: u64,
    pub total_listings: u64,
    pub total_reservations: u64,
}

impl From<PlatformStats> for StatsDto {
    fn from(stats: PlatformStats) -> Self {
        Self {
            total_users: stats.total_users,
            total_listings: stats.total_listings,
            total_reservations: stats.total_reservations,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadImageRequest {
    /// Base64 payload, optionally prefixed with a `data:image/...;base64,`
    /// data-URL header.
    #[serde(default)]
    pub file: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageResponse {
    pub image_url: String,
}
