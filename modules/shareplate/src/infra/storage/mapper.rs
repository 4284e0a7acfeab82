//! Entity to domain model mappers.
//!
//! Enum columns are stored as strings; decoding them is fallible, so the
//! entity-to-domain direction is `TryFrom`.

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use uuid::Uuid;

use crate::domain::model::{Listing, Location, OtpRecord, Reservation, User};

use super::entity::{listing, otp, reservation, user};

impl TryFrom<user::Model> for User {
    type Error = anyhow::Error;

    fn try_from(model: user::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            email: model.email,
            password_hash: model.password_hash,
            role: model.role.parse()?,
            name: model.name,
            phone: model.phone,
            address: model.address,
            is_active: model.is_active,
            created_at: model.created_at,
        })
    }
}

/// Convert a user to an insertable active model.
pub fn user_to_active_model(u: &User) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(u.id),
        email: Set(u.email.clone()),
        password_hash: Set(u.password_hash.clone()),
        role: Set(u.role.as_str().to_owned()),
        name: Set(u.name.clone()),
        phone: Set(u.phone.clone()),
        address: Set(u.address.clone()),
        is_active: Set(u.is_active),
        created_at: Set(u.created_at),
    }
}

impl TryFrom<listing::Model> for Listing {
    type Error = anyhow::Error;

    fn try_from(model: listing::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            restaurant_id: model.restaurant_id,
            food_type: model.food_type,
            quantity: model.quantity,
            expiry_time: model.expiry_time,
            location: Location {
                address: model.address,
                coordinates: [model.longitude, model.latitude],
            },
            photo: model.photo,
            status: model.status.parse()?,
            reserved_by: model.reserved_by,
            created_at: model.created_at,
        })
    }
}

/// Convert a listing to an insertable active model.
pub fn listing_to_active_model(l: &Listing) -> listing::ActiveModel {
    listing::ActiveModel {
        id: Set(l.id),
        restaurant_id: Set(l.restaurant_id),
        food_type: Set(l.food_type.clone()),
        quantity: Set(l.quantity.clone()),
        expiry_time: Set(l.expiry_time),
        address: Set(l.location.address.clone()),
        longitude: Set(l.location.coordinates[0]),
        latitude: Set(l.location.coordinates[1]),
        photo: Set(l.photo.clone()),
        status: Set(l.status.as_str().to_owned()),
        reserved_by: Set(l.reserved_by),
        created_at: Set(l.created_at),
    }
}

impl TryFrom<reservation::Model> for Reservation {
    type Error = anyhow::Error;

    fn try_from(model: reservation::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            listing_id: model.listing_id,
            user_id: model.user_id,
            status: model.status.parse()?,
            pickup_status: model.pickup_status.parse()?,
            created_at: model.created_at,
        })
    }
}

/// Build the active model for a freshly created reservation.
pub fn new_reservation_active_model(
    id: Uuid,
    listing_id: Uuid,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> reservation::ActiveModel {
    use crate::domain::model::{PickupStatus, ReservationStatus};

    reservation::ActiveModel {
        id: Set(id),
        listing_id: Set(listing_id),
        user_id: Set(user_id),
        status: Set(ReservationStatus::Reserved.as_str().to_owned()),
        pickup_status: Set(PickupStatus::Pending.as_str().to_owned()),
        created_at: Set(now),
    }
}

impl From<otp::Model> for OtpRecord {
    fn from(model: otp::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            code: model.code,
            expires_at: model.expires_at,
            created_at: model.created_at,
        }
    }
}

/// Convert an OTP record to an insertable active model.
pub fn otp_to_active_model(o: &OtpRecord) -> otp::ActiveModel {
    otp::ActiveModel {
        id: Set(o.id),
        email: Set(o.email.clone()),
        code: Set(o.code.clone()),
        expires_at: Set(o.expires_at),
        created_at: Set(o.created_at),
    }
}
