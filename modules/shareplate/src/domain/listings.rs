//! Listing store: creation, reads, owner-scoped mutation, expiry sweep.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::error::DomainError;
use super::model::{Listing, ListingPatch, ListingStatus, NewListing, User, UserRole};
use super::repo::ListingRepository;

pub struct ListingService {
    listings: Arc<dyn ListingRepository>,
}

impl ListingService {
    pub fn new(listings: Arc<dyn ListingRepository>) -> Self {
        Self { listings }
    }

    /// Create a listing owned by `owner`. The status is always forced to
    /// `available`; clients cannot create pre-reserved listings.
    pub async fn create(&self, owner: &User, new: NewListing) -> Result<Listing, DomainError> {
        require_field("foodType", &new.food_type)?;
        require_field("quantity", &new.quantity)?;
        require_field("photo", &new.photo)?;
        require_field("location.address", &new.location.address)?;

        let listing = Listing {
            id: Uuid::new_v4(),
            restaurant_id: owner.id,
            food_type: new.food_type,
            quantity: new.quantity,
            expiry_time: new.expiry_time,
            location: new.location,
            photo: new.photo,
            status: ListingStatus::Available,
            reserved_by: None,
            created_at: Utc::now(),
        };

        let listing = self.listings.insert(listing).await?;
        tracing::info!(listing_id = %listing.id, owner = %owner.id, "listing created");
        Ok(listing)
    }

    pub async fn list_all(&self) -> Result<Vec<Listing>, DomainError> {
        Ok(self.listings.list_all().await?)
    }

    pub async fn list_available(&self) -> Result<Vec<Listing>, DomainError> {
        Ok(self.listings.list_available().await?)
    }

    /// The owner's own listings that have not yet expired.
    pub async fn list_for_restaurant(&self, owner: &User) -> Result<Vec<Listing>, DomainError> {
        Ok(self
            .listings
            .list_by_owner_unexpired(owner.id, Utc::now())
            .await?)
    }

    /// Patch a listing. Only its owner or an admin may do so.
    pub async fn update(
        &self,
        actor: &User,
        id: Uuid,
        patch: ListingPatch,
    ) -> Result<Listing, DomainError> {
        let Some(existing) = self.listings.find_by_id(id).await? else {
            return Err(DomainError::ListingNotFound { id });
        };
        authorize_owner(actor, &existing)?;

        self.listings
            .update(id, patch)
            .await?
            .ok_or(DomainError::ListingNotFound { id })
    }

    /// Delete a listing. Only its owner or an admin may do so.
    pub async fn delete(&self, actor: &User, id: Uuid) -> Result<(), DomainError> {
        let Some(existing) = self.listings.find_by_id(id).await? else {
            return Err(DomainError::ListingNotFound { id });
        };
        authorize_owner(actor, &existing)?;

        self.listings.delete(id).await?;
        tracing::info!(listing_id = %id, actor = %actor.id, "listing deleted");
        Ok(())
    }

    /// Remove every listing whose expiry time is strictly in the past.
    /// Idempotent; associated reservations are left in place.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        Ok(self.listings.delete_expired(now).await?)
    }

    pub async fn count(&self) -> Result<u64, DomainError> {
        Ok(self.listings.count().await?)
    }
}

fn authorize_owner(actor: &User, listing: &Listing) -> Result<(), DomainError> {
    if actor.role == UserRole::Admin || listing.restaurant_id == actor.id {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}

fn require_field(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(field, "is required"));
    }
    Ok(())
}
