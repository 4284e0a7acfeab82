//! Reservation coordinator: the state machine linking a listing and its
//! reservation.
//!
//! Listing side: `available → reserved → completed`, with `reserved →
//! available` on cancellation. Reservation side: created `reserved`/
//! `pending`, completed via pickup, deleted via cancellation. The paired
//! writes are atomic at the repository (see [`ReservationRepository`]); the
//! coordinator decides outcomes and builds the joined read projections.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use uuid::Uuid;

use super::error::DomainError;
use super::model::{Reservation, ReservationView};
use super::repo::{
    CancelOutcome, ListingRepository, PickupOutcome, ReservationRepository, ReserveOutcome,
    UserRepository,
};

pub struct ReservationCoordinator {
    reservations: Arc<dyn ReservationRepository>,
    listings: Arc<dyn ListingRepository>,
    users: Arc<dyn UserRepository>,
}

impl ReservationCoordinator {
    pub fn new(
        reservations: Arc<dyn ReservationRepository>,
        listings: Arc<dyn ListingRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            reservations,
            listings,
            users,
        }
    }

    /// Claim an available listing for `user_id`.
    ///
    /// A missing listing and a listing that is already reserved or
    /// completed both fail with `ListingNotAvailable`; under concurrent
    /// attempts the first writer wins and the rest land here too.
    pub async fn reserve(
        &self,
        listing_id: Uuid,
        user_id: Uuid,
    ) -> Result<Reservation, DomainError> {
        match self.reservations.reserve(listing_id, user_id).await? {
            ReserveOutcome::Reserved(reservation) => {
                tracing::info!(
                    reservation_id = %reservation.id,
                    listing_id = %listing_id,
                    user_id = %user_id,
                    "listing reserved"
                );
                Ok(reservation)
            }
            ReserveOutcome::NotAvailable => {
                Err(DomainError::ListingNotAvailable { id: listing_id })
            }
        }
    }

    /// Cancel a reservation, releasing its listing back to `available`.
    /// If the listing was separately deleted the reservation is still
    /// removed (orphan cleanup).
    pub async fn cancel(&self, id: Uuid) -> Result<(), DomainError> {
        match self.reservations.cancel(id).await? {
            CancelOutcome::Cancelled => {
                tracing::info!(reservation_id = %id, "reservation cancelled");
                Ok(())
            }
            CancelOutcome::NotFound => Err(DomainError::ReservationNotFound { id }),
        }
    }

    /// Confirm the physical pickup. Valid only while the pickup status is
    /// `pending`; the listing side is skipped if the listing is gone.
    pub async fn confirm_pickup(&self, id: Uuid) -> Result<Reservation, DomainError> {
        match self.reservations.confirm_pickup(id).await? {
            PickupOutcome::Completed(reservation) => {
                tracing::info!(reservation_id = %id, "pickup confirmed");
                Ok(reservation)
            }
            PickupOutcome::AlreadyPickedUp => Err(DomainError::AlreadyPickedUp { id }),
            PickupOutcome::NotFound => Err(DomainError::ReservationNotFound { id }),
        }
    }

    /// A consumer's reservations, each joined with its listing.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ReservationView>, DomainError> {
        let reservations = self.reservations.list_by_user(user_id).await?;
        self.attach(reservations, false).await
    }

    /// Every reservation, joined with listing and user (admin view).
    pub async fn list_all(&self) -> Result<Vec<ReservationView>, DomainError> {
        let reservations = self.reservations.list_all().await?;
        self.attach(reservations, true).await
    }

    /// Reservations referencing any of `listing_ids`, joined with listing
    /// and user (restaurant dashboard view).
    pub async fn list_for_listings(
        &self,
        listing_ids: &[Uuid],
    ) -> Result<Vec<ReservationView>, DomainError> {
        let reservations = self.reservations.list_by_listings(listing_ids).await?;
        self.attach(reservations, true).await
    }

    pub async fn count(&self) -> Result<u64, DomainError> {
        Ok(self.reservations.count().await?)
    }

    /// Join reservations with their listings (and users when `with_users`).
    /// Dangling references are tolerated: the sweeper deletes listings
    /// without cascading, so a reservation may outlive its listing.
    async fn attach(
        &self,
        reservations: Vec<Reservation>,
        with_users: bool,
    ) -> Result<Vec<ReservationView>, DomainError> {
        let listing_ids: Vec<Uuid> = reservations
            .iter()
            .map(|r| r.listing_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let listings: HashMap<Uuid, _> = self
            .listings
            .find_many(&listing_ids)
            .await?
            .into_iter()
            .map(|l| (l.id, l))
            .collect();

        let users: HashMap<Uuid, _> = if with_users {
            let user_ids: Vec<Uuid> = reservations
                .iter()
                .map(|r| r.user_id)
                .collect::<HashSet<_>>()
                .into_iter()
                .collect();
            self.users
                .find_many(&user_ids)
                .await?
                .into_iter()
                .map(|u| (u.id, u))
                .collect()
        } else {
            HashMap::new()
        };

        Ok(reservations
            .into_iter()
            .map(|reservation| {
                let listing = listings.get(&reservation.listing_id).cloned();
                if listing.is_none() {
                    tracing::debug!(
                        reservation_id = %reservation.id,
                        listing_id = %reservation.listing_id,
                        "reservation references a deleted listing"
                    );
                }
                let user = with_users
                    .then(|| users.get(&reservation.user_id).cloned())
                    .flatten();
                ReservationView {
                    reservation,
                    listing,
                    user,
                }
            })
            .collect())
    }
}
