//! In-memory storage backend.
//!
//! Backs `--mock` runs and the test suite. One store implements all four
//! repository traits; the reservation transitions take the listings lock and
//! the reservations lock together (always in that order) so they stay atomic
//! just like the transactional SQL backend.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::domain::model::{
    Listing, ListingPatch, ListingStatus, OtpRecord, PickupStatus, Reservation, ReservationStatus,
    User,
};
use crate::domain::repo::{
    CancelOutcome, ListingRepository, OtpRepository, PickupOutcome, ReservationRepository,
    ReserveOutcome, UserRepository,
};

#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    listings: RwLock<HashMap<Uuid, Listing>>,
    reservations: RwLock<HashMap<Uuid, Reservation>>,
    otps: RwLock<HashMap<Uuid, OtpRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T, F: Fn(&T) -> DateTime<Utc>>(mut items: Vec<T>, created_at: F) -> Vec<T> {
    items.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
    items
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, u: User) -> anyhow::Result<User> {
        self.users.write().insert(u.id, u.clone());
        Ok(u)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> anyhow::Result<Vec<User>> {
        let users = self.users.read();
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn list_all(&self) -> anyhow::Result<Vec<User>> {
        Ok(newest_first(
            self.users.read().values().cloned().collect(),
            |u| u.created_at,
        ))
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: String) -> anyhow::Result<()> {
        if let Some(u) = self.users.write().get_mut(&id) {
            u.password_hash = password_hash;
        }
        Ok(())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> anyhow::Result<bool> {
        match self.users.write().get_mut(&id) {
            Some(u) => {
                u.is_active = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count(&self) -> anyhow::Result<u64> {
        Ok(self.users.read().len() as u64)
    }
}

#[async_trait]
impl ListingRepository for InMemoryStore {
    async fn insert(&self, l: Listing) -> anyhow::Result<Listing> {
        self.listings.write().insert(l.id, l.clone());
        Ok(l)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Listing>> {
        Ok(self.listings.read().get(&id).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Listing>> {
        let listings = self.listings.read();
        Ok(ids
            .iter()
            .filter_map(|id| listings.get(id).cloned())
            .collect())
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Listing>> {
        Ok(newest_first(
            self.listings.read().values().cloned().collect(),
            |l| l.created_at,
        ))
    }

    async fn list_available(&self) -> anyhow::Result<Vec<Listing>> {
        Ok(newest_first(
            self.listings
                .read()
                .values()
                .filter(|l| l.status == ListingStatus::Available)
                .cloned()
                .collect(),
            |l| l.created_at,
        ))
    }

    async fn list_by_owner_unexpired(
        &self,
        owner: Uuid,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Listing>> {
        Ok(newest_first(
            self.listings
                .read()
                .values()
                .filter(|l| l.restaurant_id == owner && l.expiry_time >= now)
                .cloned()
                .collect(),
            |l| l.created_at,
        ))
    }

    async fn update(&self, id: Uuid, patch: ListingPatch) -> anyhow::Result<Option<Listing>> {
        let mut listings = self.listings.write();
        let Some(l) = listings.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(food_type) = patch.food_type {
            l.food_type = food_type;
        }
        if let Some(quantity) = patch.quantity {
            l.quantity = quantity;
        }
        if let Some(expiry_time) = patch.expiry_time {
            l.expiry_time = expiry_time;
        }
        if let Some(location) = patch.location {
            l.location = location;
        }
        if let Some(photo) = patch.photo {
            l.photo = photo;
        }
        Ok(Some(l.clone()))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.listings.write().remove(&id).is_some())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> anyhow::Result<u64> {
        let mut listings = self.listings.write();
        let before = listings.len();
        listings.retain(|_, l| l.expiry_time >= now);
        Ok((before - listings.len()) as u64)
    }

    async fn count(&self) -> anyhow::Result<u64> {
        Ok(self.listings.read().len() as u64)
    }
}

#[async_trait]
impl ReservationRepository for InMemoryStore {
    async fn reserve(&self, listing_id: Uuid, user_id: Uuid) -> anyhow::Result<ReserveOutcome> {
        let mut listings = self.listings.write();
        let mut reservations = self.reservations.write();

        let Some(l) = listings.get_mut(&listing_id) else {
            return Ok(ReserveOutcome::NotAvailable);
        };
        if l.status != ListingStatus::Available {
            return Ok(ReserveOutcome::NotAvailable);
        }

        l.status = ListingStatus::Reserved;
        l.reserved_by = Some(user_id);

        let reservation = Reservation {
            id: Uuid::new_v4(),
            listing_id,
            user_id,
            status: ReservationStatus::Reserved,
            pickup_status: PickupStatus::Pending,
            created_at: Utc::now(),
        };
        reservations.insert(reservation.id, reservation.clone());
        Ok(ReserveOutcome::Reserved(reservation))
    }

    async fn cancel(&self, id: Uuid) -> anyhow::Result<CancelOutcome> {
        let mut listings = self.listings.write();
        let mut reservations = self.reservations.write();

        let Some(reservation) = reservations.remove(&id) else {
            return Ok(CancelOutcome::NotFound);
        };
        if let Some(l) = listings.get_mut(&reservation.listing_id) {
            l.status = ListingStatus::Available;
            l.reserved_by = None;
        }
        Ok(CancelOutcome::Cancelled)
    }

    async fn confirm_pickup(&self, id: Uuid) -> anyhow::Result<PickupOutcome> {
        let mut listings = self.listings.write();
        let mut reservations = self.reservations.write();

        let Some(reservation) = reservations.get_mut(&id) else {
            return Ok(PickupOutcome::NotFound);
        };
        if reservation.pickup_status == PickupStatus::PickedUp {
            return Ok(PickupOutcome::AlreadyPickedUp);
        }

        reservation.status = ReservationStatus::Completed;
        reservation.pickup_status = PickupStatus::PickedUp;
        if let Some(l) = listings.get_mut(&reservation.listing_id) {
            l.status = ListingStatus::Completed;
        }
        Ok(PickupOutcome::Completed(reservation.clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Reservation>> {
        Ok(self.reservations.read().get(&id).cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Reservation>> {
        Ok(newest_first(
            self.reservations
                .read()
                .values()
                .filter(|r| r.user_id == user_id)
                .cloned()
                .collect(),
            |r| r.created_at,
        ))
    }

    async fn list_by_listings(&self, listing_ids: &[Uuid]) -> anyhow::Result<Vec<Reservation>> {
        Ok(newest_first(
            self.reservations
                .read()
                .values()
                .filter(|r| listing_ids.contains(&r.listing_id))
                .cloned()
                .collect(),
            |r| r.created_at,
        ))
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Reservation>> {
        Ok(newest_first(
            self.reservations.read().values().cloned().collect(),
            |r| r.created_at,
        ))
    }

    async fn count(&self) -> anyhow::Result<u64> {
        Ok(self.reservations.read().len() as u64)
    }
}

#[async_trait]
impl OtpRepository for InMemoryStore {
    async fn insert(&self, record: OtpRecord) -> anyhow::Result<OtpRecord> {
        self.otps.write().insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_email_and_code(
        &self,
        email: &str,
        code: &str,
    ) -> anyhow::Result<Option<OtpRecord>> {
        Ok(self
            .otps
            .read()
            .values()
            .filter(|o| o.email == email && o.code == code)
            .max_by_key(|o| o.created_at)
            .cloned())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.otps.write().remove(&id).is_some())
    }
}
