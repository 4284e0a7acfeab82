//! Repository traits (storage ports) for the domain services.
//!
//! The multi-entity reservation operations are single trait methods so an
//! implementation can make them atomic: the SeaORM backend wraps them in a
//! database transaction, the in-memory backend holds one lock across the
//! whole step. The coordinator never sees partial state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::model::{Listing, ListingPatch, OtpRecord, Reservation, User};

/// Outcome of a reserve attempt.
///
/// `NotAvailable` covers both a missing listing and a listing whose status
/// is not `available`; callers cannot distinguish the two, matching the
/// public API contract.
#[derive(Debug)]
pub enum ReserveOutcome {
    Reserved(Reservation),
    NotAvailable,
}

#[derive(Debug, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    NotFound,
}

#[derive(Debug)]
pub enum PickupOutcome {
    Completed(Reservation),
    AlreadyPickedUp,
    NotFound,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: User) -> anyhow::Result<User>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    async fn find_many(&self, ids: &[Uuid]) -> anyhow::Result<Vec<User>>;

    async fn list_all(&self) -> anyhow::Result<Vec<User>>;

    async fn set_password_hash(&self, id: Uuid, password_hash: String) -> anyhow::Result<()>;

    /// Returns `false` when no such user exists.
    async fn set_active(&self, id: Uuid, active: bool) -> anyhow::Result<bool>;

    async fn count(&self) -> anyhow::Result<u64>;
}

#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn insert(&self, listing: Listing) -> anyhow::Result<Listing>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Listing>>;

    async fn find_many(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Listing>>;

    async fn list_all(&self) -> anyhow::Result<Vec<Listing>>;

    async fn list_available(&self) -> anyhow::Result<Vec<Listing>>;

    /// Listings owned by `owner` whose expiry time is still in the future.
    async fn list_by_owner_unexpired(
        &self,
        owner: Uuid,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Listing>>;

    /// Returns `None` when the listing does not exist.
    async fn update(&self, id: Uuid, patch: ListingPatch) -> anyhow::Result<Option<Listing>>;

    /// Returns `false` when the listing does not exist.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;

    /// Deletes every listing with `expiry_time < now`; returns the count.
    async fn delete_expired(&self, now: DateTime<Utc>) -> anyhow::Result<u64>;

    async fn count(&self) -> anyhow::Result<u64>;
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Atomically claim a listing: create a `reserved`/`pending` reservation
    /// and transition the listing to `reserved` with `reserved_by` set, but
    /// only if the listing currently is `available` (conditional update;
    /// first writer wins under concurrency).
    async fn reserve(&self, listing_id: Uuid, user_id: Uuid) -> anyhow::Result<ReserveOutcome>;

    /// Atomically delete the reservation and release the listing back to
    /// `available`. A listing that was separately deleted is tolerated: the
    /// reservation is still removed and the listing side is a no-op.
    async fn cancel(&self, id: Uuid) -> anyhow::Result<CancelOutcome>;

    /// Atomically complete the reservation (`picked_up`) and mark the
    /// listing `completed` if it still exists. Only valid while the pickup
    /// status is `pending`.
    async fn confirm_pickup(&self, id: Uuid) -> anyhow::Result<PickupOutcome>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Reservation>>;

    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Reservation>>;

    async fn list_by_listings(&self, listing_ids: &[Uuid]) -> anyhow::Result<Vec<Reservation>>;

    async fn list_all(&self) -> anyhow::Result<Vec<Reservation>>;

    async fn count(&self) -> anyhow::Result<u64>;
}

#[async_trait]
pub trait OtpRepository: Send + Sync {
    async fn insert(&self, record: OtpRecord) -> anyhow::Result<OtpRecord>;

    async fn find_by_email_and_code(
        &self,
        email: &str,
        code: &str,
    ) -> anyhow::Result<Option<OtpRecord>>;

    /// Returns `false` when the record was already gone.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}
