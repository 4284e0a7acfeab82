//! SeaORM repository implementations.
//!
//! The reservation state transitions run inside database transactions with a
//! conditional update on the listing row, so concurrent claims on the same
//! listing resolve to exactly one winner.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use uuid::Uuid;

use crate::domain::model::{
    Listing, ListingPatch, ListingStatus, OtpRecord, PickupStatus, Reservation, ReservationStatus,
    User,
};
use crate::domain::repo::{
    CancelOutcome, ListingRepository, OtpRepository, PickupOutcome, ReservationRepository,
    ReserveOutcome, UserRepository,
};

use super::entity::{listing, otp, reservation, user};
use super::mapper::{
    listing_to_active_model, new_reservation_active_model, otp_to_active_model,
    user_to_active_model,
};

/// SeaORM implementation of UserRepository.
pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn insert(&self, u: User) -> anyhow::Result<User> {
        let model = user_to_active_model(&u).insert(&self.db).await?;
        Ok(User::try_from(model)?)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let found = user::Entity::find_by_id(id).one(&self.db).await?;
        found.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let found = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        found.map(User::try_from).transpose()
    }

    async fn find_many(&self, ids: &[Uuid]) -> anyhow::Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = user::Entity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?;
        models.into_iter().map(User::try_from).collect()
    }

    async fn list_all(&self) -> anyhow::Result<Vec<User>> {
        let models = user::Entity::find()
            .order_by_desc(user::Column::CreatedAt)
            .all(&self.db)
            .await?;
        models.into_iter().map(User::try_from).collect()
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: String) -> anyhow::Result<()> {
        user::Entity::update_many()
            .col_expr(user::Column::PasswordHash, Expr::value(password_hash))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> anyhow::Result<bool> {
        let result = user::Entity::update_many()
            .col_expr(user::Column::IsActive, Expr::value(active))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn count(&self) -> anyhow::Result<u64> {
        Ok(user::Entity::find().count(&self.db).await?)
    }
}

/// SeaORM implementation of ListingRepository.
pub struct SeaOrmListingRepository {
    db: DatabaseConnection,
}

impl SeaOrmListingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ListingRepository for SeaOrmListingRepository {
    async fn insert(&self, l: Listing) -> anyhow::Result<Listing> {
        let model = listing_to_active_model(&l).insert(&self.db).await?;
        Ok(Listing::try_from(model)?)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Listing>> {
        let found = listing::Entity::find_by_id(id).one(&self.db).await?;
        found.map(Listing::try_from).transpose()
    }

    async fn find_many(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Listing>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = listing::Entity::find()
            .filter(listing::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?;
        models.into_iter().map(Listing::try_from).collect()
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Listing>> {
        let models = listing::Entity::find()
            .order_by_desc(listing::Column::CreatedAt)
            .all(&self.db)
            .await?;
        models.into_iter().map(Listing::try_from).collect()
    }

    async fn list_available(&self) -> anyhow::Result<Vec<Listing>> {
        let models = listing::Entity::find()
            .filter(listing::Column::Status.eq(ListingStatus::Available.as_str()))
            .order_by_desc(listing::Column::CreatedAt)
            .all(&self.db)
            .await?;
        models.into_iter().map(Listing::try_from).collect()
    }

    async fn list_by_owner_unexpired(
        &self,
        owner: Uuid,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Listing>> {
        let models = listing::Entity::find()
            .filter(listing::Column::RestaurantId.eq(owner))
            .filter(listing::Column::ExpiryTime.gte(now))
            .order_by_desc(listing::Column::CreatedAt)
            .all(&self.db)
            .await?;
        models.into_iter().map(Listing::try_from).collect()
    }

    async fn update(&self, id: Uuid, patch: ListingPatch) -> anyhow::Result<Option<Listing>> {
        let Some(current) = listing::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active = listing::ActiveModel {
            id: ActiveValue::Unchanged(id),
            ..Default::default()
        };
        let mut changed = false;
        if let Some(food_type) = patch.food_type {
            active.food_type = ActiveValue::Set(food_type);
            changed = true;
        }
        if let Some(quantity) = patch.quantity {
            active.quantity = ActiveValue::Set(quantity);
            changed = true;
        }
        if let Some(expiry_time) = patch.expiry_time {
            active.expiry_time = ActiveValue::Set(expiry_time);
            changed = true;
        }
        if let Some(location) = patch.location {
            active.address = ActiveValue::Set(location.address);
            active.longitude = ActiveValue::Set(location.coordinates[0]);
            active.latitude = ActiveValue::Set(location.coordinates[1]);
            changed = true;
        }
        if let Some(photo) = patch.photo {
            active.photo = ActiveValue::Set(photo);
            changed = true;
        }
        if !changed {
            return Ok(Some(Listing::try_from(current)?));
        }

        match active.update(&self.db).await {
            Ok(model) => Ok(Some(Listing::try_from(model)?)),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = listing::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> anyhow::Result<u64> {
        let result = listing::Entity::delete_many()
            .filter(listing::Column::ExpiryTime.lt(now))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn count(&self) -> anyhow::Result<u64> {
        Ok(listing::Entity::find().count(&self.db).await?)
    }
}

/// SeaORM implementation of ReservationRepository.
pub struct SeaOrmReservationRepository {
    db: DatabaseConnection,
}

impl SeaOrmReservationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReservationRepository for SeaOrmReservationRepository {
    async fn reserve(&self, listing_id: Uuid, user_id: Uuid) -> anyhow::Result<ReserveOutcome> {
        let txn = self.db.begin().await?;

        // Conditional claim: only an `available` row transitions. Zero rows
        // affected means the listing is missing or already claimed.
        let claimed = listing::Entity::update_many()
            .col_expr(
                listing::Column::Status,
                Expr::value(ListingStatus::Reserved.as_str()),
            )
            .col_expr(listing::Column::ReservedBy, Expr::value(Some(user_id)))
            .filter(listing::Column::Id.eq(listing_id))
            .filter(listing::Column::Status.eq(ListingStatus::Available.as_str()))
            .exec(&txn)
            .await?;
        if claimed.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(ReserveOutcome::NotAvailable);
        }

        let model = new_reservation_active_model(Uuid::new_v4(), listing_id, user_id, Utc::now())
            .insert(&txn)
            .await?;
        txn.commit().await?;

        Ok(ReserveOutcome::Reserved(Reservation::try_from(model)?))
    }

    async fn cancel(&self, id: Uuid) -> anyhow::Result<CancelOutcome> {
        let txn = self.db.begin().await?;

        let Some(found) = reservation::Entity::find_by_id(id).one(&txn).await? else {
            txn.rollback().await?;
            return Ok(CancelOutcome::NotFound);
        };

        reservation::Entity::delete_by_id(id).exec(&txn).await?;

        // No-op when the listing was swept in the meantime.
        listing::Entity::update_many()
            .col_expr(
                listing::Column::Status,
                Expr::value(ListingStatus::Available.as_str()),
            )
            .col_expr(listing::Column::ReservedBy, Expr::value(None::<Uuid>))
            .filter(listing::Column::Id.eq(found.listing_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(CancelOutcome::Cancelled)
    }

    async fn confirm_pickup(&self, id: Uuid) -> anyhow::Result<PickupOutcome> {
        let txn = self.db.begin().await?;

        let Some(found) = reservation::Entity::find_by_id(id).one(&txn).await? else {
            txn.rollback().await?;
            return Ok(PickupOutcome::NotFound);
        };
        if found.pickup_status == PickupStatus::PickedUp.as_str() {
            txn.rollback().await?;
            return Ok(PickupOutcome::AlreadyPickedUp);
        }

        let mut active = found.into_active_model();
        active.status = ActiveValue::Set(ReservationStatus::Completed.as_str().to_owned());
        active.pickup_status = ActiveValue::Set(PickupStatus::PickedUp.as_str().to_owned());
        let updated = active.update(&txn).await?;

        listing::Entity::update_many()
            .col_expr(
                listing::Column::Status,
                Expr::value(ListingStatus::Completed.as_str()),
            )
            .filter(listing::Column::Id.eq(updated.listing_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(PickupOutcome::Completed(Reservation::try_from(updated)?))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Reservation>> {
        let found = reservation::Entity::find_by_id(id).one(&self.db).await?;
        found.map(Reservation::try_from).transpose()
    }

    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .filter(reservation::Column::UserId.eq(user_id))
            .order_by_desc(reservation::Column::CreatedAt)
            .all(&self.db)
            .await?;
        models.into_iter().map(Reservation::try_from).collect()
    }

    async fn list_by_listings(&self, listing_ids: &[Uuid]) -> anyhow::Result<Vec<Reservation>> {
        if listing_ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = reservation::Entity::find()
            .filter(reservation::Column::ListingId.is_in(listing_ids.iter().copied()))
            .order_by_desc(reservation::Column::CreatedAt)
            .all(&self.db)
            .await?;
        models.into_iter().map(Reservation::try_from).collect()
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .order_by_desc(reservation::Column::CreatedAt)
            .all(&self.db)
            .await?;
        models.into_iter().map(Reservation::try_from).collect()
    }

    async fn count(&self) -> anyhow::Result<u64> {
        Ok(reservation::Entity::find().count(&self.db).await?)
    }
}

/// SeaORM implementation of OtpRepository.
pub struct SeaOrmOtpRepository {
    db: DatabaseConnection,
}

impl SeaOrmOtpRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OtpRepository for SeaOrmOtpRepository {
    async fn insert(&self, record: OtpRecord) -> anyhow::Result<OtpRecord> {
        let model = otp_to_active_model(&record).insert(&self.db).await?;
        Ok(OtpRecord::from(model))
    }

    async fn find_by_email_and_code(
        &self,
        email: &str,
        code: &str,
    ) -> anyhow::Result<Option<OtpRecord>> {
        let found = otp::Entity::find()
            .filter(otp::Column::Email.eq(email))
            .filter(otp::Column::Code.eq(code))
            .order_by_desc(otp::Column::CreatedAt)
            .one(&self.db)
            .await?;
        Ok(found.map(OtpRecord::from))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = otp::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
