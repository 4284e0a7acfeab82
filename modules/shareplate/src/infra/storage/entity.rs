//! SeaORM entities for SharePlate.

pub use listing::Entity as ListingEntity;
pub use otp::Entity as OtpEntity;
pub use reservation::Entity as ReservationEntity;
pub use user::Entity as UserEntity;

/// User entity module.
pub mod user {
    use chrono::{DateTime, Utc};
    use sea_orm::entity::prelude::*;
    use uuid::Uuid;

    /// User entity for the `users` table.
    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(unique)]
        pub email: String,
        pub password_hash: String,
        pub role: String,
        pub name: String,
        pub phone: String,
        pub address: String,
        pub is_active: bool,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::listing::Entity")]
        Listings,
    }

    impl Related<super::listing::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Listings.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Food listing entity module.
pub mod listing {
    use chrono::{DateTime, Utc};
    use sea_orm::entity::prelude::*;
    use uuid::Uuid;

    /// Listing entity for the `food_listings` table.
    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "food_listings")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub restaurant_id: Uuid,
        pub food_type: String,
        pub quantity: String,
        pub expiry_time: DateTime<Utc>,
        pub address: String,
        pub longitude: f64,
        pub latitude: f64,
        pub photo: String,
        pub status: String,
        pub reserved_by: Option<Uuid>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::user::Entity",
            from = "Column::RestaurantId",
            to = "super::user::Column::Id"
        )]
        Restaurant,
    }

    impl Related<super::user::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Restaurant.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Reservation entity module.
pub mod reservation {
    use chrono::{DateTime, Utc};
    use sea_orm::entity::prelude::*;
    use uuid::Uuid;

    /// Reservation entity for the `reservations` table.
    ///
    /// No foreign key on `listing_id`: the sweeper deletes listings without
    /// cascading, so reservations may reference rows that are gone.
    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "reservations")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub listing_id: Uuid,
        pub user_id: Uuid,
        pub status: String,
        pub pickup_status: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// One-time password entity module.
pub mod otp {
    use chrono::{DateTime, Utc};
    use sea_orm::entity::prelude::*;
    use uuid::Uuid;

    /// OTP entity for the `password_reset_otps` table.
    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "password_reset_otps")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub email: String,
        pub code: String,
        pub expires_at: DateTime<Utc>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
