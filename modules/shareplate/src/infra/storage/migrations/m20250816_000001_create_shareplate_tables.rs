//! Initial migration for SharePlate tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Users::Email)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).text().not_null())
                    .col(ColumnDef::new(Users::Role).text().not_null())
                    .col(ColumnDef::new(Users::Name).text().not_null())
                    .col(ColumnDef::new(Users::Phone).text().not_null())
                    .col(ColumnDef::new(Users::Address).text().not_null())
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FoodListings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FoodListings::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FoodListings::RestaurantId).uuid().not_null())
                    .col(ColumnDef::new(FoodListings::FoodType).text().not_null())
                    .col(ColumnDef::new(FoodListings::Quantity).text().not_null())
                    .col(
                        ColumnDef::new(FoodListings::ExpiryTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FoodListings::Address).text().not_null())
                    .col(
                        ColumnDef::new(FoodListings::Longitude)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(FoodListings::Latitude)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(FoodListings::Photo).text().not_null())
                    .col(ColumnDef::new(FoodListings::Status).text().not_null())
                    .col(ColumnDef::new(FoodListings::ReservedBy).uuid())
                    .col(
                        ColumnDef::new(FoodListings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(FoodListings::Table, FoodListings::RestaurantId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_food_listings_restaurant")
                    .table(FoodListings::Table)
                    .col(FoodListings::RestaurantId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_food_listings_status")
                    .table(FoodListings::Table)
                    .col(FoodListings::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_food_listings_expiry")
                    .table(FoodListings::Table)
                    .col(FoodListings::ExpiryTime)
                    .to_owned(),
            )
            .await?;

        // Reservations carry no foreign key on listing_id: the expiry
        // sweeper deletes listings without touching reservations.
        manager
            .create_table(
                Table::create()
                    .table(Reservations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reservations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reservations::ListingId).uuid().not_null())
                    .col(ColumnDef::new(Reservations::UserId).uuid().not_null())
                    .col(ColumnDef::new(Reservations::Status).text().not_null())
                    .col(ColumnDef::new(Reservations::PickupStatus).text().not_null())
                    .col(
                        ColumnDef::new(Reservations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_user")
                    .table(Reservations::Table)
                    .col(Reservations::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_listing")
                    .table(Reservations::Table)
                    .col(Reservations::ListingId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PasswordResetOtps::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PasswordResetOtps::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PasswordResetOtps::Email).text().not_null())
                    .col(ColumnDef::new(PasswordResetOtps::Code).text().not_null())
                    .col(
                        ColumnDef::new(PasswordResetOtps::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PasswordResetOtps::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_password_reset_otps_email")
                    .table(PasswordResetOtps::Table)
                    .col(PasswordResetOtps::Email)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PasswordResetOtps::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Reservations::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(FoodListings::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
    Role,
    Name,
    Phone,
    Address,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum FoodListings {
    Table,
    Id,
    RestaurantId,
    FoodType,
    Quantity,
    ExpiryTime,
    Address,
    Longitude,
    Latitude,
    Photo,
    Status,
    ReservedBy,
    CreatedAt,
}

#[derive(Iden)]
enum Reservations {
    Table,
    Id,
    ListingId,
    UserId,
    Status,
    PickupStatus,
    CreatedAt,
}

#[derive(Iden)]
enum PasswordResetOtps {
    Table,
    Id,
    Email,
    Code,
    ExpiresAt,
    CreatedAt,
}
