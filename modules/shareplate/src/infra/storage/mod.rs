//! Storage backends: SeaORM entities and repositories plus an in-memory
//! store for mock runs and tests.

pub mod entity;
pub mod in_memory;
pub mod mapper;
pub mod migrations;
pub mod sea_orm_repo;

pub use in_memory::InMemoryStore;
pub use migrations::Migrator;

/// Apply all pending migrations.
pub async fn run_migrations(db: &sea_orm::DatabaseConnection) -> anyhow::Result<()> {
    use sea_orm_migration::MigratorTrait;
    Migrator::up(db, None).await?;
    Ok(())
}
pub use sea_orm_repo::{
    SeaOrmListingRepository, SeaOrmOtpRepository, SeaOrmReservationRepository,
    SeaOrmUserRepository,
};
