//! Domain layer: models, errors, storage ports and services.

pub mod error;
pub mod listings;
pub mod model;
pub mod ports;
pub mod repo;
pub mod reservations;
pub mod users;

pub use error::DomainError;
pub use listings::ListingService;
pub use reservations::ReservationCoordinator;
pub use users::UserDirectory;
