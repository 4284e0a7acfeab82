//! SharePlate: a food-donation marketplace backend.
//!
//! Restaurants list surplus food; individuals and NGOs reserve and pick it
//! up. The crate is layered the usual way: `domain` holds the models,
//! services and storage ports, `infra` the SeaORM/mail/object-storage
//! adapters, `api::rest` the HTTP surface.

pub mod api;
pub mod config;
pub mod domain;
pub mod infra;
pub mod security;
pub mod state;
pub mod sweeper;

pub use config::AppConfig;
pub use state::AppState;
