//! Shared application state handed to the REST layer.

use std::sync::Arc;

use crate::domain::ports::ImageStore;
use crate::domain::{ListingService, ReservationCoordinator, UserDirectory};
use crate::security::TokenSigner;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserDirectory>,
    pub listings: Arc<ListingService>,
    pub reservations: Arc<ReservationCoordinator>,
    pub images: Arc<dyn ImageStore>,
    pub signer: Arc<TokenSigner>,
}
