//! Shared fixtures for the integration tests.

#![allow(dead_code)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use shareplate::domain::model::{Listing, ListingStatus, Location, NewListing, User, UserRole};
use shareplate::domain::ports::MailSender;
use shareplate::domain::repo::UserRepository;
use shareplate::domain::{ListingService, ReservationCoordinator, UserDirectory};
use shareplate::infra::storage::InMemoryStore;

/// Captures outbound mail instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    pub fn last_code(&self) -> Option<String> {
        self.sent.lock().last().map(|(_, code)| code.clone())
    }
}

#[async_trait]
impl MailSender for RecordingMailer {
    async fn send_reset_code(&self, to: &str, code: &str) -> anyhow::Result<()> {
        self.sent.lock().push((to.to_owned(), code.to_owned()));
        Ok(())
    }
}

/// Always fails, simulating an SMTP outage.
pub struct FailingMailer;

#[async_trait]
impl MailSender for FailingMailer {
    async fn send_reset_code(&self, _to: &str, _code: &str) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("smtp relay unreachable"))
    }
}

pub fn store() -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::new())
}

pub fn directory(store: &Arc<InMemoryStore>, mailer: Arc<dyn MailSender>) -> UserDirectory {
    UserDirectory::new(store.clone(), store.clone(), mailer, 10)
}

pub fn listing_service(store: &Arc<InMemoryStore>) -> ListingService {
    ListingService::new(store.clone())
}

pub fn coordinator(store: &Arc<InMemoryStore>) -> ReservationCoordinator {
    ReservationCoordinator::new(store.clone(), store.clone(), store.clone())
}

/// Insert a user directly, bypassing registration. The password hash is a
/// placeholder; use `directory().register` when login matters.
pub async fn seed_user(store: &Arc<InMemoryStore>, role: UserRole, email: &str) -> User {
    let user = User {
        id: Uuid::new_v4(),
        email: email.to_owned(),
        password_hash: "unusable".to_owned(),
        role,
        name: "Test User".to_owned(),
        phone: "555-0100".to_owned(),
        address: "1 Test Street".to_owned(),
        is_active: true,
        created_at: Utc::now(),
    };
    UserRepository::insert(store.as_ref(), user).await.unwrap()
}

pub fn new_listing(expires_in: Duration) -> NewListing {
    NewListing {
        food_type: "Vegetable curry".to_owned(),
        quantity: "5 portions".to_owned(),
        expiry_time: Utc::now() + expires_in,
        location: Location {
            address: "12 Market Street".to_owned(),
            coordinates: [77.59, 12.97],
        },
        photo: "https://img.example/curry.jpeg".to_owned(),
    }
}

/// Create a listing through the service so creation invariants apply.
pub async fn seed_listing(
    service: &ListingService,
    owner: &User,
    expires_in: Duration,
) -> Listing {
    let listing = service.create(owner, new_listing(expires_in)).await.unwrap();
    assert_eq!(listing.status, ListingStatus::Available);
    listing
}

pub fn hours(n: i64) -> Duration {
    Duration::hours(n)
}

pub fn past(n_hours: i64) -> DateTime<Utc> {
    Utc::now() - Duration::hours(n_hours)
}
