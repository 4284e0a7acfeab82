//! Expiry sweep tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use shareplate::domain::model::UserRole;
use shareplate::sweeper::ExpirySweeper;

use common::{coordinator, hours, listing_service, seed_listing, seed_user, store};

#[tokio::test]
async fn sweep_deletes_only_expired_listings() {
    let store = store();
    let service = listing_service(&store);
    let owner = seed_user(&store, UserRole::Restaurant, "rest@example.com").await;

    seed_listing(&service, &owner, hours(-3)).await;
    seed_listing(&service, &owner, hours(-1)).await;
    let fresh = seed_listing(&service, &owner, hours(1)).await;

    let deleted = service.sweep_expired(Utc::now()).await.unwrap();
    assert_eq!(deleted, 2);

    let remaining = service.list_all().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, fresh.id);
}

#[tokio::test]
async fn sweep_is_idempotent() {
    let store = store();
    let service = listing_service(&store);
    let owner = seed_user(&store, UserRole::Restaurant, "rest@example.com").await;

    seed_listing(&service, &owner, hours(-1)).await;

    assert_eq!(service.sweep_expired(Utc::now()).await.unwrap(), 1);
    assert_eq!(service.sweep_expired(Utc::now()).await.unwrap(), 0);
    assert_eq!(service.sweep_expired(Utc::now()).await.unwrap(), 0);
}

#[tokio::test]
async fn sweep_leaves_reservations_behind() {
    let store = store();
    let service = listing_service(&store);
    let coordinator = coordinator(&store);
    let owner = seed_user(&store, UserRole::Restaurant, "rest@example.com").await;
    let consumer = seed_user(&store, UserRole::Individual, "cons@example.com").await;

    let listing = seed_listing(&service, &owner, hours(-1)).await;
    let reservation = coordinator.reserve(listing.id, consumer.id).await.unwrap();

    service.sweep_expired(Utc::now()).await.unwrap();
    assert_eq!(service.count().await.unwrap(), 0);

    // The orphaned reservation survives and still reads back.
    let views = coordinator.list_for_user(consumer.id).await.unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].reservation.id, reservation.id);
    assert!(views[0].listing.is_none());
}

#[tokio::test]
async fn spawned_sweeper_runs_and_shuts_down() {
    let store = store();
    let service = Arc::new(listing_service(&store));
    let owner = seed_user(&store, UserRole::Restaurant, "rest@example.com").await;

    seed_listing(service.as_ref(), &owner, hours(-1)).await;
    seed_listing(service.as_ref(), &owner, hours(1)).await;

    let handle = ExpirySweeper::new(service.clone(), Duration::from_millis(20)).spawn();

    // Give the loop a few ticks.
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.shutdown().await;

    assert_eq!(service.count().await.unwrap(), 1);
}
