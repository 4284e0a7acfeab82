//! Listing store tests: creation invariants, authorization, filtering.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use shareplate::domain::DomainError;
use shareplate::domain::model::{ListingPatch, ListingStatus, UserRole};
use uuid::Uuid;

use common::{hours, listing_service, new_listing, seed_listing, seed_user, store};

#[tokio::test]
async fn created_listings_are_always_available() {
    let store = store();
    let service = listing_service(&store);
    let owner = seed_user(&store, UserRole::Restaurant, "rest@example.com").await;

    let listing = service.create(&owner, new_listing(hours(2))).await.unwrap();
    assert_eq!(listing.status, ListingStatus::Available);
    assert_eq!(listing.reserved_by, None);
    assert_eq!(listing.restaurant_id, owner.id);
}

#[tokio::test]
async fn creation_rejects_blank_required_fields() {
    let store = store();
    let service = listing_service(&store);
    let owner = seed_user(&store, UserRole::Restaurant, "rest@example.com").await;

    let mut missing_food = new_listing(hours(2));
    missing_food.food_type = "  ".to_owned();
    let err = service.create(&owner, missing_food).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));

    let mut missing_photo = new_listing(hours(2));
    missing_photo.photo.clear();
    let err = service.create(&owner, missing_photo).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));

    let mut missing_address = new_listing(hours(2));
    missing_address.location.address.clear();
    let err = service.create(&owner, missing_address).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));

    assert_eq!(service.count().await.unwrap(), 0);
}

#[tokio::test]
async fn owner_listing_view_skips_expired() {
    let store = store();
    let service = listing_service(&store);
    let owner = seed_user(&store, UserRole::Restaurant, "rest@example.com").await;
    let other = seed_user(&store, UserRole::Restaurant, "other@example.com").await;

    let fresh = seed_listing(&service, &owner, hours(2)).await;
    seed_listing(&service, &owner, hours(-2)).await;
    seed_listing(&service, &other, hours(2)).await;

    let mine = service.list_for_restaurant(&owner).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, fresh.id);
}

#[tokio::test]
async fn update_patches_only_provided_fields() {
    let store = store();
    let service = listing_service(&store);
    let owner = seed_user(&store, UserRole::Restaurant, "rest@example.com").await;
    let listing = seed_listing(&service, &owner, hours(2)).await;

    let patch = ListingPatch {
        quantity: Some("2 portions".to_owned()),
        ..ListingPatch::default()
    };
    let updated = service.update(&owner, listing.id, patch).await.unwrap();
    assert_eq!(updated.quantity, "2 portions");
    assert_eq!(updated.food_type, listing.food_type);
    assert_eq!(updated.status, ListingStatus::Available);
}

#[tokio::test]
async fn only_owner_or_admin_may_mutate() {
    let store = store();
    let service = listing_service(&store);
    let owner = seed_user(&store, UserRole::Restaurant, "rest@example.com").await;
    let stranger = seed_user(&store, UserRole::Restaurant, "other@example.com").await;
    let admin = seed_user(&store, UserRole::Admin, "admin@example.com").await;
    let listing = seed_listing(&service, &owner, hours(2)).await;

    let err = service
        .update(&stranger, listing.id, ListingPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden));

    let err = service.delete(&stranger, listing.id).await.unwrap_err();
    assert!(matches!(err, DomainError::Forbidden));

    // Admin may delete someone else's listing.
    service.delete(&admin, listing.id).await.unwrap();
    assert_eq!(service.count().await.unwrap(), 0);
}

#[tokio::test]
async fn mutating_a_missing_listing_is_not_found() {
    let store = store();
    let service = listing_service(&store);
    let owner = seed_user(&store, UserRole::Restaurant, "rest@example.com").await;

    let err = service
        .update(&owner, Uuid::new_v4(), ListingPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::ListingNotFound { .. }));

    let err = service.delete(&owner, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, DomainError::ListingNotFound { .. }));
}

#[tokio::test]
async fn available_view_filters_by_status() {
    let store = store();
    let service = listing_service(&store);
    let coordinator = common::coordinator(&store);
    let owner = seed_user(&store, UserRole::Restaurant, "rest@example.com").await;
    let consumer = seed_user(&store, UserRole::Individual, "cons@example.com").await;

    let open = seed_listing(&service, &owner, hours(2)).await;
    let claimed = seed_listing(&service, &owner, hours(2)).await;
    coordinator.reserve(claimed.id, consumer.id).await.unwrap();

    let available = service.list_available().await.unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].id, open.id);

    assert_eq!(service.list_all().await.unwrap().len(), 2);
}
