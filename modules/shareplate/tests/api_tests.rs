//! HTTP surface tests against the full router with in-memory backends.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use shareplate::domain::{ListingService, ReservationCoordinator, UserDirectory};
use shareplate::infra::object_store::InMemoryImageStore;
use shareplate::infra::storage::InMemoryStore;
use shareplate::security::TokenSigner;
use shareplate::state::AppState;

use common::RecordingMailer;

const SECRET: &str = "test-secret";

fn app() -> Router {
    let store = Arc::new(InMemoryStore::new());
    let users = Arc::new(UserDirectory::new(
        store.clone(),
        store.clone(),
        Arc::new(RecordingMailer::default()),
        10,
    ));
    let listings = Arc::new(ListingService::new(store.clone()));
    let reservations = Arc::new(ReservationCoordinator::new(
        store.clone(),
        store.clone(),
        store.clone(),
    ));

    shareplate::api::rest::router(AppState {
        users,
        listings,
        reservations,
        images: Arc::new(InMemoryImageStore::new()),
        signer: Arc::new(TokenSigner::new(SECRET, 24)),
    })
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    builder
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn register_body(email: &str, user_type: &str) -> Value {
    json!({
        "email": email,
        "password": "s3cret-pass",
        "userType": user_type,
        "name": "Pat Example",
        "phone": "555-0101",
        "address": "2 Example Lane",
    })
}

/// Register an account and return (user id, bearer token).
async fn register(app: &Router, email: &str, user_type: &str) -> (String, String) {
    let response = app
        .clone()
        .oneshot(post_json("/api/auth/register", register_body(email, user_type)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let login = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": email, "password": "s3cret-pass" }),
        ))
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::OK);
    assert!(login.headers().contains_key(header::SET_COOKIE));

    let body = body_json(login).await;
    (
        body["user"]["id"].as_str().unwrap().to_owned(),
        body["token"].as_str().unwrap().to_owned(),
    )
}

#[tokio::test]
async fn register_sets_cookie_and_duplicate_is_rejected() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            register_body("pat@example.com", "individual"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));

    let duplicate = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            register_body("pat@example.com", "individual"),
        ))
        .await
        .unwrap();
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(duplicate).await["message"],
        "User already exists"
    );
}

#[tokio::test]
async fn login_failures_are_bad_requests() {
    let app = app();
    register(&app, "pat@example.com", "individual").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": "pat@example.com", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Invalid credentials");
}

#[tokio::test]
async fn protected_routes_report_the_exact_auth_failure() {
    let app = app();

    // No credential at all.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/users")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["message"],
        "No token, authorization denied"
    );

    // Garbage credential.
    let response = app
        .clone()
        .oneshot(authed("GET", "/api/auth/users", "not.a.jwt", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "Invalid token");

    // Expired credential, signed with the right secret.
    let expired = TokenSigner::new(SECRET, -1)
        .issue(uuid::Uuid::new_v4(), shareplate::domain::model::UserRole::Individual)
        .unwrap();
    let response = app
        .clone()
        .oneshot(authed("GET", "/api/auth/users", &expired, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "Token expired");

    // Valid token for a subject that does not exist.
    let ghost = TokenSigner::new(SECRET, 24)
        .issue(uuid::Uuid::new_v4(), shareplate::domain::model::UserRole::Individual)
        .unwrap();
    let response = app
        .clone()
        .oneshot(authed("GET", "/api/auth/users", &ghost, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "User not found");
}

#[tokio::test]
async fn missing_body_fields_use_the_error_envelope() {
    let app = app();

    // No userType.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            json!({
                "email": "pat@example.com",
                "password": "s3cret-pass",
                "name": "Pat Example",
                "phone": "555-0101",
                "address": "2 Example Lane",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "All fields are required");
    assert!(body["error"].as_str().unwrap().contains("userType"));

    let response = app
        .clone()
        .oneshot(post_json("/api/reservations", json!({ "listingId": null })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "All fields are required"
    );
}

#[tokio::test]
async fn reservations_do_not_require_credentials() {
    let app = app();

    // Reserving an unknown listing without any token reaches the domain and
    // fails on availability, not on auth.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/reservations",
            json!({
                "listingId": uuid::Uuid::new_v4(),
                "userId": uuid::Uuid::new_v4(),
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Listing not available");

    let listed = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/reservations")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(listed.status(), StatusCode::OK);
    assert_eq!(body_json(listed).await.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn storage_failure_during_auth_is_a_server_error() {
    use shareplate::domain::model::User;
    use shareplate::domain::repo::UserRepository;

    struct OfflineUserRepo;

    #[async_trait::async_trait]
    impl UserRepository for OfflineUserRepo {
        async fn insert(&self, _user: User) -> anyhow::Result<User> {
            anyhow::bail!("users table offline")
        }

        async fn find_by_id(&self, _id: uuid::Uuid) -> anyhow::Result<Option<User>> {
            anyhow::bail!("users table offline")
        }

        async fn find_by_email(&self, _email: &str) -> anyhow::Result<Option<User>> {
            anyhow::bail!("users table offline")
        }

        async fn find_many(&self, _ids: &[uuid::Uuid]) -> anyhow::Result<Vec<User>> {
            anyhow::bail!("users table offline")
        }

        async fn list_all(&self) -> anyhow::Result<Vec<User>> {
            anyhow::bail!("users table offline")
        }

        async fn set_password_hash(
            &self,
            _id: uuid::Uuid,
            _password_hash: String,
        ) -> anyhow::Result<()> {
            anyhow::bail!("users table offline")
        }

        async fn set_active(&self, _id: uuid::Uuid, _active: bool) -> anyhow::Result<bool> {
            anyhow::bail!("users table offline")
        }

        async fn count(&self) -> anyhow::Result<u64> {
            anyhow::bail!("users table offline")
        }
    }

    let store = Arc::new(InMemoryStore::new());
    let users = Arc::new(UserDirectory::new(
        Arc::new(OfflineUserRepo),
        store.clone(),
        Arc::new(RecordingMailer::default()),
        10,
    ));
    let listings = Arc::new(ListingService::new(store.clone()));
    let reservations = Arc::new(ReservationCoordinator::new(
        store.clone(),
        store.clone(),
        store.clone(),
    ));
    let app = shareplate::api::rest::router(AppState {
        users,
        listings,
        reservations,
        images: Arc::new(InMemoryImageStore::new()),
        signer: Arc::new(TokenSigner::new(SECRET, 24)),
    });

    // The token is valid; only the subject lookup fails.
    let token = TokenSigner::new(SECRET, 24)
        .issue(uuid::Uuid::new_v4(), shareplate::domain::model::UserRole::Individual)
        .unwrap();
    let response = app
        .oneshot(authed("GET", "/api/auth/users", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["message"], "Something went wrong");
}

#[tokio::test]
async fn consumers_cannot_create_listings() {
    let app = app();
    let (_, token) = register(&app, "cons@example.com", "individual").await;

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/food-listings",
            &token,
            Some(json!({
                "foodType": "Bread",
                "quantity": "10 loaves",
                "expiryTime": "2030-01-01T00:00:00Z",
                "location": { "address": "12 Market Street", "coordinates": [77.59, 12.97] },
                "photo": "https://img.example/bread.jpeg",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["message"], "Access denied");
}

#[tokio::test]
async fn full_listing_and_reservation_flow() {
    let app = app();
    let (_, restaurant_token) = register(&app, "rest@example.com", "restaurant").await;
    let (consumer_id, consumer_token) = register(&app, "cons@example.com", "individual").await;

    let created = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/food-listings",
            &restaurant_token,
            Some(json!({
                "foodType": "Bread",
                "quantity": "10 loaves",
                "expiryTime": "2030-01-01T00:00:00Z",
                "location": { "address": "12 Market Street", "coordinates": [77.59, 12.97] },
                "photo": "https://img.example/bread.jpeg",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let listing = body_json(created).await;
    assert_eq!(listing["status"], "available");
    let listing_id = listing["id"].as_str().unwrap().to_owned();

    // Anyone can browse without credentials.
    let browse = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/food-listings/available")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(browse.status(), StatusCode::OK);
    assert_eq!(body_json(browse).await.as_array().unwrap().len(), 1);

    let reserved = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/reservations",
            &consumer_token,
            Some(json!({ "listingId": listing_id, "userId": consumer_id })),
        ))
        .await
        .unwrap();
    assert_eq!(reserved.status(), StatusCode::OK);
    let body = body_json(reserved).await;
    assert_eq!(body["message"], "Reservation successful");
    let reservation_id = body["reservationId"].as_str().unwrap().to_owned();

    // The listing is now claimed.
    let conflict = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/reservations",
            &consumer_token,
            Some(json!({ "listingId": listing_id, "userId": consumer_id })),
        ))
        .await
        .unwrap();
    assert_eq!(conflict.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(conflict).await["message"], "Listing not available");

    let picked_up = app
        .clone()
        .oneshot(authed(
            "PUT",
            &format!("/api/reservations/{reservation_id}/pickup"),
            &consumer_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(picked_up.status(), StatusCode::OK);
    assert_eq!(
        body_json(picked_up).await["message"],
        "Reservation marked as picked up"
    );

    let again = app
        .clone()
        .oneshot(authed(
            "PUT",
            &format!("/api/reservations/{reservation_id}/pickup"),
            &consumer_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_accepts_data_urls() {
    let app = app();
    let (_, token) = register(&app, "rest@example.com", "restaurant").await;

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/upload-image",
            &token,
            Some(json!({ "file": "data:image/jpeg;base64,aGVsbG8=" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let url = body_json(response).await["imageUrl"]
        .as_str()
        .unwrap()
        .to_owned();
    assert!(url.contains("listings/"));
    assert!(url.ends_with(".jpeg"));

    let bad = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/upload-image",
            &token,
            Some(json!({ "file": "%%% not base64 %%%" })),
        ))
        .await
        .unwrap();
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stats_and_openapi_are_public() {
    let app = app();
    register(&app, "pat@example.com", "individual").await;

    let stats = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/stats")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(stats.status(), StatusCode::OK);
    let body = body_json(stats).await;
    assert_eq!(body["totalUsers"], 1);
    assert_eq!(body["totalListings"], 0);
    assert_eq!(body["totalReservations"], 0);

    let docs = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(docs.status(), StatusCode::OK);
    let doc = body_json(docs).await;
    assert!(doc["paths"].get("/api/reservations").is_some());
}
