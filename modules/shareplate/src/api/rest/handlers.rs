//! REST handlers. Thin: extract, call the domain service, map to DTOs.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;
use base64::Engine as _;
use chrono::Utc;
use rand::Rng as _;
use uuid::Uuid;

use crate::domain::model::{PlatformStats, UserRole};
use crate::state::AppState;

use super::auth::{CurrentUser, auth_cookie, removal_cookie};
use super::dto::{
    ByListingsQuery, CreateListingRequest, ForgotPasswordRequest, ListingDto, LoginRequest,
    LoginResponse, MessageResponse, RegisterRequest, RegisterResponse, ReservationViewDto,
    ReserveRequest, ReserveResponse, ResetPasswordRequest, StatsDto, UpdateListingRequest,
    UploadImageRequest, UploadImageResponse, UserDto, ValidateOtpRequest,
};
use super::error::ApiError;
use super::extract::Json;

const RESTAURANT: &[UserRole] = &[UserRole::Restaurant];
const RESTAURANT_OR_ADMIN: &[UserRole] = &[UserRole::Restaurant, UserRole::Admin];

fn internal(err: anyhow::Error) -> ApiError {
    tracing::error!(error = %err, "internal failure");
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
}

// -------------------------------------------------------------------------
// Auth
// -------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Duplicate email or missing fields"),
    )
)]
#[tracing::instrument(skip(state, req), fields(email = %req.email))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<RegisterResponse>), ApiError> {
    let user = state.users.register(req.into()).await?;
    let token = state.signer.issue(user.id, user.role).map_err(internal)?;
    Ok((
        StatusCode::CREATED,
        jar.add(auth_cookie(token)),
        Json(RegisterResponse {
            message: "User registered successfully".to_owned(),
            user: user.into(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip(state, req), fields(email = %req.email))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let user = state.users.login(&req.email, &req.password).await?;
    let token = state.signer.issue(user.id, user.role).map_err(internal)?;
    Ok((
        jar.add(auth_cookie(token.clone())),
        Json(LoginResponse {
            message: "Login successful".to_owned(),
            user: user.into(),
            token,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses((status = 200, description = "Session cookie cleared"))
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    (
        jar.add(removal_cookie()),
        Json(MessageResponse::new("Logged out successfully")),
    )
}

#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    tag = "auth",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset code sent"),
        (status = 404, description = "No account for this email"),
    )
)]
#[tracing::instrument(skip(state, req), fields(email = %req.email))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.users.request_password_reset(&req.email).await?;
    Ok(Json(MessageResponse::new(
        "OTP sent to your email. Please check your inbox and spam folder.",
    )))
}

#[utoipa::path(
    post,
    path = "/api/auth/validate-otp",
    tag = "auth",
    request_body = ValidateOtpRequest,
    responses(
        (status = 200, description = "Code accepted and consumed"),
        (status = 400, description = "Invalid or expired code"),
    )
)]
#[tracing::instrument(skip(state, req), fields(email = %req.email))]
pub async fn validate_otp(
    State(state): State<AppState>,
    Json(req): Json<ValidateOtpRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.users.validate_otp(&req.email, &req.otp).await?;
    Ok(Json(MessageResponse::new("OTP validated successfully")))
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    tag = "auth",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password replaced"),
        (status = 404, description = "No account for this email"),
    )
)]
#[tracing::instrument(skip(state, req), fields(email = %req.email))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .users
        .reset_password(&req.email, &req.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password reset successfully")))
}

#[utoipa::path(
    get,
    path = "/api/auth/users",
    tag = "auth",
    responses((status = 200, body = [UserDto]))
)]
pub async fn list_users(
    State(state): State<AppState>,
    _current: CurrentUser,
) -> Result<Json<Vec<UserDto>>, ApiError> {
    let users = state.users.list_users().await?;
    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/auth/user/{id}",
    tag = "auth",
    params(("id" = Uuid, Path, description = "User id")),
    responses((status = 200, body = UserDto), (status = 404))
)]
pub async fn get_user(
    State(state): State<AppState>,
    _current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserDto>, ApiError> {
    let user = state.users.get_user(id).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    put,
    path = "/api/auth/users/{id}/deactivate",
    tag = "auth",
    params(("id" = Uuid, Path, description = "User id")),
    responses((status = 200), (status = 404))
)]
#[tracing::instrument(skip(state))]
pub async fn deactivate_user(
    State(state): State<AppState>,
    _current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.users.deactivate(id).await?;
    Ok(Json(MessageResponse::new("User deactivated successfully")))
}

// -------------------------------------------------------------------------
// Listings
// -------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/food-listings",
    tag = "listings",
    request_body = CreateListingRequest,
    responses(
        (status = 201, description = "Listing created", body = ListingDto),
        (status = 400, description = "Missing fields"),
    )
)]
#[tracing::instrument(skip(state, current, req), fields(owner = %current.0.id))]
pub async fn create_listing(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(req): Json<CreateListingRequest>,
) -> Result<(StatusCode, Json<ListingDto>), ApiError> {
    current.require_role(RESTAURANT)?;
    let listing = state.listings.create(&current.0, req.into()).await?;
    Ok((StatusCode::CREATED, Json(listing.into())))
}

#[utoipa::path(
    get,
    path = "/api/food-listings",
    tag = "listings",
    responses((status = 200, body = [ListingDto]))
)]
pub async fn list_listings(
    State(state): State<AppState>,
) -> Result<Json<Vec<ListingDto>>, ApiError> {
    let listings = state.listings.list_all().await?;
    Ok(Json(listings.into_iter().map(ListingDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/food-listings/available",
    tag = "listings",
    responses((status = 200, body = [ListingDto]))
)]
pub async fn list_available_listings(
    State(state): State<AppState>,
) -> Result<Json<Vec<ListingDto>>, ApiError> {
    let listings = state.listings.list_available().await?;
    Ok(Json(listings.into_iter().map(ListingDto::from).collect()))
}

/// The caller's own non-expired listings.
#[utoipa::path(
    get,
    path = "/api/food-listings/restaurant",
    tag = "listings",
    responses((status = 200, body = [ListingDto]))
)]
pub async fn list_own_listings(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<ListingDto>>, ApiError> {
    current.require_role(RESTAURANT)?;
    let listings = state.listings.list_for_restaurant(&current.0).await?;
    Ok(Json(listings.into_iter().map(ListingDto::from).collect()))
}

#[utoipa::path(
    put,
    path = "/api/food-listings/{id}",
    tag = "listings",
    params(("id" = Uuid, Path, description = "Listing id")),
    request_body = UpdateListingRequest,
    responses((status = 200, body = ListingDto), (status = 403), (status = 404))
)]
#[tracing::instrument(skip(state, current, req), fields(actor = %current.0.id))]
pub async fn update_listing(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateListingRequest>,
) -> Result<Json<ListingDto>, ApiError> {
    current.require_role(RESTAURANT_OR_ADMIN)?;
    let listing = state.listings.update(&current.0, id, req.into()).await?;
    Ok(Json(listing.into()))
}

#[utoipa::path(
    delete,
    path = "/api/food-listings/{id}",
    tag = "listings",
    params(("id" = Uuid, Path, description = "Listing id")),
    responses((status = 200), (status = 403), (status = 404))
)]
#[tracing::instrument(skip(state, current), fields(actor = %current.0.id))]
pub async fn delete_listing(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    current.require_role(RESTAURANT_OR_ADMIN)?;
    state.listings.delete(&current.0, id).await?;
    Ok(Json(MessageResponse::new("Listing deleted")))
}

// -------------------------------------------------------------------------
// Reservations
// -------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/reservations",
    tag = "reservations",
    request_body = ReserveRequest,
    responses(
        (status = 200, description = "Listing claimed", body = ReserveResponse),
        (status = 400, description = "Listing not available"),
    )
)]
#[tracing::instrument(skip(state))]
pub async fn create_reservation(
    State(state): State<AppState>,
    Json(req): Json<ReserveRequest>,
) -> Result<Json<ReserveResponse>, ApiError> {
    let reservation = state
        .reservations
        .reserve(req.listing_id, req.user_id)
        .await?;
    Ok(Json(ReserveResponse {
        message: "Reservation successful".to_owned(),
        reservation_id: reservation.id,
    }))
}

#[utoipa::path(
    get,
    path = "/api/reservations/user/{userId}",
    tag = "reservations",
    params(("userId" = Uuid, Path, description = "Consumer id")),
    responses((status = 200, body = [ReservationViewDto]))
)]
pub async fn reservations_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<ReservationViewDto>>, ApiError> {
    let views = state.reservations.list_for_user(user_id).await?;
    Ok(Json(
        views.into_iter().map(ReservationViewDto::from).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/reservations",
    tag = "reservations",
    responses((status = 200, body = [ReservationViewDto]))
)]
pub async fn list_reservations(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReservationViewDto>>, ApiError> {
    let views = state.reservations.list_all().await?;
    Ok(Json(
        views.into_iter().map(ReservationViewDto::from).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/reservations/by-listings",
    tag = "reservations",
    params(("listingIds" = String, Query, description = "Comma-separated listing ids")),
    responses((status = 200, body = [ReservationViewDto]), (status = 400))
)]
pub async fn reservations_by_listings(
    State(state): State<AppState>,
    Query(query): Query<ByListingsQuery>,
) -> Result<Json<Vec<ReservationViewDto>>, ApiError> {
    let ids = query
        .listing_ids
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().parse::<Uuid>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ApiError::bad_request("Invalid listing id"))?;

    let views = state.reservations.list_for_listings(&ids).await?;
    Ok(Json(
        views.into_iter().map(ReservationViewDto::from).collect(),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/reservations/{id}",
    tag = "reservations",
    params(("id" = Uuid, Path, description = "Reservation id")),
    responses((status = 200), (status = 404))
)]
#[tracing::instrument(skip(state))]
pub async fn cancel_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.reservations.cancel(id).await?;
    Ok(Json(MessageResponse::new("Reservation cancelled")))
}

#[utoipa::path(
    put,
    path = "/api/reservations/{id}/pickup",
    tag = "reservations",
    params(("id" = Uuid, Path, description = "Reservation id")),
    responses((status = 200), (status = 400), (status = 404))
)]
#[tracing::instrument(skip(state))]
pub async fn confirm_pickup(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.reservations.confirm_pickup(id).await?;
    Ok(Json(MessageResponse::new("Reservation marked as picked up")))
}

// -------------------------------------------------------------------------
// Stats and uploads
// -------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "stats",
    responses((status = 200, body = StatsDto))
)]
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsDto>, ApiError> {
    let (total_users, total_listings, total_reservations) = tokio::try_join!(
        state.users.count(),
        state.listings.count(),
        state.reservations.count(),
    )?;
    Ok(Json(
        PlatformStats {
            total_users,
            total_listings,
            total_reservations,
        }
        .into(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/upload-image",
    tag = "uploads",
    request_body = UploadImageRequest,
    responses(
        (status = 200, description = "Image stored", body = UploadImageResponse),
        (status = 400, description = "Payload is not valid base64"),
    )
)]
#[tracing::instrument(skip(state, req))]
pub async fn upload_image(
    State(state): State<AppState>,
    Json(req): Json<UploadImageRequest>,
) -> Result<Json<UploadImageResponse>, ApiError> {
    // Accept both a bare base64 string and a full data URL.
    let payload = match req.file.split_once("base64,") {
        Some((_, rest)) => rest,
        None => req.file.as_str(),
    };
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|_| ApiError::bad_request("Invalid image payload"))?;
    if bytes.is_empty() {
        return Err(ApiError::bad_request("Invalid image payload"));
    }

    let key = format!(
        "listings/{}_{}.jpeg",
        Utc::now().timestamp_millis(),
        random_suffix()
    );
    let image_url = state
        .images
        .store_jpeg(&key, bytes)
        .await
        .map_err(internal)?;

    Ok(Json(UploadImageResponse { image_url }))
}

fn random_suffix() -> String {
    let mut rng = rand::rng();
    (0..8)
        .map(|_| char::from(rng.sample(rand::distr::Alphanumeric)))
        .collect()
}
