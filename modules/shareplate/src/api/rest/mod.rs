//! REST API: DTOs, handlers, routes, authentication, error mapping.

pub mod auth;
pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;

use utoipa::OpenApi;

pub use error::ApiError;
pub use routes::router;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SharePlate API",
        description = "Food-donation marketplace: restaurants list surplus food, consumers reserve and pick it up."
    ),
    paths(
        handlers::register,
        handlers::login,
        handlers::logout,
        handlers::forgot_password,
        handlers::validate_otp,
        handlers::reset_password,
        handlers::list_users,
        handlers::get_user,
        handlers::deactivate_user,
        handlers::create_listing,
        handlers::list_listings,
        handlers::list_available_listings,
        handlers::list_own_listings,
        handlers::update_listing,
        handlers::delete_listing,
        handlers::create_reservation,
        handlers::list_reservations,
        handlers::reservations_by_user,
        handlers::reservations_by_listings,
        handlers::cancel_reservation,
        handlers::confirm_pickup,
        handlers::get_stats,
        handlers::upload_image,
    ),
    components(schemas(
        dto::RegisterRequest,
        dto::RegisterResponse,
        dto::LoginRequest,
        dto::LoginResponse,
        dto::MessageResponse,
        dto::ForgotPasswordRequest,
        dto::ValidateOtpRequest,
        dto::ResetPasswordRequest,
        dto::UserDto,
        dto::LocationDto,
        dto::CreateListingRequest,
        dto::UpdateListingRequest,
        dto::ListingDto,
        dto::ReserveRequest,
        dto::ReserveResponse,
        dto::ReservationViewDto,
        dto::StatsDto,
        dto::UploadImageRequest,
        dto::UploadImageResponse,
    ))
)]
struct ApiDoc;

/// The generated OpenAPI document.
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
