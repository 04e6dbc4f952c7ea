use super::{
    ApiError, DynIdentityProvider,
    types::{ErrorDetail, TokenResponse, UserCredentials},
};
use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
};
use tracing::{debug, instrument};

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[utoipa::path(
    post,
    path= "/login",
    request_body = UserCredentials,
    responses (
        (status = 200, description = "Login successful", body = TokenResponse, content_type = "application/json"),
        (status = 400, description = "Invalid request or credentials", body = ErrorDetail),
    ),
    tag= "auth"
)]
// axum handler for login
#[instrument(skip(provider, payload))]
pub async fn login(
    provider: Extension<DynIdentityProvider>,
    payload: Result<Json<UserCredentials>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(user) = payload?;

    debug!("login: {}", user.email.as_str());

    provider
        .sign_in_with_password(&user.into())
        .await
        .map(|session| Json(TokenResponse::bearer(session)))
        .map_err(|e| {
            debug!("Login rejected by provider: {:?}", e);

            ApiError::bad_request(e.message().unwrap_or(INVALID_CREDENTIALS))
        })
}
