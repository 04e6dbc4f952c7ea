use super::{
    ApiError, DynIdentityProvider,
    types::{ErrorDetail, TokenResponse, UserCredentials},
};
use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
};
use tracing::{debug, instrument, warn};

/// Returned when the provider created the user but issued no session.
pub const EMAIL_CONFIRMATION_REQUIRED: &str = "Email confirmation is required. Please disable it in your identity provider settings for this flow to work.";

#[utoipa::path(
    post,
    path= "/signup",
    request_body = UserCredentials,
    responses (
        (status = 200, description = "User created and signed in", body = TokenResponse, content_type = "application/json"),
        (status = 400, description = "Invalid request, provider rejected the signup, or email confirmation is enabled", body = ErrorDetail),
    ),
    tag= "auth"
)]
// axum handler for signup
#[instrument(skip(provider, payload))]
pub async fn signup(
    provider: Extension<DynIdentityProvider>,
    payload: Result<Json<UserCredentials>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(user) = payload?;

    debug!("signup: {}", user.email.as_str());

    match provider.sign_up(&user.into()).await {
        Ok(Some(session)) => Ok(Json(TokenResponse::bearer(session))),

        Ok(None) => {
            warn!("Signup returned no session, email confirmation is enabled");

            Err(ApiError::bad_request(EMAIL_CONFIRMATION_REQUIRED))
        }

        Err(e) => {
            debug!("Signup rejected by provider: {:?}", e);

            Err(ApiError::bad_request(e.to_string()))
        }
    }
}
