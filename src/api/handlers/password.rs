//! Password reset flow.
//!
//! The reset state (token issuance, expiry, single use) is held by the identity
//! provider. `request_password_reset` answers identically whether or not the account
//! exists, and whether or not the provider call succeeded.

use super::{
    ApiError, DynIdentityProvider,
    types::{ErrorDetail, MessageResponse, PasswordResetRequest, PasswordUpdateRequest},
};
use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
};
use tracing::{debug, instrument, warn};

pub const PASSWORD_RESET_REQUESTED: &str =
    "If an account with this email exists, a password reset email has been sent.";

pub const PASSWORD_UPDATED: &str = "Password updated successfully.";

#[utoipa::path(
    post,
    path= "/request-password-reset",
    request_body = PasswordResetRequest,
    responses (
        (status = 200, description = "Reset email dispatched if the account exists", body = MessageResponse, content_type = "application/json"),
        (status = 400, description = "Invalid request", body = ErrorDetail),
    ),
    tag= "password"
)]
// axum handler for request password reset
#[instrument(skip(provider, payload))]
pub async fn request_password_reset(
    provider: Extension<DynIdentityProvider>,
    payload: Result<Json<PasswordResetRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload?;

    // Provider errors must not change the response, it would reveal account existence.
    if let Err(e) = provider
        .reset_password_for_email(request.email.as_str())
        .await
    {
        warn!(
            status = e.status,
            code = e.code.as_deref(),
            "Password reset request failed: {}",
            e
        );
    }

    Ok(Json(MessageResponse::new(PASSWORD_RESET_REQUESTED)))
}

#[utoipa::path(
    post,
    path= "/update-password",
    request_body = PasswordUpdateRequest,
    responses (
        (status = 200, description = "Password updated", body = MessageResponse, content_type = "application/json"),
        (status = 400, description = "Invalid request, or the reset token was rejected", body = ErrorDetail),
    ),
    tag= "password"
)]
// axum handler for update password
#[instrument(skip(provider, payload))]
pub async fn update_password(
    provider: Extension<DynIdentityProvider>,
    payload: Result<Json<PasswordUpdateRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload?;

    match provider
        .update_user_password(&request.token, &request.password)
        .await
    {
        Ok(()) => Ok(Json(MessageResponse::new(PASSWORD_UPDATED))),

        Err(e) => {
            debug!("Password update rejected by provider: {:?}", e);

            Err(ApiError::bad_request(e.to_string()))
        }
    }
}
