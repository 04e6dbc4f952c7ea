use super::{
    ApiError, DynIdentityProvider,
    types::{ErrorDetail, VerifyParams},
};
use axum::{
    Json,
    extract::{Extension, Query, rejection::QueryRejection},
};
use secrecy::SecretString;
use serde_json::Value;
use tracing::{debug, instrument};

#[utoipa::path(
    get,
    path= "/verify",
    params(VerifyParams),
    responses (
        (status = 200, description = "Token is valid, body is the provider user object", body = serde_json::Value, content_type = "application/json"),
        (status = 400, description = "Missing token", body = ErrorDetail),
        (status = 401, description = "Token rejected by the provider", body = ErrorDetail),
    ),
    tag= "auth"
)]
// axum handler for verify
#[instrument(skip(provider, params))]
pub async fn verify(
    provider: Extension<DynIdentityProvider>,
    params: Result<Query<VerifyParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(params) = params?;
    let token = SecretString::from(params.token);

    provider.get_user(&token).await.map(Json).map_err(|e| {
        debug!("Token rejected by provider: {:?}", e);

        ApiError::unauthorized(format!("Invalid token: {e}"))
    })
}
