use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::AuthedUser;
use super::validation::{validate_password, validate_username};
use super::{ApiError, ApiResponse, AppState, UserDto};
use crate::models::user::Role;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    /// Defaults to "user" when absent.
    pub role: Option<String>,
}

/// GET /users (admin)
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    authed.require_admin()?;

    let users = state.store().list_users().await?;

    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserDto::from).collect(),
    )))
}

/// POST /users (admin)
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), ApiError> {
    authed.require_admin()?;

    let username = validate_username(&payload.username)?;
    validate_password(&payload.password)?;

    let role = match payload.role.as_deref() {
        None => Role::User,
        Some(raw) => {
            Role::parse(raw).ok_or_else(|| ApiError::validation(format!("Unknown role: {raw}")))?
        }
    };

    let user = state
        .store()
        .create_user(username, &payload.password, role, &state.config().security)
        .await?;

    tracing::info!("User {} added to roster by {}", user.username, authed.username);

    Ok((StatusCode::CREATED, Json(ApiResponse::success(user.into()))))
}

/// DELETE /users/{username} (admin)
/// Administrator accounts cannot be removed over the API.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
    Path(username): Path<String>,
) -> Result<StatusCode, ApiError> {
    authed.require_admin()?;

    let target = state
        .store()
        .get_user_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::not_found("User", &username))?;

    if target.role.is_admin() {
        return Err(ApiError::validation(
            "Administrator accounts cannot be deleted",
        ));
    }

    state.store().delete_user(&username).await?;

    tracing::info!("User {} removed from roster by {}", username, authed.username);

    Ok(StatusCode::NO_CONTENT)
}
