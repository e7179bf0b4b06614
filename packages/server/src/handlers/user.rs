use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::shared::{normalize_email, parse_id};
use crate::models::user::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    operation_id = "createUser",
    summary = "Create a user on first sign-in",
    description = "Creates the user with role `user`. If the email is already known the stored user is returned with 200.",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 200, description = "User already existed", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let new = validate_create_user(payload)?;
    let (user, created) = state.users().create(new).await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(UserResponse::from(user))))
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    operation_id = "listUsers",
    summary = "List all users",
    responses(
        (status = 200, description = "All users, newest first", body = Vec<UserResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = state.users().list().await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = "Users",
    operation_id = "updateUserRole",
    summary = "Change a user's role",
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = UserResponse),
        (status = 400, description = "Unknown role or malformed id (VALIDATION_ERROR, INVALID_ID)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(role = %payload.role))]
pub async fn update_user_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateRoleRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let id = parse_id(&id)?;
    let role = parse_role(&payload)?;
    let user = state.users().set_role(id, role).await?;

    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    get,
    path = "/users/profile",
    tag = "Users",
    operation_id = "getUserProfile",
    summary = "Fetch a user by email",
    params(ProfileQuery),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 400, description = "Blank or malformed email (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_user_profile(
    State(state): State<AppState>,
    Query(query): Query<ProfileQuery>,
) -> Result<Json<UserResponse>, AppError> {
    let email = normalize_email(&query.email, "email")?;
    let user = state.users().get_by_email(&email).await?;

    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    patch,
    path = "/users/profile/{email}",
    tag = "Users",
    operation_id = "updateUserProfile",
    summary = "Update profile fields",
    description = "Updates `name`, `photoURL` and `address` of the user identified by email. Role and email cannot be changed here.",
    params(("email" = String, Path, description = "User email")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn update_user_profile(
    State(state): State<AppState>,
    Path(email): Path<String>,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let email = normalize_email(&email, "email")?;
    let patch = validate_update_profile(payload)?;
    let user = state.users().update_profile(&email, patch).await?;

    Ok(Json(UserResponse::from(user)))
}
