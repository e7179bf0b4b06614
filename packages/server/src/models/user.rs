use chrono::{DateTime, Utc};
use common::UserRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::{double_option, normalize_email, validate_name};
use crate::entity::user;
use crate::error::AppError;
use crate::user::{NewUser, ProfilePatch};

/// Request body sent on sign-in.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "Alice")]
    pub name: String,
    #[serde(rename = "photoURL", default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateRoleRequest {
    /// `user` or `admin`.
    #[schema(example = "admin")]
    pub role: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ProfileQuery {
    #[serde(default)]
    #[param(example = "alice@example.com")]
    pub email: String,
}

/// Profile PATCH body. `photoURL` and `address` accept `null` to clear the value.
#[derive(Deserialize, Default, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    #[serde(rename = "photoURL", default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub photo_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub address: Option<Option<String>>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub name: String,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            email: m.email,
            role: m.role,
            name: m.name,
            photo_url: m.photo_url,
            address: m.address,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Blank optional strings are stored as NULL.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn validate_create_user(req: CreateUserRequest) -> Result<NewUser, AppError> {
    let email = normalize_email(&req.email, "email")?;
    validate_name(&req.name)?;
    Ok(NewUser {
        email,
        name: req.name.trim().to_string(),
        photo_url: non_blank(req.photo_url),
        address: non_blank(req.address),
    })
}

pub fn parse_role(req: &UpdateRoleRequest) -> Result<UserRole, AppError> {
    req.role
        .trim()
        .parse::<UserRole>()
        .map_err(|e| AppError::Validation(e.to_string()))
}

pub fn validate_update_profile(req: UpdateProfileRequest) -> Result<ProfilePatch, AppError> {
    if let Some(ref name) = req.name {
        validate_name(name)?;
    }
    Ok(ProfilePatch {
        name: req.name.map(|n| n.trim().to_string()),
        photo_url: req.photo_url.map(non_blank),
        address: req.address.map(non_blank),
    })
}
