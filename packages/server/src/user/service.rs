use std::time::Duration;

use chrono::Utc;
use common::UserRole;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::info;
use uuid::Uuid;

use crate::entity::user;
use crate::error::AppError;
use crate::utils::timeout::bounded;

/// Profile data captured on first sign-in. `email` must already be normalized.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub photo_url: Option<String>,
    pub address: Option<String>,
}

/// Profile fields to change. The outer `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub photo_url: Option<Option<String>>,
    pub address: Option<Option<String>>,
}

pub struct UserService<'a> {
    db: &'a DatabaseConnection,
    op_timeout: Duration,
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".into())
}

impl<'a> UserService<'a> {
    pub fn new(db: &'a DatabaseConnection, op_timeout: Duration) -> Self {
        Self { db, op_timeout }
    }

    /// Create the user on first sign-in.
    ///
    /// Returns the stored user and whether it was created by this call. A
    /// second sign-in with the same email returns the existing record.
    pub async fn create(&self, new: NewUser) -> Result<(user::Model, bool), AppError> {
        bounded(self.op_timeout, "create user", async {
            let now = Utc::now();
            let model = user::ActiveModel {
                id: Set(Uuid::now_v7()),
                email: Set(new.email.clone()),
                role: Set(UserRole::User),
                name: Set(new.name),
                photo_url: Set(new.photo_url),
                address: Set(new.address),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };

            let result = user::Entity::insert(model)
                .on_conflict(
                    OnConflict::column(user::Column::Email)
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(self.db)
                .await;

            let created = match result {
                Ok(rows) => rows > 0,
                Err(DbErr::RecordNotInserted) => false,
                Err(e) => return Err(e.into()),
            };

            let stored = user::Entity::find()
                .filter(user::Column::Email.eq(&new.email))
                .one(self.db)
                .await?
                .ok_or_else(user_not_found)?;

            if created {
                info!(user_id = %stored.id, "User created");
            }
            Ok((stored, created))
        })
        .await
    }

    /// All users, newest first.
    pub async fn list(&self) -> Result<Vec<user::Model>, AppError> {
        bounded(self.op_timeout, "list users", async {
            Ok(user::Entity::find()
                .order_by_desc(user::Column::CreatedAt)
                .all(self.db)
                .await?)
        })
        .await
    }

    pub async fn set_role(&self, id: Uuid, role: UserRole) -> Result<user::Model, AppError> {
        bounded(self.op_timeout, "set user role", async {
            let existing = user::Entity::find_by_id(id)
                .one(self.db)
                .await?
                .ok_or_else(user_not_found)?;

            let mut active: user::ActiveModel = existing.into();
            active.role = Set(role);
            active.updated_at = Set(Utc::now());
            let model = active.update(self.db).await?;

            info!(user_id = %id, role = %role, "User role changed");
            Ok(model)
        })
        .await
    }

    pub async fn get_by_email(&self, email: &str) -> Result<user::Model, AppError> {
        bounded(self.op_timeout, "get user by email", async {
            user::Entity::find()
                .filter(user::Column::Email.eq(email))
                .one(self.db)
                .await?
                .ok_or_else(user_not_found)
        })
        .await
    }

    /// Apply a profile patch to the user with `email`. An empty patch returns
    /// the user unchanged.
    pub async fn update_profile(
        &self,
        email: &str,
        patch: ProfilePatch,
    ) -> Result<user::Model, AppError> {
        bounded(self.op_timeout, "update user profile", async {
            let existing = user::Entity::find()
                .filter(user::Column::Email.eq(email))
                .one(self.db)
                .await?
                .ok_or_else(user_not_found)?;

            if patch == ProfilePatch::default() {
                return Ok(existing);
            }

            let mut active: user::ActiveModel = existing.into();
            if let Some(name) = patch.name {
                active.name = Set(name);
            }
            if let Some(photo_url) = patch.photo_url {
                active.photo_url = Set(photo_url);
            }
            if let Some(address) = patch.address {
                active.address = Set(address);
            }
            active.updated_at = Set(Utc::now());

            Ok(active.update(self.db).await?)
        })
        .await
    }
}
