use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One user's entry for one task of a contest. The composite key is the
/// upsert target: a resubmission replaces `submission` in place.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "task_submission")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub contest_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub task_name: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_email: String,
    #[sea_orm(belongs_to, from = "contest_id", to = "id")]
    pub contest: Option<super::contest::Entity>,

    #[sea_orm(column_type = "Text")]
    pub submission: String,
    /// First submission time; fixes the entry's position within the task.
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
