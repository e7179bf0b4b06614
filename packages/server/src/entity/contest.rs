use common::ContestStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contest")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,
    pub image: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Entry fee in minor currency units.
    pub price: i64,
    /// Prize in minor currency units.
    pub prize_money: i64,
    #[sea_orm(column_type = "Text")]
    pub task_instruction: String,
    pub contest_type: String,
    pub deadline: DateTimeUtc,

    pub status: ContestStatus,
    /// Always equal to the number of `contest_participant` rows for this contest.
    pub participants_count: i32,

    #[sea_orm(has_many)]
    pub participants: HasMany<super::contest_participant::Entity>,

    #[sea_orm(has_many)]
    pub task_submissions: HasMany<super::task_submission::Entity>,

    // The winner record. All four columns are set together or not at all.
    pub winner_email: Option<String>,
    pub winner_position: Option<i32>,
    pub winner_reward: Option<i64>,
    pub winner_selected_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
