use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::ContestStatus;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr, LockType, OnConflict, Query as SeaQuery};
use sea_orm::*;
use uuid::Uuid;

use crate::entity::{contest, contest_participant, task_submission};
use crate::models::shared::escape_like;

/// A contest row together with its participant and task rows.
#[derive(Debug, Clone)]
pub struct ContestDocument {
    pub contest: contest::Model,
    /// Ordered by registration time.
    pub participants: Vec<contest_participant::Model>,
    /// Ordered by task name, then first submission time.
    pub tasks: Vec<task_submission::Model>,
}

/// Metadata for a new contest. Lifecycle fields are always initialised by the repository.
#[derive(Debug, Clone)]
pub struct NewContest {
    pub name: String,
    pub image: String,
    pub description: String,
    pub price: i64,
    pub prize_money: i64,
    pub task_instruction: String,
    pub contest_type: String,
    pub deadline: DateTime<Utc>,
}

/// Metadata fields to overwrite. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContestPatch {
    pub name: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub prize_money: Option<i64>,
    pub task_instruction: Option<String>,
    pub contest_type: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
}

impl ContestPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContestFilter {
    /// Case-insensitive substring of `contest_type`.
    pub contest_type: Option<String>,
    pub status: Option<ContestStatus>,
}

#[derive(Debug, Clone)]
pub struct NewParticipant {
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
}

#[derive(Debug, Clone)]
pub struct WinnerRecord {
    pub user_email: String,
    pub position: i32,
    pub reward: i64,
}

pub struct ContestRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ContestRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Persist a new contest in the `pending` state with no participants.
    pub async fn create(&self, new: NewContest) -> Result<contest::Model, DbErr> {
        let now = Utc::now();
        let model = contest::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(new.name),
            image: Set(new.image),
            description: Set(new.description),
            price: Set(new.price),
            prize_money: Set(new.prize_money),
            task_instruction: Set(new.task_instruction),
            contest_type: Set(new.contest_type),
            deadline: Set(new.deadline),
            status: Set(ContestStatus::Pending),
            participants_count: Set(0),
            winner_email: Set(None),
            winner_position: Set(None),
            winner_reward: Set(None),
            winner_selected_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        model.insert(self.conn).await
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<contest::Model>, DbErr> {
        contest::Entity::find_by_id(id).one(self.conn).await
    }

    /// Fetch a contest row with a FOR UPDATE lock held until the transaction ends.
    pub async fn find_for_update(&self, id: Uuid) -> Result<Option<contest::Model>, DbErr> {
        contest::Entity::find_by_id(id)
            .lock(LockType::Update)
            .one(self.conn)
            .await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<ContestDocument>, DbErr> {
        match self.find(id).await? {
            Some(model) => Ok(Some(self.load(model).await?)),
            None => Ok(None),
        }
    }

    /// Attach participant and task rows to a contest row.
    pub async fn load(&self, model: contest::Model) -> Result<ContestDocument, DbErr> {
        let mut docs = self.load_many(vec![model]).await?;
        docs.pop()
            .ok_or_else(|| DbErr::Custom("contest vanished while loading children".into()))
    }

    /// List contests, newest first.
    pub async fn list(&self, filter: &ContestFilter) -> Result<Vec<ContestDocument>, DbErr> {
        let mut select = contest::Entity::find();

        if let Some(ref contest_type) = filter.contest_type {
            let term = escape_like(contest_type.trim());
            if !term.is_empty() {
                select = select.filter(
                    Expr::expr(Func::lower(Expr::col(contest::Column::ContestType)))
                        .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
                );
            }
        }
        if let Some(status) = filter.status {
            select = select.filter(contest::Column::Status.eq(status.as_str()));
        }

        let models = select
            .order_by_desc(contest::Column::CreatedAt)
            .all(self.conn)
            .await?;

        self.load_many(models).await
    }

    async fn load_many(&self, models: Vec<contest::Model>) -> Result<Vec<ContestDocument>, DbErr> {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();

        let mut participants: HashMap<Uuid, Vec<contest_participant::Model>> = HashMap::new();
        for p in contest_participant::Entity::find()
            .filter(contest_participant::Column::ContestId.is_in(ids.clone()))
            .order_by_asc(contest_participant::Column::RegisteredAt)
            .order_by_asc(contest_participant::Column::UserId)
            .all(self.conn)
            .await?
        {
            participants.entry(p.contest_id).or_default().push(p);
        }

        let mut tasks: HashMap<Uuid, Vec<task_submission::Model>> = HashMap::new();
        for t in task_submission::Entity::find()
            .filter(task_submission::Column::ContestId.is_in(ids))
            .order_by_asc(task_submission::Column::TaskName)
            .order_by_asc(task_submission::Column::CreatedAt)
            .order_by_asc(task_submission::Column::UserEmail)
            .all(self.conn)
            .await?
        {
            tasks.entry(t.contest_id).or_default().push(t);
        }

        Ok(models
            .into_iter()
            .map(|contest| ContestDocument {
                participants: participants.remove(&contest.id).unwrap_or_default(),
                tasks: tasks.remove(&contest.id).unwrap_or_default(),
                contest,
            })
            .collect())
    }

    /// Overwrite the given metadata fields. Returns the number of rows updated.
    pub async fn update_fields(
        &self,
        id: Uuid,
        patch: &ContestPatch,
        now: DateTime<Utc>,
    ) -> Result<u64, DbErr> {
        let mut update = contest::Entity::update_many()
            .col_expr(contest::Column::UpdatedAt, Expr::value(now))
            .filter(contest::Column::Id.eq(id));

        if let Some(ref name) = patch.name {
            update = update.col_expr(contest::Column::Name, Expr::value(name.clone()));
        }
        if let Some(ref image) = patch.image {
            update = update.col_expr(contest::Column::Image, Expr::value(image.clone()));
        }
        if let Some(ref description) = patch.description {
            update = update.col_expr(contest::Column::Description, Expr::value(description.clone()));
        }
        if let Some(price) = patch.price {
            update = update.col_expr(contest::Column::Price, Expr::value(price));
        }
        if let Some(prize_money) = patch.prize_money {
            update = update.col_expr(contest::Column::PrizeMoney, Expr::value(prize_money));
        }
        if let Some(ref task_instruction) = patch.task_instruction {
            update = update.col_expr(
                contest::Column::TaskInstruction,
                Expr::value(task_instruction.clone()),
            );
        }
        if let Some(ref contest_type) = patch.contest_type {
            update = update.col_expr(contest::Column::ContestType, Expr::value(contest_type.clone()));
        }
        if let Some(deadline) = patch.deadline {
            update = update.col_expr(contest::Column::Deadline, Expr::value(deadline));
        }

        Ok(update.exec(self.conn).await?.rows_affected)
    }

    /// Delete a contest and its child rows. Run inside a transaction.
    pub async fn delete(&self, id: Uuid) -> Result<u64, DbErr> {
        task_submission::Entity::delete_many()
            .filter(task_submission::Column::ContestId.eq(id))
            .exec(self.conn)
            .await?;
        contest_participant::Entity::delete_many()
            .filter(contest_participant::Column::ContestId.eq(id))
            .exec(self.conn)
            .await?;
        let result = contest::Entity::delete_by_id(id).exec(self.conn).await?;
        Ok(result.rows_affected)
    }

    /// Set `status = to` only while the current status is one of `from`.
    /// Returns the number of rows updated (0 or 1).
    pub async fn set_status_if(
        &self,
        id: Uuid,
        from: &[ContestStatus],
        to: ContestStatus,
        now: DateTime<Utc>,
    ) -> Result<u64, DbErr> {
        if from.is_empty() {
            return Ok(0);
        }
        let result = contest::Entity::update_many()
            .col_expr(contest::Column::Status, Expr::value(to.as_str()))
            .col_expr(contest::Column::UpdatedAt, Expr::value(now))
            .filter(contest::Column::Id.eq(id))
            .filter(contest::Column::Status.is_in(from.iter().map(|s| s.as_str())))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    /// Insert a participant row. Returns `false` if the user is already registered.
    pub async fn insert_participant(
        &self,
        contest_id: Uuid,
        participant: &NewParticipant,
        now: DateTime<Utc>,
    ) -> Result<bool, DbErr> {
        let model = contest_participant::ActiveModel {
            contest_id: Set(contest_id),
            user_id: Set(participant.user_id.clone()),
            user_name: Set(participant.user_name.clone()),
            user_email: Set(participant.user_email.clone()),
            registered_at: Set(now),
            ..Default::default()
        };

        match model.insert(self.conn).await {
            Ok(_) => Ok(true),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Recompute `participants_count` from the participant rows.
    pub async fn refresh_participants_count(
        &self,
        contest_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<i32, DbErr> {
        let count = contest_participant::Entity::find()
            .filter(contest_participant::Column::ContestId.eq(contest_id))
            .count(self.conn)
            .await?;
        let count = i32::try_from(count)
            .map_err(|_| DbErr::Custom(format!("participant count {count} overflows i32")))?;

        contest::Entity::update_many()
            .col_expr(contest::Column::ParticipantsCount, Expr::value(count))
            .col_expr(contest::Column::UpdatedAt, Expr::value(now))
            .filter(contest::Column::Id.eq(contest_id))
            .exec(self.conn)
            .await?;

        Ok(count)
    }

    /// Bump `updated_at`. Returns 0 if the contest does not exist.
    pub async fn touch(&self, id: Uuid, now: DateTime<Utc>) -> Result<u64, DbErr> {
        let result = contest::Entity::update_many()
            .col_expr(contest::Column::UpdatedAt, Expr::value(now))
            .filter(contest::Column::Id.eq(id))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    /// Insert or replace the entry of `user_email` for `task_name`.
    pub async fn upsert_task(
        &self,
        contest_id: Uuid,
        task_name: &str,
        user_email: &str,
        submission: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        let model = task_submission::ActiveModel {
            contest_id: Set(contest_id),
            task_name: Set(task_name.to_string()),
            user_email: Set(user_email.to_string()),
            submission: Set(submission.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        task_submission::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    task_submission::Column::ContestId,
                    task_submission::Column::TaskName,
                    task_submission::Column::UserEmail,
                ])
                .update_columns([
                    task_submission::Column::Submission,
                    task_submission::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await?;

        Ok(())
    }

    /// Overwrite the winner record. Returns 0 if the contest does not exist.
    pub async fn set_winner(
        &self,
        id: Uuid,
        winner: &WinnerRecord,
        now: DateTime<Utc>,
    ) -> Result<u64, DbErr> {
        let result = contest::Entity::update_many()
            .col_expr(
                contest::Column::WinnerEmail,
                Expr::value(winner.user_email.clone()),
            )
            .col_expr(contest::Column::WinnerPosition, Expr::value(winner.position))
            .col_expr(contest::Column::WinnerReward, Expr::value(winner.reward))
            .col_expr(contest::Column::WinnerSelectedAt, Expr::value(now))
            .col_expr(contest::Column::UpdatedAt, Expr::value(now))
            .filter(contest::Column::Id.eq(id))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    /// Number of contests with a participant registered under `email`.
    pub async fn count_participations(&self, email: &str) -> Result<u64, DbErr> {
        contest::Entity::find()
            .filter(
                contest::Column::Id.in_subquery(
                    SeaQuery::select()
                        .column(contest_participant::Column::ContestId)
                        .from(contest_participant::Entity)
                        .and_where(contest_participant::Column::UserEmail.eq(email))
                        .to_owned(),
                ),
            )
            .count(self.conn)
            .await
    }

    /// Number of contests whose winner is `email`.
    pub async fn count_wins(&self, email: &str) -> Result<u64, DbErr> {
        contest::Entity::find()
            .filter(contest::Column::WinnerEmail.eq(email))
            .count(self.conn)
            .await
    }
}
