use std::time::Duration;

use chrono::Utc;
use common::ContestStatus;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{debug, info};
use uuid::Uuid;

use super::repository::{
    ContestDocument, ContestFilter, ContestPatch, ContestRepository, NewContest, NewParticipant,
    WinnerRecord,
};
use crate::error::AppError;
use crate::models::shared::{normalize_email, require_non_blank};
use crate::utils::timeout::bounded;

/// Participation and win counts for one email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticipationStats {
    pub participated: u64,
    pub won: u64,
}

/// Contest lifecycle operations.
///
/// This is the only writer of `status`, participants, tasks and the winner.
/// Each public operation runs under the configured store timeout.
pub struct ContestService<'a> {
    db: &'a DatabaseConnection,
    op_timeout: Duration,
}

fn contest_not_found() -> AppError {
    AppError::NotFound("Contest not found".into())
}

impl<'a> ContestService<'a> {
    pub fn new(db: &'a DatabaseConnection, op_timeout: Duration) -> Self {
        Self { db, op_timeout }
    }

    pub async fn create(&self, new: NewContest) -> Result<ContestDocument, AppError> {
        bounded(self.op_timeout, "create contest", async {
            let model = ContestRepository::new(self.db).create(new).await?;
            info!(contest_id = %model.id, "Contest created");
            Ok(ContestDocument {
                contest: model,
                participants: Vec::new(),
                tasks: Vec::new(),
            })
        })
        .await
    }

    pub async fn get(&self, id: Uuid) -> Result<ContestDocument, AppError> {
        bounded(self.op_timeout, "get contest", async {
            ContestRepository::new(self.db)
                .get_by_id(id)
                .await?
                .ok_or_else(contest_not_found)
        })
        .await
    }

    pub async fn list(&self, filter: &ContestFilter) -> Result<Vec<ContestDocument>, AppError> {
        bounded(self.op_timeout, "list contests", async {
            Ok(ContestRepository::new(self.db).list(filter).await?)
        })
        .await
    }

    /// Overwrite metadata fields. An empty patch returns the contest unchanged.
    pub async fn update_metadata(
        &self,
        id: Uuid,
        patch: &ContestPatch,
    ) -> Result<ContestDocument, AppError> {
        if patch.is_empty() {
            return self.get(id).await;
        }

        bounded(self.op_timeout, "update contest", async {
            let repo = ContestRepository::new(self.db);
            if repo.update_fields(id, patch, Utc::now()).await? == 0 {
                return Err(contest_not_found());
            }
            Ok(())
        })
        .await?;

        self.get(id).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        bounded(self.op_timeout, "delete contest", async {
            let txn = self.db.begin().await?;
            let repo = ContestRepository::new(&txn);
            repo.find_for_update(id).await?.ok_or_else(contest_not_found)?;
            repo.delete(id).await?;
            txn.commit().await?;
            info!(contest_id = %id, "Contest deleted");
            Ok(())
        })
        .await
    }

    pub async fn approve(&self, id: Uuid) -> Result<ContestDocument, AppError> {
        self.transition(id, ContestStatus::Approved).await
    }

    pub async fn reject(&self, id: Uuid) -> Result<ContestDocument, AppError> {
        self.transition(id, ContestStatus::Rejected).await
    }

    /// Move a contest to `to` with a conditional update on the current status.
    ///
    /// Re-applying the state the contest is already in succeeds without a write.
    async fn transition(&self, id: Uuid, to: ContestStatus) -> Result<ContestDocument, AppError> {
        let allowed_from: Vec<ContestStatus> = ContestStatus::ALL
            .iter()
            .copied()
            .filter(|from| from.can_transition_to(to))
            .collect();

        bounded(self.op_timeout, "contest transition", async {
            let repo = ContestRepository::new(self.db);
            if repo.set_status_if(id, &allowed_from, to, Utc::now()).await? == 1 {
                info!(contest_id = %id, status = %to, "Contest status changed");
                return Ok(());
            }

            let current = repo.find(id).await?.ok_or_else(contest_not_found)?;
            if current.status == to {
                debug!(contest_id = %id, status = %to, "Contest already in requested status");
                return Ok(());
            }
            let reason = if current.status.is_terminal() {
                format!("Contest was already {}", current.status)
            } else {
                format!("Contest is {}", current.status)
            };
            Err(AppError::InvalidTransition(format!(
                "{reason}; cannot move it to {to}"
            )))
        })
        .await?;

        self.get(id).await
    }

    /// Register a user for a contest.
    ///
    /// Runs under a row lock on the contest, so concurrent registrations for
    /// the same contest are serialized and `participants_count` always matches
    /// the participant rows.
    pub async fn register(
        &self,
        id: Uuid,
        user_id: &str,
        user_name: &str,
        user_email: &str,
    ) -> Result<ContestDocument, AppError> {
        let participant = NewParticipant {
            user_id: require_non_blank(user_id, "userId")?.to_string(),
            user_name: user_name.trim().to_string(),
            user_email: normalize_email(user_email, "userEmail")?,
        };

        bounded(self.op_timeout, "register participant", async {
            let txn = self.db.begin().await?;
            let repo = ContestRepository::new(&txn);
            repo.find_for_update(id).await?.ok_or_else(contest_not_found)?;

            let now = Utc::now();
            if !repo.insert_participant(id, &participant, now).await? {
                debug!(contest_id = %id, user_id = %participant.user_id, "Duplicate registration");
                return Err(AppError::DuplicateRegistration(
                    "User is already registered for this contest".into(),
                ));
            }
            let count = repo.refresh_participants_count(id, now).await?;
            txn.commit().await?;

            info!(
                contest_id = %id,
                user_id = %participant.user_id,
                participants = count,
                "Participant registered"
            );
            Ok(())
        })
        .await?;

        self.get(id).await
    }

    /// Insert or replace the submission of `user_email` for `task_name`.
    pub async fn submit_task(
        &self,
        id: Uuid,
        user_email: &str,
        task_name: &str,
        submission: &str,
    ) -> Result<ContestDocument, AppError> {
        let task_name = require_non_blank(task_name, "taskName")?;
        let submission = require_non_blank(submission, "taskSubmission")?;
        let user_email = normalize_email(user_email, "userEmail")?;

        bounded(self.op_timeout, "submit task", async {
            let txn = self.db.begin().await?;
            let repo = ContestRepository::new(&txn);
            let now = Utc::now();
            // Updating the contest row first takes its lock for the rest of the transaction.
            if repo.touch(id, now).await? == 0 {
                return Err(contest_not_found());
            }
            repo.upsert_task(id, task_name, &user_email, submission, now)
                .await?;
            txn.commit().await?;

            debug!(contest_id = %id, task = %task_name, "Task submission stored");
            Ok(())
        })
        .await?;

        self.get(id).await
    }

    /// Overwrite the winner record. No history is kept.
    pub async fn set_winner(
        &self,
        id: Uuid,
        user_email: &str,
        position: i32,
        reward: i64,
    ) -> Result<ContestDocument, AppError> {
        let user_email = normalize_email(user_email, "userEmail")?;
        if position < 1 {
            return Err(AppError::Validation("position must be >= 1".into()));
        }
        if reward < 0 {
            return Err(AppError::Validation("reward must be >= 0".into()));
        }
        let winner = WinnerRecord {
            user_email,
            position,
            reward,
        };

        bounded(self.op_timeout, "set winner", async {
            let repo = ContestRepository::new(self.db);
            if repo.set_winner(id, &winner, Utc::now()).await? == 0 {
                return Err(contest_not_found());
            }
            info!(contest_id = %id, position, "Winner selected");
            Ok(())
        })
        .await?;

        self.get(id).await
    }

    pub async fn stats(&self, email: &str) -> Result<ParticipationStats, AppError> {
        let email = normalize_email(email, "email")?;

        bounded(self.op_timeout, "contest stats", async {
            let repo = ContestRepository::new(self.db);
            Ok(ParticipationStats {
                participated: repo.count_participations(&email).await?,
                won: repo.count_wins(&email).await?,
            })
        })
        .await
    }
}
