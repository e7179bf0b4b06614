use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use common::ContestStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::{require_non_blank, validate_amount, validate_name};
use crate::contest::{ContestDocument, ContestFilter, ContestPatch, NewContest, ParticipationStats};
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateContestRequest {
    #[schema(example = "Logo Design Sprint")]
    pub name: String,
    #[schema(example = "https://i.ibb.co/logo.png")]
    pub image: String,
    pub description: String,
    /// Entry fee in minor currency units.
    #[schema(example = 1500)]
    pub price: i64,
    /// Prize in minor currency units.
    #[schema(example = 50000)]
    pub prize_money: i64,
    pub task_instruction: String,
    #[schema(example = "Image Design")]
    pub contest_type: String,
    #[schema(example = "2030-01-31T23:59:59Z")]
    pub deadline: DateTime<Utc>,
}

/// Metadata-only update. Lifecycle fields (`status`, `participants`, `tasks`,
/// `winner`, ...) are rejected as unknown fields.
#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateContestRequest {
    pub name: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub prize_money: Option<i64>,
    pub task_instruction: Option<String>,
    pub contest_type: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ContestListQuery {
    /// Case-insensitive substring of the contest type.
    #[serde(rename = "type")]
    #[param(example = "design")]
    pub contest_type: Option<String>,
    /// Exact status: `pending`, `approved` or `rejected`.
    #[param(example = "approved")]
    pub status: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "uid-123")]
    pub user_id: String,
    #[serde(default)]
    #[schema(example = "Alice")]
    pub user_name: String,
    #[schema(example = "alice@example.com")]
    pub user_email: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTaskRequest {
    #[schema(example = "alice@example.com")]
    pub user_email: String,
    #[schema(example = "Round 1")]
    pub task_name: String,
    #[schema(example = "https://github.com/alice/entry")]
    pub task_submission: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetWinnerRequest {
    #[schema(example = "alice@example.com")]
    pub user_email: String,
    /// 1 for first place.
    #[schema(example = 1)]
    pub position: i32,
    /// Reward in minor currency units.
    #[schema(example = 50000)]
    pub reward: i64,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct StatsQuery {
    #[serde(default)]
    #[param(example = "alice@example.com")]
    pub email: String,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantResponse {
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub registered_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskEntryResponse {
    pub user_email: String,
    pub task_submission: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WinnerResponse {
    pub user_email: String,
    pub position: i32,
    pub reward: i64,
    pub selected_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContestResponse {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub description: String,
    pub price: i64,
    pub prize_money: i64,
    pub task_instruction: String,
    pub contest_type: String,
    pub deadline: DateTime<Utc>,
    pub status: ContestStatus,
    pub participants: Vec<ParticipantResponse>,
    pub participants_count: i32,
    /// Task name to submissions, one per user email.
    pub tasks: BTreeMap<String, Vec<TaskEntryResponse>>,
    pub winner: Option<WinnerResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct StatsResponse {
    #[schema(example = 3)]
    pub participated: u64,
    #[schema(example = 1)]
    pub won: u64,
}

impl From<ContestDocument> for ContestResponse {
    fn from(doc: ContestDocument) -> Self {
        let m = doc.contest;

        let winner = match (m.winner_email, m.winner_position, m.winner_reward, m.winner_selected_at) {
            (Some(user_email), Some(position), Some(reward), Some(selected_at)) => {
                Some(WinnerResponse {
                    user_email,
                    position,
                    reward,
                    selected_at,
                })
            }
            _ => None,
        };

        let mut tasks: BTreeMap<String, Vec<TaskEntryResponse>> = BTreeMap::new();
        for t in doc.tasks {
            tasks.entry(t.task_name).or_default().push(TaskEntryResponse {
                user_email: t.user_email,
                task_submission: t.submission,
                submitted_at: t.updated_at,
            });
        }

        Self {
            id: m.id,
            name: m.name,
            image: m.image,
            description: m.description,
            price: m.price,
            prize_money: m.prize_money,
            task_instruction: m.task_instruction,
            contest_type: m.contest_type,
            deadline: m.deadline,
            status: m.status,
            participants: doc
                .participants
                .into_iter()
                .map(|p| ParticipantResponse {
                    user_id: p.user_id,
                    user_name: p.user_name,
                    user_email: p.user_email,
                    registered_at: p.registered_at,
                })
                .collect(),
            participants_count: m.participants_count,
            tasks,
            winner,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<ParticipationStats> for StatsResponse {
    fn from(stats: ParticipationStats) -> Self {
        Self {
            participated: stats.participated,
            won: stats.won,
        }
    }
}

fn validate_description(description: &str, field: &str) -> Result<(), AppError> {
    if description.trim().is_empty() || description.len() > 1_000_000 {
        return Err(AppError::Validation(format!(
            "{field} must be non-empty and at most 1MB"
        )));
    }
    Ok(())
}

pub fn validate_create_contest(req: CreateContestRequest) -> Result<NewContest, AppError> {
    validate_name(&req.name)?;
    validate_description(&req.description, "description")?;
    validate_description(&req.task_instruction, "taskInstruction")?;
    validate_amount(req.price, "price")?;
    validate_amount(req.prize_money, "prizeMoney")?;
    let contest_type = require_non_blank(&req.contest_type, "contestType")?.to_string();

    Ok(NewContest {
        name: req.name.trim().to_string(),
        image: req.image.trim().to_string(),
        description: req.description,
        price: req.price,
        prize_money: req.prize_money,
        task_instruction: req.task_instruction,
        contest_type,
        deadline: req.deadline,
    })
}

pub fn validate_update_contest(req: UpdateContestRequest) -> Result<ContestPatch, AppError> {
    if let Some(ref name) = req.name {
        validate_name(name)?;
    }
    if let Some(ref description) = req.description {
        validate_description(description, "description")?;
    }
    if let Some(ref task_instruction) = req.task_instruction {
        validate_description(task_instruction, "taskInstruction")?;
    }
    if let Some(price) = req.price {
        validate_amount(price, "price")?;
    }
    if let Some(prize_money) = req.prize_money {
        validate_amount(prize_money, "prizeMoney")?;
    }
    let contest_type = match req.contest_type {
        Some(ref t) => Some(require_non_blank(t, "contestType")?.to_string()),
        None => None,
    };

    Ok(ContestPatch {
        name: req.name.map(|n| n.trim().to_string()),
        image: req.image.map(|i| i.trim().to_string()),
        description: req.description,
        price: req.price,
        prize_money: req.prize_money,
        task_instruction: req.task_instruction,
        contest_type,
        deadline: req.deadline,
    })
}

pub fn parse_list_query(query: ContestListQuery) -> Result<ContestFilter, AppError> {
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<ContestStatus>()
                .map_err(|e| AppError::Validation(e.to_string()))?,
        ),
    };
    Ok(ContestFilter {
        contest_type: query.contest_type,
        status,
    })
}
