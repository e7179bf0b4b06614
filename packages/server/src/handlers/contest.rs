use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::contest::*;
use crate::models::shared::parse_id;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/contest",
    tag = "Contests",
    operation_id = "createContest",
    summary = "Create a new contest",
    description = "Creates a contest in `pending` status with no participants, tasks or winner.",
    request_body = CreateContestRequest,
    responses(
        (status = 201, description = "Contest created", body = ContestResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(name = %payload.name))]
pub async fn create_contest(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateContestRequest>,
) -> Result<impl IntoResponse, AppError> {
    let new = validate_create_contest(payload)?;
    let doc = state.contests().create(new).await?;

    Ok((StatusCode::CREATED, Json(ContestResponse::from(doc))))
}

#[utoipa::path(
    get,
    path = "/contest",
    tag = "Contests",
    operation_id = "listContests",
    summary = "List contests",
    description = "Returns all contests, newest first. `type` matches a case-insensitive substring of the contest type; `status` must match exactly.",
    params(ContestListQuery),
    responses(
        (status = 200, description = "Matching contests", body = Vec<ContestResponse>),
        (status = 400, description = "Unknown status (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_contests(
    State(state): State<AppState>,
    Query(query): Query<ContestListQuery>,
) -> Result<Json<Vec<ContestResponse>>, AppError> {
    let filter = parse_list_query(query)?;
    let docs = state.contests().list(&filter).await?;

    Ok(Json(docs.into_iter().map(ContestResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/contest/{id}",
    tag = "Contests",
    operation_id = "getContest",
    summary = "Get contest details",
    params(("id" = String, Path, description = "Contest ID")),
    responses(
        (status = 200, description = "Contest details", body = ContestResponse),
        (status = 400, description = "Malformed id (INVALID_ID)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_contest(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContestResponse>, AppError> {
    let id = parse_id(&id)?;
    let doc = state.contests().get(id).await?;

    Ok(Json(ContestResponse::from(doc)))
}

#[utoipa::path(
    patch,
    path = "/contest/{id}",
    tag = "Contests",
    operation_id = "updateContest",
    summary = "Update contest metadata",
    description = "Partially updates metadata fields. Lifecycle fields (`status`, `participants`, `participantsCount`, `tasks`, `winner`) are rejected.",
    params(("id" = String, Path, description = "Contest ID")),
    request_body = UpdateContestRequest,
    responses(
        (status = 200, description = "Contest updated", body = ContestResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR, INVALID_ID)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn update_contest(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateContestRequest>,
) -> Result<Json<ContestResponse>, AppError> {
    let id = parse_id(&id)?;
    let patch = validate_update_contest(payload)?;
    let doc = state.contests().update_metadata(id, &patch).await?;

    Ok(Json(ContestResponse::from(doc)))
}

#[utoipa::path(
    delete,
    path = "/contest/{id}",
    tag = "Contests",
    operation_id = "deleteContest",
    summary = "Delete a contest",
    description = "Deletes the contest together with its participants and task submissions.",
    params(("id" = String, Path, description = "Contest ID")),
    responses(
        (status = 204, description = "Contest deleted"),
        (status = 400, description = "Malformed id (INVALID_ID)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_contest(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    state.contests().delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    patch,
    path = "/contest/approve/{id}",
    tag = "Contest Lifecycle",
    operation_id = "approveContest",
    summary = "Approve a pending contest",
    description = "Moves a `pending` contest to `approved`. Approving an approved contest is a no-op.",
    params(("id" = String, Path, description = "Contest ID")),
    responses(
        (status = 200, description = "Contest approved", body = ContestResponse),
        (status = 400, description = "Malformed id (INVALID_ID)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Contest was rejected (INVALID_TRANSITION)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn approve_contest(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContestResponse>, AppError> {
    let id = parse_id(&id)?;
    let doc = state.contests().approve(id).await?;

    Ok(Json(ContestResponse::from(doc)))
}

#[utoipa::path(
    patch,
    path = "/contest/reject/{id}",
    tag = "Contest Lifecycle",
    operation_id = "rejectContest",
    summary = "Reject a pending contest",
    description = "Moves a `pending` contest to `rejected`. Rejecting a rejected contest is a no-op.",
    params(("id" = String, Path, description = "Contest ID")),
    responses(
        (status = 200, description = "Contest rejected", body = ContestResponse),
        (status = 400, description = "Malformed id (INVALID_ID)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Contest was approved (INVALID_TRANSITION)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn reject_contest(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContestResponse>, AppError> {
    let id = parse_id(&id)?;
    let doc = state.contests().reject(id).await?;

    Ok(Json(ContestResponse::from(doc)))
}

#[utoipa::path(
    patch,
    path = "/contest/register/{id}",
    tag = "Contest Lifecycle",
    operation_id = "registerForContest",
    summary = "Register a participant",
    description = "Appends the user to the participant list and increments `participantsCount`. A user can register only once per contest.",
    params(("id" = String, Path, description = "Contest ID")),
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registered", body = ContestResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR, INVALID_ID)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already registered (DUPLICATE_REGISTRATION)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(user_id = %payload.user_id))]
pub async fn register_for_contest(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<Json<ContestResponse>, AppError> {
    let id = parse_id(&id)?;
    let doc = state
        .contests()
        .register(id, &payload.user_id, &payload.user_name, &payload.user_email)
        .await?;

    Ok(Json(ContestResponse::from(doc)))
}

#[utoipa::path(
    patch,
    path = "/contest/submit-task/{id}",
    tag = "Contest Lifecycle",
    operation_id = "submitTask",
    summary = "Submit or replace a task entry",
    description = "Stores the submission under `tasks[taskName]`. A second submission by the same email for the same task replaces the first.",
    params(("id" = String, Path, description = "Contest ID")),
    request_body = SubmitTaskRequest,
    responses(
        (status = 200, description = "Submission stored", body = ContestResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR, INVALID_ID)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(task = %payload.task_name))]
pub async fn submit_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<SubmitTaskRequest>,
) -> Result<Json<ContestResponse>, AppError> {
    let id = parse_id(&id)?;
    let doc = state
        .contests()
        .submit_task(
            id,
            &payload.user_email,
            &payload.task_name,
            &payload.task_submission,
        )
        .await?;

    Ok(Json(ContestResponse::from(doc)))
}

#[utoipa::path(
    patch,
    path = "/contest/winner/{id}",
    tag = "Contest Lifecycle",
    operation_id = "setContestWinner",
    summary = "Set the contest winner",
    description = "Overwrites the winner record. The last call wins.",
    params(("id" = String, Path, description = "Contest ID")),
    request_body = SetWinnerRequest,
    responses(
        (status = 200, description = "Winner set", body = ContestResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR, INVALID_ID)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(position = payload.position))]
pub async fn set_winner(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<SetWinnerRequest>,
) -> Result<Json<ContestResponse>, AppError> {
    let id = parse_id(&id)?;
    let doc = state
        .contests()
        .set_winner(id, &payload.user_email, payload.position, payload.reward)
        .await?;

    Ok(Json(ContestResponse::from(doc)))
}

#[utoipa::path(
    get,
    path = "/contest-stats",
    tag = "Contest Lifecycle",
    operation_id = "getContestStats",
    summary = "Participation statistics for a user",
    description = "Counts the contests the email is registered for and the contests it has won.",
    params(StatsQuery),
    responses(
        (status = 200, description = "Counts", body = StatsResponse),
        (status = 400, description = "Blank or malformed email (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn contest_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<StatsResponse>, AppError> {
    let stats = state.contests().stats(&query.email).await?;

    Ok(Json(StatsResponse::from(stats)))
}
