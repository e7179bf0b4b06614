use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::payment::*;
use crate::state::AppState;

const IDEMPOTENCY_KEY: &str = "idempotency-key";

#[utoipa::path(
    post,
    path = "/create-checkout-session",
    tag = "Payments",
    operation_id = "createCheckoutSession",
    summary = "Create a hosted checkout session",
    description = "Creates a checkout session with the payment provider and returns its id and redirect URL. An `Idempotency-Key` header is forwarded to the provider.",
    params(("Idempotency-Key" = Option<String>, Header, description = "Forwarded to the payment provider")),
    request_body = CreateCheckoutRequest,
    responses(
        (status = 200, description = "Session created", body = CheckoutSessionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 502, description = "Provider failure (GATEWAY_ERROR)", body = ErrorBody),
        (status = 504, description = "Provider timeout (TIMEOUT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers, payload), fields(amount = payload.amount))]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(payload): AppJson<CreateCheckoutRequest>,
) -> Result<Json<CheckoutSessionResponse>, AppError> {
    let request = validate_checkout(payload, &state.config.payment)?;
    let idempotency_key = headers
        .get(IDEMPOTENCY_KEY)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let session = state
        .payments
        .create_checkout_session(&request, idempotency_key)
        .await?;
    tracing::info!(session_id = %session.id, "Checkout session created");

    Ok(Json(CheckoutSessionResponse::from(session)))
}

#[utoipa::path(
    get,
    path = "/payment-session/{session_id}",
    tag = "Payments",
    operation_id = "getPaymentSession",
    summary = "Retrieve a checkout session",
    description = "Returns payment status, customer email, amount and the metadata attached at creation.",
    params(("session_id" = String, Path, description = "Checkout session ID")),
    responses(
        (status = 200, description = "Session details", body = PaymentSessionResponse),
        (status = 400, description = "Malformed session id (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Unknown session (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Provider failure (GATEWAY_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_payment_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<PaymentSessionResponse>, AppError> {
    let session_id = validate_session_id(&session_id)?;
    let details = state.payments.retrieve_session(session_id).await?;

    Ok(Json(PaymentSessionResponse::from(details)))
}
