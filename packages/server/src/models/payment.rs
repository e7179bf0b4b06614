use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::shared::{normalize_email, require_non_blank};
use crate::config::PaymentConfig;
use crate::error::AppError;
use crate::payment::{CheckoutRequest, CheckoutSession, SessionDetails};

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    /// Amount in minor currency units.
    #[serde(alias = "price")]
    #[schema(example = 1500)]
    pub amount: i64,
    /// Defaults to the configured currency.
    #[schema(example = "usd")]
    pub currency: Option<String>,
    #[serde(alias = "contestName")]
    #[schema(example = "Logo Design Sprint")]
    pub product_name: String,
    #[serde(alias = "userEmail")]
    #[schema(example = "alice@example.com")]
    pub customer_email: String,
    /// Echoed back by the provider when the session is retrieved.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    pub success_url: Option<String>,
    pub cancel_url: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CheckoutSessionResponse {
    #[schema(example = "cs_test_a1b2c3")]
    pub id: String,
    pub url: String,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSessionResponse {
    pub id: String,
    #[schema(example = "paid")]
    pub payment_status: Option<String>,
    pub customer_email: Option<String>,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

impl From<CheckoutSession> for CheckoutSessionResponse {
    fn from(s: CheckoutSession) -> Self {
        Self { id: s.id, url: s.url }
    }
}

impl From<SessionDetails> for PaymentSessionResponse {
    fn from(s: SessionDetails) -> Self {
        Self {
            id: s.id,
            payment_status: s.payment_status,
            customer_email: s.customer_email,
            amount_total: s.amount_total,
            currency: s.currency,
            metadata: s.metadata,
        }
    }
}

pub fn validate_checkout(
    req: CreateCheckoutRequest,
    defaults: &PaymentConfig,
) -> Result<CheckoutRequest, AppError> {
    if req.amount <= 0 {
        return Err(AppError::Validation("amount must be > 0".into()));
    }
    let product_name = require_non_blank(&req.product_name, "productName")?.to_string();
    let customer_email = normalize_email(&req.customer_email, "customerEmail")?;
    let currency = match req.currency.as_deref().map(str::trim) {
        None | Some("") => defaults.currency.clone(),
        Some(c) if c.len() == 3 && c.chars().all(|ch| ch.is_ascii_alphabetic()) => {
            c.to_ascii_lowercase()
        }
        Some(c) => {
            return Err(AppError::Validation(format!(
                "'{c}' is not a three-letter currency code"
            )));
        }
    };

    Ok(CheckoutRequest {
        amount: req.amount,
        currency,
        product_name,
        customer_email,
        metadata: req.metadata,
        success_url: req
            .success_url
            .unwrap_or_else(|| defaults.success_url.clone()),
        cancel_url: req.cancel_url.unwrap_or_else(|| defaults.cancel_url.clone()),
    })
}

/// Session ids are opaque, but they end up in a provider URL path.
pub fn validate_session_id(raw: &str) -> Result<&str, AppError> {
    let id = require_non_blank(raw, "sessionId")?;
    if id.len() > 255 || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(AppError::Validation(format!(
            "'{id}' is not a valid session id"
        )));
    }
    Ok(id)
}
