mod stripe;

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

pub use stripe::StripeGateway;

/// Input for a hosted checkout page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// Amount in minor currency units (cents for USD).
    pub amount: i64,
    /// Lower-case ISO currency code.
    pub currency: String,
    pub product_name: String,
    pub customer_email: String,
    pub metadata: BTreeMap<String, String>,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub id: String,
    /// Where the customer is redirected to pay.
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDetails {
    pub id: String,
    pub payment_status: Option<String>,
    pub customer_email: Option<String>,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Payment session not found: {0}")]
    SessionNotFound(String),

    #[error("Payment provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Payment provider request timed out")]
    Timeout,

    #[error("Payment provider transport error: {0}")]
    Transport(String),

    #[error("Unexpected payment provider response: {0}")]
    InvalidResponse(String),
}

/// Narrow interface to the third-party payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a checkout session. Retries carrying the same `idempotency_key`
    /// return the session created by the first call.
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
        idempotency_key: Option<&str>,
    ) -> Result<CheckoutSession, GatewayError>;

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionDetails, GatewayError>;
}
