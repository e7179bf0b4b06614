use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{instrument, warn};

use super::{CheckoutRequest, CheckoutSession, GatewayError, PaymentGateway, SessionDetails};
use crate::config::PaymentConfig;

/// Stripe Checkout over the REST API.
pub struct StripeGateway {
    client: Client,
    api_base: String,
    secret_key: String,
}

#[derive(Deserialize)]
struct StripeSession {
    id: String,
    url: Option<String>,
    payment_status: Option<String>,
    customer_email: Option<String>,
    customer_details: Option<CustomerDetails>,
    amount_total: Option<i64>,
    currency: Option<String>,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct CustomerDetails {
    email: Option<String>,
}

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
    code: Option<String>,
}

impl StripeGateway {
    pub fn new(config: &PaymentConfig) -> Result<Self, GatewayError> {
        if config.secret_key.is_empty() {
            warn!("payment.secret_key is empty; checkout requests will be rejected by the provider");
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        })
    }

    async fn parse_session(response: reqwest::Response) -> Result<StripeSession, GatewayError> {
        response
            .json::<StripeSession>()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }

    async fn error_from(response: reqwest::Response) -> GatewayError {
        let status = response.status().as_u16();
        let message = match response.json::<StripeErrorBody>().await {
            Ok(body) => body
                .error
                .message
                .or(body.error.code)
                .unwrap_or_else(|| "unknown error".into()),
            Err(_) => "unreadable error body".into(),
        };
        GatewayError::Rejected { status, message }
    }
}

fn transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Transport(err.to_string())
    }
}

/// Form fields for `POST /v1/checkout/sessions`, using Stripe's bracket notation.
pub(crate) fn checkout_form(request: &CheckoutRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("payment_method_types[0]".to_string(), "card".to_string()),
        ("customer_email".to_string(), request.customer_email.clone()),
        ("line_items[0][quantity]".to_string(), "1".to_string()),
        (
            "line_items[0][price_data][currency]".to_string(),
            request.currency.clone(),
        ),
        (
            "line_items[0][price_data][unit_amount]".to_string(),
            request.amount.to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]".to_string(),
            request.product_name.clone(),
        ),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
    ];
    for (key, value) in &request.metadata {
        form.push((format!("metadata[{key}]"), value.clone()));
    }
    form
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[instrument(skip(self, request), fields(amount = request.amount, currency = %request.currency))]
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
        idempotency_key: Option<&str>,
    ) -> Result<CheckoutSession, GatewayError> {
        let mut builder = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&checkout_form(request));
        if let Some(key) = idempotency_key {
            builder = builder.header("Idempotency-Key", key);
        }

        let response = builder.send().await.map_err(transport_error)?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let session = Self::parse_session(response).await?;
        let url = session
            .url
            .ok_or_else(|| GatewayError::InvalidResponse("session has no url".into()))?;
        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }

    #[instrument(skip(self))]
    async fn retrieve_session(&self, session_id: &str) -> Result<SessionDetails, GatewayError> {
        let response = self
            .client
            .get(format!("{}/v1/checkout/sessions/{session_id}", self.api_base))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(GatewayError::SessionNotFound(session_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let session = Self::parse_session(response).await?;
        Ok(SessionDetails {
            id: session.id,
            payment_status: session.payment_status,
            customer_email: session
                .customer_email
                .or(session.customer_details.and_then(|d| d.email)),
            amount_total: session.amount_total,
            currency: session.currency,
            metadata: session.metadata,
        })
    }
}
