use crate::common::{TestApp, routes};
use serde_json::json;

fn checkout_body() -> serde_json::Value {
    json!({
        "amount": 1500,
        "productName": "Logo Sprint entry",
        "customerEmail": "Alice@Example.com",
        "metadata": {"contestId": "c-1"},
    })
}

mod checkout {
    use super::*;

    #[tokio::test]
    async fn creates_session_and_returns_redirect() {
        let app = TestApp::spawn().await;

        let res = app.post(routes::CHECKOUT, &checkout_body()).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let id = res.body["id"].as_str().unwrap();
        assert!(id.starts_with("cs_test_"));
        assert!(res.body["url"].as_str().unwrap().ends_with(id));
    }

    #[tokio::test]
    async fn idempotency_key_reuses_the_session() {
        let app = TestApp::spawn().await;

        let first = app
            .post_with_header(routes::CHECKOUT, &checkout_body(), "Idempotency-Key", "k-1")
            .await;
        let second = app
            .post_with_header(routes::CHECKOUT, &checkout_body(), "Idempotency-Key", "k-1")
            .await;

        assert_eq!(first.status, 200);
        assert_eq!(first.body["id"], second.body["id"]);
        assert_eq!(app.payments.created_count(), 1);
    }

    #[tokio::test]
    async fn non_positive_amount_is_rejected() {
        let app = TestApp::spawn().await;
        let mut body = checkout_body();
        body["amount"] = json!(0);

        let res = app.post(routes::CHECKOUT, &body).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(app.payments.created_count(), 0);
    }

    #[tokio::test]
    async fn provider_failure_is_a_gateway_error() {
        let app = TestApp::spawn().await;
        let mut body = checkout_body();
        body["productName"] = json!("provider-down");

        let res = app.post(routes::CHECKOUT, &body).await;

        assert_eq!(res.status, 502);
        assert_eq!(res.body["code"], "GATEWAY_ERROR");
        assert!(!res.text.contains("internal provider failure"));
    }
}

mod session_lookup {
    use super::*;

    #[tokio::test]
    async fn returns_session_metadata() {
        let app = TestApp::spawn().await;
        let created = app.post(routes::CHECKOUT, &checkout_body()).await;
        let id = created.body["id"].as_str().unwrap();

        let res = app.get(&routes::payment_session(id)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["paymentStatus"], "paid");
        assert_eq!(res.body["customerEmail"], "alice@example.com");
        assert_eq!(res.body["amountTotal"], 1500);
        assert_eq!(res.body["currency"], "usd");
        assert_eq!(res.body["metadata"]["contestId"], "c-1");
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::payment_session("cs_test_missing")).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}
