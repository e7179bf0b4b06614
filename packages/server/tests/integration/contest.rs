use crate::common::{TestApp, routes};
use contest_hub::entity::{contest_participant, task_submission};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;
use uuid::Uuid;

/// Create a minimal valid contest payload.
fn valid_contest_body(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "image": "https://img.test/logo.png",
        "description": "Design a logo for our product.",
        "price": 1500,
        "prizeMoney": 50000,
        "taskInstruction": "Upload a PNG and paste the link.",
        "contestType": "Image Design",
        "deadline": "2099-01-31T23:59:59Z",
    })
}

mod contest_creation {
    use super::*;

    #[tokio::test]
    async fn creates_a_pending_contest() {
        let app = TestApp::spawn().await;

        let res = app
            .post(routes::CONTESTS, &valid_contest_body("Logo Sprint"))
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["name"], "Logo Sprint");
        assert_eq!(res.body["status"], "pending");
        assert_eq!(res.body["participantsCount"], 0);
        assert_eq!(res.body["participants"], json!([]));
        assert_eq!(res.body["tasks"], json!({}));
        assert!(res.body["winner"].is_null());
        assert_eq!(res.body["prizeMoney"], 50000);
        assert!(res.body["id"].as_str().is_some());
    }

    #[tokio::test]
    async fn returns_validation_error_for_blank_name() {
        let app = TestApp::spawn().await;

        let mut body = valid_contest_body("x");
        body["name"] = json!("   ");
        let res = app.post(routes::CONTESTS, &body).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn returns_validation_error_for_negative_price() {
        let app = TestApp::spawn().await;

        let mut body = valid_contest_body("Cheap");
        body["price"] = json!(-1);
        let res = app.post(routes::CONTESTS, &body).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app.post(routes::CONTESTS, &json!({"name": 42})).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod contest_retrieval {
    use super::*;

    #[tokio::test]
    async fn get_returns_the_document() {
        let app = TestApp::spawn().await;
        let id = app.create_contest("Essay Cup", "Article Writing").await;

        let res = app.get(&routes::contest(&id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["id"], id.as_str());
        assert_eq!(res.body["contestType"], "Article Writing");
    }

    #[tokio::test]
    async fn malformed_id_is_rejected_before_lookup() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::contest("not-a-uuid")).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "INVALID_ID");
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .get(&routes::contest("0190a8f4-0000-7000-8000-000000000000"))
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod contest_listing {
    use super::*;

    #[tokio::test]
    async fn lists_all_newest_first() {
        let app = TestApp::spawn().await;
        let first = app.create_contest("First", "Image Design").await;
        let second = app.create_contest("Second", "Gaming Review").await;

        let res = app.get(routes::CONTESTS).await;

        assert_eq!(res.status, 200);
        let items = res.body.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["id"], second.as_str());
        assert_eq!(items[1]["id"], first.as_str());
    }

    #[tokio::test]
    async fn type_filter_is_case_insensitive_substring() {
        let app = TestApp::spawn().await;
        app.create_contest("Logo", "Image Design").await;
        app.create_contest("Essay", "Article Writing").await;

        let res = app.get(&routes::contests_filtered("type=DESIGN")).await;

        assert_eq!(res.status, 200);
        let items = res.body.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], "Logo");
    }

    #[tokio::test]
    async fn type_filter_treats_wildcards_literally() {
        let app = TestApp::spawn().await;
        app.create_contest("Logo", "Image Design").await;

        let res = app.get(&routes::contests_filtered("type=%25")).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn status_filter_is_exact() {
        let app = TestApp::spawn().await;
        let approved = app.create_contest("Approved", "Image Design").await;
        app.create_contest("Pending", "Image Design").await;
        let res = app.patch_empty(&routes::approve(&approved)).await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app
            .get(&routes::contests_filtered("status=approved"))
            .await;

        assert_eq!(res.status, 200);
        let items = res.body.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id"], approved.as_str());
    }

    #[tokio::test]
    async fn unknown_status_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::contests_filtered("status=archived")).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod contest_update {
    use super::*;

    #[tokio::test]
    async fn updates_only_named_fields() {
        let app = TestApp::spawn().await;
        let id = app.create_contest("Old Name", "Image Design").await;

        let res = app
            .patch(&routes::contest(&id), &json!({"name": "New Name", "price": 2500}))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["name"], "New Name");
        assert_eq!(res.body["price"], 2500);
        assert_eq!(res.body["contestType"], "Image Design");
        assert_eq!(res.body["status"], "pending");
    }

    #[tokio::test]
    async fn empty_patch_returns_contest_unchanged() {
        let app = TestApp::spawn().await;
        let id = app.create_contest("Stable", "Image Design").await;
        let before = app.get(&routes::contest(&id)).await;

        let res = app.patch(&routes::contest(&id), &json!({})).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["updatedAt"], before.body["updatedAt"]);
    }

    #[tokio::test]
    async fn lifecycle_fields_are_rejected() {
        let app = TestApp::spawn().await;
        let id = app.create_contest("Guarded", "Image Design").await;

        for body in [
            json!({"status": "approved"}),
            json!({"participantsCount": 10}),
            json!({"participants": []}),
            json!({"winner": {"userEmail": "a@b.c"}}),
        ] {
            let res = app.patch(&routes::contest(&id), &body).await;
            assert_eq!(res.status, 400, "body {body} should be rejected");
            assert_eq!(res.body["code"], "VALIDATION_ERROR");
        }

        let res = app.get(&routes::contest(&id)).await;
        assert_eq!(res.body["status"], "pending");
        assert_eq!(res.body["participantsCount"], 0);
    }

    #[tokio::test]
    async fn unknown_contest_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .patch(
                &routes::contest("0190a8f4-0000-7000-8000-000000000000"),
                &json!({"name": "x"}),
            )
            .await;

        assert_eq!(res.status, 404);
    }
}

mod contest_deletion {
    use super::*;

    #[tokio::test]
    async fn deletes_contest_and_its_participants() {
        let app = TestApp::spawn().await;
        let id = app.create_contest("Doomed", "Image Design").await;
        app.register(&id, "u1", "u1@example.com").await;
        let res = app
            .patch(
                &routes::submit_task(&id),
                &json!({
                    "userEmail": "u1@example.com",
                    "taskName": "Round 1",
                    "taskSubmission": "https://a.test/1",
                }),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app.delete(&routes::contest(&id)).await;
        assert_eq!(res.status, 204);

        let res = app.get(&routes::contest(&id)).await;
        assert_eq!(res.status, 404);

        let res = app.get(&routes::stats("u1@example.com")).await;
        assert_eq!(res.body["participated"], 0);

        let contest_id: Uuid = id.parse().unwrap();
        let participants = contest_participant::Entity::find()
            .filter(contest_participant::Column::ContestId.eq(contest_id))
            .count(&app.db)
            .await
            .expect("DB query failed");
        assert_eq!(participants, 0);
        let tasks = task_submission::Entity::find()
            .filter(task_submission::Column::ContestId.eq(contest_id))
            .count(&app.db)
            .await
            .expect("DB query failed");
        assert_eq!(tasks, 0);
    }

    #[tokio::test]
    async fn deleting_twice_is_not_found() {
        let app = TestApp::spawn().await;
        let id = app.create_contest("Once", "Image Design").await;

        assert_eq!(app.delete(&routes::contest(&id)).await.status, 204);
        let res = app.delete(&routes::contest(&id)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod liveness {
    use super::*;

    #[tokio::test]
    async fn root_reports_service_name() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::ROOT).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.text, "Contest Hub API");
    }
}
