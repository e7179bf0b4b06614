use crate::common::{TestApp, routes};
use futures::future::join_all;
use serde_json::json;

fn register_body(user_id: &str, email: &str) -> serde_json::Value {
    json!({
        "userId": user_id,
        "userName": format!("User {user_id}"),
        "userEmail": email,
    })
}

fn task_body(email: &str, task: &str, submission: &str) -> serde_json::Value {
    json!({
        "userEmail": email,
        "taskName": task,
        "taskSubmission": submission,
    })
}

mod transitions {
    use super::*;

    #[tokio::test]
    async fn approve_moves_pending_to_approved() {
        let app = TestApp::spawn().await;
        let id = app.create_contest("Logo", "Image Design").await;

        let res = app.patch_empty(&routes::approve(&id)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], "approved");
    }

    #[tokio::test]
    async fn reject_moves_pending_to_rejected() {
        let app = TestApp::spawn().await;
        let id = app.create_contest("Logo", "Image Design").await;

        let res = app.patch_empty(&routes::reject(&id)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], "rejected");
    }

    #[tokio::test]
    async fn approving_twice_is_a_no_op() {
        let app = TestApp::spawn().await;
        let id = app.create_contest("Logo", "Image Design").await;
        let first = app.patch_empty(&routes::approve(&id)).await;

        let second = app.patch_empty(&routes::approve(&id)).await;

        assert_eq!(second.status, 200);
        assert_eq!(second.body["status"], "approved");
        assert_eq!(second.body["updatedAt"], first.body["updatedAt"]);
    }

    #[tokio::test]
    async fn rejected_contest_cannot_be_approved() {
        let app = TestApp::spawn().await;
        let id = app.create_contest("Logo", "Image Design").await;
        app.patch_empty(&routes::reject(&id)).await;

        let res = app.patch_empty(&routes::approve(&id)).await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "INVALID_TRANSITION");
        assert_eq!(
            res.body["message"],
            "Contest was already rejected; cannot move it to approved"
        );
        let res = app.get(&routes::contest(&id)).await;
        assert_eq!(res.body["status"], "rejected");
    }

    #[tokio::test]
    async fn approved_contest_cannot_be_rejected() {
        let app = TestApp::spawn().await;
        let id = app.create_contest("Logo", "Image Design").await;
        app.patch_empty(&routes::approve(&id)).await;

        let res = app.patch_empty(&routes::reject(&id)).await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "INVALID_TRANSITION");
    }

    #[tokio::test]
    async fn approving_unknown_contest_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .patch_empty(&routes::approve("0190a8f4-0000-7000-8000-000000000000"))
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn approving_malformed_id_is_invalid() {
        let app = TestApp::spawn().await;

        let res = app.patch_empty(&routes::approve("abc")).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "INVALID_ID");
    }
}

mod registration {
    use super::*;

    #[tokio::test]
    async fn appends_participant_and_increments_count() {
        let app = TestApp::spawn().await;
        let id = app.create_contest("Logo", "Image Design").await;

        let res = app.register(&id, "u1", "u1@example.com").await;

        assert_eq!(res.body["participantsCount"], 1);
        let participants = res.body["participants"].as_array().unwrap();
        assert_eq!(participants.len(), 1);
        assert_eq!(participants[0]["userId"], "u1");
        assert_eq!(participants[0]["userEmail"], "u1@example.com");
        assert!(participants[0]["registeredAt"].as_str().is_some());
    }

    #[tokio::test]
    async fn participants_keep_registration_order() {
        let app = TestApp::spawn().await;
        let id = app.create_contest("Logo", "Image Design").await;
        app.register(&id, "u1", "u1@example.com").await;
        app.register(&id, "u2", "u2@example.com").await;

        let res = app.register(&id, "u3", "u3@example.com").await;

        let ids: Vec<&str> = res.body["participants"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["userId"].as_str().unwrap())
            .collect();
        assert_eq!(ids, ["u1", "u2", "u3"]);
        assert_eq!(res.body["participantsCount"], 3);
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected_without_side_effects() {
        let app = TestApp::spawn().await;
        let id = app.create_contest("Logo", "Image Design").await;
        app.register(&id, "u1", "u1@example.com").await;

        let res = app
            .patch(&routes::register(&id), &register_body("u1", "u1@example.com"))
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "DUPLICATE_REGISTRATION");
        let res = app.get(&routes::contest(&id)).await;
        assert_eq!(res.body["participantsCount"], 1);
        assert_eq!(res.body["participants"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blank_user_id_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let id = app.create_contest("Logo", "Image Design").await;

        let res = app
            .patch(&routes::register(&id), &register_body("  ", "u1@example.com"))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn blank_email_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let id = app.create_contest("Logo", "Image Design").await;

        let res = app
            .patch(&routes::register(&id), &register_body("u1", ""))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unknown_contest_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .patch(
                &routes::register("0190a8f4-0000-7000-8000-000000000000"),
                &register_body("u1", "u1@example.com"),
            )
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn concurrent_registrations_keep_count_consistent() {
        let app = TestApp::spawn().await;
        let id = app.create_contest("Busy", "Image Design").await;

        let bodies: Vec<_> = (0..8)
            .map(|i| register_body(&format!("user-{i}"), &format!("user{i}@example.com")))
            .collect();
        let path = routes::register(&id);
        let results = join_all(bodies.iter().map(|b| app.patch(&path, b))).await;

        for res in &results {
            assert_eq!(res.status, 200, "{}", res.text);
        }
        let res = app.get(&routes::contest(&id)).await;
        assert_eq!(res.body["participantsCount"], 8);
        assert_eq!(res.body["participants"].as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn concurrent_duplicates_register_exactly_once() {
        let app = TestApp::spawn().await;
        let id = app.create_contest("Race", "Image Design").await;

        let body = register_body("same-user", "same@example.com");
        let path = routes::register(&id);
        let results = join_all((0..6).map(|_| app.patch(&path, &body))).await;

        let ok = results.iter().filter(|r| r.status == 200).count();
        let conflicts = results.iter().filter(|r| r.status == 409).count();
        assert_eq!(ok, 1);
        assert_eq!(conflicts, 5);
        let res = app.get(&routes::contest(&id)).await;
        assert_eq!(res.body["participantsCount"], 1);
    }
}

mod task_submission {
    use super::*;

    #[tokio::test]
    async fn stores_submission_under_task_name() {
        let app = TestApp::spawn().await;
        let id = app.create_contest("Logo", "Image Design").await;

        let res = app
            .patch(
                &routes::submit_task(&id),
                &task_body("u1@example.com", "Round 1", "https://a.test/1"),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let entries = res.body["tasks"]["Round 1"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["userEmail"], "u1@example.com");
        assert_eq!(entries[0]["taskSubmission"], "https://a.test/1");
    }

    #[tokio::test]
    async fn resubmission_replaces_and_keeps_slot() {
        let app = TestApp::spawn().await;
        let id = app.create_contest("Logo", "Image Design").await;
        let path = routes::submit_task(&id);
        app.patch(&path, &task_body("u1@example.com", "Round 1", "first"))
            .await;
        app.patch(&path, &task_body("u2@example.com", "Round 1", "other"))
            .await;

        let res = app
            .patch(&path, &task_body("U1@Example.com", "Round 1", "second"))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let entries = res.body["tasks"]["Round 1"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["userEmail"], "u1@example.com");
        assert_eq!(entries[0]["taskSubmission"], "second");
        assert_eq!(entries[1]["userEmail"], "u2@example.com");
    }

    #[tokio::test]
    async fn separate_tasks_are_separate_keys() {
        let app = TestApp::spawn().await;
        let id = app.create_contest("Logo", "Image Design").await;
        let path = routes::submit_task(&id);
        app.patch(&path, &task_body("u1@example.com", "Round 1", "a"))
            .await;

        let res = app
            .patch(&path, &task_body("u1@example.com", "Round 2", "b"))
            .await;

        assert_eq!(res.body["tasks"]["Round 1"].as_array().unwrap().len(), 1);
        assert_eq!(res.body["tasks"]["Round 2"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blank_fields_are_validation_errors() {
        let app = TestApp::spawn().await;
        let id = app.create_contest("Logo", "Image Design").await;
        let path = routes::submit_task(&id);

        for body in [
            task_body("", "Round 1", "x"),
            task_body("u1@example.com", " ", "x"),
            task_body("u1@example.com", "Round 1", ""),
        ] {
            let res = app.patch(&path, &body).await;
            assert_eq!(res.status, 400, "body {body} should be rejected");
            assert_eq!(res.body["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn concurrent_submissions_from_distinct_users_are_all_kept() {
        let app = TestApp::spawn().await;
        let id = app.create_contest("Busy", "Image Design").await;

        let bodies: Vec<_> = (0..8)
            .map(|i| task_body(&format!("user{i}@example.com"), "Round 1", &format!("entry-{i}")))
            .collect();
        let path = routes::submit_task(&id);
        let results = join_all(bodies.iter().map(|b| app.patch(&path, b))).await;

        for res in &results {
            assert_eq!(res.status, 200, "{}", res.text);
        }
        let res = app.get(&routes::contest(&id)).await;
        let entries = res.body["tasks"]["Round 1"].as_array().unwrap();
        assert_eq!(entries.len(), 8);
        for i in 0..8 {
            let email = format!("user{i}@example.com");
            let entry = entries
                .iter()
                .find(|e| e["userEmail"] == email.as_str())
                .unwrap_or_else(|| panic!("missing entry for {email}"));
            assert_eq!(entry["taskSubmission"], format!("entry-{i}").as_str());
        }
    }

    #[tokio::test]
    async fn concurrent_resubmissions_leave_one_entry() {
        let app = TestApp::spawn().await;
        let id = app.create_contest("Race", "Image Design").await;

        let submissions: Vec<String> = (0..6).map(|i| format!("draft-{i}")).collect();
        let bodies: Vec<_> = submissions
            .iter()
            .map(|s| task_body("same@example.com", "Round 1", s))
            .collect();
        let path = routes::submit_task(&id);
        let results = join_all(bodies.iter().map(|b| app.patch(&path, b))).await;

        for res in &results {
            assert_eq!(res.status, 200, "{}", res.text);
        }
        let res = app.get(&routes::contest(&id)).await;
        let entries = res.body["tasks"]["Round 1"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["userEmail"], "same@example.com");
        let stored = entries[0]["taskSubmission"].as_str().unwrap();
        assert!(
            submissions.iter().any(|s| s == stored),
            "unexpected submission {stored}"
        );
    }

    #[tokio::test]
    async fn unknown_contest_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .patch(
                &routes::submit_task("0190a8f4-0000-7000-8000-000000000000"),
                &task_body("u1@example.com", "Round 1", "x"),
            )
            .await;

        assert_eq!(res.status, 404);
    }
}

mod winner {
    use super::*;

    #[tokio::test]
    async fn sets_winner_record() {
        let app = TestApp::spawn().await;
        let id = app.create_contest("Logo", "Image Design").await;

        let res = app
            .patch(
                &routes::winner(&id),
                &json!({"userEmail": "u1@example.com", "position": 1, "reward": 50000}),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["winner"]["userEmail"], "u1@example.com");
        assert_eq!(res.body["winner"]["position"], 1);
        assert_eq!(res.body["winner"]["reward"], 50000);
        assert!(res.body["winner"]["selectedAt"].as_str().is_some());
    }

    #[tokio::test]
    async fn last_write_wins() {
        let app = TestApp::spawn().await;
        let id = app.create_contest("Logo", "Image Design").await;
        let path = routes::winner(&id);
        app.patch(
            &path,
            &json!({"userEmail": "u1@example.com", "position": 1, "reward": 100}),
        )
        .await;

        let res = app
            .patch(
                &path,
                &json!({"userEmail": "u2@example.com", "position": 1, "reward": 200}),
            )
            .await;

        assert_eq!(res.body["winner"]["userEmail"], "u2@example.com");
        assert_eq!(res.body["winner"]["reward"], 200);
    }

    #[tokio::test]
    async fn invalid_position_or_reward_is_rejected() {
        let app = TestApp::spawn().await;
        let id = app.create_contest("Logo", "Image Design").await;
        let path = routes::winner(&id);

        for body in [
            json!({"userEmail": "u1@example.com", "position": 0, "reward": 10}),
            json!({"userEmail": "u1@example.com", "position": 1, "reward": -5}),
            json!({"userEmail": " ", "position": 1, "reward": 10}),
        ] {
            let res = app.patch(&path, &body).await;
            assert_eq!(res.status, 400, "body {body} should be rejected");
        }
        let res = app.get(&routes::contest(&id)).await;
        assert!(res.body["winner"].is_null());
    }
}

mod stats {
    use super::*;

    #[tokio::test]
    async fn counts_participations_and_wins() {
        let app = TestApp::spawn().await;
        let a = app.create_contest("A", "Image Design").await;
        let b = app.create_contest("B", "Image Design").await;
        let c = app.create_contest("C", "Image Design").await;
        for id in [&a, &b, &c] {
            app.register(id, "u1", "u1@example.com").await;
        }
        app.register(&a, "u2", "u2@example.com").await;
        app.patch(
            &routes::winner(&b),
            &json!({"userEmail": "u1@example.com", "position": 1, "reward": 10}),
        )
        .await;

        let res = app.get(&routes::stats("u1@example.com")).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["participated"], 3);
        assert_eq!(res.body["won"], 1);

        let res = app.get(&routes::stats("u2@example.com")).await;
        assert_eq!(res.body["participated"], 1);
        assert_eq!(res.body["won"], 0);
    }

    #[tokio::test]
    async fn unknown_email_has_zero_counts() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::stats("nobody@example.com")).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["participated"], 0);
        assert_eq!(res.body["won"], 0);
    }

    #[tokio::test]
    async fn missing_email_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app.get("/contest-stats").await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod end_to_end {
    use super::*;

    #[tokio::test]
    async fn full_contest_flow() {
        let app = TestApp::spawn().await;
        let id = app.create_contest("Logo Sprint", "Image Design").await;

        let res = app.patch_empty(&routes::approve(&id)).await;
        assert_eq!(res.body["status"], "approved");

        let res = app.register(&id, "u1", "u1@example.com").await;
        assert_eq!(res.body["participantsCount"], 1);

        let res = app
            .patch(&routes::register(&id), &register_body("u1", "u1@example.com"))
            .await;
        assert_eq!(res.status, 409);

        let res = app.register(&id, "u2", "u2@example.com").await;
        assert_eq!(res.body["participantsCount"], 2);
        let participants: Vec<(&str, &str)> = res.body["participants"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| {
                (
                    p["userId"].as_str().unwrap(),
                    p["userEmail"].as_str().unwrap(),
                )
            })
            .collect();
        assert_eq!(
            participants,
            [("u1", "u1@example.com"), ("u2", "u2@example.com")]
        );

        let path = routes::submit_task(&id);
        app.patch(&path, &task_body("u1@example.com", "T", "a"))
            .await;
        let res = app
            .patch(&path, &task_body("u1@example.com", "T", "b"))
            .await;
        let entries = res.body["tasks"]["T"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["taskSubmission"], "b");

        let res = app
            .patch(
                &routes::winner(&id),
                &json!({"userEmail": "u1@example.com", "position": 1, "reward": 100}),
            )
            .await;
        assert_eq!(res.status, 200);

        let res = app.get(&routes::stats("u1@example.com")).await;
        assert_eq!(res.body["participated"], 1);
        assert_eq!(res.body["won"], 1);
    }
}
