/// Integration tests for the task endpoints
///
/// Requests go through the full router (auth layer, extractors, error
/// mapping) backed by the in-memory store.

mod common;

use axum::http::{Method, StatusCode};
use common::TestContext;
use serde_json::json;

#[tokio::test]
async fn test_owner_can_update_but_others_cannot() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .post(
            "/api/tasks/alice",
            Some(&ctx.alice_token),
            json!({"name": "Design", "start": "2025-02-01", "end": "2025-02-10"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Task created successfully");
    assert_eq!(body["task"]["owner"], "Alice");
    assert_eq!(body["task"]["progress"], 0);
    assert_eq!(body["task"]["color"], "#0288d1");
    let id = body["task"]["id"].as_i64().unwrap();

    let (status, body) = ctx
        .put(
            &format!("/api/tasks/bob/{}", id),
            Some(&ctx.bob_token),
            json!({"progress": 50}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());

    let (status, body) = ctx
        .put(
            &format!("/api/tasks/alice/{}", id),
            Some(&ctx.alice_token),
            json!({"progress": 50}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Task updated successfully");
    assert_eq!(body["task"]["progress"], 50);
    assert_eq!(body["task"]["name"], "Design");
}

#[tokio::test]
async fn test_token_decides_actor_over_path_user() {
    let ctx = TestContext::new().await;
    let id = ctx.alice_task("Design").await;

    // bob addresses the task under alice's name
    let (status, _) = ctx
        .put(
            &format!("/api/tasks/alice/{}", id),
            Some(&ctx.bob_token),
            json!({"progress": 90}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .delete(&format!("/api/tasks/alice/{}", id), Some(&ctx.bob_token))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, tasks) = ctx.get("/api/tasks/alice", None).await;
    assert_eq!(tasks[0]["progress"], 0);
}

#[tokio::test]
async fn test_unknown_task_is_not_found_and_foreign_task_is_forbidden() {
    let ctx = TestContext::new().await;
    let id = ctx.alice_task("Design").await;

    let (status, _) = ctx
        .put("/api/tasks/bob/9999", Some(&ctx.bob_token), json!({"progress": 10}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .put(
            &format!("/api/tasks/bob/{}", id),
            Some(&ctx.bob_token),
            json!({"progress": 10}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx.delete("/api/tasks/bob/9999", Some(&ctx.bob_token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_twice() {
    let ctx = TestContext::new().await;
    let id = ctx.alice_task("Review").await;
    let uri = format!("/api/tasks/alice/{}", id);

    let (status, body) = ctx.delete(&uri, Some(&ctx.alice_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Task deleted successfully");
    assert_eq!(body["deletedTask"], json!({"id": id, "name": "Review"}));

    let (status, _) = ctx.delete(&uri, Some(&ctx.alice_token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, tasks) = ctx.get("/api/tasks/alice", None).await;
    assert_eq!(tasks, json!([]));
}

#[tokio::test]
async fn test_empty_update_is_rejected_and_row_unchanged() {
    let ctx = TestContext::new().await;
    let id = ctx.alice_task("Design").await;

    let (_, before) = ctx.get("/api/tasks/alice", None).await;

    let (status, body) = ctx
        .put(&format!("/api/tasks/alice/{}", id), Some(&ctx.alice_token), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No fields to update");

    let (_, after) = ctx.get("/api/tasks/alice", None).await;
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_create_validation() {
    let ctx = TestContext::new().await;
    let token = Some(ctx.alice_token.as_str());

    let (status, body) = ctx
        .post("/api/tasks/alice", token, json!({"name": "Design", "start": "2025-02-01"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name, start date, and end date are required");

    let (status, _) = ctx
        .post(
            "/api/tasks/alice",
            token,
            json!({"name": "Design", "start": "2025-02-10", "end": "2025-02-01"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .post(
            "/api/tasks/alice",
            token,
            json!({"name": "Design", "start": "tomorrow", "end": "2025-02-01"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, tasks) = ctx.get("/api/tasks/alice", None).await;
    assert_eq!(tasks, json!([]));
}

#[tokio::test]
async fn test_update_cannot_reverse_dates() {
    let ctx = TestContext::new().await;
    let id = ctx.alice_task("Design").await;

    let (status, _) = ctx
        .put(
            &format!("/api/tasks/alice/{}", id),
            Some(&ctx.alice_token),
            json!({"end": "2025-01-15"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_task_id_is_bad_request() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx
        .put("/api/tasks/alice/abc", Some(&ctx.alice_token), json!({"progress": 5}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cannot_create_for_someone_else() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx
        .post(
            "/api/tasks/bob",
            Some(&ctx.alice_token),
            json!({"name": "Sneaky", "start": "2025-02-01", "end": "2025-02-02"}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, tasks) = ctx.get("/api/tasks/bob", None).await;
    assert_eq!(tasks, json!([]));
}

#[tokio::test]
async fn test_closed_mode_requires_credentials() {
    let ctx = TestContext::new().await;
    let id = ctx.alice_task("Design").await;

    let (status, _) = ctx
        .post(
            "/api/tasks/alice",
            None,
            json!({"name": "Anon", "start": "2025-02-01", "end": "2025-02-02"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .put(&format!("/api/tasks/alice/{}", id), None, json!({"progress": 10}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .put(
            &format!("/api/tasks/{}", id),
            None,
            json!({"currentUser": "alice", "progress": 10}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_token_is_rejected_even_on_reads() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("/api/tasks", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_listing_order_and_owner_names() {
    let ctx = TestContext::new().await;

    for (name, start) in [("Later", "2025-03-01"), ("Sooner", "2025-01-01")] {
        let (status, _) = ctx
            .post(
                "/api/tasks/alice",
                Some(&ctx.alice_token),
                json!({"name": name, "start": start, "end": "2025-03-31"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, _) = ctx
        .post(
            "/api/tasks/bob",
            Some(&ctx.bob_token),
            json!({"name": "Bob's", "start": "2025-02-01", "end": "2025-02-02"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, all) = ctx.get("/api/tasks", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Sooner", "Bob's", "Later"]);
    assert_eq!(all[0]["owner"], "Alice");
    assert_eq!(all[1]["owner"], "bob");
    assert_eq!(all[0]["start"], "2025-01-01");
    assert!(all[0]["createdAt"].is_string());

    // display names work as path identifiers
    let (status, alice_tasks) = ctx.get("/api/tasks/Alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(alice_tasks.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("/api/tasks/nobody", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn test_create_for_caller() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .post(
            "/api/tasks",
            Some(&ctx.bob_token),
            json!({"name": "Mine", "start": "2025-02-01", "end": "2025-02-02"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["task"]["owner"], "bob");

    let (status, _) = ctx
        .post(
            "/api/tasks",
            Some(&ctx.bob_token),
            json!({"name": "Yours", "start": "2025-02-01", "end": "2025-02-02", "owner": "alice"}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .post(
            "/api/tasks",
            None,
            json!({"name": "Anon", "start": "2025-02-01", "end": "2025-02-02", "owner": "bob"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_open_mode_trusts_named_user() {
    let ctx = TestContext::open().await;

    let (status, body) = ctx
        .post(
            "/api/tasks",
            None,
            json!({"name": "Planning", "start": "2025-02-01", "end": "2025-02-05", "owner": "Alice"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["task"]["owner"], "Alice");
    let id = body["task"]["id"].as_i64().unwrap();

    let (status, _) = ctx
        .put(&format!("/api/tasks/bob/{}", id), None, json!({"progress": 20}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx
        .put(&format!("/api/tasks/alice/{}", id), None, json!({"progress": 20}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["progress"], 20);
}

#[tokio::test]
async fn test_open_mode_legacy_routes() {
    let ctx = TestContext::open().await;
    let id = ctx.alice_task("Legacy").await;
    let uri = format!("/api/tasks/{}", id);

    let (status, body) = ctx
        .put(&uri, None, json!({"currentUser": "Alice", "progress": 30}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["progress"], 30);

    let (status, _) = ctx
        .put(&uri, None, json!({"currentUser": "bob", "progress": 40}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx
        .put(&uri, None, json!({"currentUser": "alice", "owner": "bob", "progress": 40}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Task owner cannot be changed");

    let (status, body) = ctx.put(&uri, None, json!({"progress": 40})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "currentUser is required");

    let (status, _) = ctx
        .send(Method::DELETE, &uri, None, Some(json!({"currentUser": "bob"})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx
        .send(Method::DELETE, &uri, None, Some(json!({"currentUser": "alice"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedTask"]["name"], "Legacy");
}

#[tokio::test]
async fn test_legacy_routes_with_token() {
    let ctx = TestContext::new().await;
    let id = ctx.alice_task("Legacy").await;
    let uri = format!("/api/tasks/{}", id);

    let (status, _) = ctx.put(&uri, Some(&ctx.bob_token), json!({"progress": 60})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx.put(&uri, Some(&ctx.alice_token), json!({"progress": 60})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = ctx.delete(&uri, Some(&ctx.alice_token)).await;
    assert_eq!(status, StatusCode::OK);
}
