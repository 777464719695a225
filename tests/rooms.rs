mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{ALICE, BOB, CAROL, FaultyStore, TestApp, body_json};
use serde_json::json;

#[tokio::test]
async fn created_room_waits_for_partner_with_one_pending_invite() {
    let app = TestApp::new().await;
    let room_id = app.create_room(&ALICE, "Bob@Example.com ").await;

    let resp = app.get(&format!("/rooms/{room_id}"), Some(&ALICE)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let detail = body_json(resp).await;
    assert_eq!(detail["room"]["status"], "waiting");
    assert_eq!(detail["room"]["name"], "Our Game");
    assert!(detail["room"]["partner_id"].is_null());
    assert_eq!(detail["phase"], "awaiting_partner");
    assert_eq!(detail["readiness"]["readyCount"], 0);

    let resp = app.get("/dashboard", Some(&BOB)).await;
    let dashboard = body_json(resp).await;
    let invites = dashboard["invites"].as_array().unwrap();
    assert_eq!(invites.len(), 1);
    assert_eq!(invites[0]["room_id"], room_id.to_string());
    assert_eq!(invites[0]["invitee_email"], "bob@example.com");
    assert_eq!(invites[0]["status"], "pending");
}

#[tokio::test]
async fn create_room_rejects_bad_input() {
    let app = TestApp::new().await;

    let resp = app
        .post_json("/rooms", json!({ "partner_email": "bob@example.com" }), None)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .post_json(
            "/rooms",
            json!({ "creator_id": "alice", "partner_email": "not-an-email" }),
            None,
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(resp).await["error"].is_string());
}

#[tokio::test]
async fn create_room_rejects_creator_mismatch() {
    let app = TestApp::new().await;
    let resp = app
        .post_json(
            "/rooms",
            json!({ "creator_id": "alice", "partner_email": "bob@example.com" }),
            Some(&CAROL),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn failed_invite_surfaces_room_id_and_leaves_the_room() {
    let app = TestApp::with_store(Arc::new(FaultyStore::failing_invite_inserts())).await;
    let resp = app
        .post_json(
            "/rooms",
            json!({ "name": "Anniversary", "creator_id": "alice", "partner_email": "bob@example.com" }),
            Some(&ALICE),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "room created but invite failed");
    let room_id = body["room_id"].as_str().unwrap().to_owned();

    let resp = app.get(&format!("/rooms/{room_id}"), Some(&ALICE)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let detail = body_json(resp).await;
    assert_eq!(detail["room"]["name"], "Anniversary");
    assert_eq!(detail["room"]["status"], "waiting");
}

#[tokio::test]
async fn room_detail_requires_identity_and_participation() {
    let app = TestApp::new().await;
    let room_id = app.create_room(&ALICE, BOB.email).await;

    let resp = app.get(&format!("/rooms/{room_id}"), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app.get(&format!("/rooms/{room_id}"), Some(&CAROL)).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = app
        .get(&format!("/rooms/{}", uuid::Uuid::new_v4()), Some(&ALICE))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn start_requires_creator_and_both_question_sets() {
    let app = TestApp::new().await;
    let room_id = app.create_room(&ALICE, BOB.email).await;

    // No partner yet.
    assert_eq!(app.start(&ALICE, room_id).await.status(), StatusCode::BAD_REQUEST);

    app.accept(&BOB, room_id).await;
    app.submit_questions(&ALICE, room_id).await;
    let resp = app.start(&ALICE, room_id).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(
        body_json(resp).await["error"]
            .as_str()
            .unwrap()
            .contains("1/2 ready")
    );

    app.submit_questions(&BOB, room_id).await;
    assert_eq!(app.start(&BOB, room_id).await.status(), StatusCode::FORBIDDEN);

    let resp = app.start(&ALICE, room_id).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let detail = body_json(resp).await;
    assert_eq!(detail["room"]["status"], "playing");
    assert_eq!(detail["phase"], "playing");

    // Starting twice is a precondition failure, not a silent success.
    assert_eq!(app.start(&ALICE, room_id).await.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn resend_invite_reuses_pending_invite() {
    let app = TestApp::new().await;
    let room_id = app.create_room(&ALICE, BOB.email).await;
    let uri = format!("/rooms/{room_id}/invite");

    let resp = app
        .post_json(&uri, json!({ "partner_email": "BOB@example.com" }), Some(&ALICE))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let first = body_json(resp).await;

    let resp = app
        .post_json(&uri, json!({ "partner_email": "bob@example.com" }), Some(&ALICE))
        .await;
    let second = body_json(resp).await;
    assert_eq!(first["id"], second["id"]);

    let resp = app
        .post_json(&uri, json!({ "partner_email": "bob@example.com" }), Some(&BOB))
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    app.accept(&BOB, room_id).await;
    let resp = app
        .post_json(&uri, json!({ "partner_email": "carol@example.com" }), Some(&ALICE))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn degraded_app_reports_service_unavailable() {
    let app = TestApp::degraded();

    let resp = app.get("/healthcheck", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["status"], "degraded");

    let resp = app
        .post_json(
            "/rooms",
            json!({ "creator_id": "alice", "partner_email": "bob@example.com" }),
            None,
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn healthcheck_is_ok_with_a_store() {
    let app = TestApp::new().await;
    let resp = app.get("/healthcheck", None).await;
    assert_eq!(body_json(resp).await["status"], "ok");
}
