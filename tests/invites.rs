mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{ALICE, BOB, CAROL, FaultyStore, TestApp, User, body_json};
use serde_json::json;

#[tokio::test]
async fn accepting_binds_partner_and_clears_pending_invite() {
    let app = TestApp::new().await;
    let room_id = app.create_room(&ALICE, BOB.email).await;

    let resp = app.accept(&BOB, room_id).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["room_id"], room_id.to_string());

    let resp = app.get(&format!("/rooms/{room_id}"), Some(&BOB)).await;
    let detail = body_json(resp).await;
    assert_eq!(detail["room"]["partner_id"], "bob");
    assert_eq!(detail["room"]["status"], "waiting");
    assert_eq!(detail["phase"], "authoring");

    let dashboard = body_json(app.get("/dashboard", Some(&BOB)).await).await;
    assert!(dashboard["invites"].as_array().unwrap().is_empty());
    let rooms = dashboard["rooms"].as_array().unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0]["id"], room_id.to_string());
}

#[tokio::test]
async fn concurrent_acceptances_bind_exactly_one_partner() {
    // Both acceptances read the room before either claims the partner slot.
    let app = TestApp::with_store(Arc::new(FaultyStore::gating_invite_lookups(2))).await;
    let room_id = app.create_room(&ALICE, BOB.email).await;
    let bob_phone = User {
        id: "bob-phone",
        email: BOB.email,
    };

    let (first, second) = tokio::join!(app.accept(&BOB, room_id), app.accept(&bob_phone, room_id));
    let mut statuses = [first.status(), second.status()];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::BAD_REQUEST]);

    let loser = if first.status() == StatusCode::OK { second } else { first };
    assert_eq!(body_json(loser).await["error"], "room already has a partner");

    let detail = body_json(app.get(&format!("/rooms/{room_id}"), Some(&ALICE)).await).await;
    let partner = detail["room"]["partner_id"].as_str().unwrap();
    assert!(partner == "bob" || partner == "bob-phone");
}

#[tokio::test]
async fn accept_requires_matching_invite_email() {
    let app = TestApp::new().await;
    let room_id = app.create_room(&ALICE, BOB.email).await;

    let resp = app.accept(&CAROL, room_id).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app
        .post_json(
            "/invites/accept",
            json!({ "room_id": room_id }),
            None,
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .accept(&BOB, uuid::Uuid::new_v4())
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn creator_cannot_accept_own_invite() {
    let app = TestApp::new().await;
    let room_id = app.create_room(&ALICE, ALICE.email).await;
    let resp = app.accept(&ALICE, room_id).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn second_acceptance_conflicts() {
    let app = TestApp::new().await;
    let room_id = app.create_room(&ALICE, BOB.email).await;
    assert_eq!(app.accept(&BOB, room_id).await.status(), StatusCode::OK);
    assert_eq!(app.accept(&BOB, room_id).await.status(), StatusCode::BAD_REQUEST);
}
