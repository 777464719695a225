mod common;

use axum::http::StatusCode;
use common::{ALICE, BOB, CAROL, TestApp, body_json, question_set};
use serde_json::json;

#[tokio::test]
async fn readiness_counts_distinct_authors() {
    let app = TestApp::new().await;
    let room_id = app.create_room(&ALICE, BOB.email).await;
    app.accept(&BOB, room_id).await;

    let readiness_uri = format!("/readiness?room_id={room_id}&player_id=alice");
    let readiness = body_json(app.get(&readiness_uri, None).await).await;
    assert_eq!(readiness, json!({ "ready": false, "readyCount": 0, "totalPlayers": 2, "playerReady": false }));

    assert_eq!(app.submit_questions(&ALICE, room_id).await.status(), StatusCode::OK);
    // Resubmitting replaces the set instead of counting twice.
    assert_eq!(app.submit_questions(&ALICE, room_id).await.status(), StatusCode::OK);
    let readiness = body_json(app.get(&readiness_uri, None).await).await;
    assert_eq!(readiness["readyCount"], 1);
    assert_eq!(readiness["ready"], false);
    assert_eq!(readiness["playerReady"], true);

    assert_eq!(app.submit_questions(&BOB, room_id).await.status(), StatusCode::OK);
    let readiness = body_json(app.get(&format!("/readiness?room_id={room_id}"), None).await).await;
    assert_eq!(readiness, json!({ "ready": true, "readyCount": 2, "totalPlayers": 2 }));
}

#[tokio::test]
async fn question_set_must_have_five_complete_blocks() {
    let app = TestApp::new().await;
    let room_id = app.create_room(&ALICE, BOB.email).await;

    let mut body = question_set(room_id, "alice");
    body["questions"].as_array_mut().unwrap().pop();
    let resp = app.post_json("/questions", body, Some(&ALICE)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let mut body = question_set(room_id, "alice");
    body["questions"][2]["choice3"] = json!("   ");
    let resp = app.post_json("/questions", body, Some(&ALICE)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let mut body = question_set(room_id, "alice");
    body["questions"][0]["correct_choice"] = json!("choice5");
    let resp = app.post_json("/questions", body, Some(&ALICE)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn only_participants_author_questions() {
    let app = TestApp::new().await;
    let room_id = app.create_room(&ALICE, BOB.email).await;

    let resp = app.submit_questions(&CAROL, room_id).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = app
        .post_json("/questions", question_set(room_id, "alice"), None)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn question_sets_are_frozen_once_playing() {
    let app = TestApp::new().await;
    let room_id = app.playing_room().await;
    let resp = app.submit_questions(&ALICE, room_id).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn partner_questions_hide_the_correct_choice() {
    let app = TestApp::new().await;
    let room_id = app.create_room(&ALICE, BOB.email).await;

    // Without a partner there is nothing to guess yet.
    let uri = format!("/questions?room_id={room_id}&requester_id=alice");
    let body = body_json(app.get(&uri, None).await).await;
    assert_eq!(body["questions"], json!([]));

    app.accept(&BOB, room_id).await;
    app.submit_questions(&ALICE, room_id).await;

    let uri = format!("/questions?room_id={room_id}&requester_id=bob");
    let body = body_json(app.get(&uri, Some(&BOB)).await).await;
    let questions = body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 5);
    assert_eq!(questions[3]["question_id"], 3);
    assert_eq!(questions[3]["choice2"], "alice answer 3");
    assert!(questions[3].get("correct_choice").is_none());

    // Bob's own set is not there yet.
    let uri = format!("/questions?room_id={room_id}&requester_id=alice");
    let body = body_json(app.get(&uri, None).await).await;
    assert_eq!(body["questions"], json!([]));
}

#[tokio::test]
async fn partner_questions_check_the_requester() {
    let app = TestApp::new().await;
    let room_id = app.create_room(&ALICE, BOB.email).await;

    let uri = format!("/questions?room_id={room_id}&requester_id=carol");
    assert_eq!(app.get(&uri, None).await.status(), StatusCode::FORBIDDEN);

    let uri = format!("/questions?room_id={room_id}&requester_id=alice");
    assert_eq!(app.get(&uri, Some(&BOB)).await.status(), StatusCode::FORBIDDEN);

    let uri = format!("/questions?room_id={room_id}&requester_id=%20");
    assert_eq!(app.get(&uri, None).await.status(), StatusCode::BAD_REQUEST);

    let uri = format!("/questions?room_id={}&requester_id=alice", uuid::Uuid::new_v4());
    assert_eq!(app.get(&uri, None).await.status(), StatusCode::NOT_FOUND);
}
