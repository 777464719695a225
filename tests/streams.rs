mod common;

use axum::http::StatusCode;
use common::{ALICE, BOB, CAROL, TestApp, body_json};
use http_body_util::BodyExt;

#[tokio::test]
async fn room_stream_starts_with_handshake() {
    let app = TestApp::new().await;
    let room_id = app.create_room(&ALICE, BOB.email).await;

    let resp = app.get(&format!("/sse/rooms/{room_id}"), Some(&ALICE)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers()["content-type"].to_str().unwrap().to_owned();
    assert!(content_type.starts_with("text/event-stream"));

    let mut body = resp.into_body();
    let frame = body.frame().await.unwrap().unwrap();
    let text = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();
    assert!(text.contains("event: handshake"));
    assert!(text.contains(&room_id.to_string()));
}

#[tokio::test]
async fn room_stream_is_for_participants_only() {
    let app = TestApp::new().await;
    let room_id = app.create_room(&ALICE, BOB.email).await;

    let resp = app.get(&format!("/sse/rooms/{room_id}"), Some(&CAROL)).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = app.get(&format!("/sse/rooms/{room_id}"), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn openapi_document_lists_room_routes() {
    let app = TestApp::new().await;
    let resp = app.get("/api-doc/openapi.json", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let doc = body_json(resp).await;
    assert!(doc["paths"]["/rooms/{id}/start"]["post"].is_object());
    assert!(doc["paths"]["/readiness"]["get"].is_object());
}
