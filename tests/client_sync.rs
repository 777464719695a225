//! Full game driven over HTTP by two clients that only learn about each other through polling.

use std::{sync::Arc, time::Duration};

use partner_quiz_back::{
    auth::Identity,
    build_app,
    config::AppConfig,
    dao::{models::RoomStatus, room_store::memory::MemoryRoomStore},
    dto::{
        answer::SubmitAnswerRequest,
        question::{QuestionInput, SubmitQuestionsRequest},
        room::CreateRoomRequest,
    },
    state::{AppState, RoomPhase},
    sync::{PollingRoomUpdates, Poller, QuizClient, wait_for},
};
use reqwest::StatusCode;
use tokio::net::TcpListener;
use uuid::Uuid;

async fn spawn_server() -> String {
    let state = AppState::with_store(AppConfig::default(), Arc::new(MemoryRoomStore::new())).await;
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_app(state).into_make_service())
            .await
            .unwrap();
    });
    format!("http://{addr}")
}

fn questions(room_id: Uuid, author: &str) -> SubmitQuestionsRequest {
    SubmitQuestionsRequest {
        room_id,
        questions: (0..5)
            .map(|slot| QuestionInput {
                question: format!("{author} question {slot}"),
                choice1: "Red".into(),
                choice2: "Blue".into(),
                choice3: "Green".into(),
                choice4: format!("{author} {slot}"),
                correct_choice: "choice4".into(),
            })
            .collect(),
    }
}

#[tokio::test]
async fn two_clients_play_a_full_game_by_polling() {
    let base_url = spawn_server().await;
    let anonymous = QuizClient::new(&base_url).unwrap();
    let alice = anonymous.acting_as(Identity::new("alice", Some("alice@example.com".into())));
    let bob = anonymous.acting_as(Identity::new("bob", Some("bob@example.com".into())));
    let poller = Poller::new(Duration::from_millis(20), Duration::from_secs(1));

    let game = async {
        let room_id = alice
            .create_room(&CreateRoomRequest {
                name: Some("Date night".into()),
                creator_id: "alice".into(),
                partner_email: "bob@example.com".into(),
            })
            .await
            .unwrap()
            .room_id;

        let dashboard = bob.wait_for_invite(&poller, room_id).await;
        assert_eq!(dashboard.invites[0].room.as_ref().unwrap().name, "Date night");

        let updates = PollingRoomUpdates::new(Arc::new(alice.clone()), poller);
        let (joined, accepted) = tokio::join!(
            wait_for(&updates, room_id, |signal| signal.partner_joined),
            bob.accept_invite(room_id),
        );
        accepted.unwrap();
        assert_eq!(joined.unwrap().phase(), RoomPhase::Authoring);

        alice.submit_questions(&questions(room_id, "alice")).await.unwrap();
        bob.submit_questions(&questions(room_id, "bob")).await.unwrap();
        let readiness = alice.wait_until_ready(&poller, room_id).await;
        assert_eq!(readiness.ready_count, 2);

        let err = bob.start_game(room_id).await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        alice.start_game(room_id).await.unwrap();
        let detail = bob.wait_for_status(&poller, room_id, RoomStatus::Playing).await;
        assert_eq!(detail.phase, RoomPhase::Playing);

        let to_guess = bob.partner_questions(room_id).await.unwrap().questions;
        assert_eq!(to_guess.len(), 5);
        for question in &to_guess {
            let answered = bob
                .submit_answer(&SubmitAnswerRequest {
                    room_id,
                    question_id: question.question_id,
                    answer_text: question.choice4.clone(),
                })
                .await
                .unwrap();
            assert!(answered.is_correct);
        }
        for slot in 0..5 {
            alice
                .submit_answer(&SubmitAnswerRequest {
                    room_id,
                    question_id: slot,
                    answer_text: " blue ".into(),
                })
                .await
                .unwrap();
        }

        let detail = bob.wait_for_status(&poller, room_id, RoomStatus::Finished).await;
        assert_eq!(detail.phase, RoomPhase::Finished);

        let scores = alice.scores(room_id).await.unwrap();
        assert_eq!(scores.scores[0].correct, 0);
        assert_eq!(scores.scores[1].correct, 5);
    };

    tokio::time::timeout(Duration::from_secs(10), game)
        .await
        .expect("game did not finish in time");
}
