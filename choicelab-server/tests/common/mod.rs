//! Shared test utilities for choicelab-server integration tests

pub mod client;

use std::net::SocketAddr;
use std::sync::Arc;

use choicelab_core::{Difficulty, ExperimentConfig, Question, QuestionGenerator};
use choicelab_server::{AppState, ChoicelabServer, ServerConfig};
use tokio::net::TcpListener;

/// Generator with one fixed question per tier so tests can answer by rote
pub struct FixedQuestions;

impl QuestionGenerator for FixedQuestions {
    fn generate(&self, difficulty: Difficulty) -> Question {
        match difficulty {
            Difficulty::Complex => Question {
                text: "Solve for x: 2^x = 8".to_string(),
                options: vec![3, 2, 4, 6],
                correct_answer: 3,
            },
            Difficulty::Simple => Question {
                text: "3 + 4".to_string(),
                options: vec![7, 2, 10, 14],
                correct_answer: 7,
            },
        }
    }
}

/// Creates a test server with the default quiz length, returns state and address
#[allow(dead_code)]
pub async fn create_test_server() -> (Arc<AppState>, SocketAddr) {
    create_test_server_with_quiz_length(choicelab_core::DEFAULT_QUIZ_LENGTH).await
}

/// Creates a test server whose participants answer `quiz_length` questions
#[allow(dead_code)]
pub async fn create_test_server_with_quiz_length(
    quiz_length: usize,
) -> (Arc<AppState>, SocketAddr) {
    let config = ExperimentConfig::new(quiz_length).unwrap();
    let state = Arc::new(AppState::with_generator(config, Arc::new(FixedQuestions)));

    let server = ChoicelabServer::with_state(ServerConfig::default(), Arc::clone(&state));
    let addr = spawn_server(server).await;

    (state, addr)
}

/// Spawns server in background task, returns bound address
async fn spawn_server(server: ChoicelabServer) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = server.run_with_listener(listener).await;
    });

    // Brief delay to ensure server is accepting connections
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    addr
}
