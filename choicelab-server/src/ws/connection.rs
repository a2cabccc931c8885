//! WebSocket connection handling

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use choicelab_core::{AnswerSubmission, ServerEvent, SessionError};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{AppState, ServerError};
use crate::hub::Outbound;

use super::protocol::{ClientMessage, error_event};

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle a WebSocket connection
///
/// The connection id doubles as the participant id once the client joins.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let conn_id = Uuid::new_v4().to_string();
    let (mut sender, mut receiver) = socket.split();
    let mut outbound = state.hub.register(&conn_id);

    info!(connection = %conn_id, "WebSocket client connected");

    loop {
        tokio::select! {
            item = outbound.recv() => {
                match item {
                    Some(Outbound::Event(event)) => {
                        if send_json(&mut sender, &event).await.is_err() {
                            break;
                        }
                    }
                    Some(Outbound::Close) => {
                        debug!(connection = %conn_id, "Closing connection at server request");
                        let _ = sender.send(Message::Close(None)).await;
                        break;
                    }
                    None => break,
                }
            }
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_text_message(&text, &conn_id, &state, &mut sender).await;
                    }
                    Some(Ok(Message::Close(_))) => {
                        debug!(connection = %conn_id, "WebSocket client sent close frame");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {
                        // Ignore binary and pong messages
                    }
                    Some(Err(e)) => {
                        let err = ServerError::from(e);
                        error!(connection = %conn_id, code = err.code(), "{}", err);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    state.hub.unregister(&conn_id);
    // Leaving after reset/stop already cleared the participant is a no-op
    match state.coordinator.lock().await.leave(&conn_id) {
        Ok(_) => {}
        Err(SessionError::UnknownParticipant(_)) => {}
        Err(e) => warn!(connection = %conn_id, "Leave failed: {}", e),
    }

    info!(connection = %conn_id, "WebSocket client disconnected");
}

/// Dispatch one text frame to the coordinator
///
/// Malformed frames get an `error` reply on this connection only. Rejected
/// actions are logged and otherwise ignored.
async fn handle_text_message(
    text: &str,
    conn_id: &str,
    state: &Arc<AppState>,
    sender: &mut SplitSink<WebSocket, Message>,
) {
    let msg = match ClientMessage::parse(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!(connection = %conn_id, "Rejected frame: {}", e);
            let _ = send_json(sender, &error_event(&e)).await;
            return;
        }
    };

    debug!(connection = %conn_id, "Received {}", msg.kind());
    let kind = msg.kind();
    let mut coordinator = state.coordinator.lock().await;

    let outcome = match msg {
        ClientMessage::Join => coordinator.join(conn_id).map(|_| ()),
        ClientMessage::SubmitAnswer {
            question_text,
            answer,
            correct,
        } => coordinator
            .submit_answer(
                conn_id,
                AnswerSubmission {
                    question_text,
                    answer,
                    correct,
                },
            )
            .map(|_| ()),
        ClientMessage::SubmitFinalChoice { choice } => {
            coordinator.submit_final_choice(conn_id, choice)
        }
        ClientMessage::AdminJoin => {
            coordinator.admin_join(conn_id);
            Ok(())
        }
        ClientMessage::Start => coordinator.start().map(|_| ()),
        ClientMessage::RequestResults => {
            coordinator.request_results();
            Ok(())
        }
        ClientMessage::GetLogs => {
            coordinator.get_logs();
            Ok(())
        }
        ClientMessage::Reset => {
            coordinator.reset();
            Ok(())
        }
        ClientMessage::Stop => {
            coordinator.stop();
            Ok(())
        }
    };

    if let Err(e) = outcome {
        match e {
            SessionError::UnknownParticipant(_) => {
                debug!(participant = %conn_id, "Ignored {}: {}", kind, e)
            }
            _ => warn!(participant = %conn_id, "Ignored {}: {}", kind, e),
        }
    }
}

/// Serialize an event and send it as a text frame
async fn send_json(
    sender: &mut SplitSink<WebSocket, Message>,
    event: &ServerEvent,
) -> Result<(), axum::Error> {
    match serde_json::to_string(event) {
        Ok(json) => sender.send(Message::Text(json.into())).await,
        Err(e) => {
            error!("Failed to serialize {}: {}", event.kind(), e);
            Ok(())
        }
    }
}
