//! WebSocket test client for protocol testing
//!
//! Provides both low-level WsConnection and high-level TestClient.
//!
//! Note: Some methods may appear unused because they're only used in specific
//! test files and clippy checks each test independently.

use std::net::SocketAddr;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// Low-level WebSocket connection
pub struct WsConnection {
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
}

impl WsConnection {
    /// Connect to WebSocket endpoint
    pub async fn connect(addr: SocketAddr) -> Self {
        let url = format!("ws://{}/ws", addr);
        let (ws, _) = tokio_tungstenite::connect_async(&url)
            .await
            .expect("Failed to connect");
        let (sink, stream) = ws.split();
        Self { sink, stream }
    }

    /// Send raw text message
    pub async fn send_raw(&mut self, msg: &str) {
        self.sink
            .send(Message::Text(msg.to_string().into()))
            .await
            .unwrap();
    }

    /// Send JSON message
    pub async fn send_json<T: Serialize>(&mut self, msg: &T) {
        let json = serde_json::to_string(msg).unwrap();
        self.send_raw(&json).await;
    }

    /// Receive raw text message, `None` once the server closes the socket
    pub async fn next_text(&mut self) -> Option<String> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Some(text.to_string()),
                Some(Ok(Message::Close(_))) | None => return None,
                Some(Ok(_)) => continue,
                Some(Err(_)) => return None,
            }
        }
    }

    /// Receive raw text message
    pub async fn recv_raw(&mut self) -> String {
        tokio::time::timeout(RECV_TIMEOUT, self.next_text())
            .await
            .expect("Timed out waiting for message")
            .expect("WebSocket closed")
    }

    /// Receive and deserialize JSON message
    pub async fn recv_json<T: DeserializeOwned>(&mut self) -> T {
        let text = self.recv_raw().await;
        serde_json::from_str(&text).expect("Failed to parse JSON")
    }

    /// Receive with timeout, returns None if timeout
    pub async fn recv_timeout(&mut self, duration: Duration) -> Option<String> {
        tokio::time::timeout(duration, self.next_text())
            .await
            .ok()
            .flatten()
    }
}

/// High-level test client with helper methods
pub struct TestClient {
    pub conn: WsConnection,
}

impl TestClient {
    /// Connect to server; nothing is sent until the client identifies itself
    #[allow(dead_code)]
    pub async fn connect(addr: SocketAddr) -> Self {
        Self {
            conn: WsConnection::connect(addr).await,
        }
    }

    /// Connect and register as a participant, returns the first reply
    #[allow(dead_code)]
    pub async fn participant(addr: SocketAddr) -> (Self, Value) {
        let mut client = Self::connect(addr).await;
        client.send("join").await;
        let reply = client.recv().await;
        (client, reply)
    }

    /// Connect and subscribe to admin broadcasts, returns the initial snapshot
    #[allow(dead_code)]
    pub async fn admin(addr: SocketAddr) -> (Self, Value) {
        let mut client = Self::connect(addr).await;
        client.send("admin_join").await;
        let snapshot = client.recv_type("session_snapshot").await;
        (client, snapshot)
    }

    /// Send a message with no fields
    #[allow(dead_code)]
    pub async fn send(&mut self, msg_type: &str) {
        self.conn.send_json(&json!({ "type": msg_type })).await;
    }

    /// Answer a question, echoing its text
    #[allow(dead_code)]
    pub async fn answer(&mut self, question: &Value, answer: Option<i64>, correct: bool) {
        self.conn
            .send_json(&json!({
                "type": "submit_answer",
                "question_text": question["question_text"],
                "answer": answer,
                "correct": correct,
            }))
            .await;
    }

    /// Answer a question with its correct option
    #[allow(dead_code)]
    pub async fn answer_correctly(&mut self, question: &Value) {
        let answer = question["correct_answer"].as_i64().unwrap();
        self.answer(question, Some(answer), true).await;
    }

    /// Submit the final risky/safe choice
    #[allow(dead_code)]
    pub async fn choose(&mut self, choice: &str) {
        self.conn
            .send_json(&json!({
                "type": "submit_final_choice",
                "choice": choice,
            }))
            .await;
    }

    /// Receive next message
    #[allow(dead_code)]
    pub async fn recv(&mut self) -> Value {
        self.conn.recv_json().await
    }

    /// Receive messages until one of the given type arrives
    #[allow(dead_code)]
    pub async fn recv_type(&mut self, msg_type: &str) -> Value {
        loop {
            let msg = self.recv().await;
            if msg["type"] == msg_type {
                return msg;
            }
        }
    }

    /// Assert no message received within duration
    #[allow(dead_code)]
    pub async fn expect_no_message(&mut self, duration: Duration) {
        assert!(
            self.conn.recv_timeout(duration).await.is_none(),
            "Expected no message but received one"
        );
    }

    /// Wait for the server to close the socket, returning anything sent first
    #[allow(dead_code)]
    pub async fn expect_closed(&mut self) -> Vec<Value> {
        let mut before_close = Vec::new();
        let closed = tokio::time::timeout(RECV_TIMEOUT, async {
            while let Some(text) = self.conn.next_text().await {
                before_close.push(serde_json::from_str(&text).unwrap());
            }
        })
        .await;
        assert!(closed.is_ok(), "Expected server to close the connection");
        before_close
    }
}
