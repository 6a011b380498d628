//! Integration tests for the typing session server
//!
//! These tests run the real server on an ephemeral port and talk to it over
//! actual WebSocket connections.

use futures::{SinkExt, StreamExt};
use server::config::ServerConfig;
use server::network::SessionServer;
use server::text_source::{FixedText, TextSource};
use shared::{InputMessage, Outcome, ServerMessage, DEFAULT_FRONTEND_ORIGIN};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_test::assert_ok;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

async fn start_server(phrase: &str, config: ServerConfig) -> SocketAddr {
    let source: Arc<dyn TextSource> = Arc::new(FixedText::new(phrase).unwrap());
    let server = SessionServer::bind(config, source).await.unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());
    addr
}

fn local_config() -> ServerConfig {
    ServerConfig::new("127.0.0.1", 0)
}

async fn connect(addr: SocketAddr, path: &str, origin: &str) -> Result<Ws, tungstenite::Error> {
    let mut request = format!("ws://{}{}", addr, path).into_client_request()?;
    request
        .headers_mut()
        .insert("Origin", HeaderValue::from_str(origin).unwrap());
    let (ws, _) = connect_async(request).await?;
    Ok(ws)
}

async fn send_input(ws: &mut Ws, text: &str) {
    ws.send(Message::text(InputMessage::new(text).to_json()))
        .await
        .unwrap();
}

/// Next server fragment, or `None` once the server closed the connection
async fn next_message(ws: &mut Ws) -> Option<ServerMessage> {
    loop {
        let frame = timeout(WAIT, ws.next()).await.expect("server went silent")?;
        match frame {
            Ok(Message::Text(text)) => return ServerMessage::parse(text.as_str()),
            Ok(Message::Close(_)) | Err(_) => return None,
            Ok(_) => continue,
        }
    }
}

/// SESSION PROTOCOL TESTS
mod session_tests {
    use super::*;

    /// Typing the phrase prefix by prefix ends in a success verdict
    #[tokio::test]
    async fn successful_session_over_websocket() {
        let addr = start_server("cat", local_config()).await;
        let mut ws = assert_ok!(connect(addr, "/ws", DEFAULT_FRONTEND_ORIGIN).await);

        assert_eq!(
            next_message(&mut ws).await,
            Some(ServerMessage::TextToType("cat".to_string()))
        );

        for text in ["c", "ca", "cat"] {
            send_input(&mut ws, text).await;
            assert!(matches!(
                next_message(&mut ws).await,
                Some(ServerMessage::Speed(_))
            ));
        }

        assert_eq!(
            next_message(&mut ws).await,
            Some(ServerMessage::Verdict(Outcome::Succeeded))
        );
        assert_eq!(next_message(&mut ws).await, Some(ServerMessage::ClearInput));
        assert_eq!(next_message(&mut ws).await, None);
    }

    /// Exhausting the error budget ends in a failure verdict with no speed updates
    #[tokio::test]
    async fn failed_session_over_websocket() {
        let addr = start_server("cat", local_config()).await;
        let mut ws = connect(addr, "/ws", DEFAULT_FRONTEND_ORIGIN).await.unwrap();

        assert!(matches!(
            next_message(&mut ws).await,
            Some(ServerMessage::TextToType(_))
        ));

        for _ in 0..3 {
            send_input(&mut ws, "x").await;
        }

        assert_eq!(
            next_message(&mut ws).await,
            Some(ServerMessage::Verdict(Outcome::Failed))
        );
        assert_eq!(next_message(&mut ws).await, Some(ServerMessage::ClearInput));
        assert_eq!(next_message(&mut ws).await, None);
    }

    /// A malformed payload is ignored and the session carries on
    #[tokio::test]
    async fn malformed_payload_is_ignored() {
        let addr = start_server("cat", local_config()).await;
        let mut ws = connect(addr, "/ws", DEFAULT_FRONTEND_ORIGIN).await.unwrap();
        next_message(&mut ws).await;

        ws.send(Message::text("{\"userInput\": ")).await.unwrap();
        send_input(&mut ws, "c").await;

        // The first reply belongs to "c", the garbage produced nothing
        assert!(matches!(
            next_message(&mut ws).await,
            Some(ServerMessage::Speed(_))
        ));

        send_input(&mut ws, "ca").await;
        send_input(&mut ws, "cat").await;

        let mut rest = Vec::new();
        while let Some(msg) = next_message(&mut ws).await {
            rest.push(msg);
        }
        assert_eq!(rest.len(), 4);
        assert_eq!(rest[2], ServerMessage::Verdict(Outcome::Succeeded));
        assert_eq!(rest[3], ServerMessage::ClearInput);
    }

    /// Concurrent sessions do not see each other's state
    #[tokio::test]
    async fn concurrent_sessions_are_isolated() {
        let addr = start_server("ok", local_config()).await;
        let mut good = connect(addr, "/ws", DEFAULT_FRONTEND_ORIGIN).await.unwrap();
        let mut bad = connect(addr, "/ws", DEFAULT_FRONTEND_ORIGIN).await.unwrap();
        next_message(&mut good).await;
        next_message(&mut bad).await;

        send_input(&mut bad, "x").await;
        send_input(&mut good, "o").await;
        send_input(&mut bad, "y").await;
        send_input(&mut good, "ok").await;

        assert!(matches!(
            next_message(&mut bad).await,
            Some(ServerMessage::Verdict(Outcome::Failed))
        ));
        assert!(matches!(
            next_message(&mut good).await,
            Some(ServerMessage::Speed(_))
        ));
        assert!(matches!(
            next_message(&mut good).await,
            Some(ServerMessage::Speed(_))
        ));
        assert_eq!(
            next_message(&mut good).await,
            Some(ServerMessage::Verdict(Outcome::Succeeded))
        );
    }

    /// Idle clients are disconnected when a deadline is configured
    #[tokio::test]
    async fn idle_session_is_closed() {
        let config = local_config().with_idle_timeout(Duration::from_millis(100));
        let addr = start_server("cat", config).await;
        let mut ws = connect(addr, "/ws", DEFAULT_FRONTEND_ORIGIN).await.unwrap();

        assert!(matches!(
            next_message(&mut ws).await,
            Some(ServerMessage::TextToType(_))
        ));
        assert_eq!(next_message(&mut ws).await, None);
    }
}

/// HANDSHAKE TESTS
mod handshake_tests {
    use super::*;

    fn rejected_status(result: Result<Ws, tungstenite::Error>) -> u16 {
        match result {
            Err(tungstenite::Error::Http(response)) => response.status().as_u16(),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("upgrade should have been rejected"),
        }
    }

    #[tokio::test]
    async fn foreign_origin_is_rejected() {
        let addr = start_server("cat", local_config()).await;
        let result = connect(addr, "/ws", "http://evil.example").await;
        assert_eq!(rejected_status(result), 403);
    }

    #[tokio::test]
    async fn configured_origin_is_accepted() {
        let config = local_config().with_allowed_origin("https://typing.example");
        let addr = start_server("cat", config).await;

        assert_ok!(connect(addr, "/ws", "https://typing.example").await);
        let result = connect(addr, "/ws", DEFAULT_FRONTEND_ORIGIN).await;
        assert_eq!(rejected_status(result), 403);
    }

    #[tokio::test]
    async fn other_path_is_rejected() {
        let addr = start_server("cat", local_config()).await;
        let result = connect(addr, "/chat", DEFAULT_FRONTEND_ORIGIN).await;
        assert_eq!(rejected_status(result), 404);
    }
}

/// CLIENT INTEGRATION TESTS
mod client_tests {
    use super::*;
    use client::network::Client;

    #[tokio::test]
    async fn scripted_client_completes_phrase() {
        let addr = start_server("The quick brown fox.", local_config()).await;
        let url = format!("ws://{}/ws", addr);

        let client = Client::connect(&url, DEFAULT_FRONTEND_ORIGIN, Duration::ZERO, 0.0)
            .await
            .unwrap();
        let summary = assert_ok!(timeout(WAIT, client.run()).await).unwrap();

        assert_eq!(summary.phrase.as_deref(), Some("The quick brown fox."));
        assert_eq!(summary.speeds.len(), "The quick brown fox.".len());
        assert_eq!(summary.outcome, Some(Outcome::Succeeded));
        assert!(summary.input_cleared);
    }

    #[tokio::test]
    async fn scripted_client_with_typos_fails_short_phrase() {
        // Every character is preceded by a typo, so "ab" exhausts its budget of 2
        let addr = start_server("ab", local_config()).await;
        let url = format!("ws://{}/ws", addr);

        let client = Client::connect(&url, DEFAULT_FRONTEND_ORIGIN, Duration::ZERO, 1.0)
            .await
            .unwrap();
        let summary = timeout(WAIT, client.run()).await.unwrap().unwrap();

        assert_eq!(summary.outcome, Some(Outcome::Failed));
        assert_eq!(summary.speeds.len(), 1);
        assert!(summary.input_cleared);
    }
}
