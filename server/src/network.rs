//! WebSocket accept loop spawning one session task per connection

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::handler::run_session;
use crate::text_source::TextSource;
use crate::transport::WsTransport;
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;

/// Reason an upgrade request was turned away
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeRejection {
    pub status: StatusCode,
    pub body: String,
}

impl HandshakeRejection {
    fn new(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    fn into_response(self) -> ErrorResponse {
        let mut response = ErrorResponse::new(Some(self.body));
        *response.status_mut() = self.status;
        response
    }
}

/// Accepts the upgrade only on the session path and from the configured frontend origin
pub fn validate_upgrade_request(
    request: &Request,
    ws_path: &str,
    allowed_origin: &str,
) -> Result<(), HandshakeRejection> {
    if request.uri().path() != ws_path {
        return Err(HandshakeRejection::new(StatusCode::NOT_FOUND, "Not found"));
    }

    let origin = request
        .headers()
        .get("Origin")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| HandshakeRejection::new(StatusCode::FORBIDDEN, "Origin header missing"))?;

    if origin != allowed_origin {
        return Err(HandshakeRejection::new(
            StatusCode::FORBIDDEN,
            "Origin not allowed",
        ));
    }

    Ok(())
}

/// Listens for typing clients and runs an isolated session for each one
pub struct SessionServer {
    listener: TcpListener,
    config: Arc<ServerConfig>,
    text_source: Arc<dyn TextSource>,
}

impl SessionServer {
    pub async fn bind(
        config: ServerConfig,
        text_source: Arc<dyn TextSource>,
    ) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(&config.bind_addr).await?;
        info!(
            "Session server listening on ws://{}{}",
            listener.local_addr()?,
            config.ws_path
        );

        Ok(Self {
            listener,
            config: Arc::new(config),
            text_source,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections until the listener fails
    pub async fn run(self) -> Result<(), ServerError> {
        loop {
            let (stream, addr) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    continue;
                }
            };

            let config = Arc::clone(&self.config);
            let text_source = Arc::clone(&self.text_source);
            tokio::spawn(async move {
                handle_connection(stream, addr, config, text_source).await;
            });
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    config: Arc<ServerConfig>,
    text_source: Arc<dyn TextSource>,
) {
    debug!("Incoming connection from {}", addr);

    let ws_path = config.ws_path.clone();
    let allowed_origin = config.allowed_origin.clone();
    let callback = move |request: &Request, response: Response| {
        validate_upgrade_request(request, &ws_path, &allowed_origin)
            .map(|()| response)
            .map_err(HandshakeRejection::into_response)
    };

    let ws_stream = match accept_hdr_async(stream, callback).await {
        Ok(ws_stream) => ws_stream,
        Err(e) => {
            warn!("Rejected websocket upgrade from {}: {}", addr, e);
            return;
        }
    };

    info!("Client {} connected", addr);
    let mut transport = WsTransport::new(ws_stream);

    match run_session(&mut transport, text_source.as_ref(), config.idle_timeout).await {
        Ok(report) => info!(
            "Client {} session ended: outcome {:?}, {} errors, last speed {:?}",
            addr, report.outcome, report.error_count, report.last_speed
        ),
        Err(e) => error!("Client {} session aborted: {}", addr, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "http://127.0.0.1:8080";

    fn request(uri: &str, origin: Option<&str>) -> Request {
        let mut builder = Request::builder().uri(uri);
        if let Some(origin) = origin {
            builder = builder.header("Origin", origin);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn test_accepts_matching_path_and_origin() {
        let req = request("/ws", Some(ORIGIN));
        assert!(validate_upgrade_request(&req, "/ws", ORIGIN).is_ok());
    }

    #[test]
    fn test_rejects_other_origin() {
        let req = request("/ws", Some("https://evil.example"));
        let rejection = validate_upgrade_request(&req, "/ws", ORIGIN).unwrap_err();
        assert_eq!(rejection.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_rejects_missing_origin() {
        let req = request("/ws", None);
        let rejection = validate_upgrade_request(&req, "/ws", ORIGIN).unwrap_err();
        assert_eq!(rejection.status, StatusCode::FORBIDDEN);
        assert_eq!(rejection.body, "Origin header missing");
    }

    #[test]
    fn test_rejects_other_path() {
        let req = request("/client/index.html", Some(ORIGIN));
        let rejection = validate_upgrade_request(&req, "/ws", ORIGIN).unwrap_err();
        assert_eq!(rejection.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_query_string_does_not_affect_path() {
        let req = request("/ws?attempt=2", Some(ORIGIN));
        assert!(validate_upgrade_request(&req, "/ws", ORIGIN).is_ok());
    }

    #[test]
    fn test_rejection_response_carries_status() {
        let response =
            HandshakeRejection::new(StatusCode::FORBIDDEN, "Origin not allowed").into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(response.body().as_deref(), Some("Origin not allowed"));
    }
}
