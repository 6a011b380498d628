use shared::{DEFAULT_FRONTEND_ORIGIN, WS_PATH};
use std::time::Duration;

/// Runtime settings for [`crate::network::SessionServer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the TCP listener binds to, e.g. `127.0.0.1:8080`
    pub bind_addr: String,
    /// Request path that may be upgraded to a websocket
    pub ws_path: String,
    /// The only `Origin` header value accepted during the upgrade
    pub allowed_origin: String,
    /// Disconnect clients that stay silent this long; `None` waits forever
    pub idle_timeout: Option<Duration>,
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            bind_addr: format!("{}:{}", host, port),
            ..Self::default()
        }
    }

    pub fn with_allowed_origin(mut self, origin: impl Into<String>) -> Self {
        self.allowed_origin = origin.into();
        self
    }

    pub fn with_ws_path(mut self, path: impl Into<String>) -> Self {
        self.ws_path = path.into();
        self
    }

    /// A zero duration disables the idle deadline
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            ws_path: WS_PATH.to_string(),
            allowed_origin: DEFAULT_FRONTEND_ORIGIN.to_string(),
            idle_timeout: None,
        }
    }
}
