//! Remote session bootstrap

use serde::Deserialize;

use super::client::{ApiClient, ApiError};

/// Ticket returned by the session bootstrap endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct SessionTicket {
    pub session_id: String,
    /// Socket path relative to the API base, or a full ws(s) URL
    pub websocket_url: String,
}

/// Session API operations
#[derive(Clone)]
pub struct SessionApi {
    client: ApiClient,
}

impl SessionApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Create a remote session and return its ticket.
    pub async fn create_session(&self) -> Result<SessionTicket, ApiError> {
        self.client
            .post("/games/gesture/session", &serde_json::json!({}))
            .await
    }

    /// Resolve a ticket into a connectable ws(s) endpoint. Relative
    /// tickets resolve against the API base with the scheme swapped.
    pub fn websocket_endpoint(&self, ticket: &SessionTicket) -> String {
        if ticket.websocket_url.starts_with("ws://") || ticket.websocket_url.starts_with("wss://") {
            return ticket.websocket_url.clone();
        }

        let base = self.client.base_url().trim_end_matches('/');
        let swapped = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            base.to_string()
        };

        format!("{}/{}", swapped, ticket.websocket_url.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::ApiConfig;

    fn api(base_url: &str) -> SessionApi {
        SessionApi::new(ApiClient::new(ApiConfig {
            base_url: base_url.to_string(),
            auth_token: None,
        }))
    }

    fn ticket(path: &str) -> SessionTicket {
        SessionTicket {
            session_id: "abc".to_string(),
            websocket_url: path.to_string(),
        }
    }

    #[test]
    fn https_base_resolves_to_wss() {
        let api = api("https://api.example.com");
        assert_eq!(
            api.websocket_endpoint(&ticket("/ws/gesture/abc")),
            "wss://api.example.com/ws/gesture/abc"
        );
    }

    #[test]
    fn http_base_resolves_to_ws() {
        let api = api("http://127.0.0.1:8080/");
        assert_eq!(
            api.websocket_endpoint(&ticket("/ws/gesture/abc")),
            "ws://127.0.0.1:8080/ws/gesture/abc"
        );
    }

    #[test]
    fn absolute_tickets_pass_through() {
        let api = api("https://api.example.com");
        assert_eq!(
            api.websocket_endpoint(&ticket("wss://sessions.example.com/ws/gesture/abc")),
            "wss://sessions.example.com/ws/gesture/abc"
        );
    }
}
