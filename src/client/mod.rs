//! HTTP client for the remote chat service
//!
//! The service is a black box reached over HTTP. It accepts one message per
//! request together with an optional session identifier, and replies with the
//! bot's answer plus the identifier that names the conversation from then on.

pub mod error;

pub use error::{ClientError, ClientResult};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Outbound chat request format
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<String>,
}

/// Reply returned by the chat endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub session_id: String,
}

/// Confirmation returned when a session is ended
#[derive(Debug, Clone, Deserialize)]
pub struct EndSessionReply {
    pub message: String,
}

/// Client for the chat service
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Post a prepared request to the chat endpoint
    pub async fn send(&self, request: &ChatRequest) -> ClientResult<ChatReply> {
        let url = format!("{}/chat", self.base_url);

        debug!("Sending chat request to: {}", url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::HttpError(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(ClientError::ApiError(format!(
                "chat endpoint returned {}: {}",
                status, error_text
            )));
        }

        let body = response.text().await.map_err(|e| ClientError::HttpError(e))?;
        let reply: ChatReply = serde_json::from_str(&body)?;
        Ok(reply)
    }

    /// Send a single message, continuing the session when an id is given
    pub async fn send_message(
        &self,
        message: &str,
        session_id: Option<String>,
    ) -> ClientResult<ChatReply> {
        let request = ChatRequest {
            message: message.to_string(),
            session_id,
        };
        self.send(&request).await
    }

    /// End a conversation on the server
    pub async fn end_session(&self, session_id: &str) -> ClientResult<EndSessionReply> {
        let url = format!("{}/end-session", self.base_url);

        debug!("Ending session {} at: {}", session_id, url);

        // The service reuses its chat request schema for this endpoint
        let request = ChatRequest {
            message: String::new(),
            session_id: Some(session_id.to_string()),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::HttpError(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(ClientError::ApiError(format!(
                "end-session endpoint returned {}: {}",
                status, error_text
            )));
        }

        let body = response.text().await.map_err(|e| ClientError::HttpError(e))?;
        let reply: EndSessionReply = serde_json::from_str(&body)?;
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_request_serializes_null_session() {
        let request = ChatRequest {
            message: "hello".to_string(),
            session_id: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"message":"hello","session_id":null}"#);
    }

    #[test]
    fn test_request_carries_session_id() {
        let request = ChatRequest {
            message: "and another thing".to_string(),
            session_id: Some("abc123".to_string()),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(
            json,
            r#"{"message":"and another thing","session_id":"abc123"}"#
        );
    }

    #[test]
    fn test_parse_reply() {
        let reply: ChatReply =
            serde_json::from_str(r#"{"response":"Hi there!","session_id":"abc123"}"#).unwrap();
        assert_eq!(reply.response, "Hi there!");
        assert_eq!(reply.session_id, "abc123");
    }

    #[test]
    fn test_parse_reply_rejects_missing_fields() {
        let result = serde_json::from_str::<ChatReply>(r#"{"response":"Hi there!"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_end_session_reply() {
        let reply: EndSessionReply =
            serde_json::from_str(r#"{"message":"Session abc123 ended and cleared."}"#).unwrap();
        assert_eq!(reply.message, "Session abc123 ended and cleared.");
    }

    #[test]
    fn test_client_construction() {
        let client = ChatClient::new("http://localhost:9000".to_string());
        assert_eq!(client.base_url(), "http://localhost:9000");
    }
}
