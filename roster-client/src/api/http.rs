//! HttpApi - the chat backend over HTTP/JSON.
//!
//! Every request carries the session's bearer credential. Non-success
//! responses are read for a `message` field; bodies of successful responses
//! are parsed straight into validated entities.

use super::{ApiError, RosterApi};
use async_trait::async_trait;
use roster_types::api::{
    ErrorBody, StartConversation, CONTACTS_PATH, CONVERSATIONS_PATH, START_CONVERSATION_PATH,
};
use roster_types::{Contact, Conversation, SessionContext, UserId};
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;

/// Chat backend client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpApi {
    base_url: String,
    http: reqwest::Client,
}

impl HttpApi {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Create a client from the `[api]` config section.
    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(&config.base_url)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the URL for an endpoint path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: ErrorBody::parse(&body).message().map(str::to_string),
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl RosterApi for HttpApi {
    async fn list_conversations(
        &self,
        session: &SessionContext,
    ) -> Result<Vec<Conversation>, ApiError> {
        let response = self
            .http
            .get(self.url(CONVERSATIONS_PATH))
            .bearer_auth(session.token())
            .send()
            .await?;
        Self::read(response).await
    }

    async fn search_contacts(&self, session: &SessionContext) -> Result<Vec<Contact>, ApiError> {
        let response = self
            .http
            .get(self.url(CONTACTS_PATH))
            .bearer_auth(session.token())
            .send()
            .await?;
        Self::read(response).await
    }

    async fn start_conversation(
        &self,
        session: &SessionContext,
        other: &UserId,
    ) -> Result<Conversation, ApiError> {
        let body = StartConversation {
            other_user_id: other.clone(),
        };
        let response = self
            .http
            .post(self.url(START_CONVERSATION_PATH))
            .bearer_auth(session.token())
            .json(&body)
            .send()
            .await?;
        Self::read(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    const GOOD_TOKEN: &str = "Bearer good-token";

    fn session(token: &str) -> SessionContext {
        SessionContext::new(UserId::new("me"), token)
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v == GOOD_TOKEN)
            .unwrap_or(false)
    }

    fn unauthorized() -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Not authorized, token failed"})),
        )
            .into_response()
    }

    fn chat(id: &str, other: &str) -> Value {
        json!({
            "_id": id,
            "participants": [
                {"_id": "me", "name": "Me", "isOnline": true},
                {"_id": other, "name": "Other", "isOnline": false}
            ],
            "messages": [{"content": "hi", "timestamp": "2024-01-01T00:00:00Z"}]
        })
    }

    async fn list_chats(headers: HeaderMap) -> Response {
        if !authorized(&headers) {
            return unauthorized();
        }
        Json(json!([chat("c1", "u1"), chat("c2", "u2")])).into_response()
    }

    async fn search_users(headers: HeaderMap) -> Response {
        if !authorized(&headers) {
            return unauthorized();
        }
        Json(json!([
            {"_id": "me", "name": "Me"},
            {"_id": "u1", "name": "Ann", "location": "Oslo", "isOnline": true}
        ]))
        .into_response()
    }

    async fn start_chat(headers: HeaderMap, Json(body): Json<Value>) -> Response {
        if !authorized(&headers) {
            return unauthorized();
        }
        match body["otherUserId"].as_str() {
            Some("u404") => (StatusCode::NOT_FOUND, "<html>not here</html>").into_response(),
            Some(other) => Json(chat(&format!("chat-{}", other), other)).into_response(),
            None => (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": "otherUserId is required"})),
            )
                .into_response(),
        }
    }

    async fn serve() -> String {
        let router = Router::new()
            .route(CONVERSATIONS_PATH, get(list_chats))
            .route(CONTACTS_PATH, get(search_users))
            .route(START_CONVERSATION_PATH, post(start_chat))
            .route(
                "/broken/api/chat",
                get(|| async { Json(json!([{"_id": "c1", "participants": []}])) }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    // ===========================================
    // URL building
    // ===========================================

    #[test]
    fn url_joins_base_and_path() {
        let api = HttpApi::new("http://localhost:5001/");
        assert_eq!(api.base_url(), "http://localhost:5001");
        assert_eq!(api.url(CONVERSATIONS_PATH), "http://localhost:5001/api/chat");
        assert_eq!(
            api.url(START_CONVERSATION_PATH),
            "http://localhost:5001/api/chat/start"
        );
    }

    // ===========================================
    // Live requests against an in-process server
    // ===========================================

    #[tokio::test]
    async fn lists_conversations_with_bearer() {
        let api = HttpApi::new(&serve().await);
        let chats = api.list_conversations(&session("good-token")).await.unwrap();

        assert_eq!(chats.len(), 2);
        assert_eq!(chats[1].id().as_str(), "c2");
        assert_eq!(chats[0].last_message().unwrap().content, "hi");
    }

    #[tokio::test]
    async fn searches_contacts() {
        let api = HttpApi::new(&serve().await);
        let users = api.search_contacts(&session("good-token")).await.unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[1].location.as_deref(), Some("Oslo"));
    }

    #[tokio::test]
    async fn start_posts_other_user_id() {
        let api = HttpApi::new(&serve().await);
        let chat = api
            .start_conversation(&session("good-token"), &UserId::new("u7"))
            .await
            .unwrap();

        assert_eq!(chat.id().as_str(), "chat-u7");
        assert!(chat.has_participant(&UserId::new("u7")));
    }

    #[tokio::test]
    async fn rejected_token_carries_server_message() {
        let api = HttpApi::new(&serve().await);
        let err = api
            .list_conversations(&session("stale-token"))
            .await
            .unwrap_err();

        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message.as_deref(), Some("Not authorized, token failed"));
            }
            other => panic!("Expected Status, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn non_json_error_body_has_no_message() {
        let api = HttpApi::new(&serve().await);
        let err = api
            .start_conversation(&session("good-token"), &UserId::new("u404"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApiError::Status {
                status: 404,
                message: None
            }
        ));
    }

    #[tokio::test]
    async fn schema_violation_is_decode_error() {
        let base = serve().await;
        let api = HttpApi::new(&format!("{}/broken", base));
        let err = api
            .list_conversations(&session("good-token"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Decode(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = HttpApi::new(&format!("http://{}", addr));
        let err = api
            .search_contacts(&session("good-token"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Transport(_)), "got {:?}", err);
    }
}
