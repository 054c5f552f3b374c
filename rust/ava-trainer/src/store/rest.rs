//! REST sentence store talking to the Ava server

use async_trait::async_trait;
use ava_tagger::TaggedSentence;
use reqwest::{Client, Response, StatusCode};

use super::{SentenceStore, ServerMessage, StoreError, TrainingSentence};
use crate::config::{AuthMethod, TrainerConfig};

/// Path of the sentence resource, relative to the endpoint.
pub const SENTENCE_PATH: &str = "api/sentence.json";

/// REST sentence store
///
/// - GET `{endpoint}/api/sentence.json[?id=N]` - fetch a sentence to annotate
/// - PUT `{endpoint}/api/sentence.json` - store a tagged sentence
///
/// Failures carry the server's `{"Msg": ...}` text when the body has one.
///
/// # Examples
///
/// ```no_run
/// use ava_trainer::config::{AuthMethod, TrainerConfig};
/// use ava_trainer::store::{RestSentenceStore, SentenceStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = TrainerConfig::new("https://ava.example.com")
///     .with_auth(AuthMethod::Bearer("token".into()))
///     .with_header("X-CSRF-Token", "csrf");
///
/// let store = RestSentenceStore::new(&config);
/// if let Some(sentence) = store.fetch(None).await? {
///     println!("{}", sentence.sentence);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RestSentenceStore {
    url: String,
    auth_method: AuthMethod,
    headers: Vec<(String, String)>,
    client: Client,
}

impl RestSentenceStore {
    /// Create a new REST store with the given configuration
    pub fn new(config: &TrainerConfig) -> Self {
        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder.build().unwrap_or_else(|error| {
            tracing::warn!(%error, "falling back to default HTTP client");
            Client::new()
        });

        Self {
            url: format!(
                "{}/{}",
                config.endpoint.trim_end_matches('/'),
                SENTENCE_PATH
            ),
            auth_method: config.auth_method.clone(),
            headers: config.headers.clone(),
            client,
        }
    }

    /// The URL of the sentence resource
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Build a request with authentication and custom headers
    fn build_request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let mut builder = builder;

        match &self.auth_method {
            AuthMethod::None => {}
            AuthMethod::Bearer(token) => {
                builder = builder.bearer_auth(token);
            }
        }

        for (key, value) in &self.headers {
            builder = builder.header(key, value);
        }

        builder
    }

    fn transport_error(&self, error: reqwest::Error) -> StoreError {
        StoreError::Transport {
            url: self.url.clone(),
            reason: format!("HTTP request failed: {}", error),
        }
    }

    /// Turn a failure status into a [`StoreError::Rejected`] carrying the
    /// most useful text available.
    async fn rejection(response: Response) -> StoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        StoreError::Rejected {
            status: status.as_u16(),
            message: rejection_message(status, &body),
        }
    }
}

fn rejection_message(status: StatusCode, body: &str) -> String {
    if let Ok(ServerMessage { msg }) = serde_json::from_str::<ServerMessage>(body) {
        return msg;
    }
    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    format!(
        "HTTP {} - {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    )
}

#[async_trait]
impl SentenceStore for RestSentenceStore {
    async fn fetch(&self, id: Option<u64>) -> Result<Option<TrainingSentence>, StoreError> {
        let mut request = self.client.get(&self.url);
        if let Some(id) = id {
            request = request.query(&[("id", id)]);
        }
        let request = self.build_request(request);

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Self::rejection(response).await);
        }

        let sentence: TrainingSentence =
            response.json().await.map_err(|e| StoreError::Decode {
                url: self.url.clone(),
                reason: e.to_string(),
            })?;

        if sentence.is_empty() {
            tracing::debug!("no sentences need annotating");
            return Ok(None);
        }

        tracing::debug!(id = sentence.id, "fetched sentence");
        Ok(Some(sentence))
    }

    async fn save(&self, sentence: &TaggedSentence) -> Result<(), StoreError> {
        let request = self.client.put(&self.url).json(sentence);
        let request = self.build_request(request);

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        tracing::info!(id = sentence.id, "saved tagged sentence");
        Ok(())
    }
}

impl std::fmt::Debug for RestSentenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestSentenceStore")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_message_prefers_server_msg() {
        assert_eq!(
            rejection_message(StatusCode::BAD_REQUEST, r#"{"Msg":"invalid sentence"}"#),
            "invalid sentence"
        );
        assert_eq!(
            rejection_message(StatusCode::BAD_REQUEST, "  plain failure \n"),
            "plain failure"
        );
        assert_eq!(
            rejection_message(StatusCode::BAD_GATEWAY, ""),
            "HTTP 502 - Bad Gateway"
        );
    }

    #[test]
    fn test_url_joins_endpoint() {
        let config = TrainerConfig::new("http://localhost:4000/");
        let store = RestSentenceStore::new(&config);
        assert_eq!(store.url(), "http://localhost:4000/api/sentence.json");
    }

    mod integration {
        use super::*;
        use crate::store::MemorySentenceStore;
        use axum::{
            Json, Router,
            extract::{Query, State},
            http::{HeaderMap, StatusCode},
            response::{IntoResponse, Response},
            routing::get,
        };
        use serde::Deserialize;
        use tokio::net::TcpListener;

        /// Test HTTP server state
        #[derive(Clone)]
        struct ServerState {
            store: MemorySentenceStore,
            token: Option<String>,
        }

        #[derive(Deserialize)]
        struct FetchParams {
            id: Option<u64>,
        }

        fn authorized(state: &ServerState, headers: &HeaderMap) -> bool {
            let Some(token) = &state.token else {
                return true;
            };
            headers
                .get(axum::http::header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                == Some(format!("Bearer {}", token).as_str())
        }

        /// Handle GET /api/sentence.json - hand out a sentence, ID 0 when done
        async fn handle_get(
            State(state): State<ServerState>,
            headers: HeaderMap,
            Query(params): Query<FetchParams>,
        ) -> Response {
            if !authorized(&state, &headers) {
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(ServerMessage {
                        msg: "not authorized".into(),
                    }),
                )
                    .into_response();
            }
            match state.store.fetch(params.id).await {
                Ok(Some(sentence)) => Json(sentence).into_response(),
                Ok(None) => Json(TrainingSentence::default()).into_response(),
                Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.message()).into_response(),
            }
        }

        /// Handle PUT /api/sentence.json - store a tagged sentence
        async fn handle_put(
            State(state): State<ServerState>,
            Json(payload): Json<TaggedSentence>,
        ) -> Response {
            match state.store.save(&payload).await {
                Ok(()) => StatusCode::OK.into_response(),
                Err(e) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ServerMessage { msg: e.message() }),
                )
                    .into_response(),
            }
        }

        /// Create and start test server, return the endpoint URL
        async fn start_test_server(store: MemorySentenceStore, token: Option<String>) -> String {
            let state = ServerState { store, token };

            let app = Router::new()
                .route("/api/sentence.json", get(handle_get).put(handle_put))
                .with_state(state);

            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();

            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            format!("http://{}", addr)
        }

        fn rest_store(endpoint: &str) -> RestSentenceStore {
            RestSentenceStore::new(&TrainerConfig::new(endpoint))
        }

        #[tokio::test]
        async fn test_fetch_next() {
            let store = MemorySentenceStore::with_sentences([TrainingSentence::new(
                5,
                "meet bob at noon",
            )
            .with_foreign_id("HIT5")
            .with_max_assignments(3)])
            .await;
            let endpoint = start_test_server(store, None).await;

            let sentence = rest_store(&endpoint).fetch(None).await.unwrap().unwrap();
            assert_eq!(sentence.id, 5);
            assert_eq!(sentence.sentence, "meet bob at noon");
            assert_eq!(sentence.foreign_id, "HIT5");
            assert_eq!(sentence.max_assignments, 3);
        }

        #[tokio::test]
        async fn test_fetch_by_id() {
            let store = MemorySentenceStore::with_sentences([
                TrainingSentence::new(1, "one"),
                TrainingSentence::new(2, "two"),
            ])
            .await;
            let endpoint = start_test_server(store, None).await;

            let sentence = rest_store(&endpoint).fetch(Some(2)).await.unwrap().unwrap();
            assert_eq!(sentence.sentence, "two");
        }

        #[tokio::test]
        async fn test_fetch_all_done() {
            let endpoint = start_test_server(MemorySentenceStore::new(), None).await;
            assert!(rest_store(&endpoint).fetch(None).await.unwrap().is_none());
        }

        #[tokio::test]
        async fn test_save_success() {
            let store = MemorySentenceStore::with_sentences([TrainingSentence::new(1, "walk")]).await;
            let endpoint = start_test_server(store.clone(), None).await;

            let payload = TrainingSentence::new(1, "walk")
                .into_session(Some("A1".into()))
                .tagged_sentence();
            rest_store(&endpoint).save(&payload).await.unwrap();

            assert_eq!(store.saved().await, vec![payload]);
        }

        #[tokio::test]
        async fn test_save_rejected_surfaces_server_message() {
            let store = MemorySentenceStore::with_sentences([TrainingSentence::new(1, "walk")]).await;
            store.reject_next_save("database unavailable").await;
            let endpoint = start_test_server(store.clone(), None).await;

            let payload = TrainingSentence::new(1, "walk").into_session(None).tagged_sentence();
            let error = rest_store(&endpoint).save(&payload).await.unwrap_err();

            match error {
                StoreError::Rejected { status, message } => {
                    assert_eq!(status, 500);
                    assert_eq!(message, "database unavailable");
                }
                other => panic!("expected rejection, got {:?}", other),
            }
            assert!(store.saved().await.is_empty());
        }

        #[tokio::test]
        async fn test_bearer_auth() {
            let store = MemorySentenceStore::with_sentences([TrainingSentence::new(1, "walk")]).await;
            let endpoint = start_test_server(store, Some("secret".into())).await;

            let anonymous = rest_store(&endpoint).fetch(None).await.unwrap_err();
            assert!(matches!(anonymous, StoreError::Rejected { status: 401, .. }));
            assert_eq!(anonymous.message(), "not authorized");

            let config = TrainerConfig::new(endpoint.as_str())
                .with_auth(AuthMethod::Bearer("secret".into()));
            let sentence = RestSentenceStore::new(&config).fetch(None).await.unwrap();
            assert!(sentence.is_some());
        }

        #[tokio::test]
        async fn test_unreachable_server() {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);

            let error = rest_store(&format!("http://{}", addr))
                .fetch(None)
                .await
                .unwrap_err();
            assert!(matches!(error, StoreError::Transport { .. }));
        }
    }
}
