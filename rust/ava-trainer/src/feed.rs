//! Live conversation feed
//!
//! Trainers watch conversations as they happen. The server keeps one socket
//! per trainer, keyed by user id, and pushes a JSON array of messages each
//! time a user talks to Ava (the user's sentence, and Ava's reply when there
//! is one). The feed appends every message it receives to a [`MessageLog`]
//! and emits a [`FeedEvent`] so the view can refresh.
//!
//! ## Reconnect loop
//!
//! ```text
//! Disconnected ─▶ Connecting ─▶ Open ─(close)─▶ Disconnected
//!                     ▲                              │
//!                     └──── retry timer tick ◀───────┘  (fixed delay)
//! ```
//!
//! When the connection closes (or cannot be opened) a retry timer starts
//! ticking at a fixed interval. Each tick is one reconnection attempt, and a
//! failed attempt restarts the timer, so a slow refusal never makes the next
//! attempt fire early. The timer is cancelled when an attempt reaches `Open`. There is no backoff,
//! no jitter and no limit on attempts. Messages pushed while disconnected
//! are not recovered.
//!
//! Payloads that are not a JSON array of messages (the server greets each
//! connection with a plain string) are dropped.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::stream::BoxStream;
use futures_util::{StreamExt, future};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::config::TrainerConfig;
use crate::error::FeedError;

/// A chat message pushed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedMessage {
    #[serde(rename = "Sentence")]
    pub sentence: String,
    /// True when the message is Ava's reply rather than the user's input.
    #[serde(rename = "AvaSent", default)]
    pub ava_sent: bool,
    #[serde(rename = "CreatedAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Connection state of the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    Disconnected,
    Connecting,
    Open,
}

/// Something the view may want to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    State(FeedState),
    /// Messages were appended to the log.
    Messages { appended: usize },
    /// A payload could not be parsed and was discarded.
    Dropped,
    /// The connection closed and the retry timer started.
    RetryScheduled,
    /// The retry timer fired; `attempt` counts reconnection attempts since
    /// the feed started.
    Retrying { attempt: u64 },
    /// A reconnection attempt succeeded and the retry timer was cancelled.
    RetryCancelled,
}

/// The ordered list of messages received so far.
///
/// Clones share the same list.
#[derive(Clone, Debug, Default)]
pub struct MessageLog {
    messages: Arc<RwLock<Vec<FeedMessage>>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }

    /// Every message in the order it was received.
    pub fn snapshot(&self) -> Vec<FeedMessage> {
        self.messages.read().clone()
    }

    /// Messages from index `from` onwards.
    pub fn since(&self, from: usize) -> Vec<FeedMessage> {
        self.messages
            .read()
            .get(from..)
            .map(<[FeedMessage]>::to_vec)
            .unwrap_or_default()
    }

    fn extend(&self, messages: Vec<FeedMessage>) {
        self.messages.write().extend(messages);
    }
}

/// Text frames received over one connection. The stream ends when the
/// connection closes.
pub type FrameStream = BoxStream<'static, Result<String, FeedError>>;

/// Opens socket connections for the feed.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, uri: &Url) -> Result<FrameStream, FeedError>;
}

/// [`Connector`] over a real WebSocket.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebSocketConnector;

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, uri: &Url) -> Result<FrameStream, FeedError> {
        let (socket, _response) = tokio_tungstenite::connect_async(uri.as_str())
            .await
            .map_err(|e| FeedError::Connect {
                uri: uri.to_string(),
                reason: e.to_string(),
            })?;

        let frames = socket.filter_map(|message| {
            future::ready(match message {
                Ok(Message::Text(text)) => Some(Ok(text.to_string())),
                Ok(_) => None,
                Err(e) => Some(Err(FeedError::Transport(e.to_string()))),
            })
        });

        Ok(frames.boxed())
    }
}

/// The socket URI for `user_id` on the server at `endpoint`.
///
/// `http` becomes `ws` and `https` becomes `wss`; the path is `/ws` and the
/// user id travels as the `UserID` query parameter.
pub fn feed_uri(endpoint: &str, user_id: u64) -> Result<Url, FeedError> {
    let invalid = |reason: String| FeedError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    };

    let mut uri = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
    let scheme = match uri.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(invalid(format!("unsupported scheme '{}'", other))),
    };
    uri.set_scheme(scheme)
        .map_err(|_| invalid(format!("cannot switch to '{}'", scheme)))?;
    uri.set_path("/ws");
    uri.set_fragment(None);
    uri.query_pairs_mut()
        .clear()
        .append_pair("UserID", &user_id.to_string());
    Ok(uri)
}

/// Keeps a conversation feed connected and its message log filled.
pub struct ConversationFeed<C> {
    connector: C,
    uri: Url,
    retry_delay: Duration,
    log: MessageLog,
    events: mpsc::UnboundedSender<FeedEvent>,
    state: FeedState,
    attempts: u64,
}

impl<C> ConversationFeed<C>
where
    C: Connector + 'static,
{
    /// Create a feed reading from `uri`, retrying every `retry_delay`.
    ///
    /// The receiver gets a [`FeedEvent`] for every state change and every
    /// batch of messages. Dropping it does not stop the feed.
    pub fn new(
        connector: C,
        uri: Url,
        retry_delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<FeedEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let feed = Self {
            connector,
            uri,
            retry_delay,
            log: MessageLog::new(),
            events,
            state: FeedState::Disconnected,
            attempts: 0,
        };
        (feed, receiver)
    }

    /// Create a feed for the trainer configured in `config`, which must name
    /// a user id.
    pub fn from_config(
        connector: C,
        config: &TrainerConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<FeedEvent>), FeedError> {
        let user_id = config.user_id.ok_or(FeedError::MissingUserId)?;
        let uri = feed_uri(&config.endpoint, user_id)?;
        Ok(Self::new(connector, uri, config.retry_delay))
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// The log this feed appends to.
    pub fn messages(&self) -> MessageLog {
        self.log.clone()
    }

    /// Run the feed on its own task. Aborting the task stops the feed.
    pub fn spawn(self) -> JoinHandle<()>
    where
        C: Send,
    {
        tokio::spawn(self.run())
    }

    /// Connect and stay connected. Never returns.
    pub async fn run(mut self) {
        let mut retry: Option<Interval> = None;

        loop {
            if let Some(timer) = retry.as_mut() {
                timer.tick().await;
                self.attempts += 1;
                tracing::info!(attempt = self.attempts, "retrying socket");
                self.emit(FeedEvent::Retrying {
                    attempt: self.attempts,
                });
            }

            self.set_state(FeedState::Connecting);
            match self.connector.connect(&self.uri).await {
                Ok(frames) => {
                    self.set_state(FeedState::Open);
                    tracing::info!(uri = %self.uri, "opened socket");
                    if retry.take().is_some() {
                        self.emit(FeedEvent::RetryCancelled);
                    }
                    self.pump(frames).await;
                    tracing::info!("socket closed");
                }
                Err(error) => {
                    tracing::warn!(%error, "could not open socket");
                    // Count the delay from when this attempt gave up.
                    if let Some(timer) = retry.as_mut() {
                        timer.reset();
                    }
                }
            }
            self.set_state(FeedState::Disconnected);

            if retry.is_none() {
                tracing::debug!(delay = ?self.retry_delay, "setting retry interval");
                retry = Some(self.retry_timer());
                self.emit(FeedEvent::RetryScheduled);
            }
        }
    }

    fn retry_timer(&self) -> Interval {
        let mut timer = time::interval_at(Instant::now() + self.retry_delay, self.retry_delay);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        timer
    }

    async fn pump(&mut self, mut frames: FrameStream) {
        while let Some(frame) = frames.next().await {
            match frame {
                Ok(text) => self.receive(&text),
                Err(error) => {
                    tracing::warn!(%error, "socket error");
                    break;
                }
            }
        }
    }

    fn receive(&self, text: &str) {
        match serde_json::from_str::<Vec<FeedMessage>>(text) {
            Ok(messages) => {
                let appended = messages.len();
                self.log.extend(messages);
                tracing::debug!(appended, "message received");
                self.emit(FeedEvent::Messages { appended });
            }
            Err(error) => {
                tracing::debug!(%error, "dropping malformed payload");
                self.emit(FeedEvent::Dropped);
            }
        }
    }

    fn set_state(&mut self, state: FeedState) {
        if self.state != state {
            self.state = state;
            self.emit(FeedEvent::State(state));
        }
    }

    fn emit(&self, event: FeedEvent) {
        // Nobody listening is fine; the log still fills.
        let _ = self.events.send(event);
    }
}
