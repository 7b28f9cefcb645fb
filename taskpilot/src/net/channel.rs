//! Channel factory for streaming connections (chat replies, notification
//! push).
//!
//! Browsers cannot put custom headers on a WebSocket handshake, so the
//! backend expects the access token as a `token` query parameter. The token
//! is read once, at connect time. A channel does not reconnect when dropped
//! and does not follow token refreshes; if the token expires while a channel
//! is open, the caller reconnects.

use std::{fmt, marker::PhantomData, sync::Arc};

use futures_util::{SinkExt, StreamExt};
use serde::{Serialize, de::DeserializeOwned};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, Message, error::ProtocolError},
};
use url::Url;

use super::errors::{ApiError, ApiResult};
use crate::{
    models::{ChatId, ChatStreamEvent, Notification, UserId},
    store::CredentialStore,
};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// What a channel carries, and for which resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelPurpose {
    /// Assistant replies streamed for one chat
    ChatStream(ChatId),
    /// Notifications pushed to one user
    Notifications(UserId),
}

impl ChannelPurpose {
    /// Path of the streaming endpoint, relative to the base URL.
    pub fn path(&self) -> String {
        match self {
            ChannelPurpose::ChatStream(chat_id) => format!("/api/v1/chats/{chat_id}/ws"),
            // The backend identifies the user from the token.
            ChannelPurpose::Notifications(_) => "/api/v1/ws/notifications".to_string(),
        }
    }
}

impl fmt::Display for ChannelPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelPurpose::ChatStream(chat_id) => write!(f, "chat-stream:{chat_id}"),
            ChannelPurpose::Notifications(user_id) => write!(f, "notifications:{user_id}"),
        }
    }
}

/// Builds streaming URLs and opens channels with the current access token.
#[derive(Debug, Clone)]
pub struct ChannelFactory {
    base_url: String,
    store: Arc<CredentialStore>,
}

impl ChannelFactory {
    /// `base_url` is the HTTP base URL; its scheme is mapped to the
    /// streaming equivalent.
    pub fn new(base_url: impl Into<String>, store: Arc<CredentialStore>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, store }
    }

    /// Streaming URL for `purpose`, carrying the current access token.
    ///
    /// # Errors
    ///
    /// * `NotAuthenticated` - no access token is stored
    /// * `InvalidUrl` - the base URL is malformed
    pub fn url(&self, purpose: &ChannelPurpose) -> ApiResult<Url> {
        let token = self
            .store
            .access_token()
            .ok_or(ApiError::NotAuthenticated)?;

        let mut url = Url::parse(&format!(
            "{}{}",
            streaming_base(&self.base_url),
            purpose.path()
        ))?;
        url.query_pairs_mut().append_pair("token", &token);
        Ok(url)
    }

    /// Open a channel whose incoming frames decode as `E`.
    pub async fn connect<E: DeserializeOwned>(
        &self,
        purpose: ChannelPurpose,
    ) -> ApiResult<StreamChannel<E>> {
        let url = self.url(&purpose)?;

        // The URL carries the token, so only the purpose is logged.
        tracing::debug!(channel = %purpose, "Opening stream channel");
        let (socket, _response) = connect_async(url.as_str()).await?;
        tracing::info!(channel = %purpose, "Stream channel connected");

        Ok(StreamChannel {
            purpose,
            socket,
            closed: false,
            _event: PhantomData,
        })
    }

    pub async fn connect_chat(&self, chat_id: ChatId) -> ApiResult<StreamChannel<ChatStreamEvent>> {
        self.connect(ChannelPurpose::ChatStream(chat_id)).await
    }

    pub async fn connect_notifications(
        &self,
        user_id: UserId,
    ) -> ApiResult<StreamChannel<Notification>> {
        self.connect(ChannelPurpose::Notifications(user_id)).await
    }
}

/// Map `http(s)://` to `ws(s)://`. Anything else is returned unchanged.
fn streaming_base(base_url: &str) -> String {
    if let Some(rest) = base_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base_url.to_string()
    }
}

/// A live connection owned by whoever opened it.
pub struct StreamChannel<E> {
    purpose: ChannelPurpose,
    socket: Socket,
    /// Set once the peer's close frame or the end of the stream was seen
    closed: bool,
    _event: PhantomData<fn() -> E>,
}

impl<E: DeserializeOwned> StreamChannel<E> {
    pub fn purpose(&self) -> ChannelPurpose {
        self.purpose
    }

    /// Send `message` as a JSON text frame.
    pub async fn send<M: Serialize + ?Sized>(&mut self, message: &M) -> ApiResult<()> {
        let json = serde_json::to_string(message)?;
        self.socket.send(Message::Text(json.into())).await?;
        Ok(())
    }

    /// Wait for the next event.
    ///
    /// Control frames are skipped. Returns `None` once the peer closes the
    /// connection. A frame that does not decode as `E` yields a `Decode`
    /// error without closing the channel.
    pub async fn next_event(&mut self) -> Option<ApiResult<E>> {
        while let Some(frame) = self.socket.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    return Some(serde_json::from_str(text.as_str()).map_err(ApiError::from));
                }
                Ok(Message::Binary(bytes)) => {
                    return Some(serde_json::from_slice(&bytes).map_err(ApiError::from));
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!(channel = %self.purpose, "Stream channel closed by server");
                    self.closed = true;
                    return None;
                }
                Ok(_) => continue,
                Err(tungstenite::Error::ConnectionClosed) => {
                    self.closed = true;
                    return None;
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
        self.closed = true;
        None
    }

    /// Close the connection. Closing an already closed channel succeeds.
    pub async fn close(mut self) -> ApiResult<()> {
        // The reply to the peer's close frame is already queued; only flush it.
        if self.closed {
            let _ = self.socket.flush().await;
            return Ok(());
        }
        match self.socket.close(None).await {
            Ok(())
            | Err(tungstenite::Error::ConnectionClosed)
            | Err(tungstenite::Error::AlreadyClosed)
            | Err(tungstenite::Error::Protocol(ProtocolError::SendAfterClosing)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl<E> fmt::Debug for StreamChannel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamChannel")
            .field("purpose", &self.purpose)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}
