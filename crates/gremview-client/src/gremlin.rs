//! Gremlin Server websocket backend.

use crate::backend::{Backend, Session};
use crate::protocol::{Progress, RequestMessage, ResponseMessage};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use gremview_core::{Endpoint, Error, Result};
use serde_json::Value;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, trace};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Default time allowed for the websocket handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// GremlinBackend
// ============================================================================

/// Opens websocket sessions against a TinkerPop Gremlin Server.
#[derive(Clone, Debug)]
pub struct GremlinBackend {
    connect_timeout: Duration,
}

impl GremlinBackend {
    /// Creates a backend with the default connect timeout.
    pub fn new() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Sets the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl Default for GremlinBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for GremlinBackend {
    fn name(&self) -> &str {
        "gremlin"
    }

    async fn open(&self, endpoint: &Endpoint) -> Result<Box<dyn Session>> {
        let url = endpoint.url();
        let (stream, _response) = tokio::time::timeout(self.connect_timeout, connect_async(url.as_str()))
            .await
            .map_err(|_| {
                Error::connection(
                    endpoint.to_string(),
                    format!("handshake timed out after {}s", self.connect_timeout.as_secs()),
                )
            })?
            .map_err(|e| Error::connection(endpoint.to_string(), e.to_string()))?;

        debug!(endpoint = %endpoint, "Opened Gremlin session");
        Ok(Box::new(GremlinSession {
            endpoint: endpoint.clone(),
            stream: Some(stream),
        }))
    }
}

// ============================================================================
// GremlinSession
// ============================================================================

/// One websocket connection. Dropping it closes the socket.
pub struct GremlinSession {
    endpoint: Endpoint,
    stream: Option<WsStream>,
}

impl GremlinSession {
    /// Send one request and read frames until its final response.
    async fn exchange(&mut self, query: &str) -> Result<Vec<Value>> {
        let request = RequestMessage::eval(query, &self.endpoint.traversal_source);
        let frame = request.to_frame()?;
        let endpoint = self.endpoint.to_string();
        let lost = |message: String| Error::connection(endpoint.clone(), message);

        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| lost("session is closed".to_string()))?;
        stream
            .send(Message::binary(frame))
            .await
            .map_err(|e| lost(e.to_string()))?;

        let mut items = Vec::new();
        while let Some(message) = stream.next().await {
            let message = message.map_err(|e| lost(e.to_string()))?;
            let response = match &message {
                Message::Text(text) => ResponseMessage::parse(text.as_bytes())?,
                Message::Binary(data) => ResponseMessage::parse(data)?,
                Message::Close(_) => break,
                _ => continue,
            };
            if !response.answers(&request.id()) {
                trace!(request_id = %request.id(), "Ignoring frame for another request");
                continue;
            }
            match response.into_progress()? {
                Progress::Partial(batch) => items.extend(batch),
                Progress::Done(batch) => {
                    items.extend(batch);
                    return Ok(items);
                }
            }
        }

        Err(lost(
            "connection closed before the response completed".to_string(),
        ))
    }
}

#[async_trait]
impl Session for GremlinSession {
    async fn submit(&mut self, query: &str) -> Result<Vec<Value>> {
        let result = self.exchange(query).await;
        if matches!(result, Err(Error::Connection { .. })) {
            self.stream = None;
        }
        result
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.close(None).await {
                debug!(endpoint = %self.endpoint, error = %e, "Websocket close handshake failed");
            }
            debug!(endpoint = %self.endpoint, "Closed Gremlin session");
        }
        Ok(())
    }
}
