//! The socket abstraction the connection manager drives.
//!
//! [`WsTransport`] speaks WebSocket via tokio-tungstenite. Tests substitute a
//! scripted transport so reconnect behaviour can be exercised without a
//! network.

use std::{future::Future, time::Duration};

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
  MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message,
};
use tracing::{debug, warn};

use crate::{Error, Result};

// ─── Traits ──────────────────────────────────────────────────────────────────

/// One open, bidirectional text connection.
pub trait Socket: Send + 'static {
  /// The next inbound text frame, or `None` once the peer has closed the
  /// connection. Control frames never surface here.
  fn recv(&mut self) -> impl Future<Output = Option<Result<String>>> + Send + '_;

  fn send(&mut self, text: String) -> impl Future<Output = Result<()>> + Send + '_;

  fn close(&mut self) -> impl Future<Output = Result<()>> + Send + '_;
}

/// Opens sockets. Only the connection manager calls this.
pub trait Transport: Send + Sync + 'static {
  type Socket: Socket;

  fn open<'a>(
    &'a self,
    url: &'a str,
  ) -> impl Future<Output = Result<Self::Socket>> + Send + 'a;
}

// ─── WebSocket implementation ────────────────────────────────────────────────

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket transport (`ws://` and `wss://`).
#[derive(Debug, Clone)]
pub struct WsTransport {
  connect_timeout: Duration,
}

impl WsTransport {
  pub fn new(connect_timeout: Duration) -> Self { Self { connect_timeout } }
}

impl Transport for WsTransport {
  type Socket = WsSocket;

  async fn open<'a>(&'a self, url: &'a str) -> Result<WsSocket> {
    let (stream, _response) =
      tokio::time::timeout(self.connect_timeout, connect_async(url))
        .await
        .map_err(|_| Error::ConnectTimeout { url: url.to_string() })?
        .map_err(|e| Error::Connect {
          url:    url.to_string(),
          reason: e.to_string(),
        })?;
    Ok(WsSocket { stream })
  }
}

/// An open WebSocket connection.
pub struct WsSocket {
  stream: WsStream,
}

impl Socket for WsSocket {
  async fn recv(&mut self) -> Option<Result<String>> {
    loop {
      match self.stream.next().await? {
        Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
        Ok(Message::Binary(bytes)) => match String::from_utf8(bytes.to_vec()) {
          Ok(text) => return Some(Ok(text)),
          Err(_) => warn!(len = bytes.len(), "dropping non-UTF-8 binary frame"),
        },
        Ok(Message::Close(frame)) => {
          debug!(?frame, "server sent close frame");
          return None;
        }
        // tungstenite answers pings itself.
        Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {}
        Err(e) => return Some(Err(e.into())),
      }
    }
  }

  async fn send(&mut self, text: String) -> Result<()> {
    self.stream.send(Message::text(text)).await?;
    Ok(())
  }

  async fn close(&mut self) -> Result<()> {
    self.stream.close(None).await?;
    Ok(())
  }
}
